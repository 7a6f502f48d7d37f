//! Authoritative state reconciliation: units, projectiles, and
//! bases are owned here and only ever mutated by server-pushed snapshots and
//! deltas. Everything this module computes for rendering — interpolated
//! position, spawn animation, the HP-FX ghost chip — is a read-only
//! presentation trace layered on top; it never feeds back into authoritative
//! HP or position.

use std::collections::HashMap;
use std::time::Duration;

use protocol::types::{BaseState, FullSnapshotPayload, Projectile, StateDeltaPayload, UnitState};

/// How long after the last authoritative update the position blend
/// completes.
const INTERP_RATE_PER_SEC: f32 = 10.0;

/// Projectiles within this many screen-units of their target are dropped —
/// visual cleanup only, the server is still the source of truth for removal.
const PROJECTILE_ARRIVAL_EPSILON: f32 = 5.0;

/// Extra clearance added around a base's bounding box before a unit is
/// nudged out of it.
const BASE_COLLISION_BUFFER: f32 = 12.0;

const SPAWN_ANIM_DURATION_S: f32 = 0.4;
const SPAWN_ANIM_DROP: f32 = 40.0;
const SPAWN_ANIM_START_SCALE: f32 = 1.4;
const SPAWN_ANIM_END_SCALE: f32 = 1.0;

const HP_FX_HOLD_MS: u64 = 500;
const HP_FX_COLLAPSE_MS: u64 = 300;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    fn lerp(self, other: Vec2, alpha: f32) -> Vec2 {
        Vec2 {
            x: self.x + (other.x - self.x) * alpha,
            y: self.y + (other.y - self.y) * alpha,
        }
    }

    fn distance(self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A unit as rendered, carrying interpolation state on top of the last two
/// authoritative positions.
#[derive(Clone, Debug)]
pub struct RenderUnit {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub class: String,
    pub range: i32,
    pub particle_kind: String,
    pub hp: i32,
    pub max_hp: i32,
    pub prev_pos: Vec2,
    pub pos: Vec2,
    pub target_pos: Vec2,
    pub animation_state: Option<SpawnAnimation>,
}

#[derive(Clone, Debug)]
pub struct SpawnAnimation {
    start_pos: Vec2,
    target_pos: Vec2,
    start_scale: f32,
    end_scale: f32,
    elapsed_s: f32,
}

impl SpawnAnimation {
    fn new(spawn: Vec2) -> Self {
        SpawnAnimation {
            start_pos: Vec2 {
                x: spawn.x,
                y: spawn.y - SPAWN_ANIM_DROP,
            },
            target_pos: spawn,
            start_scale: SPAWN_ANIM_START_SCALE,
            end_scale: SPAWN_ANIM_END_SCALE,
            elapsed_s: 0.0,
        }
    }

    /// Returns `(position, scale)` for the current animation progress, or
    /// `None` once it has completed (caller removes it on `None`).
    fn sample(&self, dt: Duration) -> Option<(Vec2, f32)> {
        let t = (self.elapsed_s + dt.as_secs_f32()) / SPAWN_ANIM_DURATION_S;
        if t >= 1.0 {
            return None;
        }
        let eased = 1.0 - (1.0 - t).powi(3); // cubic ease-out
        let pos = self.start_pos.lerp(self.target_pos, eased);
        let scale = self.start_scale + (self.end_scale - self.start_scale) * eased;
        Some((pos, scale))
    }

    fn advance(&mut self, dt: Duration) {
        self.elapsed_s += dt.as_secs_f32();
    }
}

/// A projectile as rendered. The client never originates or extends one.
#[derive(Clone, Debug)]
pub struct RenderProjectile {
    pub id: i64,
    pub pos: Vec2,
    pub target_pos: Vec2,
    pub owner_id: i64,
    pub target_unit_id: i64,
    pub damage: i32,
    pub kind: String,
    pub active: bool,
}

/// Visual-only trailing HP indicator. Never read by
/// anything but the renderer.
#[derive(Clone, Debug, Default)]
pub struct HpFxTrace {
    last_hp: i32,
    ghost_hp: i32,
    hold_until_ms: i64,
    lerp_start_ms: i64,
    lerp_start_hp: i32,
}

impl HpFxTrace {
    fn new(initial_hp: i32) -> Self {
        HpFxTrace {
            last_hp: initial_hp,
            ghost_hp: initial_hp,
            hold_until_ms: 0,
            lerp_start_ms: 0,
            lerp_start_hp: initial_hp,
        }
    }

    /// Called whenever authoritative HP changes for this entity. `now_ms` is
    /// on whatever clock the caller also passes to `chip_value` — the two
    /// must share an epoch or the hold/collapse window never renders.
    fn observe(&mut self, current_hp: i32, now_ms: i64) {
        if current_hp < self.last_hp {
            self.ghost_hp = self.last_hp;
            self.hold_until_ms = now_ms + HP_FX_HOLD_MS as i64;
            self.lerp_start_ms = self.hold_until_ms;
            self.lerp_start_hp = self.ghost_hp;
        }
        self.last_hp = current_hp;
    }

    /// The chip value to render for HP `current_hp` at time `now_ms`.
    pub fn chip_value(&self, current_hp: i32, now_ms: i64) -> i32 {
        if now_ms < self.hold_until_ms {
            return self.ghost_hp;
        }
        let elapsed = (now_ms - self.lerp_start_ms).max(0);
        if elapsed >= HP_FX_COLLAPSE_MS as i64 {
            return current_hp;
        }
        let t = elapsed as f32 / HP_FX_COLLAPSE_MS as f32;
        let value = self.lerp_start_hp as f32 + (current_hp as f32 - self.lerp_start_hp as f32) * t;
        value.round() as i32
    }
}

/// Static obstacle/lane geometry for the current map, consumed by the
/// Pathing Helper and for base-collision nudging.
#[derive(Clone, Debug, Default)]
pub struct MapGeometry {
    pub obstacles: Vec<crate::pathing::Rect>,
    pub lanes: Vec<Vec<Vec2>>,
}

/// Owns all authoritative-derived render state for the current battle.
pub struct World {
    pub units: HashMap<i64, RenderUnit>,
    pub projectiles: HashMap<i64, RenderProjectile>,
    pub bases: HashMap<i64, BaseState>,
    pub geometry: MapGeometry,
    hp_fx: HashMap<i64, HpFxTrace>,
    last_update_mono: std::time::Instant,
}

impl Default for World {
    fn default() -> Self {
        World::new()
    }
}

impl World {
    pub fn new() -> Self {
        World {
            units: HashMap::new(),
            projectiles: HashMap::new(),
            bases: HashMap::new(),
            geometry: MapGeometry::default(),
            hp_fx: HashMap::new(),
            last_update_mono: std::time::Instant::now(),
        }
    }

    /// Resets to a fresh empty world.
    pub fn reset(&mut self) {
        *self = World::new();
    }

    /// Applies a `FullSnapshot`: units and bases atomically replaced, current
    /// position equals target (no interpolation jump).
    pub fn apply_snapshot(&mut self, snapshot: FullSnapshotPayload) {
        self.units.clear();
        for u in snapshot.units {
            let pos = Vec2 {
                x: u.x as f32,
                y: u.y as f32,
            };
            self.hp_fx.insert(u.id, HpFxTrace::new(u.hp));
            self.units.insert(
                u.id,
                RenderUnit {
                    id: u.id,
                    name: u.name,
                    owner_id: u.owner_id,
                    class: u.class,
                    range: u.range,
                    particle_kind: u.particle,
                    hp: u.hp,
                    max_hp: u.max_hp,
                    prev_pos: pos,
                    pos,
                    target_pos: pos,
                    animation_state: None,
                },
            );
        }
        self.bases.clear();
        for b in snapshot.bases {
            self.bases.insert(b.owner_id, b);
        }
        self.last_update_mono = std::time::Instant::now();
    }

    /// Applies an incremental `StateDelta`. `now_ms` is the caller's clock —
    /// the same one later passed to `hp_fx_chip` — so the HP-FX hold/collapse
    /// window is timed consistently rather than against a hidden epoch.
    pub fn apply_delta(&mut self, delta: StateDeltaPayload, now_ms: i64) {
        for u in delta.units_upsert {
            self.upsert_unit(u, now_ms);
        }
        for id in delta.units_removed {
            self.units.remove(&id);
            self.hp_fx.remove(&id);
        }
        if let Some(projectiles) = delta.projectiles {
            self.projectiles = projectiles
                .into_iter()
                .map(|p| (p.id, render_projectile(p)))
                .collect();
        }
        if let Some(bases) = delta.bases {
            for b in bases {
                self.bases.insert(b.owner_id, b);
            }
        }
        self.last_update_mono = std::time::Instant::now();
    }

    fn upsert_unit(&mut self, u: UnitState, now_ms: i64) {
        let target = Vec2 {
            x: u.x as f32,
            y: u.y as f32,
        };
        match self.units.get_mut(&u.id) {
            None => {
                self.hp_fx.insert(u.id, HpFxTrace::new(u.hp));
                self.units.insert(
                    u.id,
                    RenderUnit {
                        id: u.id,
                        name: u.name,
                        owner_id: u.owner_id,
                        class: u.class,
                        range: u.range,
                        particle_kind: u.particle,
                        hp: u.hp,
                        max_hp: u.max_hp,
                        prev_pos: target,
                        pos: target,
                        target_pos: target,
                        animation_state: Some(SpawnAnimation::new(target)),
                    },
                );
            }
            Some(existing) => {
                existing.prev_pos = existing.pos;
                existing.target_pos = target;
                existing.hp = u.hp;
                existing.max_hp = u.max_hp;
                existing.owner_id = u.owner_id;
                existing.class = u.class;
                existing.range = u.range;
                existing.particle_kind = u.particle;
                self.hp_fx
                    .entry(u.id)
                    .or_insert_with(|| HpFxTrace::new(existing.hp))
                    .observe(existing.hp, now_ms);
            }
        }
    }

    /// Per-tick smoothing toward authoritative targets.
    pub fn tick(&mut self, dt: Duration) {
        let alpha = self.interpolation_alpha();
        let bases: Vec<BaseState> = self.bases.values().cloned().collect();
        for unit in self.units.values_mut() {
            unit.pos = unit.prev_pos.lerp(unit.target_pos, alpha);
            nudge_outside_bases(&mut unit.pos, &bases, BASE_COLLISION_BUFFER, unit_radius(unit));

            if let Some(anim) = &mut unit.animation_state {
                match anim.sample(dt) {
                    Some(_) => anim.advance(dt),
                    None => unit.animation_state = None,
                }
            }
        }

        self.projectiles.retain(|_, p| {
            p.active && p.pos.distance(p.target_pos) > PROJECTILE_ARRIVAL_EPSILON
        });
    }

    /// `α = clamp((now − lastUpdateMono) · 10.0, 0, 1)`.
    pub fn interpolation_alpha(&self) -> f32 {
        let elapsed = self.last_update_mono.elapsed().as_secs_f32();
        (elapsed * INTERP_RATE_PER_SEC).clamp(0.0, 1.0)
    }

    /// The HP-FX chip value to render for a unit, or `None` if untracked.
    /// `now_ms` must be on the same clock passed to the `StateDelta` that
    /// last updated this unit's HP (see `apply_delta`).
    pub fn hp_fx_chip(&self, unit_id: i64, now_ms: i64) -> Option<i32> {
        let unit = self.units.get(&unit_id)?;
        let trace = self.hp_fx.get(&unit_id)?;
        Some(trace.chip_value(unit.hp, now_ms))
    }

    /// `true` once every known base in the battle has settled (both bases
    /// present and at least one has reached 0 HP) — consumed by the Match
    /// Controller's end-of-battle check.
    pub fn any_base_destroyed(&self) -> bool {
        self.bases.values().any(|b| b.hp <= 0)
    }
}

fn render_projectile(p: Projectile) -> RenderProjectile {
    RenderProjectile {
        id: p.id,
        pos: Vec2 { x: p.x, y: p.y },
        target_pos: Vec2 {
            x: p.target_x,
            y: p.target_y,
        },
        owner_id: p.owner_id,
        target_unit_id: p.target_unit_id,
        damage: p.damage,
        kind: p.kind,
        active: true,
    }
}

fn unit_radius(_unit: &RenderUnit) -> f32 {
    // The rendering collaborator owns the actual sprite radius; the runtime
    // only needs a conservative value for nudging math.
    16.0
}

fn nudge_outside_bases(pos: &mut Vec2, bases: &[BaseState], buffer: f32, radius: f32) {
    for base in bases {
        let min_x = base.x as f32 - buffer;
        let max_x = (base.x + base.w) as f32 + buffer;
        let min_y = base.y as f32 - buffer;
        let max_y = (base.y + base.h) as f32 + buffer;

        if pos.x < min_x || pos.x > max_x || pos.y < min_y || pos.y > max_y {
            continue;
        }

        let push = radius + buffer;
        let dist_left = pos.x - min_x;
        let dist_right = max_x - pos.x;
        let dist_top = pos.y - min_y;
        let dist_bottom = max_y - pos.y;
        let min_dist = dist_left.min(dist_right).min(dist_top).min(dist_bottom);

        if min_dist == dist_left {
            pos.x = min_x - push;
        } else if min_dist == dist_right {
            pos.x = max_x + push;
        } else if min_dist == dist_top {
            pos.y = min_y - push;
        } else {
            pos.y = max_y + push;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::types::UnitState;

    fn unit(id: i64, x: i32, y: i32, hp: i32) -> UnitState {
        UnitState {
            id,
            owner_id: 1,
            name: "grunt".to_string(),
            class: "melee".to_string(),
            x,
            y,
            hp,
            max_hp: 100,
            range: 1,
            particle: "none".to_string(),
        }
    }

    #[test]
    fn snapshot_replaces_units_with_no_interpolation_jump() {
        let mut world = World::new();
        world.apply_snapshot(FullSnapshotPayload {
            units: vec![unit(1, 100, 100, 50)],
            bases: vec![],
        });
        let u = &world.units[&1];
        assert_eq!(u.pos, u.target_pos);
        assert_eq!(u.prev_pos, u.target_pos);
    }

    #[test]
    fn upsert_of_unknown_unit_has_no_teleport() {
        let mut world = World::new();
        world.apply_delta(
            StateDeltaPayload {
                units_upsert: vec![unit(7, 50, 60, 100)],
                ..Default::default()
            },
            0,
        );
        let u = &world.units[&7];
        assert_eq!(u.pos, Vec2 { x: 50.0, y: 60.0 });
        assert!(u.animation_state.is_some());
    }

    #[test]
    fn upsert_of_known_unit_preserves_prev_for_interpolation() {
        let mut world = World::new();
        world.apply_delta(
            StateDeltaPayload {
                units_upsert: vec![unit(7, 0, 0, 100)],
                ..Default::default()
            },
            0,
        );
        world.apply_delta(
            StateDeltaPayload {
                units_upsert: vec![unit(7, 100, 0, 100)],
                ..Default::default()
            },
            0,
        );
        let u = &world.units[&7];
        assert_eq!(u.prev_pos, Vec2 { x: 0.0, y: 0.0 });
        assert_eq!(u.target_pos, Vec2 { x: 100.0, y: 0.0 });
    }

    #[test]
    fn units_removed_are_deleted() {
        let mut world = World::new();
        world.apply_delta(
            StateDeltaPayload {
                units_upsert: vec![unit(1, 0, 0, 100)],
                ..Default::default()
            },
            0,
        );
        world.apply_delta(
            StateDeltaPayload {
                units_removed: vec![1],
                ..Default::default()
            },
            0,
        );
        assert!(world.units.is_empty());
    }

    #[test]
    fn projectiles_are_replaced_wholesale() {
        let mut world = World::new();
        let p = Projectile {
            id: 1,
            owner_id: 1,
            target_unit_id: 2,
            x: 0.0,
            y: 0.0,
            target_x: 100.0,
            target_y: 0.0,
            damage: 10,
            kind: "arrow".to_string(),
        };
        world.apply_delta(
            StateDeltaPayload {
                projectiles: Some(vec![p]),
                ..Default::default()
            },
            0,
        );
        assert_eq!(world.projectiles.len(), 1);
        world.apply_delta(
            StateDeltaPayload {
                projectiles: Some(vec![]),
                ..Default::default()
            },
            0,
        );
        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn interpolation_alpha_clamps_to_unit_interval() {
        let mut world = World::new();
        world.apply_delta(StateDeltaPayload::default(), 0);
        world.last_update_mono = std::time::Instant::now() - Duration::from_secs(1);
        assert_eq!(world.interpolation_alpha(), 1.0);
    }

    #[test]
    fn hp_fx_chip_lags_then_catches_up() {
        let mut trace = HpFxTrace::new(100);
        trace.observe(60, 0);
        assert_eq!(trace.chip_value(60, 200), 100);
        assert_eq!(trace.chip_value(60, 500), 100);
        assert_eq!(trace.chip_value(60, 800), 60);
    }

    #[test]
    fn reset_clears_everything() {
        let mut world = World::new();
        world.apply_delta(
            StateDeltaPayload {
                units_upsert: vec![unit(1, 0, 0, 100)],
                ..Default::default()
            },
            0,
        );
        world.reset();
        assert!(world.units.is_empty());
    }

    #[test]
    fn hp_fx_chip_through_world_uses_the_callers_clock_not_a_hidden_epoch() {
        let mut world = World::new();
        world.apply_snapshot(FullSnapshotPayload {
            units: vec![unit(1, 0, 0, 100)],
            bases: vec![],
        });
        // The caller's clock can start anywhere; 10_000 is arbitrary, not an
        // internal epoch the caller has to discover.
        world.apply_delta(
            StateDeltaPayload {
                units_upsert: vec![unit(1, 0, 0, 60)],
                ..Default::default()
            },
            10_000,
        );
        assert_eq!(world.hp_fx_chip(1, 10_200), Some(100));
        assert_eq!(world.hp_fx_chip(1, 10_500), Some(100));
        assert_eq!(world.hp_fx_chip(1, 10_800), Some(60));
    }
}
