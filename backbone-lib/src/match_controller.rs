//! Room / Match Controller: the matchmaking and battle-lifecycle
//! state machine. Reacts to inbound envelopes and local user gestures; the
//! only network effect of any transition here is the single outbound message
//! the transition table calls for.

use protocol::OutboundMessage;
use tracing::{debug, warn};

use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    Idle,
    Queued,
    Hosting,
    Joining,
    RoomCreated,
    InBattle,
    Ended,
}

/// Whether the local player won, once the battle has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BattleResult {
    pub victory: bool,
}

/// Full match state.
pub struct MatchController {
    pub phase: MatchPhase,
    pub room_id: Option<String>,
    pub pending_arena_id: Option<String>,
    pub current_arena_id: Option<String>,
    pub last_code: Option<String>,
    pub result: Option<BattleResult>,
}

impl Default for MatchController {
    fn default() -> Self {
        MatchController::new()
    }
}

impl MatchController {
    pub fn new() -> Self {
        MatchController {
            phase: MatchPhase::Idle,
            room_id: None,
            pending_arena_id: None,
            current_arena_id: None,
            last_code: None,
            result: None,
        }
    }

    fn reset_to_idle(&mut self) {
        *self = MatchController::new();
    }

    // --- user-initiated transitions -------------------------------------------------

    pub fn queue_pvp(&mut self) -> Option<OutboundMessage> {
        if self.phase != MatchPhase::Idle {
            return None;
        }
        self.phase = MatchPhase::Queued;
        Some(OutboundMessage::JoinPvpQueue)
    }

    pub fn leave_queue(&mut self) -> Option<OutboundMessage> {
        if self.phase != MatchPhase::Queued {
            return None;
        }
        self.phase = MatchPhase::Idle;
        Some(OutboundMessage::LeavePvpQueue)
    }

    pub fn host_friendly(&mut self) -> Option<OutboundMessage> {
        if self.phase != MatchPhase::Idle {
            return None;
        }
        self.phase = MatchPhase::Hosting;
        Some(OutboundMessage::FriendlyCreate)
    }

    pub fn cancel_hosting(&mut self) -> Option<OutboundMessage> {
        if self.phase != MatchPhase::Hosting {
            return None;
        }
        self.phase = MatchPhase::Idle;
        Some(OutboundMessage::FriendlyCancel)
    }

    pub fn join_by_code(&mut self, code: String) -> Option<OutboundMessage> {
        if self.phase != MatchPhase::Idle {
            return None;
        }
        self.phase = MatchPhase::Joining;
        Some(OutboundMessage::FriendlyJoin { code })
    }

    pub fn create_pve(&mut self, map_id: String) -> Option<OutboundMessage> {
        if self.phase != MatchPhase::Idle {
            return None;
        }
        self.pending_arena_id = Some(map_id.clone());
        self.phase = MatchPhase::Queued;
        Some(OutboundMessage::CreatePve { map_id })
    }

    pub fn start_battle(&mut self) -> Option<OutboundMessage> {
        if self.phase != MatchPhase::RoomCreated {
            return None;
        }
        Some(OutboundMessage::StartBattle)
    }

    /// User presses Continue after an end overlay.
    pub fn continue_after_battle(&mut self, world: &mut World) -> Option<OutboundMessage> {
        if self.phase != MatchPhase::Ended {
            return None;
        }
        world.reset();
        self.reset_to_idle();
        Some(OutboundMessage::LeaveRoom)
    }

    // --- server-driven transitions ---------------------------------------------------

    pub fn on_friendly_code(&mut self, code: String) {
        if self.phase != MatchPhase::Hosting {
            warn!(phase = ?self.phase, "FriendlyCode received outside Hosting");
        }
        self.last_code = Some(code);
    }

    pub fn on_room_created(&mut self, room_id: String) {
        self.room_id = Some(room_id);
        self.phase = MatchPhase::RoomCreated;
    }

    pub fn on_init(&mut self, world: &mut World) {
        self.current_arena_id = self.pending_arena_id.clone();
        world.reset();
        self.phase = MatchPhase::InBattle;
        self.result = None;
    }

    pub fn on_game_over(&mut self, victory: bool) {
        self.result = Some(BattleResult { victory });
        self.phase = MatchPhase::Ended;
    }

    /// Called once per tick while `InBattle`; arms the end overlay from base
    /// HP if no explicit `GameOver` has already done so.
    pub fn observe_bases(&mut self, world: &World, local_player_owner_id: i64) {
        if self.phase != MatchPhase::InBattle || self.result.is_some() {
            return;
        }
        let local_hp = world.bases.get(&local_player_owner_id).map(|b| b.hp);
        let opponent_hp = world
            .bases
            .iter()
            .find(|(owner, _)| **owner != local_player_owner_id)
            .map(|(_, b)| b.hp);

        if let (Some(local_hp), Some(opponent_hp)) = (local_hp, opponent_hp) {
            if local_hp <= 0 || opponent_hp <= 0 {
                let victory = opponent_hp <= 0 && local_hp > 0;
                debug!(victory, "base destroyed, arming end overlay");
                self.result = Some(BattleResult { victory });
                self.phase = MatchPhase::Ended;
            }
        }
    }

    /// Any disconnect resets to idle with no server message.
    pub fn on_disconnect(&mut self, world: &mut World) {
        world.reset();
        self.reset_to_idle();
    }
}
