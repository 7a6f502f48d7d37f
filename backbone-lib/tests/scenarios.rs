//! End-to-end scenarios from the design document's testable-properties
//! section, driven through `SessionController::handle_envelope` rather than
//! a live socket.

use std::time::Duration;

use backbone_lib::match_controller::MatchPhase;
use backbone_lib::{SessionConfig, SessionController};
use protocol::envelope::Envelope;
use protocol::types::*;

fn config() -> SessionConfig {
    SessionConfig {
        server_url: "wss://example.test/".to_string(),
        app_name: "rumble-client-tests".to_string(),
        profile_override: Some("scenario-tests".to_string()),
        dial_timeout: Duration::from_secs(5),
        inbox_capacity: 128,
        player_display_name: "tester".to_string(),
    }
}

#[test]
fn cold_start_profile_reply_populates_local_state() {
    let mut session = SessionController::new(config());
    let event = session
        .handle_envelope(
            Envelope::Profile(ProfilePayload {
                player_id: 42,
                pvp_rating: 1500,
                pvp_rank: "Silver".to_string(),
            }),
            0,
        )
        .unwrap();
    match event {
        backbone_lib::RouterEvent::ProfileUpdated { player_id } => assert_eq!(player_id, 42),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn create_pve_start_end_continue_round_trip() {
    let mut session = SessionController::new(config());

    session.match_controller.create_pve("north_tower".to_string());
    assert_eq!(
        session.match_controller.pending_arena_id.as_deref(),
        Some("north_tower")
    );

    session.handle_envelope(
        Envelope::RoomCreated(RoomCreatedPayload {
            room_id: "R1".to_string(),
        }),
        0,
    );
    assert_eq!(session.match_controller.phase, MatchPhase::RoomCreated);

    session.match_controller.start_battle();
    session.handle_envelope(
        Envelope::Init(InitPayload {
            player_id: 42,
            hand: vec![],
            next: MiniCardView {
                card_id: "c1".to_string(),
                name: "Grunt".to_string(),
                cost: 2,
            },
            map_id: Some("north_tower".to_string()),
        }),
        0,
    );
    assert_eq!(session.match_controller.phase, MatchPhase::InBattle);
    assert_eq!(
        session.match_controller.current_arena_id.as_deref(),
        Some("north_tower")
    );

    session.handle_envelope(
        Envelope::Profile(ProfilePayload {
            player_id: 1,
            pvp_rating: 1000,
            pvp_rank: "Bronze".to_string(),
        }),
        0,
    );
    session.handle_envelope(
        Envelope::FullSnapshot(FullSnapshotPayload {
            units: vec![],
            bases: vec![
                BaseState {
                    owner_id: 1,
                    x: 0,
                    y: 0,
                    w: 10,
                    h: 10,
                    hp: 100,
                    max_hp: 100,
                },
                BaseState {
                    owner_id: 2,
                    x: 300,
                    y: 0,
                    w: 10,
                    h: 10,
                    hp: 100,
                    max_hp: 100,
                },
            ],
        }),
        0,
    );
    session.handle_envelope(
        Envelope::StateDelta(StateDeltaPayload {
            bases: Some(vec![BaseState {
                owner_id: 2,
                x: 300,
                y: 0,
                w: 10,
                h: 10,
                hp: 0,
                max_hp: 100,
            }]),
            ..Default::default()
        }),
        0,
    );
    assert_eq!(session.match_controller.phase, MatchPhase::Ended);
    assert_eq!(
        session.match_controller.result,
        Some(backbone_lib::match_controller::BattleResult { victory: true })
    );

    session
        .match_controller
        .continue_after_battle(&mut session.world);
    assert_eq!(session.match_controller.phase, MatchPhase::Idle);
    assert!(session.world.units.is_empty());
}

#[test]
fn guild_roster_presence_synthesis_does_not_touch_the_network() {
    let mut session = SessionController::new(config());
    session.handle_envelope(
        Envelope::GuildInfo(GuildInfoPayload {
            guild_id: "G1".to_string(),
            name: "Test".to_string(),
            members: vec![
                GuildMemberWire {
                    name: "Alice".to_string(),
                    role: "leader".to_string(),
                    online: true,
                },
                GuildMemberWire {
                    name: "Bob".to_string(),
                    role: "member".to_string(),
                    online: true,
                },
            ],
        }),
        0,
    );
    session.handle_envelope(
        Envelope::GuildInfo(GuildInfoPayload {
            guild_id: "G1".to_string(),
            name: "Test".to_string(),
            members: vec![
                GuildMemberWire {
                    name: "Alice".to_string(),
                    role: "leader".to_string(),
                    online: true,
                },
                GuildMemberWire {
                    name: "Bob".to_string(),
                    role: "officer".to_string(),
                    online: true,
                },
                GuildMemberWire {
                    name: "Carol".to_string(),
                    role: "member".to_string(),
                    online: true,
                },
            ],
        }),
        1000,
    );

    let texts: Vec<&str> = session.guild.chat.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Bob promoted to officer", "Carol joined the guild"]
    );
}

#[test]
fn reconnect_after_drop_leaves_no_residual_battle_state() {
    let mut session = SessionController::new(config());

    // Simulate being mid-battle with real units on the board.
    session.handle_envelope(
        Envelope::FullSnapshot(FullSnapshotPayload {
            units: vec![UnitState {
                id: 1,
                owner_id: 1,
                name: "grunt".to_string(),
                class: "melee".to_string(),
                x: 10,
                y: 10,
                hp: 100,
                max_hp: 100,
                range: 1,
                particle: "none".to_string(),
            }],
            bases: vec![],
        }),
        0,
    );
    session.match_controller.phase = MatchPhase::InBattle;
    assert!(!session.world.units.is_empty());

    // Transport drop: world and match reset, no outbound message involved.
    session
        .match_controller
        .on_disconnect(&mut session.world);

    assert_eq!(session.match_controller.phase, MatchPhase::Idle);
    assert!(session.world.units.is_empty());

    // A fresh session after retry runs the bootstrap sequence anew and the
    // next Init must not see any leftover battle state.
    session.handle_envelope(
        Envelope::Init(InitPayload {
            player_id: 42,
            hand: vec![],
            next: MiniCardView {
                card_id: "c1".to_string(),
                name: "Grunt".to_string(),
                cost: 2,
            },
            map_id: None,
        }),
        0,
    );
    assert!(session.world.units.is_empty());
    assert_eq!(session.match_controller.phase, MatchPhase::InBattle);
}
