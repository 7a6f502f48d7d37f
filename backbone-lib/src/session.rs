//! Session Controller: the connection lifecycle state machine.
//! Owns the Transport, the Token Store, and the bootstrap sequence; resets
//! World/Match/Social state on every transition that drops the connection.

use std::collections::HashSet;

use tokio::sync::oneshot;
use tracing::{info, warn};

use protocol::types::{LeaderboardEntryWire, MapEntryWire, MiniCardView};
use protocol::{Envelope, OutboundMessage};

use crate::config::SessionConfig;
use crate::error::{DialError, TransportError};
use crate::match_controller::MatchController;
use crate::social::{DmController, FriendsController, GuildController};
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::world::World;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Failed(String),
    Closed,
}

/// The event the router hands back to application code after draining one
/// tick's worth of frames — everything that isn't fully handled inside
/// World/Match/Social already.
#[derive(Debug)]
pub enum RouterEvent {
    ProfileUpdated { player_id: i64 },
    GoldUpdated { gold: i32 },
    ServerError { message: String },
    MinisUpdated { minis: Vec<MiniCardView> },
    MapsUpdated { maps: Vec<MapEntryWire> },
    LeaderboardUpdated { entries: Vec<LeaderboardEntryWire> },
    HandUpdated { hand: Vec<MiniCardView>, next: MiniCardView },
    Unknown { kind: String },
}

pub struct SessionController {
    config: SessionConfig,
    token_store: TokenStore,
    state: SessionState,
    transport: Option<Transport>,
    dial_rx: Option<oneshot::Receiver<Result<Transport, DialError>>>,
    pub world: World,
    pub match_controller: MatchController,
    pub friends: FriendsController,
    pub dms: DmController,
    pub guild: GuildController,
    local_player_id: Option<i64>,
    logged_unknown_kinds: HashSet<String>,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Self {
        let token_store = TokenStore::new(&config);
        let local_name = config.player_display_name.clone();
        SessionController {
            config,
            token_store,
            state: SessionState::Idle,
            transport: None,
            dial_rx: None,
            world: World::new(),
            match_controller: MatchController::new(),
            friends: FriendsController::new(),
            dms: DmController::new(),
            guild: GuildController::new(local_name),
            local_player_id: None,
            logged_unknown_kinds: HashSet::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// `Idle → Connecting`. A retry while already `Connecting` or `Connected`
    /// is a no-op — only one dial may be in flight at a time.
    pub fn connect_or_retry(&mut self) {
        if !matches!(self.state, SessionState::Idle | SessionState::Failed(_)) {
            return;
        }
        let Some(token) = self.token_store.load() else {
            self.state = SessionState::Failed("no saved token".to_string());
            return;
        };

        let url = self.config.server_url.clone();
        let inbox_capacity = self.config.inbox_capacity;
        let dial_timeout = self.config.dial_timeout;
        let (tx, rx) = oneshot::channel();
        self.dial_rx = Some(rx);
        self.state = SessionState::Connecting;

        tokio::spawn(async move {
            let result = Transport::dial(&url, &token, inbox_capacity, dial_timeout).await;
            let _ = tx.send(result);
        });
    }

    /// Non-blocking poll of the single-slot dial-result channel.
    /// Call once per UI tick.
    pub fn poll_dial(&mut self) -> Vec<OutboundMessage> {
        let Some(rx) = &mut self.dial_rx else {
            return Vec::new();
        };
        match rx.try_recv() {
            Ok(Ok(transport)) => {
                self.dial_rx = None;
                self.transport = Some(transport);
                self.state = SessionState::Connected;
                info!("transport connected, issuing bootstrap sequence");
                self.bootstrap_messages()
            }
            Ok(Err(e)) => {
                self.dial_rx = None;
                warn!(error = %e, "dial failed");
                self.state = SessionState::Failed(e.to_string());
                Vec::new()
            }
            Err(oneshot::error::TryRecvError::Empty) => Vec::new(),
            Err(oneshot::error::TryRecvError::Closed) => {
                self.dial_rx = None;
                self.state = SessionState::Failed("dial task dropped".to_string());
                Vec::new()
            }
        }
    }

    fn bootstrap_messages(&self) -> Vec<OutboundMessage> {
        vec![
            OutboundMessage::SetName {
                name: self.config.player_display_name.clone(),
            },
            OutboundMessage::GetProfile,
            OutboundMessage::ListMinis,
            OutboundMessage::ListMaps,
        ]
    }

    /// Fire-and-forget send; errors are logged and surface as a disconnect.
    pub fn send(&mut self, msg: OutboundMessage) {
        let Some(transport) = &self.transport else {
            warn!("send attempted with no active transport");
            return;
        };
        if let Err(e) = transport.send(msg) {
            warn!(error = %e, "send failed, marking session failed");
            self.fail(e);
        }
    }

    fn fail(&mut self, e: TransportError) {
        self.state = SessionState::Failed(e.to_string());
        self.match_controller.on_disconnect(&mut self.world);
    }

    /// Drains the Transport inbox for this tick and dispatches each envelope.
    /// Returns whatever the caller still needs to react to explicitly.
    pub fn drain_inbox(&mut self, now_ms: i64) -> Vec<RouterEvent> {
        let Some(transport) = self.transport.clone() else {
            return Vec::new();
        };

        if transport.is_closed() && self.state == SessionState::Connected {
            self.fail(TransportError::Closed);
            return Vec::new();
        }

        let mut events = Vec::new();
        while let Some(envelope) = transport.try_recv() {
            if let Some(event) = self.handle_envelope(envelope, now_ms) {
                events.push(event);
            }
        }
        events
    }

    /// Dispatches a single decoded envelope. Exposed directly
    /// (not only via `drain_inbox`) so the bootstrap/battle/reconnect
    /// sequences can be exercised without a live socket.
    pub fn handle_envelope(&mut self, envelope: Envelope, now_ms: i64) -> Option<RouterEvent> {
        match envelope {
            Envelope::Profile(p) | Envelope::RatingUpdate(p) => {
                self.local_player_id = Some(p.player_id);
                Some(RouterEvent::ProfileUpdated {
                    player_id: p.player_id,
                })
            }
            Envelope::GoldUpdate(g) => Some(RouterEvent::GoldUpdated { gold: g.gold }),
            Envelope::StateDelta(delta) => {
                self.world.apply_delta(delta, now_ms);
                if let Some(local_id) = self.local_player_id {
                    self.match_controller.observe_bases(&self.world, local_id);
                }
                None
            }
            Envelope::FullSnapshot(snapshot) => {
                self.world.apply_snapshot(snapshot);
                if let Some(local_id) = self.local_player_id {
                    self.match_controller.observe_bases(&self.world, local_id);
                }
                None
            }
            Envelope::Init(_init) => {
                self.match_controller.on_init(&mut self.world);
                None
            }
            Envelope::GameOver(g) => {
                self.match_controller.on_game_over(g.victory);
                None
            }
            Envelope::FriendlyCode(c) => {
                self.match_controller.on_friendly_code(c.code);
                None
            }
            Envelope::RoomCreated(r) => {
                self.match_controller.on_room_created(r.room_id);
                None
            }
            Envelope::Error(e) => Some(RouterEvent::ServerError { message: e.message }),
            Envelope::Friends(f) => {
                self.friends.apply_friends(f.friends);
                None
            }
            Envelope::UserProfile(p) => {
                let _ = self.friends.on_user_profile_reply(&p.name, p.found);
                None
            }
            Envelope::FriendDM(dm) => {
                self.dms.apply_live_message(dm.from, dm.text, dm.ts);
                None
            }
            Envelope::FriendHistory(h) => {
                self.dms.apply_history(h.with, h.messages);
                None
            }
            Envelope::GuildInfo(info) => {
                self.guild.apply_guild_info(info, now_ms);
                None
            }
            Envelope::GuildChat(chat) => {
                self.guild.apply_chat_backlog(chat.messages);
                None
            }
            Envelope::GuildChatMsg(msg) => {
                self.guild.apply_live_chat(msg);
                None
            }
            Envelope::GuildLeft(_) | Envelope::GuildDisbanded(_) => {
                self.guild = GuildController::new(self.config.player_display_name.clone());
                None
            }
            Envelope::LoggedOut(_) => {
                self.reset_all();
                self.state = SessionState::Closed;
                None
            }
            Envelope::Minis(m) => Some(RouterEvent::MinisUpdated { minis: m.minis }),
            Envelope::Maps(m) => Some(RouterEvent::MapsUpdated { maps: m.maps }),
            Envelope::Leaderboard(l) => {
                Some(RouterEvent::LeaderboardUpdated { entries: l.entries })
            }
            Envelope::HandUpdate(h) => Some(RouterEvent::HandUpdated {
                hand: h.hand,
                next: h.next,
            }),
            Envelope::GuildList(_) => None,
            Envelope::Unknown(kind) => {
                if self.logged_unknown_kinds.insert(kind.clone()) {
                    warn!(kind, "unrecognized inbound frame type");
                }
                Some(RouterEvent::Unknown { kind })
            }
        }
    }

    /// `*→ Closed` on explicit logout.
    pub fn logout(&mut self) {
        self.send(OutboundMessage::Logout);
        if let Some(transport) = self.transport.take() {
            transport.close();
        }
        self.token_store.clear();
        self.reset_all();
        self.state = SessionState::Closed;
    }

    fn reset_all(&mut self) {
        self.world.reset();
        self.match_controller = MatchController::new();
        self.friends = FriendsController::new();
        self.dms = DmController::new();
        self.guild = GuildController::new(self.config.player_display_name.clone());
        self.local_player_id = None;
        self.logged_unknown_kinds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> SessionConfig {
        SessionConfig {
            server_url: "wss://example.test/".to_string(),
            app_name: "test-app".to_string(),
            profile_override: Some("test-profile-does-not-exist".to_string()),
            dial_timeout: Duration::from_secs(5),
            inbox_capacity: 128,
            player_display_name: "tester".to_string(),
        }
    }

    /// An absolute override replaces the whole resolved profile dir (see
    /// `ProfileId`/`PathBuf::join` semantics), so this points the token store
    /// at an isolated temp directory instead of the real user config root.
    fn config_with_profile_dir(dir: &std::path::Path) -> SessionConfig {
        SessionConfig {
            profile_override: Some(dir.to_string_lossy().to_string()),
            ..config()
        }
    }

    #[test]
    fn starts_idle() {
        let session = SessionController::new(config());
        assert_eq!(*session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn retry_without_saved_token_fails_fast() {
        let mut session = SessionController::new(config());
        session.connect_or_retry();
        assert_eq!(
            *session.state(),
            SessionState::Failed("no saved token".to_string())
        );
    }

    #[tokio::test]
    async fn retry_while_connecting_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SessionController::new(config_with_profile_dir(dir.path()));
        session.token_store.save("tok");
        session.connect_or_retry();
        assert_eq!(*session.state(), SessionState::Connecting);
        let had_rx_before = session.dial_rx.is_some();
        session.connect_or_retry();
        assert!(had_rx_before && session.dial_rx.is_some());
        assert_eq!(*session.state(), SessionState::Connecting);
    }

    #[test]
    fn bootstrap_sequence_sets_name_then_fetches_profile_minis_maps() {
        let session = SessionController::new(config());
        let msgs = session.bootstrap_messages();
        let kinds: Vec<&str> = msgs.iter().map(|m| m.wire_type()).collect();
        assert_eq!(
            kinds,
            vec!["SetName", "GetProfile", "ListMinis", "ListMaps"]
        );
    }

    #[test]
    fn logout_resets_all_session_state() {
        let mut session = SessionController::new(config());
        session.match_controller.phase = crate::match_controller::MatchPhase::InBattle;
        session.logout();
        assert_eq!(*session.state(), SessionState::Closed);
        assert_eq!(
            session.match_controller.phase,
            crate::match_controller::MatchPhase::Idle
        );
    }

    #[test]
    fn unknown_frame_kind_is_only_tracked_for_logging_once() {
        let mut session = SessionController::new(config());
        assert!(session.logged_unknown_kinds.is_empty());
        session
            .handle_envelope(Envelope::Unknown("MysteryFrame".to_string()), 0)
            .unwrap();
        assert!(session.logged_unknown_kinds.contains("MysteryFrame"));
        // A second sighting still surfaces the event to the caller, but the
        // kind is already recorded, so the warn! above it does not fire again.
        let event = session
            .handle_envelope(Envelope::Unknown("MysteryFrame".to_string()), 0)
            .unwrap();
        assert!(matches!(event, RouterEvent::Unknown { kind } if kind == "MysteryFrame"));
        assert_eq!(session.logged_unknown_kinds.len(), 1);
    }

    #[test]
    fn logout_clears_the_logged_unknown_kinds_set() {
        let mut session = SessionController::new(config());
        session.handle_envelope(Envelope::Unknown("Foo".to_string()), 0);
        assert!(!session.logged_unknown_kinds.is_empty());
        session.logout();
        assert!(session.logged_unknown_kinds.is_empty());
    }
}
