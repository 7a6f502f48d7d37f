//! Direct-message sub-module. One scrollback + scroll offset per
//! peer; history is always re-fetched wholesale from the server rather than
//! optimistically appended.

use std::collections::HashMap;

use protocol::types::ChatMessageWire;
use protocol::OutboundMessage;

const HISTORY_LIMIT: u32 = 50;

#[derive(Default)]
struct DmSession {
    messages: Vec<ChatMessageWire>,
    scroll_offset: f32,
}

#[derive(Default)]
pub struct DmController {
    sessions: HashMap<String, DmSession>,
}

impl DmController {
    pub fn new() -> Self {
        DmController::default()
    }

    /// Opens (or re-opens) a DM session with `peer`.
    pub fn open(&mut self, peer: &str) -> OutboundMessage {
        self.sessions.entry(peer.to_string()).or_default();
        OutboundMessage::GetFriendHistory {
            with: peer.to_string(),
            limit: HISTORY_LIMIT,
        }
    }

    /// Applies an authoritative `FriendHistory` reply.
    pub fn apply_history(&mut self, with: String, messages: Vec<ChatMessageWire>) {
        let session = self.sessions.entry(with).or_default();
        session.messages = messages;
    }

    /// Sends a DM and immediately re-requests history for display.
    pub fn send(&mut self, to: &str, text: String) -> (OutboundMessage, OutboundMessage) {
        self.sessions.entry(to.to_string()).or_default();
        (
            OutboundMessage::SendFriendDM {
                to: to.to_string(),
                text,
            },
            OutboundMessage::GetFriendHistory {
                with: to.to_string(),
                limit: HISTORY_LIMIT,
            },
        )
    }

    /// A live `FriendDM` push (inbound out-of-band of history refresh).
    pub fn apply_live_message(&mut self, from: String, text: String, ts: i64) {
        let session = self.sessions.entry(from.clone()).or_default();
        session.messages.push(ChatMessageWire {
            from,
            text,
            ts,
            system: false,
        });
    }

    pub fn messages(&self, peer: &str) -> &[ChatMessageWire] {
        self.sessions
            .get(peer)
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn scroll_offset(&self, peer: &str) -> f32 {
        self.sessions.get(peer).map(|s| s.scroll_offset).unwrap_or(0.0)
    }

    pub fn set_scroll_offset(&mut self, peer: &str, offset: f32) {
        self.sessions.entry(peer.to_string()).or_default().scroll_offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_requests_history_with_correct_limit() {
        let mut dm = DmController::new();
        let msg = dm.open("bob");
        assert!(matches!(
            msg,
            OutboundMessage::GetFriendHistory { with, limit } if with == "bob" && limit == HISTORY_LIMIT
        ));
    }

    #[test]
    fn send_also_requests_history_refresh() {
        let mut dm = DmController::new();
        let (send, refresh) = dm.send("bob", "hi".to_string());
        assert!(matches!(send, OutboundMessage::SendFriendDM { .. }));
        assert!(matches!(refresh, OutboundMessage::GetFriendHistory { .. }));
    }

    #[test]
    fn history_replaces_session_wholesale() {
        let mut dm = DmController::new();
        dm.apply_live_message("bob".to_string(), "hey".to_string(), 1);
        assert_eq!(dm.messages("bob").len(), 1);
        dm.apply_history("bob".to_string(), vec![]);
        assert!(dm.messages("bob").is_empty());
    }

    #[test]
    fn scroll_offset_is_per_peer() {
        let mut dm = DmController::new();
        dm.set_scroll_offset("bob", 42.0);
        dm.set_scroll_offset("amy", 7.0);
        assert_eq!(dm.scroll_offset("bob"), 42.0);
        assert_eq!(dm.scroll_offset("amy"), 7.0);
    }
}
