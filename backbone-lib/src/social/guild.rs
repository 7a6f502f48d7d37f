//! Guild sub-module: roster + chat, presence diffing into
//! synthetic system chat lines, and permissioned membership actions.

use std::time::{Duration, Instant};

use protocol::types::{ChatMessageWire, GuildInfoPayload, GuildMemberWire};
use protocol::OutboundMessage;

use crate::error::GuildActionError;

const ROSTER_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
const CHAT_CACHE_LIMIT: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Leader,
    Officer,
    Member,
}

impl Role {
    fn from_wire(s: &str) -> Role {
        match s {
            "leader" => Role::Leader,
            "officer" => Role::Officer,
            _ => Role::Member,
        }
    }
}

pub struct GuildController {
    pub info: Option<GuildInfoPayload>,
    pub chat: Vec<ChatMessageWire>,
    previous_roster: Option<Vec<GuildMemberWire>>,
    local_name: String,
    last_refresh: Option<Instant>,
}

impl GuildController {
    pub fn new(local_name: impl Into<String>) -> Self {
        GuildController {
            info: None,
            chat: Vec::new(),
            previous_roster: None,
            local_name: local_name.into(),
            last_refresh: None,
        }
    }

    pub fn enter_view(&mut self) -> OutboundMessage {
        OutboundMessage::GetGuild
    }

    /// Call once per tick while on the Guild view; re-fetches the roster
    /// every 5s.
    pub fn tick(&mut self, view_active: bool) -> Option<OutboundMessage> {
        if !view_active {
            self.last_refresh = None;
            return None;
        }
        let now = Instant::now();
        let due = match self.last_refresh {
            None => true,
            Some(last) => now.duration_since(last) >= ROSTER_REFRESH_INTERVAL,
        };
        if due {
            self.last_refresh = Some(now);
            Some(OutboundMessage::GetGuild)
        } else {
            None
        }
    }

    /// Applies an authoritative `GuildInfo`, diffing against the previous
    /// snapshot to synthesize local system chat lines. Diffing
    /// only ever compares against the immediately previous snapshot, so
    /// rapid re-refreshes without change never re-synthesize a line.
    pub fn apply_guild_info(&mut self, info: GuildInfoPayload, now_ms: i64) {
        let new_roster = info.members.clone();
        if let Some(previous) = &self.previous_roster {
            let lines = diff_roster(previous, &new_roster, now_ms);
            self.chat.extend(lines);
            if self.chat.len() > CHAT_CACHE_LIMIT {
                let overflow = self.chat.len() - CHAT_CACHE_LIMIT;
                self.chat.drain(0..overflow);
            }
        }
        self.previous_roster = Some(new_roster);
        self.info = Some(info);
    }

    pub fn apply_chat_backlog(&mut self, messages: Vec<ChatMessageWire>) {
        self.chat = messages;
        if self.chat.len() > CHAT_CACHE_LIMIT {
            let overflow = self.chat.len() - CHAT_CACHE_LIMIT;
            self.chat.drain(0..overflow);
        }
    }

    pub fn apply_live_chat(&mut self, message: ChatMessageWire) {
        self.chat.push(message);
        if self.chat.len() > CHAT_CACHE_LIMIT {
            self.chat.remove(0);
        }
    }

    fn local_role(&self) -> Option<Role> {
        self.info.as_ref().and_then(|info| {
            info.members
                .iter()
                .find(|m| m.name == self.local_name)
                .map(|m| Role::from_wire(&m.role))
        })
    }

    fn role_of(&self, name: &str) -> Option<Role> {
        self.info.as_ref().and_then(|info| {
            info.members
                .iter()
                .find(|m| m.name == name)
                .map(|m| Role::from_wire(&m.role))
        })
    }

    fn other_members_count(&self) -> usize {
        self.info
            .as_ref()
            .map(|info| info.members.iter().filter(|m| m.name != self.local_name).count())
            .unwrap_or(0)
    }

    pub fn send_chat(&self, text: String) -> OutboundMessage {
        OutboundMessage::GuildChatSend { text }
    }

    /// Leader-only, disallowed while other members remain.
    pub fn leave(&self) -> Result<OutboundMessage, GuildActionError> {
        if self.local_role() == Some(Role::Leader) && self.other_members_count() > 0 {
            return Err(GuildActionError::LeaderMustTransferBeforeLeaving);
        }
        Ok(OutboundMessage::LeaveGuild)
    }

    pub fn promote(&self, name: &str) -> Result<OutboundMessage, GuildActionError> {
        self.check_promote_or_kick(name)?;
        Ok(OutboundMessage::PromoteMember {
            name: name.to_string(),
        })
    }

    pub fn demote(&self, name: &str) -> Result<OutboundMessage, GuildActionError> {
        match self.local_role() {
            Some(Role::Leader) => {}
            Some(Role::Officer) => return Err(GuildActionError::OfficersActOnMembersOnly),
            _ => return Err(GuildActionError::MembersHaveNoPermission),
        }
        self.require_known_non_self(name)?;
        Ok(OutboundMessage::DemoteMember {
            name: name.to_string(),
        })
    }

    pub fn kick(&self, name: &str) -> Result<OutboundMessage, GuildActionError> {
        self.check_promote_or_kick(name)?;
        Ok(OutboundMessage::KickMember {
            name: name.to_string(),
        })
    }

    pub fn transfer_leader(&self, name: &str) -> Result<OutboundMessage, GuildActionError> {
        if self.local_role() != Some(Role::Leader) {
            return Err(GuildActionError::OnlyLeaderMayTransfer);
        }
        self.require_known_non_self(name)?;
        Ok(OutboundMessage::TransferLeader {
            name: name.to_string(),
        })
    }

    pub fn disband(&self) -> Result<OutboundMessage, GuildActionError> {
        if self.local_role() != Some(Role::Leader) {
            return Err(GuildActionError::OnlyLeaderMayDisband);
        }
        Ok(OutboundMessage::DisbandGuild)
    }

    fn require_known_non_self(&self, name: &str) -> Result<(), GuildActionError> {
        if name == self.local_name {
            return Err(GuildActionError::CannotTargetSelf);
        }
        if self.role_of(name).is_none() {
            return Err(GuildActionError::UnknownMember);
        }
        Ok(())
    }

    /// Promote/kick share the same permission shape: leader acts on anyone
    /// but self, officer acts on members only.
    fn check_promote_or_kick(&self, name: &str) -> Result<(), GuildActionError> {
        self.require_known_non_self(name)?;
        match self.local_role() {
            Some(Role::Leader) => Ok(()),
            Some(Role::Officer) => {
                if self.role_of(name) == Some(Role::Member) {
                    Ok(())
                } else {
                    Err(GuildActionError::OfficersActOnMembersOnly)
                }
            }
            _ => Err(GuildActionError::MembersHaveNoPermission),
        }
    }
}

fn diff_roster(
    previous: &[GuildMemberWire],
    current: &[GuildMemberWire],
    now_ms: i64,
) -> Vec<ChatMessageWire> {
    let mut lines = Vec::new();

    let prev_leader = previous.iter().find(|m| m.role == "leader").map(|m| m.name.clone());
    let curr_leader = current.iter().find(|m| m.role == "leader").map(|m| m.name.clone());

    for m in current {
        let was_present = previous.iter().any(|p| p.name == m.name);
        if !was_present {
            lines.push(system_line(format!("{} joined the guild", m.name), now_ms));
            continue;
        }
        let prev_role = previous
            .iter()
            .find(|p| p.name == m.name)
            .map(|p| Role::from_wire(&p.role));
        let curr_role = Role::from_wire(&m.role);
        if let Some(prev_role) = prev_role {
            if prev_role != curr_role && rank(prev_role) != rank(curr_role) {
                if rank(curr_role) > rank(prev_role) {
                    lines.push(system_line(
                        format!("{} promoted to {}", m.name, role_label(curr_role)),
                        now_ms,
                    ));
                } else {
                    lines.push(system_line(
                        format!("{} demoted to {}", m.name, role_label(curr_role)),
                        now_ms,
                    ));
                }
            }
        }
    }

    for p in previous {
        if !current.iter().any(|m| m.name == p.name) {
            lines.push(system_line(format!("{} left the guild", p.name), now_ms));
        }
    }

    if let (Some(prev_leader), Some(curr_leader)) = (prev_leader, curr_leader) {
        if prev_leader != curr_leader {
            lines.push(system_line(
                format!("leadership transferred to {curr_leader}"),
                now_ms,
            ));
        }
    }

    lines
}

fn rank(role: Role) -> u8 {
    match role {
        Role::Member => 0,
        Role::Officer => 1,
        Role::Leader => 2,
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Leader => "leader",
        Role::Officer => "officer",
        Role::Member => "member",
    }
}

fn system_line(text: String, now_ms: i64) -> ChatMessageWire {
    ChatMessageWire {
        from: "system".to_string(),
        text,
        ts: now_ms,
        system: true,
    }
}
