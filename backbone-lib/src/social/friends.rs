//! Friends sub-module. The authoritative friends list always
//! replaces local state; the only thing held locally between refreshes is
//! the add-by-name search flow and the sort mode.

use std::time::{Duration, Instant};

use protocol::types::FriendEntryWire;
use protocol::OutboundMessage;

const PRESENCE_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortMode {
    ByName,
    OnlineFirstThenName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Pending(String),
    NotFound(String),
}

pub struct FriendsController {
    pub friends: Vec<FriendEntryWire>,
    pub sort_mode: SortMode,
    pub search: SearchState,
    view_active: bool,
    last_refresh: Option<Instant>,
}

impl Default for FriendsController {
    fn default() -> Self {
        FriendsController::new()
    }
}

impl FriendsController {
    pub fn new() -> Self {
        FriendsController {
            friends: Vec::new(),
            sort_mode: SortMode::ByName,
            search: SearchState::Idle,
            view_active: false,
            last_refresh: None,
        }
    }

    /// Replaces the list wholesale from an authoritative `Friends` frame.
    pub fn apply_friends(&mut self, friends: Vec<FriendEntryWire>) {
        self.friends = friends;
    }

    /// First step of adding a friend: look the name up.
    pub fn begin_add_by_name(&mut self, name: String) -> OutboundMessage {
        self.search = SearchState::Pending(name.clone());
        OutboundMessage::GetUserProfile { name }
    }

    /// Called when the corresponding `UserProfile` reply arrives. On success,
    /// issues `AddFriend` and clears the search field; on failure the caller
    /// should render "user not found".
    pub fn on_user_profile_reply(&mut self, name: &str, found: bool) -> Option<OutboundMessage> {
        let SearchState::Pending(pending) = &self.search else {
            return None;
        };
        if pending != name {
            return None;
        }
        if found {
            self.search = SearchState::Idle;
            Some(OutboundMessage::AddFriend {
                name: name.to_string(),
            })
        } else {
            self.search = SearchState::NotFound(name.to_string());
            None
        }
    }

    pub fn remove_friend(&mut self, name: String) -> OutboundMessage {
        OutboundMessage::RemoveFriend { name }
    }

    /// Call once per tick while the Friends view is active; returns a refresh
    /// request if 5s have elapsed since the last one.
    pub fn tick(&mut self, view_active: bool) -> Option<OutboundMessage> {
        self.view_active = view_active;
        if !view_active {
            self.last_refresh = None;
            return None;
        }
        let now = Instant::now();
        let due = match self.last_refresh {
            None => true,
            Some(last) => now.duration_since(last) >= PRESENCE_REFRESH_INTERVAL,
        };
        if due {
            self.last_refresh = Some(now);
            Some(OutboundMessage::GetFriends)
        } else {
            None
        }
    }

    /// Friends sorted per the active sort mode.
    pub fn sorted(&self) -> Vec<&FriendEntryWire> {
        let mut entries: Vec<&FriendEntryWire> = self.friends.iter().collect();
        match self.sort_mode {
            SortMode::ByName => entries.sort_by(|a, b| a.name.cmp(&b.name)),
            SortMode::OnlineFirstThenName => entries.sort_by(|a, b| {
                b.online
                    .cmp(&a.online)
                    .then_with(|| a.name.cmp(&b.name))
            }),
        }
        entries
    }
}
