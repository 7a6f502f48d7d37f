//! Shared error taxonomy. Each public-facing failure mode gets its
//! own `thiserror` variant rather than a single catch-all string, so callers
//! can match on cause instead of grepping messages.

use thiserror::Error;

/// Failures that can occur while dialing the server.
#[derive(Debug, Error)]
pub enum DialError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("handshake timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("websocket handshake failed: {0}")]
    Handshake(String),
    #[error("no saved token")]
    NoToken,
}

/// Failures surfaced by an already-established [`crate::transport::Transport`].
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,
    #[error("write failed: {0}")]
    Write(String),
    #[error("read failed: {0}")]
    Read(String),
}

/// Failures reading or writing the persisted bearer token.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("could not determine profile directory")]
    NoProfileDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Guild actions rejected locally before any network call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuildActionError {
    #[error("a leader cannot leave while other members remain; transfer leadership first")]
    LeaderMustTransferBeforeLeaving,
    #[error("only the leader may transfer leadership")]
    OnlyLeaderMayTransfer,
    #[error("only the leader may disband the guild")]
    OnlyLeaderMayDisband,
    #[error("members have no permission to perform this action")]
    MembersHaveNoPermission,
    #[error("officers may only act on members, not officers or the leader")]
    OfficersActOnMembersOnly,
    #[error("cannot target yourself")]
    CannotTargetSelf,
    #[error("no such member in the roster")]
    UnknownMember,
}
