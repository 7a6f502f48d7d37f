//! Social Controller: Friends, DMs, and Guild. All three share
//! the rule that optimistic local edits are never persisted — the next
//! authoritative list from the server replaces state wholesale.

pub mod chat;
pub mod dm;
pub mod friends;
pub mod guild;

pub use chat::wrap_chat_line;
pub use dm::DmController;
pub use friends::FriendsController;
pub use guild::GuildController;
