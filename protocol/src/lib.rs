//! Wire protocol shared between the client runtime and the game server.
//!
//! Every frame on the wire is a JSON object `{ "type": <string>, "data": <object> }`.
//! This crate owns the `type` registry (via [`Envelope`]), the payload shapes carried
//! in `data`, and the typed outbound commands the client may send.

pub mod envelope;
pub mod outbound;
pub mod types;

pub use envelope::Envelope;
pub use outbound::OutboundMessage;
