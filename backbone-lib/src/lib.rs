//! Client-side online runtime for a real-time, server-authoritative
//! multiplayer skirmish game: session lifecycle, authoritative state
//! reconciliation, matchmaking/room choreography, and the guild/social
//! protocol. The embedding application owns rendering, input capture, and
//! the UI tick that drives [`session::SessionController`].

pub mod config;
pub mod error;
pub mod match_controller;
pub mod pathing;
pub mod session;
pub mod social;
pub mod token_store;
pub mod transport;
pub mod world;

pub use config::{ProfileId, SessionConfig};
pub use session::{RouterEvent, SessionController, SessionState};
