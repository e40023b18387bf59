//! Engine for a Mafia/Werewolf party game played over a chat transport.
//!
//! The crate owns the game itself: lobby registration, role dealing, the
//! phase machine, night-action resolution, timed discussion turns, vote
//! tabulation, and the win check. Everything outward goes through the
//! [`notifier::Notifier`] trait; the transport that renders messages and
//! maps identities to channels lives outside this crate.

pub mod error;
pub mod models;
pub mod notifier;
pub mod services;
pub mod state;

pub use error::GameError;
pub use state::AppState;
