//! Effuse - DIE: Denizens of the Internet Effusing
//!
//! A multi-user, line-oriented chat server. Clients connect over TCP,
//! log in with a bare display name, join named channels, and drive
//! everything else with slash commands.

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use chat::{dispatch, Channel, ChatState, Outbox, Outgoing, SharedState, User, COMMANDS};
pub use config::Config;
pub use error::{EffuseError, Result};
pub use server::{handle_connection, ChatServer};
