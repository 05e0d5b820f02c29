//! The in-memory chat model: users, channels, the shared registry, and
//! the slash-command dispatcher that drives all three.

pub mod channel;
pub mod command;
pub mod state;
pub mod user;

pub use channel::Channel;
pub use command::{dispatch, CommandSpec, Param, COMMANDS};
pub use state::{ChatState, SharedState};
pub use user::{Outbox, Outgoing, User};
