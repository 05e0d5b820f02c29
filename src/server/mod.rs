//! TCP transport: the accept loop and per-connection protocol driver.

pub mod connection;
pub mod listener;

pub use connection::handle_connection;
pub use listener::ChatServer;
