//! Connected users.

use std::collections::HashMap;

use tokio::sync::mpsc;

/// A message queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// A text line to send to the client.
    Line(String),
    /// Flush and close the connection.
    Close,
}

/// Sender half of a connection's outgoing queue.
pub type Outbox = mpsc::UnboundedSender<Outgoing>;

/// A logged-in user.
///
/// Created on successful login, removed from the registry when the
/// connection goes away. `channels` is the stack of joined channel names,
/// oldest first; `current` is the one channel whose traffic this user
/// sends and receives. An empty stack means the user is in no room.
#[derive(Debug)]
pub struct User {
    /// Unique display name, fixed at login.
    pub name: String,
    /// Outgoing line queue for this user's connection.
    outbox: Outbox,
    /// Stack of joined channel names, oldest first.
    pub channels: Vec<String>,
    /// The focused channel, if any.
    pub current: Option<String>,
    /// Last token granted per channel name.
    pub tokens: HashMap<String, String>,
}

impl User {
    /// Create a new user bound to a connection outbox.
    pub fn new(name: impl Into<String>, outbox: Outbox) -> Self {
        Self {
            name: name.into(),
            outbox,
            channels: Vec::new(),
            current: None,
            tokens: HashMap::new(),
        }
    }

    /// Queue a line for this user.
    ///
    /// Sends to a closed connection are dropped; the cleanup path will
    /// remove the user shortly anyway.
    pub fn write(&self, line: impl Into<String>) {
        let _ = self.outbox.send(Outgoing::Line(line.into()));
    }

    /// Ask the connection to close after flushing queued lines.
    pub fn close(&self) {
        let _ = self.outbox.send(Outgoing::Close);
    }

    /// Whether this user has a channel name on their joined stack.
    pub fn has_joined(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }
}
