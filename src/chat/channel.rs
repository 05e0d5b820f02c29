//! Chat channels.

use std::collections::HashMap;

use super::user::User;

/// A named chat room.
///
/// Channels are created implicitly by the first `/join` naming them and
/// are never destroyed, even once empty. Broadcasts reach exactly the
/// members whose focus (`User::current`) is this channel; that focus
/// gate is the single message-routing rule in the system.
#[derive(Debug)]
pub struct Channel {
    /// Unique channel name.
    pub name: String,
    /// Topic, settable by operators.
    pub topic: String,
    /// Member names, in join order.
    pub users: Vec<String>,
    /// Operator names. Not pruned when an op leaves the channel.
    pub ops: Vec<String>,
    /// Private channels are left out of the public room listing.
    pub private: bool,
    /// Access token; empty means unprotected.
    pub token: String,
}

impl Channel {
    /// Create a channel with its creator as sole initial operator.
    pub fn new(
        name: impl Into<String>,
        creator: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            topic: topic.into(),
            users: Vec::new(),
            ops: vec![creator.into()],
            private: false,
            token: String::new(),
        }
    }

    /// Whether `name` is a member.
    pub fn is_member(&self, name: &str) -> bool {
        self.users.iter().any(|u| u == name)
    }

    /// Whether `name` holds op rights.
    pub fn is_op(&self, name: &str) -> bool {
        self.ops.iter().any(|o| o == name)
    }

    /// Add a user to the channel.
    ///
    /// Joining a channel you are already in succeeds as a no-op. A
    /// protected channel rejects the join (with an explanatory line to
    /// the user) unless the user's cached token for this channel name
    /// matches. On a fresh join the user gets the topic line, if any.
    pub fn join(&mut self, user: &mut User) -> bool {
        if self.is_member(&user.name) {
            return true;
        }
        if !self.token.is_empty() && user.tokens.get(&self.name) != Some(&self.token) {
            user.write(
                "This room is protected, and you lack the necessary authentication token.",
            );
            return false;
        }
        self.users.push(user.name.clone());
        if !self.topic.is_empty() {
            user.write(format!(
                "Welcome to {}. Today's topic: {}",
                self.name, self.topic
            ));
        }
        true
    }

    /// Remove a user, announcing the departure to focused members first.
    ///
    /// The leaver still counts as a focused member during the broadcast,
    /// so they see their own leave notice. The caller owns the rest of
    /// the bookkeeping: dropping the channel from the user's stack and
    /// refocusing them.
    pub fn part(&mut self, name: &str, message: &str, users: &HashMap<String, User>) {
        self.write(
            &format!("User {name} has left (\"{message}\")"),
            users,
        );
        self.users.retain(|u| u != name);
    }

    /// Broadcast a chat line from a member.
    pub fn chat(&self, name: &str, message: &str, users: &HashMap<String, User>) {
        self.write(&format!("{name}: {message}"), users);
    }

    /// Deliver a line to every member currently focused on this channel.
    pub fn write(&self, message: &str, users: &HashMap<String, User>) {
        for member in &self.users {
            if let Some(user) = users.get(member) {
                if user.current.as_deref() == Some(self.name.as_str()) {
                    user.write(message);
                }
            }
        }
    }
}
