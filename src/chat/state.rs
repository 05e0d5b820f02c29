//! The shared chat registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::channel::Channel;
use super::user::{Outbox, User};

/// Process-wide chat state: all users, all channels, and the running
/// count of private channels.
///
/// Every session works on the same `ChatState` behind one coarse lock
/// (see [`SharedState`]). Command handlers run to completion inside a
/// single lock acquisition and user writes are non-blocking queue sends,
/// so broadcasts are observed in mutation order.
#[derive(Debug, Default)]
pub struct ChatState {
    /// Active users by name.
    pub users: HashMap<String, User>,
    /// All channels by name. Channels persist after their last member leaves.
    pub channels: HashMap<String, Channel>,
    /// Count of channels with `private == true`.
    pub private_count: usize,
}

/// The chat state as shared by the listener and every connection task.
pub type SharedState = Arc<Mutex<ChatState>>;

impl ChatState {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry behind the shared coarse lock.
    pub fn shared() -> SharedState {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Register a user by name.
    ///
    /// Returns false, mutating nothing, when the name is taken.
    pub fn register_user(&mut self, name: &str, outbox: Outbox) -> bool {
        if self.users.contains_key(name) {
            return false;
        }
        debug!(user = name, "registered");
        self.users.insert(name.to_string(), User::new(name, outbox));
        true
    }

    /// Drop a user from the registry. No-op for unknown names.
    pub fn unregister_user(&mut self, name: &str) {
        if self.users.remove(name).is_some() {
            debug!(user = name, "unregistered");
        }
    }

    /// Fetch a channel, creating it with `creator` as sole op if absent.
    pub fn get_or_create_channel(
        &mut self,
        name: &str,
        creator: &str,
        topic: &str,
    ) -> &mut Channel {
        self.channels
            .entry(name.to_string())
            .or_insert_with(|| Channel::new(name, creator, topic))
    }

    /// All non-private channels as `(name, member count)`, name-sorted
    /// for a stable listing.
    pub fn public_channels(&self) -> Vec<(String, usize)> {
        let mut rooms: Vec<(String, usize)> = self
            .channels
            .values()
            .filter(|c| !c.private)
            .map(|c| (c.name.clone(), c.users.len()))
            .collect();
        rooms.sort();
        rooms
    }

    /// Queue a line for the named user, if registered.
    pub fn write_to(&self, name: &str, line: impl Into<String>) {
        if let Some(user) = self.users.get(name) {
            user.write(line);
        }
    }

    /// Part the user from every channel on their stack, newest first,
    /// broadcasting a leave notice for each.
    ///
    /// The user's focus is left in place while the notices go out, so
    /// they see the departure from their own focused channel, then
    /// cleared at the end.
    pub fn remove_from_all_channels(&mut self, name: &str, message: &str) {
        let mut stack = match self.users.get_mut(name) {
            Some(user) => std::mem::take(&mut user.channels),
            None => return,
        };
        while let Some(channel_name) = stack.pop() {
            if let Some(channel) = self.channels.get_mut(&channel_name) {
                channel.part(name, message, &self.users);
            }
        }
        if let Some(user) = self.users.get_mut(name) {
            user.current = None;
        }
    }

    /// Connection-loss cleanup: the same teardown as `/quit` minus the
    /// BYE courtesy line. Idempotent, and a no-op for names that never
    /// finished login.
    pub fn disconnect_cleanup(&mut self, name: &str) {
        self.remove_from_all_channels(name, "");
        self.unregister_user(name);
    }
}
