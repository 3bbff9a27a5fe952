use std::collections::HashMap;

use signaling::message::UserId;

/// Which connection each online user is reachable on.
///
/// One entry per user id; registering an id again replaces the previous
/// connection, which stays open but can no longer be addressed.
#[derive(Debug)]
pub struct PresenceRegistry<C> {
    entries: HashMap<UserId, C>,
}

impl<C> Default for PresenceRegistry<C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<C> PresenceRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the connection that was superseded, if any.
    pub fn register(&mut self, user_id: UserId, connection: C) -> Option<C> {
        self.entries.insert(user_id, connection)
    }

    pub fn unregister(&mut self, user_id: &UserId) -> Option<C> {
        self.entries.remove(user_id)
    }

    pub fn resolve(&self, user_id: &UserId) -> Option<&C> {
        self.entries.get(user_id)
    }

    /// Online user ids, sorted.
    pub fn snapshot(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.entries.keys().cloned().collect();
        users.sort();
        users
    }
}
