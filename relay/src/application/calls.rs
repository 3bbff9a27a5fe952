use std::collections::{HashMap, HashSet};

use signaling::message::UserId;

/// A call that has been offered but not yet answered or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ring {
    pub caller: UserId,
    pub callee: UserId,
}

impl Ring {
    pub fn new(caller: UserId, callee: UserId) -> Self {
        Self { caller, callee }
    }
}

/// Call state kept when call tracking is enabled.
///
/// `T` is the handle of the ring timer; the tracker hands it back whenever a
/// timer has to be cancelled.
#[derive(Debug)]
pub struct CallTracker<T> {
    in_call: HashSet<UserId>,
    ringing: HashMap<Ring, T>,
}

impl<T> Default for CallTracker<T> {
    fn default() -> Self {
        Self {
            in_call: HashSet::new(),
            ringing: HashMap::new(),
        }
    }
}

impl<T> CallTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_call(&self, user: &UserId) -> bool {
        self.in_call.contains(user)
    }

    /// Starts ringing. Returns the timer of an earlier ring between the same
    /// two users, which must be cancelled.
    pub fn ring(&mut self, ring: Ring, timer: T) -> Option<T> {
        self.ringing.insert(ring, timer)
    }

    /// Called when the ring timer fires. Returns `false` if the call was
    /// settled in the meantime.
    pub fn expire(&mut self, ring: &Ring) -> bool {
        self.ringing.remove(ring).is_some()
    }

    /// The callee picked up: both sides are now in a call. An answer that
    /// settles no ring changes nothing.
    pub fn answer(&mut self, ring: &Ring) -> Option<T> {
        let timer = self.ringing.remove(ring)?;
        self.in_call.insert(ring.caller.clone());
        self.in_call.insert(ring.callee.clone());
        Some(timer)
    }

    pub fn reject(&mut self, ring: &Ring) -> Option<T> {
        self.ringing.remove(ring)
    }

    /// Either side hung up. Clears both users and cancels any ring between
    /// them, whichever direction it goes.
    pub fn end(&mut self, a: &UserId, b: &UserId) -> Vec<T> {
        self.in_call.remove(a);
        self.in_call.remove(b);
        self.take_rings(|ring| {
            (&ring.caller == a && &ring.callee == b) || (&ring.caller == b && &ring.callee == a)
        })
    }

    /// Drops everything known about a user who went offline.
    pub fn forget(&mut self, user: &UserId) -> Vec<T> {
        self.in_call.remove(user);
        self.take_rings(|ring| &ring.caller == user || &ring.callee == user)
    }

    fn take_rings<F>(&mut self, matches: F) -> Vec<T>
    where
        F: Fn(&Ring) -> bool,
    {
        let rings: Vec<Ring> = self.ringing.keys().filter(|r| matches(*r)).cloned().collect();
        rings
            .iter()
            .filter_map(|ring| self.ringing.remove(ring))
            .collect()
    }
}
