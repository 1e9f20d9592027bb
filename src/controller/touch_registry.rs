//! Registry of the touch contacts currently on the surface
//!
//! The registry is the single owner of contact positions. Controls only ever
//! remember a [`ContactId`] and look positions up through a notification batch
//! or a registry snapshot.

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use super::geometry::Point;

/// Stable identifier of one touch gesture for its whole lifetime
///
/// Opaque to the controls: only equality and hashing are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactId(u64);

impl ContactId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ContactId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One actively touching point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub x: f64,
    pub y: f64,
}

impl Contact {
    pub fn new(id: impl Into<ContactId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Authoritative set of active contacts, keyed by id
#[derive(Debug, Clone, Default)]
pub struct TouchRegistry {
    contacts: HashMap<ContactId, Contact>,
}

impl TouchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new contact or overwrite the position of an existing one
    pub fn upsert(&mut self, id: ContactId, x: f64, y: f64) {
        trace!("Contact {} at ({:.1}, {:.1})", id, x, y);
        self.contacts.insert(id, Contact { id, x, y });
    }

    /// Remove a contact; unknown ids are ignored
    pub fn remove(&mut self, id: ContactId) -> Option<Contact> {
        self.contacts.remove(&id)
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    /// Snapshot iterator over all active contacts, in no particular order
    pub fn all(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}
