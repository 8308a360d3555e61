//! In-memory user record store.
//!
//! [`UserStore`] owns the records and the id-assignment state. It has no
//! interior locking; share it as a [`SharedStore`] so that every mutation
//! goes through the write half of a single lock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store, never changed afterwards.
    pub id: u64,
    pub name: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("user {0} not found")]
    NotFound(u64),
}

/// How [`UserStore::create`] picks the id of a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// One past the highest id ever assigned. Ids are never reused.
    #[default]
    Monotonic,
    /// `len() + 1`, recomputed on every insert.
    ///
    /// After a delete this can hand out an id that a live record still
    /// holds. Kept only to reproduce the legacy server's behavior.
    LengthPlusOne,
}

/// The store shared between request handlers.
pub type SharedStore = Arc<RwLock<UserStore>>;

/// An ordered collection of [`User`] records.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Vec<User>,
    /// Highest id ever assigned; never decreases.
    high_water: u64,
    policy: IdPolicy,
}

impl UserStore {
    /// Create an empty store using the default [`IdPolicy::Monotonic`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: IdPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Create a store holding the two startup records, Alice (1) and Bob (2).
    pub fn seeded() -> Self {
        Self::seeded_with_policy(IdPolicy::default())
    }

    pub fn seeded_with_policy(policy: IdPolicy) -> Self {
        let mut store = Self::with_policy(policy);
        store.create("Alice");
        store.create("Bob");
        store
    }

    /// Wrap the store for sharing across connection tasks.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, id: u64) -> Result<&User, Error> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// Append a new record and return it.
    pub fn create(&mut self, name: impl Into<String>) -> User {
        let id = self.next_id();
        self.high_water = self.high_water.max(id);

        let user = User::new(id, name);
        self.users.push(user.clone());
        user
    }

    /// Replace the name of the record with `id`. The id itself is untouched.
    pub fn update(&mut self, id: u64, name: impl Into<String>) -> Result<User, Error> {
        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(Error::NotFound(id))?;

        user.name = name.into();
        Ok(user.clone())
    }

    /// Remove the record with `id`, keeping the order of the others.
    pub fn delete(&mut self, id: u64) -> Result<User, Error> {
        let index = self
            .users
            .iter()
            .position(|user| user.id == id)
            .ok_or(Error::NotFound(id))?;

        Ok(self.users.remove(index))
    }

    fn next_id(&self) -> u64 {
        match self.policy {
            IdPolicy::Monotonic => self.high_water + 1,
            IdPolicy::LengthPlusOne => self.users.len() as u64 + 1,
        }
    }
}
