//! In-memory entity store
//!
//! Records live in a single `DashMap` keyed by [`EntityKey`]. Messages are the
//! only unbounded stream, so they are additionally tracked in insertion order
//! and the oldest are dropped once the cache holds more than its capacity.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::entities::{Entity, EntityKey, EntityKind};
use crate::traits::EntityStore;
use crate::value_objects::Snowflake;

/// Default number of messages retained
pub const DEFAULT_MESSAGE_CAPACITY: usize = 1000;

/// Concurrent in-memory [`EntityStore`]
pub struct MemoryEntityStore {
    entities: DashMap<EntityKey, Entity>,
    message_order: Mutex<VecDeque<Snowflake>>,
    message_capacity: usize,
}

impl MemoryEntityStore {
    /// Create a store retaining at most `message_capacity` messages
    #[must_use]
    pub fn new(message_capacity: usize) -> Self {
        Self {
            entities: DashMap::new(),
            message_order: Mutex::new(VecDeque::new()),
            message_capacity,
        }
    }

    /// Create a store wrapped in Arc
    #[must_use]
    pub fn new_shared(message_capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(message_capacity))
    }

    /// Total number of cached records
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of cached messages
    pub fn message_count(&self) -> usize {
        self.message_order.lock().len()
    }

    fn track_message(&self, id: Snowflake) {
        let evicted: Vec<Snowflake> = {
            let mut order = self.message_order.lock();
            order.push_back(id);
            let excess = order.len().saturating_sub(self.message_capacity);
            order.drain(..excess).collect()
        };

        for old in evicted {
            self.entities.remove(&EntityKey::Message(old));
            tracing::trace!(message_id = %old, "Message evicted from cache");
        }
    }
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_CAPACITY)
    }
}

impl EntityStore for MemoryEntityStore {
    fn get(&self, key: &EntityKey) -> Option<Entity> {
        self.entities.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, entity: Entity) {
        let key = entity.key();
        let is_new = self.entities.insert(key, entity).is_none();

        if let (true, EntityKey::Message(id)) = (is_new, key) {
            self.track_message(id);
        }
    }

    fn remove(&self, key: &EntityKey) -> Option<Entity> {
        let removed = self.entities.remove(key).map(|(_, entity)| entity);

        if let (Some(_), EntityKey::Message(id)) = (&removed, key) {
            self.message_order.lock().retain(|m| m != id);
        }

        removed
    }

    fn list(&self, kind: EntityKind) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|entry| entry.key().kind() == kind)
            .map(|entry| entry.value().clone())
            .collect()
    }
}
