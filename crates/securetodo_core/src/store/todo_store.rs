//! Todo store with snapshot-on-write semantics.
//!
//! # Responsibility
//! - Create, update, delete and toggle todos with normalized input.
//! - Expose the current ordered sequence as a versioned, shareable snapshot.
//! - Notify subscribers synchronously after each effective mutation.
//!
//! # Invariants
//! - Ids are unique among live todos.
//! - A mutation never edits a published snapshot; it publishes a new one.
//! - `updated_at` never decreases for the same todo, even if the clock does.
//! - No-op calls (blank title, unknown id) publish nothing.

use crate::clock::Clock;
use crate::model::todo::{normalize_description, normalize_title, TodoId, TodoInput, TodoItem};
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Immutable view of the collection at one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoSnapshot {
    version: u64,
    items: Arc<[TodoItem]>,
}

impl TodoSnapshot {
    fn new(version: u64, items: Vec<TodoItem>) -> Self {
        Self {
            version,
            items: Arc::from(items),
        }
    }

    /// Monotonic counter bumped once per effective mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Todos in store order (newest first).
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Whether both snapshots share the same published collection.
    pub fn same_as(&self, other: &TodoSnapshot) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

/// Aggregate counts for list headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoCounts {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&TodoSnapshot) + Send + Sync>;

/// Sole owner and mutator of the todo collection.
pub struct TodoStore {
    clock: Arc<dyn Clock>,
    snapshot: TodoSnapshot,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl TodoStore {
    /// Creates an empty store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            snapshot: TodoSnapshot::new(0, Vec::new()),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Creates a store seeded with existing todos, kept in the given order.
    ///
    /// Invalid records and repeated ids are dropped.
    pub fn with_initial(clock: Arc<dyn Clock>, items: Vec<TodoItem>) -> Self {
        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(items.len());
        for item in items {
            if let Err(err) = item.validate() {
                warn!(
                    "event=todo_seed module=store status=skipped todo_id={} reason={}",
                    item.id, err
                );
                continue;
            }
            if !seen.insert(item.id) {
                warn!(
                    "event=todo_seed module=store status=skipped todo_id={} reason=duplicate_id",
                    item.id
                );
                continue;
            }
            accepted.push(item);
        }

        let mut store = Self::new(clock);
        store.snapshot = TodoSnapshot::new(0, accepted);
        store
    }

    /// Creates a todo at the front of the collection.
    ///
    /// Returns `None` without touching state when the title is blank.
    pub fn add_todo(&mut self, input: &TodoInput) -> Option<TodoId> {
        let id = self.allocate_id();
        let now = self.clock.now_epoch_ms();
        let Some(item) = TodoItem::create(id, input, now) else {
            debug!("event=todo_add module=store status=rejected reason=blank_title");
            return None;
        };

        let mut next = Vec::with_capacity(self.snapshot.items.len() + 1);
        next.push(item);
        next.extend(self.snapshot.items.iter().cloned());
        self.publish(next);

        debug!("event=todo_add module=store status=ok todo_id={id}");
        Some(id)
    }

    /// Replaces title and description of an existing todo.
    ///
    /// Status is left untouched. Returns `false` for an unknown id or a
    /// blank title.
    pub fn update_todo(&mut self, id: TodoId, input: &TodoInput) -> bool {
        let Some(title) = normalize_title(&input.title) else {
            debug!("event=todo_update module=store status=rejected todo_id={id} reason=blank_title");
            return false;
        };
        let description = normalize_description(input.description.as_deref());

        self.modify(id, "todo_update", |item, now| {
            item.title = title;
            item.description = description;
            item.updated_at = now;
        })
    }

    /// Removes the todo with the given id. Returns `false` if absent.
    pub fn delete_todo(&mut self, id: TodoId) -> bool {
        if self.get(id).is_none() {
            debug!("event=todo_delete module=store status=not_found todo_id={id}");
            return false;
        }

        let next = self
            .snapshot
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.publish(next);

        debug!("event=todo_delete module=store status=ok todo_id={id}");
        true
    }

    /// Flips pending/completed. Returns `false` if absent.
    pub fn toggle_todo_status(&mut self, id: TodoId) -> bool {
        self.modify(id, "todo_toggle", |item, now| {
            item.status = item.status.toggled();
            item.updated_at = now;
        })
    }

    /// Current published snapshot.
    pub fn snapshot(&self) -> TodoSnapshot {
        self.snapshot.clone()
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.snapshot.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.snapshot.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.items.is_empty()
    }

    /// Pending todos in store order.
    pub fn pending(&self) -> Vec<&TodoItem> {
        self.snapshot
            .items
            .iter()
            .filter(|item| !item.is_completed())
            .collect()
    }

    /// Completed todos in store order.
    pub fn completed(&self) -> Vec<&TodoItem> {
        self.snapshot
            .items
            .iter()
            .filter(|item| item.is_completed())
            .collect()
    }

    pub fn counts(&self) -> TodoCounts {
        let completed = self
            .snapshot
            .items
            .iter()
            .filter(|item| item.is_completed())
            .count();
        TodoCounts {
            total: self.len(),
            pending: self.len() - completed,
            completed,
        }
    }

    /// Registers a listener called with every newly published snapshot.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&TodoSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn allocate_id(&self) -> TodoId {
        loop {
            let candidate = Uuid::new_v4();
            if self.get(candidate).is_none() {
                return candidate;
            }
        }
    }

    fn modify(
        &mut self,
        id: TodoId,
        event: &'static str,
        apply: impl FnOnce(&mut TodoItem, i64),
    ) -> bool {
        let Some(position) = self.snapshot.items.iter().position(|item| item.id == id) else {
            debug!("event={event} module=store status=not_found todo_id={id}");
            return false;
        };

        let mut next = self.snapshot.items.to_vec();
        let item = &mut next[position];
        let now = self.clock.now_epoch_ms().max(item.updated_at);
        apply(item, now);
        debug!(
            "event={event} module=store status=ok todo_id={id} todo_status={}",
            item.status
        );
        self.publish(next);
        true
    }

    fn publish(&mut self, items: Vec<TodoItem>) {
        self.snapshot = TodoSnapshot::new(self.snapshot.version + 1, items);
        for (_, listener) in &self.listeners {
            listener(&self.snapshot);
        }
    }
}
