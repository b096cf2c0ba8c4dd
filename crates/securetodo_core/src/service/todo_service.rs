//! Gated todo use-case service.
//!
//! # Responsibility
//! - Expose the only mutation surface reachable from UI code paths.
//! - Route every mutation through `AuthGate::with_auth`.
//!
//! # Invariants
//! - Store mutators are never called before authentication succeeds.
//! - Reads are not gated.

use crate::auth::capability::{AuthCapability, PromptOptions};
use crate::auth::gate::{AuthGate, Gated};
use crate::auth::session::{AuthResult, AuthSession, AuthState};
use crate::clock::Clock;
use crate::model::todo::{TodoId, TodoInput, TodoItem};
use crate::store::todo_store::{SubscriptionId, TodoCounts, TodoSnapshot, TodoStore};
use std::sync::Arc;

/// Todo store behind an auth gate.
pub struct TodoService<C> {
    store: TodoStore,
    gate: AuthGate<C>,
}

impl<C: AuthCapability> TodoService<C> {
    pub fn new(clock: Arc<dyn Clock>, capability: C) -> Self {
        Self::from_parts(TodoStore::new(clock), AuthGate::new(capability))
    }

    pub fn with_options(clock: Arc<dyn Clock>, capability: C, options: PromptOptions) -> Self {
        Self::from_parts(
            TodoStore::new(clock),
            AuthGate::with_options(capability, options),
        )
    }

    pub fn from_parts(store: TodoStore, gate: AuthGate<C>) -> Self {
        Self { store, gate }
    }

    /// Creates a todo. `Performed(None)` means the title was blank.
    pub async fn add_todo(&mut self, input: &TodoInput) -> Gated<Option<TodoId>> {
        self.gate.with_auth(|| self.store.add_todo(input)).await
    }

    /// Edits a todo. `Performed(false)` means unknown id or blank title.
    pub async fn update_todo(&mut self, id: TodoId, input: &TodoInput) -> Gated<bool> {
        self.gate
            .with_auth(|| self.store.update_todo(id, input))
            .await
    }

    pub async fn delete_todo(&mut self, id: TodoId) -> Gated<bool> {
        self.gate.with_auth(|| self.store.delete_todo(id)).await
    }

    pub async fn toggle_todo_status(&mut self, id: TodoId) -> Gated<bool> {
        self.gate
            .with_auth(|| self.store.toggle_todo_status(id))
            .await
    }

    /// Explicit unlock, e.g. from a splash screen.
    ///
    /// # Errors
    /// Returns the failure of this attempt.
    pub async fn authenticate(&mut self) -> AuthResult {
        self.gate.authenticate().await
    }

    pub fn logout(&mut self) {
        self.gate.reset();
    }

    pub fn auth_state(&self) -> AuthState {
        self.gate.state()
    }

    pub fn is_trusted(&self) -> bool {
        self.gate.session().is_trusted()
    }

    /// Registers a listener for auth session transitions, including `Pending`.
    pub fn observe_auth(&mut self, listener: impl Fn(&AuthSession) + Send + Sync + 'static) {
        self.gate.set_state_listener(listener);
    }

    pub fn gate(&self) -> &AuthGate<C> {
        &self.gate
    }

    pub fn snapshot(&self) -> TodoSnapshot {
        self.store.snapshot()
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.store.get(id)
    }

    pub fn counts(&self) -> TodoCounts {
        self.store.counts()
    }

    pub fn subscribe(
        &mut self,
        listener: impl Fn(&TodoSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }
}
