//! Core domain logic for the SecureTodo mobile app.
//! This crate is the single source of truth for task and auth invariants.

pub mod auth;
pub mod clock;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use auth::capability::{
    parse_prompt_error, AuthCapability, CapabilityError, PromptFailure, PromptOptions,
    PromptOutcome,
};
pub use auth::gate::{AuthGate, Gated};
pub use auth::session::{AuthFailure, AuthResult, AuthSession, AuthState, StateListener};
pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{
    default_log_level, init_logging, init_logging_from_env, init_logging_with, logging_status,
    LogConfig,
};
pub use model::todo::{
    normalize_description, normalize_title, TodoId, TodoInput, TodoItem, TodoStatus,
    TodoValidationError,
};
pub use service::todo_service::TodoService;
pub use store::todo_store::{SubscriptionId, TodoCounts, TodoSnapshot, TodoStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
