//! Core use-case services.
//!
//! # Responsibility
//! - Compose store and auth gate into UI-facing use cases.
//! - Keep FFI/UI layers decoupled from store internals.

pub mod todo_service;
