//! In-memory todo storage.
//!
//! # Responsibility
//! - Own the ordered todo collection for the process lifetime.
//! - Publish immutable snapshots to observers after every effective mutation.
//!
//! # Invariants
//! - Newest todos come first.
//! - Validation and not-found cases are no-ops, never errors.

pub mod todo_store;
