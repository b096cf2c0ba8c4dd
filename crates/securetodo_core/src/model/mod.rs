//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the canonical todo record shared by store, service and FFI.
//! - Own the normalization rules applied to user-entered text.
//!
//! # Invariants
//! - Every todo is identified by a stable `TodoId` for its whole lifetime.
//! - Stored titles are never blank; stored descriptions are never empty.

pub mod todo;
