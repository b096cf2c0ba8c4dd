//! Local device authentication.
//!
//! # Responsibility
//! - Define the platform capability contract the core depends on.
//! - Track per-process trust and gate mutating actions behind it.
//!
//! # Invariants
//! - Auth failures are resolved here; the store never sees them.
//! - One successful authentication trusts the session until `reset`.

pub mod capability;
pub mod gate;
pub mod session;
