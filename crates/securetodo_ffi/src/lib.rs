//! Flutter-facing bindings for the SecureTodo core.

pub mod api;
