//! Shared helpers for unit tests.

pub(crate) mod socket_guard;
pub(crate) mod stalling_server;
