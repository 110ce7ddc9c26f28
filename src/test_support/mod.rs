//! Helpers shared by in-crate unit tests.

pub mod log_capture;
pub mod socket_guard;
