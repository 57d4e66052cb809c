//! Functional core for gatehouse.
//!
//! Everything in here is free of I/O: session records, redirect validation,
//! authorization URL construction and the pure state transitions the flow
//! engine applies. The imperative shell lives in `gatehouse_auth`.

pub mod auth;
