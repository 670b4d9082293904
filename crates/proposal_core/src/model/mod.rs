//! Domain model for proposal responses.
//!
//! # Responsibility
//! - Define the persisted response record and its decision enum.
//! - Turn untyped submission payloads into validated drafts.
//!
//! # Invariants
//! - Every persisted response is identified by a store-assigned `ResponseId`.
//! - Records are append-only; nothing in core mutates them after creation.

pub mod response;
pub mod validation;
