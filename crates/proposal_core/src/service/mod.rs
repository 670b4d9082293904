//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, storage and notification into use-case APIs.
//! - Keep HTTP handlers decoupled from storage and transport details.

pub mod response_service;
