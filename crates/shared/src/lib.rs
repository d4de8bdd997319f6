//! Shared utilities for the ticket survey backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Session token generation and hashing
//! - Password hashing with Argon2id and the admin password policy
//! - Cursor pagination for the email log
//! - Form validation helpers

pub mod crypto;
pub mod pagination;
pub mod password;
pub mod validation;
