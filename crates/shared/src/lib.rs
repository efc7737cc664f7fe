//! Shared utilities and common types for the Compliance Checkpoint backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Content hashing for evidence files
//! - Password hashing with Argon2id
//! - JWT issuance and validation
//! - Markdown rendering and HTML escaping for reports
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod markdown;
pub mod password;
pub mod validation;
