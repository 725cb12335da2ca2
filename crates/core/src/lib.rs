//! Pizzeria Core - Shared types library.
//!
//! This crate provides the common domain types used across the pizzeria
//! storefront: type-safe IDs, validated email addresses, user roles, and
//! order statuses.
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database
//! access, no HTTP handlers. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
