//! Pizzeria storefront library.
//!
//! # Architecture
//!
//! - Axum web framework exposing a JSON API (rendering is left to whatever
//!   presentation layer sits in front of it)
//! - `SQLite` via sqlx for users, the catalog, and orders
//! - tower-sessions for the per-client session; the shopping cart lives in
//!   the session and is only materialized into the relational store at
//!   checkout
//!
//! The crate is a library so the services and repositories can be tested
//! directly against an in-memory database; the binary in `main.rs` wires
//! them into a server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
