//! Silver Connect Core - Shared domain types.
//!
//! This crate provides the types shared by the Silver Connect components:
//! - `portal` - Marketing site and role-based booking portal
//! - `integration-tests` - Black-box tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no session storage. The backend REST API owns all persistence;
//! these types mirror the shapes it returns.
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, roles, booking statuses, ratings, and bearer tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
