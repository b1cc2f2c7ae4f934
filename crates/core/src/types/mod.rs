//! Core types for Silver Connect.
//!
//! This module provides type-safe wrappers for the domain concepts the
//! backend API exchanges with the portal.

pub mod email;
pub mod id;
pub mod rating;
pub mod role;
pub mod status;
pub mod token;

pub use email::{Email, EmailError};
pub use id::*;
pub use rating::{Rating, RatingError};
pub use role::{Landing, Role};
pub use status::*;
pub use token::{BearerToken, TokenError};
