//! Cache types for registry reads.

use std::sync::Arc;

use silver_connect_core::UserId;

use super::types::MemberProfile;

/// Cache key for registry reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    VerifiedHelpers,
    HelperProfile(UserId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Helpers(Arc<Vec<MemberProfile>>),
    Profile(Box<MemberProfile>),
}
