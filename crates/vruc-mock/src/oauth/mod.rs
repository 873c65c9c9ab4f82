//! OAuth 2.0 authorization code flow
//!
//! Implements:
//! - RFC 8414: OAuth 2.0 Authorization Server Metadata
//! - RFC 6749 Section 4.1: Authorization Code Grant

pub mod authorize;
pub mod metadata;
pub mod token;
