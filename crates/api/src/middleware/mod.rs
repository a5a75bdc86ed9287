//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated actor from a JWT Bearer token.

pub mod auth;
