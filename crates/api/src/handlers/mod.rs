//! HTTP handlers.
//!
//! The resource handlers are generic over [`crate::controller::ResourceHandler`]
//! and mounted once per resource by [`crate::routes`].

pub mod resource;
