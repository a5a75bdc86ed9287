//! Domain core for the tenant-scoped CRUD surface.
//!
//! Everything in this crate is pure: permission decisions, change-set
//! handling, bulk result bookkeeping and entity mapping operate on data
//! passed in by the caller. Persistence lives in `faultline-db`, HTTP in
//! `faultline-api`.

pub mod actor;
pub mod bulk;
pub mod entity;
pub mod error;
pub mod mapping;
pub mod patch;
pub mod permission;
pub mod types;
pub mod validation;
pub mod work;
