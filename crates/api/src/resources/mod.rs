//! Resources served through the generic controller.
//!
//! Each submodule binds one entity to [`crate::controller::ResourceHandler`].

pub mod organization;
pub mod project;
pub mod webhook;

use faultline_core::mapping::Mapper;

/// Register every custom mapping rule. Pairs not registered here map by
/// field name.
pub fn register_mappings(mapper: &Mapper) {
    webhook::register_mappings(mapper);
}
