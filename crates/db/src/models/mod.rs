pub mod organization;
pub mod project;
pub mod webhook;
