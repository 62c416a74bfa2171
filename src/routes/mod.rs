//! Router assembly.

#[allow(clippy::module_inception)]
pub mod routes;
