//! Template rendering for artifact boilerplate.
//!
//! Every artifact starts with a header rendered by Tera from a built-in
//! template; a template directory can override it.

pub mod manager;

pub use manager::*;
