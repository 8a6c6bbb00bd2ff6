//! Skin-lesion scan service: image classifier plus a triage verdict layer.

pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod preprocess;
pub mod routes;
pub mod verdict;
