//! HTTP API for ArchLab: projects, versions, design generation and refinement.

pub mod config;
pub mod error;
pub mod rest;

pub use config::ServerConfig;
pub use error::ApiError;
pub use rest::create_app;
