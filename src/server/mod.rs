//! Server configuration model consumed by the generators

pub mod config;

pub use config::{
    Authentication, DEFAULT_API_KEY_HEADER, DEFAULT_API_KEY_PARAM, Hosting, KeyLocation,
    ServerConfig, ServerConfigBuilder,
};
