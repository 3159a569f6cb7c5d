//! mcp-forge: turn API definitions into MCP adapter servers.
//!
//! The pipeline runs in four synchronous stages:
//!
//! 1. [`definition::detect`] guesses the document format,
//! 2. [`definition::parse`] turns the text into a [`definition::ParsedTree`],
//! 3. [`endpoints::normalize`] produces canonical [`endpoints::Endpoint`]s,
//! 4. [`generation::Generator`] renders a [`server::ServerConfig`] into a
//!    [`generation::ProjectFileSet`] for one of the supported languages.
//!
//! [`application`] wires these stages together for drivers, while
//! [`infrastructure`] and [`validator`] hold the async edges (loading
//! definitions, writing files, probing a running server).
#![deny(unsafe_code)]

pub mod application;
pub mod core;
pub mod definition;
pub mod endpoints;
pub mod generation;
pub mod infrastructure;
pub mod server;
pub mod validator;

pub use crate::core::{Diagnostic, Diagnostics, Error, Result};
