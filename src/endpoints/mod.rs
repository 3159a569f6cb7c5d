//! Canonical endpoint model, normalization from every supported definition
//! format, and capability classification.

mod blueprint;
pub mod classifier;
pub mod ids;
pub mod normalizer;
mod openapi;
mod raml;
pub mod types;

pub use classifier::{classify, classify_method, operation_name};
pub use ids::{IdAllocator, endpoint_id};
pub use normalizer::{normalize, path_placeholders};
pub use types::{
    Endpoint, EndpointParameter, EndpointResponse, HttpMethod, McpType, ParameterLocation,
    RequestBody, ValueType,
};
