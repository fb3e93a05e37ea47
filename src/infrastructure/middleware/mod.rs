// Request middleware - caller identity and per-request logging
// Keeps header parsing and request bookkeeping out of the domain handlers

pub mod api_key_extractor;
pub mod request_context_middleware;
pub mod request_extractors;

pub use api_key_extractor::ApiKey;
pub use request_context_middleware::{request_context_middleware, RequestId};
pub use request_extractors::{AppJson, AppPath};
