// Domain-Driven Organization - one module per service

pub mod cookbook;
pub mod twitter;
