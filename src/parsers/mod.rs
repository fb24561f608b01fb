pub mod openapi;

pub use openapi::OpenApiParser;
