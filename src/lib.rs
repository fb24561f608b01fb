pub mod auth;
pub mod bypass;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod idor;
pub mod models;
pub mod parsers;
pub mod probe;
pub mod progress;
pub mod reporting;
pub mod runner;

// Re-export commonly used items
pub use auth::*;
pub use bypass::*;
pub use config::*;
pub use engine::*;
pub use error::{Error, Result};
pub use idor::*;
pub use models::*;
pub use parsers::*;
pub use probe::*;
pub use progress::*;
pub use reporting::*;
pub use runner::*;
