pub mod cli;
pub mod core;
pub mod models;
pub mod utils;

// Re-export commonly used types and traits
pub use crate::core::{Invocation, Invoker, InvokerError, Outcome, Runner};
pub use crate::models::{BuildOptions, Post, Settings};
