pub mod content;
pub mod error;
pub mod invoker;
pub mod runner;

pub use content::ContentStore;
pub use error::InvokerError;
pub use invoker::Invoker;
pub use runner::{DryRunner, Invocation, Outcome, ProcessRunner, Runner};
