pub mod args;
pub mod errors;
pub mod service;

pub use args::{stack_name, stack_request, StackOptions};
pub use errors::{ArgsError, StackError, StackResult};
pub use service::{ApplyOutcome, StackManager};
