pub mod config;
pub mod project;
pub mod source;
pub mod task;
pub mod todo;

pub use config::*;
pub use project::*;
pub use source::*;
pub use task::*;
pub use todo::*;
