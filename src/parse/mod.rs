pub mod todo_parser;

pub use todo_parser::{continuation_payload, parse_todos};
