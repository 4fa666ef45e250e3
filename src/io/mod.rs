pub mod ledger_io;
pub mod lock;
pub mod project_io;
pub mod source_io;
