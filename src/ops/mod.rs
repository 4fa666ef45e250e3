pub mod reference;
pub mod sync;
pub mod tracker;
