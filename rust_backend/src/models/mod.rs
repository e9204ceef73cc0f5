pub mod date_range;
pub mod raw_tables;
pub mod table;

pub use date_range::*;
pub use raw_tables::*;
pub use table::*;
