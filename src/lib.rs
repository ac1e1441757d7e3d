mod collation;
mod flag_table;
mod loader;
mod source;
mod test_common;
mod util;

pub use collation::*;
pub use flag_table::*;
pub use loader::*;
pub use source::*;
pub use util::*;
