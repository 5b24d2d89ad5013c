pub mod command;
pub mod snapshot;

pub use command::*;
pub use snapshot::*;
