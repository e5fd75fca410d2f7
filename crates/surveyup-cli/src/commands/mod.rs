//! Command implementations.

pub mod analyze;
pub mod chunks;
pub mod convert;

pub use self::analyze::execute_analyze;
pub use self::chunks::execute_chunks;
pub use self::convert::execute_convert;
