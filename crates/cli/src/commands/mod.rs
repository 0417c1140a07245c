//! Command implementations.

mod start;
mod validate;

pub use start::run_start;
pub use validate::run_validate;
