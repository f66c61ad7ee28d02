//! Command handlers.

mod io;

pub use io::{cmd_export, cmd_import};
