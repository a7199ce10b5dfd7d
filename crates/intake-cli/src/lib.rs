//! Library side of the `sheet-intake` binary.

pub mod commands;
pub mod logging;
