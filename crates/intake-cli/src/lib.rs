//! Library side of the `lead-intake` command-line tool.

pub mod logging;
pub mod pipeline;
