//! Library components for the linkage-studio CLI.

pub mod logging;
