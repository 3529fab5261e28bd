//! Command implementations.

pub mod completions;
pub mod list;
pub mod reset;
pub mod status;
pub mod sync;
pub mod tags;
pub mod version;
