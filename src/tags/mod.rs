//! Tag resolution, routing and content cleaning.

mod cleaner;
mod hashtags;
mod registry;

pub use cleaner::ContentCleaner;
pub use hashtags::HashtagResolver;
pub use registry::{RegistryEntry, TagRegistry};
