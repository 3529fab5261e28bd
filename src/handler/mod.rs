//! Content handlers.
//!
//! A handler turns the cleaned body of a note into a site artifact. Known
//! tags run an external program described by a [`HandlerDescriptor`];
//! unknown tags fall back to the built-in article writer.

pub mod default_article;
mod descriptor;
mod dispatcher;
pub mod frontmatter;
pub mod output;

pub use descriptor::{CallingConvention, HandlerDescriptor};
pub use dispatcher::{DispatchOutcome, HandlerDispatcher};
pub(crate) use dispatcher::truncate;
