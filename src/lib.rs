//! tagsync - route tagged notes to content handlers, exactly once.
//!
//! Reads notes from a JSON dump, resolves each note's hashtags, picks a
//! primary tag, cleans the content and hands it to the handler registered
//! for that tag. Processed note ids are kept in a state file so repeated
//! runs never dispatch the same note twice.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Registry config and path resolution
//! - [`model`] - Note records and tag normalization
//! - [`source`] - Note sources (JSON dump)
//! - [`tags`] - Hashtag resolution, tag registry, content cleaning
//! - [`handler`] - Handler descriptors and dispatch
//! - [`publish`] - Optional Mastodon-compatible publishing
//! - [`extract`] - Optional hashtag export refresh
//! - [`sync`] - Sync state and the orchestrator
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod model;
pub mod publish;
pub mod source;
pub mod sync;
pub mod tags;

pub use error::{Error, Result};
