//! Idempotent note sync.
//!
//! - **State**: which note ids have been processed ([`StateStore`])
//! - **Orchestrator**: the per-note pipeline ([`SyncOrchestrator`])
//! - **Status**: state and pending-note summary
//! - **File**: atomic writes shared by the state file and note dumps
//!
//! # Example
//!
//! ```ignore
//! use tagsync::sync::{StateStore, SyncOptions, SyncOrchestrator};
//!
//! let state = StateStore::load(state_path);
//! let mut orchestrator = SyncOrchestrator::new(source, resolver, registry, &options, dispatcher, state)
//!     .with_publisher(publisher);
//! let report = orchestrator.run(&SyncOptions::default()).await?;
//! ```

mod file;
mod orchestrator;
mod state;
mod status;
mod types;

pub use file::atomic_write;
pub use orchestrator::SyncOrchestrator;
pub use state::StateStore;
pub use status::{get_sync_status, print_status, SyncStatus};
pub use types::{DiscoveredNote, NoteOutcome, NoteReport, SyncOptions, SyncReport, SyncStats};
