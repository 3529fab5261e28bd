//! The sync pipeline.
//!
//! One run pulls every note from the source, keeps the tagged ones, and
//! routes each to its handler in source order:
//!
//! ```text
//! Discovered → Tagged → AlreadyProcessed
//!                     → Empty
//!                     → Dispatching → Succeeded | Failed
//! ```
//!
//! After a successful dispatch, side effects run in a fixed order: draft
//! marking, publishing, recording the id, deleting the source note. Only
//! recording the id is required; the others are best-effort. State is
//! saved once at the end of the run, including after an interrupt.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use super::state::StateStore;
use super::types::{DiscoveredNote, NoteOutcome, NoteReport, SyncOptions, SyncReport};
use crate::config::ProcessingOptions;
use crate::error::Result;
use crate::handler::frontmatter::ensure_draft;
use crate::handler::{truncate, HandlerDescriptor, HandlerDispatcher};
use crate::model::{NoteRecord, TaggedNote};
use crate::publish::{
    article_status_text, artifact_url, conversational_status_text, read_site_base_url, Publisher,
};
use crate::source::NoteSource;
use crate::tags::{ContentCleaner, HashtagResolver, TagRegistry};

/// Drives a sync run over a note source.
pub struct SyncOrchestrator<S, P> {
    source: S,
    resolver: HashtagResolver,
    registry: TagRegistry,
    cleaner: ContentCleaner,
    dispatcher: HandlerDispatcher,
    publisher: Option<P>,
    state: StateStore,
    draft_tag: String,
    publish_tag: String,
    site_base_url: Option<Option<String>>,
    cancel: Arc<AtomicBool>,
}

impl<S: NoteSource, P: Publisher> SyncOrchestrator<S, P> {
    pub fn new(
        source: S,
        resolver: HashtagResolver,
        registry: TagRegistry,
        processing: &ProcessingOptions,
        dispatcher: HandlerDispatcher,
        state: StateStore,
    ) -> Self {
        Self {
            source,
            resolver,
            registry,
            cleaner: ContentCleaner::from(processing.content_processing),
            dispatcher,
            publisher: None,
            state,
            draft_tag: processing.draft_tag.clone(),
            publish_tag: processing.publish_tag.clone(),
            site_base_url: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Publish gated notes through `publisher`.
    #[must_use]
    pub fn with_publisher(mut self, publisher: P) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Stop before the next note once `flag` is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    #[must_use]
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve tags for every note, dropping notes without any.
    fn tag_notes(&self, notes: Vec<NoteRecord>) -> Vec<TaggedNote> {
        notes
            .into_iter()
            .filter_map(|note| {
                let tags = self.resolver.tags_for(&note);
                let primary_tag = self.registry.primary_tag(&tags)?;
                Some(TaggedNote {
                    note,
                    tags,
                    primary_tag,
                })
            })
            .collect()
    }

    /// Tagged notes with their handler and processed flag, without side
    /// effects.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    pub fn discover(&self) -> Result<Vec<DiscoveredNote>> {
        let notes = self.source.list_notes()?;
        Ok(self
            .tag_notes(notes)
            .into_iter()
            .map(|tagged| DiscoveredNote {
                handler: self
                    .registry
                    .resolve(&tagged.primary_tag)
                    .map(|d| d.kind.clone()),
                processed: self.state.is_processed(tagged.id()),
                modified: tagged.note.effective_date(),
                id: tagged.note.id,
                title: tagged.note.title,
                tags: tagged.tags,
                primary_tag: tagged.primary_tag,
            })
            .collect())
    }

    /// Run the pipeline once.
    ///
    /// # Errors
    ///
    /// Returns an error only if the source cannot be read. Per-note
    /// failures are counted in the report.
    pub async fn run(&mut self, options: &SyncOptions) -> Result<SyncReport> {
        let notes = self.source.list_notes()?;
        let scanned = notes.len();
        let tagged = self.tag_notes(notes);
        info!(
            source = %self.source.name(),
            scanned,
            tagged = tagged.len(),
            "Scanned notes"
        );

        let mut report = SyncReport {
            scanned,
            tagged: tagged.len(),
            ..SyncReport::default()
        };
        if tagged.is_empty() {
            info!("No tagged notes, nothing to sync");
            return Ok(report);
        }

        let current: HashSet<String> = tagged.iter().map(|n| n.id().to_string()).collect();
        report.pruned = self.state.clean(&current);

        for note in &tagged {
            if self.cancel.load(Ordering::SeqCst) {
                warn!(remaining = tagged.len() - report.stats.total(), "Interrupted, stopping");
                report.stats.interrupted = true;
                break;
            }
            let note_report = self.process_note(note, options).await;
            report.stats.record(&note_report);
            report.notes.push(note_report);
        }

        match self.state.save() {
            Ok(()) => report.state_saved = true,
            Err(e) => error!(error = %e, "Failed to save sync state"),
        }

        info!(
            success = report.stats.success,
            skipped = report.stats.skipped,
            failed = report.stats.failed,
            unknown_tags = report.stats.unknown_tags,
            "Sync finished"
        );
        Ok(report)
    }

    async fn process_note(&mut self, note: &TaggedNote, options: &SyncOptions) -> NoteReport {
        let descriptor = self.registry.resolve(&note.primary_tag).cloned();
        let mut report = NoteReport {
            id: note.id().to_string(),
            title: note.title().to_string(),
            primary_tag: note.primary_tag.clone(),
            handler: descriptor.as_ref().map(|d| d.kind.clone()),
            outcome: NoteOutcome::Failed,
            artifact_path: None,
            draft: false,
            published: None,
            deleted: None,
        };

        if !options.force && self.state.is_processed(note.id()) {
            debug!(note = %note.id(), "Already processed");
            report.outcome = NoteOutcome::AlreadyProcessed;
            return report;
        }

        let content = self.cleaner.clean(&note.note.body, &note.tags);
        if content.is_empty() {
            info!(note = %note.id(), title = %truncate(note.title(), 50), "Empty after cleaning, skipped");
            report.outcome = NoteOutcome::Empty;
            return report;
        }

        info!(
            note = %note.id(),
            title = %truncate(note.title(), 50),
            tag = %note.primary_tag,
            handler = descriptor.as_ref().map_or("default", |d| d.kind.as_str()),
            "Dispatching"
        );
        let outcome = self.dispatcher.dispatch(descriptor.as_ref(), &content, note).await;
        if !outcome.success {
            return report;
        }
        report.outcome = NoteOutcome::Succeeded;
        report.artifact_path.clone_from(&outcome.artifact_path);

        // (a) draft
        if note.has_tag(&self.draft_tag) {
            if let Some(path) = &outcome.artifact_path {
                let absolute = self.dispatcher.site_root().join(path);
                match ensure_draft(&absolute) {
                    Ok(()) => report.draft = true,
                    Err(e) => warn!(path = %absolute.display(), error = %e, "Failed to mark draft"),
                }
            }
        }

        // (b) publish
        if options.publish && note.has_tag(&self.publish_tag) {
            report.published = self
                .publish(descriptor.as_ref(), note, &content, outcome.artifact_path.as_deref())
                .await;
        }

        // (c) record
        self.state.mark_processed(note.id());

        // (d) delete
        if options.delete_original {
            match self.source.delete_note(note.id()) {
                Ok(()) => {
                    info!(note = %note.id(), "Deleted original note");
                    report.deleted = Some(true);
                }
                Err(e) => {
                    warn!(note = %note.id(), error = %e, "Failed to delete original note");
                    report.deleted = Some(false);
                }
            }
        }

        report
    }

    /// Post the status for `note`. Returns `None` when nothing was attempted.
    async fn publish(
        &mut self,
        descriptor: Option<&HandlerDescriptor>,
        note: &TaggedNote,
        content: &str,
        artifact: Option<&Path>,
    ) -> Option<bool> {
        if self.publisher.is_none() {
            debug!(note = %note.id(), "No publisher configured");
            return None;
        }

        let conversational = descriptor.is_some_and(|d| d.convention.is_conversational());
        let text = if conversational {
            conversational_status_text(content)
        } else {
            let site_root = self.dispatcher.site_root().to_path_buf();
            let base_url = self
                .site_base_url
                .get_or_insert_with(|| read_site_base_url(&site_root))
                .clone();
            let url = artifact.and_then(|p| artifact_url(p, base_url.as_deref()));
            article_status_text(note.title(), content, url.as_deref())
        };
        if text.is_empty() {
            return None;
        }

        let publisher = self.publisher.as_ref()?;
        match publisher.publish(&text).await {
            Ok(()) => {
                info!(note = %note.id(), publisher = %publisher.name(), "Published");
                Some(true)
            }
            Err(e) => {
                warn!(note = %note.id(), error = %e, "Publishing failed");
                Some(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::error::Error;
    use crate::sync::types::SyncStats;
    use chrono::DateTime;
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    struct MemorySource {
        notes: Vec<NoteRecord>,
        deleted: Vec<String>,
        fail_delete: bool,
    }

    impl MemorySource {
        fn new(notes: Vec<NoteRecord>) -> Self {
            Self {
                notes,
                deleted: Vec::new(),
                fail_delete: false,
            }
        }
    }

    impl NoteSource for MemorySource {
        fn name(&self) -> String {
            "memory".to_string()
        }

        fn list_notes(&self) -> Result<Vec<NoteRecord>> {
            Ok(self.notes.clone())
        }

        fn delete_note(&mut self, id: &str) -> Result<()> {
            if self.fail_delete {
                return Err(Error::Source("read-only".into()));
            }
            self.deleted.push(id.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingPublisher {
        posts: Arc<Mutex<Vec<String>>>,
        fail: bool,
        /// Set after each post.
        raise: Option<Arc<AtomicBool>>,
    }

    impl Publisher for RecordingPublisher {
        fn name(&self) -> String {
            "recording".to_string()
        }

        async fn publish(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::Publish("offline".into()));
            }
            self.posts.lock().unwrap().push(text.to_string());
            if let Some(flag) = &self.raise {
                flag.store(true, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    fn note(id: &str, title: &str, body: &str, tags: &[&str]) -> NoteRecord {
        let mut n = NoteRecord::new(id, title, body);
        n.modification_date = DateTime::parse_from_rfc3339("2024-03-02T10:30:00+08:00").ok();
        if !tags.is_empty() {
            n.tags = Some(tags.iter().map(|t| (*t).to_string()).collect());
        }
        n
    }

    struct Fixture {
        dir: TempDir,
        config: RegistryConfig,
    }

    impl Fixture {
        fn new(config_json: &str) -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                config: RegistryConfig::parse(config_json).unwrap(),
            }
        }

        fn empty() -> Self {
            Self::new("{}")
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn state_path(&self) -> std::path::PathBuf {
            self.root().join("state.json")
        }

        fn orchestrator(&self, notes: Vec<NoteRecord>) -> SyncOrchestrator<MemorySource, RecordingPublisher> {
            SyncOrchestrator::new(
                MemorySource::new(notes),
                HashtagResolver::metadata_only(),
                TagRegistry::from_config(&self.config),
                &self.config.processing_options,
                HandlerDispatcher::new(self.root(), Duration::from_secs(10), "#draft"),
                StateStore::load(self.state_path()),
            )
        }

        #[cfg(unix)]
        fn script(&self, name: &str, body: &str) {
            use std::os::unix::fs::PermissionsExt;
            let path = self.root().join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_launch_plan_default_handler() {
        let fx = Fixture::empty();
        let mut orch = fx.orchestrator(vec![note("n1", "Launch plan", "Launch plan #article", &["#article"])]);

        let report = orch.run(&SyncOptions::default()).await.unwrap();

        assert_eq!(
            report.stats,
            SyncStats {
                success: 1,
                unknown_tags: 1,
                ..SyncStats::default()
            }
        );
        let rel = report.notes[0].artifact_path.clone().unwrap();
        assert_eq!(rel, Path::new("content/blog/2024-03-02-launch-plan.md"));

        let text = fs::read_to_string(fx.root().join(rel)).unwrap();
        assert!(text.contains("  categories:\n    - 文章\n"));
        assert!(text.contains("  tags:\n    - 文章\n    - article\n"));
        assert!(text.ends_with("---\n\nLaunch plan\n"));

        let state = StateStore::load(fx.state_path());
        assert!(state.is_processed("n1"));
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let fx = Fixture::empty();
        let notes = vec![note("n1", "A", "alpha", &["#article"])];

        let first = fx.orchestrator(notes.clone()).run(&SyncOptions::default()).await.unwrap();
        assert_eq!(first.stats.success, 1);

        let second = fx.orchestrator(notes).run(&SyncOptions::default()).await.unwrap();
        assert_eq!(second.stats.success, 0);
        assert_eq!(second.stats.skipped, 1);
        assert_eq!(second.notes[0].outcome, NoteOutcome::AlreadyProcessed);
    }

    #[tokio::test]
    async fn test_force_reprocesses() {
        let fx = Fixture::empty();
        let notes = vec![note("n1", "A", "alpha", &["#article"])];
        fx.orchestrator(notes.clone()).run(&SyncOptions::default()).await.unwrap();

        let options = SyncOptions {
            force: true,
            ..SyncOptions::default()
        };
        let report = fx.orchestrator(notes).run(&options).await.unwrap();
        assert_eq!(report.stats.success, 1);
    }

    #[tokio::test]
    async fn test_untagged_notes_never_routed() {
        let fx = Fixture::empty();
        let mut orch = fx.orchestrator(vec![note("n1", "Plain", "text #article in body", &[])]);

        let report = orch.run(&SyncOptions::default()).await.unwrap();
        assert!(report.stats.is_empty());
        assert_eq!(report.tagged, 0);
        assert!(!report.state_saved);
        assert!(!fx.state_path().exists());
        assert!(!fx.root().join("content").exists());
    }

    #[tokio::test]
    async fn test_stale_ids_pruned() {
        let fx = Fixture::empty();
        let mut seeded = StateStore::new(fx.state_path());
        seeded.mark_processed("gone");
        seeded.mark_processed("n1");
        seeded.save().unwrap();

        let report = fx
            .orchestrator(vec![note("n1", "A", "alpha", &["#article"])])
            .run(&SyncOptions::default())
            .await
            .unwrap();
        assert_eq!(report.pruned, 1);

        let state = StateStore::load(fx.state_path());
        assert_eq!(state.processed_ids(), vec!["n1"]);
    }

    #[tokio::test]
    async fn test_empty_after_cleaning_is_skipped_and_not_recorded() {
        let fx = Fixture::empty();
        let report = fx
            .orchestrator(vec![note("n1", "T", "  #article \n\n", &["#article"])])
            .run(&SyncOptions::default())
            .await
            .unwrap();

        assert_eq!(report.stats.skipped, 1);
        assert_eq!(report.notes[0].outcome, NoteOutcome::Empty);
        assert!(!StateStore::load(fx.state_path()).is_processed("n1"));
    }

    #[tokio::test]
    async fn test_default_handler_draft() {
        let fx = Fixture::empty();
        let report = fx
            .orchestrator(vec![note("n1", "Idea", "body", &["#recipe", "#draft"])])
            .run(&SyncOptions::default())
            .await
            .unwrap();

        assert!(report.notes[0].draft);
        let rel = report.notes[0].artifact_path.clone().unwrap();
        let text = fs::read_to_string(fx.root().join(rel)).unwrap();
        assert_eq!(text.matches("draft: true").count(), 1);
    }

    #[tokio::test]
    async fn test_publish_gate_and_article_text() {
        let fx = Fixture::empty();
        fs::write(fx.root().join("config.toml"), "base_url = \"https://blog.example\"\n").unwrap();
        let publisher = RecordingPublisher::default();
        let posts = Arc::clone(&publisher.posts);

        let mut orch = fx
            .orchestrator(vec![
                note("n1", "Launch plan", "We ship #cmx", &["#article", "#cmx"]),
                note("n2", "Quiet", "not posted", &["#article"]),
            ])
            .with_publisher(publisher);
        let report = orch.run(&SyncOptions::default()).await.unwrap();

        assert_eq!(report.notes[0].published, Some(true));
        assert_eq!(report.notes[1].published, None);
        let posts = posts.lock().unwrap();
        assert_eq!(
            posts.as_slice(),
            ["Launch plan\n\nWe ship\nhttps://blog.example/blog/2024-03-02-launch-plan/"]
        );
    }

    #[tokio::test]
    async fn test_publish_disabled_by_option() {
        let fx = Fixture::empty();
        let publisher = RecordingPublisher::default();
        let posts = Arc::clone(&publisher.posts);
        let options = SyncOptions {
            publish: false,
            ..SyncOptions::default()
        };

        fx.orchestrator(vec![note("n1", "A", "x", &["#cmx"])])
            .with_publisher(publisher)
            .run(&options)
            .await
            .unwrap();
        assert!(posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_still_records() {
        let fx = Fixture::empty();
        let publisher = RecordingPublisher {
            fail: true,
            ..RecordingPublisher::default()
        };

        let report = fx
            .orchestrator(vec![note("n1", "A", "x", &["#cmx"])])
            .with_publisher(publisher)
            .run(&SyncOptions::default())
            .await
            .unwrap();

        assert_eq!(report.stats.success, 1);
        assert_eq!(report.notes[0].published, Some(false));
        assert!(StateStore::load(fx.state_path()).is_processed("n1"));
    }

    #[tokio::test]
    async fn test_delete_original() {
        let fx = Fixture::empty();
        let options = SyncOptions {
            delete_original: true,
            ..SyncOptions::default()
        };

        let mut orch = fx.orchestrator(vec![note("n1", "A", "x", &["#article"])]);
        let report = orch.run(&options).await.unwrap();
        assert_eq!(report.notes[0].deleted, Some(true));
        assert_eq!(orch.source().deleted, vec!["n1"]);
    }

    #[tokio::test]
    async fn test_failed_delete_still_records() {
        let fx = Fixture::empty();
        let options = SyncOptions {
            delete_original: true,
            ..SyncOptions::default()
        };

        let mut source = MemorySource::new(vec![note("n1", "A", "x", &["#article"])]);
        source.fail_delete = true;
        let mut orch = SyncOrchestrator::<_, RecordingPublisher>::new(
            source,
            HashtagResolver::metadata_only(),
            TagRegistry::from_config(&fx.config),
            &fx.config.processing_options,
            HandlerDispatcher::new(fx.root(), Duration::from_secs(10), "#draft"),
            StateStore::load(fx.state_path()),
        );

        let report = orch.run(&options).await.unwrap();
        assert_eq!(report.notes[0].deleted, Some(false));
        assert!(orch.state().is_processed("n1"));
    }

    #[tokio::test]
    async fn test_interrupt_stops_before_next_note_and_saves() {
        let fx = Fixture::empty();
        let flag = Arc::new(AtomicBool::new(true));

        let report = fx
            .orchestrator(vec![note("n1", "A", "x", &["#article"])])
            .with_cancel_flag(flag)
            .run(&SyncOptions::default())
            .await
            .unwrap();

        assert!(report.stats.interrupted);
        assert!(report.notes.is_empty());
        assert!(report.state_saved);
        assert!(fx.state_path().exists());
    }

    #[tokio::test]
    async fn test_interrupt_mid_run_keeps_finished_note() {
        let fx = Fixture::empty();
        let flag = Arc::new(AtomicBool::new(false));
        let publisher = RecordingPublisher {
            raise: Some(Arc::clone(&flag)),
            ..RecordingPublisher::default()
        };

        let report = fx
            .orchestrator(vec![
                note("n1", "First", "one", &["#article", "#cmx"]),
                note("n2", "Second", "two", &["#article"]),
            ])
            .with_publisher(publisher)
            .with_cancel_flag(flag)
            .run(&SyncOptions::default())
            .await
            .unwrap();

        assert!(report.stats.interrupted);
        assert_eq!(report.stats.success, 1);
        assert_eq!(report.stats.total(), 1);
        assert_eq!(report.notes.len(), 1);
        assert_eq!(report.notes[0].id, "n1");

        let state = StateStore::load(fx.state_path());
        assert!(state.is_processed("n1"));
        assert!(!state.is_processed("n2"));
        assert!(!fx.root().join("content/blog/2024-03-02-second.md").exists());
    }

    #[tokio::test]
    async fn test_export_takes_precedence() {
        let fx = Fixture::empty();
        let resolver =
            HashtagResolver::from_export_str(r#"{"notes": {"n1": {"hashtags": ["article"]}}}"#).unwrap();
        let orch = SyncOrchestrator::<_, RecordingPublisher>::new(
            MemorySource::new(vec![
                note("n1", "A", "x", &[]),
                note("n2", "B", "y", &["#article"]),
            ]),
            resolver,
            TagRegistry::from_config(&fx.config),
            &fx.config.processing_options,
            HandlerDispatcher::new(fx.root(), Duration::from_secs(10), "#draft"),
            StateStore::load(fx.state_path()),
        );

        let found = orch.discover().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "n1");
        assert_eq!(found[0].handler, None);
        assert!(!found[0].processed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_handler_failure_not_recorded() {
        let fx = Fixture::new(r##"{"tag_handlers": {"#thought": {"type": "thought", "script": "t.sh"}}}"##);
        fx.script("t.sh", "exit 1");

        let report = fx
            .orchestrator(vec![note("n1", "T", "a thought", &["#thought"])])
            .run(&SyncOptions::default())
            .await
            .unwrap();

        assert_eq!(report.stats.failed, 1);
        assert!(report.state_saved);
        assert!(!StateStore::load(fx.state_path()).is_processed("n1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_registered_handler_priority_and_draft() {
        let fx = Fixture::new(
            r##"{
                "tag_handlers": {
                    "#thought": {"type": "thought", "script": "t.sh", "aliases": ["#idea"]},
                    "#article": {"type": "article", "script": "a.sh"}
                },
                "processing_options": {"priority_order": ["#thought", "#article"]}
            }"##,
        );
        fx.script(
            "t.sh",
            r#"mkdir -p content/thoughts
printf '+++\ntitle = "t"\n+++\n%s\n' "$1" > content/thoughts/index.md
echo "updated content/thoughts/index.md""#,
        );
        fx.script("a.sh", "exit 1");
        let publisher = RecordingPublisher::default();
        let posts = Arc::clone(&publisher.posts);

        let report = fx
            .orchestrator(vec![note(
                "n1",
                "T",
                "short   thought\n#idea",
                &["#article", "#idea", "#draft", "#cmx"],
            )])
            .with_publisher(publisher)
            .run(&SyncOptions::default())
            .await
            .unwrap();

        let n = &report.notes[0];
        assert_eq!(n.handler.as_deref(), Some("thought"));
        assert_eq!(n.primary_tag, "#idea");
        assert_eq!(n.outcome, NoteOutcome::Succeeded);
        assert!(n.draft);

        let text = fs::read_to_string(fx.root().join("content/thoughts/index.md")).unwrap();
        assert!(text.contains("draft = true\n+++"));
        assert_eq!(posts.lock().unwrap().as_slice(), ["short thought"]);
    }
}
