//! The mutation/validation/commit engine.
//!
//! # Data Flow
//! ```text
//! Store::fetch ──▶ update ─┐
//!                          ├─▶ candidate document
//! EditOp ──────▶ mutate ───┘        │
//!                                   ▼
//!                          render (Transformer)
//!                                   ▼
//!                          Validator (check command)
//!                                   ▼
//!                    pass: persist target atomically
//!                          swap ArcSwap<Snapshot>
//!                          ReloadTrigger (best effort)
//!                    fail: discard candidate, committed state untouched
//! ```
//!
//! # Design Decisions
//! - One tokio Mutex serializes the full read-modify-validate-commit
//!   span; at most one pipeline is in flight per process
//! - Readers load an immutable `Arc<Snapshot>` and never wait on an
//!   in-flight validation
//! - Rendered bytes live in the snapshot next to the document, so they
//!   can never be stale relative to it

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::ConfigError;
use crate::exec::{CommandRunner, ReloadTrigger, Validator};
use crate::render::Transformer;
use crate::store::Store;
use crate::tree::{self, EditOp};

/// One committed generation of the configuration: the document and the
/// rendered bytes produced from it. Immutable once published.
#[derive(Debug)]
pub struct Snapshot {
    document: Value,
    rendered: Vec<u8>,
}

impl Snapshot {
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn rendered(&self) -> &[u8] {
        &self.rendered
    }

    pub fn get(&self, path: &tree::Path) -> Option<&Value> {
        tree::get(&self.document, path)
    }

    pub fn is_composite(&self, path: &tree::Path) -> bool {
        tree::is_composite(&self.document, path)
    }

    pub fn is_object(&self, path: &tree::Path) -> bool {
        tree::is_object(&self.document, path)
    }
}

/// The authoritative configuration state for this process.
///
/// Holds exactly one committed document; every change goes through the
/// validate-then-commit pipeline. Before the first successful `update`
/// the committed document is `null` and the rendered bytes are empty.
pub struct ConfigState<S, R> {
    committed: ArcSwap<Snapshot>,
    committed_once: AtomicBool,
    write_lock: Mutex<()>,
    store: S,
    transformer: Transformer,
    target: PathBuf,
    validator: Validator<R>,
    reloader: ReloadTrigger<R>,
}

impl<S: Store, R: CommandRunner> ConfigState<S, R> {
    pub fn new(
        store: S,
        transformer: Transformer,
        target: PathBuf,
        validator: Validator<R>,
        reloader: ReloadTrigger<R>,
    ) -> Self {
        Self {
            committed: ArcSwap::from_pointee(Snapshot {
                document: Value::Null,
                rendered: Vec::new(),
            }),
            committed_once: AtomicBool::new(false),
            write_lock: Mutex::new(()),
            store,
            transformer,
            target,
            validator,
            reloader,
        }
    }

    /// Pulls the raw document from the store and runs it through the full
    /// pipeline. On validation failure the previously committed state is
    /// left untouched; on the first-ever call there is none, and the
    /// caller treats the failure as fatal.
    pub async fn update(&self) -> Result<(), ConfigError> {
        let _guard = self.write_lock.lock().await;
        let raw = self.store.fetch().await?;
        let document: Value = serde_json::from_slice(&raw)?;
        let rendered = self.transformer.render(&document)?;
        self.validator.check(&rendered).await?;
        self.commit(document, rendered).await
    }

    /// The guarded write path. Applies `op` to a private copy of the
    /// committed document; an op that does not resolve fails before the
    /// validator ever runs. A validated copy is committed atomically and
    /// the reload command fired; a rejected one is discarded.
    pub async fn mutate(&self, op: EditOp) -> Result<(), ConfigError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.committed.load().document.clone();
        if !op.apply(&mut document) {
            return Err(ConfigError::Path(op.path().to_string()));
        }
        let rendered = self.transformer.render(&document)?;
        self.validator.check(&rendered).await?;
        self.commit(document, rendered).await
    }

    // Caller holds the write lock. Persist first: if the target cannot be
    // written, the commit does not happen and readers keep the old state.
    async fn commit(&self, document: Value, rendered: Vec<u8>) -> Result<(), ConfigError> {
        self.persist(&rendered)?;
        let bytes = rendered.len();
        self.committed.store(Arc::new(Snapshot { document, rendered }));
        tracing::info!(target_file = %self.target.display(), bytes, "Committed configuration");
        // The startup pull does not reload: the consumer usually starts
        // after the first render is on disk.
        if self.committed_once.swap(true, Ordering::SeqCst) {
            self.reloader.trigger().await;
        }
        Ok(())
    }

    // Write-to-temp-then-rename so the reload command never observes a
    // partially written target.
    fn persist(&self, rendered: &[u8]) -> Result<(), ConfigError> {
        use std::io::Write;
        let dir = self
            .target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(rendered)?;
        file.flush()?;
        file.persist(&self.target).map_err(|e| ConfigError::Io(e.error))?;
        Ok(())
    }

    /// An isolated candidate for edit+validate workflows that must not
    /// touch the live state.
    pub fn copy(&self) -> Candidate<R> {
        let snapshot = self.committed.load();
        Candidate {
            document: snapshot.document.clone(),
            rendered: snapshot.rendered.clone(),
            transformer: self.transformer,
            validator: self.validator.clone(),
        }
    }

    /// The last committed generation. Lock-free; a commit that lands
    /// concurrently does not tear the returned snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.committed.load_full()
    }

    /// Rendered bytes of the committed document.
    pub fn last_render(&self) -> Vec<u8> {
        self.committed.load().rendered.clone()
    }

    /// Value at `path` in the committed document.
    pub fn get(&self, path: &tree::Path) -> Option<Value> {
        tree::get(&self.committed.load().document, path).cloned()
    }

    pub fn transformer(&self) -> Transformer {
        self.transformer
    }

    /// The file the rendered configuration is written to.
    pub fn target(&self) -> &std::path::Path {
        &self.target
    }
}

/// An uncommitted, isolated copy of the document undergoing
/// edit/validation. Never visible to readers of the live state.
pub struct Candidate<R> {
    document: Value,
    rendered: Vec<u8>,
    transformer: Transformer,
    validator: Validator<R>,
}

impl<R: CommandRunner> Candidate<R> {
    /// Replaces the candidate document wholesale with parsed `bytes`.
    /// Does not render or validate.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.document = serde_json::from_slice(bytes)?;
        Ok(())
    }

    /// Renders the candidate and runs the check command against it.
    /// Mutates nothing but the candidate's own rendered bytes.
    pub async fn validate(&mut self) -> Result<(), ConfigError> {
        self.rendered = self.transformer.render(&self.document)?;
        self.validator.check(&self.rendered).await
    }

    pub fn last_render(&self) -> &[u8] {
        &self.rendered
    }

    pub fn document(&self) -> &Value {
        &self.document
    }
}
