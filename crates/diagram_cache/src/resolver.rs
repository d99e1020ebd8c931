//! The cache resolver: occurrence in, HTML fragment out.
//!
//! [`Resolver::resolve`] never blocks on the rendering service. On a miss it
//! writes a placeholder artifact, registers the key as in flight and hands the
//! render to a blocking worker on the Tokio runtime. When the render finishes
//! the final SVG replaces the placeholder and any artifacts it supersedes in
//! the same slot are retired.
//!
//! Every failure on the synchronous path is turned into an inline error
//! fragment so one bad diagram never aborts a documentation build.

use std::sync::{Arc, Mutex};

use diagram_common::{is_valid_name, ArtifactKey};
use diagram_scan::{Block, DiagramOccurrence, DocumentInfo, Extractor};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::DiagramError;
use crate::fragment::{error_fragment, FragmentOptions};
use crate::index::SlotIndex;
use crate::inflight::{InFlight, InFlightGuard};
use crate::placeholder::{is_placeholder, placeholder_svg};
use crate::render::{check_svg, Renderer};
use crate::store::ArtifactStore;

/// Counts of render jobs completed by [`Resolver::wait_idle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Final artifacts written.
    pub rendered: usize,
    /// Renders that failed; their placeholders remain for a later retry.
    pub failed: usize,
    /// Renders whose result was dropped because a newer edit claimed the slot.
    pub discarded: usize,
}

impl PassSummary {
    /// Total number of jobs accounted for.
    pub fn total(&self) -> usize {
        self.rendered + self.failed + self.discarded
    }
}

#[derive(Debug, Clone, Copy)]
enum JobOutcome {
    Rendered,
    Failed,
    Discarded,
}

/// State shared between the resolver and its render jobs.
struct Shared {
    store: ArtifactStore,
    renderer: Arc<dyn Renderer>,
    index: Mutex<SlotIndex>,
    inflight: InFlight,
}

/// Resolves diagram occurrences against the artifact store.
pub struct Resolver {
    shared: Arc<Shared>,
    fragments: FragmentOptions,
    extractor: Extractor,
    runtime: Handle,
    jobs: Mutex<Vec<JoinHandle<JobOutcome>>>,
}

impl Resolver {
    /// Creates a resolver over `store`.
    ///
    /// Creates the store directory if needed and seeds the slot index from its
    /// current contents. Render jobs are spawned on `runtime`.
    pub fn new(
        store: ArtifactStore,
        renderer: Arc<dyn Renderer>,
        fragments: FragmentOptions,
        runtime: Handle,
    ) -> Result<Self, DiagramError> {
        store.ensure_root()?;
        let index = SlotIndex::from_keys(store.list_keys()?);
        debug!(
            root = %store.root().display(),
            artifacts = index.len(),
            "seeded slot index"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                store,
                renderer,
                index: Mutex::new(index),
                inflight: InFlight::new(),
            }),
            fragments,
            extractor: Extractor::default(),
            runtime,
            jobs: Mutex::new(Vec::new()),
        })
    }

    /// Replaces the extractor used by [`Resolver::resolve_block`].
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// The artifact store this resolver writes to.
    pub fn store(&self) -> &ArtifactStore {
        &self.shared.store
    }

    /// Resolves one occurrence to an HTML fragment.
    ///
    /// Always returns markup; failures become an inline error fragment.
    pub fn resolve(&self, occurrence: &DiagramOccurrence) -> String {
        match self.try_resolve(occurrence) {
            Ok(html) => html,
            Err(err) => {
                error!(
                    diagram_type = %occurrence.diagram_type,
                    source = ?occurrence.source,
                    error = %err,
                    "failed to resolve diagram"
                );
                error_fragment(&err.to_string())
            }
        }
    }

    /// Resolves a batch of occurrences.
    ///
    /// Every key is claimed before the first render is started, so a render
    /// finishing early cannot retire an artifact a later occurrence still uses.
    pub fn resolve_all(&self, occurrences: &[DiagramOccurrence]) -> Vec<String> {
        {
            let mut index = self.shared.index.lock().unwrap();
            for occurrence in occurrences {
                if check_names(occurrence).is_ok() {
                    index.claim(&occurrence.key());
                }
            }
        }
        occurrences.iter().map(|occ| self.resolve(occ)).collect()
    }

    /// Single-block mode: resolves `blocks[idx]` if it is a diagram fence.
    ///
    /// Returns `None` for anything the extractor does not treat as a diagram
    /// (other fences, excluded types, non-fence blocks), so the caller can fall
    /// through to its default handling. Pass the extractor reconciliation scans
    /// with to [`Resolver::with_extractor`].
    pub fn resolve_block(&self, blocks: &[Block], idx: usize, doc: &DocumentInfo) -> Option<String> {
        let occurrence = self.extractor.extract_at(blocks, idx, doc)?;
        Some(self.resolve(&occurrence))
    }

    /// Waits for every render job spawned so far, including jobs spawned while
    /// waiting.
    pub async fn wait_idle(&self) -> PassSummary {
        let mut summary = PassSummary::default();
        loop {
            let jobs = std::mem::take(&mut *self.jobs.lock().unwrap());
            if jobs.is_empty() {
                break;
            }
            for job in jobs {
                match job.await {
                    Ok(JobOutcome::Rendered) => summary.rendered += 1,
                    Ok(JobOutcome::Failed) => summary.failed += 1,
                    Ok(JobOutcome::Discarded) => summary.discarded += 1,
                    Err(err) => {
                        error!(error = %err, "render job did not complete");
                        summary.failed += 1;
                    }
                }
            }
        }
        summary
    }

    /// Returns `true` if a render for `key` is outstanding.
    pub fn is_in_flight(&self, key: &ArtifactKey) -> bool {
        self.shared.inflight.contains(key)
    }

    fn try_resolve(&self, occurrence: &DiagramOccurrence) -> Result<String, DiagramError> {
        check_names(occurrence)?;
        let key = occurrence.key();
        let figure = self.fragments.figure(&key, occurrence.caption.as_deref());

        self.shared.index.lock().unwrap().claim(&key);

        if self.shared.inflight.contains(&key) {
            debug!(key = %key, "render already in flight");
            return Ok(figure);
        }

        if let Some(bytes) = self.shared.store.read(&key)? {
            if !is_placeholder(&bytes) {
                debug!(key = %key, "cache hit");
                self.shared.index.lock().unwrap().insert(key);
                return Ok(figure);
            }
            debug!(key = %key, "placeholder left by an earlier pass; retrying");
        }

        let Some(guard) = self.shared.inflight.try_begin(&key) else {
            return Ok(figure);
        };

        self.shared
            .store
            .write(&key, placeholder_svg(key.diagram_type()).as_bytes())?;
        self.shared.index.lock().unwrap().insert(key.clone());

        info!(key = %key, "rendering diagram");
        let shared = Arc::clone(&self.shared);
        let content = occurrence.content.clone();
        let job = self
            .runtime
            .spawn_blocking(move || shared.run_job(guard, &content));
        self.jobs.lock().unwrap().push(job);

        Ok(figure)
    }
}

impl Shared {
    fn run_job(&self, guard: InFlightGuard, content: &str) -> JobOutcome {
        let key = guard.key();
        let diagram_type = key.diagram_type();

        let svg = match self.renderer.render(diagram_type, content).and_then(check_svg) {
            Ok(svg) => svg,
            Err(source) => {
                let err = DiagramError::RenderService {
                    diagram_type,
                    source,
                };
                warn!(key = %key, error = %err, "render failed; placeholder kept for retry");
                return JobOutcome::Failed;
            }
        };

        let mut index = self.index.lock().unwrap();

        if !index.is_current(key) {
            info!(key = %key, "discarding render superseded by a newer edit");
            self.drop_placeholder(&mut index, key);
            return JobOutcome::Discarded;
        }

        if let Err(err) = self.store.write(key, svg.as_bytes()) {
            warn!(key = %key, error = %err, "failed to store rendered diagram");
            return JobOutcome::Failed;
        }
        index.insert(key.clone());
        info!(key = %key, "stored rendered diagram");

        for old in index.superseded_by(key) {
            match self.store.delete(&old) {
                Ok(_) => {
                    index.remove(&old);
                    info!(key = %old, replaced_by = %key, "retired superseded diagram");
                }
                Err(err) => warn!(key = %old, error = %err, "failed to retire diagram"),
            }
        }

        JobOutcome::Rendered
    }

    fn drop_placeholder(&self, index: &mut SlotIndex, key: &ArtifactKey) {
        match self.store.read(key) {
            Ok(Some(bytes)) if is_placeholder(&bytes) => match self.store.delete(key) {
                Ok(_) => index.remove(key),
                Err(err) => warn!(key = %key, error = %err, "failed to remove placeholder"),
            },
            Ok(_) => {}
            Err(err) => warn!(key = %key, error = %err, "failed to inspect placeholder"),
        }
    }
}

/// Rejects ids that cannot be embedded in a filename.
fn check_names(occurrence: &DiagramOccurrence) -> Result<(), DiagramError> {
    for name in [&occurrence.id, &occurrence.position_id].into_iter().flatten() {
        if !is_valid_name(name) {
            return Err(DiagramError::InvalidIdentifier(name.clone()));
        }
    }
    Ok(())
}
