//! Poll loop: fetch, fingerprint, compare, then render and persist on change.
//!
//! One cycle always finishes before the next sleep starts, so there is never
//! more than one fetch in flight and the artifact and change state only ever
//! have one writer. The fingerprint is saved only after the artifact has been
//! written; any failure leaves the previous fingerprint in place and the next
//! tick retries the same comparison.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::adapters::CatalogSource;
use crate::config::ResolvedConfig;
use crate::output::{self, OutputFormat};

use super::change_store::{ChangeState, ChangeStore};
use super::fingerprint::{fingerprint, Fingerprint};
use super::renderer::Renderer;
use super::storage::ArtifactSink;

/// Loop parameters
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub interval: Duration,
    pub limit: u32,
    pub format: OutputFormat,
}

impl LoopSettings {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            interval: config.poll.interval(),
            limit: config.poll.limit,
            format: config.output.format,
        }
    }
}

/// What a single cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Snapshot changed (or first run); artifact and state written
    Rendered { fingerprint: Fingerprint, items: usize },

    /// Snapshot matches the stored fingerprint; nothing written
    Unchanged { fingerprint: Fingerprint },

    /// Fetch failed; nothing written
    FetchFailed { error: String },

    /// Document could not be serialized; nothing written
    RenderFailed { error: String },

    /// Artifact or state write failed; state not advanced
    StorageFailed { error: String },
}

impl CycleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::RenderFailed { .. } | Self::StorageFailed { .. }
        )
    }
}

/// Single-owner poll driver
pub struct PollLoop {
    source: Box<dyn CatalogSource>,
    store: Box<dyn ChangeStore>,
    sink: Box<dyn ArtifactSink>,
    renderer: Renderer,
    settings: LoopSettings,
}

impl PollLoop {
    pub fn new(
        source: Box<dyn CatalogSource>,
        store: Box<dyn ChangeStore>,
        sink: Box<dyn ArtifactSink>,
        renderer: Renderer,
        settings: LoopSettings,
    ) -> Self {
        Self {
            source,
            store,
            sink,
            renderer,
            settings,
        }
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Run one cycle, rendering only if the snapshot changed
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.cycle(false).await
    }

    /// Run one cycle and render regardless of the stored fingerprint
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn force_cycle(&self) -> CycleOutcome {
        self.cycle(true).await
    }

    async fn cycle(&self, force: bool) -> CycleOutcome {
        let snapshot = match self.source.fetch(self.settings.limit).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Fetch failed, will retry next tick: {}", e);
                return CycleOutcome::FetchFailed {
                    error: e.to_string(),
                };
            }
        };

        let current = fingerprint(&snapshot);

        if !force {
            let previous = match self.store.load().await {
                Ok(state) => state.map(|s| s.fingerprint),
                Err(e) => {
                    warn!("Could not read change state, treating as first run: {}", e);
                    None
                }
            };

            if previous.as_ref() == Some(&current) {
                debug!(fingerprint = current.short(), "No library changes");
                return CycleOutcome::Unchanged {
                    fingerprint: current,
                };
            }
        }

        let document = self.renderer.render(&snapshot);
        let contents = match output::serialize(&document, self.settings.format) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Failed to serialize document: {}", e);
                return CycleOutcome::RenderFailed {
                    error: e.to_string(),
                };
            }
        };

        if let Err(e) = self.sink.publish(&contents).await {
            error!("Failed to write artifact: {}", e);
            return CycleOutcome::StorageFailed {
                error: e.to_string(),
            };
        }

        let state = ChangeState::new(current.clone(), snapshot.len());
        if let Err(e) = self.store.save(&state).await {
            error!("Artifact written but change state not saved: {}", e);
            return CycleOutcome::StorageFailed {
                error: e.to_string(),
            };
        }

        info!(
            fingerprint = current.short(),
            items = snapshot.len(),
            cards = document.card_count(),
            "Updated {}",
            self.sink.describe()
        );

        CycleOutcome::Rendered {
            fingerprint: current,
            items: snapshot.len(),
        }
    }

    /// Poll until `shutdown` completes. Returns the number of cycles run.
    ///
    /// Shutdown is only observed between cycles; a cycle in progress always
    /// finishes.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0u64;

        info!(
            interval_secs = self.settings.interval.as_secs(),
            limit = self.settings.limit,
            "Polling {}",
            self.source.name()
        );

        loop {
            self.run_cycle().await;
            cycles += 1;

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping poll loop");
                    break;
                }
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        cycles
    }
}
