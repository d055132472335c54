//! Load/reset lifecycle around a single current dataset.

use std::path::Path;
use tracing::{info, warn};

use crate::analyzers::types::DepartmentAverages;
use crate::error::LoadError;
use crate::ingest::{IngestOptions, StudentDataset, load};

/// Holds at most one loaded dataset and its averages.
///
/// Each successful load replaces the previous dataset wholesale. A failed
/// load clears it, so stale results are never shown next to an error.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    options: IngestOptions,
    current: Option<Loaded>,
}

#[derive(Debug)]
struct Loaded {
    dataset: StudentDataset,
    averages: DepartmentAverages,
}

impl AnalysisSession {
    pub fn new(options: IngestOptions) -> Self {
        Self {
            options,
            current: None,
        }
    }

    /// Loads `path` and computes its averages. Returns the loaded record count.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        self.current = None;

        let dataset = load(path, &self.options).inspect_err(|e| {
            warn!(error = %e, "Load failed, session cleared");
        })?;
        let averages = dataset.averages();
        let count = dataset.len();

        self.current = Some(Loaded { dataset, averages });
        Ok(count)
    }

    /// Averages of the current dataset, or an empty mapping when nothing is loaded.
    pub fn averages(&self) -> DepartmentAverages {
        self.current
            .as_ref()
            .map(|l| l.averages.clone())
            .unwrap_or_default()
    }

    pub fn dataset(&self) -> Option<&StudentDataset> {
        self.current.as_ref().map(|l| &l.dataset)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn reset(&mut self) {
        if self.current.take().is_some() {
            info!("Session reset");
        }
    }
}
