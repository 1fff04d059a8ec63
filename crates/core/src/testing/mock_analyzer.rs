//! Mock analyzer for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::analyzer::{Analysis, AnalysisOutcome, Analyzer, AnalyzerError};

/// Mock implementation of the Analyzer trait.
///
/// Paths without a configured result are viable, with the file stem as
/// fingerprint.
///
/// # Example
///
/// ```rust,ignore
/// use replaylink_core::testing::MockAnalyzer;
///
/// let analyzer = MockAnalyzer::new();
/// analyzer.set_outcome("/r/b.StormReplay", AnalysisOutcome::TooOld).await;
/// analyzer.set_fingerprint("/r/a.StormReplay", "f1").await;
/// ```
#[derive(Debug, Default)]
pub struct MockAnalyzer {
    results: Arc<RwLock<HashMap<PathBuf, Analysis>>>,
    /// Errors returned once for a path, then removed.
    errors: Arc<RwLock<HashMap<PathBuf, AnalyzerError>>>,
    calls: Arc<RwLock<Vec<PathBuf>>>,
    delay: Arc<RwLock<Duration>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_result(&self, path: impl AsRef<Path>, analysis: Analysis) {
        self.results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), analysis);
    }

    /// Viable replay with the given fingerprint.
    pub async fn set_fingerprint(&self, path: impl AsRef<Path>, fingerprint: &str) {
        self.set_result(path, Analysis::viable(fingerprint, None)).await;
    }

    /// Rejected replay.
    pub async fn set_outcome(&self, path: impl AsRef<Path>, outcome: AnalysisOutcome) {
        self.set_result(path, Analysis::rejected(outcome)).await;
    }

    /// The next analysis of `path` fails with `error`.
    pub async fn set_error(&self, path: impl AsRef<Path>, error: AnalyzerError) {
        self.errors
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), error);
    }

    /// Simulated analysis time.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Paths analyzed, in call order.
    pub async fn calls(&self) -> Vec<PathBuf> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<Analysis, AnalyzerError> {
        self.calls.write().await.push(path.to_path_buf());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.errors.write().await.remove(path) {
            return Err(err);
        }

        if let Some(analysis) = self.results.read().await.get(path) {
            return Ok(analysis.clone());
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Analysis::viable(stem, None))
    }
}
