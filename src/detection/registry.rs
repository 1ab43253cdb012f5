//! Ordered collection of detectors.

use super::{ClientDetection, ClientDetector, PathBasedDetector};
use crate::core::ClientKind;
use crate::paths::{CLIENT_PROFILES, EnvSource};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Immutable, explicitly constructed set of detectors.
///
/// Built once and handed to the service; tests substitute their own
/// detectors through [`DetectorRegistry::new`].
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn ClientDetector>>,
}

impl DetectorRegistry {
    /// Registry over the given detectors, kept in order.
    pub fn new(detectors: Vec<Box<dyn ClientDetector>>) -> Self {
        Self { detectors }
    }

    /// One [`PathBasedDetector`] per row of the Path Candidate Table.
    pub fn with_default_detectors(env: Arc<dyn EnvSource>, version_timeout: Duration) -> Self {
        let detectors = CLIENT_PROFILES
            .iter()
            .map(|profile| {
                Box::new(PathBasedDetector::new(profile, Arc::clone(&env), version_timeout))
                    as Box<dyn ClientDetector>
            })
            .collect();
        Self::new(detectors)
    }

    /// Clients covered, in order.
    pub fn clients(&self) -> Vec<ClientKind> {
        self.detectors.iter().map(|d| d.client()).collect()
    }

    /// Detector for one client.
    pub fn get(&self, client: ClientKind) -> Option<&dyn ClientDetector> {
        self.detectors.iter().find(|d| d.client() == client).map(|d| d.as_ref())
    }

    /// Run every detector concurrently. Never fails as a whole: a detector
    /// error becomes that client's `error` status. Results keep registry order.
    pub async fn detect_all(&self, include_versions: bool) -> Vec<ClientDetection> {
        let runs = self.detectors.iter().map(|detector| async move {
            match detector.detect(include_versions).await {
                Ok(detection) => detection,
                Err(e) => {
                    warn!("Detector for {} failed: {}", detector.client(), e);
                    ClientDetection::failed(detector.client(), &e.to_string())
                }
            }
        });
        join_all(runs).await
    }
}
