//! Device positioning.
//!
//! The resolver asks a [`PositionSource`] for a single fix. It reports
//! every failure to the caller; substituting a fallback coordinate is the
//! session's decision, not the resolver's.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tokio::time::Instant;

use crate::{error::PositioningError, model::Coordinate};

pub const POSITION_TIMEOUT: Duration = Duration::from_secs(10);
pub const POSITION_MAX_CACHED_AGE: Duration = Duration::from_secs(5 * 60);

/// Options for a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// A previous fix younger than this is reused.
    pub max_cached_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: POSITION_TIMEOUT,
            max_cached_age: POSITION_MAX_CACHED_AGE,
        }
    }
}

/// Host positioning capability.
#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, PositioningError>;
}

/// A host that knows where it is, e.g. from configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, PositioningError> {
        Ok(self.0)
    }
}

/// A host without any positioning capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositioning;

#[async_trait]
impl PositionSource for NoPositioning {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, PositioningError> {
        Err(PositioningError::Unavailable)
    }
}

#[derive(Debug)]
pub struct LocationResolver {
    source: Arc<dyn PositionSource>,
    options: PositionOptions,
    last_fix: Mutex<Option<(Coordinate, Instant)>>,
}

impl LocationResolver {
    pub fn new(source: Arc<dyn PositionSource>) -> Self {
        Self::with_options(source, PositionOptions::default())
    }

    pub fn with_options(source: Arc<dyn PositionSource>, options: PositionOptions) -> Self {
        Self { source, options, last_fix: Mutex::new(None) }
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Single-shot position request.
    pub async fn resolve_current_position(&self) -> Result<Coordinate, PositioningError> {
        if let Some((coord, taken_at)) = *self.last_fix.lock() {
            if taken_at.elapsed() <= self.options.max_cached_age {
                tracing::debug!(%coord, "reusing cached position");
                return Ok(coord);
            }
        }

        let coord = tokio::time::timeout(
            self.options.timeout,
            self.source.current_position(&self.options),
        )
        .await
        .map_err(|_| PositioningError::Timeout)??;

        *self.last_fix.lock() = Some((coord, Instant::now()));
        tracing::info!(%coord, "resolved device position");
        Ok(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PositionSource for CountingSource {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinate, PositioningError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinate::new(50.0 + n as f64, 8.0))
        }
    }

    #[derive(Debug)]
    struct HangingSource;

    #[async_trait]
    impl PositionSource for HangingSource {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinate, PositioningError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinate::new(0.0, 0.0))
        }
    }

    #[derive(Debug)]
    struct DeniedSource;

    #[async_trait]
    impl PositionSource for DeniedSource {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinate, PositioningError> {
            Err(PositioningError::Denied)
        }
    }

    #[test]
    fn default_options() {
        let opts = PositionOptions::default();
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout, Duration::from_millis(10_000));
        assert_eq!(opts.max_cached_age, Duration::from_millis(300_000));
    }

    #[tokio::test]
    async fn fixed_position_resolves() {
        let coord = Coordinate::new(47.37, 8.54);
        let resolver = LocationResolver::new(Arc::new(FixedPosition(coord)));
        assert_eq!(resolver.resolve_current_position().await, Ok(coord));
    }

    #[tokio::test]
    async fn missing_capability_is_reported() {
        let resolver = LocationResolver::new(Arc::new(NoPositioning));
        assert_eq!(
            resolver.resolve_current_position().await,
            Err(PositioningError::Unavailable)
        );
    }

    #[tokio::test]
    async fn denial_is_reported_not_substituted() {
        let resolver = LocationResolver::new(Arc::new(DeniedSource));
        assert_eq!(resolver.resolve_current_position().await, Err(PositioningError::Denied));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let resolver = LocationResolver::new(Arc::new(HangingSource));
        assert_eq!(resolver.resolve_current_position().await, Err(PositioningError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn cached_fix_is_reused_until_it_ages_out() {
        let source = Arc::new(CountingSource::default());
        let resolver = LocationResolver::new(source.clone());

        let first = resolver.resolve_current_position().await.expect("first fix");
        tokio::time::advance(Duration::from_secs(4 * 60)).await;
        let second = resolver.resolve_current_position().await.expect("cached fix");
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        let third = resolver.resolve_current_position().await.expect("fresh fix");
        assert_ne!(first, third);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
