mod aggregate;
mod fetcher;
mod resolver;
mod station_id;


pub use aggregate::{
    aggregate, AggregateFailure, AggregateOutcome, AggregateResult, FailureReason,
    TemperatureStatus, TOO_COLD_BELOW_C, TOO_HOT_ABOVE_C,
};
pub use fetcher::{fetch_measurements, filter_measurements, StationReport, DEFAULT_SAMPLE_LIMIT};
pub use resolver::{resolve_sensor, SensorResolution, SensorTitleMatcher, DEFAULT_SENSOR_TITLE};
pub use station_id::is_valid_box_id;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::services::opensensemap::SenseBoxApi;
use crate::time::Clock;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_AGGREGATE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub matcher: SensorTitleMatcher,
    pub window: ChronoDuration,
    pub sample_limit: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            matcher: SensorTitleMatcher::default(),
            window: ChronoDuration::hours(1),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemperatureError {
    #[error("temperature aggregation did not finish within {0:?}")]
    TimedOut(Duration),
}

/// Resolves, fetches and averages across every box in one pass.
///
/// Boxes are processed concurrently; each returns its own report and the
/// reports are merged here after the join, so nothing is shared while the
/// requests are in flight. Dropping the returned future cancels every
/// outstanding request.
pub async fn compute_aggregate<A, K>(
    api: &A,
    box_ids: &[String],
    clock: &K,
    options: &AggregateOptions,
) -> AggregateOutcome
where
    A: SenseBoxApi + ?Sized,
    K: Clock + ?Sized,
{
    let cutoff = clock.now() - options.window;

    let reports = join_all(
        box_ids
            .iter()
            .map(|box_id| process_box(api, box_id, cutoff, options)),
    )
    .await;

    let mut values = Vec::new();
    let mut errors = Vec::new();
    for report in reports {
        values.extend(report.values);
        errors.extend(report.errors);
    }

    let outcome = aggregate(&values, errors, clock.now());
    match &outcome {
        Ok(result) => tracing::info!(
            average = result.average(),
            count = result.count(),
            status = ?result.status(),
            "temperature aggregate computed"
        ),
        Err(failure) => tracing::warn!(
            reason = ?failure.reason,
            diagnostics = failure.diagnostics.len(),
            "no temperature aggregate available"
        ),
    }
    outcome
}

async fn process_box<A>(
    api: &A,
    box_id: &str,
    cutoff: DateTime<Utc>,
    options: &AggregateOptions,
) -> StationReport
where
    A: SenseBoxApi + ?Sized,
{
    match resolve_sensor(api, box_id, &options.matcher).await {
        SensorResolution::Found(sensor_id) => {
            let report =
                fetch_measurements(api, box_id, &sensor_id, cutoff, options.sample_limit).await;
            tracing::debug!(
                %box_id,
                %sensor_id,
                accepted = report.values.len(),
                errors = report.errors.len(),
                "fetched senseBox measurements"
            );
            for err in &report.errors {
                tracing::warn!(%box_id, error = %err, "senseBox measurement problem");
            }
            report
        }
        SensorResolution::InvalidStationId => {
            tracing::warn!(%box_id, "skipping malformed senseBox id");
            StationReport::default()
        }
        SensorResolution::NotApplicable => {
            tracing::debug!(
                %box_id,
                phrase = options.matcher.phrase(),
                "senseBox has no matching sensor"
            );
            StationReport::default()
        }
        SensorResolution::Unavailable(reason) => {
            tracing::warn!(%box_id, error = %reason, "senseBox metadata unavailable");
            StationReport::default()
        }
    }
}

/// The configured boxes plus everything needed to aggregate them on demand.
#[derive(Clone)]
pub struct TemperatureService {
    api: Arc<dyn SenseBoxApi>,
    clock: Arc<dyn Clock>,
    box_ids: Arc<[String]>,
    options: AggregateOptions,
    deadline: Duration,
}

impl TemperatureService {
    pub fn new(
        api: Arc<dyn SenseBoxApi>,
        clock: Arc<dyn Clock>,
        box_ids: Vec<String>,
        options: AggregateOptions,
        deadline: Duration,
    ) -> Self {
        Self {
            api,
            clock,
            box_ids: box_ids.into(),
            options,
            deadline,
        }
    }

    pub fn box_ids(&self) -> &[String] {
        &self.box_ids
    }

    pub async fn current(&self) -> Result<AggregateOutcome, TemperatureError> {
        let work = compute_aggregate(
            self.api.as_ref(),
            &self.box_ids,
            self.clock.as_ref(),
            &self.options,
        );
        tokio::time::timeout(self.deadline, work)
            .await
            .map_err(|_| TemperatureError::TimedOut(self.deadline))
    }
}
