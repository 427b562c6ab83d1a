//! # Tide Prediction Service
//!
//! The orchestration layer: resolve harmonic constants for the configured
//! point (live grid interpolation or the persisted record), run the
//! synthesis core across the forecast window, then apply the datum offset
//! and convert to integer centimeters.
//!
//! This module is the only place where model selection, datum correction
//! and unit conversion happen; the synthesis core stays unit- and
//! datum-agnostic. It is also the failure boundary: per-constituent misses
//! are absorbed and logged here (GridDirect) or at extraction time
//! (CachedLocal), while whole-resource failures surface as a single
//! [`TideError`] — a prediction attempt is unavailable, never a panic.
//!
//! Prediction is CPU-bound and synchronous. Services with an async request
//! loop call [`predict_async`], which offloads the work onto the blocking
//! thread pool so concurrent I/O is never stalled behind the synthesis.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{PredictConfig, ResolutionStrategy};
use crate::extract::{self, LocalConstantsRecord, RecordError};
use crate::grid::{GridError, GridModel};
use crate::{constituents, synth, ConstituentConstant, TidePoint, TideSeries};

/// Whole-prediction failures. Every variant means "no forecast this time";
/// the cause distinguishes what an operator needs to fix.
#[derive(Debug, Error)]
pub enum TideError {
    /// Grid model data absent or unreadable
    #[error(transparent)]
    Model(#[from] GridError),

    /// Persisted constants record missing or corrupt (CachedLocal only)
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The offloaded prediction task was cancelled or panicked
    #[error("prediction worker failed: {0}")]
    Worker(String),
}

/// Predict the hourly tide forecast starting from the current UTC hour.
pub fn predict(config: &PredictConfig) -> Result<TideSeries, TideError> {
    predict_at(config, Utc::now())
}

/// Like [`predict`], with an explicit evaluation instant. The series
/// starts at `now` floored to the hour boundary.
pub fn predict_at(config: &PredictConfig, now: DateTime<Utc>) -> Result<TideSeries, TideError> {
    // Floor to the current UTC hour; the fallback is unreachable for any
    // representable `now` but avoids a panic path
    let floored = now.timestamp().div_euclid(3600) * 3600;
    let start = DateTime::<Utc>::from_timestamp(floored, 0).unwrap_or(now);

    let timestamps: Vec<DateTime<Utc>> = (0..config.horizon_hours as i64)
        .map(|i| start + Duration::hours(i))
        .collect();

    let constants = resolve_constants(config)?;
    let heights_m = synth::synthesize(&constants, &timestamps, config.variant.correction());

    let points: Vec<TidePoint> = timestamps
        .into_iter()
        .zip(heights_m)
        .map(|(time, m)| TidePoint {
            time,
            // round half away from zero, then shift MSL -> chart datum
            height_cm: (m * 100.0).round() as i32 + config.datum_offset_cm,
        })
        .collect();

    let min = points.iter().map(|p| p.height_cm).min().unwrap_or(0);
    let max = points.iter().map(|p| p.height_cm).max().unwrap_or(0);
    info!(
        values = points.len(),
        range_min_cm = min,
        range_max_cm = max,
        offset_cm = config.datum_offset_cm,
        "computed tide forecast"
    );

    Ok(TideSeries { points })
}

/// Async wrapper: run the CPU-bound prediction on the blocking pool.
pub async fn predict_async(config: PredictConfig) -> Result<TideSeries, TideError> {
    match tokio::task::spawn_blocking(move || predict(&config)).await {
        Ok(result) => result,
        Err(join_err) => Err(TideError::Worker(join_err.to_string())),
    }
}

/// Resolve the per-constituent constants once for the configured point.
fn resolve_constants(config: &PredictConfig) -> Result<Vec<ConstituentConstant>, TideError> {
    match config.strategy {
        ResolutionStrategy::GridDirect => {
            let model = GridModel::load(&config.model_dir, config.variant)?;
            let mut constants = Vec::new();
            for c in constituents::CATALOG {
                match model.interpolate(c.name, config.longitude, config.latitude) {
                    Ok((amplitude, phase)) => constants.push(ConstituentConstant {
                        name: c.name.to_string(),
                        amplitude,
                        phase,
                    }),
                    Err(e) => warn!(constituent = c.name, error = %e, "skipping constituent"),
                }
            }
            Ok(constants)
        }
        ResolutionStrategy::CachedLocal => {
            let path = extract::default_record_path(&config.model_dir, config.variant);
            let record = LocalConstantsRecord::load(&path)?;
            if record.model != config.variant.file_suffix() {
                return Err(RecordError::Corrupt(format!(
                    "record was extracted from model {:?}, configured model is {:?}",
                    record.model,
                    config.variant.file_suffix()
                ))
                .into());
            }
            Ok(record.constants())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ModelVariant;
    use chrono::{TimeZone, Timelike};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_grid(dir: &Path, name: &str, amp: f64, phase: f64) {
        let axis: Vec<f64> = (0..5).map(|v| 27.0 + v as f64 * 2.0).collect();
        let field = |v: f64| vec![vec![Some(v); 5]; 5];
        let body = serde_json::json!({
            "lat": axis,
            "lon": axis,
            "amplitude": field(amp),
            "phase": field(phase),
        });
        fs::write(
            dir.join(format!("{name}_fes2022.json")),
            serde_json::to_vec(&body).unwrap(),
        )
        .unwrap();
    }

    /// A model directory with a plausible Gulf of Aqaba constituent set,
    /// covering the Dahab point (28.4937 N, 34.5131 E is inside 27..35).
    fn dahab_model(dir: &Path) {
        write_grid(dir, "m2", 0.31, 221.4);
        write_grid(dir, "s2", 0.12, 248.7);
        write_grid(dir, "n2", 0.07, 214.9);
        write_grid(dir, "k2", 0.03, 246.5);
        write_grid(dir, "k1", 0.18, 133.0);
        write_grid(dir, "o1", 0.09, 127.2);
        write_grid(dir, "p1", 0.06, 131.8);
        write_grid(dir, "q1", 0.02, 121.5);
    }

    fn grid_config(dir: &Path) -> PredictConfig {
        PredictConfig {
            variant: ModelVariant::Fes2022,
            strategy: ResolutionStrategy::GridDirect,
            horizon_hours: 168,
            datum_offset_cm: 45,
            model_dir: dir.to_path_buf(),
            latitude: 28.4937,
            longitude: 34.5131,
        }
    }

    #[test]
    fn forecast_has_exact_length_spacing_and_start() {
        let dir = TempDir::new().unwrap();
        dahab_model(dir.path());
        let config = grid_config(dir.path());

        let now = Utc.with_ymd_and_hms(2026, 8, 26, 13, 47, 31).unwrap();
        let series = predict_at(&config, now).unwrap();

        assert_eq!(series.points.len(), 168);
        assert_eq!(
            series.points[0].time,
            Utc.with_ymd_and_hms(2026, 8, 26, 13, 0, 0).unwrap()
        );
        for w in series.points.windows(2) {
            assert_eq!(w[1].time - w[0].time, Duration::hours(1));
        }
        assert_eq!(series.points[0].time.minute(), 0);
        assert_eq!(series.points[0].time.second(), 0);
    }

    #[test]
    fn datum_offset_shifts_every_value_linearly() {
        let dir = TempDir::new().unwrap();
        dahab_model(dir.path());
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 6, 15, 0).unwrap();

        let mut config = grid_config(dir.path());
        config.datum_offset_cm = 0;
        let base = predict_at(&config, now).unwrap();
        config.datum_offset_cm = 37;
        let shifted = predict_at(&config, now).unwrap();

        for (b, s) in base.points.iter().zip(&shifted.points) {
            assert_eq!(s.height_cm - b.height_cm, 37);
        }
    }

    #[test]
    fn single_solar_constituent_round_trips_units() {
        // S2 with 0.30 m amplitude and zero phase peaks at UT midnight
        // (argument and nodal correction both zero): exactly 30 cm before
        // the datum shift, 75 cm after the Dahab offset.
        let dir = TempDir::new().unwrap();
        write_grid(dir.path(), "s2", 0.30, 0.0);

        let mut config = grid_config(dir.path());
        config.horizon_hours = 1;
        config.datum_offset_cm = 0;
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 0, 20, 0).unwrap();
        let series = predict_at(&config, now).unwrap();
        assert_eq!(series.points[0].height_cm, 30);

        config.datum_offset_cm = 45;
        let series = predict_at(&config, now).unwrap();
        assert_eq!(series.points[0].height_cm, 75);
    }

    #[test]
    fn cached_path_matches_grid_path_within_one_cm() {
        let dir = TempDir::new().unwrap();
        dahab_model(dir.path());
        let config = grid_config(dir.path());

        // Extract a record from the same model and store it where the
        // cached-local path expects it
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();
        let record = extract::extract(&model, config.latitude, config.longitude);
        record
            .save(&extract::default_record_path(
                dir.path(),
                ModelVariant::Fes2022,
            ))
            .unwrap();

        let now = Utc.with_ymd_and_hms(2026, 8, 26, 9, 5, 0).unwrap();
        let direct = predict_at(&config, now).unwrap();

        let mut cached_config = config.clone();
        cached_config.strategy = ResolutionStrategy::CachedLocal;
        let cached = predict_at(&cached_config, now).unwrap();

        assert_eq!(direct.points.len(), cached.points.len());
        for (d, c) in direct.points.iter().zip(&cached.points) {
            assert!(
                (d.height_cm - c.height_cm).abs() <= 1,
                "{} vs {} at {}",
                d.height_cm,
                c.height_cm,
                d.time
            );
        }
    }

    #[test]
    fn cached_path_without_record_is_unavailable() {
        let dir = TempDir::new().unwrap();
        dahab_model(dir.path());
        let mut config = grid_config(dir.path());
        config.strategy = ResolutionStrategy::CachedLocal;

        let err = predict(&config).unwrap_err();
        assert!(matches!(err, TideError::Record(RecordError::Missing(_))));
    }

    #[test]
    fn missing_model_directory_is_unavailable() {
        let config = grid_config(Path::new("/nonexistent/tide-models"));
        let err = predict(&config).unwrap_err();
        assert!(matches!(
            err,
            TideError::Model(GridError::ModelFilesMissing(_))
        ));
    }

    #[test]
    fn record_from_other_model_is_rejected() {
        let dir = TempDir::new().unwrap();
        dahab_model(dir.path());
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();
        let mut record = extract::extract(&model, 28.4937, 34.5131);
        record.model = "got410".to_string();
        record
            .save(&extract::default_record_path(
                dir.path(),
                ModelVariant::Fes2022,
            ))
            .unwrap();

        let mut config = grid_config(dir.path());
        config.strategy = ResolutionStrategy::CachedLocal;
        let err = predict(&config).unwrap_err();
        assert!(matches!(err, TideError::Record(RecordError::Corrupt(_))));
    }

    #[test]
    fn prediction_is_deterministic_for_a_fixed_instant() {
        let dir = TempDir::new().unwrap();
        dahab_model(dir.path());
        let config = grid_config(dir.path());
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 9, 0, 0).unwrap();

        let a = predict_at(&config, now).unwrap();
        let b = predict_at(&config, now).unwrap();
        assert_eq!(a.heights_cm(), b.heights_cm());
    }

    #[tokio::test]
    async fn async_offload_matches_sync_result() {
        let dir = TempDir::new().unwrap();
        dahab_model(dir.path());
        let config = grid_config(dir.path());

        // Compare at a frozen instant to keep the two calls aligned
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 10, 30, 0).unwrap();
        let sync = predict_at(&config, now).unwrap();

        let mut async_config = config.clone();
        async_config.horizon_hours = sync.points.len() as u32;
        let task_config = async_config.clone();
        let offloaded =
            tokio::task::spawn_blocking(move || predict_at(&task_config, now)).await.unwrap();
        assert_eq!(offloaded.unwrap().heights_cm(), sync.heights_cm());

        // And the public wrapper completes without blocking the runtime
        let live = predict_async(async_config).await.unwrap();
        assert_eq!(live.points.len(), sync.points.len());
    }
}
