//! # Local Constants Extraction and Persistence
//!
//! The one-time batch path: query the gridded model once per constituent at
//! the fixed deployment point and persist the resulting (amplitude, phase)
//! pairs as a small location-tagged JSON record. Prediction can then run
//! from that record without touching the multi-gigabyte model grids.
//!
//! ## Record contract
//! - Parallel arrays: `constituents`, `amplitude` (meters) and `phase`
//!   (degrees) have equal length and 1:1 correspondence. A record failing
//!   that check is corrupt and is rejected before use.
//! - One record per (location, model) pair; regeneration replaces the file
//!   atomically (write-then-rename), never partially.
//! - A constituent whose grid file is absent, or which the interpolation
//!   cannot resolve even by extrapolation, is omitted from the record and
//!   logged. Downstream an omitted constituent simply contributes zero —
//!   extraction does not fail as a whole for partial misses.
//!
//! The extraction job runs out-of-band from request serving (see the
//! `extract-constants` binary) and is idempotent: rerunning with the same
//! inputs overwrites the prior record with an equivalent one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::grid::{ConstituentError, GridModel, ModelVariant};
use crate::{constituents, ConstituentConstant};

/// Constituents a record must carry before the cached-local path is
/// considered ready for production use.
const MAJOR_CONSTITUENTS: [&str; 8] = ["m2", "s2", "n2", "k2", "k1", "o1", "p1", "q1"];

/// Failures of the persisted record path.
#[derive(Debug, Error)]
pub enum RecordError {
    /// No record at the expected path; run the extraction job first
    #[error("constants record not found: {0}")]
    Missing(PathBuf),

    /// Record exists but is structurally invalid (bad JSON, unequal arrays)
    #[error("constants record corrupt: {0}")]
    Corrupt(String),

    /// Filesystem problem reading or writing the record
    #[error("record IO: {0}")]
    Io(#[from] io::Error),
}

/// Harmonic constants for one fixed location, extracted from one model.
///
/// The on-disk format is the parallel-array JSON layout consumers of the
/// original cache file expect, plus the model identifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalConstantsRecord {
    /// Latitude of the extraction point (degrees north)
    pub latitude: f64,
    /// Longitude of the extraction point (degrees east)
    pub longitude: f64,
    /// Model identifier the constants were extracted from (file suffix form)
    pub model: String,
    /// Constituent names, in catalog order
    pub constituents: Vec<String>,
    /// Amplitudes in meters, parallel to `constituents`
    pub amplitude: Vec<f64>,
    /// Phase lags in degrees, parallel to `constituents`
    pub phase: Vec<f64>,
}

impl LocalConstantsRecord {
    /// Check the parallel-array invariant.
    pub fn validate(&self) -> Result<(), RecordError> {
        let n = self.constituents.len();
        if self.amplitude.len() != n || self.phase.len() != n {
            return Err(RecordError::Corrupt(format!(
                "array lengths differ: {} constituents, {} amplitudes, {} phases",
                n,
                self.amplitude.len(),
                self.phase.len()
            )));
        }
        Ok(())
    }

    /// True once the record carries all major constituents; a record below
    /// this bar predicts, but not at production fidelity.
    pub fn is_ready(&self) -> bool {
        MAJOR_CONSTITUENTS
            .iter()
            .all(|name| self.constituents.iter().any(|c| c == name))
    }

    /// View the record as synthesis inputs.
    pub fn constants(&self) -> Vec<ConstituentConstant> {
        self.constituents
            .iter()
            .zip(self.amplitude.iter().zip(&self.phase))
            .map(|(name, (&amplitude, &phase))| ConstituentConstant {
                name: name.clone(),
                amplitude,
                phase,
            })
            .collect()
    }

    /// Load and validate a persisted record.
    pub fn load(path: &Path) -> Result<LocalConstantsRecord, RecordError> {
        if !path.is_file() {
            return Err(RecordError::Missing(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        let record: LocalConstantsRecord = serde_json::from_slice(&bytes)
            .map_err(|e| RecordError::Corrupt(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// Persist the record atomically: write a sibling temp file, then
    /// rename over the target so readers never observe a partial record.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self).map_err(io::Error::other)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Conventional record location inside the model directory.
pub fn default_record_path(model_dir: &Path, variant: ModelVariant) -> PathBuf {
    model_dir.join(format!("local_constants_{}.json", variant.file_suffix()))
}

/// Extract harmonic constants for a fixed point from a loaded grid model.
///
/// Walks the full catalog; per-constituent misses are logged and omitted,
/// never fatal. The returned record may therefore be shorter than the
/// catalog (and shorter than the model's own file set).
pub fn extract(model: &GridModel, latitude: f64, longitude: f64) -> LocalConstantsRecord {
    let mut record = LocalConstantsRecord {
        latitude,
        longitude,
        model: model.variant().file_suffix().to_string(),
        constituents: Vec::new(),
        amplitude: Vec::new(),
        phase: Vec::new(),
    };

    for c in constituents::CATALOG {
        match model.interpolate(c.name, longitude, latitude) {
            Ok((amplitude, phase)) => {
                record.constituents.push(c.name.to_string());
                record.amplitude.push(amplitude);
                record.phase.push(phase);
            }
            Err(ConstituentError::FileMissing(_)) => {
                warn!(constituent = c.name, "omitted: model file absent");
            }
            Err(ConstituentError::Unresolved(_)) => {
                warn!(constituent = c.name, "omitted: unresolved after extrapolation");
            }
        }
    }

    info!(
        extracted = record.constituents.len(),
        catalog = constituents::CATALOG.len(),
        lat = latitude,
        lon = longitude,
        "constant extraction complete"
    );
    record
}
