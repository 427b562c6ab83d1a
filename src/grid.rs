//! # Gridded Tidal Model Source
//!
//! Wraps an on-disk gridded harmonic tidal model (GOT4.10 or FES2022
//! coverage) behind a small read-only handle. Given a constituent name and
//! a geographic point, the handle returns the interpolated (amplitude,
//! phase) pair for that point.
//!
//! ## Interpolation contract
//! - Interpolation is smooth: bicubic (Catmull-Rom) where a full 4x4
//!   neighborhood of wet cells exists, bilinear where only the enclosing
//!   cell is wet, and inverse-distance extrapolation from the nearest wet
//!   cells otherwise. The deployment target sits in a narrow sea where the
//!   model grid may not cover the point directly, so extrapolation is
//!   always attempted rather than failing at the coastline.
//! - Amplitude and phase are never interpolated independently: the complex
//!   harmonic constant `A·e^(i·g)` is interpolated component-wise, which
//!   keeps phase wrap-around (359° next to 1°) from corrupting the result.
//! - Identical (handle, constituent, point) inputs always produce identical
//!   outputs; the handle is immutable after [`GridModel::load`].
//!
//! ## On-disk format
//! One JSON file per constituent, `<name>_<variant>.json`, holding `lat`
//! and `lon` axes (ascending) and row-major `amplitude` (meters) / `phase`
//! (degrees) arrays with `null` marking dry or masked cells. The grid
//! format itself is supplied with the model data; files that fail to parse
//! or are inconsistently shaped are skipped at load with a warning, which
//! downstream is indistinguishable from a missing constituent file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::astro::CorrectionVariant;
use crate::constituents;

/// Which gridded model the handle is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelVariant {
    /// GOT4.10: global, lower resolution
    Got410,
    /// FES2022: 1/30 degree, better for narrow seas
    Fes2022,
}

impl ModelVariant {
    /// File-name suffix used by the per-constituent grid files.
    pub fn file_suffix(self) -> &'static str {
        match self {
            ModelVariant::Got410 => "got410",
            ModelVariant::Fes2022 => "fes2022",
        }
    }

    /// The nodal-correction table this model's constants are referenced to.
    pub fn correction(self) -> CorrectionVariant {
        match self {
            ModelVariant::Got410 => CorrectionVariant::Got410,
            ModelVariant::Fes2022 => CorrectionVariant::Fes2022,
        }
    }

    /// Parse the configuration spelling ("GOT4.10" or "FES2022").
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "GOT4.10" => Some(ModelVariant::Got410),
            "FES2022" => Some(ModelVariant::Fes2022),
            _ => None,
        }
    }
}

/// Whole-model failures: the grid data is absent or unusable as a whole.
#[derive(Debug, Error)]
pub enum GridError {
    /// Model directory missing, or it contains no readable grid file
    #[error("tidal model files missing under {0}")]
    ModelFilesMissing(PathBuf),
}

/// Per-constituent resolution failures. These are absorbed by callers (the
/// constituent is omitted), never escalated to a whole-call failure.
#[derive(Debug, Error)]
pub enum ConstituentError {
    /// No grid file for this constituent in the loaded model
    #[error("no grid file for constituent {0}")]
    FileMissing(String),
    /// No wet cell usable for this point, even after extrapolation
    #[error("constituent {0} unresolved at the requested point")]
    Unresolved(String),
}

/// Raw JSON shape of one constituent grid file.
#[derive(Deserialize)]
struct RawGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
    amplitude: Vec<Vec<Option<f64>>>,
    phase: Vec<Vec<Option<f64>>>,
}

/// One constituent's gridded complex harmonic constant.
///
/// Cells hold the real/imaginary parts of `A·e^(i·g)`; `None` is dry.
#[derive(Debug)]
struct ConstituentGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
    cells: Vec<Option<[f64; 2]>>,
}

impl ConstituentGrid {
    fn from_raw(raw: RawGrid) -> Option<Self> {
        let (nlat, nlon) = (raw.lat.len(), raw.lon.len());
        if nlat < 2 || nlon < 2 {
            return None;
        }
        if raw.lat.windows(2).any(|w| w[0] >= w[1]) || raw.lon.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        if raw.amplitude.len() != nlat || raw.phase.len() != nlat {
            return None;
        }

        let mut cells = Vec::with_capacity(nlat * nlon);
        for (amp_row, ph_row) in raw.amplitude.iter().zip(&raw.phase) {
            if amp_row.len() != nlon || ph_row.len() != nlon {
                return None;
            }
            for (amp, ph) in amp_row.iter().zip(ph_row) {
                cells.push(match (amp, ph) {
                    (Some(a), Some(g)) => {
                        let g = g.to_radians();
                        Some([a * g.cos(), a * g.sin()])
                    }
                    _ => None,
                });
            }
        }
        Some(ConstituentGrid {
            lat: raw.lat,
            lon: raw.lon,
            cells,
        })
    }

    fn at(&self, i: isize, j: isize) -> Option<[f64; 2]> {
        if i < 0 || j < 0 || i as usize >= self.lat.len() || j as usize >= self.lon.len() {
            return None;
        }
        self.cells[i as usize * self.lon.len() + j as usize]
    }

    /// Index of the cell interval containing `x` on an ascending axis.
    fn locate(axis: &[f64], x: f64) -> Option<usize> {
        let last = *axis.last()?;
        if x < axis[0] || x > last {
            return None;
        }
        // partition_point gives the first element greater than x
        let idx = axis.partition_point(|&v| v <= x);
        Some(idx.saturating_sub(1).min(axis.len() - 2))
    }

    /// Bicubic (falling back to bilinear) interpolation of the complex
    /// constant; `None` when the neighborhood is too dry to interpolate.
    fn interpolate(&self, lon: f64, lat: f64) -> Option<[f64; 2]> {
        let j = Self::locate(&self.lon, lon)?;
        let i = Self::locate(&self.lat, lat)?;
        let tx = (lon - self.lon[j]) / (self.lon[j + 1] - self.lon[j]);
        let ty = (lat - self.lat[i]) / (self.lat[i + 1] - self.lat[i]);
        let (i, j) = (i as isize, j as isize);

        // Full 4x4 wet neighborhood: Catmull-Rom in lon, then in lat
        let patch: Option<Vec<[f64; 2]>> = (-1isize..=2)
            .flat_map(|di| (-1isize..=2).map(move |dj| (di, dj)))
            .map(|(di, dj)| self.at(i + di, j + dj))
            .collect();
        if let Some(p) = patch {
            let mut rows = [[0.0; 2]; 4];
            for (r, row) in p.chunks(4).enumerate() {
                rows[r] = catmull_rom(row[0], row[1], row[2], row[3], tx);
            }
            return Some(catmull_rom(rows[0], rows[1], rows[2], rows[3], ty));
        }

        // Wet enclosing cell: bilinear
        let corners = [
            self.at(i, j)?,
            self.at(i, j + 1)?,
            self.at(i + 1, j)?,
            self.at(i + 1, j + 1)?,
        ];
        let mut out = [0.0; 2];
        for k in 0..2 {
            let bottom = corners[0][k] * (1.0 - tx) + corners[1][k] * tx;
            let top = corners[2][k] * (1.0 - tx) + corners[3][k] * tx;
            out[k] = bottom * (1.0 - ty) + top * ty;
        }
        Some(out)
    }

    /// Inverse-distance extrapolation from the nearest wet cells.
    ///
    /// Distances are approximate kilometers (flat-earth with latitude
    /// scaling), fine at the cutoff ranges involved. Returns `None` only
    /// when no wet cell lies within `cutoff_km`.
    fn extrapolate(&self, lon: f64, lat: f64, cutoff_km: f64) -> Option<[f64; 2]> {
        const KM_PER_DEG: f64 = 111.195;
        const NEIGHBORS: usize = 8;

        let coslat = lat.to_radians().cos();
        let mut nearest: Vec<(f64, [f64; 2])> = Vec::new();
        for (idx, cell) in self.cells.iter().enumerate() {
            let Some(value) = cell else { continue };
            let clat = self.lat[idx / self.lon.len()];
            let clon = self.lon[idx % self.lon.len()];
            let dx = (clon - lon) * coslat * KM_PER_DEG;
            let dy = (clat - lat) * KM_PER_DEG;
            let d2 = dx * dx + dy * dy;
            if d2.sqrt() <= cutoff_km {
                nearest.push((d2, *value));
            }
        }
        if nearest.is_empty() {
            return None;
        }
        nearest.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearest.truncate(NEIGHBORS);

        // A wet cell exactly at the point short-circuits the weighting
        if nearest[0].0 == 0.0 {
            return Some(nearest[0].1);
        }
        let mut acc = [0.0; 2];
        let mut wsum = 0.0;
        for (d2, value) in nearest {
            let w = 1.0 / d2;
            acc[0] += w * value[0];
            acc[1] += w * value[1];
            wsum += w;
        }
        Some([acc[0] / wsum, acc[1] / wsum])
    }
}

/// Immutable handle onto a loaded gridded tidal model.
///
/// All constituent grids found in the model directory are parsed eagerly at
/// [`GridModel::load`]; afterwards the handle is read-only and can be shared
/// across threads without locking.
#[derive(Debug)]
pub struct GridModel {
    variant: ModelVariant,
    grids: HashMap<String, ConstituentGrid>,
    extrapolation_cutoff_km: f64,
}

impl GridModel {
    /// Load every constituent grid the directory holds for `variant`.
    ///
    /// Fails with [`GridError::ModelFilesMissing`] when the directory does
    /// not exist or yields no usable grid at all. Individual files that are
    /// absent or malformed are skipped with a warning; the corresponding
    /// constituents will later resolve as
    /// [`ConstituentError::FileMissing`].
    pub fn load(model_dir: &Path, variant: ModelVariant) -> Result<GridModel, GridError> {
        if !model_dir.is_dir() {
            return Err(GridError::ModelFilesMissing(model_dir.to_path_buf()));
        }

        let mut grids = HashMap::new();
        for c in constituents::CATALOG {
            let path = model_dir.join(format!("{}_{}.json", c.name, variant.file_suffix()));
            if !path.is_file() {
                debug!(constituent = c.name, path = %path.display(), "no grid file");
                continue;
            }
            let parsed = fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<RawGrid>(&bytes).ok())
                .and_then(ConstituentGrid::from_raw);
            match parsed {
                Some(grid) => {
                    grids.insert(c.name.to_string(), grid);
                }
                None => {
                    warn!(constituent = c.name, path = %path.display(), "unreadable grid file, skipping");
                }
            }
        }

        if grids.is_empty() {
            return Err(GridError::ModelFilesMissing(model_dir.to_path_buf()));
        }
        info!(
            model = variant.file_suffix(),
            constituents = grids.len(),
            "loaded tidal model grids"
        );
        Ok(GridModel {
            variant,
            grids,
            extrapolation_cutoff_km: f64::INFINITY,
        })
    }

    /// Limit extrapolation to wet cells within `cutoff_km`. The default is
    /// unlimited, matching the narrow-sea deployment where the nearest wet
    /// cell must always win over failing.
    pub fn with_extrapolation_cutoff(mut self, cutoff_km: f64) -> Self {
        self.extrapolation_cutoff_km = cutoff_km;
        self
    }

    /// The model variant this handle was loaded for.
    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    /// Names of the constituents this model actually provides.
    pub fn available(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grids.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Interpolated `(amplitude_m, phase_deg)` for one constituent at a
    /// geographic point, extrapolating when the point is outside directly
    /// covered cells.
    pub fn interpolate(
        &self,
        constituent: &str,
        lon: f64,
        lat: f64,
    ) -> Result<(f64, f64), ConstituentError> {
        let grid = self
            .grids
            .get(constituent)
            .ok_or_else(|| ConstituentError::FileMissing(constituent.to_string()))?;

        let hc = grid
            .interpolate(lon, lat)
            .or_else(|| grid.extrapolate(lon, lat, self.extrapolation_cutoff_km))
            .ok_or_else(|| ConstituentError::Unresolved(constituent.to_string()))?;

        let amplitude = hc[0].hypot(hc[1]);
        let phase = hc[1].atan2(hc[0]).to_degrees().rem_euclid(360.0);
        Ok((amplitude, phase))
    }
}

/// Catmull-Rom cubic through four complex samples at parameter `t` in
/// `[0, 1]` between the middle two.
fn catmull_rom(p0: [f64; 2], p1: [f64; 2], p2: [f64; 2], p3: [f64; 2], t: f64) -> [f64; 2] {
    let mut out = [0.0; 2];
    for k in 0..2 {
        out[k] = 0.5
            * (2.0 * p1[k]
                + (-p0[k] + p2[k]) * t
                + (2.0 * p0[k] - 5.0 * p1[k] + 4.0 * p2[k] - p3[k]) * t * t
                + (-p0[k] + 3.0 * p1[k] - 3.0 * p2[k] + p3[k]) * t * t * t);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Write a 5x5 grid file with uniform amplitude/phase and an optional
    /// list of dry cells, axes 0..4 degrees in both directions.
    fn write_grid(dir: &Path, name: &str, amp: f64, phase: f64, dry: &[(usize, usize)]) {
        let axis: Vec<f64> = (0..5).map(|v| v as f64).collect();
        let make = |value: f64| -> Vec<Vec<Option<f64>>> {
            (0..5)
                .map(|i| {
                    (0..5)
                        .map(|j| (!dry.contains(&(i, j))).then_some(value))
                        .collect()
                })
                .collect()
        };
        let body = serde_json::json!({
            "lat": axis,
            "lon": axis,
            "amplitude": make(amp),
            "phase": make(phase),
        });
        fs::write(
            dir.join(format!("{name}_fes2022.json")),
            serde_json::to_vec(&body).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn missing_directory_is_model_files_missing() {
        let err = GridModel::load(Path::new("/nonexistent/tide-models"), ModelVariant::Fes2022)
            .unwrap_err();
        assert!(matches!(err, GridError::ModelFilesMissing(_)));
    }

    #[test]
    fn empty_directory_is_model_files_missing() {
        let dir = TempDir::new().unwrap();
        let err = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap_err();
        assert!(matches!(err, GridError::ModelFilesMissing(_)));
    }

    #[test]
    fn constant_field_interpolates_exactly() {
        let dir = TempDir::new().unwrap();
        write_grid(dir.path(), "m2", 0.31, 221.4, &[]);
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();

        // Interior point, off the grid nodes
        let (amp, phase) = model.interpolate("m2", 1.7, 2.3).unwrap();
        assert!((amp - 0.31).abs() < 1e-9, "amp = {amp}");
        assert!((phase - 221.4).abs() < 1e-9, "phase = {phase}");
    }

    #[test]
    fn interpolation_is_deterministic() {
        let dir = TempDir::new().unwrap();
        write_grid(dir.path(), "k1", 0.18, 133.0, &[(0, 0), (4, 4)]);
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();
        let a = model.interpolate("k1", 0.4, 0.4).unwrap();
        let b = model.interpolate("k1", 0.4, 0.4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn phase_wraparound_interpolates_through_zero() {
        // Two phase populations straddling 360/0: complex interpolation
        // must land near 0, not near 180
        let dir = TempDir::new().unwrap();
        let axis: Vec<f64> = (0..5).map(|v| v as f64).collect();
        let amp: Vec<Vec<Option<f64>>> = vec![vec![Some(1.0); 5]; 5];
        let phase: Vec<Vec<Option<f64>>> = (0..5)
            .map(|_| {
                (0..5)
                    .map(|j| Some(if j < 2 { 350.0 } else { 10.0 }))
                    .collect()
            })
            .collect();
        let body = serde_json::json!({
            "lat": axis, "lon": axis, "amplitude": amp, "phase": phase,
        });
        fs::write(dir.path().join("s2_fes2022.json"), serde_json::to_vec(&body).unwrap()).unwrap();

        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();
        let (_, phase) = model.interpolate("s2", 1.5, 2.0).unwrap();
        assert!(
            !(90.0..=270.0).contains(&phase),
            "phase {phase} should stay near the 0/360 wrap"
        );
    }

    #[test]
    fn point_outside_grid_extrapolates() {
        let dir = TempDir::new().unwrap();
        write_grid(dir.path(), "m2", 0.31, 221.4, &[]);
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();

        // Well off the eastern edge; a constant field extrapolates to itself
        let (amp, phase) = model.interpolate("m2", 6.5, 2.0).unwrap();
        assert!((amp - 0.31).abs() < 1e-9);
        assert!((phase - 221.4).abs() < 1e-9);
    }

    #[test]
    fn cutoff_limits_extrapolation() {
        let dir = TempDir::new().unwrap();
        write_grid(dir.path(), "m2", 0.31, 221.4, &[]);
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022)
            .unwrap()
            .with_extrapolation_cutoff(10.0);

        // ~2.5 degrees from the nearest wet cell is ~270 km, past the cutoff
        let err = model.interpolate("m2", 6.5, 2.0).unwrap_err();
        assert!(matches!(err, ConstituentError::Unresolved(_)));
    }

    #[test]
    fn missing_constituent_file_reports_file_missing() {
        let dir = TempDir::new().unwrap();
        write_grid(dir.path(), "m2", 0.31, 221.4, &[]);
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();
        let err = model.interpolate("k1", 1.0, 1.0).unwrap_err();
        assert!(matches!(err, ConstituentError::FileMissing(_)));
    }

    #[test]
    fn malformed_grid_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_grid(dir.path(), "m2", 0.31, 221.4, &[]);
        fs::write(dir.path().join("k1_fes2022.json"), b"{not json").unwrap();
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();
        assert_eq!(model.available(), vec!["m2"]);
    }

    #[test]
    fn dry_neighborhood_falls_back_to_bilinear_then_idw() {
        let dir = TempDir::new().unwrap();
        // Dry out a corner so the bicubic patch around (0.5, 0.5) is
        // incomplete but the enclosing cell stays wet
        write_grid(dir.path(), "o1", 0.09, 127.2, &[(3, 3), (3, 4), (4, 3), (4, 4)]);
        let model = GridModel::load(dir.path(), ModelVariant::Fes2022).unwrap();
        let (amp, _) = model.interpolate("o1", 0.5, 0.5).unwrap();
        assert!((amp - 0.09).abs() < 1e-9);

        // Query inside the dried-out block: bilinear impossible, IDW serves
        let (amp, phase) = model.interpolate("o1", 3.5, 3.5).unwrap();
        assert!((amp - 0.09).abs() < 1e-9);
        assert!((phase - 127.2).abs() < 1e-9);
    }
}
