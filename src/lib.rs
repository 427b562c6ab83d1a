//! # Tide Predictor Core Library
//!
//! This library implements the tidal harmonic prediction subsystem of the
//! Dahab marine-conditions service. It converts a small set of per-location
//! harmonic constants (amplitude/phase per tidal constituent) into a
//! deterministic hourly sea-height forecast for a fixed coastal point.
//!
//! ## Design Philosophy
//!
//! ### Two resolution paths, one synthesis core
//! Harmonic constants for the configured point can be resolved two ways:
//! - **Grid-direct**: interpolate each constituent against a gridded tidal
//!   model (GOT4.10 or FES2022) at prediction time. Robust, but requires the
//!   full model files on disk and pays the interpolation cost per call.
//! - **Cached-local**: load a [`extract::LocalConstantsRecord`] produced once
//!   by the offline extraction job. Tiny, fast, and byte-for-byte stable.
//!
//! Both paths feed the same pure synthesis core ([`synth::synthesize`]),
//! which has no I/O, no hidden state, and no location awareness — spatial
//! resolution happens exactly once, not per timestamp.
//!
//! ### Explicit handles, no globals
//! The loaded grid model and the cached constants record are immutable
//! values threaded through function arguments. They may be shared freely
//! across worker invocations without locking; nothing in this crate mutates
//! shared state after load.
//!
//! ### Failure containment
//! Per-constituent problems (a missing grid file, a point the extrapolation
//! cannot reach) degrade the forecast's fidelity but never abort a call.
//! Whole-resource problems (model directory absent, record missing or
//! corrupt) collapse into a single [`predict::TideError`] at the boundary —
//! callers see `Result`, never a panic.
//!
//! ## Data Flow
//! 1. **Extraction (offline, once)**: grid model → [`extract::extract`] →
//!    JSON record on disk
//! 2. **Prediction (per request)**: config → constants (grid or record) →
//!    [`synth::synthesize`] → datum offset + cm conversion → [`TideSeries`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod astro;
pub mod config;
pub mod constituents;
pub mod extract;
pub mod grid;
pub mod predict;
pub mod synth;

/// A single harmonic constant: one constituent's amplitude and phase lag
/// at the configured point.
///
/// Units are fixed throughout the crate: amplitude in meters (non-negative),
/// phase in degrees in `[0, 360)`. These are the values a gridded tidal
/// model stores per cell, interpolated to the target point.
///
/// # Example
/// ```
/// use tide_predictor::ConstituentConstant;
///
/// // Principal lunar semidiurnal constituent at Dahab (illustrative values)
/// let m2 = ConstituentConstant {
///     name: "m2".to_string(),
///     amplitude: 0.31,
///     phase: 221.4,
/// };
/// assert!(m2.amplitude >= 0.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstituentConstant {
    /// Constituent name, lower-case (e.g. "m2", "k1")
    pub name: String,
    /// Amplitude in meters
    pub amplitude: f64,
    /// Phase lag in degrees, `[0, 360)`
    pub phase: f64,
}

/// One entry of the hourly forecast: a UTC timestamp and the predicted
/// sea height in integer centimeters above chart datum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TidePoint {
    /// Timestamp, always on an exact UTC hour boundary
    pub time: DateTime<Utc>,
    /// Predicted height in centimeters (datum offset already applied)
    pub height_cm: i32,
}

/// The complete hourly forecast returned by [`predict::predict`].
///
/// Invariants (enforced by construction, checked by tests):
/// - timestamps strictly increase by exactly one hour
/// - length equals the configured forecast horizon
/// - the first timestamp is the current UTC hour floored to the hour
///   boundary at evaluation time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TideSeries {
    /// Hourly forecast points, oldest first
    pub points: Vec<TidePoint>,
}

impl TideSeries {
    /// Heights only, in forecast order. Convenient for callers that carry
    /// the start timestamp separately (the original API payload did).
    pub fn heights_cm(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.height_cm).collect()
    }
}
