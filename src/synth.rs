//! # Harmonic Synthesis
//!
//! The pure numeric core: given per-constituent harmonic constants and an
//! ordered list of UTC timestamps, produce one sea height in meters per
//! timestamp.
//!
//! Per timestamp `t` and constituent `c` the contribution is
//!
//! ```text
//! f_c(t) * A_c * cos( V0_c(t) + u_c(t) - g_c )
//! ```
//!
//! with `V0` the equilibrium argument, `(f, u)` the nodal corrections for
//! the selected [`CorrectionVariant`], `A_c` the amplitude in meters and
//! `g_c` the phase lag in degrees. The sum over constituents is the height
//! relative to the model's mean sea level — datum shifts and unit
//! conversion are deliberately not this module's business.
//!
//! The computation is stateless with no dependency between timestamps or
//! constituents. At the instance sizes this service sees (dozens of
//! constituents, a few hundred timestamps) a single-threaded evaluation is
//! plenty; callers that need isolation from an I/O loop offload the whole
//! call instead (see [`crate::predict`]).

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::astro::{self, CorrectionVariant};
use crate::constituents::{self, Constituent};
use crate::ConstituentConstant;

/// Synthesize sea heights in meters, one per timestamp.
///
/// Constants whose name is not in the catalog are skipped (logged at debug
/// level): an unknown constituent contributes zero amplitude, it is never
/// an error. Output values are unclamped 64-bit floats.
pub fn synthesize(
    constants: &[ConstituentConstant],
    timestamps: &[DateTime<Utc>],
    variant: CorrectionVariant,
) -> Vec<f64> {
    // Resolve catalog entries once, outside the time loop
    let resolved: Vec<(&'static Constituent, f64, f64)> = constants
        .iter()
        .filter_map(|cc| match constituents::lookup(&cc.name) {
            Some(c) => Some((c, cc.amplitude, cc.phase.to_radians())),
            None => {
                debug!(constituent = %cc.name, "unknown constituent, contributes zero");
                None
            }
        })
        .collect();

    timestamps
        .iter()
        .map(|&t| {
            let angles = astro::mean_longitudes(t);
            resolved
                .iter()
                .map(|&(c, amp, phase_rad)| {
                    let v0 = astro::equilibrium_argument(c, &angles).to_radians();
                    let (f, u) = astro::nodal_corrections(c.nodal, &angles, variant);
                    f * amp * (v0 + u.to_radians() - phase_rad).cos()
                })
                .sum()
        })
        .collect()
}
