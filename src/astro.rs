//! # Tidal Astronomy
//!
//! Astronomical-argument computation for harmonic synthesis: mean
//! longitudes of the moon and sun, the equilibrium argument of each
//! constituent, and the slow (~18.6-year) nodal modulation of amplitude
//! and phase.
//!
//! Two correction tables are supported, selected by [`CorrectionVariant`]:
//!
//! - [`CorrectionVariant::Got410`] uses the truncated sine-series
//!   development of the nodal factors (Ray's PERTH formulation, after
//!   Schureman 1958 Table 14), which is how the GOT-family models define
//!   their reference values.
//! - [`CorrectionVariant::Fes2022`] evaluates the exact Schureman formulas
//!   through the inclination of the lunar orbit `I` and the auxiliary
//!   angles `xi`, `nu`, `nu'`, `nu''`, matching the FES convention.
//!
//! Everything here is a pure function of UTC time. Location never enters:
//! the equilibrium argument is global by definition, and the spatial part
//! of the tide lives entirely in the per-constituent amplitude and phase.

use chrono::{DateTime, Timelike, Utc};

use crate::constituents::{Constituent, NodalFamily};

/// Selects the nodal-correction coefficient table of the source model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectionVariant {
    /// GOT4.10 convention: truncated sine series in the node longitude
    Got410,
    /// FES2022 convention: exact Schureman inclination formulas
    Fes2022,
}

/// Mean astronomical longitudes at one instant, all in degrees.
///
/// Computed from the polynomial expressions referenced to J2000
/// (epoch MJD 51544.4993), the same development the reference models use.
#[derive(Clone, Copy, Debug)]
pub struct AstroAngles {
    /// Mean longitude of the moon
    pub s: f64,
    /// Mean longitude of the sun
    pub h: f64,
    /// Mean longitude of the lunar perigee
    pub p: f64,
    /// Mean longitude of the ascending lunar node
    pub n: f64,
    /// Mean longitude of the solar perigee (perihelion)
    pub pp: f64,
    /// Hour angle of the mean sun: 15 degrees per hour from UT midnight
    pub t: f64,
}

/// Days between the Unix epoch and 2000-01-01T00:00:00Z.
const UNIX_TO_Y2K_DAYS: f64 = 10_957.0;

/// Offset from 2000-01-01T00:00Z to the J2000 reference of the longitude
/// polynomials (MJD 51544.4993).
const Y2K_TO_J2000: f64 = 0.4993;

/// Compute the mean astronomical longitudes for a UTC instant.
pub fn mean_longitudes(time: DateTime<Utc>) -> AstroAngles {
    // Days since 2000-01-01T00:00Z, then shift to the polynomial epoch
    let days = time.timestamp() as f64 / 86_400.0 - UNIX_TO_Y2K_DAYS;
    let t = days - Y2K_TO_J2000;

    let s = 218.3164 + 13.176_396_48 * t;
    let h = 280.4661 + 0.985_647_36 * t;
    let p = 83.3535 + 0.111_403_53 * t;
    let n = 125.0445 - 0.052_953_77 * t;
    let pp = 282.9384 + 0.000_047_1 * t;

    // Hour angle from UT midnight; seconds kept so the argument is smooth
    let hour = time.hour() as f64
        + time.minute() as f64 / 60.0
        + time.second() as f64 / 3600.0;

    AstroAngles {
        s: normalize_deg(s),
        h: normalize_deg(h),
        p: normalize_deg(p),
        n: normalize_deg(n),
        pp: normalize_deg(pp),
        t: 15.0 * hour,
    }
}

/// Wrap an angle in degrees to `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Equilibrium argument `V0` of a constituent in degrees, `[0, 360)`.
pub fn equilibrium_argument(c: &Constituent, a: &AstroAngles) -> f64 {
    let (ct, cs, ch, cp, cpp) = c.arg;
    normalize_deg(
        ct as f64 * a.t
            + cs as f64 * a.s
            + ch as f64 * a.h
            + cp as f64 * a.p
            + cpp as f64 * a.pp
            + c.shift,
    )
}

/// Nodal corrections `(f, u)` for a constituent family: `f` is the
/// dimensionless amplitude factor, `u` the phase correction in degrees.
pub fn nodal_corrections(
    family: NodalFamily,
    a: &AstroAngles,
    variant: CorrectionVariant,
) -> (f64, f64) {
    match variant {
        CorrectionVariant::Got410 => nodal_got(family, a),
        CorrectionVariant::Fes2022 => nodal_fes(family, a),
    }
}

/// Truncated sine-series corrections (GOT convention).
///
/// Coefficients from Schureman (1958) Table 14 as carried by Ray's PERTH
/// predictors; angles in degrees, node and perigee in radians internally.
fn nodal_got(family: NodalFamily, a: &AstroAngles) -> (f64, f64) {
    let n = a.n.to_radians();
    let p = a.p.to_radians();
    let (sinn, cosn) = n.sin_cos();
    let (sin2n, cos2n) = (2.0 * n).sin_cos();
    let sin3n = (3.0 * n).sin();

    let m2 = (1.0 - 0.037 * cosn, -2.1 * sinn);
    let k2 = (
        1.024 + 0.286 * cosn + 0.008 * cos2n,
        -17.7 * sinn + 0.7 * sin2n,
    );

    match family {
        NodalFamily::Solar => (1.0, 0.0),
        NodalFamily::Mm => (1.0 - 0.130 * cosn, 0.0),
        NodalFamily::Mf => (
            1.043 + 0.414 * cosn,
            -23.7 * sinn + 2.7 * sin2n - 0.4 * sin3n,
        ),
        NodalFamily::Msf => (m2.0, -m2.1),
        NodalFamily::O1 => (
            1.009 + 0.187 * cosn - 0.015 * cos2n,
            10.8 * sinn - 1.3 * sin2n + 0.2 * sin3n,
        ),
        NodalFamily::K1 => (
            1.006 + 0.115 * cosn - 0.009 * cos2n,
            -8.9 * sinn + 0.7 * sin2n,
        ),
        NodalFamily::J1 => (
            1.013 + 0.168 * cosn - 0.017 * cos2n,
            -12.9 * sinn + 1.3 * sin2n - 0.2 * sin3n,
        ),
        NodalFamily::M2 => m2,
        NodalFamily::L2 => {
            // Perigee-dependent composite (Ray's formulation)
            let fcos = 1.0
                - 0.25 * (2.0 * p).cos()
                - 0.11 * (2.0 * p - n).cos()
                - 0.04 * cosn;
            let fsin = -0.25 * (2.0 * p).sin() - 0.11 * (2.0 * p - n).sin() - 0.04 * sinn;
            (fcos.hypot(fsin), fsin.atan2(fcos).to_degrees())
        }
        NodalFamily::K2 => k2,
        NodalFamily::M3 => (m2.0.powf(1.5), 1.5 * m2.1),
        NodalFamily::M2Squared => (m2.0 * m2.0, 2.0 * m2.1),
        NodalFamily::M2Cubed => (m2.0.powi(3), 3.0 * m2.1),
        NodalFamily::M2Fourth => (m2.0.powi(4), 4.0 * m2.1),
        NodalFamily::Ms4 => m2,
        NodalFamily::Mks2 => (m2.0 * k2.0, m2.1 + k2.1),
    }
}

/// Exact Schureman corrections (FES convention).
///
/// Works through the inclination of the lunar orbit on the equator `I`
/// and the auxiliary angles `xi`, `nu`, `nu'`, `nu''` (Schureman 1958,
/// formulas 73-232 and Table 2 normalizing constants).
fn nodal_fes(family: NodalFamily, a: &AstroAngles) -> (f64, f64) {
    let n = a.n.to_radians();
    let p = a.p.to_radians();

    // Inclination of the moon's orbit with respect to the equator
    let i = (0.913_694_997 - 0.035_692_561 * n.cos()).acos();

    // Longitude in the moon's orbit of its intersection with the equator
    // (xi) and the right-ascension offset (nu)
    let at1 = (1.01883 * (n / 2.0).tan()).atan();
    let at2 = (0.64412 * (n / 2.0).tan()).atan();
    let mut xi = n - at1 - at2;
    if xi > std::f64::consts::PI {
        xi -= 2.0 * std::f64::consts::PI;
    }
    let nu = at1 - at2;

    let sin_i = i.sin();
    let sin_2i = (2.0 * i).sin();
    let cos_half = (i / 2.0).cos();
    let tan_half_sq = (i / 2.0).tan().powi(2);

    // Mean longitude of perigee reckoned from the ascending intersection
    let cap_p = p - xi;

    let f_m2 = cos_half.powi(4) / 0.9154;
    let u_m2 = (2.0 * xi - 2.0 * nu).to_degrees();

    let f_k2 = (19.0444 * sin_i.powi(4) + 2.7702 * sin_i.powi(2) * (2.0 * nu).cos() + 0.0981)
        .sqrt();
    // nu'' enters K2 as -2*nu''
    let two_nu_pp = (sin_i.powi(2) * (2.0 * nu).sin())
        .atan2(sin_i.powi(2) * (2.0 * nu).cos() + 0.0727);
    let u_k2 = -two_nu_pp.to_degrees();

    match family {
        NodalFamily::Solar => (1.0, 0.0),
        NodalFamily::Mm => ((2.0 / 3.0 - sin_i.powi(2)) / 0.5021, 0.0),
        NodalFamily::Mf => (sin_i.powi(2) / 0.1578, (-2.0 * xi).to_degrees()),
        NodalFamily::Msf => (f_m2, -u_m2),
        NodalFamily::O1 => (
            sin_i * cos_half.powi(2) / 0.3800,
            (2.0 * xi - nu).to_degrees(),
        ),
        NodalFamily::K1 => {
            let f = (0.8965 * sin_2i.powi(2) + 0.6001 * sin_2i * nu.cos() + 0.1006).sqrt();
            let nu_p = (sin_2i * nu.sin()).atan2(sin_2i * nu.cos() + 0.3347);
            (f, -nu_p.to_degrees())
        }
        NodalFamily::J1 => (sin_2i / 0.7214, (-nu).to_degrees()),
        NodalFamily::M2 => (f_m2, u_m2),
        NodalFamily::L2 => {
            // Schureman formula 215/216: the elliptic L2 combines with M2's
            // factor through the resultant amplitude Ra and phase R
            let ra = (1.0 - 12.0 * tan_half_sq * (2.0 * cap_p).cos() + 36.0 * tan_half_sq.powi(2))
                .sqrt();
            let r = (2.0 * cap_p)
                .sin()
                .atan2(1.0 / (6.0 * tan_half_sq) - (2.0 * cap_p).cos());
            (f_m2 * ra, u_m2 - r.to_degrees())
        }
        NodalFamily::K2 => (f_k2, u_k2),
        NodalFamily::M3 => (f_m2.powf(1.5), 1.5 * u_m2),
        NodalFamily::M2Squared => (f_m2 * f_m2, 2.0 * u_m2),
        NodalFamily::M2Cubed => (f_m2.powi(3), 3.0 * u_m2),
        NodalFamily::M2Fourth => (f_m2.powi(4), 4.0 * u_m2),
        NodalFamily::Ms4 => (f_m2, u_m2),
        NodalFamily::Mks2 => (f_m2 * f_k2, u_m2 + u_k2),
    }
}
