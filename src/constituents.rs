//! # Tidal Constituent Catalog
//!
//! Static reference data for every constituent the two supported models
//! (GOT4.10 and FES2022) distribute. Each entry carries the constituent's
//! fixed astronomical speed and the integer coefficients of its equilibrium
//! argument over the mean astronomical longitudes, plus the nodal-correction
//! family it belongs to.
//!
//! The catalog is the FES2022 set (34 constituents); GOT4.10 ships a strict
//! subset of it, so a single table serves both models. The table is fixed at
//! build time and never mutated: an unrecognized name elsewhere in the
//! system is treated as "contributes zero amplitude", not as an error.
//!
//! Speeds are the standard published values in degrees per mean solar hour
//! (Schureman 1958, Table 2). The argument coefficients are the Doodson
//! development rewritten over solar time: `V = ct·T + cs·s + ch·h + cp·p +
//! cpp·pp + shift`, where `T` is the hour angle of the mean sun (15°/hour
//! from UT midnight) and `s`, `h`, `p`, `pp` are the mean longitudes of the
//! moon, sun, lunar perigee and solar perigee.

/// Nodal-correction family of a constituent.
///
/// The ~18.6-year modulation is shared across constituents of the same
/// spectral family; compound tides combine the factors of their parents.
/// [`crate::astro`] turns each variant into a concrete `(f, u)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodalFamily {
    /// Purely solar (and radiational) lines: f = 1, u = 0
    Solar,
    /// Lunar monthly (Mm)
    Mm,
    /// Lunar fortnightly (Mf); Mtm and Msqm share it
    Mf,
    /// Lunisolar fortnightly (MSf = S2 − M2): f of M2, u negated
    Msf,
    /// Principal lunar diurnal group (O1, Q1)
    O1,
    /// Lunisolar declinational diurnal (K1)
    K1,
    /// Smaller lunar elliptic diurnal (J1)
    J1,
    /// Principal lunar semidiurnal group (M2, N2, 2N2, µ2, ν2, λ2, ε2)
    M2,
    /// Smaller lunar elliptic semidiurnal (L2): perigee-dependent
    L2,
    /// Lunisolar declinational semidiurnal (K2)
    K2,
    /// Lunar terdiurnal (M3): f of M2 to the 3/2 power
    M3,
    /// Quarter-diurnal overtides of M2 (M4, MN4, N4): squared factor
    M2Squared,
    /// Sixth-diurnal overtide (M6): cubed factor
    M2Cubed,
    /// Eighth-diurnal overtide (M8): fourth-power factor
    M2Fourth,
    /// Compound MS4 = M2 + S2: factor of M2 alone
    Ms4,
    /// Compound MKS2 = M2 + K2 − S2: product of M2 and K2 factors
    Mks2,
}

/// A single tidal constituent's fixed astronomical description.
#[derive(Clone, Copy, Debug)]
pub struct Constituent {
    /// Lower-case name as used in model file names ("m2", "lambda2", ...)
    pub name: &'static str,
    /// Angular speed in degrees per mean solar hour
    pub speed: f64,
    /// Equilibrium-argument coefficients: (T, s, h, p, pp)
    pub arg: (i8, i8, i8, i8, i8),
    /// Constant phase shift of the argument in degrees
    pub shift: f64,
    /// Nodal-correction family
    pub nodal: NodalFamily,
}

/// The full FES2022 constituent set, ordered by speed.
///
/// GOT4.10 distributes q1, o1, p1, s1, k1, n2, m2, s2, k2 and m4 — all
/// present here. Names match the model file naming convention.
pub const CATALOG: &[Constituent] = &[
    // -- Long period -----------------------------------------------------
    Constituent { name: "sa",      speed: 0.0410686,   arg: (0, 0, 1, 0, -1), shift: 0.0,   nodal: NodalFamily::Solar },
    Constituent { name: "ssa",     speed: 0.0821373,   arg: (0, 0, 2, 0, 0),  shift: 0.0,   nodal: NodalFamily::Solar },
    Constituent { name: "mm",      speed: 0.5443747,   arg: (0, 1, 0, -1, 0), shift: 0.0,   nodal: NodalFamily::Mm },
    Constituent { name: "msf",     speed: 1.0158958,   arg: (0, 2, -2, 0, 0), shift: 0.0,   nodal: NodalFamily::Msf },
    Constituent { name: "mf",      speed: 1.0980331,   arg: (0, 2, 0, 0, 0),  shift: 0.0,   nodal: NodalFamily::Mf },
    Constituent { name: "mtm",     speed: 1.6424078,   arg: (0, 3, 0, -1, 0), shift: 0.0,   nodal: NodalFamily::Mf },
    Constituent { name: "msqm",    speed: 2.1139288,   arg: (0, 4, -2, 0, 0), shift: 0.0,   nodal: NodalFamily::Mf },
    // -- Diurnal ---------------------------------------------------------
    Constituent { name: "q1",      speed: 13.3986609,  arg: (1, -3, 1, 1, 0), shift: -90.0, nodal: NodalFamily::O1 },
    Constituent { name: "o1",      speed: 13.9430356,  arg: (1, -2, 1, 0, 0), shift: -90.0, nodal: NodalFamily::O1 },
    Constituent { name: "p1",      speed: 14.9589314,  arg: (1, 0, -1, 0, 0), shift: -90.0, nodal: NodalFamily::Solar },
    Constituent { name: "s1",      speed: 15.0,        arg: (1, 0, 0, 0, 0),  shift: 180.0, nodal: NodalFamily::Solar },
    Constituent { name: "k1",      speed: 15.0410686,  arg: (1, 0, 1, 0, 0),  shift: 90.0,  nodal: NodalFamily::K1 },
    Constituent { name: "j1",      speed: 15.5854433,  arg: (1, 1, 1, -1, 0), shift: 90.0,  nodal: NodalFamily::J1 },
    // -- Semidiurnal -----------------------------------------------------
    Constituent { name: "eps2",    speed: 27.4238337,  arg: (2, -5, 4, 1, 0), shift: 0.0,   nodal: NodalFamily::M2 },
    Constituent { name: "2n2",     speed: 27.8953548,  arg: (2, -4, 2, 2, 0), shift: 0.0,   nodal: NodalFamily::M2 },
    Constituent { name: "mu2",     speed: 27.9682084,  arg: (2, -4, 4, 0, 0), shift: 0.0,   nodal: NodalFamily::M2 },
    Constituent { name: "n2",      speed: 28.4397295,  arg: (2, -3, 2, 1, 0), shift: 0.0,   nodal: NodalFamily::M2 },
    Constituent { name: "nu2",     speed: 28.5125831,  arg: (2, -3, 4, -1, 0), shift: 0.0,  nodal: NodalFamily::M2 },
    Constituent { name: "m2",      speed: 28.9841042,  arg: (2, -2, 2, 0, 0), shift: 0.0,   nodal: NodalFamily::M2 },
    Constituent { name: "mks2",    speed: 29.0662415,  arg: (2, -2, 4, 0, 0), shift: 0.0,   nodal: NodalFamily::Mks2 },
    Constituent { name: "lambda2", speed: 29.4556253,  arg: (2, -1, 0, 1, 0), shift: 180.0, nodal: NodalFamily::M2 },
    Constituent { name: "l2",      speed: 29.5284789,  arg: (2, -1, 2, -1, 0), shift: 180.0, nodal: NodalFamily::L2 },
    Constituent { name: "t2",      speed: 29.9589333,  arg: (2, 0, -1, 0, 1), shift: 0.0,   nodal: NodalFamily::Solar },
    Constituent { name: "s2",      speed: 30.0,        arg: (2, 0, 0, 0, 0),  shift: 0.0,   nodal: NodalFamily::Solar },
    Constituent { name: "r2",      speed: 30.0410667,  arg: (2, 0, 1, 0, -1), shift: 180.0, nodal: NodalFamily::Solar },
    Constituent { name: "k2",      speed: 30.0821373,  arg: (2, 0, 2, 0, 0),  shift: 0.0,   nodal: NodalFamily::K2 },
    // -- Short period ----------------------------------------------------
    Constituent { name: "m3",      speed: 43.4761563,  arg: (3, -3, 3, 0, 0), shift: 0.0,   nodal: NodalFamily::M3 },
    Constituent { name: "n4",      speed: 56.8794590,  arg: (4, -6, 4, 2, 0), shift: 0.0,   nodal: NodalFamily::M2Squared },
    Constituent { name: "mn4",     speed: 57.4238337,  arg: (4, -5, 4, 1, 0), shift: 0.0,   nodal: NodalFamily::M2Squared },
    Constituent { name: "m4",      speed: 57.9682084,  arg: (4, -4, 4, 0, 0), shift: 0.0,   nodal: NodalFamily::M2Squared },
    Constituent { name: "ms4",     speed: 58.9841042,  arg: (4, -2, 2, 0, 0), shift: 0.0,   nodal: NodalFamily::Ms4 },
    Constituent { name: "s4",      speed: 60.0,        arg: (4, 0, 0, 0, 0),  shift: 0.0,   nodal: NodalFamily::Solar },
    Constituent { name: "m6",      speed: 86.9523127,  arg: (6, -6, 6, 0, 0), shift: 0.0,   nodal: NodalFamily::M2Cubed },
    Constituent { name: "m8",      speed: 115.9364166, arg: (8, -8, 8, 0, 0), shift: 0.0,   nodal: NodalFamily::M2Fourth },
];

/// Look up a constituent by name.
///
/// Returns `None` for names outside the catalog; callers treat that as a
/// zero-amplitude contribution, never as a failure.
pub fn lookup(name: &str) -> Option<&'static Constituent> {
    CATALOG.iter().find(|c| c.name == name)
}
