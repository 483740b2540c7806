//! Lambert Conformal Conic projection.
//!
//! Maps a cone tangent or secant to the Earth's surface onto a flat plane.
//! Shapes are preserved locally, which makes it a good planar frame for
//! regions that are wider east-west than north-south.
//!
//! The projection parameters include:
//! - Origin longitude (lon0): the central meridian
//! - Origin latitude (lat0): where projected y is zero
//! - Standard parallel(s): lat1 and lat2 (equal for a tangent cone)
//!
//! Coordinates are meters from the origin on a sphere of the WGS84 mean radius.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use relief_common::{ReliefError, ReliefResult};

/// WGS84 mean Earth radius (meters)
pub const EARTH_RADIUS: f64 = 6_371_008.8;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Origin latitude in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub lat1: f64,
    /// Second standard parallel in radians
    pub lat2: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the origin latitude
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection from origin and standard parallels in degrees.
    pub fn new(lon0_deg: f64, lat0_deg: f64, lat1_deg: f64, lat2_deg: f64) -> ReliefResult<Self> {
        let lon0 = lon0_deg.to_radians();
        let lat0 = lat0_deg.to_radians();
        let lat1 = lat1_deg.to_radians();
        let lat2 = lat2_deg.to_radians();
        let earth_radius = EARTH_RADIUS;

        // Compute cone constant n
        let n = if (lat1 - lat2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            lat1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (lat1.cos() / lat2.cos()).ln();
            let tan_ratio = ((FRAC_PI_4 + lat2 / 2.0).tan() / (FRAC_PI_4 + lat1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        if !n.is_finite() || n.abs() < 1e-10 {
            return Err(ReliefError::ProjectionError(format!(
                "degenerate cone for standard parallels {} / {}",
                lat1_deg, lat2_deg
            )));
        }

        // Compute F constant
        let f = (lat1.cos() * (FRAC_PI_4 + lat1 / 2.0).tan().powf(n)) / n;

        // Compute rho at the origin latitude
        let rho0 = earth_radius * f / (FRAC_PI_4 + lat0 / 2.0).tan().powf(n);

        Ok(Self {
            lon0,
            lat0,
            lat1,
            lat2,
            earth_radius,
            n,
            f,
            rho0,
        })
    }

    /// Convert geographic coordinates (degrees) to projected meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> ReliefResult<(f64, f64)> {
        let lat = lat_deg.to_radians();

        // The pole opposite the cone apex maps to infinity
        let tan_term = (FRAC_PI_4 + lat / 2.0).tan();
        if !(tan_term > 0.0) || (self.n < 0.0 && !tan_term.is_finite()) {
            return Err(ReliefError::ProjectionError(format!(
                "latitude {} is not representable in this conic projection",
                lat_deg
            )));
        }

        // Normalize longitude difference to [-π, π]
        let dlon = normalize_radians(lon_deg.to_radians() - self.lon0);

        // Compute rho for this latitude
        let rho = self.earth_radius * self.f / tan_term.powf(self.n);

        // Compute theta (angle from central meridian)
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        Ok((x, y))
    }

    /// Convert projected meters back to geographic coordinates (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> ReliefResult<(f64, f64)> {
        let sign = self.n.signum();
        let dy = self.rho0 - y;

        let rho = sign * x.hypot(dy);
        let theta = (sign * x).atan2(sign * dy);

        let lat = if rho == 0.0 {
            sign * FRAC_PI_2
        } else {
            2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - FRAC_PI_2
        };
        let lon = normalize_radians(self.lon0 + theta / self.n);

        if !lat.is_finite() || !lon.is_finite() {
            return Err(ReliefError::ProjectionError(format!(
                "({}, {}) has no geographic inverse",
                x, y
            )));
        }

        Ok((lon.to_degrees(), lat.to_degrees()))
    }

    /// Scale factor along a parallel at the given latitude (1.0 on standard parallels).
    pub fn scale_factor(&self, lat_deg: f64) -> f64 {
        let lat = lat_deg.to_radians();
        let rho = self.earth_radius * self.f / (FRAC_PI_4 + lat / 2.0).tan().powf(self.n);
        rho * self.n / (self.earth_radius * lat.cos())
    }
}

/// Wrap an angle in radians into [-π, π].
pub(crate) fn normalize_radians(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
