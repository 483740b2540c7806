//! Ellipsoidal Transverse Mercator (UTM) projection.
//!
//! Uses the Krüger series in the third flattening `n`, carried to sixth
//! order. Within a UTM zone this is accurate to well below a millimeter.

use relief_common::{ReliefError, ReliefResult};

use crate::lambert::normalize_radians;

/// WGS84 semi-major axis (meters)
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// UTM scale factor on the central meridian.
pub const UTM_SCALE: f64 = 0.9996;
/// UTM false easting (meters).
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
/// UTM false northing for southern zones (meters).
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Points further than this from the central meridian are rejected.
pub const MAX_MERIDIAN_OFFSET_DEG: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian (degrees)
    pub lon0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// First eccentricity
    e: f64,
    /// Rectifying radius
    rectifying_radius: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
}

impl TransverseMercator {
    /// Transverse Mercator on WGS84 with arbitrary parameters.
    pub fn new(lon0: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let f = WGS84_F;
        let e = (f * (2.0 - f)).sqrt();
        let n = f / (2.0 - f);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying_radius = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1_983_433.0 * n6 / 1_935_360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167_603.0 * n6 / 181_440.0,
            49561.0 * n4 / 161_280.0 - 179.0 * n5 / 168.0 + 6_601_661.0 * n6 / 7_257_600.0,
            34729.0 * n5 / 80640.0 - 3_418_889.0 * n6 / 1_995_840.0,
            212_378_941.0 * n6 / 319_334_400.0,
        ];
        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604_800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1_118_711.0 * n6 / 3_870_720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161_280.0 - 11.0 * n5 / 504.0 - 830_251.0 * n6 / 7_257_600.0,
            4583.0 * n5 / 161_280.0 - 108_847.0 * n6 / 3_991_680.0,
            20_648_693.0 * n6 / 638_668_800.0,
        ];

        Self {
            lon0,
            k0,
            false_easting,
            false_northing,
            e,
            rectifying_radius,
            alpha,
            beta,
        }
    }

    /// Standard UTM zone (1..=60).
    pub fn utm(zone: u8, north: bool) -> Self {
        let lon0 = zone as f64 * 6.0 - 183.0;
        let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
        Self::new(lon0, UTM_SCALE, UTM_FALSE_EASTING, false_northing)
    }

    /// Geographic degrees to easting/northing (meters).
    pub fn forward(&self, lon: f64, lat: f64) -> ReliefResult<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
            return Err(ReliefError::ProjectionError(format!(
                "invalid geographic coordinate ({}, {})",
                lon, lat
            )));
        }
        let dlon = normalize_radians((lon - self.lon0).to_radians());
        if dlon.abs() > MAX_MERIDIAN_OFFSET_DEG.to_radians() {
            return Err(ReliefError::ProjectionError(format!(
                "longitude {} is too far from central meridian {}",
                lon, self.lon0
            )));
        }

        let phi = lat.to_radians();
        let e = self.e;
        // tan of the conformal latitude
        let t = (phi.sin().atanh() - e * (e * phi.sin()).atanh()).sinh();

        let xi_p = t.atan2(dlon.cos());
        let eta_p = (dlon.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let scale = self.k0 * self.rectifying_radius;
        Ok((
            self.false_easting + scale * eta,
            self.false_northing + scale * xi,
        ))
    }

    /// Easting/northing (meters) back to geographic degrees.
    pub fn inverse(&self, x: f64, y: f64) -> ReliefResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ReliefError::ProjectionError(format!(
                "invalid projected coordinate ({}, {})",
                x, y
            )));
        }
        let scale = self.k0 * self.rectifying_radius;
        let xi = (y - self.false_northing) / scale;
        let eta = (x - self.false_easting) / scale;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let dlon = eta_p.sinh().atan2(xi_p.cos());
        let phi = self.geodetic_latitude(chi);

        let lon = normalize_radians(self.lon0.to_radians() + dlon).to_degrees();
        let lat = phi.to_degrees();
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ReliefError::ProjectionError(format!(
                "({}, {}) has no geographic inverse",
                x, y
            )));
        }
        Ok((lon, lat))
    }

    /// Geodetic latitude from conformal latitude by fixed-point iteration.
    fn geodetic_latitude(&self, chi: f64) -> f64 {
        use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

        if FRAC_PI_2 - chi.abs() < 1e-12 {
            return chi;
        }
        let e = self.e;
        let base = (FRAC_PI_4 + chi / 2.0).tan();
        let mut phi = chi;
        for _ in 0..30 {
            let es = e * phi.sin();
            let next = 2.0 * (base * ((1.0 + es) / (1.0 - es)).powf(e / 2.0)).atan() - FRAC_PI_2;
            let done = (next - phi).abs() < 1e-15;
            phi = next;
            if done {
                break;
            }
        }
        phi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_coords_approx_eq;

    #[test]
    fn test_central_meridian_on_equator() {
        let tm = TransverseMercator::utm(31, true);
        let (x, y) = tm.forward(3.0, 0.0).unwrap();
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_meridian_arc_one_degree() {
        // Meridian arc from the equator to 1°N is 110,574.389 m on WGS84
        let tm = TransverseMercator::utm(31, true);
        let (_, y) = tm.forward(3.0, 1.0).unwrap();
        let expected = 110_574.389 * UTM_SCALE;
        assert!((y - expected).abs() < 0.1, "y = {}, expected {}", y, expected);
    }

    #[test]
    fn test_known_utm_coordinate() {
        // London, zone 30U
        let tm = TransverseMercator::utm(30, true);
        let (x, y) = tm.forward(-0.1278, 51.5074).unwrap();
        assert!((x - 699_316.0).abs() < 10.0, "easting {}", x);
        assert!((y - 5_710_164.0).abs() < 10.0, "northing {}", y);
    }

    #[test]
    fn test_southern_false_northing() {
        let tm = TransverseMercator::utm(34, false);
        let (_, y) = tm.forward(21.0, -1.0).unwrap();
        assert!((y - (UTM_FALSE_NORTHING_SOUTH - 110_574.389 * UTM_SCALE)).abs() < 0.1);
    }

    #[test]
    fn test_roundtrip() {
        let tm = TransverseMercator::utm(46, true);
        for &(lon, lat) in &[(90.0, 23.0), (88.01, 20.7), (92.9, 26.6), (93.0, 0.0), (84.5, 60.0)] {
            let (x, y) = tm.forward(lon, lat).unwrap();
            let (lon2, lat2) = tm.inverse(x, y).unwrap();
            assert_coords_approx_eq!((lon2, lat2), (lon, lat), 1e-9);
        }
    }

    #[test]
    fn test_far_from_meridian_rejected() {
        let tm = TransverseMercator::utm(46, true);
        assert!(matches!(tm.forward(-90.0, 10.0), Err(ReliefError::ProjectionError(_))));
        assert!(tm.forward(93.0, 91.0).is_err());
    }
}
