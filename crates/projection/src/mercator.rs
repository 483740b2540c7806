//! Spherical Web Mercator (EPSG:3857).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use relief_common::{ReliefError, ReliefResult};

/// Sphere radius used by EPSG:3857 (meters).
pub const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    pub fn forward(&self, lon: f64, lat: f64) -> ReliefResult<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() >= 90.0 {
            return Err(ReliefError::ProjectionError(format!(
                "latitude {} cannot be represented in Web Mercator",
                lat
            )));
        }
        let x = WEB_MERCATOR_RADIUS * lon.to_radians();
        let y = WEB_MERCATOR_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        Ok((x, y))
    }

    pub fn inverse(&self, x: f64, y: f64) -> ReliefResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ReliefError::ProjectionError(format!(
                "invalid projected coordinate ({}, {})",
                x, y
            )));
        }
        let lon = (x / WEB_MERCATOR_RADIUS).to_degrees();
        let lat = (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
        Ok((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let (x, y) = WebMercator.forward(180.0, 0.0).unwrap();
        assert!((x - 20_037_508.342_789_244).abs() < 1e-6);
        assert!(y.abs() < 1e-9);

        // Top of the square tile pyramid
        let (_, y) = WebMercator.forward(0.0, 85.051_128_779_806_6).unwrap();
        assert!((y - 20_037_508.342_789_244).abs() < 1e-3);
    }

    #[test]
    fn test_roundtrip_and_poles() {
        let (x, y) = WebMercator.forward(90.4, 23.8).unwrap();
        let (lon, lat) = WebMercator.inverse(x, y).unwrap();
        assert!((lon - 90.4).abs() < 1e-9);
        assert!((lat - 23.8).abs() < 1e-9);
        assert!(WebMercator.forward(0.0, 90.0).is_err());
    }
}
