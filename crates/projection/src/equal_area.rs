//! Lambert Azimuthal Equal-Area projection on the authalic sphere.
//!
//! Areas are preserved everywhere, so cell counts in the projected grid are
//! proportional to ground area.

use relief_common::geometry::AUTHALIC_RADIUS;
use relief_common::{ReliefError, ReliefResult};

use crate::lambert::normalize_radians;

#[derive(Debug, Clone)]
pub struct LambertAzimuthalEqualArea {
    /// Center longitude in radians
    pub lon0: f64,
    /// Center latitude in radians
    pub lat0: f64,
    pub radius: f64,
}

impl LambertAzimuthalEqualArea {
    pub fn new(lon0_deg: f64, lat0_deg: f64) -> Self {
        Self {
            lon0: lon0_deg.to_radians(),
            lat0: lat0_deg.to_radians(),
            radius: AUTHALIC_RADIUS,
        }
    }

    /// Geographic degrees to meters from the center.
    pub fn forward(&self, lon: f64, lat: f64) -> ReliefResult<(f64, f64)> {
        let phi = lat.to_radians();
        let dlon = normalize_radians(lon.to_radians() - self.lon0);
        let (sin_p, cos_p) = phi.sin_cos();
        let (sin_p0, cos_p0) = self.lat0.sin_cos();

        let denom = 1.0 + sin_p0 * sin_p + cos_p0 * cos_p * dlon.cos();
        // The antipode of the center maps to the bounding circle
        if !(denom > 1e-12) {
            return Err(ReliefError::ProjectionError(format!(
                "({}, {}) is the antipode of the projection center",
                lon, lat
            )));
        }
        let k = (2.0 / denom).sqrt();

        let x = self.radius * k * cos_p * dlon.sin();
        let y = self.radius * k * (cos_p0 * sin_p - sin_p0 * cos_p * dlon.cos());
        Ok((x, y))
    }

    /// Meters from the center back to geographic degrees.
    pub fn inverse(&self, x: f64, y: f64) -> ReliefResult<(f64, f64)> {
        let rho = x.hypot(y);
        if rho == 0.0 {
            return Ok((self.lon0.to_degrees(), self.lat0.to_degrees()));
        }
        let ratio = rho / (2.0 * self.radius);
        if ratio > 1.0 {
            return Err(ReliefError::ProjectionError(format!(
                "({}, {}) lies outside the projected disc",
                x, y
            )));
        }
        let c = 2.0 * ratio.asin();
        let (sin_c, cos_c) = c.sin_cos();
        let (sin_p0, cos_p0) = self.lat0.sin_cos();

        let phi = (cos_c * sin_p0 + y * sin_c * cos_p0 / rho).clamp(-1.0, 1.0).asin();
        let lon = self.lon0 + (x * sin_c).atan2(rho * cos_p0 * cos_c - y * sin_p0 * sin_c);

        Ok((normalize_radians(lon).to_degrees(), phi.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_common::geometry::Ring;
    use test_utils::assert_coords_approx_eq;

    #[test]
    fn test_center_maps_to_origin() {
        let proj = LambertAzimuthalEqualArea::new(90.0, 23.5);
        let (x, y) = proj.forward(90.0, 23.5).unwrap();
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
        assert_eq!(proj.inverse(0.0, 0.0).unwrap(), (90.0, 23.5));
    }

    #[test]
    fn test_roundtrip() {
        let proj = LambertAzimuthalEqualArea::new(10.0, 52.0);
        for &(lon, lat) in &[(5.0, 47.0), (15.0, 55.0), (-20.0, 35.0), (40.0, 70.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_coords_approx_eq!((lon2, lat2), (lon, lat), 1e-9);
        }
    }

    #[test]
    fn test_preserves_area() {
        let proj = LambertAzimuthalEqualArea::new(90.0, 23.5);
        let cell = Ring::rectangle(91.0, 24.0, 92.0, 25.0).unwrap();
        let geodesic = cell.geodesic_area();

        // Densify edges so straight projected segments follow the curves
        let mut points = Vec::new();
        for &((x1, y1), (x2, y2)) in &cell.edges().collect::<Vec<_>>() {
            for i in 0..50 {
                let t = i as f64 / 50.0;
                points.push(proj.forward(x1 + (x2 - x1) * t, y1 + (y2 - y1) * t).unwrap());
            }
        }
        let planar = Ring::new(points).unwrap().signed_area().abs();

        let rel = (planar - geodesic).abs() / geodesic;
        assert!(rel < 1e-3, "planar {} vs geodesic {}", planar, geodesic);
    }

    #[test]
    fn test_antipode_rejected() {
        let proj = LambertAzimuthalEqualArea::new(0.0, 0.0);
        assert!(proj.forward(180.0, 0.0).is_err());
    }
}
