//! CRS-to-CRS coordinate transformation.
//!
//! Every geodetic CRS is related to the others through WGS84 geographic
//! coordinates: a transform inverse-projects into lon/lat and then projects
//! into the target. The local frame only maps to itself.

use serde::{Deserialize, Serialize};
use tracing::debug;

use relief_common::{BoundingBox, Crs, Geometry, ReliefError, ReliefResult};

use crate::lambert::normalize_radians;
use crate::transverse_mercator::MAX_MERIDIAN_OFFSET_DEG;
use crate::{LambertAzimuthalEqualArea, LambertConformal, TransverseMercator, WebMercator};

/// Projection math for one geodetic CRS.
#[derive(Debug, Clone)]
pub enum Projector {
    Geographic,
    WebMercator(WebMercator),
    TransverseMercator(TransverseMercator),
    EqualArea(LambertAzimuthalEqualArea),
    Conformal(LambertConformal),
}

impl Projector {
    pub fn for_crs(crs: Crs) -> ReliefResult<Self> {
        match crs {
            Crs::Geographic => Ok(Projector::Geographic),
            Crs::WebMercator => Ok(Projector::WebMercator(WebMercator)),
            Crs::Utm { zone, north } => {
                if !(1..=60).contains(&zone) {
                    return Err(ReliefError::UnsupportedCrs(format!("UTM zone {}", zone)));
                }
                Ok(Projector::TransverseMercator(TransverseMercator::utm(zone, north)))
            }
            Crs::LambertAzimuthalEqualArea { lon0, lat0 } => {
                Ok(Projector::EqualArea(LambertAzimuthalEqualArea::new(lon0, lat0)))
            }
            Crs::LambertConformalConic {
                lon0,
                lat0,
                lat1,
                lat2,
            } => LambertConformal::new(lon0, lat0, lat1, lat2)
                .map(Projector::Conformal)
                .map_err(|e| ReliefError::UnsupportedCrs(format!("{}: {}", crs, e))),
            Crs::Local => Err(ReliefError::UnsupportedCrs(
                "the local frame has no geographic relation".to_string(),
            )),
        }
    }

    /// Geographic degrees into this CRS.
    pub fn forward(&self, lon: f64, lat: f64) -> ReliefResult<(f64, f64)> {
        match self {
            Projector::Geographic => Ok((lon, lat)),
            Projector::WebMercator(p) => p.forward(lon, lat),
            Projector::TransverseMercator(p) => p.forward(lon, lat),
            Projector::EqualArea(p) => p.forward(lon, lat),
            Projector::Conformal(p) => p.forward(lon, lat),
        }
    }

    /// This CRS into geographic degrees.
    pub fn inverse(&self, x: f64, y: f64) -> ReliefResult<(f64, f64)> {
        match self {
            Projector::Geographic => Ok((x, y)),
            Projector::WebMercator(p) => p.inverse(x, y),
            Projector::TransverseMercator(p) => p.inverse(x, y),
            Projector::EqualArea(p) => p.inverse(x, y),
            Projector::Conformal(p) => p.inverse(x, y),
        }
    }
}

#[derive(Debug, Clone)]
enum Route {
    Identity,
    ViaGeographic { from: Projector, to: Projector },
}

/// Transforms coordinates from a source CRS into a target CRS.
#[derive(Debug, Clone)]
pub struct Reprojector {
    source: Crs,
    target: Crs,
    route: Route,
}

impl Reprojector {
    pub fn new(source: Crs, target: Crs) -> ReliefResult<Self> {
        let route = if source == target {
            Route::Identity
        } else if !source.is_geodetic() || !target.is_geodetic() {
            return Err(ReliefError::UnsupportedCrs(format!(
                "cannot convert between {} and {}",
                source, target
            )));
        } else {
            Route::ViaGeographic {
                from: Projector::for_crs(source)?,
                to: Projector::for_crs(target)?,
            }
        };
        Ok(Self {
            source,
            target,
            route,
        })
    }

    pub fn source(&self) -> Crs {
        self.source
    }

    pub fn target(&self) -> Crs {
        self.target
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.route, Route::Identity)
    }

    /// The reverse transform (target to source).
    pub fn inverse(&self) -> Reprojector {
        let route = match &self.route {
            Route::Identity => Route::Identity,
            Route::ViaGeographic { from, to } => Route::ViaGeographic {
                from: to.clone(),
                to: from.clone(),
            },
        };
        Reprojector {
            source: self.target,
            target: self.source,
            route,
        }
    }

    #[inline]
    pub fn transform(&self, x: f64, y: f64) -> ReliefResult<(f64, f64)> {
        match &self.route {
            Route::Identity => Ok((x, y)),
            Route::ViaGeographic { from, to } => {
                let (lon, lat) = from.inverse(x, y)?;
                to.forward(lon, lat)
            }
        }
    }

    /// Reproject every vertex of a geometry. Fails on CRS mismatch.
    pub fn reproject_geometry(&self, geometry: &Geometry) -> ReliefResult<Geometry> {
        if geometry.crs() != self.source {
            return Err(ReliefError::crs_mismatch(self.source, geometry.crs()));
        }
        if self.is_identity() {
            return Ok(geometry.clone());
        }
        debug!(
            source = %self.source,
            target = %self.target,
            vertices = geometry.vertex_count(),
            "Reprojecting geometry"
        );
        geometry.map_points(self.target, |x, y| self.transform(x, y))
    }

    /// Extent of a source-CRS box in the target CRS, found by sampling
    /// `samples` points along each edge.
    pub fn transform_bounds(&self, bbox: &BoundingBox, samples: usize) -> ReliefResult<BoundingBox> {
        if self.is_identity() {
            return Ok(*bbox);
        }
        let n = samples.max(2);
        let mut points = Vec::with_capacity(4 * n);
        for i in 0..n {
            let t = i as f64 / (n - 1) as f64;
            let x = bbox.min_x + t * bbox.width();
            let y = bbox.min_y + t * bbox.height();
            // Top, bottom, left, right edges
            for (px, py) in [(x, bbox.max_y), (x, bbox.min_y), (bbox.min_x, y), (bbox.max_x, y)] {
                if let Ok(p) = self.transform(px, py) {
                    points.push(p);
                }
            }
        }
        BoundingBox::from_points(points).ok_or_else(|| {
            ReliefError::ProjectionError(format!(
                "no point of {:?} is representable in {}",
                bbox, self.target
            ))
        })
    }
}

/// Convenience wrapper: reproject a geometry into `target`.
pub fn reproject_geometry(geometry: &Geometry, target: Crs) -> ReliefResult<Geometry> {
    Reprojector::new(geometry.crs(), target)?.reproject_geometry(geometry)
}

/// Policy choosing the planar CRS a region is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanarTarget {
    /// UTM zone of the region center, equal-area when the region is too wide
    #[default]
    Utm,
    /// Lambert azimuthal equal-area centered on the extent
    EqualArea,
    /// Lambert conformal conic fitted to the latitude range
    Conformal,
}

impl PlanarTarget {
    /// Parse a policy name, `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "utm" => Some(PlanarTarget::Utm),
            "equal-area" | "equal_area" | "laea" => Some(PlanarTarget::EqualArea),
            "conformal" | "lcc" => Some(PlanarTarget::Conformal),
            _ => None,
        }
    }

    /// Planar CRS for a region with the given geographic extent.
    pub fn crs_for(&self, extent: &BoundingBox) -> ReliefResult<Crs> {
        let (lon, _) = extent.center();
        self.select(lon, extent.width() / 2.0, extent)
    }

    /// Planar CRS for a geographic region.
    ///
    /// The center longitude is the circular mean of the vertices, so a
    /// region crossing the antimeridian is centered on it rather than on
    /// the far side of the globe.
    pub fn crs_for_geometry(&self, geometry: &Geometry) -> ReliefResult<Crs> {
        if !geometry.crs().is_geographic() {
            return Err(ReliefError::UnsupportedCrs(format!(
                "planar target needs a geographic region, got {}",
                geometry.crs()
            )));
        }
        let extent = geometry.bbox();
        let Some(lon) = mean_longitude(geometry) else {
            return self.crs_for(&extent);
        };
        let half_span = vertices(geometry)
            .map(|(x, _)| wrap_degrees(x - lon).abs())
            .fold(0.0, f64::max);
        self.select(lon, half_span, &extent)
    }

    /// `half_span` is the largest longitude offset of the region from `lon`.
    fn select(&self, lon: f64, half_span: f64, extent: &BoundingBox) -> ReliefResult<Crs> {
        let lat = (extent.min_y + extent.max_y) / 2.0;
        match self {
            PlanarTarget::Utm => {
                let utm = Crs::utm_for(lon, lat);
                let meridian_offset = match utm {
                    Crs::Utm { zone, .. } => wrap_degrees(lon - (zone as f64 * 6.0 - 183.0)).abs(),
                    _ => 0.0,
                };
                if half_span + meridian_offset > MAX_MERIDIAN_OFFSET_DEG {
                    debug!(lon, half_span, "Region too wide for a UTM zone, using equal-area");
                    Crs::laea(lon, lat)
                } else {
                    Ok(utm)
                }
            }
            PlanarTarget::EqualArea => Crs::laea(lon, lat),
            PlanarTarget::Conformal => {
                let span = extent.height();
                let lat1 = extent.min_y + span / 6.0;
                let lat2 = extent.max_y - span / 6.0;
                match Crs::lcc(lon, lat, lat1, lat2) {
                    Ok(crs) => Ok(crs),
                    Err(e) => {
                        // Regions straddling the equator symmetrically have no cone
                        debug!(error = %e, "Conic fit failed, using equal-area");
                        Crs::laea(lon, lat)
                    }
                }
            }
        }
    }
}

/// Distinct vertices of every ring (closing points skipped).
fn vertices(geometry: &Geometry) -> impl Iterator<Item = (f64, f64)> + '_ {
    geometry.rings().flat_map(|ring| {
        let points = ring.points();
        points[..points.len().saturating_sub(1)].iter().copied()
    })
}

/// Circular mean of the vertex longitudes, `None` when they cancel out.
fn mean_longitude(geometry: &Geometry) -> Option<f64> {
    let (sin, cos) = vertices(geometry).fold((0.0, 0.0), |(s, c), (lon, _)| {
        let (ls, lc) = lon.to_radians().sin_cos();
        (s + ls, c + lc)
    });
    if sin.hypot(cos) < 1e-9 {
        return None;
    }
    Some(sin.atan2(cos).to_degrees())
}

/// Longitude difference wrapped into [-180, 180].
fn wrap_degrees(deg: f64) -> f64 {
    normalize_radians(deg.to_radians()).to_degrees()
}
