//! Coordinate Reference System types and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ReliefError, ReliefResult};

/// Coordinate reference systems understood by the reprojector.
///
/// Projection parameters are carried in degrees. The projection math lives in
/// the `projection` crate; this type only names the frame a coordinate is in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Crs {
    /// WGS84 geographic (x = longitude, y = latitude, degrees)
    Geographic,
    /// Spherical Web Mercator (meters)
    WebMercator,
    /// Universal Transverse Mercator on the WGS84 ellipsoid (meters)
    Utm { zone: u8, north: bool },
    /// Lambert azimuthal equal-area centered on (lon0, lat0)
    LambertAzimuthalEqualArea { lon0: f64, lat0: f64 },
    /// Lambert conformal conic with origin (lon0, lat0) and standard parallels lat1/lat2
    LambertConformalConic {
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: f64,
    },
    /// Local engineering frame: already planar, no relation to the Earth.
    Local,
}

impl Crs {
    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "epsg:4326", "CRS:84"
    /// - "EPSG:3857" / "EPSG:900913"
    /// - "EPSG:32646" (UTM 46N), "EPSG:32733" (UTM 33S)
    /// - "LAEA:<lon0>,<lat0>"
    /// - "LCC:<lon0>,<lat0>,<lat1>,<lat2>"
    /// - "LOCAL"
    pub fn from_code_str(s: &str) -> ReliefResult<Self> {
        let normalized = s.trim().to_uppercase();
        let unsupported = || ReliefError::UnsupportedCrs(s.to_string());

        if normalized == "CRS:84" {
            return Ok(Crs::Geographic);
        }
        if normalized == "LOCAL" {
            return Ok(Crs::Local);
        }
        if let Some(code) = normalized.strip_prefix("EPSG:") {
            let code: u32 = code.parse().map_err(|_| unsupported())?;
            return Crs::from_epsg(code);
        }
        if let Some(params) = normalized.strip_prefix("LAEA:") {
            let values = parse_params(params).ok_or_else(unsupported)?;
            if let [lon0, lat0] = values[..] {
                return Crs::laea(lon0, lat0).map_err(|_| unsupported());
            }
            return Err(unsupported());
        }
        if let Some(params) = normalized.strip_prefix("LCC:") {
            let values = parse_params(params).ok_or_else(unsupported)?;
            if let [lon0, lat0, lat1, lat2] = values[..] {
                return Crs::lcc(lon0, lat0, lat1, lat2).map_err(|_| unsupported());
            }
            return Err(unsupported());
        }

        Err(unsupported())
    }

    /// Map an EPSG code to a supported CRS.
    pub fn from_epsg(code: u32) -> ReliefResult<Self> {
        match code {
            4326 => Ok(Crs::Geographic),
            3857 | 900913 => Ok(Crs::WebMercator),
            32601..=32660 => Ok(Crs::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Crs::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(ReliefError::UnsupportedCrs(format!("EPSG:{}", code))),
        }
    }

    /// EPSG code, when this CRS has one.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Geographic => Some(4326),
            Crs::WebMercator => Some(3857),
            Crs::Utm { zone, north: true } => Some(32600 + *zone as u32),
            Crs::Utm { zone, north: false } => Some(32700 + *zone as u32),
            _ => None,
        }
    }

    /// UTM zone containing the given geographic point.
    pub fn utm_for(lon: f64, lat: f64) -> Self {
        let normalized = (lon + 180.0).rem_euclid(360.0);
        let zone = ((normalized / 6.0).floor() as u8 + 1).min(60);
        Crs::Utm {
            zone,
            north: lat >= 0.0,
        }
    }

    /// Validated Lambert azimuthal equal-area CRS.
    pub fn laea(lon0: f64, lat0: f64) -> ReliefResult<Self> {
        check_origin(lon0, lat0)?;
        Ok(Crs::LambertAzimuthalEqualArea { lon0, lat0 })
    }

    /// Validated Lambert conformal conic CRS.
    pub fn lcc(lon0: f64, lat0: f64, lat1: f64, lat2: f64) -> ReliefResult<Self> {
        check_origin(lon0, lat0)?;
        for lat in [lat1, lat2] {
            if !lat.is_finite() || lat.abs() >= 90.0 {
                return Err(ReliefError::UnsupportedCrs(format!(
                    "LCC standard parallel out of range: {}",
                    lat
                )));
            }
        }
        if (lat1 + lat2).abs() < 1e-9 {
            return Err(ReliefError::UnsupportedCrs(
                "LCC standard parallels symmetric about the equator".to_string(),
            ));
        }
        Ok(Crs::LambertConformalConic {
            lon0,
            lat0,
            lat1,
            lat2,
        })
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Geographic)
    }

    /// Check if coordinates in this CRS are linear (distance-preserving units).
    pub fn is_planar(&self) -> bool {
        !self.is_geographic()
    }

    /// Check if this CRS is tied to the Earth (anything but the local frame).
    pub fn is_geodetic(&self) -> bool {
        !matches!(self, Crs::Local)
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::Geographic
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::LambertAzimuthalEqualArea { lon0, lat0 } => write!(f, "LAEA:{},{}", lon0, lat0),
            Crs::LambertConformalConic {
                lon0,
                lat0,
                lat1,
                lat2,
            } => write!(f, "LCC:{},{},{},{}", lon0, lat0, lat1, lat2),
            Crs::Local => write!(f, "LOCAL"),
            other => match other.epsg() {
                Some(code) => write!(f, "EPSG:{}", code),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

fn parse_params(s: &str) -> Option<Vec<f64>> {
    s.split(',').map(|p| p.trim().parse::<f64>().ok()).collect()
}

fn check_origin(lon0: f64, lat0: f64) -> ReliefResult<()> {
    if !lon0.is_finite() || !lat0.is_finite() || lon0.abs() > 180.0 || lat0.abs() > 90.0 {
        return Err(ReliefError::UnsupportedCrs(format!(
            "projection origin out of range: ({}, {})",
            lon0, lat0
        )));
    }
    Ok(())
}
