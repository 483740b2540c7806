//! Single-band GeoTIFF decoding.
//!
//! Reads the samples plus the GeoTIFF tags needed to place them:
//! - ModelTransformation (34264), or ModelTiepoint (33922) + ModelPixelScale (33550)
//! - GDAL_NODATA (42113), an ASCII number
//! - GeoKeyDirectory (34735) for the EPSG code and raster-space convention

use std::io::{Read, Seek};
use std::path::Path;

use relief_common::AffineTransform;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{GridProcessorError, Result};

pub const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub const TAG_MODEL_TIEPOINT: u16 = 33922;
pub const TAG_MODEL_TRANSFORMATION: u16 = 34264;
pub const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
pub const TAG_GDAL_NODATA: u16 = 42113;

const KEY_RASTER_TYPE: u16 = 1025;
const KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const KEY_PROJECTED_CS_TYPE: u16 = 3072;
const RASTER_PIXEL_IS_POINT: u16 = 2;

/// Decoded contents of a GeoTIFF elevation file.
#[derive(Debug, Clone)]
pub struct GeoTiffRaster {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub transform: AffineTransform,
    /// EPSG code from the GeoKeyDirectory (projected preferred over geographic)
    pub epsg: Option<u32>,
    /// Sentinel from GDAL_NODATA, possibly NaN
    pub nodata: Option<f32>,
}

/// Read a GeoTIFF file from disk.
pub fn read_geotiff(path: impl AsRef<Path>) -> Result<GeoTiffRaster> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let raster = decode_geotiff(file)?;
    debug!(
        path = %path.display(),
        width = raster.width,
        height = raster.height,
        epsg = ?raster.epsg,
        nodata = ?raster.nodata,
        "Decoded GeoTIFF"
    );
    Ok(raster)
}

/// Decode a GeoTIFF from any seekable reader.
pub fn decode_geotiff<R: Read + Seek>(reader: R) -> Result<GeoTiffRaster> {
    let mut decoder = Decoder::new(reader)?;

    // Large DEM tiles exceed the default decoding limits
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    decoder = decoder.with_limits(limits);

    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let geo_keys = decoder
        .get_tag_u16_vec(Tag::Unknown(TAG_GEO_KEY_DIRECTORY))
        .map(|dir| parse_geo_keys(&dir))
        .unwrap_or_default();

    let mut transform = read_transform(&mut decoder)?;
    if geo_keys.pixel_is_point {
        // Tie points address cell centers; shift to the corner convention
        let (x0, y0) = transform.apply(-0.5, -0.5);
        transform.coeffs[0] = x0;
        transform.coeffs[3] = y0;
    }

    let nodata = read_nodata(&mut decoder);
    let data = decode_samples(&mut decoder)?;

    if data.len() != width * height {
        return Err(GridProcessorError::UnsupportedLayout(format!(
            "expected {} samples for {}x{}, got {} (multi-band?)",
            width * height,
            width,
            height,
            data.len()
        )));
    }

    Ok(GeoTiffRaster {
        data,
        width,
        height,
        transform,
        epsg: geo_keys.epsg,
        nodata,
    })
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<AffineTransform> {
    if let Ok(m) = decoder.get_tag_f64_vec(Tag::Unknown(TAG_MODEL_TRANSFORMATION)) {
        if m.len() >= 8 {
            // Row-major 4x4: x = m0*col + m1*row + m3, y = m4*col + m5*row + m7
            return Ok(AffineTransform::new([m[3], m[0], m[1], m[7], m[4], m[5]]));
        }
    }

    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(TAG_MODEL_TIEPOINT));
    let pixel_scale = decoder.get_tag_f64_vec(Tag::Unknown(TAG_MODEL_PIXEL_SCALE));
    if let (Ok(tie), Ok(scale)) = (tiepoint, pixel_scale) {
        if tie.len() >= 6 && scale.len() >= 2 {
            // Tiepoint format: [i, j, k, x, y, z], raster (i, j) maps to model (x, y)
            let (i, j, x, y) = (tie[0], tie[1], tie[3], tie[4]);
            let (sx, sy) = (scale[0], scale[1]);
            return Ok(AffineTransform::north_up(x - i * sx, y + j * sy, sx, sy));
        }
    }

    Err(GridProcessorError::invalid_geotiff(
        "no ModelTransformation or ModelTiepoint/ModelPixelScale tags",
    ))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    let text = decoder.get_tag_ascii_string(Tag::Unknown(TAG_GDAL_NODATA)).ok()?;
    let text = text.trim_matches(char::from(0)).trim();
    match text.to_lowercase().as_str() {
        "nan" | "-nan" => Some(f32::NAN),
        other => other.parse().ok(),
    }
}

fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<f32>> {
    let result = decoder.read_image()?;

    match result {
        DecodingResult::F32(data) => Ok(data),
        DecodingResult::F64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I16(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U16(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U8(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I8(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct GeoKeys {
    epsg: Option<u32>,
    pixel_is_point: bool,
}

/// Parse the GeoKeyDirectory header and entries.
///
/// Only keys stored inline (TIFFTagLocation 0) are read; that covers every
/// SHORT-valued key including the ones used here.
fn parse_geo_keys(dir: &[u16]) -> GeoKeys {
    let mut keys = GeoKeys::default();
    let Some(&count) = dir.get(3) else {
        return keys;
    };
    let mut geographic = None;
    let mut projected = None;

    for entry in dir[4..].chunks_exact(4).take(count as usize) {
        let (key, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            continue;
        }
        match key {
            KEY_RASTER_TYPE => keys.pixel_is_point = value == RASTER_PIXEL_IS_POINT,
            KEY_GEOGRAPHIC_TYPE => geographic = Some(value as u32),
            KEY_PROJECTED_CS_TYPE => projected = Some(value as u32),
            _ => {}
        }
    }

    // 32767 is "user-defined"
    keys.epsg = projected.or(geographic).filter(|&code| code != 32767);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geo_keys_prefers_projected() {
        let dir = [
            1, 1, 0, 3, //
            1024, 0, 1, 1, //
            2048, 0, 1, 4326, //
            3072, 0, 1, 32646,
        ];
        let keys = parse_geo_keys(&dir);
        assert_eq!(keys.epsg, Some(32646));
        assert!(!keys.pixel_is_point);
    }

    #[test]
    fn test_parse_geo_keys_pixel_is_point_and_user_defined() {
        let dir = [1, 1, 0, 2, 1025, 0, 1, 2, 3072, 0, 1, 32767];
        let keys = parse_geo_keys(&dir);
        assert_eq!(keys.epsg, None);
        assert!(keys.pixel_is_point);
    }

    #[test]
    fn test_parse_geo_keys_truncated() {
        assert_eq!(parse_geo_keys(&[1, 1]), GeoKeys::default());
        // Declared count larger than the entries present
        let keys = parse_geo_keys(&[1, 1, 0, 5, 2048, 0, 1, 4326]);
        assert_eq!(keys.epsg, Some(4326));
    }
}
