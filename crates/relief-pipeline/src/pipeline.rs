//! Resolve, reproject, clip, classify and render one region.

use std::path::Path;
use std::time::Instant;

use boundary::{BoundaryResolver, BoundarySource, ResolvedRegion};
use grid_processor::{crop_to_extent, ElevationGridLoader, RasterClipper};
use projection::{reproject_geometry, warp_grid, Reprojector};
use relief_common::{AffineTransform, Crs, ElevationGrid, Geometry, ReliefError, ReliefResult};
use renderer::{
    build_mesh, render_2d, render_boundary_map, render_view, ElevationClassifier, Raster2D, Scene,
    TerrainMesh,
};
use tracing::{debug, info};

use crate::config::PipelineConfig;

/// Source cells kept around the region when cropping before a warp.
const CROP_MARGIN_CELLS: usize = 2;

/// Edge samples used to carry a region extent into the grid's CRS.
const EXTENT_SAMPLES: usize = 16;

/// Approximate cell count of the placeholder grid for regions off the grid.
const NODATA_GRID_CELLS: f64 = 65_536.0;

/// Results of one region render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Dataset value of the matched name attribute
    pub region: String,
    pub scene: Scene,
    pub map: Raster2D,
    pub mesh: TerrainMesh,
    /// Planar CRS everything was rendered in
    pub crs: Crs,
}

impl RenderOutput {
    /// Static image of the mesh from the given camera.
    pub fn view(&self, camera: &renderer::Camera) -> ReliefResult<image::RgbaImage> {
        render_view(&self.mesh, camera)
    }
}

/// Region renderer holding its configuration and stage components.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    resolver: BoundaryResolver,
    loader: ElevationGridLoader,
    clipper: RasterClipper,
    classifier: ElevationClassifier,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> ReliefResult<Self> {
        config.validate()?;
        Ok(Self {
            resolver: BoundaryResolver::new(config.resolver.clone()),
            loader: ElevationGridLoader::new(config.loader.clone()),
            clipper: RasterClipper::new(config.clip),
            classifier: ElevationClassifier::new(config.classifier.clone()),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load an elevation GeoTIFF with the configured loader settings.
    pub fn load_geotiff(&self, path: impl AsRef<Path>) -> ReliefResult<ElevationGrid> {
        self.loader.load_geotiff(path)
    }

    /// Planar CRS a region is rendered in.
    pub fn planar_crs(&self, region: &ResolvedRegion) -> ReliefResult<Crs> {
        let crs = region.geometry.crs();
        if crs.is_geographic() {
            self.config.planar_target.crs_for_geometry(&region.geometry)
        } else {
            Ok(crs)
        }
    }

    /// Look up `name` and return its boundary in the planar render CRS.
    pub fn resolve_planar<S>(&self, source: &S, name: &str) -> ReliefResult<(ResolvedRegion, Geometry)>
    where
        S: BoundarySource + ?Sized,
    {
        let region = self.resolver.resolve(source, name)?;
        let target = self.planar_crs(&region)?;
        let outline = reproject_geometry(&region.geometry, target)?;
        Ok((region, outline))
    }

    /// Render the region `name` of `source` over `grid`.
    ///
    /// A region that misses the grid produces an empty scene, a map holding
    /// only the outline over the background, and an empty mesh.
    pub fn render<S>(&self, source: &S, grid: &ElevationGrid, name: &str) -> ReliefResult<RenderOutput>
    where
        S: BoundarySource + ?Sized,
    {
        let start = Instant::now();
        let (region, outline) = self.resolve_planar(source, name)?;
        let target = outline.crs();

        let planar_grid = self.prepare_grid(grid, &region, &outline)?;
        let mask = self.clipper.clip(&planar_grid, &outline)?;
        let classification = self.classifier.classify(&planar_grid, &mask)?;
        let scene = Scene::new(planar_grid, mask, classification, outline)?;

        let map = render_2d(&scene, &self.config.render_2d)?;
        let mesh = build_mesh(&scene, &self.config.render_3d)?;

        info!(
            region = %region.name,
            matched_key = %region.matched_key,
            crs = %target,
            parts = scene.outline().parts().len(),
            cells_inside = scene.mask().count_inside(),
            map_width = map.width(),
            map_height = map.height(),
            mesh_vertices = mesh.vertex_count(),
            mesh_stride = mesh.stride,
            duration_ms = start.elapsed().as_millis() as u64,
            "Rendered region"
        );

        Ok(RenderOutput {
            region: region.name,
            scene,
            map,
            mesh,
            crs: target,
        })
    }

    /// Boundary-only map of the region `name`, `width` pixels wide.
    pub fn boundary_map<S>(&self, source: &S, name: &str, width: u32) -> ReliefResult<Raster2D>
    where
        S: BoundarySource + ?Sized,
    {
        let (_, outline) = self.resolve_planar(source, name)?;
        render_boundary_map(&outline, width, &self.config.render_2d)
    }

    /// Crop the source grid around the region and warp it into the outline's CRS.
    ///
    /// A region that misses the grid gets an all-sentinel grid over the
    /// outline instead, which clips to an empty mask.
    fn prepare_grid(
        &self,
        grid: &ElevationGrid,
        region: &ResolvedRegion,
        outline: &Geometry,
    ) -> ReliefResult<ElevationGrid> {
        let to_grid = Reprojector::new(region.geometry.crs(), grid.crs())?;
        let cropped = match to_grid.transform_bounds(&region.extent, EXTENT_SAMPLES) {
            Ok(window) => crop_to_extent(grid, &window, CROP_MARGIN_CELLS)?,
            Err(e) => {
                debug!(
                    region = %region.name,
                    error = %e,
                    "Region extent is not representable in the grid CRS"
                );
                None
            }
        };

        match cropped {
            Some(cropped) => warp_grid(&cropped, outline.crs(), &self.config.warp),
            None => {
                debug!(region = %region.name, "Region does not overlap the elevation grid");
                nodata_grid(outline, grid.nodata())
            }
        }
    }
}

/// All-sentinel grid with square cells covering the outline.
fn nodata_grid(outline: &Geometry, nodata: f32) -> ReliefResult<ElevationGrid> {
    let extent = outline.bbox();
    let area = extent.width() * extent.height();
    let cell_size = if area > 0.0 {
        (area / NODATA_GRID_CELLS).sqrt()
    } else {
        extent.width().max(extent.height()) / NODATA_GRID_CELLS.sqrt()
    };
    if !(cell_size > 0.0) || !cell_size.is_finite() {
        return Err(ReliefError::InvalidGeometry(format!(
            "outline extent {:?} has no area",
            extent
        )));
    }

    let width = (extent.width() / cell_size).floor() as usize + 1;
    let height = (extent.height() / cell_size).floor() as usize + 1;
    let transform = AffineTransform::north_up(extent.min_x, extent.max_y, cell_size, cell_size);
    ElevationGrid::new(vec![nodata; width * height], width, height, transform, outline.crs(), nodata)
}
