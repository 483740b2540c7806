//! End-to-end tests for the region relief pipeline.

use boundary::{BoundaryDataset, BoundaryRecord, PartSelection};
use projection::PlanarTarget;
use relief_common::{Crs, Geometry, ReliefError, Ring};
use relief_pipeline::{Pipeline, PipelineConfig};
use renderer::{Color, Render2DConfig};
use test_utils::fixtures::{e2e_boundary, e2e_grid, write_temp_file, SAMPLE_GEOJSON};
use test_utils::generators::{create_dome_elevation, grid_at};

fn sample_dataset() -> BoundaryDataset {
    BoundaryDataset::from_geojson_str(SAMPLE_GEOJSON).unwrap()
}

/// 2 x 2 degree geographic DEM around Squareland, 0.01 degree cells.
fn geographic_dem(min_lon: f64, max_lat: f64) -> relief_common::ElevationGrid {
    grid_at(
        create_dome_elevation(200, 200, -50.0, 500.0),
        200,
        200,
        min_lon,
        max_lat,
        0.01,
        Crs::Geographic,
    )
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_e2e_local_quadrant() {
    let dataset: BoundaryDataset = vec![BoundaryRecord::new(e2e_boundary()).with_attribute("NAME", "Quadrant")]
        .into_iter()
        .collect();
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();

    let output = pipeline.render(&dataset, &e2e_grid(), "quadrant").unwrap();
    assert_eq!(output.region, "Quadrant");
    assert_eq!(output.crs, Crs::Local);

    let mask = output.scene.mask();
    assert_eq!(mask.cells().iter().filter(|&&c| !c).count(), 12);
    for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        let color = output.scene.color(row, col).unwrap();
        assert_ne!(color, Color::WHITE);
        assert!(color.g > color.r);
    }

    assert_eq!((output.map.width(), output.map.height()), (4, 4));
    assert_eq!(output.map.pixel(3, 3), Render2DConfig::default().background);
    assert_eq!(output.mesh.vertex_count(), 4);
    assert_eq!(output.mesh.triangle_count(), 2);
}

// ============================================================================
// Geographic inputs
// ============================================================================

#[test]
fn test_geographic_region_rendered_in_utm() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let output = pipeline
        .render(&sample_dataset(), &geographic_dem(89.5, 24.5), "squareland")
        .unwrap();

    assert_eq!(output.crs, Crs::Utm { zone: 46, north: true });
    assert_eq!(output.scene.grid().crs(), output.crs);
    assert_eq!(output.scene.outline().crs(), output.crs);

    let inside = output.scene.mask().count_inside() as f64;
    let total = output.scene.grid().len() as f64;
    assert!(inside / total > 0.75 && inside / total < 0.98, "fraction {}", inside / total);
    assert!(output.mesh.vertex_count() > 0);
    assert!(output.mesh.vertex_count() <= 10_000);
    assert_eq!(output.map.crs, output.crs);
}

#[test]
fn test_equal_area_target() {
    let config = PipelineConfig {
        planar_target: PlanarTarget::EqualArea,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let output = pipeline
        .render(&sample_dataset(), &geographic_dem(89.5, 24.5), "Squareland")
        .unwrap();
    assert!(matches!(output.crs, Crs::LambertAzimuthalEqualArea { .. }));
    assert!(!output.scene.is_empty());
}

#[test]
fn test_largest_part_only() {
    let mut config = PipelineConfig::default();
    config.resolver.part_selection = PartSelection::LargestOnly;
    let pipeline = Pipeline::new(config).unwrap();

    let output = pipeline
        .render(&sample_dataset(), &geographic_dem(91.5, 22.0), "twin islands")
        .unwrap();
    assert_eq!(output.scene.outline().parts().len(), 1);

    let all_parts = Pipeline::new(PipelineConfig::default())
        .unwrap()
        .render(&sample_dataset(), &geographic_dem(91.5, 22.0), "twin islands")
        .unwrap();
    assert_eq!(all_parts.scene.outline().parts().len(), 2);
    assert!(all_parts.scene.mask().count_inside() > output.scene.mask().count_inside());
}

#[test]
fn test_region_outside_grid_gives_empty_outputs() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let output = pipeline
        .render(&sample_dataset(), &geographic_dem(95.0, 24.5), "Squareland")
        .unwrap();

    assert!(output.scene.is_empty());
    assert!(output.mesh.is_empty());

    // The map covers the outline and holds nothing but background and stroke
    let outline = output.scene.outline().bbox();
    assert!(output.map.extent.contains_point(outline.min_x, outline.min_y));
    assert!(output.map.extent.contains_point(outline.max_x, outline.max_y));
    let background = Render2DConfig::default().background.to_rgba();
    let stroke = Color::BLACK.to_rgba();
    assert!(output.map.image.pixels().all(|p| *p == background || *p == stroke));
    assert!(output.map.image.pixels().any(|p| *p == stroke));
}

#[test]
fn test_grid_far_from_region_gives_empty_outputs() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let output = pipeline
        .render(&sample_dataset(), &geographic_dem(10.0, 47.0), "Squareland")
        .unwrap();

    assert_eq!(output.crs, Crs::Utm { zone: 46, north: true });
    assert!(output.scene.is_empty());
    assert_eq!(output.scene.mask().count_inside(), 0);
    assert!(output.mesh.is_empty());
    assert_eq!(output.map.crs, output.crs);
}

#[test]
fn test_wide_region_rendered_equal_area() {
    let steppe = Geometry::from_ring(Ring::rectangle(20.0, 45.0, 179.0, 75.0).unwrap(), Crs::Geographic);
    let dataset: BoundaryDataset = vec![BoundaryRecord::new(steppe).with_attribute("NAME", "Steppe")]
        .into_iter()
        .collect();
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();

    let (region, outline) = pipeline.resolve_planar(&dataset, "steppe").unwrap();
    assert!(matches!(
        pipeline.planar_crs(&region).unwrap(),
        Crs::LambertAzimuthalEqualArea { .. }
    ));
    assert_eq!(outline.crs(), pipeline.planar_crs(&region).unwrap());

    let map = pipeline.boundary_map(&dataset, "Steppe", 400).unwrap();
    assert_eq!(map.width(), 400);
    assert!(map.height() > 0);
}

// ============================================================================
// Errors and auxiliary outputs
// ============================================================================

#[test]
fn test_unknown_region() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let err = pipeline
        .render(&sample_dataset(), &geographic_dem(89.5, 24.5), "Atlantis")
        .unwrap_err();
    assert!(matches!(err, ReliefError::RegionNotFound { ref name } if name == "Atlantis"));
}

#[test]
fn test_local_grid_with_geographic_boundary_unsupported() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let err = pipeline.render(&sample_dataset(), &e2e_grid(), "Squareland").unwrap_err();
    assert!(matches!(err, ReliefError::UnsupportedCrs(_)));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = PipelineConfig::default();
    config.resolver.name_keys.clear();
    assert!(matches!(Pipeline::new(config), Err(ReliefError::InvalidConfig(_))));
}

#[test]
fn test_boundary_map_from_geojson_file() {
    let file = write_temp_file(SAMPLE_GEOJSON.as_bytes(), ".geojson");
    let dataset = BoundaryDataset::from_geojson_path(file.path()).unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();

    let map = pipeline.boundary_map(&dataset, "Republic of Squareland", 300).unwrap();
    assert_eq!(map.width(), 300);
    assert!(map.height() > 280 && map.height() < 360, "height {}", map.height());
    let fill = Render2DConfig::default().map_fill;
    assert_eq!(map.pixel(150, map.height() / 2), fill);
}

#[test]
fn test_static_view_of_output() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let output = pipeline
        .render(&sample_dataset(), &geographic_dem(89.5, 24.5), "Squareland")
        .unwrap();
    let camera = &pipeline.config().render_3d.camera;
    let image = output.view(camera).unwrap();
    assert_eq!((image.width(), image.height()), (camera.width, camera.height));
}
