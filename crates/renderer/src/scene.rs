//! Rendering-ready bundle of a clipped, classified region.

use relief_common::{BoundingBox, Crs, ElevationGrid, Geometry, Mask, ReliefError, ReliefResult};

use crate::classify::Classification;
use crate::gradient::Color;

/// Everything the 2D and 3D renderers need for one region.
///
/// Grid, mask and classification are congruent, and the grid and outline
/// share one planar CRS.
#[derive(Debug, Clone)]
pub struct Scene {
    grid: ElevationGrid,
    mask: Mask,
    classification: Classification,
    outline: Geometry,
    extent: BoundingBox,
}

impl Scene {
    pub fn new(
        grid: ElevationGrid,
        mask: Mask,
        classification: Classification,
        outline: Geometry,
    ) -> ReliefResult<Self> {
        if !mask.is_congruent(&grid)
            || classification.width() != grid.width()
            || classification.height() != grid.height()
        {
            return Err(ReliefError::InvalidGrid(
                "scene grid, mask and colors must have the same shape".to_string(),
            ));
        }
        outline.ensure_planar("scene assembly")?;
        if outline.crs() != grid.crs() {
            return Err(ReliefError::crs_mismatch(grid.crs(), outline.crs()));
        }

        let extent = outline.bbox();
        Ok(Self {
            grid,
            mask,
            classification,
            outline,
            extent,
        })
    }

    pub fn grid(&self) -> &ElevationGrid {
        &self.grid
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn outline(&self) -> &Geometry {
        &self.outline
    }

    /// Extent of the boundary outline.
    pub fn extent(&self) -> BoundingBox {
        self.extent
    }

    pub fn crs(&self) -> Crs {
        self.grid.crs()
    }

    /// Color of cell (row, col); `None` when the cell is not rendered.
    pub fn color(&self, row: usize, col: usize) -> Option<Color> {
        if !self.mask.get(row, col) {
            return None;
        }
        self.classification.get(row, col)
    }

    /// True when no cell lies inside the boundary.
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifierConfig, ElevationClassifier};
    use relief_common::{AffineTransform, Ring, DEFAULT_NODATA};

    fn grid() -> ElevationGrid {
        ElevationGrid::new(
            vec![-1.0, 1.0, 2.0, 3.0],
            2,
            2,
            AffineTransform::north_up(0.0, 2.0, 1.0, 1.0),
            Crs::Local,
            DEFAULT_NODATA,
        )
        .unwrap()
    }

    fn outline(crs: Crs) -> Geometry {
        Geometry::from_ring(Ring::rectangle(0.0, 0.0, 1.0, 2.0).unwrap(), crs)
    }

    #[test]
    fn test_scene_colors_follow_mask() {
        let mask = Mask::from_cells(2, 2, vec![true, false, true, false]).unwrap();
        let colors = ElevationClassifier::default().classify(&grid(), &mask).unwrap();
        let scene = Scene::new(grid(), mask, colors, outline(Crs::Local)).unwrap();

        assert!(!scene.is_empty());
        assert_eq!(scene.color(0, 0), Some(Color::GREEN));
        assert_eq!(scene.color(0, 1), None);
        assert_eq!(scene.extent(), BoundingBox::new(0.0, 0.0, 1.0, 2.0));
    }

    #[test]
    fn test_scene_rejects_mismatches() {
        let mask = Mask::empty(2, 2);
        let colors = Classification::empty(2, 2, &ClassifierConfig::default());
        let err = Scene::new(grid(), mask.clone(), colors.clone(), outline(Crs::WebMercator)).unwrap_err();
        assert!(matches!(err, ReliefError::CrsMismatch { .. }));

        let err = Scene::new(grid(), Mask::empty(3, 2), colors, outline(Crs::Local)).unwrap_err();
        assert!(matches!(err, ReliefError::InvalidGrid(_)));
    }
}
