//! Regular structured grids for scalar fields and block models

use crate::geometry::ScalarArray;
use crate::point::*;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A regular grid of points, x varying fastest, then y, then z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStructuredGrid")]
pub struct StructuredGrid {
    pub origin: Point3d,
    pub spacing: Vector3d,
    pub dimensions: [usize; 3],
    pub scalars: Option<ScalarArray>,
}

#[derive(Deserialize)]
struct RawStructuredGrid {
    origin: Point3d,
    spacing: Vector3d,
    dimensions: [usize; 3],
    #[serde(default)]
    scalars: Option<ScalarArray>,
}

impl TryFrom<RawStructuredGrid> for StructuredGrid {
    type Error = Error;

    fn try_from(raw: RawStructuredGrid) -> Result<Self> {
        let grid = StructuredGrid::new(raw.origin, raw.spacing, raw.dimensions)?;
        match raw.scalars {
            Some(scalars) => grid.with_scalars(scalars),
            None => Ok(grid),
        }
    }
}

impl StructuredGrid {
    /// Create a grid without scalars
    pub fn new(origin: Point3d, spacing: Vector3d, dimensions: [usize; 3]) -> Result<Self> {
        if dimensions.iter().any(|&d| d == 0) {
            return Err(Error::InvalidArgument(format!(
                "grid dimensions must be positive, got {:?}",
                dimensions
            )));
        }
        if spacing.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(Error::InvalidArgument(format!(
                "grid spacing must be finite and non-negative, got {:?}",
                spacing
            )));
        }
        Ok(Self {
            origin,
            spacing,
            dimensions,
            scalars: None,
        })
    }

    /// Attach point scalars
    pub fn with_scalars(mut self, scalars: ScalarArray) -> Result<Self> {
        scalars.check_len(self.n_points())?;
        self.scalars = Some(scalars);
        Ok(self)
    }

    pub fn n_points(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Position of the point at flat index `index`
    pub fn point(&self, index: usize) -> Point3d {
        let [nx, ny, _] = self.dimensions;
        let i = index % nx;
        let j = (index / nx) % ny;
        let k = index / (nx * ny);
        Point3d::new(
            self.origin.x + i as f64 * self.spacing.x,
            self.origin.y + j as f64 * self.spacing.y,
            self.origin.z + k as f64 * self.spacing.z,
        )
    }

    /// All grid points in storage order
    pub fn points(&self) -> Vec<Point3d> {
        (0..self.n_points()).map(|i| self.point(i)).collect()
    }

    pub fn bounds(&self) -> Option<(Point3d, Point3d)> {
        let [nx, ny, nz] = self.dimensions;
        let far = Point3d::new(
            self.origin.x + (nx - 1) as f64 * self.spacing.x,
            self.origin.y + (ny - 1) as f64 * self.spacing.y,
            self.origin.z + (nz - 1) as f64 * self.spacing.z,
        );
        Some((self.origin, far))
    }

    /// Blank every point whose scalar is below `min`.
    ///
    /// Blanked values become NaN; renderers draw NaN as transparent.
    pub fn threshold(&self, min: f64) -> Result<Self> {
        let scalars = self.scalars.as_ref().ok_or_else(|| {
            Error::InvalidData("cannot threshold a grid without scalars".to_string())
        })?;
        let values = scalars
            .values
            .iter()
            .map(|&v| if v >= min { v } else { f64::NAN })
            .collect();
        Ok(Self {
            scalars: Some(ScalarArray::new(scalars.name.clone(), values)),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> StructuredGrid {
        StructuredGrid::new(Point3d::origin(), Vector3d::new(1.0, 1.0, 1.0), [2, 3, 2]).unwrap()
    }

    #[test]
    fn test_point_ordering() {
        let grid = unit_grid();
        assert_eq!(grid.n_points(), 12);
        assert_eq!(grid.point(0), Point3d::new(0.0, 0.0, 0.0));
        assert_eq!(grid.point(1), Point3d::new(1.0, 0.0, 0.0));
        assert_eq!(grid.point(2), Point3d::new(0.0, 1.0, 0.0));
        assert_eq!(grid.point(6), Point3d::new(0.0, 0.0, 1.0));
        assert_eq!(grid.bounds().unwrap().1, Point3d::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(StructuredGrid::new(Point3d::origin(), Vector3d::new(1.0, 1.0, 1.0), [0, 1, 1]).is_err());
    }

    #[test]
    fn test_threshold_blanks_low_values() {
        let values: Vec<f64> = (0..12).map(|i| i as f64 - 6.0).collect();
        let grid = unit_grid()
            .with_scalars(ScalarArray::new("displacement", values))
            .unwrap();
        let kept = grid.threshold(0.0).unwrap();
        let scalars = kept.scalars.unwrap();
        assert!(scalars.values[..6].iter().all(|v| v.is_nan()));
        assert_eq!(scalars.values[6], 0.0);
        assert_eq!(scalars.range(), Some((0.0, 5.0)));
    }

    #[test]
    fn test_deserialize_validates() {
        let grid: StructuredGrid = serde_json::from_str(
            r#"{"origin": [0.0, 0.0, 0.0], "spacing": [1.0, 1.0, 1.0], "dimensions": [2, 1, 1],
                "scalars": {"name": "v", "values": [1.0, 2.0]}}"#,
        )
        .unwrap();
        assert_eq!(grid.point(1), Point3d::new(1.0, 0.0, 0.0));

        let empty = serde_json::from_str::<StructuredGrid>(
            r#"{"origin": [0.0, 0.0, 0.0], "spacing": [1.0, 1.0, 1.0], "dimensions": [0, 2, 2]}"#,
        );
        assert!(empty.is_err());

        let short_scalars = serde_json::from_str::<StructuredGrid>(
            r#"{"origin": [0.0, 0.0, 0.0], "spacing": [1.0, 1.0, 1.0], "dimensions": [2, 2, 1],
                "scalars": {"name": "v", "values": [1.0]}}"#,
        );
        assert!(short_scalars.is_err());
    }

    #[test]
    fn test_threshold_requires_scalars() {
        assert!(unit_grid().threshold(0.0).is_err());
    }
}
