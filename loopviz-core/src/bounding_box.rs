//! Model bounding box

use crate::grid::StructuredGrid;
use crate::point::*;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The region a geological model is evaluated in, with a sampling resolution.
///
/// Always satisfies `maximum > origin` on every axis and at least two steps
/// per axis, including when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    origin: Point3d,
    maximum: Point3d,
    nsteps: [usize; 3],
}

#[derive(Deserialize)]
struct RawBoundingBox {
    origin: Point3d,
    maximum: Point3d,
    nsteps: [usize; 3],
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = Error;

    fn try_from(raw: RawBoundingBox) -> Result<Self> {
        BoundingBox::new(raw.origin, raw.maximum, raw.nsteps)
    }
}

impl BoundingBox {
    pub fn new(origin: Point3d, maximum: Point3d, nsteps: [usize; 3]) -> Result<Self> {
        if (0..3).any(|i| !(maximum[i] > origin[i]) || !origin[i].is_finite() || !maximum[i].is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "bounding box maximum {:?} must exceed origin {:?}",
                maximum, origin
            )));
        }
        if nsteps.iter().any(|&n| n < 2) {
            return Err(Error::InvalidArgument(format!(
                "bounding box needs at least two steps per axis, got {:?}",
                nsteps
            )));
        }
        Ok(Self {
            origin,
            maximum,
            nsteps,
        })
    }

    pub fn origin(&self) -> Point3d {
        self.origin
    }

    pub fn maximum(&self) -> Point3d {
        self.maximum
    }

    pub fn nsteps(&self) -> [usize; 3] {
        self.nsteps
    }

    pub fn length(&self) -> Vector3d {
        self.maximum - self.origin
    }

    /// Distance between neighbouring grid points along each axis
    pub fn step_vector(&self) -> Vector3d {
        let length = self.length();
        Vector3d::new(
            length.x / (self.nsteps[0] - 1) as f64,
            length.y / (self.nsteps[1] - 1) as f64,
            length.z / (self.nsteps[2] - 1) as f64,
        )
    }

    pub fn contains(&self, point: &Point3d) -> bool {
        (0..3).all(|i| point[i] >= self.origin[i] && point[i] <= self.maximum[i])
    }

    /// The sampling grid, without scalars
    pub fn grid(&self) -> StructuredGrid {
        StructuredGrid {
            origin: self.origin,
            spacing: self.step_vector(),
            dimensions: self.nsteps,
            scalars: None,
        }
    }

    /// Points of the sampling grid, x fastest
    pub fn regular_grid(&self) -> Vec<Point3d> {
        self.grid().points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_regular_grid() {
        let bb = BoundingBox::new(
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(10.0, 20.0, 5.0),
            [3, 5, 2],
        )
        .unwrap();
        let points = bb.regular_grid();
        assert_eq!(points.len(), 30);
        assert_relative_eq!(bb.step_vector(), Vector3d::new(5.0, 5.0, 5.0));
        assert_eq!(points[0], bb.origin());
        assert_eq!(*points.last().unwrap(), bb.maximum());
        assert!(points.iter().all(|p| bb.contains(p)));
    }

    #[test]
    fn test_invalid_box() {
        let flipped = BoundingBox::new(Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 1.0), [2, 2, 2]);
        assert!(flipped.is_err());
        let coarse = BoundingBox::new(Point3d::origin(), Point3d::new(1.0, 1.0, 1.0), [1, 2, 2]);
        assert!(coarse.is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let bb: BoundingBox = serde_json::from_str(
            r#"{"origin": [0.0, 0.0, 0.0], "maximum": [10.0, 10.0, 10.0], "nsteps": [3, 3, 3]}"#,
        )
        .unwrap();
        assert_eq!(bb.nsteps(), [3, 3, 3]);
        assert_eq!(bb.grid().n_points(), 27);

        let too_few_steps = serde_json::from_str::<BoundingBox>(
            r#"{"origin": [0.0, 0.0, 0.0], "maximum": [1.0, 1.0, 1.0], "nsteps": [0, 2, 2]}"#,
        );
        assert!(too_few_steps.is_err());

        let flipped = serde_json::from_str::<BoundingBox>(
            r#"{"origin": [5.0, 0.0, 0.0], "maximum": [1.0, 1.0, 1.0], "nsteps": [2, 2, 2]}"#,
        );
        assert!(flipped.is_err());
    }
}
