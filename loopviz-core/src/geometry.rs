//! Renderable geometry payloads

use crate::data::{GlyphSet, PointSet};
use crate::grid::StructuredGrid;
use crate::mesh::TriangleMesh;
use crate::point::{finite_range, Point3d};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Named per-point scalar values attached to a geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarArray {
    pub name: String,
    pub values: Vec<f64>,
}

impl ScalarArray {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Range of the finite values
    pub fn range(&self) -> Option<(f64, f64)> {
        finite_range(&self.values)
    }

    /// Check that there is exactly one value per point
    pub(crate) fn check_len(&self, n_points: usize) -> Result<()> {
        if self.values.len() != n_points {
            return Err(Error::InvalidData(format!(
                "scalar array '{}' has {} values for {} points",
                self.name,
                self.values.len(),
                n_points
            )));
        }
        Ok(())
    }
}

/// Anything that can be handed to a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Surface(TriangleMesh),
    Grid(StructuredGrid),
    Points(PointSet),
    Glyphs(GlyphSet),
}

impl Geometry {
    /// Short description used in log messages
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Surface(_) => "surface",
            Geometry::Grid(_) => "grid",
            Geometry::Points(_) => "points",
            Geometry::Glyphs(_) => "glyphs",
        }
    }

    pub fn n_points(&self) -> usize {
        match self {
            Geometry::Surface(mesh) => mesh.vertex_count(),
            Geometry::Grid(grid) => grid.n_points(),
            Geometry::Points(points) => points.len(),
            Geometry::Glyphs(glyphs) => glyphs.len(),
        }
    }

    /// The active scalar array, if any
    pub fn scalars(&self) -> Option<&ScalarArray> {
        match self {
            Geometry::Surface(mesh) => mesh.scalars.as_ref(),
            Geometry::Grid(grid) => grid.scalars.as_ref(),
            Geometry::Points(points) => points.scalars.as_ref(),
            Geometry::Glyphs(glyphs) => glyphs.scalars.as_ref(),
        }
    }

    /// Attach a scalar array, replacing any existing one
    pub fn set_scalars(&mut self, scalars: ScalarArray) -> Result<()> {
        scalars.check_len(self.n_points())?;
        match self {
            Geometry::Surface(mesh) => mesh.scalars = Some(scalars),
            Geometry::Grid(grid) => grid.scalars = Some(scalars),
            Geometry::Points(points) => points.scalars = Some(scalars),
            Geometry::Glyphs(glyphs) => glyphs.scalars = Some(scalars),
        }
        Ok(())
    }

    /// Axis aligned bounds of the geometry
    pub fn bounds(&self) -> Option<(Point3d, Point3d)> {
        match self {
            Geometry::Surface(mesh) => mesh.bounds(),
            Geometry::Grid(grid) => grid.bounds(),
            Geometry::Points(points) => points.bounds(),
            Geometry::Glyphs(glyphs) => glyphs.bounds(),
        }
    }
}

impl From<TriangleMesh> for Geometry {
    fn from(mesh: TriangleMesh) -> Self {
        Geometry::Surface(mesh)
    }
}

impl From<StructuredGrid> for Geometry {
    fn from(grid: StructuredGrid) -> Self {
        Geometry::Grid(grid)
    }
}

impl From<PointSet> for Geometry {
    fn from(points: PointSet) -> Self {
        Geometry::Points(points)
    }
}

impl From<GlyphSet> for Geometry {
    fn from(glyphs: GlyphSet) -> Self {
        Geometry::Glyphs(glyphs)
    }
}
