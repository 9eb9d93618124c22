//! Observation data and point based geometry

use crate::geometry::ScalarArray;
use crate::point::*;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Glyph shape used to draw vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphKind {
    Arrow,
    Disc,
}

impl Default for GlyphKind {
    fn default() -> Self {
        GlyphKind::Arrow
    }
}

/// Scattered points, optionally coloured by scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub points: Vec<Point3d>,
    pub scalars: Option<ScalarArray>,
}

impl PointSet {
    pub fn new(points: Vec<Point3d>) -> Self {
        Self {
            points,
            scalars: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Option<(Point3d, Point3d)> {
        extent(&self.points)
    }
}

/// Oriented glyphs placed at points. `directions` already carry the glyph length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphSet {
    pub kind: GlyphKind,
    pub locations: Vec<Point3d>,
    pub directions: Vec<Vector3d>,
    pub scalars: Option<ScalarArray>,
}

impl GlyphSet {
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn bounds(&self) -> Option<(Point3d, Point3d)> {
        let tips: Vec<Point3d> = self
            .locations
            .iter()
            .zip(&self.directions)
            .map(|(p, d)| p + d)
            .collect();
        extent(self.locations.iter().chain(tips.iter()))
    }
}

/// Scalar observations such as interface or contact points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePoints {
    pub name: String,
    pub locations: Vec<Point3d>,
    pub values: Vec<f64>,
}

impl ValuePoints {
    pub fn new(name: impl Into<String>, locations: Vec<Point3d>, values: Vec<f64>) -> Result<Self> {
        if locations.len() != values.len() {
            return Err(Error::InvalidData(format!(
                "{} locations but {} values",
                locations.len(),
                values.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            locations,
            values,
        })
    }

    /// Points coloured by their observed value
    pub fn to_point_set(&self) -> PointSet {
        PointSet {
            points: self.locations.clone(),
            scalars: Some(ScalarArray::new("values", self.values.clone())),
        }
    }
}

/// Vector observations such as orientation measurements or gradient samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPoints {
    pub name: String,
    pub locations: Vec<Point3d>,
    pub vectors: Vec<Vector3d>,
}

impl VectorPoints {
    pub fn new(name: impl Into<String>, locations: Vec<Point3d>, vectors: Vec<Vector3d>) -> Result<Self> {
        if locations.len() != vectors.len() {
            return Err(Error::InvalidData(format!(
                "{} locations but {} vectors",
                locations.len(),
                vectors.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            locations,
            vectors,
        })
    }

    /// Glyphs of length `scale` pointing along each normalised vector.
    ///
    /// `scale_values`, when given, holds one multiplier per location; NaN
    /// multipliers collapse the glyph to zero length.
    pub fn to_glyphs(&self, kind: GlyphKind, scale: f64, scale_values: Option<&[f64]>) -> Result<GlyphSet> {
        if let Some(factors) = scale_values {
            if factors.len() != self.locations.len() {
                return Err(Error::InvalidData(format!(
                    "{} scale values for {} vectors",
                    factors.len(),
                    self.locations.len()
                )));
            }
        }

        let directions = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let factor = scale_values.map_or(1.0, |f| if f[i].is_nan() { 0.0 } else { f[i] });
                v.try_normalize(f64::EPSILON)
                    .map_or_else(Vector3d::zeros, |n| n * scale * factor)
            })
            .collect();

        Ok(GlyphSet {
            kind,
            locations: self.locations.clone(),
            directions,
            scalars: None,
        })
    }
}

/// One data set attached to a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataPoints {
    Value(ValuePoints),
    Vector(VectorPoints),
}

impl DataPoints {
    pub fn name(&self) -> &str {
        match self {
            DataPoints::Value(points) => &points.name,
            DataPoints::Vector(points) => &points.name,
        }
    }
}
