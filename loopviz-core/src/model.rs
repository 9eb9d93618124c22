//! Interfaces to a geological modelling backend
//!
//! The viewer never evaluates geology itself. A modelling backend implements
//! these traits and hands back geometry that is ready to draw.

use crate::bounding_box::BoundingBox;
use crate::colour::ColourValue;
use crate::data::{DataPoints, VectorPoints};
use crate::grid::StructuredGrid;
use crate::mesh::TriangleMesh;
use crate::point::Point3d;
use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Group name reserved for faults inside a stratigraphic column
pub const FAULT_GROUP: &str = "faults";

/// An isosurface extracted from a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub name: String,
    pub value: Option<f64>,
    pub mesh: TriangleMesh,
}

impl Surface {
    pub fn new(name: impl Into<String>, value: Option<f64>, mesh: TriangleMesh) -> Self {
        Self {
            name: name.into(),
            value,
            mesh,
        }
    }
}

/// A single unit of the stratigraphic column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratigraphicUnit {
    pub id: i64,
    pub colour: ColourValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Units grouped by conformable series, in stratigraphic order.
///
/// Both the groups and the units inside a group keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StratigraphicColumn {
    groups: IndexMap<String, IndexMap<String, StratigraphicUnit>>,
}

impl StratigraphicColumn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit to `group`, creating the group when needed
    pub fn insert(&mut self, group: &str, unit_name: &str, unit: StratigraphicUnit) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(unit_name.to_string(), unit);
    }

    pub fn group(&self, name: &str) -> Option<&IndexMap<String, StratigraphicUnit>> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &IndexMap<String, StratigraphicUnit>)> {
        self.groups.iter().map(|(name, units)| (name.as_str(), units))
    }

    /// Every unit outside the fault group, in column order
    pub fn units(&self) -> impl Iterator<Item = (&str, &StratigraphicUnit)> {
        self.groups()
            .filter(|(group, _)| *group != FAULT_GROUP)
            .flat_map(|(_, units)| units.iter().map(|(name, unit)| (name.as_str(), unit)))
    }

    pub fn unit(&self, name: &str) -> Option<&StratigraphicUnit> {
        self.units().find(|(n, _)| *n == name).map(|(_, unit)| unit)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A scalar field describing one geological structure
pub trait GeologicalFeature {
    fn name(&self) -> &str;

    /// Isosurfaces at `values`, or at the feature's default isovalues when `None`
    fn surfaces(&self, values: Option<&[f64]>) -> Result<Vec<Surface>>;

    /// The scalar field sampled on the model grid
    fn scalar_field(&self) -> Result<StructuredGrid>;

    /// The gradient of the field sampled on the model grid
    fn vector_field(&self) -> Result<VectorPoints>;

    /// Observations the feature was interpolated from
    fn get_data(&self) -> Vec<DataPoints>;

    /// Field value at each point; NaN where the feature is undefined
    fn evaluate_value(&self, points: &[Point3d]) -> Vec<f64>;

    fn min(&self) -> f64;

    fn max(&self) -> f64;
}

/// A fault: a fault frame plus a displacement field
pub trait FaultFeature {
    fn name(&self) -> &str;

    /// Surfaces of the fault frame's first coordinate
    fn surfaces(&self, values: Option<&[f64]>) -> Result<Vec<Surface>>;

    /// Field giving the fault displacement at each point
    fn displacement_feature(&self) -> &dyn GeologicalFeature;

    /// Fault frame coordinate whose gradient is the slip direction
    fn slip_feature(&self) -> &dyn GeologicalFeature;
}

/// A complete geological model
pub trait GeologicalModel {
    fn bounding_box(&self) -> &BoundingBox;

    fn stratigraphic_column(&self) -> &StratigraphicColumn;

    fn faults(&self) -> Vec<&dyn FaultFeature>;

    /// Block model on the model grid plus the unit ids it may contain
    fn get_block_model(&self) -> Result<(StructuredGrid, Vec<i64>)>;

    /// One surface per unit boundary, named after the unit
    fn get_stratigraphic_surfaces(&self) -> Result<Vec<Surface>>;

    fn get_fault_surfaces(&self) -> Result<Vec<Surface>>;

    /// Map real-world coordinates into the model's internal frame
    fn scale(&self, points: &[Point3d]) -> Vec<Point3d>;
}
