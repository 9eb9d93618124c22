//! A synthetic layered model
//!
//! Flat-lying units stacked from the floor of the bounding box, cut by planar
//! faults. The faults carry a displacement field but do not offset the
//! layers. Useful for demos, tests and checking a renderer backend without a
//! modelling engine.

use crate::bounding_box::BoundingBox;
use crate::colour::ColourValue;
use crate::data::{DataPoints, ValuePoints, VectorPoints};
use crate::geometry::ScalarArray;
use crate::grid::StructuredGrid;
use crate::mesh::TriangleMesh;
use crate::model::*;
use crate::point::*;
use crate::{Error, Result};
use tracing::debug;

/// Mapping between real-world coordinates and the model frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelFrame {
    pub origin: Point3d,
    pub scale_factor: f64,
}

impl ModelFrame {
    pub fn to_local(&self, p: &Point3d) -> Point3d {
        Point3d::from((p - self.origin) / self.scale_factor)
    }

    pub fn to_world(&self, p: &Point3d) -> Point3d {
        self.origin + p.coords * self.scale_factor
    }
}

/// Cross-section of the plane `normal . p = offset` with the box, as a fan of triangles
pub fn plane_section(bbox: &BoundingBox, normal: &Vector3d, offset: f64) -> Option<TriangleMesh> {
    let (lo, hi) = (bbox.origin(), bbox.maximum());
    let corner = |i: usize| {
        Point3d::new(
            if i & 1 == 0 { lo.x } else { hi.x },
            if i & 2 == 0 { lo.y } else { hi.y },
            if i & 4 == 0 { lo.z } else { hi.z },
        )
    };
    const EDGES: [(usize, usize); 12] = [
        (0, 1), (2, 3), (4, 5), (6, 7),
        (0, 2), (1, 3), (4, 6), (5, 7),
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];

    let tolerance = bbox.length().norm() * 1e-9;
    let mut points: Vec<Point3d> = Vec::new();
    for (a, b) in EDGES {
        let (pa, pb) = (corner(a), corner(b));
        let da = normal.dot(&pa.coords) - offset;
        let db = normal.dot(&pb.coords) - offset;
        if da * db > 0.0 || da == db {
            continue;
        }
        let t = da / (da - db);
        let p = pa + (pb - pa) * t;
        if points.iter().all(|q| (q - p).norm() > tolerance) {
            points.push(p);
        }
    }
    if points.len() < 3 {
        return None;
    }

    // order around the centroid so the polygon can be fanned
    let centroid = Point3d::from(points.iter().fold(Vector3d::zeros(), |acc, p| acc + p.coords) / points.len() as f64);
    let n = normal.normalize();
    let helper = if n.x.abs() < 0.9 { Vector3d::x() } else { Vector3d::y() };
    let u = n.cross(&helper).normalize();
    let v = n.cross(&u);
    points.sort_by(|a, b| {
        let angle = |p: &Point3d| {
            let d = p - centroid;
            d.dot(&v).atan2(d.dot(&u))
        };
        angle(a).total_cmp(&angle(b))
    });

    let faces = (1..points.len() - 1).map(|i| [0, i, i + 1]).collect();
    Some(TriangleMesh::from_vertices_and_faces(points, faces))
}

/// A linear scalar field `normal . (p - point)`, evaluated in the model frame
#[derive(Debug, Clone)]
pub struct PlanarFeature {
    name: String,
    point: Point3d,
    normal: Vector3d,
    isovalues: Vec<f64>,
    data: Vec<DataPoints>,
    bbox: BoundingBox,
    frame: ModelFrame,
}

impl PlanarFeature {
    fn world_value(&self, p: &Point3d) -> f64 {
        self.normal.dot(&(p - self.point))
    }

    fn corner_values(&self) -> impl Iterator<Item = f64> + '_ {
        let (lo, hi) = (self.bbox.origin(), self.bbox.maximum());
        (0..8).map(move |i| {
            self.world_value(&Point3d::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            ))
        })
    }
}

impl GeologicalFeature for PlanarFeature {
    fn name(&self) -> &str {
        &self.name
    }

    fn surfaces(&self, values: Option<&[f64]>) -> Result<Vec<Surface>> {
        let values = values.unwrap_or(self.isovalues.as_slice());
        let offset = self.normal.dot(&self.point.coords);
        Ok(values
            .iter()
            .filter_map(|&value| {
                plane_section(&self.bbox, &self.normal, offset + value)
                    .map(|mesh| Surface::new(format!("{}_{}", self.name, value), Some(value), mesh))
            })
            .collect())
    }

    fn scalar_field(&self) -> Result<StructuredGrid> {
        let grid = self.bbox.grid();
        let values = grid.points().iter().map(|p| self.world_value(p)).collect();
        grid.with_scalars(ScalarArray::new(self.name.clone(), values))
    }

    fn vector_field(&self) -> Result<VectorPoints> {
        let locations = self.bbox.regular_grid();
        let vectors = vec![self.normal; locations.len()];
        VectorPoints::new(self.name.clone(), locations, vectors)
    }

    fn get_data(&self) -> Vec<DataPoints> {
        self.data.clone()
    }

    fn evaluate_value(&self, points: &[Point3d]) -> Vec<f64> {
        points
            .iter()
            .map(|p| {
                let world = self.frame.to_world(p);
                if self.bbox.contains(&world) {
                    self.world_value(&world)
                } else {
                    f64::NAN
                }
            })
            .collect()
    }

    fn min(&self) -> f64 {
        self.corner_values().fold(f64::INFINITY, f64::min)
    }

    fn max(&self) -> f64 {
        self.corner_values().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Displacement that decays away from the fault on the hanging wall
#[derive(Debug, Clone)]
pub struct FaultDisplacement {
    name: String,
    point: Point3d,
    normal: Vector3d,
    slip: Vector3d,
    displacement: f64,
    influence: f64,
    bbox: BoundingBox,
    frame: ModelFrame,
}

impl FaultDisplacement {
    fn world_value(&self, p: &Point3d) -> f64 {
        let distance = self.normal.dot(&(p - self.point));
        if distance < 0.0 {
            return 0.0;
        }
        let r = distance / self.influence;
        self.displacement * (-r * r).exp()
    }
}

impl GeologicalFeature for FaultDisplacement {
    fn name(&self) -> &str {
        &self.name
    }

    fn surfaces(&self, _values: Option<&[f64]>) -> Result<Vec<Surface>> {
        Ok(Vec::new())
    }

    fn scalar_field(&self) -> Result<StructuredGrid> {
        let grid = self.bbox.grid();
        let values = grid.points().iter().map(|p| self.world_value(p)).collect();
        grid.with_scalars(ScalarArray::new("displacement", values))
    }

    fn vector_field(&self) -> Result<VectorPoints> {
        let locations = self.bbox.regular_grid();
        let vectors = locations.iter().map(|p| self.slip * self.world_value(p)).collect();
        VectorPoints::new(self.name.clone(), locations, vectors)
    }

    fn get_data(&self) -> Vec<DataPoints> {
        Vec::new()
    }

    fn evaluate_value(&self, points: &[Point3d]) -> Vec<f64> {
        points
            .iter()
            .map(|p| {
                let world = self.frame.to_world(p);
                if self.bbox.contains(&world) {
                    self.world_value(&world)
                } else {
                    f64::NAN
                }
            })
            .collect()
    }

    fn min(&self) -> f64 {
        0.0
    }

    fn max(&self) -> f64 {
        self.displacement
    }
}

/// A planar fault with a slip direction and displacement magnitude
#[derive(Debug, Clone)]
pub struct PlanarFault {
    name: String,
    frame: PlanarFeature,
    slip: PlanarFeature,
    displacement: FaultDisplacement,
}

impl FaultFeature for PlanarFault {
    fn name(&self) -> &str {
        &self.name
    }

    fn surfaces(&self, values: Option<&[f64]>) -> Result<Vec<Surface>> {
        self.frame.surfaces(Some(values.unwrap_or(&[0.0][..])))
    }

    fn displacement_feature(&self) -> &dyn GeologicalFeature {
        &self.displacement
    }

    fn slip_feature(&self) -> &dyn GeologicalFeature {
        &self.slip
    }
}

struct UnitSpec {
    name: String,
    thickness: f64,
    colour: ColourValue,
}

struct FaultSpec {
    name: String,
    point: Point3d,
    normal: Vector3d,
    slip: Vector3d,
    displacement: f64,
}

/// Builder for [`LayeredModel`]
pub struct LayeredModelBuilder {
    bbox: BoundingBox,
    scale_factor: f64,
    group: String,
    units: Vec<UnitSpec>,
    faults: Vec<FaultSpec>,
}

impl LayeredModelBuilder {
    /// Scale factor between real-world and model coordinates
    pub fn scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Name of the stratigraphic group holding the units
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Add a unit on top of the existing stack
    pub fn unit(mut self, name: impl Into<String>, thickness: f64, colour: impl Into<ColourValue>) -> Self {
        self.units.push(UnitSpec {
            name: name.into(),
            thickness,
            colour: colour.into(),
        });
        self
    }

    pub fn fault(
        mut self,
        name: impl Into<String>,
        point: Point3d,
        normal: Vector3d,
        slip: Vector3d,
        displacement: f64,
    ) -> Self {
        self.faults.push(FaultSpec {
            name: name.into(),
            point,
            normal,
            slip,
            displacement,
        });
        self
    }

    pub fn build(self) -> Result<LayeredModel> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "scale factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if self.units.is_empty() {
            return Err(Error::Model("a layered model needs at least one unit".to_string()));
        }
        if let Some(unit) = self.units.iter().find(|u| !(u.thickness > 0.0)) {
            return Err(Error::Model(format!(
                "unit '{}' has non-positive thickness {}",
                unit.name, unit.thickness
            )));
        }

        let frame = ModelFrame {
            origin: self.bbox.origin(),
            scale_factor: self.scale_factor,
        };

        let mut column = StratigraphicColumn::new();
        let mut bases = Vec::with_capacity(self.units.len());
        let mut base = 0.0;
        for (id, unit) in self.units.iter().enumerate() {
            column.insert(
                &self.group,
                &unit.name,
                StratigraphicUnit {
                    id: id as i64,
                    colour: unit.colour.clone(),
                    min: Some(base),
                    max: Some(base + unit.thickness),
                },
            );
            bases.push(base);
            base += unit.thickness;
        }

        let stratigraphy = PlanarFeature {
            name: self.group.clone(),
            point: self.bbox.origin(),
            normal: Vector3d::z(),
            isovalues: bases.clone(),
            data: boundary_observations(&self.bbox, &bases)?,
            bbox: self.bbox.clone(),
            frame,
        };

        let influence = self.bbox.length().norm() / 4.0;
        let mut faults = Vec::with_capacity(self.faults.len());
        for spec in self.faults {
            let normal = spec.normal.try_normalize(f64::EPSILON).ok_or_else(|| {
                Error::Model(format!("fault '{}' has a zero normal", spec.name))
            })?;
            let slip = spec.slip.try_normalize(f64::EPSILON).ok_or_else(|| {
                Error::Model(format!("fault '{}' has a zero slip vector", spec.name))
            })?;
            column.insert(
                FAULT_GROUP,
                &spec.name,
                StratigraphicUnit {
                    id: faults.len() as i64,
                    colour: "black".into(),
                    min: None,
                    max: None,
                },
            );
            faults.push(PlanarFault {
                frame: PlanarFeature {
                    name: format!("{}_frame", spec.name),
                    point: spec.point,
                    normal,
                    isovalues: vec![0.0],
                    data: Vec::new(),
                    bbox: self.bbox.clone(),
                    frame,
                },
                slip: PlanarFeature {
                    name: format!("{}_slip", spec.name),
                    point: spec.point,
                    normal: slip,
                    isovalues: vec![0.0],
                    data: Vec::new(),
                    bbox: self.bbox.clone(),
                    frame,
                },
                displacement: FaultDisplacement {
                    name: format!("{}_displacement", spec.name),
                    point: spec.point,
                    normal,
                    slip,
                    displacement: spec.displacement,
                    influence,
                    bbox: self.bbox.clone(),
                    frame,
                },
                name: spec.name,
            });
        }

        debug!(
            "Built layered model with {} units and {} faults",
            self.units.len(),
            faults.len()
        );

        Ok(LayeredModel {
            bbox: self.bbox,
            frame,
            column,
            unit_names: self.units.into_iter().map(|u| u.name).collect(),
            bases,
            stratigraphy,
            faults,
        })
    }
}

/// Contact points and normals on every unit boundary at five map locations
fn boundary_observations(bbox: &BoundingBox, bases: &[f64]) -> Result<Vec<DataPoints>> {
    let (lo, length) = (bbox.origin(), bbox.length());
    let map_points = [(0.25, 0.25), (0.75, 0.25), (0.75, 0.75), (0.25, 0.75), (0.5, 0.5)];

    let mut locations = Vec::new();
    let mut values = Vec::new();
    for &base in bases {
        let z = lo.z + base;
        if z > bbox.maximum().z {
            continue;
        }
        for (fx, fy) in map_points {
            locations.push(Point3d::new(lo.x + fx * length.x, lo.y + fy * length.y, z));
            values.push(base);
        }
    }
    let normals = vec![Vector3d::z(); locations.len()];

    Ok(vec![
        DataPoints::Value(ValuePoints::new("contacts", locations.clone(), values)?),
        DataPoints::Vector(VectorPoints::new("orientations", locations, normals)?),
    ])
}

/// Flat-lying layers cut by planar faults
#[derive(Debug, Clone)]
pub struct LayeredModel {
    bbox: BoundingBox,
    frame: ModelFrame,
    column: StratigraphicColumn,
    unit_names: Vec<String>,
    bases: Vec<f64>,
    stratigraphy: PlanarFeature,
    faults: Vec<PlanarFault>,
}

impl LayeredModel {
    pub fn builder(bbox: BoundingBox) -> LayeredModelBuilder {
        LayeredModelBuilder {
            bbox,
            scale_factor: 1.0,
            group: "supergroup_0".to_string(),
            units: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// The feature describing the layering
    pub fn stratigraphy(&self) -> &PlanarFeature {
        &self.stratigraphy
    }

    pub fn fault(&self, name: &str) -> Option<&PlanarFault> {
        self.faults.iter().find(|f| f.name == name)
    }

    pub fn frame(&self) -> ModelFrame {
        self.frame
    }

    fn unit_id_at(&self, height: f64) -> f64 {
        let top = self.column.units().last().and_then(|(_, u)| u.max).unwrap_or(0.0);
        if height < 0.0 || height > top {
            return f64::NAN;
        }
        self.bases
            .iter()
            .rposition(|&base| height >= base)
            .map_or(f64::NAN, |i| i as f64)
    }
}

impl GeologicalModel for LayeredModel {
    fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    fn stratigraphic_column(&self) -> &StratigraphicColumn {
        &self.column
    }

    fn faults(&self) -> Vec<&dyn FaultFeature> {
        self.faults.iter().map(|f| f as &dyn FaultFeature).collect()
    }

    fn get_block_model(&self) -> Result<(StructuredGrid, Vec<i64>)> {
        let grid = self.bbox.grid();
        let ids = grid
            .points()
            .iter()
            .map(|p| self.unit_id_at(p.z - self.bbox.origin().z))
            .collect();
        let codes = (0..self.unit_names.len() as i64).collect();
        Ok((grid.with_scalars(ScalarArray::new("model", ids))?, codes))
    }

    fn get_stratigraphic_surfaces(&self) -> Result<Vec<Surface>> {
        let surfaces = self.stratigraphy.surfaces(Some(&self.bases))?;
        // surfaces come back in base order but boundaries above the box are dropped
        Ok(surfaces
            .into_iter()
            .filter_map(|s| {
                let value = s.value?;
                let i = self.bases.iter().position(|&b| b == value)?;
                Some(Surface::new(self.unit_names[i].clone(), s.value, s.mesh))
            })
            .collect())
    }

    fn get_fault_surfaces(&self) -> Result<Vec<Surface>> {
        let mut surfaces = Vec::with_capacity(self.faults.len());
        for fault in &self.faults {
            for s in fault.surfaces(Some(&[0.0][..]))? {
                surfaces.push(Surface::new(fault.name.clone(), s.value, s.mesh));
            }
        }
        Ok(surfaces)
    }

    fn scale(&self, points: &[Point3d]) -> Vec<Point3d> {
        points.iter().map(|p| self.frame.to_local(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> LayeredModel {
        let bbox = BoundingBox::new(
            Point3d::new(100.0, 200.0, 0.0),
            Point3d::new(200.0, 300.0, 50.0),
            [5, 5, 6],
        )
        .unwrap();
        LayeredModel::builder(bbox)
            .scale_factor(10.0)
            .unit("basement", 10.0, "#808080")
            .unit("sandstone", 20.0, [1.0, 0.9, 0.7])
            .unit("shale", 20.0, "tab:green")
            .fault("f1", Point3d::new(150.0, 250.0, 25.0), Vector3d::x(), Vector3d::z(), 5.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_frame_round_trip() {
        let frame = model().frame();
        let p = Point3d::new(150.0, 210.0, 30.0);
        let local = frame.to_local(&p);
        assert_relative_eq!(local, Point3d::new(5.0, 1.0, 3.0));
        assert_relative_eq!(frame.to_world(&local), p);
    }

    #[test]
    fn test_plane_section_is_box_slice() {
        let bbox = BoundingBox::new(Point3d::origin(), Point3d::new(1.0, 1.0, 1.0), [2, 2, 2]).unwrap();
        let mesh = plane_section(&bbox, &Vector3d::z(), 0.5).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert!(mesh.vertices.iter().all(|v| (v.z - 0.5).abs() < 1e-12));

        // diagonal cut through a corner region gives a triangle
        let corner = plane_section(&bbox, &Vector3d::new(1.0, 1.0, 1.0), 0.5).unwrap();
        assert_eq!(corner.vertex_count(), 3);

        assert!(plane_section(&bbox, &Vector3d::z(), 2.0).is_none());
    }

    #[test]
    fn test_column_and_surfaces() {
        let model = model();
        let units: Vec<(&str, i64)> = model
            .stratigraphic_column()
            .units()
            .map(|(n, u)| (n, u.id))
            .collect();
        assert_eq!(units, vec![("basement", 0), ("sandstone", 1), ("shale", 2)]);
        assert!(model.stratigraphic_column().group(FAULT_GROUP).is_some());

        let surfaces = model.get_stratigraphic_surfaces().unwrap();
        let names: Vec<&str> = surfaces.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["basement", "sandstone", "shale"]);
        assert_eq!(model.get_fault_surfaces().unwrap().len(), 1);
    }

    #[test]
    fn test_block_model_ids() {
        let (grid, codes) = model().get_block_model().unwrap();
        assert_eq!(codes, vec![0, 1, 2]);
        let ids = &grid.scalars.as_ref().unwrap().values;
        // z levels are 0, 10, 20, 30, 40, 50 with 25 points per level
        assert_eq!(ids[0], 0.0);
        assert_eq!(ids[25], 1.0);
        assert_eq!(ids[50], 1.0);
        assert_eq!(ids[75], 2.0);
        assert_eq!(ids[125], 2.0);
    }

    #[test]
    fn test_displacement_in_model_frame() {
        let model = model();
        let fault = model.fault("f1").unwrap();
        let world = vec![
            Point3d::new(120.0, 250.0, 25.0),
            Point3d::new(150.0, 250.0, 25.0),
            Point3d::new(500.0, 250.0, 25.0),
        ];
        let values = fault
            .displacement_feature()
            .evaluate_value(&model.scale(&world));
        assert_eq!(values[0], 0.0);
        assert_relative_eq!(values[1], 5.0);
        assert!(values[2].is_nan());
    }

    #[test]
    fn test_invalid_models() {
        let bbox = BoundingBox::new(Point3d::origin(), Point3d::new(1.0, 1.0, 1.0), [2, 2, 2]).unwrap();
        assert!(LayeredModel::builder(bbox.clone()).build().is_err());
        assert!(LayeredModel::builder(bbox.clone()).unit("a", 0.0, "red").build().is_err());
        assert!(LayeredModel::builder(bbox)
            .unit("a", 1.0, "red")
            .fault("f", Point3d::origin(), Vector3d::zeros(), Vector3d::z(), 1.0)
            .build()
            .is_err());
    }
}
