//! Integration tests for loopviz-core
//!
//! These tests use the synthetic layered model through the modelling-library
//! traits, the way a viewer sees it.

use approx::assert_relative_eq;
use loopviz_core::synthetic::LayeredModel;
use loopviz_core::*;

/// Two 250 m units under a 1 km square, one east-dipping fault
fn create_test_model() -> Box<dyn GeologicalModel> {
    let bbox = BoundingBox::new(
        Point3d::new(0.0, 0.0, -500.0),
        Point3d::new(1000.0, 1000.0, 0.0),
        [11, 11, 6],
    )
    .unwrap();
    let model = LayeredModel::builder(bbox)
        .scale_factor(1000.0)
        .group("cover")
        .unit("granite", 250.0, "pink")
        .unit("marl", 250.0, [0.0, 0.5, 1.0])
        .fault(
            "main_fault",
            Point3d::new(500.0, 500.0, -250.0),
            Vector3d::new(1.0, 0.0, 0.5),
            Vector3d::new(-0.5, 0.0, 1.0),
            40.0,
        )
        .build()
        .unwrap();
    Box::new(model)
}

#[test]
fn test_column_from_json() {
    let column: StratigraphicColumn = serde_json::from_str(
        r##"{
            "upper": {
                "sandstone": {"id": 1, "colour": "#ffcc00", "min": 0.0, "max": 10.0},
                "shale": {"id": 2, "colour": [0.2, 0.2, 0.2]}
            },
            "lower": {"basement": {"id": 0, "colour": "grey"}},
            "faults": {"f1": {"id": 0, "colour": "black"}}
        }"##,
    )
    .unwrap();

    let units: Vec<&str> = column.units().map(|(name, _)| name).collect();
    assert_eq!(units, vec!["sandstone", "shale", "basement"]);
    assert_eq!(column.unit("shale").unwrap().colour, ColourValue::Rgb([0.2, 0.2, 0.2]));
    assert!(column.unit("f1").is_none());
    assert_eq!(column.group(FAULT_GROUP).unwrap().len(), 1);

    // order survives a round trip
    let json = serde_json::to_string(&column).unwrap();
    assert!(json.find("upper").unwrap() < json.find("lower").unwrap());
}

#[test]
fn test_column_colours_convert() {
    let model = create_test_model();
    let converter = HexColourConverter;
    let colours: Vec<String> = model
        .stratigraphic_column()
        .units()
        .map(|(_, unit)| converter.to_hex(&unit.colour).unwrap())
        .collect();
    assert_eq!(colours, vec!["#ffc0cb", "#0080ff"]);
    assert!(converter.to_hex(&ColourValue::Rgb([255.0, 0.0, 0.0])).is_err());
}

#[test]
fn test_model_surfaces() {
    let model = create_test_model();

    let strati = model.get_stratigraphic_surfaces().unwrap();
    let names: Vec<&str> = strati.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["granite", "marl"]);
    for vertex in &strati[1].mesh.vertices {
        assert_relative_eq!(vertex.z, -250.0, epsilon = 1e-9);
    }

    let faults = model.get_fault_surfaces().unwrap();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].name, "main_fault");
    assert!(faults[0].mesh.face_count() >= 2);
    for normal in faults[0].mesh.face_normals() {
        assert_relative_eq!(normal.y, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_block_model_covers_box() {
    let model = create_test_model();
    let (grid, codes) = model.get_block_model().unwrap();
    assert_eq!(codes, vec![0, 1]);
    assert_eq!(grid.n_points(), 11 * 11 * 6);

    let (lo, hi) = grid.bounds().unwrap();
    assert_relative_eq!(lo, Point3d::new(0.0, 0.0, -500.0));
    assert_relative_eq!(hi, Point3d::new(1000.0, 1000.0, 0.0));

    let ids = &grid.scalars.as_ref().unwrap().values;
    assert!(ids.iter().all(|id| *id == 0.0 || *id == 1.0));
}

#[test]
fn test_fault_fields() {
    let model = create_test_model();
    let faults = model.faults();
    let fault = faults[0];
    assert_eq!(fault.name(), "main_fault");

    let centre = model.scale(&[Point3d::new(500.0, 500.0, -250.0)]);
    let displacement = fault.displacement_feature().evaluate_value(&centre);
    assert_relative_eq!(displacement[0], 40.0, epsilon = 1e-9);

    let outside = model.scale(&[Point3d::new(5000.0, 500.0, -250.0)]);
    assert!(fault.displacement_feature().evaluate_value(&outside)[0].is_nan());

    let volume = fault
        .displacement_feature()
        .scalar_field()
        .unwrap()
        .threshold(1.0)
        .unwrap();
    let values = &volume.scalars.as_ref().unwrap().values;
    assert!(values.iter().any(|v| v.is_nan()));
    assert!(values.iter().filter(|v| !v.is_nan()).all(|v| *v >= 1.0));

    let slip = fault.slip_feature().vector_field().unwrap();
    assert_eq!(slip.locations.len(), 11 * 11 * 6);
}

#[test]
fn test_surface_values() {
    let model = create_test_model();
    let surfaces = model.get_stratigraphic_surfaces().unwrap();
    assert_eq!(surfaces[0].value, Some(0.0));
    assert_eq!(surfaces[1].value, Some(250.0));
}
