//! Synthetic model demo
//!
//! Builds a layered model cut by faults, plots every kind of object into a
//! headless renderer and prints what ended up in the scene:
//! - Model surfaces coloured from the stratigraphic column
//! - Block model, scalar field and fault displacements
//! - Data points, vector field and fault slip vectors
//! - Visibility toggles driven through the object menu

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use loopviz_core::synthetic::LayeredModel;
use loopviz_core::{BoundingBox, GeologicalModel, Point3d, Vector3d};
use loopviz_visualization::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plot a synthetic layered model")]
struct Args {
    /// Number of stratigraphic units
    #[arg(long, default_value_t = 4)]
    units: usize,

    /// Number of faults, spread evenly along x
    #[arg(long, default_value_t = 2)]
    faults: usize,

    /// Viewer configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Objects to hide after plotting
    #[arg(long)]
    hide: Vec<String>,
}

const PALETTE: [&str; 6] = ["#8c564b", "#ff7f0e", "tab:olive", "tab:gray", "#1f77b4", "tab:purple"];

fn build_model(units: usize, faults: usize) -> anyhow::Result<LayeredModel> {
    let bbox = BoundingBox::new(
        Point3d::new(0.0, 0.0, -500.0),
        Point3d::new(1000.0, 1000.0, 0.0),
        [21, 21, 11],
    )?;
    let thickness = 500.0 / units.max(1) as f64;

    let mut builder = LayeredModel::builder(bbox).scale_factor(1000.0);
    for i in 0..units {
        builder = builder.unit(format!("unit_{}", i), thickness, PALETTE[i % PALETTE.len()]);
    }
    for i in 0..faults {
        let x = 1000.0 * (i + 1) as f64 / (faults + 1) as f64;
        builder = builder.fault(
            format!("fault_{}", i),
            Point3d::new(x, 500.0, -250.0),
            Vector3d::new(1.0, 0.2, 0.0),
            Vector3d::z(),
            50.0,
        );
    }
    Ok(builder.build()?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading viewer config {}", path.display()))?;
            ViewerConfig::from_json(&json)?
        }
        None => ViewerConfig::default(),
    };

    let model = Arc::new(build_model(args.units, args.faults)?);
    info!(
        "Built model with {} units and {} faults",
        args.units,
        model.faults().len()
    );

    let mut view = ModelView::with_config(MemoryRenderer::new(), config);
    view.set_model(Some(model.clone()));
    let base = view.config().render_options();

    view.plot_model_surfaces(
        ModelSurfacesPlot {
            render: base.clone(),
            ..Default::default()
        },
        None,
    )?;
    view.plot_block_model(
        BlockModelPlot {
            render: base.clone().with_opacity(0.3),
            ..Default::default()
        },
        None,
    )?;
    view.plot_scalar_field(model.stratigraphy(), ScalarFieldPlot::default())?;
    view.plot_vector_field(model.stratigraphy(), VectorFieldPlot::default())?;
    view.plot_data(model.stratigraphy(), DataPlot::default())?;
    view.plot_fault_displacements(FaultDisplacementPlot::default(), None)?;
    for fault in model.faults() {
        view.plot_fault(fault, FaultPlot::default())?;
    }
    if view.renderer().scalar_bars().iter().any(|title| title == "model") {
        view.remove_scalar_bar(Some("model"))?;
    }
    view.rotate([0.0, 30.0, 20.0]);

    let mut shell = ViewerShell::new(view);
    let hidden = shell.toggle_visibility(args.hide.iter().map(|name| (visibility_key(name), false)))?;
    info!("Hid {} of {} requested objects", hidden, args.hide.len());

    shell.view_mut().display()?;

    println!("Scene objects:");
    for entry in shell.menu().entries() {
        let object = shell
            .view()
            .objects()
            .get(&entry.name)
            .context("menu entry without a scene object")?;
        let actor = shell
            .view()
            .renderer()
            .actor(object.actor)
            .context("scene object without an actor")?;
        println!(
            "  {:<28} {:<8} {:>6} points  {}",
            entry.name,
            actor.geometry.kind(),
            actor.geometry.n_points(),
            if entry.visible { "shown" } else { "hidden" }
        );
    }
    let camera = shell.view().renderer().camera();
    println!(
        "Camera at {:?} looking at {:?}",
        camera.position(),
        camera.focal_point
    );
    Ok(())
}
