//! Visualization for geological models
//!
//! This crate adapts geological model objects into renderable geometry:
//! - A scene registry giving every object a unique name
//! - Categorical colour maps from a stratigraphic column
//! - A model view with plot methods for features, faults and models
//! - An object menu toggling visibility from UI state
//!
//! The rendering engine sits behind the [`Renderer`] trait; [`MemoryRenderer`]
//! keeps the scene in memory for headless use.

pub mod registry;
pub mod options;
pub mod renderer;
pub mod camera;
pub mod colormap;
pub mod viewer;
pub mod ui;

pub use registry::*;
pub use options::*;
pub use renderer::*;
pub use camera::*;
pub use colormap::*;
pub use viewer::*;
pub use ui::*;

use loopviz_core::{GeologicalModel, Result};
use std::sync::Arc;

/// Plot a model's surfaces and block model into `renderer` and show the scene
pub fn show_model<R: Renderer>(renderer: R, model: Arc<dyn GeologicalModel>) -> Result<ModelView<R>> {
    let mut view = ModelView::with_model(renderer, model);
    view.plot_model_surfaces(ModelSurfacesPlot::default(), None)?;
    view.plot_block_model(
        BlockModelPlot {
            render: RenderOptions::default().with_opacity(0.3),
            ..Default::default()
        },
        None,
    )?;
    view.display()?;
    Ok(view)
}
