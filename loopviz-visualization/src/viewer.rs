//! Model viewer
//!
//! [`ModelView`] turns features, faults and whole models into geometry and
//! hands it to a [`Renderer`], tracking every added object by name.

use std::sync::Arc;

use crate::colormap::{stratigraphic_colours, StratigraphicColours};
use crate::options::{Colormap, RenderOptions, ViewerConfig};
use crate::registry::SceneRegistry;
use crate::renderer::Renderer;
use loopviz_core::{
    BoundingBox, ColourConverter, DataPoints, Error, FaultFeature, GeologicalFeature, GeologicalModel,
    Geometry, GlyphKind, HexColourConverter, Point3d, Result, ScalarArray, ValuePoints, VectorPoints,
};
use tracing::{debug, warn};

/// Options for [`ModelView::plot_surface`]
#[derive(Default)]
pub struct SurfacePlot<'a> {
    /// Isovalues; the feature's defaults when `None`
    pub values: Option<Vec<f64>>,
    /// Colour the surfaces by this feature's value instead of a solid colour
    pub paint_with: Option<&'a dyn GeologicalFeature>,
    pub colour: Option<String>,
    pub cmap: Option<Colormap>,
    pub opacity: Option<f64>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub name: Option<String>,
    pub render: RenderOptions,
}

/// Options for [`ModelView::plot_scalar_field`]
#[derive(Debug, Clone, Default)]
pub struct ScalarFieldPlot {
    pub cmap: Option<Colormap>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub opacity: Option<f64>,
    pub name: Option<String>,
    pub render: RenderOptions,
}

/// Options for [`ModelView::plot_block_model`]
#[derive(Debug, Clone, Default)]
pub struct BlockModelPlot {
    /// Defaults to the stratigraphic colour map of the model
    pub cmap: Option<Colormap>,
    pub name: Option<String>,
    pub render: RenderOptions,
}

/// Options for [`ModelView::plot_fault_displacements`]
#[derive(Default)]
pub struct FaultDisplacementPlot<'a> {
    /// Defaults to every fault of the model
    pub faults: Option<Vec<&'a dyn FaultFeature>>,
    /// Defaults to the model's bounding box
    pub bounding_box: Option<BoundingBox>,
    pub cmap: Option<Colormap>,
    pub name: Option<String>,
    pub render: RenderOptions,
}

/// Options for [`ModelView::plot_model_surfaces`]
pub struct ModelSurfacesPlot<'a> {
    pub strati: bool,
    pub faults: bool,
    pub cmap: Option<Colormap>,
    pub fault_colour: Option<String>,
    pub paint_with: Option<&'a dyn GeologicalFeature>,
    pub opacity: Option<f64>,
    pub render: RenderOptions,
}

impl Default for ModelSurfacesPlot<'_> {
    fn default() -> Self {
        Self {
            strati: true,
            faults: true,
            cmap: None,
            fault_colour: None,
            paint_with: None,
            opacity: None,
            render: RenderOptions::default(),
        }
    }
}

/// Options for [`ModelView::plot_vector_field`]
#[derive(Debug, Clone, Default)]
pub struct VectorFieldPlot {
    pub scale: Option<f64>,
    pub name: Option<String>,
    pub render: RenderOptions,
}

/// Options for [`ModelView::plot_data`]
#[derive(Debug, Clone)]
pub struct DataPlot {
    pub value: bool,
    pub vector: bool,
    pub scale: Option<f64>,
    pub glyph: Option<GlyphKind>,
    pub render: RenderOptions,
}

impl Default for DataPlot {
    fn default() -> Self {
        Self {
            value: true,
            vector: true,
            scale: None,
            glyph: None,
            render: RenderOptions::default(),
        }
    }
}

/// Options for [`ModelView::plot_fault`]
#[derive(Debug, Clone)]
pub struct FaultPlot {
    pub surface: bool,
    pub slip_vector: bool,
    /// Scale slip vectors by the displacement at their location
    pub displacement_scale_vector: bool,
    pub fault_volume: bool,
    pub vector_scale: Option<f64>,
    pub render: RenderOptions,
}

impl Default for FaultPlot {
    fn default() -> Self {
        Self {
            surface: true,
            slip_vector: true,
            displacement_scale_vector: true,
            fault_volume: true,
            vector_scale: None,
            render: RenderOptions::default(),
        }
    }
}

/// A scene of geological objects drawn by a renderer
pub struct ModelView<R: Renderer> {
    renderer: R,
    model: Option<Arc<dyn GeologicalModel>>,
    registry: SceneRegistry,
    config: ViewerConfig,
    converter: Option<Box<dyn ColourConverter>>,
}

impl<R: Renderer> ModelView<R> {
    /// Create a viewer without a default model
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, ViewerConfig::default())
    }

    pub fn with_config(renderer: R, config: ViewerConfig) -> Self {
        Self {
            renderer,
            model: None,
            registry: SceneRegistry::new(),
            config,
            converter: Some(Box::new(HexColourConverter)),
        }
    }

    /// Create a viewer whose plot methods default to `model`
    pub fn with_model(renderer: R, model: Arc<dyn GeologicalModel>) -> Self {
        let mut view = Self::new(renderer);
        view.model = Some(model);
        view
    }

    pub fn set_model(&mut self, model: Option<Arc<dyn GeologicalModel>>) {
        self.model = model;
    }

    pub fn model(&self) -> Option<&dyn GeologicalModel> {
        self.model.as_deref()
    }

    /// Replace the colour converter; `None` makes stratigraphy use the fallback palette
    pub fn set_colour_converter(&mut self, converter: Option<Box<dyn ColourConverter>>) {
        self.converter = converter;
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn objects(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Add geometry under `name`, or under a unique default name when `None`.
    ///
    /// An explicit name is used as given when it is free. Returns the name the
    /// object was registered under.
    pub fn add_mesh(
        &mut self,
        geometry: impl Into<Geometry>,
        options: &RenderOptions,
        name: Option<&str>,
    ) -> Result<String> {
        let base = self.config.default_name.clone();
        self.add_with_base(geometry.into(), options, name, &base)
    }

    fn add_with_base(
        &mut self,
        geometry: Geometry,
        options: &RenderOptions,
        name: Option<&str>,
        default_base: &str,
    ) -> Result<String> {
        options.validate()?;
        let name = match name {
            Some(name) if !self.registry.contains(name) => name.to_string(),
            Some(name) => self.registry.unique_name(name),
            None => self.registry.unique_name(default_base),
        };
        let mut options = options.clone();
        options.show_scalar_bar.get_or_insert(self.config.show_scalar_bar);
        let actor = self.renderer.add_mesh(geometry, &options, &name)?;
        debug!("Registered '{}' as {:?}", name, actor);
        Ok(self.registry.register_exact(&name, actor))
    }

    fn pick_model<'m>(
        explicit: Option<&'m dyn GeologicalModel>,
        default: Option<&'m dyn GeologicalModel>,
    ) -> Result<&'m dyn GeologicalModel> {
        explicit.or(default).ok_or_else(Error::no_model)
    }

    /// Map real-world points into the frame of the viewer's model, if any
    fn model_frame(&self, points: &[Point3d]) -> Vec<Point3d> {
        match &self.model {
            Some(model) => model.scale(points),
            None => points.to_vec(),
        }
    }

    /// Unit colours of `model`'s stratigraphic column
    pub fn stratigraphic_colours(&self, model: &dyn GeologicalModel) -> StratigraphicColours {
        stratigraphic_colours(
            model.stratigraphic_column(),
            self.converter.as_deref(),
            &self.config.fallback_palette,
        )
    }

    /// Add the isosurfaces of a feature. No surfaces is not an error.
    pub fn plot_surface(&mut self, feature: &dyn GeologicalFeature, plot: SurfacePlot<'_>) -> Result<Vec<String>> {
        let surfaces = feature.surfaces(plot.values.as_deref())?;
        if surfaces.is_empty() {
            warn!("No surfaces found for feature '{}', skipping", feature.name());
            return Ok(Vec::new());
        }

        let base = format!("{}_surfaces", feature.name());
        let mut options = plot.render.clone();
        options.opacity = plot.opacity.or(options.opacity);
        options.colormap = plot.cmap.clone().or(options.colormap);
        match plot.paint_with {
            Some(paint) => {
                options.colour = None;
                options.clim = Some([plot.vmin.unwrap_or(paint.min()), plot.vmax.unwrap_or(paint.max())]);
            }
            None => {
                let colour = plot.colour.clone().unwrap_or_else(|| self.config.surface_colour.clone());
                options.colour = Some(colour);
            }
        }

        let mut names = Vec::with_capacity(surfaces.len());
        for surface in surfaces {
            let scalars = plot
                .paint_with
                .map(|paint| paint.evaluate_value(&self.model_frame(&surface.mesh.vertices)));
            let mut geometry = Geometry::Surface(surface.mesh);
            if let Some(values) = scalars {
                geometry.set_scalars(ScalarArray::new("values", values))?;
            }
            names.push(self.add_with_base(geometry, &options, plot.name.as_deref(), &base)?);
        }
        Ok(names)
    }

    /// Add the feature's scalar field as a volume
    pub fn plot_scalar_field(&mut self, feature: &dyn GeologicalFeature, plot: ScalarFieldPlot) -> Result<String> {
        let volume = feature.scalar_field()?;

        let mut options = plot.render.clone();
        options.opacity = plot.opacity.or(options.opacity);
        options.colormap = Some(
            plot.cmap
                .unwrap_or_else(|| Colormap::named(self.config.scalar_field_cmap.clone())),
        );
        if plot.vmin.is_some() || plot.vmax.is_some() {
            let (lo, hi) = volume
                .scalars
                .as_ref()
                .and_then(|s| s.range())
                .unwrap_or((feature.min(), feature.max()));
            options.clim = Some([plot.vmin.unwrap_or(lo), plot.vmax.unwrap_or(hi)]);
        }

        let base = format!("{}_scalar_field", feature.name());
        self.add_with_base(volume.into(), &options, plot.name.as_deref(), &base)
    }

    /// Add the model's block model coloured by stratigraphic unit
    pub fn plot_block_model(&mut self, plot: BlockModelPlot, model: Option<&dyn GeologicalModel>) -> Result<String> {
        let shared = self.model.clone();
        let model = Self::pick_model(model, shared.as_deref())?;

        let (block, codes) = model.get_block_model()?;
        debug!("Block model has {} unit codes", codes.len());

        let mut options = plot.render.clone();
        match plot.cmap {
            Some(cmap) => options.colormap = Some(cmap),
            None => {
                let colours = self.stratigraphic_colours(model);
                options.colormap = Some(colours.colormap());
                options.clim = options.clim.or(colours.clim());
            }
        }
        self.add_with_base(block.into(), &options, plot.name.as_deref(), "block_model")
    }

    /// Add the summed displacement of a set of faults on a regular grid
    pub fn plot_fault_displacements(
        &mut self,
        plot: FaultDisplacementPlot<'_>,
        model: Option<&dyn GeologicalModel>,
    ) -> Result<String> {
        let shared = self.model.clone();
        let model = model.or(shared.as_deref());

        let faults = match plot.faults {
            Some(faults) => faults,
            None => model.ok_or_else(Error::no_model)?.faults(),
        };
        let (grid, points) = match plot.bounding_box {
            Some(bbox) => {
                let grid = bbox.grid();
                let points = grid.points();
                (grid, points)
            }
            None => {
                let model = model.ok_or_else(Error::no_model)?;
                let grid = model.bounding_box().grid();
                let points = model.scale(&grid.points());
                (grid, points)
            }
        };

        let mut displacement = vec![0.0; points.len()];
        for fault in &faults {
            let values = fault.displacement_feature().evaluate_value(&points);
            for (total, value) in displacement.iter_mut().zip(values) {
                if !value.is_nan() {
                    *total += value;
                }
            }
        }
        let grid = grid.with_scalars(ScalarArray::new("displacement", displacement))?;

        let mut options = plot.render.clone();
        options.colormap = Some(
            plot.cmap
                .unwrap_or_else(|| Colormap::named(self.config.displacement_cmap.clone())),
        );
        self.add_with_base(grid.into(), &options, plot.name.as_deref(), "fault_displacements")
    }

    /// Add the model's stratigraphic and fault surfaces, named after their unit or fault
    pub fn plot_model_surfaces(
        &mut self,
        plot: ModelSurfacesPlot<'_>,
        model: Option<&dyn GeologicalModel>,
    ) -> Result<Vec<String>> {
        let shared = self.model.clone();
        let model = Self::pick_model(model, shared.as_deref())?;
        let mut names = Vec::new();

        if plot.strati {
            let surfaces = model.get_stratigraphic_surfaces()?;
            if surfaces.is_empty() {
                warn!("Model has no stratigraphic surfaces, skipping");
            }
            let colours = self.stratigraphic_colours(model);
            let column = model.stratigraphic_column();
            let paint_clim = plot.paint_with.map(|p| [p.min(), p.max()]);

            for surface in surfaces {
                let mut options = plot.render.clone();
                options.opacity = plot.opacity.or(options.opacity);
                let scalars = plot
                    .paint_with
                    .map(|paint| paint.evaluate_value(&model.scale(&surface.mesh.vertices)));
                let mut geometry = Geometry::Surface(surface.mesh);
                match scalars {
                    Some(values) => {
                        geometry.set_scalars(ScalarArray::new("values", values))?;
                        options.colormap = plot.cmap.clone().or(options.colormap);
                        options.clim = options.clim.or(paint_clim);
                    }
                    None => {
                        let colour = column
                            .unit(&surface.name)
                            .and_then(|unit| colours.colour_for(unit.id))
                            .map(str::to_string)
                            .unwrap_or_else(|| self.config.surface_colour.clone());
                        options.colour = Some(colour);
                    }
                }
                names.push(self.add_with_base(geometry, &options, Some(surface.name.as_str()), "stratigraphy")?);
            }
        }

        if plot.faults {
            let fault_colour = plot
                .fault_colour
                .clone()
                .unwrap_or_else(|| self.config.fault_colour.clone());
            for surface in model.get_fault_surfaces()? {
                let mut options = plot.render.clone();
                options.opacity = plot.opacity.or(options.opacity);
                options.colour = Some(fault_colour.clone());
                names.push(self.add_with_base(surface.mesh.into(), &options, Some(surface.name.as_str()), "fault")?);
            }
        }
        Ok(names)
    }

    /// Add the gradient of a feature as arrows
    pub fn plot_vector_field(&mut self, feature: &dyn GeologicalFeature, plot: VectorFieldPlot) -> Result<String> {
        let field = feature.vector_field()?;
        let scale = plot.scale.unwrap_or(self.config.vector_field_scale);
        let glyphs = field.to_glyphs(GlyphKind::Arrow, scale, None)?;
        let base = format!("{}_vector_field", feature.name());
        self.add_with_base(glyphs.into(), &plot.render, plot.name.as_deref(), &base)
    }

    /// Add the observations a feature was built from
    pub fn plot_data(&mut self, feature: &dyn GeologicalFeature, plot: DataPlot) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for data in feature.get_data() {
            match data {
                DataPoints::Value(points) if plot.value => {
                    names.push(self.add_value_points(feature.name(), &points, &plot)?);
                }
                DataPoints::Vector(points) if plot.vector => {
                    names.push(self.add_vector_points(feature.name(), &points, &plot)?);
                }
                _ => {}
            }
        }
        Ok(names)
    }

    fn add_value_points(&mut self, feature: &str, points: &ValuePoints, plot: &DataPlot) -> Result<String> {
        let base = format!("{}_{}", feature, points.name);
        self.add_with_base(points.to_point_set().into(), &plot.render, None, &base)
    }

    fn add_vector_points(&mut self, feature: &str, points: &VectorPoints, plot: &DataPlot) -> Result<String> {
        let glyph = plot.glyph.unwrap_or(self.config.data_glyph);
        let scale = plot.scale.unwrap_or(self.config.data_scale);
        let glyphs = points.to_glyphs(glyph, scale, None)?;
        let base = format!("{}_{}", feature, points.name);
        self.add_with_base(glyphs.into(), &plot.render, None, &base)
    }

    /// Add a fault's surface, slip vectors and displacement volume
    pub fn plot_fault(&mut self, fault: &dyn FaultFeature, plot: FaultPlot) -> Result<Vec<String>> {
        let mut names = Vec::new();

        if plot.surface {
            match fault.surfaces(Some(&[0.0][..]))?.into_iter().next() {
                Some(surface) => {
                    let base = format!("{}_surface", fault.name());
                    names.push(self.add_with_base(surface.mesh.into(), &plot.render, None, &base)?);
                }
                None => warn!("No surface found for fault '{}', skipping", fault.name()),
            }
        }

        if plot.slip_vector {
            let field = fault.slip_feature().vector_field()?;
            let scale_values = plot.displacement_scale_vector.then(|| {
                fault
                    .displacement_feature()
                    .evaluate_value(&self.model_frame(&field.locations))
            });
            let scale = plot.vector_scale.unwrap_or(self.config.slip_vector_scale);
            let glyphs = field.to_glyphs(GlyphKind::Arrow, scale, scale_values.as_deref())?;
            let base = format!("{}_slip_vector", fault.name());
            names.push(self.add_with_base(glyphs.into(), &plot.render, None, &base)?);
        }

        if plot.fault_volume {
            let volume = fault.displacement_feature().scalar_field()?.threshold(0.0)?;
            let mut options = plot.render.clone();
            options.colormap = options
                .colormap
                .or_else(|| Some(Colormap::named(self.config.displacement_cmap.clone())));
            let base = format!("{}_volume", fault.name());
            names.push(self.add_with_base(volume.into(), &options, None, &base)?);
        }
        Ok(names)
    }

    /// Set the camera `[roll, azimuth, elevation]` in degrees
    pub fn rotate(&mut self, angles: [f64; 3]) {
        self.renderer.camera_mut().rotate(angles);
    }

    pub fn remove_scalar_bar(&mut self, title: Option<&str>) -> Result<()> {
        self.renderer.remove_scalar_bar(title)
    }

    /// Show the scene without blocking for interaction
    pub fn display(&mut self) -> Result<()> {
        self.renderer.show(false)
    }

    /// Set the visibility of a tracked object; returns false when no object has that name
    pub fn set_visibility(&mut self, name: &str, visible: bool) -> Result<bool> {
        match self.registry.get(name) {
            Some(object) => {
                self.renderer.set_actor_visibility(object.actor, visible)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a tracked object; returns false when no object has that name.
    ///
    /// The object stays registered when the renderer fails to remove it.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let Some(actor) = self.registry.get(name).map(|object| object.actor) else {
            return Ok(false);
        };
        self.renderer.remove_actor(actor)?;
        self.registry.remove(name);
        Ok(true)
    }

    /// Remove every tracked object.
    ///
    /// Stops at the first object the renderer fails to remove; that object
    /// and the ones after it stay registered.
    pub fn clear(&mut self) -> Result<()> {
        let names: Vec<String> = self.registry.names().map(str::to_string).collect();
        for name in names {
            self.remove(&name)?;
        }
        Ok(())
    }

    /// Request a redraw
    pub fn update(&mut self) {
        self.renderer.render();
    }
}
