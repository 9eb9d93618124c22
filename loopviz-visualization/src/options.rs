//! Rendering options and viewer configuration

use loopviz_core::{Error, GlyphKind, Point3d, Result, Vector3d};
use serde::{Deserialize, Serialize};

/// Colour map applied to scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colormap {
    /// A colour map the renderer knows by name, e.g. `viridis`
    Named(String),
    /// One hex colour per category, in category order
    Listed(Vec<String>),
}

impl Colormap {
    pub fn named(name: impl Into<String>) -> Self {
        Colormap::Named(name.into())
    }
}

/// Clip the added mesh against a widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Clipping {
    /// Keep the side of the plane the normal points away from
    Plane {
        origin: Option<Point3d>,
        normal: Vector3d,
        #[serde(default)]
        invert: bool,
    },
    /// Keep what lies inside the box
    Box {
        min: Point3d,
        max: Point3d,
        #[serde(default)]
        invert: bool,
    },
}

/// Options forwarded to the renderer with each mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Solid colour; ignored by renderers when the geometry carries scalars
    pub colour: Option<String>,
    pub colormap: Option<Colormap>,
    /// 0 is fully transparent, 1 opaque
    pub opacity: Option<f64>,
    /// Scalar range mapped onto the colour map
    pub clim: Option<[f64; 2]>,
    /// Unset falls back to the viewer's configured default
    pub show_scalar_bar: Option<bool>,
    pub clipping: Option<Clipping>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            colour: None,
            colormap: None,
            opacity: None,
            clim: None,
            show_scalar_bar: None,
            clipping: None,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = Some(colour.into());
        self
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = Some(colormap);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_clim(mut self, min: f64, max: f64) -> Self {
        self.clim = Some([min, max]);
        self
    }

    pub fn with_scalar_bar(mut self, show: bool) -> Self {
        self.show_scalar_bar = Some(show);
        self
    }

    pub fn with_clipping(mut self, clipping: Clipping) -> Self {
        self.clipping = Some(clipping);
        self
    }

    /// Check that the numeric options are usable
    pub fn validate(&self) -> Result<()> {
        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(Error::InvalidArgument(format!(
                    "opacity must be within [0, 1], got {}",
                    opacity
                )));
            }
        }
        if let Some([lo, hi]) = self.clim {
            if !(lo.is_finite() && hi.is_finite()) || lo > hi {
                return Err(Error::InvalidArgument(format!(
                    "invalid colour limits [{}, {}]",
                    lo, hi
                )));
            }
        }
        if let Some(Clipping::Plane { normal, .. }) = &self.clipping {
            if normal.norm() == 0.0 {
                return Err(Error::InvalidArgument("clip plane normal is zero".to_string()));
            }
        }
        Ok(())
    }
}

/// Defaults the viewer falls back on when a plot call leaves them open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base name for objects added without one
    pub default_name: String,
    pub surface_colour: String,
    pub fault_colour: String,
    pub scalar_field_cmap: String,
    pub displacement_cmap: String,
    /// Named palette used for stratigraphy when colours cannot be converted
    pub fallback_palette: String,
    pub data_glyph: GlyphKind,
    pub data_scale: f64,
    pub vector_field_scale: f64,
    pub slip_vector_scale: f64,
    /// Whether scalar bars are shown for plots that do not say either way
    pub show_scalar_bar: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_name: "unnamed_object".to_string(),
            surface_colour: "red".to_string(),
            fault_colour: "black".to_string(),
            scalar_field_cmap: "viridis".to_string(),
            displacement_cmap: "rainbow".to_string(),
            fallback_palette: "tab20".to_string(),
            data_glyph: GlyphKind::Arrow,
            data_scale: 10.0,
            vector_field_scale: 1.0,
            slip_vector_scale: 200.0,
            show_scalar_bar: true,
        }
    }
}

impl ViewerConfig {
    /// Load a configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidData(format!("viewer config: {}", e)))
    }

    /// Base render options derived from the configuration
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default().with_scalar_bar(self.show_scalar_bar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(RenderOptions::new().with_opacity(0.5).validate().is_ok());
        assert!(RenderOptions::new().with_opacity(1.5).validate().is_err());
        assert!(RenderOptions::new().with_clim(1.0, 0.0).validate().is_err());
        assert!(RenderOptions::new().with_clim(f64::NAN, 0.0).validate().is_err());
        let clip = Clipping::Plane {
            origin: None,
            normal: Vector3d::zeros(),
            invert: false,
        };
        assert!(RenderOptions::new().with_clipping(clip).validate().is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = ViewerConfig::from_json(r#"{"fault_colour": "grey", "data_glyph": "disc"}"#).unwrap();
        assert_eq!(config.fault_colour, "grey");
        assert_eq!(config.data_glyph, GlyphKind::Disc);
        assert_eq!(config.scalar_field_cmap, "viridis");
        assert!(ViewerConfig::from_json("{").is_err());
    }

    #[test]
    fn test_scalar_bar_unset_by_default() {
        assert_eq!(RenderOptions::default().show_scalar_bar, None);
        let config = ViewerConfig::from_json(r#"{"show_scalar_bar": false}"#).unwrap();
        assert_eq!(config.render_options().show_scalar_bar, Some(false));
        let options: RenderOptions = serde_json::from_str(r#"{"opacity": 0.5}"#).unwrap();
        assert_eq!(options.show_scalar_bar, None);
    }

    #[test]
    fn test_colormap_untagged() {
        let named: Colormap = serde_json::from_str("\"rainbow\"").unwrap();
        assert_eq!(named, Colormap::named("rainbow"));
        let listed: Colormap = serde_json::from_str(r##"["#ff0000", "#00ff00"]"##).unwrap();
        assert_eq!(listed, Colormap::Listed(vec!["#ff0000".into(), "#00ff00".into()]));
    }
}
