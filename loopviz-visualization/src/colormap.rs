//! Categorical colour maps from a stratigraphic column

use crate::options::Colormap;
use loopviz_core::{random_hex_colour, ColourConverter, StratigraphicColumn, FAULT_GROUP};
use rand::Rng;
use tracing::{debug, warn};

/// Colours for the units of a stratigraphic column
#[derive(Debug, Clone, PartialEq)]
pub enum StratigraphicColours {
    /// One colour per unit, in column order
    Listed { ids: Vec<i64>, colours: Vec<String> },
    /// Named palette used when unit colours could not be resolved
    Fallback(String),
}

impl StratigraphicColours {
    pub fn colormap(&self) -> Colormap {
        match self {
            StratigraphicColours::Listed { colours, .. } => Colormap::Listed(colours.clone()),
            StratigraphicColours::Fallback(name) => Colormap::Named(name.clone()),
        }
    }

    /// Colour of the unit with `id`
    pub fn colour_for(&self, id: i64) -> Option<&str> {
        match self {
            StratigraphicColours::Listed { ids, colours } => ids
                .iter()
                .position(|&i| i == id)
                .map(|i| colours[i].as_str()),
            StratigraphicColours::Fallback(_) => None,
        }
    }

    /// Smallest and largest unit id
    pub fn clim(&self) -> Option<[f64; 2]> {
        match self {
            StratigraphicColours::Listed { ids, .. } => {
                let lo = ids.iter().min()?;
                let hi = ids.iter().max()?;
                Some([*lo as f64, *hi as f64])
            }
            StratigraphicColours::Fallback(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StratigraphicColours::Fallback(_))
    }
}

/// Build unit colours from `column`, skipping the fault group.
///
/// String colours are taken as they are. Other colours go through
/// `converter`; a unit whose colour fails to convert gets a random colour.
/// Without a converter the named `fallback_palette` is returned instead.
pub fn stratigraphic_colours_with_rng<R: Rng + ?Sized>(
    column: &StratigraphicColumn,
    converter: Option<&dyn ColourConverter>,
    fallback_palette: &str,
    rng: &mut R,
) -> StratigraphicColours {
    let Some(converter) = converter else {
        warn!(
            "No colour converter available, using the '{}' palette for stratigraphy",
            fallback_palette
        );
        return StratigraphicColours::Fallback(fallback_palette.to_string());
    };

    let mut ids = Vec::new();
    let mut colours = Vec::new();
    for (group, units) in column.groups() {
        if group == FAULT_GROUP {
            continue;
        }
        for (name, unit) in units {
            let colour = match unit.colour.as_text() {
                Some(text) => text.to_string(),
                None => converter.to_hex(&unit.colour).unwrap_or_else(|e| {
                    let substitute = random_hex_colour(rng);
                    warn!(
                        "Cannot convert colour {:?} of unit '{}' to hex ({}), using {}",
                        unit.colour, name, e, substitute
                    );
                    substitute
                }),
            };
            ids.push(unit.id);
            colours.push(colour);
        }
    }

    if colours.is_empty() {
        debug!("Stratigraphic column has no units, using the '{}' palette", fallback_palette);
        return StratigraphicColours::Fallback(fallback_palette.to_string());
    }
    StratigraphicColours::Listed { ids, colours }
}

/// [`stratigraphic_colours_with_rng`] using the thread-local generator
pub fn stratigraphic_colours(
    column: &StratigraphicColumn,
    converter: Option<&dyn ColourConverter>,
    fallback_palette: &str,
) -> StratigraphicColours {
    stratigraphic_colours_with_rng(column, converter, fallback_palette, &mut rand::thread_rng())
}
