//! Colour values and conversion to hex strings

use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A colour as stored in model metadata: a string or an RGB(A) tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColourValue {
    Text(String),
    Rgb([f64; 3]),
    Rgba([f64; 4]),
}

impl ColourValue {
    /// The string form, when the colour is already a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColourValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ColourValue {
    fn from(s: &str) -> Self {
        ColourValue::Text(s.to_string())
    }
}

impl From<[f64; 3]> for ColourValue {
    fn from(rgb: [f64; 3]) -> Self {
        ColourValue::Rgb(rgb)
    }
}

/// Converts colour values to `#rrggbb` strings
pub trait ColourConverter {
    fn to_hex(&self, colour: &ColourValue) -> Result<String>;
}

/// Converter understanding hex strings, common colour names and
/// RGB(A) tuples with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexColourConverter;

const NAMED_COLOURS: &[(&str, &str)] = &[
    ("b", "#0000ff"),
    ("g", "#008000"),
    ("r", "#ff0000"),
    ("c", "#00bfbf"),
    ("m", "#bf00bf"),
    ("y", "#bfbf00"),
    ("k", "#000000"),
    ("w", "#ffffff"),
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("cyan", "#00ffff"),
    ("magenta", "#ff00ff"),
    ("orange", "#ffa500"),
    ("purple", "#800080"),
    ("brown", "#a52a2a"),
    ("pink", "#ffc0cb"),
    ("grey", "#808080"),
    ("gray", "#808080"),
    ("tab:blue", "#1f77b4"),
    ("tab:orange", "#ff7f0e"),
    ("tab:green", "#2ca02c"),
    ("tab:red", "#d62728"),
    ("tab:purple", "#9467bd"),
    ("tab:brown", "#8c564b"),
    ("tab:pink", "#e377c2"),
    ("tab:gray", "#7f7f7f"),
    ("tab:olive", "#bcbd22"),
    ("tab:cyan", "#17becf"),
];

impl ColourConverter for HexColourConverter {
    fn to_hex(&self, colour: &ColourValue) -> Result<String> {
        match colour {
            ColourValue::Text(text) => text_to_hex(text),
            ColourValue::Rgb(rgb) => components_to_hex(rgb),
            // alpha is dropped
            ColourValue::Rgba(rgba) => components_to_hex(&rgba[..3]),
        }
    }
}

fn text_to_hex(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('#') {
        return parse_hex(trimmed).map(format_hex);
    }
    let lower = trimmed.to_lowercase();
    NAMED_COLOURS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, hex)| hex.to_string())
        .ok_or_else(|| Error::Colour(format!("unknown colour name '{}'", text)))
}

fn components_to_hex(components: &[f64]) -> Result<String> {
    let mut rgb = [0u8; 3];
    for (slot, &c) in rgb.iter_mut().zip(components) {
        if !(0.0..=1.0).contains(&c) {
            return Err(Error::Colour(format!(
                "RGB component {} outside [0, 1] in {:?}",
                c, components
            )));
        }
        *slot = (c * 255.0).round() as u8;
    }
    Ok(format_hex(rgb))
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into RGB bytes
pub fn parse_hex(hex: &str) -> Result<[u8; 3]> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| Error::Colour(format!("'{}' is not a hex colour", hex)))?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Colour(format!("'{}' is not a hex colour", hex)));
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|e| Error::Colour(e.to_string()));
    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(digits.chars()) {
                let v = channel(&c.to_string())?;
                *slot = v * 17;
            }
            Ok(rgb)
        }
        6 | 8 => Ok([
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ]),
        _ => Err(Error::Colour(format!("'{}' is not a hex colour", hex))),
    }
}

pub fn format_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// A random `#RRGGBB` colour
pub fn random_hex_colour<R: Rng + ?Sized>(rng: &mut R) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEF";
    let mut colour = String::with_capacity(7);
    colour.push('#');
    for _ in 0..6 {
        colour.push(DIGITS[rng.gen_range(0..DIGITS.len())] as char);
    }
    colour
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_strings() {
        let converter = HexColourConverter;
        assert_eq!(converter.to_hex(&"#FFF".into()).unwrap(), "#ffffff");
        assert_eq!(converter.to_hex(&"#1f77b4".into()).unwrap(), "#1f77b4");
        assert_eq!(converter.to_hex(&"Red".into()).unwrap(), "#ff0000");
        assert!(converter.to_hex(&"#12345".into()).is_err());
        assert!(converter.to_hex(&"not-a-colour".into()).is_err());
    }

    #[test]
    fn test_rgb_tuples() {
        let converter = HexColourConverter;
        assert_eq!(converter.to_hex(&[1.0, 0.5, 0.0].into()).unwrap(), "#ff8000");
        assert_eq!(
            converter.to_hex(&ColourValue::Rgba([0.0, 0.0, 1.0, 0.2])).unwrap(),
            "#0000ff"
        );
        assert!(converter.to_hex(&[255.0, 0.0, 0.0].into()).is_err());
    }

    #[test]
    fn test_untagged_deserialisation() {
        let text: ColourValue = serde_json::from_str("\"#abcdef\"").unwrap();
        assert_eq!(text.as_text(), Some("#abcdef"));
        let rgb: ColourValue = serde_json::from_str("[0.1, 0.2, 0.3]").unwrap();
        assert_eq!(rgb, ColourValue::Rgb([0.1, 0.2, 0.3]));
        let rgba: ColourValue = serde_json::from_str("[0.1, 0.2, 0.3, 1.0]").unwrap();
        assert_eq!(rgba, ColourValue::Rgba([0.1, 0.2, 0.3, 1.0]));
    }

    #[test]
    fn test_random_colour_is_valid_hex() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let colour = random_hex_colour(&mut rng);
            assert_eq!(colour.len(), 7);
            assert!(parse_hex(&colour).is_ok());
        }
    }
}
