use egui::Color32;

use crate::error::{EditorError, EditorResult};

/// Named colors, with their X11 color database values.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("gray", [190, 190, 190]),
    ("grey", [190, 190, 190]),
    ("orange", [255, 165, 0]),
    ("purple", [160, 32, 240]),
    ("brown", [165, 42, 42]),
    ("pink", [255, 192, 203]),
];

/// Parse a color as written in project files.
///
/// Accepts `#rgb`, `#rrggbb`, the 12-digit `#rrrrggggbbbb` form some color
/// choosers emit, and a handful of common color names.
pub fn parse_color(text: &str) -> EditorResult<Color32> {
    let trimmed = text.trim();
    let invalid = || EditorError::InvalidColor(text.to_string());

    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let digits = match hex.len() {
            3 => 1,
            6 => 2,
            12 => 4,
            _ => return Err(invalid()),
        };
        let mut channels = [0u8; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            let part = &hex[i * digits..(i + 1) * digits];
            let value = u32::from_str_radix(part, 16).map_err(|_| invalid())?;
            *channel = match digits {
                1 => (value * 17) as u8,
                2 => value as u8,
                _ => (value >> 8) as u8,
            };
        }
        return Ok(Color32::from_rgb(channels[0], channels[1], channels[2]));
    }

    let lower = trimmed.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, [r, g, b])| Color32::from_rgb(*r, *g, *b))
        .ok_or_else(invalid)
}

/// Format a color as lower-case `#rrggbb` (alpha is dropped).
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#ff0000").unwrap(), Color32::RED);
        assert_eq!(parse_color("#FFF").unwrap(), Color32::WHITE);
        assert_eq!(
            parse_color("#ffff80800000").unwrap(),
            Color32::from_rgb(255, 128, 0)
        );
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse_color("White").unwrap(), Color32::WHITE);
        assert_eq!(parse_color(" black ").unwrap(), Color32::BLACK);
    }

    #[test]
    fn test_named_colors_use_x11_values() {
        assert_eq!(to_hex(parse_color("green").unwrap()), "#00ff00");
        assert_eq!(to_hex(parse_color("Gray").unwrap()), "#bebebe");
        assert_eq!(to_hex(parse_color("grey").unwrap()), "#bebebe");
        assert_eq!(to_hex(parse_color("purple").unwrap()), "#a020f0");
        assert_eq!(to_hex(parse_color("orange").unwrap()), "#ffa500");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_color("").is_err());
        assert!(parse_color("#12").is_err());
        assert!(parse_color("#gggggg").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(to_hex(Color32::from_rgb(1, 171, 255)), "#01abff");
    }
}
