//! Color handling for KML output.
//!
//! KML encodes colors as `AABBGGRR` — alpha first, then the RGB channels in
//! reverse order relative to the usual `#RRGGBB` notation.

/// Base color applied when a category has no legend entry, or when no color
/// column is mapped at all.
pub const DEFAULT_BASE_COLOR: &str = "#008000";

/// Palette cycled through when assigning default colors to categories,
/// indexed by the category's position in the sorted category list.
pub const COLOR_POOL: [&str; 12] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FFA500", "#800080",
    "#00FFFF", "#FFC0CB", "#3CB371", "#FFD700", "#DDA0DD", "#8B4513",
];

/// Convert a `#RRGGBB` hex color plus an opacity percentage (0–100) into the
/// `AABBGGRR` encoding KML expects, rendered as 8 uppercase hex digits.
///
/// Malformed input (anything that is not exactly 6 hex digits after stripping
/// a leading `#`) is coerced to opaque white channels rather than failing, so
/// a bad legend entry degrades visibly instead of aborting an export.
pub fn hex_to_kml_color(hex_color: &str, opacity_pct: u8) -> String {
    let alpha = ((f64::from(opacity_pct) / 100.0) * 255.0).round() as u8;
    let stripped = hex_color.strip_prefix('#').unwrap_or(hex_color);

    if stripped.len() != 6 || !stripped.bytes().all(|b| b.is_ascii_hexdigit()) {
        return format!("{alpha:02X}FFFFFF");
    }

    let red = &stripped[0..2];
    let green = &stripped[2..4];
    let blue = &stripped[4..6];
    format!("{alpha:02X}{blue}{green}{red}").to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_reversed() {
        assert_eq!(hex_to_kml_color("#FF0000", 100), "FFFF0000");
        assert_eq!(hex_to_kml_color("#112233", 100), "FF332211");
    }

    #[test]
    fn opacity_scales_to_alpha_byte() {
        // 50% of 255 rounds to 128 = 0x80
        assert_eq!(hex_to_kml_color("#008000", 50), "80008000");
        assert_eq!(hex_to_kml_color("#008000", 0), "00008000");
    }

    #[test]
    fn leading_hash_is_optional() {
        assert_eq!(hex_to_kml_color("008000", 100), hex_to_kml_color("#008000", 100));
    }

    #[test]
    fn lowercase_input_is_uppercased() {
        assert_eq!(hex_to_kml_color("#ff00aa", 100), "FFAA00FF");
    }

    #[test]
    fn malformed_input_falls_back_to_white() {
        for bad in ["notacolor", "", "#12345", "#1234567", "#zzzzzz"] {
            let out = hex_to_kml_color(bad, 70);
            assert_eq!(out.len(), 8, "expected 8 hex chars for {bad:?}, got {out}");
            assert!(out.ends_with("FFFFFF"), "expected white fallback for {bad:?}, got {out}");
        }
    }

    #[test]
    fn output_is_always_8_uppercase_hex_chars() {
        for pct in [0u8, 10, 50, 90, 100] {
            let out = hex_to_kml_color("#3cb371", pct);
            assert_eq!(out.len(), 8);
            assert!(out.bytes().all(|b| b.is_ascii_hexdigit()));
            assert_eq!(out, out.to_ascii_uppercase());
        }
    }
}
