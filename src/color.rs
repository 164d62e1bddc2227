//! Hex color conversion.
//!
//! Colors are configured as CSS-style `#rrggbb` strings and stored as
//! normalized RGB [`Vec3`] values (each channel `0.0..=1.0`).

use glam::Vec3;

use crate::error::ColorError;

/// Parse a `#rrggbb` (or `rrggbb`) string into normalized RGB.
///
/// ```
/// # use particle_field::color::hex_to_rgb;
/// let c = hex_to_rgb("#3b82f6").unwrap();
/// assert_eq!(c.x, 59.0 / 255.0);
/// ```
pub fn hex_to_rgb(hex: &str) -> Result<Vec3, ColorError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return Err(ColorError::Length(hex.to_string()));
    }
    // from_str_radix alone would accept a leading '+'
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::Digits(hex.to_string()));
    }
    let packed =
        u32::from_str_radix(digits, 16).map_err(|_| ColorError::Digits(hex.to_string()))?;

    Ok(Vec3::new(
        ((packed >> 16) & 0xff) as f32 / 255.0,
        ((packed >> 8) & 0xff) as f32 / 255.0,
        (packed & 0xff) as f32 / 255.0,
    ))
}

/// Format normalized RGB as lowercase `#rrggbb`, rounding each channel.
pub fn rgb_to_hex(color: Vec3) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(color.x),
        channel(color.y),
        channel(color.z)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb_blue() {
        let c = hex_to_rgb("#3b82f6").unwrap();
        assert_eq!(c, Vec3::new(59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0));
    }

    #[test]
    fn test_hex_without_hash() {
        assert_eq!(hex_to_rgb("ffffff").unwrap(), Vec3::ONE);
        assert_eq!(hex_to_rgb("#000000").unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_hex_rejects_bad_input() {
        assert!(matches!(hex_to_rgb("#fff"), Err(ColorError::Length(_))));
        assert!(matches!(hex_to_rgb("#12345g"), Err(ColorError::Digits(_))));
        assert!(matches!(hex_to_rgb("+12345"), Err(ColorError::Digits(_))));
        assert!(matches!(hex_to_rgb(""), Err(ColorError::Length(_))));
    }

    #[test]
    fn test_round_trip_default_palette() {
        for hex in ["#3b82f6", "#6366f1", "#8b5cf6", "#000000", "#ffffff", "#010203"] {
            assert_eq!(rgb_to_hex(hex_to_rgb(hex).unwrap()), hex);
        }
    }

    #[test]
    fn test_round_trip_every_channel_value() {
        for v in 0..=255u32 {
            let hex = format!("#{v:02x}{:02x}{:02x}", 255 - v, v / 2);
            assert_eq!(rgb_to_hex(hex_to_rgb(&hex).unwrap()), hex);
        }
    }
}
