//! Colours for the terminal client, configurable as RGB triples.

use std::hash::{Hash, Hasher};

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// RGB colour, 0-255 per channel.
pub type Rgb = [u8; 3];

macro_rules! style_fields {
    ($(($field:ident, $fn_name:ident, $default:expr)),* $(,)?) => {
        /// Colours for the various parts of the UI.
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
        #[serde(default)]
        pub struct Style {
            $(
                #[doc = concat!("RGB colour for ", stringify!($fn_name))]
                pub $field: Rgb,
            )*
        }
        impl Default for Style {
            fn default() -> Self {
                Self {
                    $($field: $default,)*
                }
            }
        }
        impl Style {
            $(
                pub fn $fn_name(&self) -> Color {
                    let [r, g, b] = self.$field;
                    Color::Rgb(r, g, b)
                }
            )*
        }
    }
}

style_fields![
    (background, background_color, [12, 12, 20]),
    (text, text_color, [235, 235, 235]),
    (dim, dim_color, [128, 128, 128]),
    (accent, accent_color, [90, 190, 255]),
    (border, border_color, [40, 110, 170]),
    (selected, selected_color, [60, 70, 120]),
    (left, left_color, [255, 120, 90]),
    (right, right_color, [110, 220, 140]),
    (winner, winner_color, [255, 210, 80]),
    (error, error_color, [230, 80, 80]),
];

/// Hashes a string and produces a pleasing colour from that hash.
pub fn string_to_color(s: &str) -> Color {
    const DISTINCT_COLOURS: u64 = 36_000;

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    let hue = (hasher.finish() % DISTINCT_COLOURS) as f32 / DISTINCT_COLOURS as f32;

    let [r, g, b] = hsv_to_rgb(hue, 0.6, 0.95);
    Color::Rgb(r, g, b)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let f = h * 6.0 - (h * 6.0).floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let [r, g, b] = match (h * 6.0).floor() as i32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    };
    // Saturating casts.
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_colours_are_stable() {
        assert_eq!(string_to_color("Artist"), string_to_color("Artist"));
    }

    #[test]
    fn primary_hues() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), [0, 0, 255]);
    }
}
