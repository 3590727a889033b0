use serde::Deserialize;
use std::fmt;

use crate::RenderError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// `#rrggbb` (the `#` is optional).
    pub fn hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn to_svg_fill(&self) -> String {
        if (self.a - 1.0).abs() < 1e-6 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear interpolation between two colors.
    pub fn lerp(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 * (1.0 - t) + y as f64 * t).round() as u8;
        Color { r: mix(a.r, b.r), g: mix(a.g, b.g), b: mix(a.b, b.b), a: a.a * (1.0 - t) + b.a * t }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_fill())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        root_color(&s).map_err(serde::de::Error::custom)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// --- ROOT colors ---

/// Named ROOT base colors.
const ROOT_BASES: &[(&str, Color)] = &[
    ("kWhite", Color::rgb(255, 255, 255)),
    ("kBlack", Color::rgb(0, 0, 0)),
    ("kGray", Color::rgb(204, 204, 204)),
    ("kRed", Color::rgb(255, 0, 0)),
    ("kGreen", Color::rgb(0, 255, 0)),
    ("kBlue", Color::rgb(0, 0, 255)),
    ("kYellow", Color::rgb(255, 255, 0)),
    ("kMagenta", Color::rgb(255, 0, 255)),
    ("kCyan", Color::rgb(0, 255, 255)),
    ("kOrange", Color::rgb(255, 204, 0)),
    ("kSpring", Color::rgb(204, 255, 0)),
    ("kTeal", Color::rgb(0, 255, 204)),
    ("kAzure", Color::rgb(0, 204, 255)),
    ("kViolet", Color::rgb(204, 0, 255)),
    ("kPink", Color::rgb(255, 0, 204)),
];

/// The first ten entries of ROOT's default color table.
const ROOT_INDEXED: [Color; 10] = [
    Color::rgb(255, 255, 255),
    Color::rgb(0, 0, 0),
    Color::rgb(255, 0, 0),
    Color::rgb(0, 255, 0),
    Color::rgb(0, 0, 255),
    Color::rgb(255, 255, 0),
    Color::rgb(255, 0, 255),
    Color::rgb(0, 255, 255),
    Color::rgb(89, 212, 84),
    Color::rgb(89, 84, 217),
];

/// Resolve a color given as a ROOT name with optional offset (`kViolet+2`,
/// `kRed - 3`), a small ROOT color index (`0`..`9`) or `#rrggbb`.
///
/// Offsets approximate ROOT's color wheel: positive steps blend towards
/// white, negative steps darken.
pub fn root_color(spec: &str) -> crate::Result<Color> {
    let spec = spec.trim();
    if spec.starts_with('#') {
        return Color::hex(spec).ok_or_else(|| RenderError::Config(format!("bad hex color '{spec}'")));
    }
    if let Ok(index) = spec.parse::<usize>() {
        return ROOT_INDEXED
            .get(index)
            .copied()
            .ok_or_else(|| RenderError::Config(format!("ROOT color index {index} outside 0..=9")));
    }

    let split = spec.find(['+', '-']).unwrap_or(spec.len());
    let (name, rest) = spec.split_at(split);
    let base = ROOT_BASES
        .iter()
        .find(|(n, _)| *n == name.trim())
        .map(|(_, c)| *c)
        .ok_or_else(|| RenderError::Config(format!("unknown ROOT color '{spec}'")))?;
    let offset: i32 = match rest.trim() {
        "" => 0,
        r => {
            let digits: String = r.chars().filter(|c| !c.is_whitespace()).collect();
            digits
                .trim_start_matches('+')
                .parse()
                .map_err(|_| RenderError::Config(format!("bad ROOT color offset in '{spec}'")))?
        }
    };
    Ok(match offset {
        0 => base,
        k if k > 0 => Color::lerp(base, Color::WHITE, 0.18 * k as f64),
        k => Color::lerp(base, Color::BLACK, 0.08 * (-k) as f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        let c = Color::hex("#1D4ED8").unwrap();
        assert_eq!((c.r, c.g, c.b), (0x1D, 0x4E, 0xD8));
        assert!(Color::hex("#12").is_none());
        assert!(Color::hex("zzzzzz").is_none());
    }

    #[test]
    fn svg_fill() {
        assert_eq!(Color::rgb(29, 78, 216).to_svg_fill(), "#1d4ed8");
        assert_eq!(Color::rgb(29, 78, 216).with_alpha(0.5).to_svg_fill(), "rgba(29,78,216,0.500)");
    }

    #[test]
    fn default_palette_resolves() {
        for name in ["kBlack", "kViolet", "kBlue", "kSpring", "kRed"] {
            assert!(root_color(name).is_ok(), "{name}");
        }
        assert_eq!(root_color("kViolet").unwrap(), Color::rgb(204, 0, 255));
        assert_eq!(root_color("4").unwrap(), Color::rgb(0, 0, 255));
    }

    #[test]
    fn offsets_lighten_and_darken() {
        let base = root_color("kBlue").unwrap();
        let light = root_color("kBlue+2").unwrap();
        let dark = root_color("kBlue - 3").unwrap();
        assert!(light.r > base.r);
        assert!(dark.b < base.b);
        assert_eq!(root_color(" kRed-0 ").unwrap(), root_color("kRed").unwrap());
    }

    #[test]
    fn unknown_colors_are_config_errors() {
        assert!(matches!(root_color("kPurple"), Err(RenderError::Config(_))));
        assert!(matches!(root_color("kRed+x"), Err(RenderError::Config(_))));
        assert!(root_color("12").is_err());
    }
}
