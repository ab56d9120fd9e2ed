//! Colormaps for heatmap cells.

use crate::utils::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Sequential colormaps, mapping `[0, 1]` to a colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Copper,
    Gray,
    Hot,
}

impl Colormap {
    /// RGB triple for a normalised value; inputs are clamped to `[0, 1]`
    pub fn rgb(self, t: f64) -> (u8, u8, u8) {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let (r, g, b) = match self {
            Colormap::Copper => ((1.25 * t).min(1.0), 0.7812 * t, 0.4975 * t),
            Colormap::Gray => (t, t, t),
            Colormap::Hot => (
                (t / 0.365).min(1.0),
                ((t - 0.365) / 0.38).clamp(0.0, 1.0),
                ((t - 0.745) / 0.255).clamp(0.0, 1.0),
            ),
        };
        (to_channel(r), to_channel(g), to_channel(b))
    }

    /// SVG fill string for a normalised value
    pub fn fill(self, t: f64) -> String {
        let (r, g, b) = self.rgb(t);
        format!("rgb({}, {}, {})", r, g, b)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Colormap::Copper => "copper",
            Colormap::Gray => "gray",
            Colormap::Hot => "hot",
        }
    }
}

fn to_channel(v: f64) -> u8 {
    (v * 255.0).round() as u8
}

impl FromStr for Colormap {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "copper" => Ok(Colormap::Copper),
            "gray" | "grey" => Ok(Colormap::Gray),
            "hot" => Ok(Colormap::Hot),
            _ => Err(ConfigError::InvalidColormap(s.to_string())),
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copper_endpoints() {
        assert_eq!(Colormap::Copper.rgb(0.0), (0, 0, 0));
        assert_eq!(Colormap::Copper.rgb(1.0), (255, 199, 127));
    }

    #[test]
    fn test_values_are_clamped() {
        assert_eq!(Colormap::Gray.rgb(2.0), (255, 255, 255));
        assert_eq!(Colormap::Gray.rgb(-1.0), (0, 0, 0));
        assert_eq!(Colormap::Hot.rgb(f64::NAN), (0, 0, 0));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Copper".parse::<Colormap>().unwrap(), Colormap::Copper);
        assert_eq!("grey".parse::<Colormap>().unwrap(), Colormap::Gray);
        assert!("viridis".parse::<Colormap>().is_err());
    }
}
