//! Colours: One Dark defaults, btop-style theme files (`theme[key]="#RRGGBB"`) and palettes.

use crate::Palette;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Block colours in shape colour-tag order: I, O, T, S, Z, J, L.
const ONEDARK_BLOCKS: [Color; 7] = [
    rgb(0x56B6C2),
    rgb(0xE5C07B),
    rgb(0xC678DD),
    rgb(0x98C379),
    rgb(0xE06C75),
    rgb(0x61AFEF),
    rgb(0xD19A66),
];

const HIGH_CONTRAST_BLOCKS: [Color; 7] = [
    rgb(0x00FFFF),
    rgb(0xFFFF00),
    rgb(0xFF00FF),
    rgb(0x00FF00),
    rgb(0xFF0000),
    rgb(0x0088FF),
    rgb(0xFF8800),
];

/// Tol's bright scheme plus grey; stays distinguishable without red/green.
const COLORBLIND_BLOCKS: [Color; 7] = [
    rgb(0x66CCEE),
    rgb(0xCCBB44),
    rgb(0xAA3377),
    rgb(0x228833),
    rgb(0xEE6677),
    rgb(0x4477AA),
    rgb(0xBBBBBB),
];

/// Board and HUD colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Indexed by shape colour tag.
    pub blocks: [Color; 7],
    /// Landing preview.
    pub ghost: Color,
    /// Empty board cells.
    pub bg: Color,
    pub div_line: Color,
    pub main_fg: Color,
    pub title: Color,
    /// Secondary text (hints, disabled menu entries).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("reading theme file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex colour: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            blocks: ONEDARK_BLOCKS,
            ghost: rgb(0x4B5263),
            bg: rgb(0x282C34),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
        }
    }
}

impl Theme {
    /// Theme from an optional btop-style file, then the palette on top.
    /// A missing path means the One Dark defaults.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let theme = Self::from_entries(&parse_theme_file(&content));
                debug!(path = %path.display(), "theme loaded");
                theme
            }
            None => Self::default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.blocks = HIGH_CONTRAST_BLOCKS;
                self.ghost = rgb(0x808080);
                self.bg = Color::Black;
                self.main_fg = Color::White;
            }
            Palette::Colorblind => self.blocks = COLORBLIND_BLOCKS,
        }
    }

    /// Known btop keys override the defaults; unparsable values are ignored.
    fn from_entries(entries: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| entries.get(*k).and_then(|v| parse_hex(v).ok()))
        };
        let mut theme = Self::default();
        let block_keys: [&[&str]; 7] = [
            &["hi_fg", "proc_misc"],
            &["title", "cpu_mid"],
            &["net_box"],
            &["mem_box", "cpu_start"],
            &["cpu_end", "temp_end"],
            &["cpu_box"],
            &["available_end", "used_mid"],
        ];
        for (slot, keys) in theme.blocks.iter_mut().zip(block_keys) {
            if let Some(color) = get(keys) {
                *slot = color;
            }
        }
        let ui: [(&mut Color, &[&str]); 6] = [
            (&mut theme.ghost, &["meter_bg"]),
            (&mut theme.bg, &["main_bg"]),
            (&mut theme.div_line, &["div_line"]),
            (&mut theme.main_fg, &["main_fg"]),
            (&mut theme.title, &["title"]),
            (&mut theme.inactive_fg, &["inactive_fg"]),
        ];
        for (slot, keys) in ui {
            if let Some(color) = get(keys) {
                *slot = color;
            }
        }
        theme
    }

    #[inline]
    pub fn block_color(&self, tag: u8) -> Color {
        self.blocks[tag as usize % self.blocks.len()]
    }
}

/// `theme[key]="value"` lines into a key -> value map. Comments and blank lines are skipped.
fn parse_theme_file(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let rest = line.strip_prefix("theme[")?;
            let (key, rest) = rest.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// `#RRGGBB` or `#RGB`.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let digits = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|d| u8::from_str_radix(d, 16).ok())
            .ok_or_else(invalid)
    };
    match digits.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file("# comment\ntheme[main_bg]=\"#31353F\"\ntheme[title]='#FFF'\n");
        assert_eq!(map.get("main_bg"), Some(&"#31353F".to_string()));
        assert_eq!(map.get("title"), Some(&"#FFF".to_string()));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_entries_override_defaults() {
        let map = parse_theme_file("theme[cpu_box]=\"#010203\"\ntheme[main_fg]=\"nothex\"\n");
        let theme = Theme::from_entries(&map);
        assert_eq!(theme.block_color(5), Color::Rgb(1, 2, 3));
        assert_eq!(theme.main_fg, Theme::default().main_fg);
    }

    #[test]
    fn test_palettes_replace_block_colours() {
        let mut theme = Theme::default();
        theme.apply_palette(Palette::Colorblind);
        assert_eq!(theme.blocks, COLORBLIND_BLOCKS);
        theme.apply_palette(Palette::HighContrast);
        assert_eq!(theme.block_color(7), theme.block_color(0));
    }
}
