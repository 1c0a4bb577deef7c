//! Persist best scores (per grid width) and the ghost preference (XDG config or ~/.config/blockfall).

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

const APP_DIR: &str = "blockfall";
const FILENAME: &str = "records";
const BEST_PREFIX: &str = "best.";
const SHADOWS_KEY: &str = "shadows";

/// Best score per grid width plus display preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Records {
    best: BTreeMap<u16, u32>,
    shadows: bool,
}

impl Default for Records {
    fn default() -> Self {
        Self {
            best: BTreeMap::new(),
            shadows: true,
        }
    }
}

/// Returns the path to the records file (config dir / blockfall / records).
fn config_path() -> PathBuf {
    let home_config = || {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    };
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => home_config(),
    };
    base.join(APP_DIR).join(FILENAME)
}

impl Records {
    /// Load from disk; defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let path = config_path();
        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                warn!(path = %path.display(), %err, "could not read records");
                Self::default()
            }
        }
    }

    /// Save to disk. Creates the config directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&path, self.to_text()).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Parse `key=value` lines; unknown keys and malformed values are skipped.
    pub fn parse(content: &str) -> Self {
        let mut records = Self::default();
        for line in content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key == SHADOWS_KEY {
                if let Ok(on) = value.parse::<bool>() {
                    records.shadows = on;
                }
            } else if let Some(width) = key.strip_prefix(BEST_PREFIX) {
                if let (Ok(width), Ok(score)) = (width.parse::<u16>(), value.parse::<u32>()) {
                    records.best.insert(width, score);
                }
            }
        }
        records
    }

    pub fn to_text(&self) -> String {
        let mut out = format!("{SHADOWS_KEY}={}\n", self.shadows);
        for (width, score) in &self.best {
            out.push_str(&format!("{BEST_PREFIX}{width}={score}\n"));
        }
        out
    }

    pub fn best(&self, width: u16) -> u32 {
        self.best.get(&width).copied().unwrap_or(0)
    }

    /// Record a finished game; true when it beats the stored best for this width.
    pub fn submit(&mut self, width: u16, score: u32) -> bool {
        if score == 0 || score <= self.best(width) {
            return false;
        }
        self.best.insert(width, score);
        true
    }

    pub fn shadows(&self) -> bool {
        self.shadows
    }

    pub fn set_shadows(&mut self, on: bool) {
        self.shadows = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_best_and_shadows() {
        let r = Records::parse("shadows=false\nbest.10=42\nbest.16=7\n");
        assert!(!r.shadows());
        assert_eq!(r.best(10), 42);
        assert_eq!(r.best(16), 7);
        assert_eq!(r.best(12), 0);
    }

    #[test]
    fn test_parse_skips_garbage() {
        let r = Records::parse("nonsense\nbest.x=3\nbest.10=abc\nshadows=maybe\n best.8 = 5 \n");
        assert!(r.shadows());
        assert_eq!(r.best(8), 5);
        assert_eq!(r.best(10), 0);
    }

    #[test]
    fn test_text_round_trip() {
        let mut r = Records::default();
        r.set_shadows(false);
        r.submit(10, 12);
        r.submit(20, 3);
        assert_eq!(r.to_text(), "shadows=false\nbest.10=12\nbest.20=3\n");
        assert_eq!(Records::parse(&r.to_text()), r);
    }

    #[test]
    fn test_submit_only_improves() {
        let mut r = Records::default();
        assert!(!r.submit(10, 0));
        assert!(r.submit(10, 5));
        assert!(!r.submit(10, 5));
        assert!(!r.submit(10, 3));
        assert!(r.submit(10, 6));
        assert_eq!(r.best(10), 6);
        assert!(r.submit(12, 1));
    }
}
