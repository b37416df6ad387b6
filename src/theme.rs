//! Theme preference and the palette each theme draws with.
//!
//! [`ThemeStore`] owns the single stored preference. It is loaded once from a
//! [`PreferenceBackend`] and every `set` is written through before it takes
//! effect.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::logging::{log, log_theme, obj, v_str, Domain, Level};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Pastel,
    Contrast,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Light, Theme::Dark, Theme::Pastel, Theme::Contrast];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Pastel => "pastel",
            Theme::Contrast => "contrast",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "pastel" => Ok(Theme::Pastel),
            "contrast" => Ok(Theme::Contrast),
            other => bail!("unknown theme {:?}", other),
        }
    }
}

/// Colors used by the chart renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub grid: &'static str,
    pub axis: &'static str,
    pub observed: &'static str,
    pub predicted: &'static str,
    pub neighbor: &'static str,
    pub band_p75: &'static str,
    pub band_p90: &'static str,
    pub crosshair: &'static str,
    pub tooltip_bg: &'static str,
    pub warning: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Light => Palette {
                background: "#ffffff",
                text: "#1a1a1a",
                grid: "#e0e0e0",
                axis: "#333333",
                observed: "#3498db",
                predicted: "#e74c3c",
                neighbor: "#95a5a6",
                band_p75: "#f5b7b1",
                band_p90: "#fadbd8",
                crosshair: "#555555",
                tooltip_bg: "#fdfefe",
                warning: "#e67e22",
            },
            Theme::Dark => Palette {
                background: "#1a1a1a",
                text: "#e0e0e0",
                grid: "#404040",
                axis: "#b0b0b0",
                observed: "#5dade2",
                predicted: "#ff6b5b",
                neighbor: "#707b7c",
                band_p75: "#7b2f28",
                band_p90: "#4a1f1b",
                crosshair: "#cccccc",
                tooltip_bg: "#2a2a2a",
                warning: "#f0a04b",
            },
            Theme::Pastel => Palette {
                background: "#fdf6fb",
                text: "#4a3f55",
                grid: "#efe2ee",
                axis: "#7d6b8a",
                observed: "#8ab6f9",
                predicted: "#f49ac2",
                neighbor: "#c3b1e1",
                band_p75: "#fcd5e5",
                band_p90: "#feeaf2",
                crosshair: "#9d8cae",
                tooltip_bg: "#ffffff",
                warning: "#f7b267",
            },
            Theme::Contrast => Palette {
                background: "#000000",
                text: "#ffffff",
                grid: "#666666",
                axis: "#ffffff",
                observed: "#00ffff",
                predicted: "#ffff00",
                neighbor: "#bbbbbb",
                band_p75: "#806600",
                band_p90: "#403300",
                crosshair: "#ffffff",
                tooltip_bg: "#000000",
                warning: "#ff8800",
            },
        }
    }
}

/// Key/value storage for UI preferences.
pub trait PreferenceBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

pub struct SqlitePreferences {
    conn: Connection,
}

impl SqlitePreferences {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }
}

impl PreferenceBackend for SqlitePreferences {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl PreferenceBackend for MemoryPreferences {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct ThemeStore<B: PreferenceBackend> {
    backend: B,
    current: Theme,
}

impl<B: PreferenceBackend> ThemeStore<B> {
    /// Read the stored theme; anything absent or unreadable yields the default.
    pub fn load(backend: B) -> Self {
        let current = match backend.read(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|err: anyhow::Error| {
                log(
                    Level::Warn,
                    Domain::Theme,
                    "theme_invalid",
                    obj(&[("msg", v_str(&err.to_string()))]),
                );
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Theme,
                    "theme_unreadable",
                    obj(&[("msg", v_str(&err.to_string()))]),
                );
                Theme::default()
            }
        };
        log_theme("theme_loaded", current.as_str());
        Self { backend, current }
    }

    pub fn get(&self) -> Theme {
        self.current
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.current)
    }

    /// Persist, then switch. On a write failure the current theme is unchanged.
    pub fn set(&mut self, theme: Theme) -> Result<()> {
        self.backend.write(THEME_KEY, theme.as_str())?;
        self.current = theme;
        log_theme("theme_set", theme.as_str());
        Ok(())
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl PreferenceBackend for Broken {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            bail!("storage offline")
        }
        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            bail!("storage offline")
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for t in Theme::ALL {
            assert_eq!(t.as_str().parse::<Theme>().unwrap(), t);
        }
        assert_eq!(" Dark ".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("neon".parse::<Theme>().is_err());
    }

    #[test]
    fn test_default_when_absent() {
        let store = ThemeStore::load(MemoryPreferences::default());
        assert_eq!(store.get(), Theme::Light);
    }

    #[test]
    fn test_set_persists_through_backend() {
        let mut store = ThemeStore::load(MemoryPreferences::default());
        store.set(Theme::Pastel).unwrap();
        let reloaded = ThemeStore::load(store.into_backend());
        assert_eq!(reloaded.get(), Theme::Pastel);
    }

    #[test]
    fn test_corrupt_value_falls_back() {
        let mut prefs = MemoryPreferences::default();
        prefs.write(THEME_KEY, "{garbage").unwrap();
        assert_eq!(ThemeStore::load(prefs).get(), Theme::Light);
    }

    #[test]
    fn test_unreadable_backend_falls_back_and_set_fails_cleanly() {
        let mut store = ThemeStore::load(Broken);
        assert_eq!(store.get(), Theme::Light);
        assert!(store.set(Theme::Dark).is_err());
        assert_eq!(store.get(), Theme::Light);
    }

    #[test]
    fn test_every_theme_has_distinct_background() {
        let mut seen = std::collections::HashSet::new();
        for t in Theme::ALL {
            assert!(seen.insert(Palette::for_theme(t).background));
        }
    }
}
