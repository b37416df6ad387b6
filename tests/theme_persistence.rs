//! Theme preference survives a restart of the SQLite-backed store.

use border_forecast::theme::{
    Palette, PreferenceBackend, SqlitePreferences, Theme, ThemeStore, THEME_KEY,
};
use tempfile::TempDir;

fn prefs_path(dir: &TempDir) -> String {
    dir.path().join("prefs.sqlite").to_string_lossy().into_owned()
}

#[test]
fn test_fresh_store_uses_default() {
    let dir = TempDir::new().unwrap();
    let store = ThemeStore::load(SqlitePreferences::open(&prefs_path(&dir)).unwrap());
    assert_eq!(store.get(), Theme::Light);
    assert_eq!(store.palette(), Palette::for_theme(Theme::Light));
}

#[test]
fn test_set_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = prefs_path(&dir);
    {
        let mut store = ThemeStore::load(SqlitePreferences::open(&path).unwrap());
        store.set(Theme::Dark).unwrap();
        store.set(Theme::Contrast).unwrap();
    }
    let store = ThemeStore::load(SqlitePreferences::open(&path).unwrap());
    assert_eq!(store.get(), Theme::Contrast);
}

#[test]
fn test_corrupt_row_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let path = prefs_path(&dir);
    let mut prefs = SqlitePreferences::open(&path).unwrap();
    prefs.write(THEME_KEY, "sepia").unwrap();
    drop(prefs);

    let store = ThemeStore::load(SqlitePreferences::open(&path).unwrap());
    assert_eq!(store.get(), Theme::Light);
}
