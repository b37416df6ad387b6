//! Read or change the stored dashboard theme.
//!
//!   theme            print the current theme
//!   theme list       print every available theme
//!   theme set NAME   persist NAME

use std::env;

use anyhow::{bail, Result};
use border_forecast::config::Config;
use border_forecast::theme::{SqlitePreferences, Theme, ThemeStore};

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => {
            let store = ThemeStore::load(SqlitePreferences::open(&cfg.prefs_path)?);
            println!("{}", store.get());
        }
        ["list"] => {
            for theme in Theme::ALL {
                println!("{}", theme);
            }
        }
        ["set", name] => {
            let theme: Theme = name.parse()?;
            let mut store = ThemeStore::load(SqlitePreferences::open(&cfg.prefs_path)?);
            store.set(theme)?;
            println!("{}", store.get());
        }
        _ => bail!("usage: theme [list | set <light|dark|pastel|contrast>]"),
    }
    Ok(())
}
