use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context as _;

use crate::document::{self, Page};

pub const THEME_KEY: &str = "theme";
const THEME_ATTR: &str = "data-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// The toggle shows where a click takes you: a sun while dark.
    pub fn icon_class(self) -> &'static str {
        match self {
            Theme::Dark => "fas fa-sun",
            Theme::Light => "fas fa-moon",
        }
    }
}

/// Key/value persistence that outlives a page view.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat JSON object on disk. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", self.path.display()))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let all = self.read_all()?;
        Ok(all.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), serde_json::Value::from(value));
        let text = serde_json::to_string_pretty(&all).context("encode preferences")?;
        std::fs::write(&self.path, text).with_context(|| format!("write {}", self.path.display()))
    }
}

/// Stored preference, falling back to dark when absent, unreadable or garbled.
pub fn stored_theme(store: &dyn PreferenceStore) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(value)) => Theme::parse(&value).unwrap_or_else(|| {
            tracing::warn!(%value, "unrecognized stored theme; using dark");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "theme preference unreadable; using dark");
            Theme::default()
        }
    }
}

/// Theme currently on the document root, if any.
pub fn current_theme(page: &Page) -> Option<Theme> {
    page.attr("html", THEME_ATTR)
        .and_then(|value| Theme::parse(&value))
}

/// Page load: put the stored preference on the document.
pub fn apply_stored(page: &Page, store: &dyn PreferenceStore) -> Theme {
    let theme = stored_theme(store);
    apply(page, theme);
    theme
}

pub fn toggle(page: &Page, store: &mut dyn PreferenceStore) -> Theme {
    let current = current_theme(page).unwrap_or_else(|| stored_theme(&*store));
    let next = current.flipped();

    if let Err(err) = store.set(THEME_KEY, next.as_str()) {
        tracing::warn!(error = %format!("{err:#}"), theme = next.as_str(), "failed to persist theme");
    }
    apply(page, next);
    tracing::debug!(from = current.as_str(), to = next.as_str(), "theme toggled");
    next
}

fn apply(page: &Page, theme: Theme) {
    page.set_attr("html", THEME_ATTR, theme.as_str());
    if !page.set_attr(document::THEME_ICON, "class", theme.icon_class()) {
        tracing::debug!("no theme icon on page; skipping icon update");
    }
}
