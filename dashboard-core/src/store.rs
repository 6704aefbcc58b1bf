//! Persistent user state: the desktop analogue of the dashboard's browser
//! storage. Read at startup, written after every successful location
//! resolution and every theme change.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{fs, path::PathBuf};

use crate::{
    model::Location,
    state::{Action, DashboardState, Theme},
};

/// Read/write access to the last remembered location.
pub trait LocationStore {
    fn last_location(&self) -> Option<Location>;
    fn remember_location(&mut self, location: &Location) -> Result<()>;
}

/// Read access to the persisted theme preference. `None` means the user has
/// never chosen one and the system preference applies.
pub trait ThemePreferenceSource {
    fn preferred_theme(&self) -> Option<Theme>;
}

/// TOML-file-backed store for the small bits of state that survive restarts.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    state: DashboardState,
}

impl FileStore {
    /// Open the store at its platform-default path.
    pub fn open() -> Result<Self> {
        Self::open_at(Self::state_file_path()?)
    }

    /// Open the store at an explicit path, starting empty if the file does
    /// not exist yet.
    pub fn open_at(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse state file: {}", path.display()))?
        } else {
            DashboardState::default()
        };

        Ok(Self { path, state })
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Apply a state transition and persist the result.
    pub fn apply(&mut self, action: Action) -> Result<()> {
        self.state = self.state.clone().apply(action);
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(&self.state).context("Failed to serialize state to TOML")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        Ok(())
    }

    /// Path to the state file.
    pub fn state_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("state.toml"))
    }
}

impl LocationStore for FileStore {
    fn last_location(&self) -> Option<Location> {
        self.state.selected_location.clone()
    }

    fn remember_location(&mut self, location: &Location) -> Result<()> {
        self.apply(Action::SetLocation(location.clone()))
    }
}

impl ThemePreferenceSource for FileStore {
    fn preferred_theme(&self) -> Option<Theme> {
        self.state.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheffield() -> Location {
        Location {
            name: "Sheffield".to_string(),
            country: "GB".to_string(),
            lat: 53.3811,
            lon: -1.4701,
        }
    }

    #[test]
    fn open_at_missing_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open_at(dir.path().join("state.toml")).expect("open");

        assert_eq!(store.state(), &DashboardState::default());
        assert!(store.last_location().is_none());
    }

    #[test]
    fn remembered_location_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.toml");

        let mut store = FileStore::open_at(path.clone()).expect("open");
        store.remember_location(&sheffield()).expect("remember");

        let reopened = FileStore::open_at(path).expect("reopen");
        assert_eq!(reopened.last_location(), Some(sheffield()));
    }

    #[test]
    fn theme_preference_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.toml");

        let mut store = FileStore::open_at(path.clone()).expect("open");
        assert_eq!(store.preferred_theme(), None);
        store.apply(Action::SetTheme(Theme::Light)).expect("set theme");

        let reopened = FileStore::open_at(path).expect("reopen");
        assert_eq!(reopened.preferred_theme(), Some(Theme::Light));
    }

    #[test]
    fn favorites_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.toml");

        let mut store = FileStore::open_at(path.clone()).expect("open");
        store.apply(Action::AddFavorite(sheffield())).expect("add favorite");

        let reopened = FileStore::open_at(path).expect("reopen");
        assert_eq!(reopened.state().favorites.len(), 1);
        assert_eq!(reopened.state().favorites[0].name, "Sheffield");
    }
}
