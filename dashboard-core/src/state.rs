//! Dashboard state and its pure transition function.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::{Location, SavedLocation};

/// Most recent searches kept, newest first.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Colour theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Everything the dashboard remembers about the user. `theme: None` means
/// "follow the system preference".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub theme: Option<Theme>,
    pub selected_location: Option<Location>,
    pub favorites: Vec<SavedLocation>,
    pub recent_searches: Vec<Location>,
}

/// State transitions, one per user-visible operation.
#[derive(Debug, Clone)]
pub enum Action {
    AddFavorite(Location),
    RemoveFavorite(String),
    SetTheme(Theme),
    SetLocation(Location),
    AddRecentSearch(Location),
}

impl DashboardState {
    /// Apply one action, returning the next state. Pure aside from the
    /// timestamp stamped onto a new favorite.
    pub fn apply(mut self, action: Action) -> Self {
        match action {
            Action::AddFavorite(location) => {
                let id = location.id();
                // Identical coordinates collapse to a single favorite.
                if !self.favorites.iter().any(|fav| fav.id == id) {
                    self.favorites
                        .push(SavedLocation::new(location, Utc::now().timestamp()));
                }
            }
            Action::RemoveFavorite(id) => {
                self.favorites.retain(|fav| fav.id != id);
            }
            Action::SetTheme(theme) => {
                self.theme = Some(theme);
            }
            Action::SetLocation(location) => {
                self.selected_location = Some(location);
            }
            Action::AddRecentSearch(location) => {
                self.recent_searches
                    .retain(|past| past.lat != location.lat || past.lon != location.lon);
                self.recent_searches.insert(0, location);
                self.recent_searches.truncate(MAX_RECENT_SEARCHES);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, lat: f64, lon: f64) -> Location {
        Location {
            name: name.to_string(),
            country: "GB".to_string(),
            lat,
            lon,
        }
    }

    #[test]
    fn duplicate_favorites_collapse() {
        let state = DashboardState::default()
            .apply(Action::AddFavorite(place("Sheffield", 53.3811, -1.4701)))
            .apply(Action::AddFavorite(place("Sheffield again", 53.3811, -1.4701)));

        assert_eq!(state.favorites.len(), 1);
        assert_eq!(state.favorites[0].name, "Sheffield");
    }

    #[test]
    fn remove_favorite_by_id() {
        let state = DashboardState::default()
            .apply(Action::AddFavorite(place("Sheffield", 53.3811, -1.4701)))
            .apply(Action::AddFavorite(place("London", 51.5074, -0.1278)));
        let id = state.favorites[0].id.clone();

        let state = state.apply(Action::RemoveFavorite(id));

        assert_eq!(state.favorites.len(), 1);
        assert_eq!(state.favorites[0].name, "London");
    }

    #[test]
    fn set_theme_overrides_system_preference() {
        let state = DashboardState::default();
        assert_eq!(state.theme, None);

        let state = state.apply(Action::SetTheme(Theme::Dark));
        assert_eq!(state.theme, Some(Theme::Dark));
    }

    #[test]
    fn recent_searches_dedup_and_cap() {
        let mut state = DashboardState::default();
        for i in 0..7 {
            state = state.apply(Action::AddRecentSearch(place("city", f64::from(i), 0.0)));
        }
        assert_eq!(state.recent_searches.len(), MAX_RECENT_SEARCHES);
        assert_eq!(state.recent_searches[0].lat, 6.0);

        // Re-searching an existing place moves it to the front without duplicating.
        state = state.apply(Action::AddRecentSearch(place("city", 4.0, 0.0)));
        assert_eq!(state.recent_searches.len(), MAX_RECENT_SEARCHES);
        assert_eq!(state.recent_searches[0].lat, 4.0);
        let fours = state
            .recent_searches
            .iter()
            .filter(|loc| loc.lat == 4.0)
            .count();
        assert_eq!(fours, 1);
    }

    #[test]
    fn set_location_replaces_selection() {
        let state = DashboardState::default()
            .apply(Action::SetLocation(place("Sheffield", 53.3811, -1.4701)))
            .apply(Action::SetLocation(place("London", 51.5074, -0.1278)));

        assert_eq!(state.selected_location.as_ref().map(|l| l.name.as_str()), Some("London"));
    }
}
