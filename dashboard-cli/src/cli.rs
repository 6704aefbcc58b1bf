use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;

use dashboard_core::{
    Action, Config, FileStore, LocationResolver, LocationStore, Theme, ThemePreferenceSource,
    WeatherProvider, provider_from_config,
};

use crate::format;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Weather dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API credential.
    Configure,

    /// Show the dashboard for the remembered or detected location.
    Show {
        /// Ignore the remembered location and detect one afresh.
        #[arg(long)]
        detect: bool,
    },

    /// Search for a city by name and show its weather.
    Search {
        /// City name; prompts interactively when omitted.
        query: Option<String>,
    },

    /// Manage favorite locations.
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommand,
    },

    /// Show or set the color theme preference.
    Theme {
        /// New preference; prints the current one when omitted.
        theme: Option<ThemeArg>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List saved favorites.
    List,

    /// Look a city up and save it as a favorite.
    Add { city: String },

    /// Remove a favorite by its id (see `favorites list`).
    Remove { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { detect } => show(detect).await,
            Command::Search { query } => search(query).await,
            Command::Favorites { command } => favorites(command).await,
            Command::Theme { theme } => theme_preference(theme),
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Configuration aborted")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved credentials to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(detect: bool) -> Result<()> {
    let config = Config::load()?;
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(&config)?);
    let mut store = FileStore::open()?;

    let prior = if detect { None } else { store.last_location() };
    let resolver = LocationResolver::new(provider.clone())
        .with_error_sink(|message| eprintln!("{message}"));
    let location = resolver.resolve(prior).await?;

    let data = provider.fetch_weather(location.coordinates()).await?;
    print!("{}", format::render_dashboard(&location, &data));

    store.remember_location(&location)?;
    Ok(())
}

async fn search(query: Option<String>) -> Result<()> {
    let query = match query {
        Some(query) => query,
        None => inquire::Text::new("City name:")
            .prompt()
            .context("Search aborted")?,
    };
    let query = query.trim();
    if query.is_empty() {
        bail!("Nothing to search for");
    }

    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    let location = provider.find_city(query).await?;
    let data = provider.fetch_weather(location.coordinates()).await?;
    print!("{}", format::render_dashboard(&location, &data));

    let mut store = FileStore::open()?;
    store.apply(Action::AddRecentSearch(location.clone()))?;
    store.apply(Action::SetLocation(location))?;
    Ok(())
}

async fn favorites(command: FavoritesCommand) -> Result<()> {
    let mut store = FileStore::open()?;

    match command {
        FavoritesCommand::List => {
            if store.state().favorites.is_empty() {
                println!("No favorites saved yet. Try `dashboard favorites add <city>`.");
                return Ok(());
            }
            for favorite in &store.state().favorites {
                println!(
                    "{}  {}, {} ({}, {})",
                    favorite.id, favorite.name, favorite.country, favorite.lat, favorite.lon
                );
            }
        }
        FavoritesCommand::Add { city } => {
            let config = Config::load()?;
            let provider = provider_from_config(&config)?;
            let location = provider.find_city(&city).await?;

            println!("Added {}, {} to favorites", location.name, location.country);
            store.apply(Action::AddFavorite(location))?;
        }
        FavoritesCommand::Remove { id } => {
            store.apply(Action::RemoveFavorite(id))?;
            println!("Removed.");
        }
    }

    Ok(())
}

fn theme_preference(theme: Option<ThemeArg>) -> Result<()> {
    let mut store = FileStore::open()?;

    match theme {
        Some(choice) => {
            let theme = match choice {
                ThemeArg::Light => Theme::Light,
                ThemeArg::Dark => Theme::Dark,
            };
            store.apply(Action::SetTheme(theme))?;
            println!("Theme preference saved.");
        }
        None => match store.preferred_theme() {
            Some(Theme::Light) => println!("Theme: light"),
            Some(Theme::Dark) => println!("Theme: dark"),
            None => println!("Theme: system preference (none saved)"),
        },
    }

    Ok(())
}
