use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use skycast_core::{
    Config, Icon, OpenWeatherClient, ResultSink, SlotPolicy, Units, WeatherService,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and 5-day forecast from OpenWeather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current conditions for a city.
    Current {
        #[command(flatten)]
        target: Target,

        /// Write the condition icon (PNG, 100x100) to this path.
        #[arg(long)]
        icon_out: Option<PathBuf>,
    },

    /// Show one midday summary per day for the next 5 days.
    Forecast {
        #[command(flatten)]
        target: Target,

        /// Use the slot closest to local noon when a day has no 12:00 slot.
        #[arg(long)]
        nearest_noon: bool,
    },

    /// Show current conditions followed by the forecast.
    Show {
        #[command(flatten)]
        target: Target,
    },

    /// Store an API key and default units in the config file.
    Configure,
}

#[derive(Debug, Args)]
pub struct Target {
    /// City name, e.g. "London" or "New York".
    pub city: String,

    /// metric, imperial or standard; defaults to the configured units.
    #[arg(long, short)]
    pub units: Option<Units>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current { target, icon_out } => {
                let service = build_service(&target, SlotPolicy::default())?;
                let mut sink = StdoutSink::new(icon_out);
                service.show_weather(&target.city, &mut sink).await;
                sink.finish()
            }
            Command::Forecast { target, nearest_noon } => {
                let policy =
                    if nearest_noon { SlotPolicy::nearest_noon() } else { SlotPolicy::default() };
                let service = build_service(&target, policy)?;
                let mut sink = StdoutSink::new(None);
                service.show_forecast(&target.city, &mut sink).await;
                sink.finish()
            }
            Command::Show { target } => {
                let service = build_service(&target, SlotPolicy::default())?;
                let mut sink = StdoutSink::new(None);
                service.show_weather(&target.city, &mut sink).await;
                println!();
                service.show_forecast(&target.city, &mut sink).await;
                sink.finish()
            }
        }
    }
}

fn build_service(
    target: &Target,
    policy: SlotPolicy,
) -> Result<WeatherService<OpenWeatherClient, chrono::Local>> {
    let config = Config::load()?;
    let units = target.units.unwrap_or_else(|| config.default_units());
    let api_key = config.api_key_from_env();
    if api_key.is_none() {
        tracing::debug!("no API key configured");
    }

    let client = OpenWeatherClient::new(api_key, config.client.clone())
        .context("Failed to build HTTP client")?;

    Ok(WeatherService::new(client, units, chrono::Local).with_policy(policy))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key (leave empty to keep the current one):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("API key prompt cancelled")?;

    if !api_key.trim().is_empty() {
        config.set_api_key(&api_key);
    }

    let current = config.default_units();
    let start = Units::all().iter().position(|u| *u == current).unwrap_or(0);
    let units = Select::new("Default units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Units prompt cancelled")?;
    config.units = Some(units);

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

/// Prints results to stdout and optionally writes the icon to a file.
#[derive(Debug)]
struct StdoutSink {
    icon_out: Option<PathBuf>,
    icon_error: Option<anyhow::Error>,
}

impl StdoutSink {
    fn new(icon_out: Option<PathBuf>) -> Self {
        Self { icon_out, icon_error: None }
    }

    fn save_icon(&self, icon: &Icon, path: &Path) -> Result<()> {
        let png = icon.scaled_png()?;
        fs::write(path, png)
            .with_context(|| format!("Failed to write icon to {}", path.display()))?;
        println!("Icon {} saved to {}", icon.code, path.display());
        Ok(())
    }

    fn finish(self) -> Result<()> {
        match self.icon_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ResultSink for StdoutSink {
    fn show_current(&mut self, text: &str) {
        println!("{text}");
    }

    fn show_icon(&mut self, icon: Option<&Icon>) {
        let (Some(icon), Some(path)) = (icon, self.icon_out.as_ref()) else {
            return;
        };

        if let Err(e) = self.save_icon(icon, path) {
            self.icon_error = Some(e);
        }
    }

    fn show_forecast(&mut self, text: &str) {
        println!("{}", text.trim_end());
    }
}
