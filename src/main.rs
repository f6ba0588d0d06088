use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use citycast_core::{App, Config};
use citycast_services::SqliteKvStore;
use citycast_ui::{render, Command, PageModel, HELP_TEXT};
use citycast_weather::{Units, WeatherClient, WeatherProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    citycast_core::init()?;

    let mut app = App::new()?;
    app.initialize()?;

    let config = app.config();
    let store = SqliteKvStore::new(config.database_path())
        .with_context(|| format!("opening {}", config.database_path().display()))?;
    let client = WeatherClient::new(Arc::new(provider(config)?), units(config));
    let mut page = PageModel::new(Arc::new(store), client);

    tracing::info!("citycast started");

    run(&mut page).await?;

    app.shutdown()?;
    Ok(())
}

fn provider(config: &Config) -> Result<WeatherProvider> {
    let weather = &config.weather;
    if !weather.is_configured() {
        tracing::warn!("No OpenWeatherMap API key configured; requests will be rejected");
    }

    WeatherProvider::with_options(
        &weather.api_base_url,
        weather.api_key.clone(),
        Duration::from_secs(weather.request_timeout_secs),
    )
    .context("building weather provider")
}

fn units(config: &Config) -> Units {
    match config.weather.units {
        citycast_core::Units::Metric => Units::Metric,
        citycast_core::Units::Imperial => Units::Imperial,
        citycast_core::Units::Standard => Units::Standard,
    }
}

async fn run(page: &mut PageModel) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    page.settle().await;
    stdout.write_all(render(&page.snapshot()).as_bytes()).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Command::Nothing => continue,
            Command::Quit => break,
            Command::Help => {
                stdout.write_all(format!("{}\n", HELP_TEXT).as_bytes()).await?;
                continue;
            }
            Command::Type(text) | Command::Add(text) => {
                page.set_draft(text);
                page.add_city();
            }
            Command::Delete(city) => {
                if !page.remove_city(&city) {
                    stdout.write_all(format!("Not tracked: {}\n", city).as_bytes()).await?;
                }
            }
            Command::Open(city) => {
                if !page.select_city(&city) {
                    stdout.write_all(format!("Not tracked: {}\n", city).as_bytes()).await?;
                }
            }
            Command::Back => page.clear_selection(),
            Command::Refresh(Some(city)) => {
                page.refresh_city(&city);
            }
            Command::Refresh(None) => page.refresh_all(),
        }

        page.settle().await;
        stdout.write_all(b"\n").await?;
        stdout.write_all(render(&page.snapshot()).as_bytes()).await?;
    }

    Ok(())
}
