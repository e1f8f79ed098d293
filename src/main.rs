mod fetch;
mod render;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Timelike, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use papercal_core::{Config, EventStore, WeatherState, build_day_views};
use render::Frame;

#[derive(Parser)]
#[command(name = "papercal")]
#[command(about = "Render your calendar feeds and local weather as a terminal dashboard")]
struct Cli {
    /// Use an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch feeds and draw the dashboard
    Show {
        /// Keep redrawing: animate marquees and refresh feeds on schedule
        #[arg(long)]
        watch: bool,
    },
    /// List the merged, sorted event store
    Events,
    /// Write a commented default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { watch } => cmd_show(cli.config.as_deref(), watch).await,
        Commands::Events => cmd_events(cli.config.as_deref()).await,
        Commands::Init => cmd_init(),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Ok(Config::load_from(path)?);
    }

    let path = Config::config_path()?;
    if !path.exists() {
        bail!(
            "Config file not found at {}\n\n\
            Run `papercal init` to create one, then add your feed URLs.",
            path.display()
        );
    }
    Ok(Config::load_from(&path)?)
}

/// Timezone rule for the dashboard: the configured zone, or the system
/// zone when the config leaves it out.
fn resolve_timezone(config: &Config) -> Result<Tz> {
    if let Some(tz) = config.timezone()? {
        return Ok(tz);
    }

    let name = iana_time_zone::get_timezone().context("Could not detect the system timezone")?;
    name.parse::<Tz>()
        .map_err(|_| anyhow!("Unrecognized system timezone: {name}"))
}

async fn cmd_show(config_path: Option<&Path>, watch: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let tz = resolve_timezone(&config)?;
    let client = fetch::build_client(config.fetch_timeout()?)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Fetching feeds...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let mut store = fetch_calendars(&client, &config, tz).await;
    let mut weather = refresh_weather(&client, &config, tz, None).await;

    spinner.finish_and_clear();

    let mut frame = build_current_frame(&config, tz, &store, weather.as_ref());
    print!("{}", frame.paint());

    if !watch {
        return Ok(());
    }

    let refresh_period = config.weather.refresh_period()?;
    let mut last_weather_fetch = Instant::now();
    let mut last_day = Utc::now().with_timezone(&tz).date_naive();
    let mut last_minute = Utc::now().with_timezone(&tz).minute();

    loop {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let now = Instant::now();
        let local_now = Utc::now().with_timezone(&tz);
        let mut rebuild = false;

        // a new local day shifts the whole window: refetch the calendars
        if local_now.date_naive() != last_day {
            last_day = local_now.date_naive();
            store = fetch_calendars(&client, &config, tz).await;
            rebuild = true;
        }

        // keep the header clock current
        if local_now.minute() != last_minute {
            last_minute = local_now.minute();
            rebuild = true;
        }

        if now.duration_since(last_weather_fetch) >= refresh_period {
            last_weather_fetch = now;
            weather = refresh_weather(&client, &config, tz, weather.take()).await;
            rebuild = true;
        }

        if rebuild {
            frame = build_current_frame(&config, tz, &store, weather.as_ref());
            repaint(&frame)?;
        } else if frame.tick(now) {
            repaint(&frame)?;
        }
    }
}

async fn cmd_events(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let tz = resolve_timezone(&config)?;
    let client = fetch::build_client(config.fetch_timeout()?)?;

    let store = fetch_calendars(&client, &config, tz).await;
    if store.is_empty() {
        println!("No events.");
        return Ok(());
    }

    for event in store.events() {
        println!("{}", render::event_line(event));
    }
    if store.len() == store.capacity() {
        println!(
            "{}",
            format!("(showing the first {} events)", store.capacity()).dimmed()
        );
    }
    Ok(())
}

fn cmd_init() -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() {
        bail!("Config file already exists at {}", path.display());
    }

    Config::create_default_config(&path)?;
    println!("Wrote {}", path.display());
    println!("Add your calendar feed URLs, then run `papercal show`.");
    Ok(())
}

/// Fetch and parse both configured sources into a fresh store for this
/// cycle. A source that fails even against its cache just leaves its
/// events out; the other source still renders.
async fn fetch_calendars(client: &reqwest::Client, config: &Config, tz: Tz) -> EventStore {
    let mut store = EventStore::new(config.max_events);
    let cache_dir = config.cache_dir();

    let sources = [
        (config.calendar_url.as_deref(), "calendar1.ics"),
        (config.calendar_url2.as_deref(), "calendar2.ics"),
    ];
    for (url, cache_name) in sources {
        let Some(url) = url else { continue };
        match fetch::fetch_calendar(client, url, &cache_dir.join(cache_name)).await {
            Ok(payload) => {
                if !store.ingest_feed(&payload, tz) {
                    eprintln!("{} no events parsed from {url}", "warning:".yellow());
                }
            }
            Err(err) => eprintln!("{} {err:#}", "warning:".yellow()),
        }
    }

    store.sort();
    store
}

/// Refresh the weather state. On any failure the previous state is
/// returned untouched; a refresh never partially overwrites it.
async fn refresh_weather(
    client: &reqwest::Client,
    config: &Config,
    tz: Tz,
    previous: Option<WeatherState>,
) -> Option<WeatherState> {
    if config.weather.api_key.is_none() {
        return previous;
    }

    match fetch::fetch_weather(client, &config.weather).await {
        Ok(((temperature, condition), samples)) => {
            let today = Utc::now().with_timezone(&tz).date_naive();
            Some(WeatherState::build(
                temperature,
                condition,
                &samples,
                tz,
                today,
                config.weather.forecast_days,
            ))
        }
        Err(err) => {
            eprintln!("{} weather refresh failed: {err:#}", "warning:".yellow());
            previous
        }
    }
}

fn build_current_frame(
    config: &Config,
    tz: Tz,
    store: &EventStore,
    weather: Option<&WeatherState>,
) -> Frame {
    let now_local = Utc::now().with_timezone(&tz);
    let days = build_day_views(store, now_local.date_naive(), config.days_to_show);
    render::build_frame(
        store,
        &days,
        weather,
        now_local,
        &config.layout,
        config.weather.units,
        Instant::now(),
    )
}

fn repaint(frame: &Frame) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "\x1b[2J\x1b[H{}", frame.paint())?;
    stdout.flush()?;
    Ok(())
}
