use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use ndastro::angle::DegMinSec;
use ndastro::error::{AstroError, Result};
use ndastro::locale::Locale;
use ndastro::settings::ChangeListener;
use ndastro::time::parse_local_datetime;
use ndastro::{nakshatra_and_pada, DashaSystem, GeoLocation, NdAstroService, Planet, Rasi};

#[derive(Parser)]
#[command(name = "ndastro")]
#[command(about = "Vedic astrology calculations: sidereal positions, rasi charts, dashas and retrogrades")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Chart for a local birth time at the configured place
    ndastro chart "1990-05-17 09:30"

    # Positions for another place, as JSON
    ndastro --format json positions "2025-01-11 15:39:20" --lat 13.0827 --lon 80.2707

    # Running maha/antar/pratyantar dasha
    ndastro dasha "1990-05-17 09:30" --running

    # Mercury retrogrades in 2025
    ndastro retrograde 2025-01-01 2025-12-31 --planet mercury

    # Watch settings changes made by other processes
    ndastro settings watch
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (defaults to ./ndastro.toml, then the data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the settings database (defaults to <data_dir>/settings.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Observer overrides; missing values come from the config's `[observer]`.
#[derive(Args, Debug, Clone, Default)]
pub struct PlaceArgs {
    /// Latitude in degrees, north positive
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees, east positive
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Elevation in metres
    #[arg(long)]
    pub elevation: Option<f64>,

    /// UTC offset of the given local times, e.g. +05:30
    #[arg(long, allow_hyphen_values = true)]
    pub tz: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the South Indian rasi chart
    Chart {
        /// Local date/time (YYYY-MM-DD HH:MM[:SS] or RFC 3339); defaults to now
        datetime: Option<String>,

        #[command(flatten)]
        place: PlaceArgs,
    },

    /// List sidereal positions of the ascendant and the nine grahas
    Positions {
        /// Local date/time; defaults to now
        datetime: Option<String>,

        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Show the ayanamsa for a date
    Ayanamsa {
        /// Local date/time; defaults to now
        datetime: Option<String>,

        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Nakshatra, pada and rasi of a sidereal longitude
    Nakshatra {
        /// Sidereal longitude in degrees
        longitude: f64,
    },

    /// Dasha timeline for a birth time
    Dasha {
        /// Local birth date/time
        birth: String,

        /// Dasha system (vimshottari, ashtottari, kalachakra or 1-3)
        #[arg(long)]
        system: Option<String>,

        /// Reference time for the running dasha; defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Only print the running maha, antar and pratyantar periods
        #[arg(long)]
        running: bool,

        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Find retrograde periods between two dates
    Retrograde {
        /// Start date/time
        from: String,

        /// End date/time
        to: String,

        /// Only this planet (default: every planet that can retrograde)
        #[arg(long)]
        planet: Option<String>,

        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Sunrise and sunset for a date
    Sun {
        /// Local date (YYYY-MM-DD); defaults to today
        date: Option<String>,

        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Read and change stored settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print one setting
    Get {
        key: String,
    },

    /// Store a setting; the value is parsed as JSON, else kept as a string
    Set {
        key: String,
        value: String,
    },

    /// Remove a setting
    Remove {
        key: String,
    },

    /// Print all settings
    List,

    /// Print changes as they happen until interrupted
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,
    },
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve_place(service: &NdAstroService, place: &PlaceArgs) -> Result<(GeoLocation, FixedOffset)> {
    let default = service.default_location()?;
    let location = GeoLocation::with_elevation(
        place.lat.unwrap_or(default.latitude),
        place.lon.unwrap_or(default.longitude),
        place.elevation.unwrap_or(default.elevation_m),
    )?;
    let offset = match &place.tz {
        Some(tz) => ndastro::time::parse_utc_offset(tz)?,
        None => service.utc_offset()?,
    };
    Ok((location, offset))
}

fn resolve_time(text: Option<&str>, offset: &FixedOffset) -> Result<DateTime<Utc>> {
    match text {
        Some(text) => parse_local_datetime(text, offset),
        None => Ok(Utc::now()),
    }
}

fn planet_line(locale: Locale, position: &ndastro::PlanetPosition) -> String {
    format!(
        "{:<10} {:<12} {:>12} {:<10} {:<14} {}{}",
        locale.planet(position.planet),
        locale.rasi(position.rasi_occupied),
        position.advanced_by.format(),
        position.house_posited_at.to_string(),
        locale.nakshatra(position.natchaththiram),
        position.paatham,
        if position.retrograde { "  (R)" } else { "" }
    )
}

pub fn chart(service: &NdAstroService, datetime: Option<&str>, place: &PlaceArgs, format: OutputFormat) -> Result<()> {
    let (location, offset) = resolve_place(service, place)?;
    let given = resolve_time(datetime, &offset)?;
    let horoscope = service.horoscope(&given, &location, &Utc::now())?;

    match format {
        OutputFormat::Json => print_json(&horoscope),
        OutputFormat::Text => {
            println!(
                "{}  ({:.4}, {:.4})  ayanamsa {} = {}",
                given.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S %:z"),
                location.latitude,
                location.longitude,
                horoscope.ayanamsa.name(),
                DegMinSec::from_decimal(horoscope.ayanamsa_value).format()
            );
            println!("{}", service.chart_text(&horoscope)?);
            Ok(())
        }
    }
}

pub fn positions(service: &NdAstroService, datetime: Option<&str>, place: &PlaceArgs, format: OutputFormat) -> Result<()> {
    let (location, offset) = resolve_place(service, place)?;
    let given = resolve_time(datetime, &offset)?;
    let positions = service.positions(&given, &location)?;

    match format {
        OutputFormat::Json => print_json(&positions),
        OutputFormat::Text => {
            let locale = service.locale()?;
            println!(
                "{:<10} {:<12} {:>12} {:<10} {:<14} {}",
                "Planet", "Rasi", "Advanced", "House", "Nakshatra", "Pada"
            );
            for position in &positions {
                println!("{}", planet_line(locale, position));
            }
            Ok(())
        }
    }
}

pub fn ayanamsa(service: &NdAstroService, datetime: Option<&str>, place: &PlaceArgs, format: OutputFormat) -> Result<()> {
    let (_, offset) = resolve_place(service, place)?;
    let given = resolve_time(datetime, &offset)?;
    let ayanamsa = service.ayanamsa()?;
    let value = ayanamsa.value_for(&given);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "ayanamsa": ayanamsa.name(),
            "datetime": given,
            "degrees": value,
        })),
        OutputFormat::Text => {
            println!("{} {}", ayanamsa.name(), DegMinSec::from_decimal(value).format());
            Ok(())
        }
    }
}

pub fn nakshatra(service: &NdAstroService, longitude: f64, format: OutputFormat) -> Result<()> {
    if !longitude.is_finite() {
        return Err(AstroError::InvalidAngle(format!("{}", longitude)));
    }
    let longitude = ndastro::normalize_degree(longitude);
    let (star, pada) = nakshatra_and_pada(longitude);
    let rasi = Rasi::from_longitude(longitude);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "longitude": longitude,
            "nakshatra": star,
            "pada": pada,
            "lord": star.lord(),
            "rasi": rasi,
        })),
        OutputFormat::Text => {
            let locale = service.locale()?;
            println!(
                "{} pada {} (lord {}), {}",
                locale.nakshatra(star),
                pada,
                locale.planet(star.lord()),
                locale.rasi(rasi)
            );
            Ok(())
        }
    }
}

pub fn dasha(
    service: &NdAstroService,
    birth: &str,
    system: Option<&str>,
    at: Option<&str>,
    running: bool,
    place: &PlaceArgs,
    format: OutputFormat,
) -> Result<()> {
    let (location, offset) = resolve_place(service, place)?;
    let birth = parse_local_datetime(birth, &offset)?;
    let now = resolve_time(at, &offset)?;
    let system = match system {
        Some(name) => name.parse::<DashaSystem>()?,
        None => service.dasha_system(),
    };

    let dashas = if running {
        service.running_dasha(&birth, &location, &now, system)?
    } else {
        service.dasha_timeline(&birth, &location, &now, system)?
    };

    match format {
        OutputFormat::Json => print_json(&dashas),
        OutputFormat::Text => {
            let locale = service.locale()?;
            println!("{}", locale.dasha_system(system));
            for dasha in &dashas {
                println!(
                    "{} {:<8} {:<12} {} -> {}{}",
                    if dasha.is_running { "*" } else { " " },
                    locale.planet(dasha.owner),
                    locale.dasha_type(dasha.dasha_type),
                    dasha.start.with_timezone(&offset).format("%Y-%m-%d"),
                    dasha.end.with_timezone(&offset).format("%Y-%m-%d"),
                    if dasha.is_running {
                        format!("  ({} days left)", dasha.remaining_period(&now).num_days())
                    } else {
                        String::new()
                    }
                );
            }
            Ok(())
        }
    }
}

pub fn retrograde(
    service: &NdAstroService,
    from: &str,
    to: &str,
    planet: Option<&str>,
    place: &PlaceArgs,
    format: OutputFormat,
) -> Result<()> {
    let (location, offset) = resolve_place(service, place)?;
    let start = parse_local_datetime(from, &offset)?;
    let end = parse_local_datetime(to, &offset)?;
    let planet = planet.map(str::parse::<Planet>).transpose()?;
    let reports = service.retrograde_report(&start, &end, &location, planet)?;

    match format {
        OutputFormat::Json => print_json(&reports),
        OutputFormat::Text => {
            let locale = service.locale()?;
            for report in &reports {
                if report.periods.is_empty() {
                    println!("{}: none", locale.planet(report.planet));
                    continue;
                }
                for period in &report.periods {
                    println!(
                        "{:<10} {} -> {}  ({} days)",
                        locale.planet(report.planet),
                        period.start.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
                        period.end.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
                        period.duration().num_days()
                    );
                }
            }
            Ok(())
        }
    }
}

pub fn sun(service: &NdAstroService, date: Option<&str>, place: &PlaceArgs, format: OutputFormat) -> Result<()> {
    let (location, offset) = resolve_place(service, place)?;
    let date = match date {
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map_err(|_| AstroError::Parse(format!("invalid date: {}", text)))?,
        None => Utc::now().with_timezone(&offset).date_naive(),
    };
    let times = service.sun_times(&location, date)?;

    match format {
        OutputFormat::Json => print_json(&times),
        OutputFormat::Text => {
            let show = |t: Option<DateTime<FixedOffset>>| {
                t.map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string())
            };
            println!("{}", date);
            println!("sunrise {}", show(times.sunrise));
            println!("sunset  {}", show(times.sunset));
            if let Some(length) = times.day_length() {
                println!("day     {}h {:02}m", length.num_hours(), length.num_minutes() % 60);
            }
            Ok(())
        }
    }
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub async fn settings(service: &NdAstroService, command: SettingsCommands, format: OutputFormat) -> Result<()> {
    let store = service.settings();
    match command {
        SettingsCommands::Get { key } => match store.get_value(&key)? {
            Some(value) => match format {
                OutputFormat::Json => print_json(&value),
                OutputFormat::Text => {
                    println!("{}", value);
                    Ok(())
                }
            },
            None => Err(AstroError::Settings(format!("setting '{}' not found", key))),
        },
        SettingsCommands::Set { key, value } => {
            store.set(&key, &parse_setting_value(&value))?;
            println!("{} updated", key);
            Ok(())
        }
        SettingsCommands::Remove { key } => {
            if store.remove(&key)? {
                println!("{} removed", key);
            } else {
                println!("{} was not set", key);
            }
            Ok(())
        }
        SettingsCommands::List => {
            let settings = store.list()?;
            match format {
                OutputFormat::Json => print_json(&settings.into_iter().collect::<serde_json::Map<_, _>>()),
                OutputFormat::Text => {
                    for (key, value) in settings {
                        println!("{} = {}", key, value);
                    }
                    Ok(())
                }
            }
        }
        SettingsCommands::Watch { interval_ms } => watch_settings(service, interval_ms, format).await,
    }
}

async fn watch_settings(service: &NdAstroService, interval_ms: u64, format: OutputFormat) -> Result<()> {
    let listener = ChangeListener::spawn(Arc::clone(service.settings()), Duration::from_millis(interval_ms.max(10)))?;
    let mut changes = listener.subscribe();
    eprintln!("Watching settings, press Ctrl-C to stop...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = changes.recv() => match received {
                Ok(change) => match format {
                    OutputFormat::Json => print_json(&change)?,
                    OutputFormat::Text => match &change.value {
                        Some(value) => println!("[{}] {} = {}", change.changed_at, change.key, value),
                        None => println!("[{}] {} removed", change.changed_at, change.key),
                    },
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("missed {} setting changes", missed);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    listener.stop().await
}
