use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use inetify_core::{Coordinate, LinkEvent, LinkInfo, LinkType, ProbeConfig, Settings, WifiStore};
use probe::ProbeRunner;
use scheduler::ProbeScheduler;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use title_verifier::{HttpTitleVerifier, TitleFetchOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wifi_store::Db;

mod config;
mod link;
mod notifier;

use link::{StaticLink, WatchedLink};
use notifier::{ConsoleNotifier, NotifyFormat};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json, Csv }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LinkKind { Wifi, Mobile, Other }

#[derive(Debug, Parser)]
#[command(name = "inetify", version, about = "Checks internet connectivity whenever the network link changes")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./inetify.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Probe connectivity once, without delay, over the given link
    Test {
        /// Link type the probe runs on
        #[arg(long = "type", value_enum, default_value_t = LinkKind::Wifi)]
        link_type: LinkKind,
        #[arg(long)]
        ssid: Option<String>,
        #[arg(long)]
        bssid: Option<String>,
        /// Mobile subtype, e.g. LTE
        #[arg(long)]
        subtype: Option<String>,
        /// Server to fetch (overrides config)
        #[arg(long)]
        server: Option<String>,
        /// Expected title substring (overrides config)
        #[arg(long)]
        title: Option<String>,
        /// Attempts before giving up (overrides config)
        #[arg(long)]
        retries: Option<u32>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Read JSON-lines link state from stdin and probe on every change
    Watch {
        #[arg(long, value_enum, default_value_t = NotifyFormat::Text)]
        format: NotifyFormat,
    },
    /// Manage Wifi networks that are never probed
    Ignore {
        #[command(subcommand)]
        cmd: IgnoreCmd,
    },
    /// Manage saved Wifi locations
    Location {
        #[command(subcommand)]
        cmd: LocationCmd,
    },
}

#[derive(Debug, Subcommand)]
enum IgnoreCmd {
    /// Ignore a network (replaces an existing entry for the BSSID)
    Add { bssid: String, ssid: String },
    /// List ignored networks
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Stop ignoring every network with this SSID
    Delete { ssid: String },
    /// Tell whether an SSID is ignored
    Check { ssid: String },
}

#[derive(Debug, Subcommand)]
enum LocationCmd {
    /// Save the location of a network
    Add {
        bssid: String,
        ssid: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Accuracy radius in meters
        #[arg(long, default_value_t = 0.0)]
        accuracy: f32,
        #[arg(long)]
        name: Option<String>,
    },
    /// List saved locations
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Give a saved location a name
    Rename { bssid: String, name: String },
    /// Forget a saved location
    Delete { bssid: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let settings = config::load_settings(cli.config.as_deref())?;
    debug!(?settings, "loaded settings");
    match cli.command {
        Commands::Version => {
            println!("inetify {} (core {})", env!("CARGO_PKG_VERSION"), inetify_core::version());
        }
        Commands::Test { link_type, ssid, bssid, subtype, server, title, retries, format } => {
            let link = match link_type {
                LinkKind::Wifi => LinkInfo::wifi(ssid.unwrap_or_default(), bssid.unwrap_or_default()),
                LinkKind::Mobile => LinkInfo::mobile(subtype.unwrap_or_default()),
                LinkKind::Other => LinkInfo {
                    link_type: LinkType::Other,
                    type_name: LinkType::Other.label().to_string(),
                    subtype_name: subtype,
                    connected: true,
                    ..LinkInfo::default()
                },
            };
            let base = settings.probe_config();
            let config = ProbeConfig {
                server: server.unwrap_or(base.server),
                title: title.unwrap_or(base.title),
                retries: retries.unwrap_or(base.retries).max(1),
                delay: Duration::ZERO,
                require_wifi: false,
            };
            let verifier = Arc::new(HttpTitleVerifier::new(fetch_options(&settings))?);
            let runner = ProbeRunner::from_config(&config, Arc::new(StaticLink(link)), verifier);
            let rt = tokio::runtime::Runtime::new()?;
            let outcome = rt.block_on(runner.run(&config, CancellationToken::new()));
            let Some(info) = outcome else {
                bail!("no connection to test");
            };
            match format {
                OutputFormat::Text => println!("{info}"),
                OutputFormat::Json => println!("{}", serde_json::to_string(&info)?),
                OutputFormat::Csv => {
                    let mut wtr = csv::Writer::from_writer(std::io::stdout());
                    wtr.serialize(&info)?;
                    wtr.flush()?;
                }
            }
        }
        Commands::Watch { format } => {
            let rt = tokio::runtime::Runtime::new()?;
            let res = rt.block_on(run_watch(settings, format));
            // stdin is read on a blocking thread that may never return
            rt.shutdown_timeout(Duration::from_millis(100));
            res?;
        }
        Commands::Ignore { cmd } => {
            let db = Db::new(&settings.database);
            match cmd {
                IgnoreCmd::Add { bssid, ssid } => {
                    if !db.add_ignored(&bssid, &ssid)? {
                        bail!("BSSID and SSID must not be empty");
                    }
                    println!("ignoring {ssid} ({bssid})");
                }
                IgnoreCmd::List { format } => {
                    let rows = db.fetch_ignored()?;
                    match format {
                        OutputFormat::Text => {
                            for r in &rows { println!("{}\t{}", r.bssid, r.ssid); }
                        }
                        OutputFormat::Json => println!("{}", serde_json::to_string(&rows)?),
                        OutputFormat::Csv => {
                            let mut wtr = csv::Writer::from_writer(std::io::stdout());
                            for r in &rows { wtr.serialize(r)?; }
                            wtr.flush()?;
                        }
                    }
                }
                IgnoreCmd::Delete { ssid } => {
                    if db.delete_ignored(&ssid)? {
                        println!("no longer ignoring {ssid}");
                    } else {
                        println!("{ssid} was not ignored");
                    }
                }
                IgnoreCmd::Check { ssid } => {
                    println!("{}", db.is_ignored(&ssid)?);
                }
            }
            db.close();
        }
        Commands::Location { cmd } => {
            let db = Db::new(&settings.database);
            match cmd {
                LocationCmd::Add { bssid, ssid, lat, lon, accuracy, name } => {
                    let location = Coordinate {
                        latitude: lat,
                        longitude: lon,
                        accuracy,
                        time: inetify_core::now_millis(),
                    };
                    if !db.add_location(&bssid, &ssid, name.as_deref(), &location)? {
                        bail!("BSSID and SSID must not be empty");
                    }
                    println!("saved location of {ssid} ({bssid})");
                }
                LocationCmd::List { format } => {
                    let rows = db.fetch_locations()?;
                    match format {
                        OutputFormat::Text => {
                            for r in &rows {
                                println!(
                                    "{}\t{}\t{}\t{:.6},{:.6} ±{}m",
                                    r.bssid,
                                    r.ssid,
                                    r.name.as_deref().unwrap_or("-"),
                                    r.location.latitude,
                                    r.location.longitude,
                                    r.location.accuracy
                                );
                            }
                        }
                        OutputFormat::Json => println!("{}", serde_json::to_string(&rows)?),
                        OutputFormat::Csv => write_locations_csv(std::io::stdout(), &rows)?,
                    }
                }
                LocationCmd::Rename { bssid, name } => {
                    if !db.rename_location(&bssid, &name)? {
                        bail!("no saved location for {bssid}");
                    }
                    println!("renamed {bssid} to {name}");
                }
                LocationCmd::Delete { bssid } => {
                    if !db.delete_location(&bssid)? {
                        bail!("no saved location for {bssid}");
                    }
                    println!("deleted location of {bssid}");
                }
            }
            db.close();
        }
    }
    Ok(())
}

fn fetch_options(settings: &Settings) -> TitleFetchOptions {
    TitleFetchOptions { timeout_ms: settings.timeout_ms, ..TitleFetchOptions::default() }
}

/// Feeds link state read from stdin to a scheduler until EOF or Ctrl-C.
async fn run_watch(settings: Settings, format: NotifyFormat) -> Result<()> {
    if !settings.enabled {
        warn!("connectivity checks are disabled, set `enabled: true` in {}", config::CONFIG_FILE_NAME);
    }
    let (link_tx, link_rx) = watch::channel(LinkInfo::disconnected());
    let verifier = Arc::new(HttpTitleVerifier::new(fetch_options(&settings))?);
    let tester = Arc::new(ProbeRunner::from_config(&settings.probe_config(), Arc::new(WatchedLink(link_rx)), verifier));
    let store = Arc::new(Db::new(&settings.database));
    let notifier = Arc::new(ConsoleNotifier::new(settings.clone(), format, std::io::stdout()));
    let handle = ProbeScheduler::new(&settings, tester, store, notifier).spawn();

    let shutdown = handle.shutdown_token();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted, shutting down");
                shutdown.cancel();
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("end of input, waiting for the running probe");
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let info: LinkInfo = match serde_json::from_str(line) {
            Ok(info) => info,
            Err(e) => {
                warn!("skipping malformed link state: {e}");
                continue;
            }
        };
        info!(connected = info.is_connected(), ssid = ?info.ssid, "link changed");
        link_tx.send_replace(info.clone());
        handle.send(LinkEvent::from(&info))?;
    }
    handle.finish().await;
    Ok(())
}

fn write_locations_csv<W: Write>(out: W, rows: &[inetify_core::WifiLocation]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["bssid", "ssid", "name", "latitude", "longitude", "accuracy", "time"])?;
    for r in rows {
        wtr.write_record([
            r.bssid.clone(),
            r.ssid.clone(),
            r.name.clone().unwrap_or_default(),
            r.location.latitude.to_string(),
            r.location.longitude.to_string(),
            r.location.accuracy.to_string(),
            r.location.time.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
