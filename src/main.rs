use chrono::{DateTime, Utc};
use clap::{Arg, ArgMatches, Command};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use packet_tracker::{
    Config, Result, TrackerError,
    network::{track, Address, GeoLite2Database, PacketCollection, PublicIpResolver, TrackedCapture},
    output::{write_document, write_output, KmlEncoder, MapEncoder},
    utils::{format_location, format_timestamp},
};

#[derive(Serialize)]
struct LocationReport<'a> {
    generated_at: DateTime<Utc>,
    capture: &'a str,
    public_address: &'a Address,
    resolved_packets: usize,
    packets: &'a PacketCollection,
}

fn common_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config/default.json")
        )
        .arg(
            Arg::new("pcap")
                .short('p')
                .long("pcap")
                .value_name("PATH")
                .help("Packet capture file to read")
        )
        .arg(
            Arg::new("geoip-db")
                .long("geoip-db")
                .value_name("PATH")
                .help("Path to GeoLite2 City database file")
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .value_name("URL")
                .help("Public IP discovery endpoint")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Output file path")
        )
}

fn cli() -> Command {
    Command::new("packet-tracker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Geolocates captured network traffic and maps where it went")
        .subcommand(common_args(
            Command::new("kml").about("Write packet paths as a KML document")
        ))
        .subcommand(common_args(
            Command::new("map")
                .about("Write packet paths on an interactive HTML map")
                .arg(
                    Arg::new("zoom")
                        .long("zoom")
                        .value_name("LEVEL")
                        .help("Initial map zoom level")
                )
        ))
        .subcommand(common_args(
            Command::new("locate").about("Print packet endpoint locations and save a JSON report")
        ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let (mode, sub_matches) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => {
            eprintln!("No subcommand provided. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    let config_path = sub_matches.get_one::<String>("config").map(String::as_str);
    let (mut config, from_file) = match config_path {
        Some(path) if Path::new(path).exists() => (Config::from_file(path)?, true),
        _ => (Config::default(), false),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if !from_file {
        info!("Config file not found, using defaults");
    }

    apply_arguments(&mut config, mode, sub_matches)?;

    match mode {
        "kml" => run_kml_mode(&config).await?,
        "map" => run_map_mode(&config).await?,
        "locate" => run_locate_mode(&config).await?,
        _ => unreachable!("subcommands are defined in cli()"),
    }

    Ok(())
}

fn apply_arguments(config: &mut Config, mode: &str, matches: &ArgMatches) -> Result<()> {
    if let Some(pcap) = matches.get_one::<String>("pcap") {
        config.capture.pcap_path = pcap.clone();
    }
    if let Some(db) = matches.get_one::<String>("geoip-db") {
        config.geolocation.database_path = db.clone();
    }
    if let Some(endpoint) = matches.get_one::<String>("endpoint") {
        config.public_ip.endpoint = endpoint.clone();
    }
    if let Some(output) = matches.get_one::<String>("output") {
        match mode {
            "kml" => config.output.kml_path = output.clone(),
            "map" => config.output.map_path = output.clone(),
            _ => config.output.report_path = output.clone(),
        }
    }
    if mode == "map" {
        if let Some(zoom) = matches.get_one::<String>("zoom") {
            config.output.map_zoom = zoom.parse()
                .map_err(|_| TrackerError::Parse(format!("Invalid zoom level: {}", zoom)))?;
        }
    }
    Ok(())
}

async fn run_pipeline(config: &Config) -> Result<TrackedCapture> {
    info!("Tracking packets in {}", config.capture.pcap_path);
    let resolver = PublicIpResolver::new(config.public_ip.endpoint.clone());
    info!("Discovering public address via {}", resolver.endpoint());
    let overrides = config.overrides()?;
    let database_path = config.geolocation.database_path.clone();

    track(
        PathBuf::from(&config.capture.pcap_path),
        &resolver,
        &overrides,
        || GeoLite2Database::open(&database_path),
    )
    .await
}

async fn run_kml_mode(config: &Config) -> Result<()> {
    let tracked = run_pipeline(config).await?;
    write_document(&KmlEncoder, &tracked.packets, &config.output.kml_path)?;

    info!("KML document saved to: {}", config.output.kml_path);
    Ok(())
}

async fn run_map_mode(config: &Config) -> Result<()> {
    let tracked = run_pipeline(config).await?;
    let encoder = MapEncoder::centered_on(&tracked.public_address, config.output.map_zoom);
    write_document(&encoder, &tracked.packets, &config.output.map_path)?;

    info!("Map saved to: {}", config.output.map_path);
    Ok(())
}

async fn run_locate_mode(config: &Config) -> Result<()> {
    let tracked = run_pipeline(config).await?;
    let generated_at = Utc::now();

    println!("\n=== PACKET LOCATIONS ===");
    println!("Capture: {}", config.capture.pcap_path);
    println!("Generated: {}", format_timestamp(generated_at));
    println!(
        "Public address: {} ({})",
        tracked.public_address,
        tracked.public_address.location().as_ref().map(format_location).unwrap_or_default()
    );

    println!("\n--- Packets ---");
    for packet in &tracked.packets {
        let source = packet.source();
        let destination = packet.destination();
        println!(
            "{} [{}] --> {} [{}]",
            source,
            source.location().as_ref().map(format_location).unwrap_or_default(),
            destination,
            destination.location().as_ref().map(format_location).unwrap_or_default(),
        );
    }
    println!(
        "\n{} of {} packets have both endpoints located",
        tracked.packets.resolved_count(),
        tracked.packets.len()
    );

    let report = LocationReport {
        generated_at,
        capture: &config.capture.pcap_path,
        public_address: &tracked.public_address,
        resolved_packets: tracked.packets.resolved_count(),
        packets: &tracked.packets,
    };

    let json_output = serde_json::to_string_pretty(&report)?;
    write_output(&config.output.report_path, json_output)?;

    info!("Location report saved to: {}", config.output.report_path);
    Ok(())
}
