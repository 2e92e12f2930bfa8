use chrono::Duration;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::fs;
use std::process::ExitCode;
use thiserror::Error;

use asi_overlay::analysis::{
    box_mean, keogram, nearest_frame, AnalysisError, DEFAULT_FRAME_TOLERANCE_S,
};
use asi_overlay::calibration::CalibrationRegistry;
use asi_overlay::config::{Config, ConfigError};
use asi_overlay::mapper::{MapError, SkyMapper};
use asi_overlay::mask::MaskError;
use asi_overlay::station::StationCatalog;
use asi_overlay::stream::{
    FrameRecord, FrameStream, InMemoryFrameSource, SourceSlot, StreamError, StreamOptions,
};
use asi_overlay::time_range::{parse_duration, TimeRange, TimeRangeError};
use asi_overlay::track::{ground_track_from_tle, GroundTrack, TleTrackError};

#[derive(Parser)]
#[command(name = "asi-overlay")]
#[command(about = "Map satellite ground tracks into all-sky imager frames")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file and list its stations
    Validate { config: String },
    /// Look angles and pixels of a ground track
    Map {
        config: String,
        station: String,
        track: String,
    },
    /// Pixel rectangle of a fixed-size box along a ground track
    Mask {
        config: String,
        station: String,
        track: String,
        #[arg(long)]
        width_km: Option<f64>,
        #[arg(long)]
        height_km: Option<f64>,
    },
    /// Mean frame intensity inside the box along a ground track
    BoxMean {
        config: String,
        station: String,
        track: String,
        frames: String,
        #[arg(long)]
        width_km: Option<f64>,
        #[arg(long)]
        height_km: Option<f64>,
        /// Largest gap between a track sample and its frame, in seconds
        #[arg(long, default_value_t = DEFAULT_FRAME_TOLERANCE_S)]
        tolerance_s: i64,
    },
    /// Keogram of the frames in a time range
    Keogram {
        config: String,
        station: String,
        frames: String,
        #[arg(long)]
        start: String,
        /// Absolute time or `+duration` relative to start
        #[arg(long)]
        end: String,
    },
    /// Run the HTTP API
    Serve { config: String },
    /// Ground track of a two/three-line element set
    TleTrack {
        tle: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "3s")]
        step: String,
        /// Emission altitude to place every sample at
        #[arg(long)]
        altitude_km: Option<f64>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Error reading {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("Output error: {0}")]
    Output(#[from] serde_yaml::Error),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("Track samples need timestamps to be matched with frames")]
    UntimedTrack,
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Map(#[from] MapError),
    #[error("{0}")]
    Mask(#[from] MaskError),
    #[error("{0}")]
    Stream(#[from] StreamError),
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
    #[error("{0}")]
    TimeRange(#[from] TimeRangeError),
    #[error("{0}")]
    Tle(#[from] TleTrackError),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Map {
            config,
            station,
            track,
        } => map(&config, &station, &track),
        Commands::Mask {
            config,
            station,
            track,
            width_km,
            height_km,
        } => mask(&config, &station, &track, width_km, height_km),
        Commands::BoxMean {
            config,
            station,
            track,
            frames,
            width_km,
            height_km,
            tolerance_s,
        } => box_mean_along_track(
            &config,
            &station,
            &track,
            &frames,
            (width_km, height_km),
            Duration::seconds(tolerance_s),
        ),
        Commands::Keogram {
            config,
            station,
            frames,
            start,
            end,
        } => keogram_for_range(&config, &station, &frames, &start, &end),
        Commands::Serve { config } => serve(&config),
        Commands::TleTrack {
            tle,
            start,
            end,
            step,
            altitude_km,
        } => tle_track(&tle, &start, &end, &step, altitude_km),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_file(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })
}

fn read_yaml<T: DeserializeOwned>(path: &str) -> Result<T, CliError> {
    serde_yaml::from_str(&read_file(path)?).map_err(|source| CliError::Parse {
        path: path.to_string(),
        source,
    })
}

fn load(path: &str) -> Result<(Config, StationCatalog, CalibrationRegistry), CliError> {
    let config = Config::from_file(path)?;
    let catalog = config.catalog()?;
    let registry = config.load_calibrations(&catalog)?;
    Ok((config, catalog, registry))
}

fn box_size(config: &Config, width_km: Option<f64>, height_km: Option<f64>) -> (f64, f64) {
    let [width, height] = config.mapping.default_box_km;
    (width_km.unwrap_or(width), height_km.unwrap_or(height))
}

fn validate(path: &str) -> Result<(), CliError> {
    let (config, catalog, registry) = load(path)?;

    println!(
        "Config is valid ({} stations, {} calibrations, tolerance {}°)",
        catalog.len(),
        registry.len(),
        config.mapping.tolerance_deg
    );
    for station in catalog.all() {
        let calibration = match registry.get(&station.code) {
            Ok(record) => {
                let (rows, cols) = record.shape();
                format!("{}x{} @ {} km", rows, cols, record.reference_altitude_km())
            }
            Err(_) => "no calibration".to_string(),
        };
        println!(
            "  {} {}: {:.2}, {:.2} ({})",
            station.array, station.code, station.latitude_deg, station.longitude_deg, calibration
        );
    }
    Ok(())
}

fn map(config_path: &str, station: &str, track_path: &str) -> Result<(), CliError> {
    let (config, _, registry) = load(config_path)?;
    let track: GroundTrack = read_yaml(track_path)?;

    let mapper = SkyMapper::with_options(&registry, config.mapper_options());
    let (azel, pixels) = mapper.map_to_pixels(station, &track)?;

    for (i, (look, pixel)) in azel.iter().zip(&pixels).enumerate() {
        let pixel = match pixel {
            Some(p) => format!("x={} y={}", p.x, p.y),
            None => "out of frame".to_string(),
        };
        println!(
            "  {}: az {:.2}° el {:.2}° -> {}",
            i, look.azimuth_deg, look.elevation_deg, pixel
        );
    }
    Ok(())
}

fn mask(
    config_path: &str,
    station: &str,
    track_path: &str,
    width_km: Option<f64>,
    height_km: Option<f64>,
) -> Result<(), CliError> {
    let (config, _, registry) = load(config_path)?;
    let track: GroundTrack = read_yaml(track_path)?;
    let size = box_size(&config, width_km, height_km);

    let mapper = SkyMapper::with_options(&registry, config.mapper_options());
    let (rows, cols) = mapper.calibration(station)?.shape();
    let bounds = mapper.mask_bounds(station, &track, size)?;

    println!(
        "{} km x {} km box over {} steps of {}x{} frames",
        size.0,
        size.1,
        bounds.len(),
        rows,
        cols
    );
    for (i, b) in bounds.iter().enumerate() {
        match b {
            Some(b) => println!(
                "  {}: rows {}..={} cols {}..={} ({} px)",
                i,
                b.row_min,
                b.row_max,
                b.col_min,
                b.col_max,
                b.pixel_count()
            ),
            None => println!("  {}: out of frame", i),
        }
    }
    Ok(())
}

fn frame_source(station: &str, frames_path: &str) -> Result<InMemoryFrameSource, CliError> {
    let slots: Vec<SourceSlot> = read_yaml(frames_path)?;
    let mut source = InMemoryFrameSource::new();
    for slot in slots {
        source.insert_slot(station, slot);
    }
    Ok(source)
}

fn box_mean_along_track(
    config_path: &str,
    station: &str,
    track_path: &str,
    frames_path: &str,
    box_km: (Option<f64>, Option<f64>),
    tolerance: Duration,
) -> Result<(), CliError> {
    let (config, _, registry) = load(config_path)?;
    let track: GroundTrack = read_yaml(track_path)?;
    let size = box_size(&config, box_km.0, box_km.1);

    let mapper = SkyMapper::with_options(&registry, config.mapper_options());
    let mask = mapper.equal_area_mask(station, &track, size)?;
    let (_, rows, cols) = mask.shape();

    let times = track
        .iter()
        .map(|p| p.time)
        .collect::<Option<Vec<_>>>()
        .ok_or(CliError::UntimedTrack)?;
    let (Some(first), Some(last)) = (times.iter().min(), times.iter().max()) else {
        return Err(CliError::UntimedTrack);
    };
    let range = TimeRange::new(*first - tolerance, *last + tolerance + Duration::milliseconds(1))?;

    let mut stream = FrameStream::new(frame_source(station, frames_path)?);
    let options = StreamOptions {
        frame_shape: Some((rows, cols)),
    };
    stream.start(range, station, options)?;
    let batch = stream.drain_all()?;
    if !stream.warnings().is_empty() {
        println!("{} missing frames", stream.warnings().len());
    }

    let matched: Vec<FrameRecord> = times
        .iter()
        .map(|&t| match nearest_frame(batch.records(), t, tolerance) {
            Ok(record) => record.clone(),
            Err(_) => FrameRecord::missing(t, rows, cols),
        })
        .collect();

    let means = box_mean(&matched, &mask)?;
    for (t, mean) in times.iter().zip(means) {
        println!("  {}  {:.3}", t.to_rfc3339(), mean);
    }
    Ok(())
}

fn keogram_for_range(
    config_path: &str,
    station: &str,
    frames_path: &str,
    start: &str,
    end: &str,
) -> Result<(), CliError> {
    let (_, _, registry) = load(config_path)?;
    let record = registry
        .get(station)
        .map_err(|_| MapError::UnknownStation(station.to_string()))?;
    let range = TimeRange::parse(start, end)?;

    let mut stream = FrameStream::new(frame_source(station, frames_path)?);
    let options = StreamOptions {
        frame_shape: Some(record.shape()),
    };
    stream.start(range, station, options)?;
    let frames = stream
        .by_ref()
        .map(|step| step.map(|s| s.record))
        .collect::<Result<Vec<_>, _>>()?;

    let keogram = keogram(&frames, record)?;
    print!("{}", serde_yaml::to_string(&keogram)?);
    Ok(())
}

fn serve(path: &str) -> Result<(), CliError> {
    let (config, catalog, registry) = load(path)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(asi_overlay::web::run_server(config, catalog, registry))?;
    Ok(())
}

fn tle_track(
    path: &str,
    start: &str,
    end: &str,
    step: &str,
    altitude_km: Option<f64>,
) -> Result<(), CliError> {
    let tle = read_file(path)?;
    let range = TimeRange::parse(start, end)?;
    let step = parse_duration(step)?;

    let track = ground_track_from_tle(&tle, &range, step, altitude_km)?;
    log::info!("Propagated {} samples", track.len());
    print!("{}", serde_yaml::to_string(&track)?);
    Ok(())
}
