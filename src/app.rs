use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use hbbatch::config::EncodingConfig;
use hbbatch::engine::encoder::select_encoder;
use hbbatch::engine::hardware::{self, Capabilities, HardwareCapability};
use hbbatch::engine::probe::{Ffprobe, Prober};
use hbbatch::engine::{self, Orchestrator, SystemLauncher, TranscodeCommand};
use hbbatch::logging;
use hbbatch::stats::{human_readable_bitrate, human_readable_size};
use std::path::Path;
use tracing::{debug, info};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::CheckTools) => {
            logging::init_console(cli.verbose)?;
            handle_check_tools(&cli.config)
        }
        Some(Commands::Probe { ref file }) => {
            logging::init_console(cli.verbose)?;
            handle_probe(&cli.config, file)
        }
        Some(Commands::DryRun) => {
            logging::init_console(cli.verbose)?;
            handle_dry_run(&cli.config)
        }
        None => {
            let log_path = logging::init(&cli.log_dir, cli.verbose)?;
            debug!("Logging to {}", log_path.display());
            handle_batch(&cli.config)
        }
    }
}

fn load_config(path: &Path) -> Result<EncodingConfig> {
    EncodingConfig::load(path).context("Failed to load configuration")
}

/// Tool names from the config when it is present, else the defaults
fn tool_names(config_path: &Path) -> (String, String) {
    if config_path.exists() {
        if let Ok(config) = EncodingConfig::load(config_path) {
            return (config.transcoder, config.prober);
        }
    }
    ("HandBrakeCLI".to_string(), "ffprobe".to_string())
}

fn announce_hardware(hardware: HardwareCapability) {
    if hardware.is_accelerated() {
        info!("GPU acceleration ({}) will be used when possible", hardware);
    } else {
        info!("No compatible GPU detected, using CPU encoding");
    }
}

fn handle_batch(config_path: &Path) -> Result<()> {
    info!("Transcoding script started");

    let config = load_config(config_path)?;

    let capabilities = Capabilities::detect(&config.transcoder);
    announce_hardware(capabilities.hardware);

    let launcher = SystemLauncher;
    let prober = Ffprobe::new(&config.prober);
    let mut orchestrator = Orchestrator::new(&config, capabilities, &launcher, &prober);

    let summary = engine::process(&config, |job| orchestrator.run(job))
        .context("Batch aborted")?;

    info!("{}", summary);
    Ok(())
}

fn handle_check_tools(config_path: &Path) -> Result<()> {
    let (transcoder, prober) = tool_names(config_path);

    let detected = hardware::detect();
    println!("GPU acceleration: {}", detected);

    let transcoder_found = hardware::tool_available(&transcoder);
    let prober_found = hardware::tool_available(&prober);
    for (name, found) in [(&transcoder, transcoder_found), (&prober, prober_found)] {
        println!("{}: {}", name, if found { "found" } else { "not found" });
    }

    if !transcoder_found || !prober_found {
        bail!("Required tools are missing");
    }
    Ok(())
}

fn handle_probe(config_path: &Path, file: &Path) -> Result<()> {
    let (_, prober) = tool_names(config_path);
    let info = Ffprobe::new(prober)
        .probe(file)
        .with_context(|| format!("Failed to probe {}", file.display()))?;

    let codec = |name: Option<&str>| name.unwrap_or("none").to_string();
    println!("File: {}", info.path.display());
    println!(
        "Video codec: {}",
        codec(info.video.as_ref().map(|v| v.codec_name.as_str()))
    );
    println!(
        "Audio codec: {}",
        codec(info.audio.as_ref().map(|a| a.codec_name.as_str()))
    );
    println!(
        "Resolution: {}",
        info.resolution().unwrap_or_else(|| "N/A".to_string())
    );
    println!("Bitrate: {}", human_readable_bitrate(info.bitrate));
    println!("Duration: {:.2} seconds", info.duration_seconds);
    println!("File size: {}", human_readable_size(info.file_size_bytes));
    Ok(())
}

fn handle_dry_run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    let detected = hardware::detect();
    announce_hardware(detected);
    let encoder = select_encoder(&config.video_codec, detected);

    println!(
        "Dry run: HandBrakeCLI commands for {}",
        config.input_directory.display()
    );
    let jobs = engine::plan_jobs(&config);
    if jobs.is_empty() {
        println!("No matching files found");
    }
    for job in &jobs {
        let command = TranscodeCommand::new(job, &config, encoder);
        println!("[{}/{}] {}", job.sequence_index, job.total_jobs, command);
    }
    Ok(())
}
