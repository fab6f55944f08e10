use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::{info, warn, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode, ColorChoice};

use music_archiver::archive::{self, compress::archive_root_name, ArchivePipeline, JobEvent};
use music_archiver::cli::{Args, Commands, ConfigAction, RunOpts, SetOpts};
use music_archiver::cloud::S3Store;
use music_archiver::config::{ConfigStore, InvalidReason, LoadState, Settings};
use music_archiver::constants::KNOWN_STORAGE_CLASSES;
use music_archiver::models::ArchiveJob;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    let mut store = match &args.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::at_default_location(),
    };

    match &args.command {
        Commands::Run(opts) => run_archive(&mut store, opts),
        Commands::Config { action } => handle_config(&mut store, action),
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

/// Validate input, confirm, reload settings and run one archive job
fn run_archive(store: &mut ConfigStore, opts: &RunOpts) -> Result<()> {
    let job = validate_request(opts)?;

    if !opts.yes && !confirm(&job)? {
        info!("Archive cancelled");
        return Ok(());
    }

    // Pick up edits made since the last run
    if !store.load() {
        warn!(
            "Settings in {} are unusable ({}); run `music-archiver config set` to fix them",
            store.path().display(),
            store.state()
        );
    }

    let pipeline = ArchivePipeline::new(store.snapshot(), S3Store::new());
    let handle = archive::spawn(pipeline, job)?;

    let mut outcome = None;
    for event in handle {
        match event {
            JobEvent::Status(status) => println!("{}", status),
            JobEvent::Finished(result) => outcome = Some(result),
        }
    }
    let outcome = outcome.ok_or_else(|| anyhow!("Archive job ended without an outcome"))?;

    if !outcome.success {
        bail!("Archive job failed: {}", outcome.message);
    }

    if opts.json {
        if let Some(report) = &outcome.report {
            let json = serde_json::to_string_pretty(report).context("Failed to serialize job report")?;
            println!("{}", json);
        }
    }

    info!("{}", outcome.message);
    Ok(())
}

/// Reject empty fields and a missing source before anything touches disk
fn validate_request(opts: &RunOpts) -> Result<ArchiveJob> {
    let source = opts.source.trim();
    let destination = opts.destination.trim();
    let bucket = opts.bucket.trim();

    if source.is_empty() || destination.is_empty() || bucket.is_empty() {
        bail!("Source, destination and bucket are all required");
    }
    if !Path::new(source).exists() {
        bail!("Source directory {} does not exist", source);
    }

    Ok(ArchiveJob::new(source, destination, bucket))
}

/// Show what is about to happen and ask for a yes/no answer on stdin
fn confirm(job: &ArchiveJob) -> Result<bool> {
    let zip_name = archive_root_name(&job.destination_dir)
        .map(|name| format!("{}.zip", name))
        .unwrap_or_else(|_| "<unknown>.zip".to_string());

    println!("About to run:");
    println!("  1. source:      {}", job.source_dir.display());
    println!("  2. destination: {}", job.destination_dir.display());
    println!("  3. zip file:    {}", zip_name);
    println!("  4. upload to:   s3://{}/", job.bucket);
    print!("Proceed? [y/N] ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Handle the `config` subcommands
fn handle_config(store: &mut ConfigStore, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
        ConfigAction::Show => {
            store.load();
            let settings = store.snapshot();
            println!("file:                  {}", store.path().display());
            println!("state:                 {}", store.state());
            println!("aws_access_key_id:     {}", settings.access_key_id);
            println!("aws_secret_access_key: {}", settings.masked_secret());
            println!("aws_region:            {}", settings.region);
            println!("s3_storage_class:      {}", settings.storage_class);
            println!("zip_temp_dir:          {}", settings.archive_temp_dir.display());
            Ok(())
        }
        ConfigAction::Set(opts) => {
            store.load();
            ensure_safe_to_overwrite(store.state(), opts)?;
            let settings = apply_overrides(store.snapshot(), opts);

            if !KNOWN_STORAGE_CLASSES.contains(&settings.storage_class.as_str()) {
                warn!("Storage class '{}' is not one S3 recognizes", settings.storage_class);
            }
            if !settings.has_credentials() {
                warn!("Access key id or secret access key is still empty");
            }

            if !store.save(settings) {
                bail!("Failed to save settings to {}", store.path().display());
            }
            info!("Settings saved to {}", store.path().display());
            Ok(())
        }
    }
}

/// Refuse to replace a file that could not be read unless every field is given,
/// otherwise credentials stored in it would be lost.
fn ensure_safe_to_overwrite(state: LoadState, opts: &SetOpts) -> Result<()> {
    if state != LoadState::Invalid(InvalidReason::ParseError) {
        return Ok(());
    }

    let complete = opts.access_key_id.is_some()
        && opts.secret_access_key.is_some()
        && opts.region.is_some()
        && opts.storage_class.is_some()
        && opts.zip_temp_dir.is_some();
    if !complete {
        bail!(
            "Existing settings file could not be read; fix it by hand or pass every field \
             (--access-key-id, --secret-access-key, --region, --storage-class, --zip-temp-dir)"
        );
    }

    warn!("Replacing unreadable settings file");
    Ok(())
}

/// Overlay the fields given on the command line onto `current`
fn apply_overrides(current: Settings, opts: &SetOpts) -> Settings {
    Settings {
        access_key_id: opts.access_key_id.clone().unwrap_or(current.access_key_id),
        secret_access_key: opts.secret_access_key.clone().unwrap_or(current.secret_access_key),
        region: opts.region.clone().unwrap_or(current.region),
        storage_class: opts.storage_class.clone().unwrap_or(current.storage_class),
        archive_temp_dir: opts.zip_temp_dir.clone().unwrap_or(current.archive_temp_dir),
    }
}
