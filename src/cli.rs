use clap::{Parser, Subcommand, Args as ClapArgs};
use std::path::PathBuf;

/// Command-line arguments for the music-archiver tool.
///
/// The `run` subcommand archives a library; `config` inspects or edits the
/// settings file that holds credentials and archive defaults.
#[derive(Parser, Debug)]
#[clap(name = "music-archiver", about = "Copy a music library, zip it and upload it to S3", version)]
pub struct Args {
    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Path to the settings file (default: ~/.MusicArchiver/config.ini)
    #[clap(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy, compress and upload a music library
    Run(RunOpts),

    /// Show or change stored settings
    Config {
        #[clap(subcommand)]
        action: ConfigAction,
    },
}

/// Options for a single archive job.
#[derive(ClapArgs, Debug, Clone)]
pub struct RunOpts {
    /// Current music directory (copy source)
    #[clap(short, long)]
    pub source: String,

    /// Destination directory; its last component also names the zip file
    #[clap(short, long)]
    pub destination: String,

    /// S3 bucket that receives the archive
    #[clap(short, long)]
    pub bucket: String,

    /// Skip the confirmation prompt
    #[clap(short = 'y', long)]
    pub yes: bool,

    /// Print a JSON job report after a successful run
    #[clap(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current settings with the secret redacted
    Show,

    /// Print the settings file location
    Path,

    /// Store settings; omitted fields keep their current values
    Set(SetOpts),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SetOpts {
    /// AWS access key id
    #[clap(long)]
    pub access_key_id: Option<String>,

    /// AWS secret access key
    #[clap(long)]
    pub secret_access_key: Option<String>,

    /// AWS region, e.g. ap-northeast-1
    #[clap(long)]
    pub region: Option<String>,

    /// S3 storage class, e.g. DEEP_ARCHIVE
    #[clap(long)]
    pub storage_class: Option<String>,

    /// Directory where zip files are written before upload
    #[clap(long)]
    pub zip_temp_dir: Option<PathBuf>,
}
