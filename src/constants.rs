//! Global constants for the music-archiver application.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

// Settings file layout
/// Directory under the user's home that holds the settings file
pub const CONFIG_DIR_NAME: &str = ".MusicArchiver";

/// Settings file name
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Environment variable that overrides the settings file location
pub const CONFIG_PATH_ENV_VAR: &str = "MUSIC_ARCHIVER_CONFIG";

/// INI section holding provider credentials
pub const CREDENTIALS_SECTION: &str = "AWS";

/// INI section holding archive defaults
pub const DEFAULTS_SECTION: &str = "DEFAULT";

pub const KEY_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const KEY_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const KEY_REGION: &str = "aws_region";
pub const KEY_STORAGE_CLASS: &str = "s3_storage_class";
pub const KEY_ZIP_TEMP_DIR: &str = "zip_temp_dir";

// Setting defaults
/// Region used when the settings file does not name one
pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// Storage class used when the settings file does not name one
pub const DEFAULT_STORAGE_CLASS: &str = "DEEP_ARCHIVE";

/// Archive output directory used when the settings file does not name one
pub const DEFAULT_ZIP_TEMP_DIR: &str = ".";

/// Storage classes S3 accepts for PutObject
pub const KNOWN_STORAGE_CLASSES: &[&str] = &[
    "STANDARD",
    "REDUCED_REDUNDANCY",
    "STANDARD_IA",
    "ONEZONE_IA",
    "INTELLIGENT_TIERING",
    "GLACIER",
    "GLACIER_IR",
    "DEEP_ARCHIVE",
];

// Compression
/// Large file threshold for compression decisions (100MB)
pub const LARGE_FILE_COMPRESSION_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Entries at or above this size need zip64 extensions
pub const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Deflate level for already-compressed or very large files
pub const FAST_COMPRESSION_LEVEL: i32 = 1;

/// Deflate level for everything else
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 6;

/// Extensions whose content is already compressed, mostly audio and cover art
pub const COMPRESSED_EXTENSIONS: &[&str] = &[
    "mp3", "m4a", "aac", "ogg", "oga", "opus", "flac", "wma", "ape", "wv", "zip", "gz", "xz",
    "bz2", "7z", "rar", "jpg", "jpeg", "png", "gif", "webp", "mp4", "m4v", "mov", "mkv",
];

// Upload
/// Read buffer used when streaming the archive body to S3 (1MB)
pub const UPLOAD_READ_BUFFER_SIZE: usize = 1024 * 1024;

// Job execution
/// Capacity of the status channel between a job worker and its consumer
pub const STATUS_CHANNEL_CAPACITY: usize = 64;

/// Name given to the background job thread
pub const JOB_THREAD_NAME: &str = "archive-job";
