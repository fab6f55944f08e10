use std::fs;
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context};
use log::{debug, info};
use walkdir::WalkDir;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::archive::cancel::CancelToken;
use crate::archive::error::ArchiveError;
use crate::constants::{
    COMPRESSED_EXTENSIONS, DEFAULT_COMPRESSION_LEVEL, FAST_COMPRESSION_LEVEL,
    LARGE_FILE_COMPRESSION_THRESHOLD, ZIP64_THRESHOLD,
};

/// Name of the folder at the root of the archive: the last component of `dir`.
///
/// Trailing separators and `.` components are ignored. When the path ends
/// in `..` or is a bare root, the canonical form is consulted instead.
pub fn archive_root_name(dir: &Path) -> Result<String, ArchiveError> {
    if let Some(name) = dir.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }

    let canonical = dir
        .canonicalize()
        .map_err(|e| ArchiveError::io(dir, e, "resolve"))?;
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ArchiveError::Unexpected(anyhow!("Cannot name an archive after {}", dir.display()))
        })
}

/// Deflate options for `path`, given its size in bytes.
///
/// Audio, images and other already-compressed content, as well as very large
/// files, use the fastest level; everything else uses the default level.
pub fn get_compression_options(path: &Path, size: u64) -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(compression_level(path, size)))
        .large_file(size >= ZIP64_THRESHOLD)
}

/// Deflate level for `path`: fast for compressed media and large files.
fn compression_level(path: &Path, size: u64) -> i32 {
    let low_compression = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => COMPRESSED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    };

    if low_compression || size > LARGE_FILE_COMPRESSION_THRESHOLD {
        FAST_COMPRESSION_LEVEL
    } else {
        DEFAULT_COMPRESSION_LEVEL
    }
}

/// Compress `dir` into `<output_dir>/<leaf>.zip`.
///
/// Every entry is stored under a single top-level folder named after the
/// last component of `dir`, as if the archive had been built from the parent
/// of `dir`. `output_dir` is created when missing and an existing archive of
/// the same name is replaced.
pub fn compress_directory(
    dir: &Path,
    output_dir: &Path,
    cancel: &CancelToken,
) -> Result<PathBuf, ArchiveError> {
    let start = Instant::now();

    if !dir.is_dir() {
        return Err(ArchiveError::PathNotFound(dir.to_path_buf()));
    }

    let root_name = archive_root_name(dir)?;
    fs::create_dir_all(output_dir)
        .map_err(|e| ArchiveError::io(output_dir, e, "create directory"))?;
    let zip_path = output_dir.join(format!("{}.zip", root_name));

    info!("Compressing {} to {}", dir.display(), zip_path.display());

    let zip_file = fs::File::create(&zip_path)
        .map_err(|e| ArchiveError::io(&zip_path, e, "create"))?;
    // Resolved form, so the archive is recognised however output_dir is spelled
    let own_archive = zip_path
        .canonicalize()
        .map_err(|e| ArchiveError::io(&zip_path, e, "resolve"))?;
    let mut zip = ZipWriter::new(zip_file);

    zip.add_directory(format!("{}/", root_name), directory_options(dir))
        .context("Failed to add archive root")?;

    let mut file_count = 0u64;
    for entry in WalkDir::new(dir).min_depth(1).follow_links(false).sort_by_file_name() {
        cancel.check()?;

        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            match e.into_io_error() {
                Some(io_err) => ArchiveError::io(&path, io_err, "read"),
                None => ArchiveError::Unexpected(anyhow!("Failed to walk {}", path.display())),
            }
        })?;

        let path = entry.path();
        if is_own_archive(&entry, &own_archive) {
            debug!("Skipping the archive being written: {}", path.display());
            continue;
        }

        let rel_path = path
            .strip_prefix(dir)
            .map_err(|e| ArchiveError::Unexpected(anyhow!(e)))?;
        let name = format!("{}/{}", root_name, entry_name(rel_path));
        let file_type = entry.file_type();

        if file_type.is_dir() {
            zip.add_directory(format!("{}/", name), directory_options(path))
                .context(format!("Failed to add directory entry {}", name))?;
        } else if file_type.is_symlink() {
            add_symlink(&mut zip, path, &name)?;
        } else {
            add_file(&mut zip, path, &name)?;
            file_count += 1;
        }
    }

    zip.finish().context("Failed to finalize zip file")?;

    info!(
        "Compressed {} files into {} in {:?}",
        file_count,
        zip_path.display(),
        start.elapsed()
    );
    Ok(zip_path)
}

/// `entry` is the archive currently being written to `own_archive`.
fn is_own_archive(entry: &walkdir::DirEntry, own_archive: &Path) -> bool {
    entry.file_type().is_file()
        && Some(entry.file_name()) == own_archive.file_name()
        && entry
            .path()
            .canonicalize()
            .map(|resolved| resolved == own_archive)
            .unwrap_or(false)
}

/// Stream one file into the archive.
fn add_file(
    zip: &mut ZipWriter<fs::File>,
    path: &Path,
    name: &str,
) -> Result<(), ArchiveError> {
    let file = fs::File::open(path).map_err(|e| ArchiveError::io(path, e, "open"))?;
    let metadata = file.metadata().map_err(|e| ArchiveError::io(path, e, "inspect"))?;

    let options = with_permissions(get_compression_options(path, metadata.len()), &metadata);
    zip.start_file(name, options)
        .context(format!("Failed to start file entry for {}", name))?;

    let mut reader = BufReader::new(file);
    io::copy(&mut reader, zip).map_err(|e| ArchiveError::io(path, e, "compress"))?;

    debug!("Compressed {} ({} bytes)", name, metadata.len());
    Ok(())
}

#[cfg(unix)]
fn add_symlink(
    zip: &mut ZipWriter<fs::File>,
    path: &Path,
    name: &str,
) -> Result<(), ArchiveError> {
    let target = fs::read_link(path).map_err(|e| ArchiveError::io(path, e, "read link"))?;
    zip.add_symlink(name, target.to_string_lossy(), FileOptions::default())
        .context(format!("Failed to add link entry {}", name))?;
    Ok(())
}

#[cfg(not(unix))]
fn add_symlink(
    _zip: &mut ZipWriter<fs::File>,
    path: &Path,
    _name: &str,
) -> Result<(), ArchiveError> {
    log::warn!("Skipping symbolic link {}", path.display());
    Ok(())
}

/// Zip entry names always use forward slashes.
fn entry_name(rel_path: &Path) -> String {
    rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn directory_options(path: &Path) -> FileOptions {
    match fs::metadata(path) {
        Ok(metadata) => with_permissions(FileOptions::default(), &metadata),
        Err(_) => FileOptions::default(),
    }
}

#[cfg(unix)]
fn with_permissions(options: FileOptions, metadata: &fs::Metadata) -> FileOptions {
    use std::os::unix::fs::PermissionsExt;

    options.unix_permissions(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn with_permissions(options: FileOptions, _metadata: &fs::Metadata) -> FileOptions {
    options
}
