use std::fs;
use std::path::Path;

use anyhow::anyhow;
use filetime::FileTime;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::archive::cancel::CancelToken;
use crate::archive::error::ArchiveError;

/// Copy every direct entry of `source` into `destination`.
///
/// `destination` and any missing parents are created. Directories are copied
/// recursively, files keep their permissions and timestamps, and existing
/// destination entries are overwritten. Symbolic links are never followed.
///
/// Returns the number of files copied.
pub fn copy_library(
    source: &Path,
    destination: &Path,
    cancel: &CancelToken,
) -> Result<u64, ArchiveError> {
    if !source.exists() {
        return Err(ArchiveError::PathNotFound(source.to_path_buf()));
    }

    fs::create_dir_all(destination)
        .map_err(|e| ArchiveError::io(destination, e, "create directory"))?;

    let entries = fs::read_dir(source).map_err(|e| ArchiveError::io(source, e, "read"))?;
    let mut copied = 0;

    for entry in entries {
        cancel.check()?;

        let entry = entry.map_err(|e| ArchiveError::io(source, e, "read"))?;
        let src = entry.path();
        let dst = destination.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| ArchiveError::io(&src, e, "inspect"))?;

        if file_type.is_dir() {
            copied += copy_dir(&src, &dst, cancel)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src, &dst)?;
        } else {
            copy_file(&src, &dst)?;
            copied += 1;
        }
    }

    debug!("Copied {} files from {} to {}", copied, source.display(), destination.display());
    Ok(copied)
}

/// Recursively copy `src` to `dst` without following links.
fn copy_dir(src: &Path, dst: &Path, cancel: &CancelToken) -> Result<u64, ArchiveError> {
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        cancel.check()?;

        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            match e.into_io_error() {
                Some(io_err) => ArchiveError::io(&path, io_err, "read"),
                None => ArchiveError::Unexpected(anyhow!("Failed to walk {}", path.display())),
            }
        })?;

        let rel_path = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ArchiveError::Unexpected(anyhow!(e)))?;
        let target = dst.join(rel_path);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| ArchiveError::io(&target, e, "create directory"))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy a regular file, carrying permissions and access/modification times.
fn copy_file(src: &Path, dst: &Path) -> Result<(), ArchiveError> {
    // fs::copy would write through a link sitting at the destination
    if let Ok(meta) = fs::symlink_metadata(dst) {
        if meta.file_type().is_symlink() {
            fs::remove_file(dst).map_err(|e| ArchiveError::io(dst, e, "replace"))?;
        }
    }

    fs::copy(src, dst).map_err(|e| ArchiveError::io(src, e, "copy"))?;

    let metadata = fs::metadata(src).map_err(|e| ArchiveError::io(src, e, "inspect"))?;
    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    if let Err(e) = filetime::set_file_times(dst, atime, mtime) {
        debug!("Could not preserve timestamps on {}: {}", dst.display(), e);
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), ArchiveError> {
    let target = fs::read_link(src).map_err(|e| ArchiveError::io(src, e, "read link"))?;

    if let Ok(existing) = fs::symlink_metadata(dst) {
        if existing.is_dir() {
            warn!("Skipping link {}: a directory already exists at {}", src.display(), dst.display());
            return Ok(());
        }
        fs::remove_file(dst).map_err(|e| ArchiveError::io(dst, e, "replace"))?;
    }

    std::os::unix::fs::symlink(&target, dst).map_err(|e| ArchiveError::io(dst, e, "create link"))?;
    debug!("Recreated link {} -> {}", dst.display(), target.display());
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dst: &Path) -> Result<(), ArchiveError> {
    warn!("Skipping symbolic link {}", src.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    use crate::test_utils::create_music_library;

    #[test]
    fn test_copy_library_copies_tree() {
        let library = create_music_library().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("backup").join("2024");

        let copied = copy_library(library.path(), &destination, &CancelToken::new()).unwrap();

        assert_eq!(copied, 4);
        assert_eq!(fs::read(destination.join("readme.txt")).unwrap(), b"Library notes");
        assert_eq!(
            fs::read(destination.join("album/track.mp3")).unwrap(),
            b"ID3 fake mp3 payload"
        );
        assert!(destination.join("album/disc2/track.flac").exists());
        assert!(destination.join("empty").is_dir());
    }

    #[test]
    fn test_copy_library_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("missing");

        let result = copy_library(&source, &temp_dir.path().join("out"), &CancelToken::new());

        assert!(matches!(result, Err(ArchiveError::PathNotFound(ref p)) if *p == source));
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_copy_library_overwrites_existing() {
        let library = create_music_library().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("2024");
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("readme.txt"), b"stale contents that are longer").unwrap();

        copy_library(library.path(), &destination, &CancelToken::new()).unwrap();

        assert_eq!(fs::read(destination.join("readme.txt")).unwrap(), b"Library notes");
    }

    #[test]
    fn test_copy_preserves_modification_time() {
        let library = create_music_library().unwrap();
        let source_file = library.path().join("readme.txt");
        let past = SystemTime::now() - Duration::from_secs(7 * 24 * 3600);
        filetime::set_file_mtime(&source_file, FileTime::from_system_time(past)).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("2024");
        copy_library(library.path(), &destination, &CancelToken::new()).unwrap();

        let src_mtime = FileTime::from_last_modification_time(&fs::metadata(&source_file).unwrap());
        let dst_mtime = FileTime::from_last_modification_time(
            &fs::metadata(destination.join("readme.txt")).unwrap(),
        );
        assert_eq!(src_mtime.unix_seconds(), dst_mtime.unix_seconds());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let library = create_music_library().unwrap();
        let notes = library.path().join("readme.txt");
        let track = library.path().join("album/track.mp3");
        fs::set_permissions(&notes, fs::Permissions::from_mode(0o640)).unwrap();
        fs::set_permissions(&track, fs::Permissions::from_mode(0o755)).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("2024");
        copy_library(library.path(), &destination, &CancelToken::new()).unwrap();

        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&destination.join("readme.txt")), 0o640);
        assert_eq!(mode(&destination.join("album/track.mp3")), 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_keeps_symlinks_as_links() {
        let library = create_music_library().unwrap();
        std::os::unix::fs::symlink("album/track.mp3", library.path().join("favourite.mp3")).unwrap();
        std::os::unix::fs::symlink("../readme.txt", library.path().join("album/notes.txt")).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("2024");
        copy_library(library.path(), &destination, &CancelToken::new()).unwrap();

        let top = fs::symlink_metadata(destination.join("favourite.mp3")).unwrap();
        assert!(top.file_type().is_symlink());
        assert_eq!(
            fs::read_link(destination.join("favourite.mp3")).unwrap(),
            Path::new("album/track.mp3")
        );

        let nested = fs::symlink_metadata(destination.join("album/notes.txt")).unwrap();
        assert!(nested.file_type().is_symlink());
    }

    #[test]
    fn test_copy_library_cancelled() {
        let library = create_music_library().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let token = CancelToken::new();
        token.cancel();

        let result = copy_library(library.path(), &temp_dir.path().join("2024"), &token);

        assert!(matches!(result, Err(ArchiveError::Cancelled)));
    }
}
