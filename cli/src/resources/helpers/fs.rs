//! File-system resource helpers.
use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Suffix appended to a destination moved aside by `--backup`.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Whether anything (including a dangling symlink) exists at `path`.
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Remove whatever is at `path`: a file, a symlink (never its target) or a
/// directory tree. Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_path(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("remove directory: {}", path.display()))?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}

/// Copy a file or a directory tree from `src` to `dst`.
///
/// Symlinks inside a copied tree are followed and their content copied.
///
/// # Errors
///
/// Returns an error if a source entry cannot be read or a destination entry
/// cannot be written.
pub fn copy_path(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dst)
    } else {
        std::fs::copy(src, dst)
            .map(|_| ())
            .with_context(|| format!("copying {} to {}", src.display(), dst.display()))
    }
}

/// Recursively copy a directory tree.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;
    for entry in
        std::fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        copy_path(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}

/// Lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Whether `dst` holds the same content as `src`: identical file digests, or
/// for directories the same entry names with identical content throughout.
///
/// # Errors
///
/// Returns an error if either side cannot be read.
pub fn same_content(src: &Path, dst: &Path) -> Result<bool> {
    match (src.is_dir(), dst.is_dir()) {
        (true, true) => {
            let src_names = sorted_names(src)?;
            if src_names != sorted_names(dst)? {
                return Ok(false);
            }
            for name in src_names {
                if !same_content(&src.join(&name), &dst.join(&name))? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (false, false) => Ok(file_digest(src)? == file_digest(dst)?),
        _ => Ok(false),
    }
}

fn sorted_names(dir: &Path) -> Result<Vec<std::ffi::OsString>> {
    let mut names = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("reading entry in {}", dir.display()))?;
    names.sort();
    Ok(names)
}

/// Path a destination is moved to by `--backup`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Move `path` to its [`backup_path`], replacing an older backup.
///
/// # Errors
///
/// Returns an error if the old backup cannot be removed or the rename fails.
pub fn backup(path: &Path) -> Result<PathBuf> {
    let target = backup_path(path);
    remove_path(&target)?;
    std::fs::rename(path, &target)
        .with_context(|| format!("backup {} to {}", path.display(), target.display()))?;
    Ok(target)
}
