use chrono::{DateTime, Utc};
use log::warn;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{is_image_path, AssetDeleter, Gallery};
use crate::config::Config;
use crate::error::{Error, FetchError, Result};
use crate::logging::log_fs_modification;
use crate::types::{AssetId, PhotoAsset};

/// Gallery backed by a directory tree.
///
/// Asset ids are `/`-separated paths relative to the root, so they stay
/// stable across runs as long as files are not moved.
#[derive(Debug, Clone)]
pub struct DirectoryGallery {
    root: PathBuf,
    max_depth: Option<usize>,
    trash_dir: Option<PathBuf>,
}

impl DirectoryGallery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: None,
            trash_dir: None,
        }
    }

    /// Gallery using the traversal depth and trash directory from `config`
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self::new(root)
            .with_max_depth(config.max_depth)
            .with_trash_dir(config.trash_dir.clone())
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Move deleted photos here instead of removing them
    pub fn with_trash_dir(mut self, trash_dir: Option<PathBuf>) -> Self {
        self.trash_dir = trash_dir;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of an asset; `None` for ids that would escape the root
    pub fn path_of(&self, id: &AssetId) -> Option<PathBuf> {
        let relative = Path::new(id.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || id.as_str().is_empty() {
            None
        } else {
            Some(self.root.join(relative))
        }
    }

    /// `None` when the path is outside the root or not valid UTF-8, since
    /// such an id could not be mapped back to the same file
    fn id_of(&self, path: &Path) -> Option<AssetId> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(AssetId::new(parts.join("/")))
    }

    fn check_root(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(Error::FileNotFound(self.root.clone()));
        }
        match fs::read_dir(&self.root) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(
                Error::PermissionDenied(format!("cannot read {}", self.root.display())),
            ),
            Err(e) => Err(e.into()),
        }
    }

    fn trash(&self, trash_dir: &Path, id: &AssetId, path: &Path) -> io::Result<()> {
        let dest = unused_destination(trash_dir.join(id.as_str()));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        // rename fails across filesystems; fall back to copy + remove
        if fs::rename(path, &dest).is_err() {
            fs::copy(path, &dest)?;
            fs::remove_file(path)?;
        }

        log_fs_modification(
            "move to trash",
            path,
            Some(&format!("to {}", dest.display())),
        );
        Ok(())
    }
}

/// `dest`, or the first of `name.1.ext`, `name.2.ext`, ... that does not
/// exist yet, so an earlier trashed photo is never overwritten
fn unused_destination(dest: PathBuf) -> PathBuf {
    if !dest.exists() {
        return dest;
    }

    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = dest
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1u32;
    loop {
        let candidate = dest.with_file_name(format!("{}.{}{}", stem, n, extension));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Creation time, falling back to modification time where the platform
/// does not record it
fn file_timestamp(metadata: &fs::Metadata) -> io::Result<DateTime<Utc>> {
    let time = metadata.created().or_else(|_| metadata.modified())?;
    Ok(DateTime::<Utc>::from(time))
}

impl Gallery for DirectoryGallery {
    fn list_assets(&self) -> Result<Vec<PhotoAsset>> {
        self.check_root()?;

        let max_depth = self.max_depth.unwrap_or(usize::MAX);
        let mut assets = Vec::new();

        for entry in WalkDir::new(&self.root)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !is_image_path(path) {
                continue;
            }
            if let Some(trash) = &self.trash_dir {
                if path.starts_with(trash) {
                    continue;
                }
            }

            let Some(id) = self.id_of(path) else {
                warn!("Skipping {}: file name is not valid UTF-8", path.display());
                continue;
            };

            match entry.metadata().map_err(io::Error::from).and_then(|m| file_timestamp(&m)) {
                Ok(created_at) => assets.push(PhotoAsset { id, created_at }),
                Err(e) => {
                    // Log error but continue with other files
                    warn!("Error reading metadata for {}: {}", path.display(), e);
                }
            }
        }

        Ok(assets)
    }

    fn fetch_bytes(&self, id: &AssetId) -> std::result::Result<Vec<u8>, FetchError> {
        let path = self
            .path_of(id)
            .ok_or_else(|| FetchError::NotFound(id.clone()))?;

        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound(id.clone()),
            _ => FetchError::Io(format!("{}: {}", path.display(), e)),
        })
    }
}

impl AssetDeleter for DirectoryGallery {
    /// Checks every id before touching the filesystem. Repeated ids are
    /// deleted once. A failure part way through reports the photos already
    /// removed as [`Error::PartialDeletion`].
    fn delete_by_ids(&self, ids: &[AssetId]) -> Result<()> {
        let mut unique = HashSet::with_capacity(ids.len());
        let mut paths = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.insert(id) {
                continue;
            }
            match self.path_of(id) {
                Some(path) if path.is_file() => paths.push((id, path)),
                _ => return Err(Error::Deletion(format!("no such photo: {}", id))),
            }
        }

        let mut deleted = Vec::with_capacity(paths.len());
        for (id, path) in paths {
            let result = match &self.trash_dir {
                Some(trash_dir) => self.trash(trash_dir, id, &path),
                None => fs::remove_file(&path).map(|_| {
                    log_fs_modification("delete", &path, None);
                }),
            };

            if let Err(e) = result {
                let reason = format!("{}: {}", path.display(), e);
                return Err(if deleted.is_empty() {
                    Error::Deletion(reason)
                } else {
                    Error::PartialDeletion { deleted, reason }
                });
            }
            deleted.push(id.clone());
        }

        Ok(())
    }
}
