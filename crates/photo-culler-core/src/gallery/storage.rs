use std::path::{Path, PathBuf};
use sysinfo::Disks;

use super::StorageInfo;
use crate::error::{Error, Result};
use crate::types::StorageUsage;

/// Storage of the disk holding a given path.
///
/// Picks the mounted disk whose mount point is the longest prefix of the path.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    path: PathBuf,
}

impl DiskStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageInfo for DiskStorage {
    fn usage(&self) -> Result<StorageUsage> {
        let path = self
            .path
            .canonicalize()
            .unwrap_or_else(|_| self.path.clone());

        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .filter(|disk| path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| StorageUsage {
                total_bytes: disk.total_space(),
                free_bytes: disk.available_space(),
            })
            .ok_or_else(|| Error::Storage(format!("no mounted disk holds {}", path.display())))
    }
}
