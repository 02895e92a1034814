use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

use crate::types::Platform;

/// Get the cache directory for a media file, keyed on its path and size
pub fn get_cache_dir(media_path: &Path, size: u64) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    media_path.hash(&mut hasher);
    size.hash(&mut hasher);
    let media_hash = hasher.finish();

    get_root_cache_dir().join(media_hash.to_string())
}

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("clipcheck")
}

/// Get the path for a cached report (platform and window size aware)
pub fn get_report_path(cache_dir: &Path, platform: Platform, window_seconds: u64) -> PathBuf {
    cache_dir.join(format!("report_{}_{}.json", platform.key(), window_seconds))
}
