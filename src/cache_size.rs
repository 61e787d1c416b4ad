//! Cache size detection from sysfs.
use std::path::PathBuf;

use crate::error::{Error, Result};

/// sysfs cache index of the last level cache on x86.
pub const L3_CACHE_INDEX: u32 = 3;

/// Path of the size file for the given cache index of cpu 0.
///
/// All cpus are assumed to have caches of the same size.
pub fn cache_size_path(index: u32) -> PathBuf {
    format!("/sys/devices/system/cpu/cpu0/cache/index{}/size", index).into()
}

/// Parses a sysfs cache size like `32768K`, `36M` or `512` into bytes.
///
/// `K`, `M` and `G` are binary multipliers.
pub fn parse_cache_size(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    let invalid = || Error::InvalidCacheSize(input.to_string());

    let (digits, multiplier) = match trimmed.chars().last() {
        Some('K') => (&trimmed[..trimmed.len() - 1], 1024),
        Some('M') => (&trimmed[..trimmed.len() - 1], 1024 * 1024),
        Some('G') => (&trimmed[..trimmed.len() - 1], 1024 * 1024 * 1024),
        Some(_) => (trimmed, 1),
        None => return Err(invalid()),
    };
    let value: usize = digits.parse().map_err(|_| invalid())?;
    value.checked_mul(multiplier).ok_or_else(invalid)
}

/// Reads the size in bytes of the cache with the given sysfs index.
pub fn detect_cache_size(index: u32) -> Result<usize> {
    let content = std::fs::read_to_string(cache_size_path(index))?;
    let size = parse_cache_size(&content)?;
    log::debug!("detected cache index{} size: {} bytes", index, size);
    Ok(size)
}

/// Reads the size in bytes of the L3 cache.
pub fn detect_l3_cache_size() -> Result<usize> {
    detect_cache_size(L3_CACHE_INDEX)
}
