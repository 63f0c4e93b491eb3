//! System status probing.
//!
//! Thin interface over the OS metrics provider (the `sysinfo` crate). The
//! probe either produces a complete snapshot or fails; it never returns a
//! partially populated status.

use std::time::{Duration, Instant};

use serde::Serialize;
use sysinfo::{Disks, System};
use thiserror::Error;

use crate::http::response::iso_timestamp;

/// CPU usage is sampled over this interval, measured as the delta between
/// two refreshes.
const CPU_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Errors from the metrics provider.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("metrics provider reported no data for {0}")]
    Unavailable(&'static str),
}

/// Complete system status snapshot.
#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub device_authentication: &'static str,
    pub memory: MemoryStatus,
    pub cpu_percent: f32,
    pub disk_usage: DiskStatus,
    /// Seconds since the server process started.
    pub uptime: f64,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct MemoryStatus {
    pub used: u64,
    pub total: u64,
    pub percent: f64,
    pub available: u64,
}

#[derive(Debug, Serialize)]
pub struct DiskStatus {
    pub used: u64,
    pub total: u64,
    pub percent: f64,
}

/// Collect a full status snapshot.
///
/// Suspends for one second between CPU refreshes to get a meaningful usage
/// sample; other in-flight requests are not blocked.
pub async fn collect(started_at: Instant) -> Result<SystemStatus, ProbeError> {
    let mut sys = System::new();

    sys.refresh_memory();
    sys.refresh_cpu_usage();
    tokio::time::sleep(CPU_SAMPLE_INTERVAL).await;
    sys.refresh_cpu_usage();

    let total = sys.total_memory();
    if total == 0 {
        return Err(ProbeError::Unavailable("memory"));
    }
    let used = sys.used_memory();
    let memory = MemoryStatus {
        used,
        total,
        percent: used as f64 / total as f64 * 100.0,
        available: sys.available_memory(),
    };

    let disk_usage = root_disk_usage()?;

    Ok(SystemStatus {
        device_authentication: "verified",
        memory,
        cpu_percent: sys.global_cpu_usage(),
        disk_usage,
        uptime: started_at.elapsed().as_secs_f64(),
        timestamp: iso_timestamp(),
    })
}

/// Usage of the disk mounted at "/", falling back to the largest disk on
/// platforms without a root mount.
fn root_disk_usage() -> Result<DiskStatus, ProbeError> {
    let disks = Disks::new_with_refreshed_list();

    let disk = disks
        .iter()
        .find(|d| d.mount_point() == std::path::Path::new("/"))
        .or_else(|| disks.iter().max_by_key(|d| d.total_space()))
        .ok_or(ProbeError::Unavailable("disk"))?;

    let total = disk.total_space();
    if total == 0 {
        return Err(ProbeError::Unavailable("disk"));
    }
    let used = total - disk.available_space();

    Ok(DiskStatus {
        used,
        total,
        percent: used as f64 / total as f64 * 100.0,
    })
}
