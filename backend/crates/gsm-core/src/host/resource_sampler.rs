use std::path::{Path, PathBuf};
use std::time::Duration;

use sysinfo::{Disks, Pid, ProcessRefreshKind, ProcessesToUpdate, System};

const DEFAULT_CPU_WINDOW: Duration = Duration::from_millis(200);

/// Resource usage of the server binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessUsage {
    pub pid: u32,
    /// Percent of one core; may exceed 100 on multi-core hosts
    pub cpu_percent: f32,
    pub memory_bytes: u64,
    pub memory_percent: f64,
    pub uptime: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskUsage {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemUsage {
    pub cpu_percent: f32,
    pub memory_total_bytes: u64,
    pub memory_used_bytes: u64,
    pub memory_percent: f64,
    pub disk: Option<DiskUsage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    /// None when the pid vanished before sampling finished
    pub process: Option<ProcessUsage>,
    pub system: SystemUsage,
}

/// Samples CPU, memory and disk usage with `sysinfo`.
///
/// Sampling sleeps for the CPU window, so run it on the blocking pool.
#[derive(Debug, Clone)]
pub struct ResourceSampler {
    cpu_window: Duration,
}

impl Default for ResourceSampler {
    fn default() -> Self {
        Self::new(DEFAULT_CPU_WINDOW)
    }
}

impl ResourceSampler {
    pub fn new(cpu_window: Duration) -> Self {
        Self {
            cpu_window: cpu_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    pub fn sample(&self, pid: u32, disk_path: &Path) -> ResourceSnapshot {
        let target = [Pid::from_u32(pid)];
        let refresh_kind = ProcessRefreshKind::new().with_cpu().with_memory();

        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_processes_specifics(ProcessesToUpdate::Some(&target), true, refresh_kind);

        std::thread::sleep(self.cpu_window);

        system.refresh_cpu_all();
        system.refresh_processes_specifics(ProcessesToUpdate::Some(&target), true, refresh_kind);
        system.refresh_memory();

        let memory_total_bytes = system.total_memory();
        let process = system.process(target[0]).map(|process| ProcessUsage {
            pid,
            cpu_percent: process.cpu_usage(),
            memory_bytes: process.memory(),
            memory_percent: percent(process.memory(), memory_total_bytes),
            uptime: Duration::from_secs(process.run_time()),
        });

        ResourceSnapshot {
            process,
            system: SystemUsage {
                cpu_percent: system.global_cpu_usage(),
                memory_total_bytes,
                memory_used_bytes: system.used_memory(),
                memory_percent: percent(system.used_memory(), memory_total_bytes),
                disk: disk_usage(disk_path),
            },
        }
    }
}

/// Usage of the disk whose mount point is the longest prefix of `path`.
fn disk_usage(path: &Path) -> Option<DiskUsage> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| {
            let total_bytes = disk.total_space();
            let used_bytes = total_bytes.saturating_sub(disk.available_space());
            DiskUsage {
                mount_point: disk.mount_point().to_path_buf(),
                total_bytes,
                used_bytes,
                percent: percent(used_bytes, total_bytes),
            }
        })
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}
