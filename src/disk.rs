use std::path::Path;
use sysinfo::Disks;

/// Capacity of the volume the engine operates on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskInfo {
    pub total_space: u64,
    pub used_space: u64,
    pub free_space: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Healthy,
    Warning,
    Critical,
}

impl DiskInfo {
    /// Capacity of the volume holding `home`: the disk whose mount point is
    /// the longest prefix of the home path. All zeros when the volume
    /// cannot be determined.
    pub fn current(home: &Path) -> Self {
        let disks = Disks::new_with_refreshed_list();
        let best = disks
            .list()
            .iter()
            .filter(|d| home.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len());
        match best {
            Some(disk) => {
                let total = disk.total_space();
                let free = disk.available_space();
                Self {
                    total_space: total,
                    used_space: total.saturating_sub(free),
                    free_space: free,
                }
            }
            None => Self::default(),
        }
    }

    pub fn used_percentage(&self) -> f64 {
        if self.total_space == 0 {
            return 0.0;
        }
        self.used_space as f64 / self.total_space as f64 * 100.0
    }

    pub fn usage_level(&self) -> UsageLevel {
        let pct = self.used_percentage();
        if pct < 60.0 {
            UsageLevel::Healthy
        } else if pct < 80.0 {
            UsageLevel::Warning
        } else {
            UsageLevel::Critical
        }
    }

    /// Reported cleanable totals can exceed used space when raw category
    /// sums overlap; clamp so they never do. No-op when capacity is
    /// unknown.
    pub fn clamp_to_used(&self, bytes: u64) -> u64 {
        if self.total_space == 0 {
            bytes
        } else {
            bytes.min(self.used_space)
        }
    }
}
