//! Built-in operations (host monitoring, security review, cleanup, tuning).

use super::r#trait::{Operation, Settings};
use async_trait::async_trait;
use serde_json::json;
use sysinfo::System;
use tracing::debug;
use warden_core::ActionResult;

fn threshold(settings: &Settings, key: &str, default: f64) -> f64 {
    settings.get(key).and_then(|v| v.as_f64()).unwrap_or(default)
}

/// Sample global CPU utilization.
pub struct CheckCpu;

#[async_trait]
impl Operation for CheckCpu {
    fn name(&self) -> &str {
        "monitor.check_cpu"
    }

    fn description(&self) -> &str {
        "Sample global CPU utilization against the configured threshold"
    }

    async fn execute(&self, settings: &Settings) -> Result<ActionResult, anyhow::Error> {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        // Two samples separated by the minimum interval, or the usage
        // reading is meaningless.
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        sys.refresh_cpu_usage();

        let usage = sys.global_cpu_info().cpu_usage() as f64;
        let limit = threshold(settings, "cpu_threshold", 90.0);

        let mut result = ActionResult::ok("", format!("CPU usage {usage:.1}%"))
            .with_data("usage_percent", json!(usage));
        if usage >= limit {
            result.message = format!("CPU usage {usage:.1}% exceeds {limit:.0}% threshold");
            result = result.with_data("alert", json!(true));
        }
        Ok(result)
    }
}

/// Sample memory pressure.
pub struct CheckMemory;

#[async_trait]
impl Operation for CheckMemory {
    fn name(&self) -> &str {
        "monitor.check_memory"
    }

    fn description(&self) -> &str {
        "Sample memory usage against the configured threshold"
    }

    async fn execute(&self, settings: &Settings) -> Result<ActionResult, anyhow::Error> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Ok(ActionResult::failure("", "memory totals unreadable"));
        }
        let used = total.saturating_sub(sys.available_memory());
        let percent = used as f64 / total as f64 * 100.0;
        let limit = threshold(settings, "memory_threshold", 90.0);

        let mut result = ActionResult::ok("", format!("memory usage {percent:.1}%"))
            .with_data("usage_percent", json!(percent))
            .with_data("used_bytes", json!(used));
        if percent >= limit {
            result.message = format!("memory usage {percent:.1}% exceeds {limit:.0}% threshold");
            result = result.with_data("alert", json!(true));
        }
        Ok(result)
    }
}

/// Check filesystem fill levels.
pub struct CheckDisk;

#[async_trait]
impl Operation for CheckDisk {
    fn name(&self) -> &str {
        "monitor.check_disk"
    }

    fn description(&self) -> &str {
        "Check mounted filesystems against the configured fill threshold"
    }

    async fn execute(&self, settings: &Settings) -> Result<ActionResult, anyhow::Error> {
        let disks = sysinfo::Disks::new_with_refreshed_list();
        let limit = threshold(settings, "disk_threshold", 90.0);

        let mut worst: Option<(String, f64)> = None;
        for disk in disks.iter() {
            let total = disk.total_space();
            if total == 0 {
                continue;
            }
            let used = total.saturating_sub(disk.available_space());
            let percent = used as f64 / total as f64 * 100.0;
            let mount = disk.mount_point().to_string_lossy().to_string();
            if worst.as_ref().map(|(_, p)| percent > *p).unwrap_or(true) {
                worst = Some((mount, percent));
            }
        }

        let Some((mount, percent)) = worst else {
            return Ok(ActionResult::ok("", "no mounted filesystems found"));
        };

        let mut result = ActionResult::ok("", format!("fullest filesystem {mount} at {percent:.1}%"))
            .with_data("mount_point", json!(mount))
            .with_data("usage_percent", json!(percent));
        if percent >= limit {
            result.message =
                format!("filesystem {mount} at {percent:.1}% exceeds {limit:.0}% threshold");
            result = result.with_data("alert", json!(true));
        }
        Ok(result)
    }
}

/// Census of listening TCP sockets.
pub struct ReviewPorts;

/// Count LISTEN entries in a `/proc/net/tcp`-format table.
fn count_listening(table: &str) -> usize {
    table
        .lines()
        .skip(1)
        .filter(|line| {
            line.split_whitespace()
                .nth(3)
                .map(|st| st.eq_ignore_ascii_case("0A"))
                .unwrap_or(false)
        })
        .count()
}

#[async_trait]
impl Operation for ReviewPorts {
    fn name(&self) -> &str {
        "security.review_ports"
    }

    fn description(&self) -> &str {
        "Count listening TCP sockets and flag unexpected growth"
    }

    async fn execute(&self, settings: &Settings) -> Result<ActionResult, anyhow::Error> {
        let mut listening = 0usize;
        for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
            match tokio::fs::read_to_string(table).await {
                Ok(content) => listening += count_listening(&content),
                Err(e) => debug!(table, error = %e, "socket table unreadable"),
            }
        }

        let mut result =
            ActionResult::ok("", format!("{listening} listening TCP sockets"))
                .with_data("listening_sockets", json!(listening));
        if let Some(max) = settings.get("max_listening_ports").and_then(|v| v.as_u64()) {
            if listening as u64 > max {
                result.message =
                    format!("{listening} listening TCP sockets exceeds expected {max}");
                result = result.with_data("alert", json!(true));
            }
        }
        Ok(result)
    }
}

/// Sweep stale files out of temp directories.
pub struct CleanTemp;

#[async_trait]
impl Operation for CleanTemp {
    fn name(&self) -> &str {
        "cleanup.clean_temp"
    }

    fn description(&self) -> &str {
        "Remove files older than the configured age from the configured paths"
    }

    async fn execute(&self, settings: &Settings) -> Result<ActionResult, anyhow::Error> {
        let paths: Vec<String> = settings
            .get("paths")
            .and_then(|v| v.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_else(|| vec!["/tmp".to_string()]);
        let max_age_days = settings
            .get("max_age_days")
            .and_then(|v| v.as_u64())
            .unwrap_or(7);
        let cutoff = std::time::SystemTime::now()
            - std::time::Duration::from_secs(max_age_days * 24 * 3600);

        let mut removed = 0u64;
        let mut reclaimed = 0u64;
        for path in &paths {
            let mut rd = match tokio::fs::read_dir(path).await {
                Ok(rd) => rd,
                Err(e) => {
                    debug!(path, error = %e, "cleanup path unreadable");
                    continue;
                }
            };
            while let Ok(Some(entry)) = rd.next_entry().await {
                let Ok(meta) = entry.metadata().await else {
                    continue;
                };
                if !meta.is_file() {
                    continue;
                }
                let stale = meta.modified().map(|m| m <= cutoff).unwrap_or(false);
                if !stale {
                    continue;
                }
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => {
                        removed += 1;
                        reclaimed += meta.len();
                    }
                    Err(e) => debug!(file = %entry.path().display(), error = %e, "remove failed"),
                }
            }
        }

        Ok(ActionResult::ok(
            "",
            format!(
                "removed {removed} files ({} KB) older than {max_age_days} days",
                reclaimed / 1024
            ),
        )
        .with_data("removed_files", json!(removed))
        .with_data("reclaimed_bytes", json!(reclaimed)))
    }
}

/// Compare load average against core count.
pub struct TunerRecommend;

#[async_trait]
impl Operation for TunerRecommend {
    fn name(&self) -> &str {
        "tuner.recommend"
    }

    fn description(&self) -> &str {
        "Compare the 1-minute load average against the core count"
    }

    async fn execute(&self, _settings: &Settings) -> Result<ActionResult, anyhow::Error> {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        let cores = sys.cpus().len().max(1);
        let load = System::load_average().one;

        let mut result = ActionResult::ok(
            "",
            format!("load average {load:.2} within capacity of {cores} cores"),
        )
        .with_data("load_one", json!(load))
        .with_data("cores", json!(cores));
        if load > cores as f64 {
            result.message = format!(
                "load average {load:.2} exceeds {cores} cores; consider renicing background services"
            );
            result = result.with_data("alert", json!(true));
        }
        Ok(result)
    }
}
