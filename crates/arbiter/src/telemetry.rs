//! Thermal and power telemetry probes.

use std::path::Path;

/// Read-only view of the host's thermal sensors.
pub trait ThermalProbe: Send + Sync {
    /// Hottest sensor reading in degrees Celsius, or `None` when no sensor
    /// is readable on this host.
    fn hottest_celsius(&self) -> Option<f32>;
}

/// Read-only view of the host's power source.
pub trait PowerProbe: Send + Sync {
    /// Whether the host is currently discharging a battery.
    fn on_battery(&self) -> bool;
}

/// Thermal probe backed by `sysinfo` component sensors.
///
/// Refreshes the component list on every call so readings are never stale.
#[derive(Debug, Default)]
pub struct SysinfoThermalProbe;

impl ThermalProbe for SysinfoThermalProbe {
    fn hottest_celsius(&self) -> Option<f32> {
        let components = sysinfo::Components::new_with_refreshed_list();
        components
            .iter()
            .map(|c| c.temperature())
            .filter(|t| t.is_finite())
            .fold(None, |hottest, t| match hottest {
                Some(h) if h >= t => Some(h),
                _ => Some(t),
            })
    }
}

/// Power probe reading `/sys/class/power_supply`.
///
/// The host counts as on battery when any supply of type `Battery` reports
/// `Discharging`. Hosts without a battery directory read as mains-powered.
#[derive(Debug)]
pub struct SysfsPowerProbe {
    root: std::path::PathBuf,
}

impl SysfsPowerProbe {
    /// Probe the standard sysfs location.
    pub fn new() -> Self {
        Self {
            root: "/sys/class/power_supply".into(),
        }
    }

    /// Probe an alternate root (tests).
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl Default for SysfsPowerProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerProbe for SysfsPowerProbe {
    fn on_battery(&self) -> bool {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return false;
        };
        for entry in entries.flatten() {
            let supply = entry.path();
            let kind = std::fs::read_to_string(supply.join("type")).unwrap_or_default();
            if kind.trim() != "Battery" {
                continue;
            }
            let status = std::fs::read_to_string(supply.join("status")).unwrap_or_default();
            if status.trim() == "Discharging" {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_power_supply_root_reads_as_mains() {
        let probe = SysfsPowerProbe::with_root("/nonexistent/power_supply");
        assert!(!probe.on_battery());
    }

    #[test]
    fn test_discharging_battery_detected() {
        let dir = std::env::temp_dir().join(format!("warden-pwr-{}", std::process::id()));
        let bat = dir.join("BAT0");
        std::fs::create_dir_all(&bat).unwrap();
        std::fs::write(bat.join("type"), "Battery\n").unwrap();
        std::fs::write(bat.join("status"), "Discharging\n").unwrap();

        let probe = SysfsPowerProbe::with_root(&dir);
        assert!(probe.on_battery());

        std::fs::write(bat.join("status"), "Charging\n").unwrap();
        assert!(!probe.on_battery());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_sysinfo_probe_does_not_panic() {
        // Sensor availability varies by host; only the call contract is
        // checked here.
        let probe = SysinfoThermalProbe;
        let _ = probe.hottest_celsius();
    }
}
