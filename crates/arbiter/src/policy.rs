//! Arbitration policy.

use crate::telemetry::{PowerProbe, SysfsPowerProbe, SysinfoThermalProbe, ThermalProbe};
use tracing::debug;
use warden_core::{AgentRequest, Priority, ResourceKind};

/// Tunables for the arbitration policy.
#[derive(Debug, Clone, Copy)]
pub struct ArbiterConfig {
    /// CPU work is denied once the hottest sensor reaches this temperature,
    /// unless the request is critical.
    pub thermal_limit_celsius: f32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            thermal_limit_celsius: 90.0,
        }
    }
}

/// Decides, per individual action about to run, whether the requested
/// resource may be used right now. Rate limiting is not this component's
/// job; it is layered underneath the executor's earlier gates.
pub struct ResourceArbiter {
    thermal: Box<dyn ThermalProbe>,
    power: Box<dyn PowerProbe>,
    config: ArbiterConfig,
}

impl ResourceArbiter {
    /// Arbiter with the default host probes.
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            thermal: Box::new(SysinfoThermalProbe),
            power: Box::new(SysfsPowerProbe::new()),
            config,
        }
    }

    /// Arbiter with injected probes (tests, alternate platforms).
    pub fn with_probes(
        config: ArbiterConfig,
        thermal: Box<dyn ThermalProbe>,
        power: Box<dyn PowerProbe>,
    ) -> Self {
        Self {
            thermal,
            power,
            config,
        }
    }

    /// Whether `request` may proceed right now.
    ///
    /// Evaluated in order: thermal cap on CPU work, battery cap on
    /// background work, otherwise allow. Critical requests bypass the
    /// thermal cap so safety-relevant agents can act on a hot host; a probe
    /// that cannot read its signal imposes no constraint.
    pub fn can_proceed(&self, request: &AgentRequest) -> bool {
        if request.resource == ResourceKind::Cpu {
            if let Some(hottest) = self.thermal.hottest_celsius() {
                if hottest >= self.config.thermal_limit_celsius
                    && request.priority != Priority::Critical
                {
                    debug!(
                        agent = %request.agent_name,
                        hottest_celsius = hottest,
                        "cpu request denied: thermal limit"
                    );
                    return false;
                }
            }
        }

        if request.resource == ResourceKind::BackgroundProcess
            && self.power.on_battery()
            && request.priority == Priority::Background
        {
            debug!(
                agent = %request.agent_name,
                "background request denied: on battery"
            );
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedThermal(Option<f32>);
    impl ThermalProbe for FixedThermal {
        fn hottest_celsius(&self) -> Option<f32> {
            self.0
        }
    }

    struct FixedPower(bool);
    impl PowerProbe for FixedPower {
        fn on_battery(&self) -> bool {
            self.0
        }
    }

    fn arbiter(hottest: Option<f32>, on_battery: bool) -> ResourceArbiter {
        ResourceArbiter::with_probes(
            ArbiterConfig::default(),
            Box::new(FixedThermal(hottest)),
            Box::new(FixedPower(on_battery)),
        )
    }

    fn request(resource: ResourceKind, priority: Priority) -> AgentRequest {
        AgentRequest {
            agent_name: "test-agent".to_string(),
            resource,
            priority,
        }
    }

    #[test]
    fn test_hot_cpu_denies_non_critical() {
        let arbiter = arbiter(Some(95.0), false);
        assert!(!arbiter.can_proceed(&request(ResourceKind::Cpu, Priority::Background)));
        assert!(!arbiter.can_proceed(&request(ResourceKind::Cpu, Priority::UserInteraction)));
        assert!(arbiter.can_proceed(&request(ResourceKind::Cpu, Priority::Critical)));
    }

    #[test]
    fn test_cool_cpu_allows_background() {
        let arbiter = arbiter(Some(55.0), false);
        assert!(arbiter.can_proceed(&request(ResourceKind::Cpu, Priority::Background)));
    }

    #[test]
    fn test_no_thermal_sensor_imposes_no_constraint() {
        let arbiter = arbiter(None, false);
        assert!(arbiter.can_proceed(&request(ResourceKind::Cpu, Priority::Background)));
    }

    #[test]
    fn test_battery_denies_background_only() {
        let arbiter = arbiter(None, true);
        assert!(!arbiter.can_proceed(&request(
            ResourceKind::BackgroundProcess,
            Priority::Background
        )));
        assert!(arbiter.can_proceed(&request(
            ResourceKind::BackgroundProcess,
            Priority::UserInteraction
        )));
        assert!(arbiter.can_proceed(&request(
            ResourceKind::BackgroundProcess,
            Priority::Critical
        )));
    }

    #[test]
    fn test_mains_allows_background() {
        let arbiter = arbiter(None, false);
        assert!(arbiter.can_proceed(&request(
            ResourceKind::BackgroundProcess,
            Priority::Background
        )));
    }

    #[test]
    fn test_battery_does_not_cap_disk_or_network() {
        let arbiter = arbiter(None, true);
        assert!(arbiter.can_proceed(&request(ResourceKind::Disk, Priority::Background)));
        assert!(arbiter.can_proceed(&request(ResourceKind::Network, Priority::Background)));
    }

    #[test]
    fn test_hot_host_on_battery_still_allows_critical_cpu() {
        let arbiter = arbiter(Some(99.0), true);
        assert!(arbiter.can_proceed(&request(ResourceKind::Cpu, Priority::Critical)));
    }
}
