use std::str::FromStr;

use crate::{Error, Result};

pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.3;

/// What to do on later calls when interface discovery found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterfacePolicy {
    /// Keep the first discovery result for the life of the process, even
    /// when it was "nothing found".
    #[default]
    Sticky,
    /// Re-run discovery on each call until an interface is found; a found
    /// name is still never re-validated.
    RetryWhenMissing,
}

impl FromStr for InterfacePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sticky" => Ok(InterfacePolicy::Sticky),
            "retry" | "retry-when-missing" => Ok(InterfacePolicy::RetryWhenMissing),
            _ => Err("expected 'sticky' or 'retry'".into()),
        }
    }
}

impl std::fmt::Display for InterfacePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfacePolicy::Sticky => f.write_str("sticky"),
            InterfacePolicy::RetryWhenMissing => f.write_str("retry"),
        }
    }
}

/// Estimator state that survives between refresh cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalCache {
    interface_name: Option<String>,
    discovery_attempted: bool,
    last_smoothed_rssi: Option<f64>,
    smoothing_factor: f64,
}

impl SignalCache {
    /// `smoothing_factor` must lie in (0, 1].
    pub fn new(smoothing_factor: f64) -> Result<Self> {
        if !(smoothing_factor > 0.0 && smoothing_factor <= 1.0) {
            return Err(Error::InvalidArgs(format!(
                "smoothing factor must be in (0, 1], got {smoothing_factor}"
            )));
        }
        Ok(Self {
            interface_name: None,
            discovery_attempted: false,
            last_smoothed_rssi: None,
            smoothing_factor,
        })
    }

    pub fn interface_name(&self) -> Option<&str> {
        self.interface_name.as_deref()
    }

    pub fn last_smoothed_rssi(&self) -> Option<f64> {
        self.last_smoothed_rssi
    }

    /// Whether discovery has to run before the interface name can be used.
    pub fn needs_discovery(&self, policy: InterfacePolicy) -> bool {
        if self.interface_name.is_some() {
            return false;
        }
        match policy {
            InterfacePolicy::Sticky => !self.discovery_attempted,
            InterfacePolicy::RetryWhenMissing => true,
        }
    }

    pub fn record_discovery(&mut self, found: Option<String>) {
        self.discovery_attempted = true;
        if found.is_some() {
            self.interface_name = found;
        }
    }

    /// Blend a raw dBm sample into the running average and return it.
    pub fn blend(&mut self, raw_dbm: i32) -> f64 {
        let raw = f64::from(raw_dbm);
        let alpha = self.smoothing_factor;
        let smoothed = match self.last_smoothed_rssi {
            Some(prev) => prev * (1.0 - alpha) + raw * alpha,
            None => raw,
        };
        self.last_smoothed_rssi = Some(smoothed);
        smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_factor() {
        assert!(SignalCache::new(0.0).is_err());
        assert!(SignalCache::new(1.5).is_err());
        assert!(SignalCache::new(f64::NAN).is_err());
        assert!(SignalCache::new(1.0).is_ok());
    }

    #[test]
    fn first_sample_is_taken_verbatim() {
        let mut cache = SignalCache::new(0.3).unwrap();
        assert_eq!(cache.blend(-63), -63.0);
        assert_eq!(cache.last_smoothed_rssi(), Some(-63.0));
    }

    #[test]
    fn blend_matches_worked_example() {
        let mut cache = SignalCache::new(0.3).unwrap();
        assert_eq!(cache.blend(-60), -60.0);
        let second = cache.blend(-80);
        assert!((second - -66.0).abs() < 1e-9, "got {second}");
    }

    #[test]
    fn repeated_samples_converge() {
        let mut cache = SignalCache::new(0.3).unwrap();
        cache.blend(-40);
        let mut value = 0.0;
        for _ in 0..100 {
            value = cache.blend(-75);
        }
        assert!((value - -75.0).abs() < 1e-6, "got {value}");
    }

    #[test]
    fn blend_moves_strictly_toward_sample() {
        let mut cache = SignalCache::new(0.25).unwrap();
        let prev = cache.blend(-80);
        let next = cache.blend(-50);
        assert!(next > prev && next < -50.0, "got {next}");

        let prev = next;
        let next = cache.blend(-90);
        assert!(next < prev && next > -90.0, "got {next}");
    }

    #[test]
    fn factor_of_one_tracks_raw() {
        let mut cache = SignalCache::new(1.0).unwrap();
        cache.blend(-60);
        assert_eq!(cache.blend(-80), -80.0);
    }

    #[test]
    fn sticky_policy_caches_missing_interface() {
        let mut cache = SignalCache::new(0.3).unwrap();
        assert!(cache.needs_discovery(InterfacePolicy::Sticky));
        cache.record_discovery(None);
        assert!(!cache.needs_discovery(InterfacePolicy::Sticky));
        assert!(cache.needs_discovery(InterfacePolicy::RetryWhenMissing));
    }

    #[test]
    fn found_interface_is_never_rediscovered() {
        let mut cache = SignalCache::new(0.3).unwrap();
        cache.record_discovery(Some("wlan0".into()));
        assert_eq!(cache.interface_name(), Some("wlan0"));
        assert!(!cache.needs_discovery(InterfacePolicy::Sticky));
        assert!(!cache.needs_discovery(InterfacePolicy::RetryWhenMissing));
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("sticky".parse::<InterfacePolicy>(), Ok(InterfacePolicy::Sticky));
        assert_eq!(
            "RETRY".parse::<InterfacePolicy>(),
            Ok(InterfacePolicy::RetryWhenMissing)
        );
        assert!("sometimes".parse::<InterfacePolicy>().is_err());
    }
}
