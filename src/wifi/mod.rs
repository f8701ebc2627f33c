//! Wi-Fi signal estimation.
//!
//! [`SignalEstimator`] walks an ordered list of [`Probe`]s, stops at the
//! first one that finds something, smooths dBm samples through its
//! [`SignalCache`] and formats the result for the panel. It never fails:
//! every missing tool or file just moves the cascade along.

use std::cell::OnceCell;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::command::CommandRunner;
use crate::Result;

pub mod cache;
pub mod parse;

pub use cache::{InterfacePolicy, SignalCache, DEFAULT_SMOOTHING_FACTOR};

pub const PROC_NET_WIRELESS: &str = "/proc/net/wireless";
pub const NO_WIFI: &str = "No WiFi";
pub const NOT_AVAILABLE: &str = "N/A";

/// Signal sources, in the order the estimator tries them by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `iw dev <iface> link`, dBm.
    IwLink,
    /// `/proc/net/wireless` link quality, percent.
    ProcWireless,
    /// `iwconfig` `Signal level=`, dBm.
    IwconfigSignal,
    /// `iwconfig` `Link Quality=q/max`, percent.
    IwconfigQuality,
}

pub const DEFAULT_PROBE_ORDER: [Probe; 4] = [
    Probe::IwLink,
    Probe::ProcWireless,
    Probe::IwconfigSignal,
    Probe::IwconfigQuality,
];

/// Raw value a probe came back with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    Dbm(i32),
    Percent(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Found(Sample),
    NotFound,
}

/// Signal value after smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalReading {
    Percent(u8),
    Rssi { dbm: i32, percent: u8 },
    Unavailable,
}

/// One estimation result: the reading plus the SSID when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalReport {
    pub ssid: Option<String>,
    pub reading: SignalReading,
}

impl fmt::Display for SignalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self
            .ssid
            .as_deref()
            .map(|ssid| format!("{ssid} "))
            .unwrap_or_default();
        match (self.reading, self.ssid.as_deref()) {
            (SignalReading::Rssi { dbm, percent }, _) => {
                write!(f, "{prefix}{percent}% ({dbm} dBm)")
            }
            (SignalReading::Percent(percent), _) => write!(f, "{prefix}{percent}%"),
            (SignalReading::Unavailable, Some(ssid)) => f.write_str(ssid),
            (SignalReading::Unavailable, None) => f.write_str(NO_WIFI),
        }
    }
}

/// Map dBm onto 0..=100: -100 and below is 0, -50 and above is 100,
/// linear in between.
pub fn dbm_to_percent(dbm: i32) -> u8 {
    if dbm <= -100 {
        0
    } else if dbm >= -50 {
        100
    } else {
        (2 * (dbm + 100)) as u8
    }
}

/// Per-call scratch space shared between probes.
struct ProbeContext<'a> {
    interface: Option<&'a str>,
    iwconfig: OnceCell<Option<String>>,
}

pub struct SignalEstimator<R: CommandRunner> {
    runner: R,
    cache: SignalCache,
    policy: InterfacePolicy,
    probes: Vec<Probe>,
    wireless_stats: PathBuf,
}

impl<R: CommandRunner> SignalEstimator<R> {
    pub fn new(runner: R, smoothing_factor: f64, policy: InterfacePolicy) -> Result<Self> {
        Ok(Self {
            runner,
            cache: SignalCache::new(smoothing_factor)?,
            policy,
            probes: DEFAULT_PROBE_ORDER.to_vec(),
            wireless_stats: PathBuf::from(PROC_NET_WIRELESS),
        })
    }

    /// Read link quality from `path` instead of `/proc/net/wireless`.
    pub fn with_wireless_stats(mut self, path: impl Into<PathBuf>) -> Self {
        self.wireless_stats = path.into();
        self
    }

    pub fn with_probes(mut self, probes: Vec<Probe>) -> Self {
        self.probes = probes;
        self
    }

    pub fn cache(&self) -> &SignalCache {
        &self.cache
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }


    /// Panel text for the current signal. Never fails; a panic anywhere in
    /// the cascade is reported as `"N/A"`.
    pub fn estimate(&mut self) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| self.report())) {
            Ok(report) => report.to_string(),
            Err(_) => NOT_AVAILABLE.to_string(),
        }
    }

    pub fn report(&mut self) -> SignalReport {
        let ssid = self
            .runner
            .run("iwgetid", &["-r"])
            .and_then(|out| parse::parse_ssid(&out));
        let interface = self.resolve_interface();

        let ctx = ProbeContext {
            interface: interface.as_deref(),
            iwconfig: OnceCell::new(),
        };
        let sample = self
            .probes
            .iter()
            .find_map(|probe| match self.run_probe(*probe, &ctx) {
                ProbeResult::Found(sample) => Some(sample),
                ProbeResult::NotFound => None,
            });

        let reading = match sample {
            Some(Sample::Dbm(raw)) => {
                let dbm = self.cache.blend(raw).round() as i32;
                SignalReading::Rssi {
                    dbm,
                    percent: dbm_to_percent(dbm),
                }
            }
            Some(Sample::Percent(percent)) => SignalReading::Percent(percent),
            None => SignalReading::Unavailable,
        };
        SignalReport { ssid, reading }
    }

    fn resolve_interface(&mut self) -> Option<String> {
        if self.cache.needs_discovery(self.policy) {
            let found = self.discover_interface();
            self.cache.record_discovery(found);
        }
        self.cache.interface_name().map(str::to_string)
    }

    fn discover_interface(&self) -> Option<String> {
        self.runner
            .run("iw", &["dev"])
            .and_then(|out| parse::parse_iw_dev_interface(&out))
            .or_else(|| {
                read_optional(&self.wireless_stats)
                    .and_then(|contents| parse::first_wireless_interface(&contents))
            })
    }

    fn run_probe(&self, probe: Probe, ctx: &ProbeContext<'_>) -> ProbeResult {
        let sample = match probe {
            Probe::IwLink => ctx.interface.and_then(|iface| {
                self.runner
                    .run("iw", &["dev", iface, "link"])
                    .and_then(|out| parse::parse_iw_link_signal(&out))
                    .map(Sample::Dbm)
            }),
            Probe::ProcWireless => read_optional(&self.wireless_stats)
                .and_then(|contents| parse::wireless_quality_percent(&contents, ctx.interface))
                .map(Sample::Percent),
            Probe::IwconfigSignal => self
                .iwconfig(ctx)
                .and_then(parse::parse_signal_level)
                .map(Sample::Dbm),
            Probe::IwconfigQuality => self
                .iwconfig(ctx)
                .and_then(parse::parse_link_quality_ratio)
                .map(Sample::Percent),
        };
        match sample {
            Some(sample) => ProbeResult::Found(sample),
            None => ProbeResult::NotFound,
        }
    }

    fn iwconfig<'c>(&self, ctx: &'c ProbeContext<'_>) -> Option<&'c str> {
        ctx.iwconfig
            .get_or_init(|| self.runner.run("iwconfig", &[]))
            .as_deref()
    }
}

fn read_optional(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::ScriptedRunner;

    const NO_FILE: &str = "/nonexistent/statuspanel/wireless";

    fn estimator(runner: ScriptedRunner) -> SignalEstimator<ScriptedRunner> {
        SignalEstimator::new(runner, 0.3, InterfacePolicy::Sticky)
            .unwrap()
            .with_wireless_stats(NO_FILE)
    }

    fn link_output(dbm: i32) -> String {
        format!("Connected to aa:bb:cc:dd:ee:ff (on wlan0)\n\tsignal: {dbm} dBm\n")
    }

    #[test]
    fn dbm_percent_clamps_and_scales() {
        for dbm in [-130, -101, -100] {
            assert_eq!(dbm_to_percent(dbm), 0);
        }
        for dbm in [-50, -49, 0, 20] {
            assert_eq!(dbm_to_percent(dbm), 100);
        }
        for dbm in -99..-50 {
            assert_eq!(i32::from(dbm_to_percent(dbm)), 2 * (dbm + 100));
        }
    }

    #[test]
    fn report_formats() {
        let with_ssid = |reading| SignalReport {
            ssid: Some("home".into()),
            reading,
        };
        assert_eq!(
            with_ssid(SignalReading::Rssi { dbm: -66, percent: 68 }).to_string(),
            "home 68% (-66 dBm)"
        );
        assert_eq!(with_ssid(SignalReading::Percent(77)).to_string(), "home 77%");
        assert_eq!(with_ssid(SignalReading::Unavailable).to_string(), "home");
        let bare = SignalReport {
            ssid: None,
            reading: SignalReading::Unavailable,
        };
        assert_eq!(bare.to_string(), "No WiFi");
    }

    #[test]
    fn steady_signal_reports_sixty_percent() {
        let runner = ScriptedRunner::new()
            .with("iw dev", "\tInterface wlan0\n")
            .with("iw dev wlan0 link", &link_output(-70));
        let mut est = estimator(runner);
        for _ in 0..3 {
            assert_eq!(est.estimate(), "60% (-70 dBm)");
            let smoothed = est.cache().last_smoothed_rssi().unwrap();
            assert!((smoothed - -70.0).abs() < 1e-9, "got {smoothed}");
        }
    }

    #[test]
    fn changing_signal_is_smoothed() {
        let mut runner = ScriptedRunner::new()
            .with("iw dev", "\tInterface wlan0\n")
            .with("iw dev wlan0 link", &link_output(-60));
        runner.set("iwgetid -r", "home");
        let mut est = estimator(runner);
        assert_eq!(est.estimate(), "home 80% (-60 dBm)");

        est.runner.set("iw dev wlan0 link", &link_output(-80));
        assert_eq!(est.estimate(), "home 68% (-66 dBm)");
    }

    #[test]
    fn interface_discovery_runs_once() {
        let runner = ScriptedRunner::new()
            .with("iw dev", "\tInterface wlan0\n")
            .with("iw dev wlan0 link", &link_output(-55));
        let mut est = estimator(runner);
        est.estimate();
        est.estimate();
        assert_eq!(est.runner().call_count("iw dev"), 1);
        assert_eq!(est.runner().call_count("iw dev wlan0 link"), 2);
        assert_eq!(est.cache().interface_name(), Some("wlan0"));
    }

    #[test]
    fn sticky_policy_does_not_retry_missing_interface() {
        let mut est = estimator(ScriptedRunner::new());
        est.estimate();
        est.runner.set("iw dev", "\tInterface wlan0\n");
        est.estimate();
        assert_eq!(est.runner().call_count("iw dev"), 1);
        assert_eq!(est.cache().interface_name(), None);
    }

    #[test]
    fn retry_policy_picks_up_late_interface() {
        let mut est = SignalEstimator::new(
            ScriptedRunner::new(),
            0.3,
            InterfacePolicy::RetryWhenMissing,
        )
        .unwrap()
        .with_wireless_stats(NO_FILE);
        assert_eq!(est.estimate(), "No WiFi");
        est.runner.set("iw dev", "\tInterface wlan1\n");
        est.runner.set("iw dev wlan1 link", &link_output(-75));
        assert_eq!(est.estimate(), "50% (-75 dBm)");
        est.estimate();
        assert_eq!(est.runner().call_count("iw dev"), 2);
    }

    #[test]
    fn total_failure_reports_no_wifi_or_ssid() {
        let mut est = estimator(ScriptedRunner::new());
        assert_eq!(est.estimate(), "No WiFi");

        est.runner.set("iwgetid -r", "cafe-guest\n");
        assert_eq!(est.estimate(), "cafe-guest");
        assert_eq!(est.cache().last_smoothed_rssi(), None);
    }

    #[test]
    fn iwconfig_signal_level_is_smoothed_too() {
        let runner = ScriptedRunner::new().with(
            "iwconfig",
            "wlan0  IEEE 802.11\n  Link Quality=40/70  Signal level=-70 dBm\n",
        );
        let mut est = estimator(runner);
        assert_eq!(est.estimate(), "60% (-70 dBm)");
        est.runner.set(
            "iwconfig",
            "wlan0  IEEE 802.11\n  Link Quality=40/70  Signal level=-90 dBm\n",
        );
        // -70 * 0.7 + -90 * 0.3 = -76
        assert_eq!(est.estimate(), "48% (-76 dBm)");
        assert_eq!(est.runner().call_count("iwconfig"), 2);
    }

    #[test]
    fn iwconfig_quality_is_last_resort() {
        let runner = ScriptedRunner::new().with(
            "iwconfig",
            "wlan0  IEEE 802.11\n  Link Quality=35/70  Signal level=35/100\n",
        );
        let mut est = estimator(runner);
        assert_eq!(est.estimate(), "50%");
        assert_eq!(est.runner().call_count("iwconfig"), 1);
    }

    #[test]
    fn custom_probe_order_is_respected() {
        let runner = ScriptedRunner::new()
            .with("iw dev", "\tInterface wlan0\n")
            .with("iw dev wlan0 link", &link_output(-55))
            .with("iwconfig", "Link Quality=35/70");
        let mut est = estimator(runner).with_probes(vec![Probe::IwconfigQuality, Probe::IwLink]);
        assert_eq!(est.estimate(), "50%");
        assert_eq!(est.runner().call_count("iw dev wlan0 link"), 0);
    }

    /// Panics on the first `iw` invocation, then defers to the script.
    struct FaultyRunner {
        inner: ScriptedRunner,
        faults_left: std::cell::Cell<u32>,
    }

    impl CommandRunner for FaultyRunner {
        fn run(&self, program: &str, args: &[&str]) -> Option<String> {
            if program == "iw" && self.faults_left.get() > 0 {
                self.faults_left.set(self.faults_left.get() - 1);
                panic!("iw blew up");
            }
            self.inner.run(program, args)
        }
    }

    #[test]
    fn internal_fault_reports_not_available_and_recovers() {
        let runner = FaultyRunner {
            inner: ScriptedRunner::new()
                .with("iw dev", "\tInterface wlan0\n")
                .with("iw dev wlan0 link", &link_output(-60)),
            faults_left: std::cell::Cell::new(1),
        };
        let mut est = SignalEstimator::new(runner, 0.3, InterfacePolicy::Sticky)
            .unwrap()
            .with_wireless_stats(NO_FILE);

        assert_eq!(est.estimate(), "N/A");
        assert_eq!(est.cache().interface_name(), None);
        assert_eq!(est.cache().last_smoothed_rssi(), None);

        assert_eq!(est.estimate(), "80% (-60 dBm)");
        assert_eq!(est.cache().interface_name(), Some("wlan0"));
        assert_eq!(est.runner().inner.call_count("iw dev"), 1);
    }
}
