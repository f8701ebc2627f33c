use chrono::NaiveDateTime;
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use serde::Serialize;

use super::{draw_text, PanelFrame, BACKGROUND, BODY_FONT, HEADING_FONT, TEXT};
use crate::command::CommandRunner;
use crate::metrics::{parse::uptime_hours_minutes, SystemReader};
use crate::wifi::SignalEstimator;

pub const HEADING: &str = "RASPBERRY PI STATUS";
pub const MEMORY_ALERT_PERCENT: f32 = 80.0;
pub const DISK_ALERT_PERCENT: f32 = 90.0;

pub const HEADING_COLOR: Rgb888 = Rgb888::new(0, 255, 255);
pub const ALERT_COLOR: Rgb888 = Rgb888::new(255, 100, 100);
pub const ACCENT_COLOR: Rgb888 = Rgb888::new(100, 255, 100);
pub const DATE_COLOR: Rgb888 = Rgb888::new(200, 200, 200);
pub const CLOCK_COLOR: Rgb888 = Rgb888::new(255, 255, 0);

const LEFT: i32 = 5;
const TOP: i32 = 5;
const LINE_HEIGHT: i32 = 12;

/// Values shown in one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub cpu_percent: f32,
    pub temperature: String,
    pub memory_percent: f32,
    pub disk_percent: f32,
    pub ip_address: String,
    pub wifi: String,
    pub uptime_seconds: f64,
    pub load_average: f64,
    pub date: String,
    pub time: String,
}

impl StatusSnapshot {
    /// Poll every reader once. Each value is independent; a reader at its
    /// fallback does not affect the others.
    pub fn collect<R, W>(
        reader: &SystemReader<R>,
        estimator: &mut SignalEstimator<W>,
        now: NaiveDateTime,
    ) -> Self
    where
        R: CommandRunner,
        W: CommandRunner,
    {
        Self {
            cpu_percent: reader.cpu_info(),
            temperature: reader.cpu_temp(),
            memory_percent: reader.memory_info(),
            disk_percent: reader.disk_info(),
            ip_address: reader.ip_address(),
            wifi: estimator.estimate(),
            uptime_seconds: reader.uptime(),
            load_average: reader.load_average(),
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
        }
    }
}

/// A positioned line of panel text.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLine {
    pub text: String,
    pub y: i32,
    pub color: Rgb888,
    pub heading_font: bool,
}

impl PanelLine {
    fn font(&self) -> &'static MonoFont<'static> {
        if self.heading_font {
            HEADING_FONT
        } else {
            BODY_FONT
        }
    }
}

/// Lay out the status lines top to bottom.
pub fn status_lines(snapshot: &StatusSnapshot) -> Vec<PanelLine> {
    let mut lines = Vec::with_capacity(11);
    let mut y = TOP;
    let mut push = |text: String, y: i32, color: Rgb888, heading_font: bool| {
        lines.push(PanelLine {
            text,
            y,
            color,
            heading_font,
        })
    };

    push(HEADING.to_string(), y, HEADING_COLOR, true);
    y += LINE_HEIGHT + 3;
    push(format!("CPU: {:.1}%", snapshot.cpu_percent), y, TEXT, false);
    y += LINE_HEIGHT;
    push(format!("Temp: {}", snapshot.temperature), y, TEXT, false);
    y += LINE_HEIGHT;
    let mem_color = if snapshot.memory_percent > MEMORY_ALERT_PERCENT {
        ALERT_COLOR
    } else {
        TEXT
    };
    push(format!("RAM: {:.1}%", snapshot.memory_percent), y, mem_color, false);
    y += LINE_HEIGHT;
    let disk_color = if snapshot.disk_percent > DISK_ALERT_PERCENT {
        ALERT_COLOR
    } else {
        TEXT
    };
    push(format!("Disk: {:.1}%", snapshot.disk_percent), y, disk_color, false);
    y += LINE_HEIGHT + 2;
    push(format!("IP: {}", snapshot.ip_address), y, ACCENT_COLOR, false);
    y += LINE_HEIGHT + 2;
    push(format!("WiFi: {}", snapshot.wifi), y, ACCENT_COLOR, false);
    y += LINE_HEIGHT;
    let (hours, minutes) = uptime_hours_minutes(snapshot.uptime_seconds);
    push(format!("Up: {hours}h {minutes}m"), y, TEXT, false);
    y += LINE_HEIGHT;
    push(format!("Load: {:.2}", snapshot.load_average), y, TEXT, false);
    y += LINE_HEIGHT + 3;
    push(snapshot.date.clone(), y, DATE_COLOR, false);
    y += LINE_HEIGHT;
    push(snapshot.time.clone(), y, CLOCK_COLOR, true);

    lines
}

pub fn render_status(snapshot: &StatusSnapshot) -> PanelFrame {
    let mut frame = PanelFrame::new(BACKGROUND);
    for line in status_lines(snapshot) {
        draw_text(&mut frame, &line.text, LEFT, line.y, line.font(), line.color);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::ScriptedRunner;
    use crate::wifi::InterfacePolicy;
    use chrono::NaiveDate;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            cpu_percent: 12.34,
            temperature: "48.3°C".into(),
            memory_percent: 41.0,
            disk_percent: 55.5,
            ip_address: "192.168.1.20".into(),
            wifi: "home 68% (-66 dBm)".into(),
            uptime_seconds: 93_780.0,
            load_average: 0.5,
            date: "2026-10-19".into(),
            time: "08:15:00".into(),
        }
    }

    fn line<'a>(lines: &'a [PanelLine], prefix: &str) -> &'a PanelLine {
        lines
            .iter()
            .find(|l| l.text.starts_with(prefix))
            .unwrap_or_else(|| panic!("no line starting with {prefix}"))
    }

    #[test]
    fn lines_are_formatted_in_order() {
        let lines = status_lines(&snapshot());
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "RASPBERRY PI STATUS",
                "CPU: 12.3%",
                "Temp: 48.3°C",
                "RAM: 41.0%",
                "Disk: 55.5%",
                "IP: 192.168.1.20",
                "WiFi: home 68% (-66 dBm)",
                "Up: 26h 3m",
                "Load: 0.50",
                "2026-10-19",
                "08:15:00",
            ]
        );
        let ys: Vec<i32> = lines.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![5, 20, 32, 44, 56, 70, 84, 96, 108, 123, 135]);
    }

    #[test]
    fn thresholds_switch_to_alert_color() {
        let mut snap = snapshot();
        snap.memory_percent = 80.0;
        snap.disk_percent = 90.0;
        let lines = status_lines(&snap);
        assert_eq!(line(&lines, "RAM").color, TEXT);
        assert_eq!(line(&lines, "Disk").color, TEXT);

        snap.memory_percent = 80.1;
        snap.disk_percent = 90.1;
        let lines = status_lines(&snap);
        assert_eq!(line(&lines, "RAM").color, ALERT_COLOR);
        assert_eq!(line(&lines, "Disk").color, ALERT_COLOR);
    }

    #[test]
    fn network_lines_use_accent_color() {
        let lines = status_lines(&snapshot());
        assert_eq!(line(&lines, "IP").color, ACCENT_COLOR);
        assert_eq!(line(&lines, "WiFi").color, ACCENT_COLOR);
        assert_eq!(lines[0].color, HEADING_COLOR);
        assert_eq!(lines.last().map(|l| l.color), Some(CLOCK_COLOR));
    }

    #[test]
    fn rendered_frame_carries_line_colors() {
        let frame = render_status(&snapshot());
        assert!(frame.count(HEADING_COLOR) > 0);
        assert!(frame.count(ACCENT_COLOR) > 0);
        assert!(frame.count(CLOCK_COLOR) > 0);
        assert_eq!(frame.count(ALERT_COLOR), 0);

        let mut hot = snapshot();
        hot.memory_percent = 95.0;
        assert!(render_status(&hot).count(ALERT_COLOR) > 0);
    }

    #[test]
    fn fallbacks_still_render_every_line() {
        let empty = tempfile::tempdir().unwrap();
        let reader = SystemReader::new(ScriptedRunner::new())
            .with_proc_root(empty.path())
            .with_disk_path(empty.path().join("missing"));
        let mut estimator = SignalEstimator::new(ScriptedRunner::new(), 0.3, InterfacePolicy::Sticky)
            .unwrap()
            .with_wireless_stats(empty.path().join("wireless"));
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        let snap = StatusSnapshot::collect(&reader, &mut estimator, now);
        assert_eq!(snap.temperature, "N/A");
        assert_eq!(snap.ip_address, "No IP");
        assert_eq!(snap.wifi, "No WiFi");
        assert_eq!(snap.memory_percent, 0.0);
        assert_eq!(snap.time, "08:15:00");

        let lines = status_lines(&snap);
        assert_eq!(lines.len(), 11);
        assert_eq!(line(&lines, "WiFi").text, "WiFi: No WiFi");
        assert!(render_status(&snap).count(TEXT) > 0);
    }
}
