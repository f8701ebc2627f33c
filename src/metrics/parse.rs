//! Parsers for the procfs files and vendor tools behind each counter.

/// `/proc/stat` aggregate `cpu` line: busy share of the first seven fields.
pub fn cpu_busy_percent(stat: &str) -> Option<f32> {
    let line = stat.lines().find(|line| line.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(7)
        .map(|field| field.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    if fields.len() < 4 {
        return None;
    }
    let total: u64 = fields.iter().sum();
    let idle = fields[3];
    if total == 0 {
        return Some(0.0);
    }
    Some(total.saturating_sub(idle) as f32 / total as f32 * 100.0)
}

/// `/proc/meminfo`: share of `MemTotal` not reported as `MemFree`.
pub fn memory_used_percent(meminfo: &str) -> Option<f32> {
    let mut total: u64 = 0;
    let mut free: u64 = 0;
    for line in meminfo.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("MemTotal:") => total = parts.next()?.parse().ok()?,
            Some("MemFree:") => free = parts.next()?.parse().ok()?,
            _ => {}
        }
    }
    if total == 0 {
        return Some(0.0);
    }
    Some(total.saturating_sub(free) as f32 / total as f32 * 100.0)
}

/// Used share of a filesystem from its block counts.
pub fn disk_used_percent(blocks: u64, free_blocks: u64) -> f32 {
    if blocks == 0 {
        return 0.0;
    }
    blocks.saturating_sub(free_blocks) as f32 / blocks as f32 * 100.0
}

/// First whitespace field as a float; `/proc/uptime` and `/proc/loadavg`.
pub fn first_field(contents: &str) -> Option<f64> {
    contents.split_whitespace().next()?.parse().ok()
}

/// `vcgencmd measure_temp`: `temp=48.3'C` to `48.3`.
pub fn vcgencmd_temp(output: &str) -> Option<f32> {
    let (_, rest) = output.split_once("temp=")?;
    let (value, _) = rest.split_once('\'')?;
    value.trim().parse().ok()
}

/// `hostname -I`: first address.
pub fn first_address(output: &str) -> Option<String> {
    output.split_whitespace().next().map(str::to_string)
}

/// Whole hours and leftover minutes of an uptime in seconds.
pub fn uptime_hours_minutes(seconds: f64) -> (u64, u64) {
    let seconds = seconds.max(0.0) as u64;
    (seconds / 3600, (seconds % 3600) / 60)
}
