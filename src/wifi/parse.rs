//! Adapters for the text emitted by the wireless tools.
//!
//! Each function takes captured output and nothing else, so the formats can
//! be pinned with golden strings.

/// Reported link quality that maps to 100 % in `/proc/net/wireless`.
pub const MAX_LINK_QUALITY: f32 = 70.0;

/// Lines at the top of `/proc/net/wireless` before the first interface row.
const WIRELESS_HEADER_LINES: usize = 2;

/// `iwgetid -r`: the bare SSID, or nothing when not associated.
pub fn parse_ssid(output: &str) -> Option<String> {
    let ssid = output.trim();
    if ssid.is_empty() {
        None
    } else {
        Some(ssid.to_string())
    }
}

/// `iw dev`: name from the first `Interface <name>` line.
///
/// ```text
/// phy#0
///     Interface wlan0
///         ifindex 3
/// ```
pub fn parse_iw_dev_interface(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("Interface"), Some(name)) => Some(name.to_string()),
            _ => None,
        }
    })
}

/// `iw dev <iface> link`: first signed integer after `signal:`.
///
/// ```text
/// Connected to aa:bb:cc:dd:ee:ff (on wlan0)
///     SSID: home
///     signal: -52 dBm
/// ```
pub fn parse_iw_link_signal(output: &str) -> Option<i32> {
    let (_, rest) = output.split_once("signal:")?;
    leading_signed_int(rest.trim_start()).map(|(value, _)| value)
}

/// `iwconfig`: dBm value from `Signal level=<int>`.
///
/// Stricter than taking the first integer after `Signal level=`: a relative
/// level such as `Signal level=60/100` would read as 60 dBm that way, so it
/// yields `None` here and the link quality probe reports it instead.
pub fn parse_signal_level(output: &str) -> Option<i32> {
    let (_, rest) = output.split_once("Signal level=")?;
    let (value, tail) = leading_signed_int(rest)?;
    if tail.starts_with('/') {
        return None;
    }
    Some(value)
}

/// `iwconfig`: `Link Quality=<q>/<max>` as a percentage.
pub fn parse_link_quality_ratio(output: &str) -> Option<u8> {
    let (_, rest) = output.split_once("Link Quality=")?;
    let token = rest.split_whitespace().next()?;
    let (quality, max) = token.split_once('/')?;
    let quality: f32 = quality.parse().ok()?;
    let max: f32 = max.parse().ok()?;
    if max <= 0.0 {
        return None;
    }
    Some(clamp_percent(quality / max * 100.0))
}

/// One interface row of `/proc/net/wireless`.
#[derive(Debug, Clone, PartialEq)]
pub struct WirelessRow {
    pub interface: String,
    pub link_quality: Option<f32>,
}

/// Interface rows of `/proc/net/wireless`, header skipped.
///
/// ```text
/// Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
///  face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
///  wlan0: 0000   54.  -56.  -256        0      0      0      0     17        0
/// ```
pub fn parse_wireless_rows(contents: &str) -> Vec<WirelessRow> {
    contents
        .lines()
        .skip(WIRELESS_HEADER_LINES)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            let interface = parts[0].trim_end_matches(':').to_string();
            if interface.is_empty() {
                return None;
            }
            let link_quality = parts[2].trim_end_matches('.').parse::<f32>().ok();
            Some(WirelessRow {
                interface,
                link_quality,
            })
        })
        .collect()
}

/// First interface listed in `/proc/net/wireless`.
pub fn first_wireless_interface(contents: &str) -> Option<String> {
    parse_wireless_rows(contents)
        .into_iter()
        .next()
        .map(|row| row.interface)
}

/// Link quality percentage for `interface`, or for the first row with a
/// readable quality when no interface is known.
pub fn wireless_quality_percent(contents: &str, interface: Option<&str>) -> Option<u8> {
    let rows = parse_wireless_rows(contents);
    let quality = match interface {
        Some(name) => rows
            .iter()
            .find(|row| row.interface == name)
            .and_then(|row| row.link_quality),
        None => rows.iter().find_map(|row| row.link_quality),
    }?;
    Some(clamp_percent(quality / MAX_LINK_QUALITY * 100.0))
}

fn clamp_percent(value: f32) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

fn leading_signed_int(text: &str) -> Option<(i32, &str)> {
    let digits_start = usize::from(text.starts_with('-') || text.starts_with('+'));
    let digits_len = text[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    let end = digits_start + digits_len;
    text[..end].parse().ok().map(|value| (value, &text[end..]))
}
