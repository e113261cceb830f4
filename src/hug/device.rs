//! Device description derived from a `User-Agent` header.
//!
//! All user-agent heuristics live here. Everything else treats the result
//! as an opaque string.

use regex::Regex;
use std::sync::LazyLock;

static MAC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mac OS X (\d+_\d+(?:_\d+)?)").unwrap());
static ANDROID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Android (\d+(?:\.\d+){0,2})").unwrap());
static IPHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iPhone OS (\d+_\d+(?:_\d+)?)").unwrap());
static IPAD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"OS (\d+_\d+(?:_\d+)?)").unwrap());

static EDGE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Edg/(\d+\.\d+)").unwrap());
static OPERA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Opera/|OPR/)(\d+\.\d+)").unwrap());
static CHROME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Chrome/(\d+\.\d+)").unwrap());
static SAFARI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version/(\d+\.\d+)").unwrap());
static FIREFOX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Firefox/(\d+\.\d+)").unwrap());

/// Describe the device behind a user agent, e.g. `"macOS 14.2 | Safari 17.1"`.
/// Unrecognised parts come out as `"Unknown"`.
pub fn describe_device(user_agent: &str) -> String {
    format!("{} | {}", platform(user_agent), browser(user_agent))
}

fn versioned(name: &str, re: &Regex, ua: &str, underscores: bool) -> String {
    match re.captures(ua).and_then(|c| c.get(1)) {
        Some(m) if underscores => format!("{} {}", name, m.as_str().replace('_', ".")),
        Some(m) => format!("{} {}", name, m.as_str()),
        None => name.to_string(),
    }
}

fn platform(ua: &str) -> String {
    if ua.contains("Windows NT 10.0") {
        "Windows 10/11".into()
    } else if ua.contains("Windows NT 6.3") {
        "Windows 8.1".into()
    } else if ua.contains("Windows NT 6.1") {
        "Windows 7".into()
    } else if ua.contains("Windows") {
        "Windows".into()
    } else if ua.contains("iPhone") {
        versioned("iOS", &IPHONE_REGEX, ua, true)
    } else if ua.contains("iPad") {
        versioned("iPadOS", &IPAD_REGEX, ua, true)
    } else if ua.contains("Intel Mac OS X") {
        versioned("macOS", &MAC_REGEX, ua, true)
    } else if ua.contains("Android") {
        versioned("Android", &ANDROID_REGEX, ua, false)
    } else if ua.contains("CrOS") {
        "Chrome OS".into()
    } else if ua.contains("Linux") {
        "Linux".into()
    } else {
        "Unknown".into()
    }
}

fn browser(ua: &str) -> String {
    // Order matters: Edge and Opera also advertise Chrome, Chrome advertises Safari.
    if ua.contains("Edg/") {
        versioned("Edge", &EDGE_REGEX, ua, false)
    } else if ua.contains("OPR/") || ua.contains("Opera/") {
        versioned("Opera", &OPERA_REGEX, ua, false)
    } else if ua.contains("Chrome/") {
        versioned("Chrome", &CHROME_REGEX, ua, false)
    } else if ua.contains("Firefox/") {
        versioned("Firefox", &FIREFOX_REGEX, ua, false)
    } else if ua.contains("Safari/") {
        versioned("Safari", &SAFARI_REGEX, ua, false)
    } else {
        "Unknown".into()
    }
}
