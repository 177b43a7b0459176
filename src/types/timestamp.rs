use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MS_PER_HOUR: i64 = 3_600_000;

/// The three look-back windows, in hours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "48h")]
    H48,
    #[serde(rename = "168h")]
    H168,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::H24, Window::H48, Window::H168];

    pub fn hours(&self) -> i64 {
        match self {
            Window::H24 => 24,
            Window::H48 => 48,
            Window::H168 => 168,
        }
    }

    pub fn millis(&self) -> i64 {
        self.hours() * MS_PER_HOUR
    }

    pub fn label(&self) -> &'static str {
        match self {
            Window::H24 => "24h",
            Window::H48 => "48h",
            Window::H168 => "168h",
        }
    }
}

/// Window boundaries fixed once per run so every symbol is measured against
/// the same `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookbackWindows {
    pub now_ms: i64,
}

impl LookbackWindows {
    pub fn ending_at(now_ms: i64) -> Self {
        LookbackWindows { now_ms }
    }

    pub fn now() -> Self {
        Self::ending_at(Utc::now().timestamp_millis())
    }

    pub fn start_of(&self, window: Window) -> i64 {
        self.now_ms - window.millis()
    }

    /// Open interval `(now - W, now)`: payouts exactly on either bound are
    /// left out.
    pub fn contains(&self, window: Window, timestamp: i64) -> bool {
        self.start_of(window) < timestamp && timestamp < self.now_ms
    }

    /// Widest window, which every narrower one is nested in.
    pub fn outer(&self) -> Window {
        Window::H168
    }
}

pub fn format_utc(timestamp_ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_exclusive() {
        let windows = LookbackWindows::ending_at(1_000 * MS_PER_HOUR);
        let start = windows.start_of(Window::H24);

        assert!(!windows.contains(Window::H24, start));
        assert!(windows.contains(Window::H24, start + 1));
        assert!(!windows.contains(Window::H24, windows.now_ms));
        assert!(windows.contains(Window::H48, start));
    }

    #[test]
    fn formats_payout_time() {
        assert_eq!(format_utc(0).as_deref(), Some("1970-01-01 00:00 UTC"));
    }
}
