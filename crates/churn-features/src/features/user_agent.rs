//! Browser classification of raw user-agent strings.

use std::fmt;

/// Normalized browser family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Edge,
    InternetExplorer,
    Firefox,
    Chrome,
    Safari,
    Other,
}

impl Browser {
    /// Classify a raw user-agent value.
    ///
    /// Surrounding double quotes are stripped and the match is
    /// case-insensitive. Tokens are checked in a fixed priority order, the
    /// first match wins: Chromium-based Edge and Chrome both advertise
    /// "Chrome" and "Safari", so the more specific tokens come first.
    /// Missing values classify as [`Browser::Other`].
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Other;
        };
        let ua = raw.trim_matches('"').to_lowercase();

        if ua.contains("edg") {
            Self::Edge
        } else if ua.contains("msie") || ua.contains("trident") {
            Self::InternetExplorer
        } else if ua.contains("firefox") {
            Self::Firefox
        } else if ua.contains("chrome") || ua.contains("crios") || ua.contains("chromium") {
            Self::Chrome
        } else if ua.contains("safari") {
            Self::Safari
        } else {
            Self::Other
        }
    }

    /// Name written to the feature table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edge => "Edge",
            Self::InternetExplorer => "Internet Explorer",
            Self::Firefox => "Firefox",
            Self::Chrome => "Chrome",
            Self::Safari => "Safari",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
