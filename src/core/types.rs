use serde::{Deserialize, Serialize};

/// Unique identifier for an entry in the corpus
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orientation class of a single stroke.
///
/// The stored single-letter tokens are the on-disk contract of the reference corpus
/// and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionCode {
    /// Degenerate stroke (start == end)
    #[serde(rename = "h")]
    Dot,
    /// Roughly horizontal stroke
    #[serde(rename = "r")]
    Right,
    /// Strokes nearest -45 or 90 degrees
    #[serde(rename = "u")]
    DiagB,
    /// Strokes nearest -90 or 45 degrees
    #[serde(rename = "d")]
    DiagC,
    /// Reserved. No reference angle maps here and it has no stored token.
    ///
    /// Must stay last: a skipped variant shifts the indices used by binary snapshots.
    #[serde(skip)]
    DiagA,
}

impl DirectionCode {
    /// Stored token for this code, if it has one
    #[must_use]
    pub fn token(self) -> Option<&'static str> {
        match self {
            Self::Dot => Some("h"),
            Self::Right => Some("r"),
            Self::DiagB => Some("u"),
            Self::DiagC => Some("d"),
            Self::DiagA => None,
        }
    }

    /// Parse a stored token
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "h" => Some(Self::Dot),
            "r" => Some(Self::Right),
            "u" => Some(Self::DiagB),
            "d" => Some(Self::DiagC),
            _ => None,
        }
    }
}

impl std::fmt::Display for DirectionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.token() {
            Some(token) => write!(f, "{token}"),
            None => write!(f, "?"),
        }
    }
}
