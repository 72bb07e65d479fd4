//! Platform token shape heuristics.

/// Shape of a plaintext platform token, plus the KDF salt for its domain.
///
/// A token matches when its length is within bounds, it splits on
/// `delimiter` into exactly `segments` non-empty parts, every character is
/// ASCII alphanumeric, `_`, `-` or the delimiter, and (for `numeric_head`)
/// the first part is all digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenShape {
    /// Platform name, used in logs.
    pub platform: &'static str,
    /// Segment separator.
    pub delimiter: char,
    /// Exact number of segments.
    pub segments: usize,
    /// Whether the first segment must be numeric.
    pub numeric_head: bool,
    /// Minimum total length.
    pub min_len: usize,
    /// Maximum total length.
    pub max_len: usize,
    /// KDF salt distinguishing this credential domain.
    pub domain_salt: &'static str,
}

impl TokenShape {
    /// Telegram bot tokens: `<bot id digits>:<secret>`.
    pub fn telegram() -> Self {
        Self {
            platform: "telegram",
            delimiter: ':',
            segments: 2,
            numeric_head: true,
            min_len: 8,
            max_len: 100,
            domain_salt: "telegram-salt",
        }
    }

    /// Discord bot tokens: three dot-separated base64url segments.
    pub fn discord() -> Self {
        Self {
            platform: "discord",
            delimiter: '.',
            segments: 3,
            numeric_head: false,
            min_len: 50,
            max_len: 100,
            domain_salt: "discord-salt",
        }
    }

    /// Overrides the length bounds.
    pub fn with_length(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    /// Returns true if `candidate` looks like a plaintext token of this shape.
    pub fn matches(&self, candidate: &str) -> bool {
        let len = candidate.chars().count();
        if len < self.min_len || len > self.max_len {
            return false;
        }

        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';

        let mut count = 0;
        for (i, part) in candidate.split(self.delimiter).enumerate() {
            count += 1;
            if part.is_empty() || !part.chars().all(allowed) {
                return false;
            }
            if i == 0 && self.numeric_head && !part.chars().all(|c| c.is_ascii_digit()) {
                return false;
            }
        }

        count == self.segments
    }
}

/// Returns true if `candidate` already is a plaintext token of `shape`.
///
/// This is the only signal used to decide whether decryption succeeded.
pub fn looks_like_platform_token(candidate: &str, shape: &TokenShape) -> bool {
    shape.matches(candidate)
}
