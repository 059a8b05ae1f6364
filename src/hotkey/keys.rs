//! Modifier and key parsing
//!
//! Turns configuration tokens such as `"ctrl-shift-win-alt"` and `"1"`
//! into the canonical modifier set and key used for registration.

use std::fmt;

/// Canonical set of modifiers required to trigger a hotkey
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet {
    /// Control key is required
    pub ctrl: bool,
    /// Alt (Option on macOS) is required
    pub alt: bool,
    /// Shift key is required
    pub shift: bool,
    /// Win (Super on Linux, Command on macOS) is required
    pub win: bool,
}

impl ModifierSet {
    /// Parse a free-form modifier string.
    ///
    /// Matching is case-insensitive substring containment against the four
    /// tokens `ctrl`, `alt`, `shift` and `win`, so order and separators do
    /// not matter. A string with none of them yields the empty set, which
    /// callers must reject.
    pub fn parse(modifiers: &str) -> Self {
        let lower = modifiers.to_ascii_lowercase();
        Self {
            ctrl: lower.contains("ctrl"),
            alt: lower.contains("alt"),
            shift: lower.contains("shift"),
            win: lower.contains("win"),
        }
    }

    /// Check if no modifier is set
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.win
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.ctrl, "ctrl"),
            (self.alt, "alt"),
            (self.shift, "shift"),
            (self.win, "win"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect();
        write!(f, "{}", names.join("+"))
    }
}

/// A key that can be bound to a layer or global action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Digit row key `0`-`9`
    Digit(u8),
    /// Function key `F1`-`F12`
    Function(u8),
}

/// Error returned for key tokens outside the supported table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key: {0}")]
pub struct KeyParseError(pub String);

impl Key {
    /// Parse a key token. There is no fallback key.
    pub fn parse(key: &str) -> Result<Self, KeyParseError> {
        let lower = key.trim().to_ascii_lowercase();

        if let [digit @ b'0'..=b'9'] = lower.as_bytes() {
            return Ok(Key::Digit(digit - b'0'));
        }

        if let Some(n) = lower.strip_prefix('f').and_then(function_number) {
            return Ok(Key::Function(n));
        }

        Err(KeyParseError(key.to_string()))
    }
}

/// `1`..`12` spelled exactly, without sign or leading zero
fn function_number(digits: &str) -> Option<u8> {
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| (1..=12).contains(n))
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Digit(d) => write!(f, "{}", d),
            Key::Function(n) => write!(f, "F{}", n),
        }
    }
}
