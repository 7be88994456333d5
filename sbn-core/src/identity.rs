//! Node and message identity types.

use std::fmt;

/// Maximum length of an `Ident` string, matching the fixed-size wire field.
pub const IDENT_MAX_LEN: usize = 32;

/// A processor's stable numeric identity within a `Net`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CpuId(pub u32);

impl CpuId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CpuId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Protocol version identity string, carried in `ANNOUNCE` frames.
///
/// Fixed maximum length on the wire; longer strings are truncated when
/// constructed via [`Ident::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident(String);

impl Ident {
    /// Build an `Ident`, truncating to `IDENT_MAX_LEN` bytes if needed.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        let mut s = s.into();
        if s.len() > IDENT_MAX_LEN {
            s.truncate(IDENT_MAX_LEN);
        }
        Self(s)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The subject key used by the Software Bus for publish/subscribe routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mid(pub u16);

impl Mid {
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

impl fmt::Display for Mid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl From<u16> for Mid {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

/// Quality-of-service hint attached to a local subscription. SBN forwards
/// it opaquely in `SUBSCRIBE` frames; it has no effect on SBN's own
/// delivery semantics (no guaranteed delivery, see Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QosHint(pub u8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_truncates_to_max_len() {
        let long = "x".repeat(IDENT_MAX_LEN + 10);
        let ident = Ident::new(long);
        assert_eq!(ident.as_str().len(), IDENT_MAX_LEN);
    }

    #[test]
    fn ident_short_is_untouched() {
        let ident = Ident::new("SBN-v1.0");
        assert_eq!(ident.as_str(), "SBN-v1.0");
    }

    #[test]
    fn cpu_id_display() {
        assert_eq!(CpuId::new(7).to_string(), "7");
    }

    #[test]
    fn mid_display_is_hex() {
        assert_eq!(Mid::new(0x1820).to_string(), "0x1820");
    }
}
