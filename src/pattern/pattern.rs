// Tue Jan 13 2026 - Alex

use crate::pattern::error::PatternError;
use crate::pattern::parser;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternElement {
    Byte(u8),
    Wildcard,
}

impl PatternElement {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, PatternElement::Wildcard)
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            PatternElement::Byte(value) => Some(*value),
            PatternElement::Wildcard => None,
        }
    }
}

/// Parsed signature body: concrete bytes interleaved with single-byte
/// wildcards. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    elements: Vec<PatternElement>,
}

impl Pattern {
    pub(crate) fn new(elements: Vec<PatternElement>) -> Self {
        Self { elements }
    }

    /// Parse an IDA-style signature string, e.g. `"48 8B ?? AA"`.
    pub fn from_ida(text: &str) -> Result<Self, PatternError> {
        parser::parse(text)
    }

    /// Wildcard-free pattern straight from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            elements: bytes.iter().map(|&b| PatternElement::Byte(b)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    pub fn has_wildcards(&self) -> bool {
        self.elements.iter().any(|e| e.is_wildcard())
    }

    pub fn starts_with_wildcard(&self) -> bool {
        self.elements.first().map_or(false, |e| e.is_wildcard())
    }

    pub fn ends_with_wildcard(&self) -> bool {
        self.elements.last().map_or(false, |e| e.is_wildcard())
    }

    /// Position and value of the first concrete byte, if any.
    pub fn first_solid(&self) -> Option<(usize, u8)> {
        self.elements
            .iter()
            .enumerate()
            .find_map(|(i, e)| e.value().map(|b| (i, b)))
    }

    pub fn to_hex_string(&self) -> String {
        self.elements
            .iter()
            .map(|e| match e.value() {
                Some(b) => format!("{:02X}", b),
                None => "??".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}
