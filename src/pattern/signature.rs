// Tue Jan 13 2026 - Alex

use crate::pattern::strategy::{self, ScanStrategy};
use crate::pattern::{Pattern, PatternError};
use crate::scan;
use std::fmt;
use std::sync::atomic::AtomicBool;

/// A pattern compiled for scanning: the parsed elements plus the strategy
/// classification and whatever precomputed tables that strategy needs.
/// Immutable after construction and freely shareable across threads.
#[derive(Debug, Clone)]
pub struct Signature {
    pattern: Pattern,
    strategy: ScanStrategy,
    // Anchor bytes are meaningful only when the strategy anchors the
    // corresponding end; they default to zero otherwise.
    first_byte: u8,
    last_byte: u8,
    // Populated for Simple only: the full byte string and its Horspool table.
    solid_bytes: Vec<u8>,
    shift: Option<Box<[usize; 256]>>,
}

impl Signature {
    /// Compile an IDA-style signature string.
    pub fn compile(text: &str) -> Result<Self, PatternError> {
        Ok(Self::from_pattern(Pattern::from_ida(text)?))
    }

    /// Compile an already-parsed pattern.
    pub fn from_pattern(pattern: Pattern) -> Self {
        let strategy = ScanStrategy::classify(&pattern);

        let first_byte = pattern.elements().first().and_then(|e| e.value()).unwrap_or(0);
        let last_byte = pattern.elements().last().and_then(|e| e.value()).unwrap_or(0);

        let (solid_bytes, shift) = if strategy == ScanStrategy::Simple && !pattern.is_empty() {
            let solid: Vec<u8> = pattern.elements().iter().filter_map(|e| e.value()).collect();
            let table = strategy::build_shift_table(&solid);
            (solid, Some(table))
        } else {
            (Vec::new(), None)
        };

        Self {
            pattern,
            strategy,
            first_byte,
            last_byte,
            solid_bytes,
            shift,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn strategy(&self) -> ScanStrategy {
        self.strategy
    }

    pub(crate) fn first_byte(&self) -> u8 {
        self.first_byte
    }

    pub(crate) fn last_byte(&self) -> u8 {
        self.last_byte
    }

    pub(crate) fn solid_bytes(&self) -> &[u8] {
        &self.solid_bytes
    }

    pub(crate) fn shift_table(&self) -> Option<&[usize; 256]> {
        self.shift.as_deref()
    }

    /// True when every pattern element matches `span` at `offset`.
    /// Wildcards match any byte. `offset + len` must fit inside `span`.
    /// Simple signatures never come through here; their kernel compares
    /// the solid byte string directly.
    pub(crate) fn full_match_at(&self, span: &[u8], offset: usize) -> bool {
        let len = self.pattern.len();
        if offset + len > span.len() {
            return false;
        }
        self.pattern
            .elements()
            .iter()
            .zip(&span[offset..offset + len])
            .all(|(element, &byte)| match element.value() {
                Some(expected) => expected == byte,
                None => true,
            })
    }

    /// Scan a single memory region. Returns the absolute address of the
    /// lowest match start, or `None`.
    pub fn scan(&self, region: &[u8]) -> Option<usize> {
        if self.pattern.is_empty() || region.len() < self.pattern.len() {
            return None;
        }
        self.scan_region(region)
    }

    /// Scan a list of regions in caller order. A match in an earlier
    /// region always wins over any match in a later one.
    pub fn scan_many(&self, regions: &[&[u8]]) -> Option<usize> {
        if self.pattern.is_empty() {
            return None;
        }
        self.scan_region_list(regions)
    }

    #[cfg(feature = "multithreading")]
    fn scan_region(&self, region: &[u8]) -> Option<usize> {
        scan::dispatch::scan_region(self, region)
    }

    #[cfg(not(feature = "multithreading"))]
    fn scan_region(&self, region: &[u8]) -> Option<usize> {
        self.run_kernel(region, None)
    }

    #[cfg(feature = "multithreading")]
    fn scan_region_list(&self, regions: &[&[u8]]) -> Option<usize> {
        scan::dispatch::scan_regions(self, regions)
    }

    #[cfg(not(feature = "multithreading"))]
    fn scan_region_list(&self, regions: &[&[u8]]) -> Option<usize> {
        for region in regions {
            if let Some(address) = self.run_kernel(region, None) {
                return Some(address);
            }
        }
        None
    }

    /// Run the strategy's kernel over one contiguous span.
    pub(crate) fn run_kernel(&self, span: &[u8], cancel: Option<&AtomicBool>) -> Option<usize> {
        match self.strategy {
            ScanStrategy::Simple => scan::kernels::scan_simple(self, span, cancel),
            ScanStrategy::ForwardAnchor => scan::kernels::scan_forward_anchor(self, span, cancel),
            ScanStrategy::BackwardAnchor => scan::kernels::scan_backward_anchor(self, span, cancel),
            ScanStrategy::DualAnchor => scan::kernels::scan_dual_anchor(self, span, cancel),
            ScanStrategy::DynamicAnchor => scan::scan_dynamic(self, span, cancel),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}
