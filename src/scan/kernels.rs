// Tue Jan 13 2026 - Alex

use crate::pattern::Signature;
use crate::scan::{address_of, cancelled, mark_found, prefetch};
use memchr::memchr;
use std::sync::atomic::AtomicBool;

/// Horspool scan for wildcard-free patterns. Probes the window's tail
/// byte, verifies the rest on a hit, and skips by the bad-character
/// shift otherwise.
pub(crate) fn scan_simple(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    let solid = sig.solid_bytes();
    let len = solid.len();
    if len == 0 || span.len() < len {
        return None;
    }
    let shift = sig.shift_table()?;
    let last = solid[len - 1];

    let mut i = 0;
    while i + len <= span.len() {
        let probe = span[i + len - 1];
        if probe == last {
            if cancelled(cancel) {
                return None;
            }
            prefetch(span[i..].as_ptr());
            if span[i..i + len - 1] == solid[..len - 1] {
                mark_found(cancel);
                return Some(address_of(span, i));
            }
        }
        i += shift[probe as usize];
    }
    None
}

/// Seek the concrete head byte, then verify the whole pattern at each hit.
pub(crate) fn scan_forward_anchor(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    let pattern_len = sig.pattern().len();
    if pattern_len == 0 || span.len() < pattern_len {
        return None;
    }
    let first = sig.first_byte();

    let mut pos = 0;
    while let Some(found) = memchr(first, &span[pos..]) {
        let hit = pos + found;
        if cancelled(cancel) {
            return None;
        }
        if hit + pattern_len > span.len() {
            break;
        }
        prefetch(span[hit..].as_ptr());
        if sig.full_match_at(span, hit) {
            mark_found(cancel);
            return Some(address_of(span, hit));
        }
        pos = hit + 1;
    }
    None
}

/// Seek the concrete tail byte; each hit at `p` implies a candidate start
/// of `p - (len - 1)`. Hits walk forward, so starts do too and the first
/// verified candidate is the lowest.
pub(crate) fn scan_backward_anchor(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    let pattern_len = sig.pattern().len();
    if pattern_len == 0 || span.len() < pattern_len {
        return None;
    }
    let last = sig.last_byte();
    let tail_offset = pattern_len - 1;

    let mut pos = 0;
    while let Some(found) = memchr(last, &span[pos..]) {
        let hit = pos + found;
        if cancelled(cancel) {
            return None;
        }
        if hit >= tail_offset {
            let start = hit - tail_offset;
            if start + pattern_len <= span.len() {
                prefetch(span[start..].as_ptr());
                if sig.full_match_at(span, start) {
                    mark_found(cancel);
                    return Some(address_of(span, start));
                }
            }
        }
        pos = hit + 1;
    }
    None
}

/// Seek the head byte and reject on the tail byte before paying for a
/// full verification. Cheapest filter for head-and-tail-anchored patterns.
pub(crate) fn scan_dual_anchor(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    let pattern_len = sig.pattern().len();
    if pattern_len == 0 || span.len() < pattern_len {
        return None;
    }
    let first = sig.first_byte();
    let last = sig.last_byte();

    let mut pos = 0;
    while let Some(found) = memchr(first, &span[pos..]) {
        let hit = pos + found;
        if cancelled(cancel) {
            return None;
        }
        if hit + pattern_len > span.len() {
            break;
        }
        prefetch(span[hit..].as_ptr());
        if span[hit + pattern_len - 1] == last && sig.full_match_at(span, hit) {
            mark_found(cancel);
            return Some(address_of(span, hit));
        }
        pos = hit + 1;
    }
    None
}

/// Both ends are wildcards: anchor on the first concrete byte wherever it
/// sits and derive candidate starts from it. An all-wildcard pattern has
/// no anchor and never matches.
pub(crate) fn scan_dynamic_anchor(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    let pattern_len = sig.pattern().len();
    if pattern_len == 0 || span.len() < pattern_len {
        return None;
    }
    let (anchor_offset, anchor) = sig.pattern().first_solid()?;

    let mut pos = 0;
    while let Some(found) = memchr(anchor, &span[pos..]) {
        let hit = pos + found;
        if cancelled(cancel) {
            return None;
        }
        if hit >= anchor_offset {
            let start = hit - anchor_offset;
            if start + pattern_len <= span.len() {
                prefetch(span[start..].as_ptr());
                if sig.full_match_at(span, start) {
                    mark_found(cancel);
                    return Some(address_of(span, start));
                }
            }
        }
        pos = hit + 1;
    }
    None
}
