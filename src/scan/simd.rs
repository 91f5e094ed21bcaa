// Tue Jan 15 2026 - Alex

use crate::pattern::{Signature, Pattern};
use crate::scan::{address_of, cancelled, kernels, mark_found, prefetch};
use std::sync::atomic::AtomicBool;

const SAMPLE_STRIDE: usize = 4096;
const PREFIX_LEN: usize = 16;

/// Everything the vector loop needs, precomputed per scan: the chosen
/// anchor and a masked 16-byte prefix template.
struct AnchorProps {
    anchor_byte: u8,
    anchor_offset: usize,
    pattern16: [u8; PREFIX_LEN],
    mask16: [u8; PREFIX_LEN],
}

/// SIMD dynamic-anchor kernel. Picks the rarest-looking concrete byte in
/// the pattern prefix (judged against a sparse sample of the region),
/// sweeps for it a vector at a time, and confirms candidates against a
/// masked 16-byte prefix before full verification.
pub(crate) fn scan_dynamic_anchor(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    let pattern_len = sig.pattern().len();
    if pattern_len == 0 || span.len() < pattern_len {
        return None;
    }

    let frequencies = sample_frequencies(span);
    let props = match select_anchor(sig.pattern(), &frequencies) {
        Some(props) => props,
        // No concrete byte in the first 16 positions: the scalar kernel
        // anchors on the first solid byte wherever it sits.
        None => return kernels::scan_dynamic_anchor(sig, span, cancel),
    };

    unsafe { scan_vectored(sig, span, cancel, &props) }
}

/// Byte-frequency histogram over one byte per 4 KiB of the region, or
/// every byte when the region is smaller than one stride.
fn sample_frequencies(span: &[u8]) -> [u32; 256] {
    let mut frequencies = [0u32; 256];
    if span.len() < SAMPLE_STRIDE {
        for &byte in span {
            frequencies[byte as usize] += 1;
        }
    } else {
        let mut i = 0;
        while i < span.len() {
            frequencies[span[i] as usize] += 1;
            i += SAMPLE_STRIDE;
        }
    }
    frequencies
}

/// Score each concrete byte in the first 16 pattern positions as
/// `frequency + 2 * position` and take the minimum; ties keep the
/// earliest position so candidate starts rarely underflow the span.
fn select_anchor(pattern: &Pattern, frequencies: &[u32; 256]) -> Option<AnchorProps> {
    let mut best: Option<(u32, usize, u8)> = None;
    for (i, element) in pattern.elements().iter().take(PREFIX_LEN).enumerate() {
        if let Some(value) = element.value() {
            let score = frequencies[value as usize] + (i as u32) * 2;
            if best.map_or(true, |(best_score, _, _)| score < best_score) {
                best = Some((score, i, value));
            }
        }
    }
    let (_, anchor_offset, anchor_byte) = best?;

    let mut pattern16 = [0u8; PREFIX_LEN];
    let mut mask16 = [0u8; PREFIX_LEN];
    for (i, element) in pattern.elements().iter().take(PREFIX_LEN).enumerate() {
        if let Some(value) = element.value() {
            pattern16[i] = value;
            mask16[i] = 0xFF;
        }
    }

    Some(AnchorProps {
        anchor_byte,
        anchor_offset,
        pattern16,
        mask16,
    })
}

#[cfg(target_arch = "x86_64")]
unsafe fn scan_vectored(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
    props: &AnchorProps,
) -> Option<usize> {
    use std::arch::x86_64::*;

    let pattern_len = sig.pattern().len();
    let total = span.len();
    let base = span.as_ptr();

    let v_anchor = _mm_set1_epi8(props.anchor_byte as i8);
    let v_pattern = _mm_loadu_si128(props.pattern16.as_ptr() as *const __m128i);
    let v_mask = _mm_loadu_si128(props.mask16.as_ptr() as *const __m128i);

    let mut pos = 0usize;
    while pos + PREFIX_LEN <= total {
        if cancelled(cancel) {
            return None;
        }
        prefetch(base.wrapping_add(pos + 64));

        let block = _mm_loadu_si128(base.add(pos) as *const __m128i);
        let mut hits = _mm_movemask_epi8(_mm_cmpeq_epi8(block, v_anchor)) as u32;
        // Lanes walk lowest to highest so the first verified candidate is
        // the lowest address in the block.
        while hits != 0 {
            let lane = hits.trailing_zeros() as usize;
            hits &= hits - 1;
            let hit = pos + lane;
            if hit < props.anchor_offset {
                continue;
            }
            let start = hit - props.anchor_offset;
            if start + pattern_len > total {
                continue;
            }
            if start + PREFIX_LEN <= total {
                let window = _mm_loadu_si128(base.add(start) as *const __m128i);
                let masked = _mm_and_si128(window, v_mask);
                let equal = _mm_movemask_epi8(_mm_cmpeq_epi8(masked, v_pattern)) as u32;
                if equal != 0xFFFF {
                    continue;
                }
                if pattern_len > PREFIX_LEN && !sig.full_match_at(span, start) {
                    continue;
                }
            } else if !sig.full_match_at(span, start) {
                // Too close to the end for a 16-byte load.
                continue;
            }
            mark_found(cancel);
            return Some(address_of(span, start));
        }
        pos += PREFIX_LEN;
    }

    scan_tail(sig, span, pos.saturating_sub(props.anchor_offset), cancel)
}

#[cfg(target_arch = "aarch64")]
unsafe fn scan_vectored(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
    props: &AnchorProps,
) -> Option<usize> {
    use std::arch::aarch64::*;

    let pattern_len = sig.pattern().len();
    let total = span.len();
    let base = span.as_ptr();

    let v_anchor = vdupq_n_u8(props.anchor_byte);
    let v_pattern = vld1q_u8(props.pattern16.as_ptr());
    let v_mask = vld1q_u8(props.mask16.as_ptr());

    let mut pos = 0usize;
    while pos + PREFIX_LEN <= total {
        if cancelled(cancel) {
            return None;
        }
        prefetch(base.wrapping_add(pos + 64));

        let block = vld1q_u8(base.add(pos));
        let compared = vceqq_u8(block, v_anchor);
        if vmaxvq_u8(compared) == 0 {
            pos += PREFIX_LEN;
            continue;
        }

        let mut lanes = [0u8; PREFIX_LEN];
        vst1q_u8(lanes.as_mut_ptr(), compared);
        // Lanes walk lowest to highest so the first verified candidate is
        // the lowest address in the block.
        for (lane, &lane_hit) in lanes.iter().enumerate() {
            if lane_hit != 0xFF {
                continue;
            }
            let hit = pos + lane;
            if hit < props.anchor_offset {
                continue;
            }
            let start = hit - props.anchor_offset;
            if start + pattern_len > total {
                continue;
            }
            if start + PREFIX_LEN <= total {
                let window = vld1q_u8(base.add(start));
                let masked = vandq_u8(window, v_mask);
                if vminvq_u8(vceqq_u8(masked, v_pattern)) != 0xFF {
                    continue;
                }
                if pattern_len > PREFIX_LEN && !sig.full_match_at(span, start) {
                    continue;
                }
            } else if !sig.full_match_at(span, start) {
                // Too close to the end for a 16-byte load.
                continue;
            }
            mark_found(cancel);
            return Some(address_of(span, start));
        }
        pos += PREFIX_LEN;
    }

    scan_tail(sig, span, pos.saturating_sub(props.anchor_offset), cancel)
}

/// Scalar sweep over candidate starts whose anchor falls past the last
/// full vector block.
fn scan_tail(
    sig: &Signature,
    span: &[u8],
    from: usize,
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    let pattern_len = sig.pattern().len();
    let mut start = from;
    while start + pattern_len <= span.len() {
        if cancelled(cancel) {
            return None;
        }
        if sig.full_match_at(span, start) {
            mark_found(cancel);
            return Some(address_of(span, start));
        }
        start += 1;
    }
    None
}
