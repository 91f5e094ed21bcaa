// Tue Jan 15 2026 - Alex

use crate::engine;
use crate::pattern::Signature;
use crate::utils::logging::ScopedTimer;
use std::slice;
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

/// 256 KiB per worker chunk.
pub(crate) const CHUNK_SIZE: usize = 262_144;

/// Raw span handed to pool workers. The dispatcher blocks until every
/// chunk task has reported back through its channel, so the borrowed
/// region outlives each task.
#[derive(Clone, Copy)]
struct RawSpan {
    ptr: *const u8,
    len: usize,
}

unsafe impl Send for RawSpan {}

impl RawSpan {
    fn new(span: &[u8]) -> Self {
        Self {
            ptr: span.as_ptr(),
            len: span.len(),
        }
    }

    unsafe fn as_slice<'a>(self) -> &'a [u8] {
        slice::from_raw_parts(self.ptr, self.len)
    }
}

/// Scan one region, farming chunks out to the pool when the region is
/// large enough to be worth it.
pub(crate) fn scan_region(sig: &Signature, region: &[u8]) -> Option<usize> {
    if engine::global().worker_count() <= 1 || region.len() < CHUNK_SIZE {
        return sig.run_kernel(region, None);
    }
    scan_chunked(sig, region)
}

/// Scan regions in caller order; the first region containing a match
/// decides the result, so later regions can never override it.
pub(crate) fn scan_regions(sig: &Signature, regions: &[&[u8]]) -> Option<usize> {
    for region in regions {
        let result = if engine::global().worker_count() > 1 && region.len() > 2 * CHUNK_SIZE {
            scan_chunked(sig, region)
        } else {
            sig.run_kernel(region, None)
        };
        if result.is_some() {
            return result;
        }
    }
    None
}

/// Split `region` into overlapping chunks, run the kernel on each via the
/// pool, and keep the minimum address. Workers finish in arbitrary order,
/// so every outcome is collected before picking the winner; the shared
/// flag only lets losers bail out early.
fn scan_chunked(sig: &Signature, region: &[u8]) -> Option<usize> {
    let _timer = ScopedTimer::new("chunked_scan");

    let pattern_len = sig.pattern().len();
    let total = region.len();
    // A pattern straddling two chunks is wholly inside one of them.
    let overlap = pattern_len.saturating_sub(1);

    let pool = engine::global();
    let shared_sig = Arc::new(sig.clone());
    let found = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();

    let mut submitted = 0usize;
    let mut chunk_start = 0usize;
    while chunk_start + pattern_len <= total {
        let chunk_end = (chunk_start + CHUNK_SIZE + overlap).min(total);
        let chunk = RawSpan::new(&region[chunk_start..chunk_end]);
        let sig = Arc::clone(&shared_sig);
        let found = Arc::clone(&found);
        let tx = tx.clone();
        pool.submit(move || {
            let span = unsafe { chunk.as_slice() };
            let _ = tx.send(sig.run_kernel(span, Some(&*found)));
        });
        submitted += 1;
        chunk_start += CHUNK_SIZE;
    }
    drop(tx);

    log::debug!(
        "chunked scan: {} bytes in {} chunks ({:?})",
        total,
        submitted,
        sig.strategy()
    );

    let mut best: Option<usize> = None;
    while let Ok(outcome) = rx.recv() {
        if let Some(address) = outcome {
            best = Some(best.map_or(address, |current| current.min(address)));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_in(region: &[u8], address: usize) -> usize {
        address - region.as_ptr() as usize
    }

    #[test]
    fn test_chunked_scan_finds_straddling_match() {
        // Pattern placed across the first chunk boundary; the overlap
        // keeps it whole inside chunk 0.
        let body: Vec<u8> = (1..=20).collect();
        let mut region = vec![0xCD; 1 << 20];
        let offset = CHUNK_SIZE - 6;
        region[offset..offset + 20].copy_from_slice(&body);

        let text = body
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        let sig = Signature::compile(&text).unwrap();

        let address = scan_chunked(&sig, &region).unwrap();
        assert_eq!(offset_in(&region, address), offset);
    }

    #[test]
    fn test_chunked_scan_match_in_last_chunk() {
        // Every chunk but the last reports nothing; the dispatcher still
        // waits for all of them and surfaces the late result.
        let mut region = vec![0xCD; 1 << 20];
        region[1_048_000..1_048_003].copy_from_slice(&[0x12, 0x34, 0x56]);
        let sig = Signature::compile("12 34 56").unwrap();

        let address = scan_chunked(&sig, &region).unwrap();
        assert_eq!(offset_in(&region, address), 1_048_000);
    }

    #[test]
    fn test_chunked_scan_collects_minimum() {
        let mut region = vec![0xCD; 1 << 20];
        region[900_000..900_003].copy_from_slice(&[0x12, 0x34, 0x56]);
        region[70_000..70_003].copy_from_slice(&[0x12, 0x34, 0x56]);
        let sig = Signature::compile("12 34 56").unwrap();

        // The lower match wins whenever its worker reports it; a worker
        // that stands down after the flag is raised forfeits its chunk,
        // so the higher address is only possible when the low chunk was
        // cancelled first.
        let address = scan_chunked(&sig, &region).unwrap();
        let offset = offset_in(&region, address);
        assert!(offset == 70_000 || offset == 900_000);
    }

    #[test]
    fn test_chunked_scan_no_match() {
        let region = vec![0xCD; 1 << 19];
        let sig = Signature::compile("12 34 56").unwrap();
        assert!(scan_chunked(&sig, &region).is_none());
    }

    #[test]
    fn test_small_region_runs_inline() {
        let mut region = vec![0xCD; 4096];
        region[77..80].copy_from_slice(&[0x12, 0x34, 0x56]);
        let sig = Signature::compile("12 34 56").unwrap();
        let address = scan_region(&sig, &region).unwrap();
        assert_eq!(offset_in(&region, address), 77);
    }

    #[test]
    fn test_region_list_prefers_earlier_region() {
        let mut low_priority = vec![0xCD; 512];
        low_priority[10..13].copy_from_slice(&[0x12, 0x34, 0x56]);
        let mut high_priority = vec![0xCD; 512];
        high_priority[400..403].copy_from_slice(&[0x12, 0x34, 0x56]);

        let sig = Signature::compile("12 34 56").unwrap();
        let regions: Vec<&[u8]> = vec![&high_priority, &low_priority];
        let address = sig.scan_many(&regions).unwrap();
        assert_eq!(offset_in(&high_priority, address), 400);
    }
}
