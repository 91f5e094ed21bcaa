// Tue Jan 13 2026 - Alex

pub(crate) mod kernels;

#[cfg(feature = "multithreading")]
pub(crate) mod dispatch;

#[cfg(all(feature = "simd", any(target_arch = "x86_64", target_arch = "aarch64")))]
pub(crate) mod simd;

use crate::pattern::Signature;
use std::sync::atomic::{AtomicBool, Ordering};

/// Dynamic-anchor entry point: SIMD kernel when built for a capable
/// target, scalar kernel otherwise. Semantics are identical.
#[cfg(all(feature = "simd", any(target_arch = "x86_64", target_arch = "aarch64")))]
pub(crate) fn scan_dynamic(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    simd::scan_dynamic_anchor(sig, span, cancel)
}

#[cfg(not(all(feature = "simd", any(target_arch = "x86_64", target_arch = "aarch64"))))]
pub(crate) fn scan_dynamic(
    sig: &Signature,
    span: &[u8],
    cancel: Option<&AtomicBool>,
) -> Option<usize> {
    kernels::scan_dynamic_anchor(sig, span, cancel)
}

/// Another worker already produced a match; this one should give up.
#[inline(always)]
pub(crate) fn cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.map_or(false, |flag| flag.load(Ordering::Relaxed))
}

/// Tell the other workers to stop. Must happen before the kernel returns
/// its match.
#[inline(always)]
pub(crate) fn mark_found(cancel: Option<&AtomicBool>) {
    if let Some(flag) = cancel {
        flag.store(true, Ordering::Relaxed);
    }
}

#[inline(always)]
pub(crate) fn address_of(span: &[u8], offset: usize) -> usize {
    span.as_ptr() as usize + offset
}

#[cfg(all(feature = "hw_prefetch", target_arch = "x86_64"))]
#[inline(always)]
pub(crate) fn prefetch(pointer: *const u8) {
    use core::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
    unsafe { _mm_prefetch::<_MM_HINT_T0>(pointer as *const i8) };
}

#[cfg(not(all(feature = "hw_prefetch", target_arch = "x86_64")))]
#[inline(always)]
pub(crate) fn prefetch(_pointer: *const u8) {}
