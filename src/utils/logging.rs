// Tue Jan 13 2026 - Alex

use std::time::Instant;

/// Hook the `log` facade up to `RUST_LOG`. Safe to call more than once;
/// later calls are ignored.
pub fn init_from_env() {
    let _ = env_logger::Builder::from_default_env().try_init();
}

pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        log::debug!("[TIMER] {} took {:.2}ms", self.name, elapsed.as_secs_f64() * 1000.0);
    }
}
