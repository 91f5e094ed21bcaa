// Tue Jan 13 2026 - Alex

pub mod pool;
pub mod queue;

pub use pool::ThreadPool;
pub use queue::WorkStealingQueue;

use std::sync::OnceLock;

static POOL: OnceLock<ThreadPool> = OnceLock::new();

/// Process-wide scan pool, one worker per hardware thread. Spawned on
/// first use and torn down with the process.
pub fn global() -> &'static ThreadPool {
    POOL.get_or_init(ThreadPool::default)
}
