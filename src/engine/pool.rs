// Tue Jan 13 2026 - Alex

use crate::engine::queue::WorkStealingQueue;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of OS-thread workers with per-worker deques. Tasks are
/// submitted round-robin; an idle worker first drains its own queue, then
/// steals from peers, then parks on the shared condvar.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

struct PoolShared {
    queues: Vec<WorkStealingQueue<Task>>,
    stop: AtomicBool,
    submission_idx: AtomicUsize,
    active_workers: AtomicUsize,
    idle_mutex: Mutex<()>,
    idle_cond: Condvar,
}

impl PoolShared {
    fn any_queue_populated(&self) -> bool {
        self.queues.iter().any(|q| !q.is_empty())
    }
}

impl ThreadPool {
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        log::debug!("spawning {} scan workers", threads);

        let shared = Arc::new(PoolShared {
            queues: (0..threads).map(|_| WorkStealingQueue::new()).collect(),
            stop: AtomicBool::new(false),
            submission_idx: AtomicUsize::new(0),
            active_workers: AtomicUsize::new(0),
            idle_mutex: Mutex::new(()),
            idle_cond: Condvar::new(),
        });

        let workers = (0..threads)
            .map(|id| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(id, shared))
            })
            .collect();

        Self { shared, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.shared.queues.len()
    }

    /// Queue a task without blocking. Wakes one parked worker, or all of
    /// them when every worker is already busy so a notification cannot go
    /// missing between the queue check and the park.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let shared = &self.shared;
        let count = shared.queues.len();
        let idx = shared.submission_idx.fetch_add(1, Ordering::Relaxed) % count;
        shared.queues[idx].push(Box::new(job));

        if shared.active_workers.load(Ordering::SeqCst) < count {
            shared.idle_cond.notify_one();
        } else {
            shared.idle_cond.notify_all();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        {
            let _guard = self.shared.idle_mutex.lock();
            self.shared.idle_cond.notify_all();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        log::debug!("scan workers joined");
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        let threads = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::new(threads)
    }
}

fn worker_loop(id: usize, shared: Arc<PoolShared>) {
    let count = shared.queues.len();

    while !shared.stop.load(Ordering::SeqCst) {
        shared.active_workers.fetch_add(1, Ordering::SeqCst);

        // Own queue first: front-pop keeps recently pushed work warm.
        if let Some(task) = shared.queues[id].pop() {
            task();
            shared.active_workers.fetch_sub(1, Ordering::SeqCst);
            continue;
        }

        // Then try to steal from a peer's tail.
        let mut stolen = None;
        for i in 1..count {
            if let Some(task) = shared.queues[(id + i) % count].steal() {
                stolen = Some(task);
                break;
            }
        }
        shared.active_workers.fetch_sub(1, Ordering::SeqCst);

        match stolen {
            Some(task) => task(),
            None => {
                let mut guard = shared.idle_mutex.lock();
                shared.idle_cond.wait_while(&mut guard, |_| {
                    !shared.stop.load(Ordering::SeqCst) && !shared.any_queue_populated()
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_single_worker_runs_task() {
        let pool = ThreadPool::new(1);
        let (tx, rx) = mpsc::channel();
        pool.submit(move || {
            let _ = tx.send(42);
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(42));
    }

    #[test]
    fn test_many_tasks_all_run() {
        let pool = ThreadPool::new(4);
        let (tx, rx) = mpsc::channel();
        for i in 0..100 {
            let tx = tx.clone();
            pool.submit(move || {
                let _ = tx.send(i);
            });
        }
        drop(tx);
        let mut seen: Vec<i32> = rx.iter().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_work_stealing_under_skew() {
        // One slow task occupies a worker while the rest get drained by
        // its peer through stealing.
        let pool = ThreadPool::new(2);
        let (tx, rx) = mpsc::channel();
        let slow_tx = tx.clone();
        pool.submit(move || {
            thread::sleep(Duration::from_millis(10));
            let _ = slow_tx.send(-1);
        });
        for i in 0..100 {
            let tx = tx.clone();
            pool.submit(move || {
                let _ = tx.send(i);
            });
        }
        drop(tx);
        assert_eq!(rx.iter().count(), 101);
    }

    #[test]
    fn test_drop_joins_workers() {
        let pool = ThreadPool::new(3);
        let (tx, rx) = mpsc::channel();
        for _ in 0..10 {
            let tx = tx.clone();
            pool.submit(move || {
                let _ = tx.send(());
            });
        }
        drop(tx);
        assert_eq!(rx.iter().count(), 10);
        drop(pool);
    }

    #[test]
    fn test_zero_threads_clamps_to_one() {
        let pool = ThreadPool::new(0);
        assert_eq!(pool.worker_count(), 1);
    }
}
