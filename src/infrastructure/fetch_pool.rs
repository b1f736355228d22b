//! Bounded fetch pool and per-run fetch cache
//!
//! [`BoundedFetchPool::run_all`] drives one future per item from the calling
//! task with a semaphore as the only throttle. Results land in the slot of
//! their input index, so output order always equals input order. Batches
//! exist only for progress reporting.
//!
//! [`FetchCache`] holds one in-flight cell per product code. The cell is
//! registered under a short synchronous lock before any await, so callers
//! racing on the same code share a single fetch.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OnceCell, Semaphore};
use tracing::{debug, info};

use crate::domain::ProductCode;
use crate::infrastructure::config::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedFetchPool {
    concurrency: usize,
    batch_size: usize,
}

impl Default for BoundedFetchPool {
    fn default() -> Self {
        Self::new(defaults::CONCURRENCY_DESCRIPTIONS, defaults::BATCH_SIZE)
    }
}

impl BoundedFetchPool {
    /// Both knobs are clamped to at least 1
    pub fn new(concurrency: usize, batch_size: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            batch_size: batch_size.max(1),
        }
    }

    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `worker` over every item with at most `concurrency` in flight
    pub async fn run_all<T, R, F, Fut>(&self, label: &str, items: Vec<T>, worker: F) -> Vec<R>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let total_batches = total.div_ceil(self.batch_size);
        info!(
            "🚀 [{}] {} items, concurrency {}, {} batches of {}",
            label, total, self.concurrency, total_batches, self.batch_size
        );

        let semaphore = Semaphore::new(self.concurrency);
        let semaphore = &semaphore;
        let worker = &worker;

        let mut in_flight: FuturesUnordered<_> = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| async move {
                let _permit = semaphore.acquire().await.ok();
                (index, worker(item).await)
            })
            .collect();

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut batch_remaining: Vec<usize> = (0..total_batches)
            .map(|batch| self.batch_size.min(total - batch * self.batch_size))
            .collect();
        let mut completed = 0;

        while let Some((index, result)) = in_flight.next().await {
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
            completed += 1;

            let batch = index / self.batch_size;
            if let Some(remaining) = batch_remaining.get_mut(batch) {
                *remaining -= 1;
                if *remaining == 0 {
                    info!(
                        "📦 [{}] batch {}/{} complete ({}/{})",
                        label,
                        batch + 1,
                        total_batches,
                        completed,
                        total
                    );
                }
            }
        }

        info!("✅ [{}] all {} items processed", label, total);
        slots.into_iter().flatten().collect()
    }
}

/// Memoized results keyed by product code, shared by reference for one run
#[derive(Debug)]
pub struct FetchCache<V> {
    cells: Mutex<HashMap<ProductCode, Arc<OnceCell<V>>>>,
}

impl<V> Default for FetchCache<V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> FetchCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, code: &ProductCode) -> Arc<OnceCell<V>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.entry(code.clone()).or_default().clone()
    }

    /// Return the cached value or run `fetch` once for this code
    pub async fn get_or_fetch<F, Fut>(&self, code: &ProductCode, fetch: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = self.cell(code);
        if let Some(value) = cell.get() {
            debug!("Cache hit for {}", code);
            return value.clone();
        }
        cell.get_or_init(fetch).await.clone()
    }

    /// Completed value for `code`, if any
    pub fn get(&self, code: &ProductCode) -> Option<V> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(code).and_then(|cell| cell.get().cloned())
    }

    /// Number of codes with a completed value
    pub fn len(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
