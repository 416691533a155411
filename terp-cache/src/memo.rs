//! The memoizing wrapper.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use terp_core::error::{Result, TerpError};

use crate::clock::{bucket_index, Clock, SystemClock};
use crate::config::MemoConfig;
use crate::key::{CacheKey, KeyError, KeyPart};

/// Error returned by [`TtlMemo::call`].
#[derive(Debug, Error)]
pub enum MemoError<E> {
    /// The arguments could not be turned into a key; the function was not run.
    #[error(transparent)]
    Key(#[from] KeyError),
    /// The wrapped function failed. Failures are never cached.
    #[error("memoized function failed: {0}")]
    Call(E),
}

impl<E> MemoError<E> {
    /// Returns the wrapped function's error, if that is what failed.
    pub fn into_call_error(self) -> Option<E> {
        match self {
            MemoError::Call(e) => Some(e),
            MemoError::Key(_) => None,
        }
    }
}

/// Snapshot of a memoizer's counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    /// Calls answered without running the wrapped function
    pub hits: u64,
    /// Calls that ran the wrapped function
    pub misses: u64,
    /// Entry bound
    pub max_entries: usize,
    /// Entries currently held, including ones from past buckets
    pub current_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MemoKey {
    args: Vec<KeyPart>,
    bucket: i64,
}

/// A computation other callers of the same key can wait on.
struct Flight<R> {
    /// `None` while running, then `Some(None)` on failure or `Some(Some(r))`.
    outcome: Mutex<Option<Option<R>>>,
    done: Condvar,
}

impl<R: Clone> Flight<R> {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn wait(&self) -> Option<R> {
        let mut outcome = self.outcome.lock();
        while outcome.is_none() {
            self.done.wait(&mut outcome);
        }
        (*outcome).clone().flatten()
    }

    fn finish(&self, value: Option<R>) {
        *self.outcome.lock() = Some(value);
        self.done.notify_all();
    }
}

struct Store<R> {
    entries: LruCache<MemoKey, R>,
    in_flight: HashMap<MemoKey, Arc<Flight<R>>>,
}

enum Role<R> {
    Hit(R),
    Wait(Arc<Flight<R>>),
    Lead(Arc<Flight<R>>),
}

/// Clears a key's in-flight marker if the leader leaves without a value,
/// whether `f` returned an error or panicked.
struct FlightGuard<'a, R: Clone> {
    store: &'a Mutex<Store<R>>,
    key: &'a MemoKey,
    flight: &'a Flight<R>,
    settled: bool,
}

impl<R: Clone> Drop for FlightGuard<'_, R> {
    fn drop(&mut self) {
        if !self.settled {
            self.store.lock().in_flight.remove(self.key);
            self.flight.finish(None);
        }
    }
}

/// A function wrapped with a bounded-staleness LRU cache.
///
/// Each wrapper owns its store; two wrappers never share results.
///
/// # Thread Safety
///
/// The store lock covers lookup, LRU promotion, insert and eviction. The
/// wrapped function runs with the lock released, but only one caller per
/// key computes at a time: the others wait for its result. If that call
/// fails, nothing is cached and each waiter retries.
pub struct TtlMemo<A: ?Sized, R, E, F> {
    func: F,
    config: MemoConfig,
    clock: Arc<dyn Clock>,
    store: Mutex<Store<R>>,
    hits: AtomicU64,
    misses: AtomicU64,
    _marker: PhantomData<fn(&A) -> std::result::Result<R, E>>,
}

impl<A, R, E, F> TtlMemo<A, R, E, F>
where
    A: CacheKey + ?Sized,
    R: Clone,
    F: Fn(&A) -> std::result::Result<R, E>,
{
    /// Wraps `func` using the system clock.
    pub fn new(config: MemoConfig, func: F) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock), func)
    }

    /// Wraps `func`, reading time from `clock`.
    pub fn with_clock(config: MemoConfig, clock: Arc<dyn Clock>, func: F) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.max_entries)
            .ok_or_else(|| TerpError::ConfigError("max_entries must be positive".into()))?;

        Ok(Self {
            func,
            config,
            clock,
            store: Mutex::new(Store {
                entries: LruCache::new(capacity),
                in_flight: HashMap::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            _marker: PhantomData,
        })
    }

    /// Returns the cached result for `args` in the current bucket, or runs
    /// the wrapped function and caches its result.
    pub fn call(&self, args: &A) -> std::result::Result<R, MemoError<E>> {
        let key = MemoKey {
            args: args.to_key(self.config.typed)?,
            bucket: bucket_index(self.clock.now(), self.config.max_age),
        };

        loop {
            match self.claim(&key) {
                Role::Hit(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    trace!(bucket = key.bucket, "memo hit");
                    return Ok(value);
                }
                Role::Wait(flight) => {
                    if let Some(value) = flight.wait() {
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        trace!(bucket = key.bucket, "memo hit after wait");
                        return Ok(value);
                    }
                    // The leader failed; nothing was cached.
                }
                Role::Lead(flight) => return self.compute(args, key, &flight),
            }
        }
    }

    fn claim(&self, key: &MemoKey) -> Role<R> {
        let mut store = self.store.lock();
        if let Some(value) = store.entries.get(key) {
            return Role::Hit(value.clone());
        }
        if let Some(flight) = store.in_flight.get(key) {
            return Role::Wait(flight.clone());
        }
        let flight = Arc::new(Flight::new());
        store.in_flight.insert(key.clone(), flight.clone());
        Role::Lead(flight)
    }

    fn compute(
        &self,
        args: &A,
        key: MemoKey,
        flight: &Flight<R>,
    ) -> std::result::Result<R, MemoError<E>> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(bucket = key.bucket, "memo miss");

        let mut guard = FlightGuard {
            store: &self.store,
            key: &key,
            flight,
            settled: false,
        };
        let value = (self.func)(args).map_err(MemoError::Call)?;

        {
            let mut store = self.store.lock();
            store.in_flight.remove(&key);
            if let Some((evicted, _)) = store.entries.push(key.clone(), value.clone()) {
                if evicted != key {
                    trace!(bucket = evicted.bucket, "memo evicted entry");
                }
            }
        }
        flight.finish(Some(value.clone()));
        guard.settled = true;
        Ok(value)
    }

    /// Counters and occupancy.
    pub fn cache_info(&self) -> CacheInfo {
        CacheInfo {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            max_entries: self.config.max_entries,
            current_size: self.store.lock().entries.len(),
        }
    }

    /// Drops every cached result and resets the counters.
    pub fn cache_clear(&self) {
        self.store.lock().entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// The configuration this wrapper was built with.
    pub fn config(&self) -> &MemoConfig {
        &self.config
    }
}

impl<A, R, F> TtlMemo<A, R, Infallible, F>
where
    A: CacheKey + ?Sized,
    R: Clone,
    F: Fn(&A) -> std::result::Result<R, Infallible>,
{
    /// [`TtlMemo::call`] for functions that cannot fail.
    pub fn get(&self, args: &A) -> std::result::Result<R, KeyError> {
        self.call(args).map_err(|e| match e {
            MemoError::Key(err) => err,
            MemoError::Call(never) => match never {},
        })
    }
}

impl<A: ?Sized, R, E, F> fmt::Debug for TtlMemo<A, R, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlMemo")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::AssertUnwindSafe;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Barrier;
    use std::time::Duration;

    use serde_json::{json, Value};

    use crate::clock::ManualClock;
    use crate::config::ttl_cache;

    fn frozen(at: f64) -> Arc<ManualClock> {
        Arc::new(ManualClock::new(at))
    }

    #[test]
    fn test_same_bucket_runs_once() {
        let clock = frozen(1000.0);
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(100))
            .memoize_with_clock(clock.clone(), |x: &i64| {
                calls.fetch_add(1, Ordering::SeqCst);
                x * 2
            })
            .unwrap();

        assert_eq!(g.get(&3).unwrap(), 6);
        clock.set(1050.0);
        assert_eq!(g.get(&3).unwrap(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(g.cache_info().hits, 1);
    }

    #[test]
    fn test_next_bucket_recomputes() {
        let clock = frozen(1000.0);
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(100))
            .memoize_with_clock(clock.clone(), |x: &i64| {
                calls.fetch_add(1, Ordering::SeqCst);
                x * 2
            })
            .unwrap();

        g.get(&3).unwrap();
        clock.set(1100.0);
        g.get(&3).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // The stale entry stays until LRU pushes it out.
        assert_eq!(g.cache_info().current_size, 2);
    }

    #[test]
    fn test_typed_keys_split_int_and_float() {
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(60))
            .typed(true)
            .memoize_with_clock(frozen(0.0), |v: &Value| {
                calls.fetch_add(1, Ordering::SeqCst);
                v.clone()
            })
            .unwrap();

        g.get(&json!(1)).unwrap();
        g.get(&json!(1.0)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_untyped_keys_share_int_and_float() {
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(60))
            .memoize_with_clock(frozen(0.0), |v: &Value| {
                calls.fetch_add(1, Ordering::SeqCst);
                v.clone()
            })
            .unwrap();

        assert_eq!(g.get(&json!(1)).unwrap(), json!(1));
        // Served from the entry created by the integer call.
        assert_eq!(g.get(&json!(1.0)).unwrap(), json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lru_evicts_oldest() {
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(60))
            .with_max_entries(2)
            .memoize_with_clock(frozen(0.0), |x: &i64| {
                calls.fetch_add(1, Ordering::SeqCst);
                *x
            })
            .unwrap();

        g.get(&1).unwrap();
        g.get(&2).unwrap();
        g.get(&3).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        g.get(&3).unwrap();
        g.get(&2).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        g.get(&1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(g.cache_info().current_size, 2);
    }

    #[test]
    fn test_recent_use_protects_entry() {
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(60))
            .with_max_entries(2)
            .memoize_with_clock(frozen(0.0), |x: &i64| {
                calls.fetch_add(1, Ordering::SeqCst);
                *x
            })
            .unwrap();

        g.get(&1).unwrap();
        g.get(&2).unwrap();
        g.get(&1).unwrap();
        g.get(&3).unwrap();
        // 2 was least recently used, so 1 is still cached.
        g.get(&1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(60))
            .wrap_with_clock(frozen(0.0), |x: &i64| {
                calls.fetch_add(1, Ordering::SeqCst);
                if *x == 5 {
                    Err(format!("cannot handle {x}"))
                } else {
                    Ok(*x)
                }
            })
            .unwrap();

        let err = g.call(&5).unwrap_err();
        assert_eq!(err.into_call_error().as_deref(), Some("cannot handle 5"));
        assert!(g.call(&5).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(g.cache_info().current_size, 0);
    }

    #[test]
    fn test_unhashable_fails_fast() {
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(60))
            .memoize_with_clock(frozen(0.0), |x: &f64| {
                calls.fetch_add(1, Ordering::SeqCst);
                *x
            })
            .unwrap();

        assert!(matches!(g.get(&f64::NAN), Err(KeyError::Unhashable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsized_arguments() {
        let g = ttl_cache(Duration::from_secs(60))
            .memoize_with_clock(frozen(0.0), |s: &str| s.len())
            .unwrap();
        assert_eq!(g.get("hello").unwrap(), 5);
        assert_eq!(g.get("hello").unwrap(), 5);
        assert_eq!(g.cache_info().hits, 1);
    }

    #[test]
    fn test_tuple_arguments() {
        let calls = AtomicUsize::new(0);
        let g = ttl_cache(Duration::from_secs(60))
            .memoize_with_clock(frozen(0.0), |(a, b): &(i64, String)| {
                calls.fetch_add(1, Ordering::SeqCst);
                format!("{a}-{b}")
            })
            .unwrap();

        assert_eq!(g.get(&(1, "x".to_string())).unwrap(), "1-x");
        assert_eq!(g.get(&(1, "x".to_string())).unwrap(), "1-x");
        assert_eq!(g.get(&(2, "x".to_string())).unwrap(), "2-x");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_clear() {
        let g = ttl_cache(Duration::from_secs(60))
            .memoize_with_clock(frozen(0.0), |x: &i64| *x)
            .unwrap();
        g.get(&1).unwrap();
        g.get(&1).unwrap();
        g.cache_clear();
        assert_eq!(
            g.cache_info(),
            CacheInfo {
                hits: 0,
                misses: 0,
                max_entries: 128,
                current_size: 0,
            }
        );
    }

    #[test]
    fn test_independent_wrappers_do_not_share() {
        let calls = AtomicUsize::new(0);
        let f = |x: &i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            *x
        };
        let a = ttl_cache(Duration::from_secs(60))
            .memoize_with_clock(frozen(0.0), f)
            .unwrap();
        let b = ttl_cache(Duration::from_secs(60))
            .memoize_with_clock(frozen(0.0), f)
            .unwrap();
        a.get(&1).unwrap();
        b.get(&1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let g = Arc::new(
            ttl_cache(Duration::from_secs(60))
                .memoize_with_clock(frozen(0.0), move |x: &u64| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    x + 1
                })
                .unwrap(),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let g = g.clone();
                std::thread::spawn(move || {
                    for i in 0..50u64 {
                        assert_eq!(g.get(&(i % 10)).unwrap(), i % 10 + 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let info = g.cache_info();
        assert_eq!(info.current_size, 10);
        assert_eq!(info.hits + info.misses, 400);
        // Callers racing on a key wait for the first computation.
        assert_eq!(info.misses, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_racing_misses_compute_once() {
        const THREADS: usize = 6;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let g = Arc::new(
            ttl_cache(Duration::from_secs(60))
                .memoize_with_clock(frozen(0.0), move |x: &u64| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(50));
                    x + 1
                })
                .unwrap(),
        );
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let g = g.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    g.get(&7).unwrap()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 8);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let info = g.cache_info();
        assert_eq!(info.misses, 1);
        assert_eq!(info.hits, THREADS as u64 - 1);
        assert_eq!(info.current_size, 1);
    }

    #[test]
    fn test_racing_failures_are_not_shared() {
        const THREADS: usize = 4;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let g = Arc::new(
            ttl_cache(Duration::from_secs(60))
                .wrap_with_clock(frozen(0.0), move |_: &u64| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    Err::<u64, _>("upstream down")
                })
                .unwrap(),
        );
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let g = g.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    g.call(&1).unwrap_err().into_call_error()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Some("upstream down"));
        }

        // Every caller ran `f` itself; no failure was handed to a waiter.
        assert_eq!(calls.load(Ordering::SeqCst), THREADS);
        assert_eq!(g.cache_info().current_size, 0);
    }

    #[test]
    fn test_panicking_call_releases_key() {
        let first = AtomicBool::new(true);
        let g = ttl_cache(Duration::from_secs(60))
            .memoize_with_clock(frozen(0.0), |x: &i64| {
                if first.swap(false, Ordering::SeqCst) {
                    panic!("first call fails");
                }
                *x
            })
            .unwrap();

        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| g.get(&1)));
        assert!(outcome.is_err());
        // A stuck in-flight marker would block here forever.
        assert_eq!(g.get(&1).unwrap(), 1);
        assert_eq!(g.cache_info().current_size, 1);
    }
}
