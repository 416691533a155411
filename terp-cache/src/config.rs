//! Memoizer configuration.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use terp_core::constants::DEFAULT_MAX_ENTRIES;
use terp_core::error::{Result, TerpError};

use crate::clock::{Clock, SystemClock};
use crate::key::CacheKey;
use crate::memo::TtlMemo;

/// Configuration for a [`TtlMemo`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoConfig {
    /// Width of a time bucket; results are served for at most this long
    pub max_age: Duration,
    /// Maximum number of cached results before LRU eviction
    pub max_entries: usize,
    /// Whether argument types take part in key equality
    pub typed: bool,
}

impl MemoConfig {
    /// Creates a config with the default entry bound, untyped keys.
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            max_entries: DEFAULT_MAX_ENTRIES,
            typed: false,
        }
    }

    /// Sets the entry bound.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Makes argument types part of the key (`1` and `1.0` become distinct).
    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    /// Checks the config can back a memoizer.
    pub fn validate(&self) -> Result<()> {
        if self.max_age.is_zero() {
            return Err(TerpError::ConfigError("max_age must be greater than zero".into()));
        }
        if self.max_entries == 0 {
            return Err(TerpError::ConfigError("max_entries must be positive".into()));
        }
        Ok(())
    }

    /// Wraps a fallible function; failures are returned to the caller and
    /// never cached.
    pub fn wrap<A, R, E, F>(self, func: F) -> Result<TtlMemo<A, R, E, F>>
    where
        A: CacheKey + ?Sized,
        R: Clone,
        F: Fn(&A) -> std::result::Result<R, E>,
    {
        TtlMemo::new(self, func)
    }

    /// Like [`MemoConfig::wrap`] but reads time from `clock`.
    pub fn wrap_with_clock<A, R, E, F>(
        self,
        clock: Arc<dyn Clock>,
        func: F,
    ) -> Result<TtlMemo<A, R, E, F>>
    where
        A: CacheKey + ?Sized,
        R: Clone,
        F: Fn(&A) -> std::result::Result<R, E>,
    {
        TtlMemo::with_clock(self, clock, func)
    }

    /// Wraps a function that cannot fail.
    #[allow(clippy::type_complexity)]
    pub fn memoize<A, R, F>(
        self,
        func: F,
    ) -> Result<TtlMemo<A, R, Infallible, impl Fn(&A) -> std::result::Result<R, Infallible>>>
    where
        A: CacheKey + ?Sized,
        R: Clone,
        F: Fn(&A) -> R,
    {
        self.memoize_with_clock(Arc::new(SystemClock), func)
    }

    /// Like [`MemoConfig::memoize`] but reads time from `clock`.
    #[allow(clippy::type_complexity)]
    pub fn memoize_with_clock<A, R, F>(
        self,
        clock: Arc<dyn Clock>,
        func: F,
    ) -> Result<TtlMemo<A, R, Infallible, impl Fn(&A) -> std::result::Result<R, Infallible>>>
    where
        A: CacheKey + ?Sized,
        R: Clone,
        F: Fn(&A) -> R,
    {
        TtlMemo::with_clock(self, clock, move |args: &A| Ok::<R, Infallible>(func(args)))
    }
}

/// Starts a memoizer config with the given staleness window.
///
/// Mirrors the `ttl_cache(max_age, maxsize=128, typed=False)` decorator
/// shape: chain [`MemoConfig::with_max_entries`] and [`MemoConfig::typed`],
/// then finish with [`MemoConfig::memoize`] or [`MemoConfig::wrap`].
pub fn ttl_cache(max_age: Duration) -> MemoConfig {
    MemoConfig::new(max_age)
}
