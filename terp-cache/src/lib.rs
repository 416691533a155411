//! Bounded-staleness memoization.
//!
//! [`TtlMemo`] wraps a function so repeated calls with equal arguments are
//! served from an LRU store. Every key is salted with the current time
//! bucket, `floor(now / max_age)`, so a cached result is recomputed on the
//! first call after the bucket rolls over. A result is therefore served for
//! at most `max_age`, and possibly for less: this is not a precise TTL.
//!
//! ```rust
//! use std::time::Duration;
//! use terp_cache::ttl_cache;
//!
//! let doubled = ttl_cache(Duration::from_secs(60))
//!     .with_max_entries(16)
//!     .memoize(|x: &i64| x * 2)
//!     .unwrap();
//!
//! assert_eq!(doubled.get(&21).unwrap(), 42);
//! assert_eq!(doubled.cache_info().misses, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

mod clock;
mod config;
mod key;
mod memo;

pub use clock::{bucket_index, Clock, ManualClock, SystemClock};
pub use config::{ttl_cache, MemoConfig};
pub use key::{CacheKey, KeyBuilder, KeyError, KeyPart};
pub use memo::{CacheInfo, MemoError, TtlMemo};
