//! # tricache
//!
//! Bounded in-memory cache that answers three kinds of query over one entry
//! set.
//!
//! ## Architecture
//! - **Hash index**: chained buckets for exact-key lookup (O(1) average)
//! - **Recency list**: doubly linked list for eviction order (O(1))
//! - **Ordered index**: red-black tree for sorted and range reads (O(log n))
//! - **TriCache**: owns the entries and keeps the three indices in step
//!
//! All nodes live in slot arenas and refer to each other and to the entries
//! through generation-checked handles.
//!
//! ```
//! use tricache::TriCache;
//!
//! let mut cache = TriCache::new(3, 3).unwrap();
//! cache.add(1, "a");
//! cache.add(2, "b");
//! cache.add(3, "c");
//! cache.get(1);
//! cache.add(4, "d"); // evicts 2, the least recently touched
//!
//! let keys: Vec<_> = cache.sort_ascending().map(|(k, _)| k).collect();
//! assert_eq!(keys, vec![1, 3, 4]);
//! ```

#![warn(missing_docs)]

pub mod arena;
mod cache;
mod config;
mod entry;
mod error;
pub mod hash;
pub mod recency;
mod stats;
pub mod tree;

pub use cache::TriCache;
pub use config::{CacheConfig, ENV_BUCKETS, ENV_CAPACITY};
pub use entry::{Entry, EntryId, Key};
pub use error::{Error, InvariantError, Result};
pub use hash::HashIndex;
pub use recency::RecencyList;
pub use stats::CacheStats;
pub use tree::{Color, NodeView, OrderedIndex};
