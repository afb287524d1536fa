//! Async utilities
//!
//! Only timeouts live here: outbound calls in this workspace are never
//! retried, a failed call degrades to a fallback instead.
//!
//! ```rust,ignore
//! use tooling::async_utils::timeout::with_timeout;
//! use std::time::Duration;
//!
//! let parsed = with_timeout(Duration::from_secs(5), delegate.parse(text)).await;
//! ```

pub mod timeout;
