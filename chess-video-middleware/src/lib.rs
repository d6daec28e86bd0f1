//! Quota reservation, rate limiting, enrichment caching, and the governing wrapper
//! that combines all three around an `UpstreamClient`.
#![warn(missing_docs)]

mod cache;
mod governed;
mod quota;
mod ratelimit;

pub use crate::cache::{CacheMeta, EnrichmentCache};
pub use crate::governed::{cost, GovernedClient};
pub use crate::quota::QuotaLedger;
pub use crate::ratelimit::RateLimiter;
