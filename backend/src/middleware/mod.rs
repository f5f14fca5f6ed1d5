//! Actix middleware shared by every route.

pub mod rate_limit;
pub mod trace;

pub use rate_limit::RateLimit;
pub use trace::Trace;
