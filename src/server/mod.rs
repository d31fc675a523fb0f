//! Server-mode collaborators. Only admission control lives here; the
//! analysis pipeline never touches it.

pub mod rate_limit;

pub use rate_limit::RateLimiter;
