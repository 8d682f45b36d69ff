use crate::{AuthError, Result as AuthErrorResult};

use std::num::NonZeroU32;
use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use gsm_config::AuthConfig;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

/// Process-wide limiter for mutating operations.
///
/// Allows a burst of `max_requests`, replenished evenly over `window_secs`.
pub struct OperatorRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    max_requests: u32,
    window_secs: u64,
}

impl OperatorRateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let period = Duration::from_secs(window_secs.max(1)) / burst.get();
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::direct(quota),
            max_requests: burst.get(),
            window_secs: window_secs.max(1),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.rate_limit_max_requests, config.rate_limit_window_secs)
    }

    /// Check if request is allowed, returns error if rate limited
    #[track_caller]
    pub fn check(&self) -> AuthErrorResult<()> {
        self.limiter
            .check()
            .map_err(|_| AuthError::RateLimitExceeded {
                limit: self.max_requests,
                window_secs: self.window_secs,
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
