pub mod api_key_guard;
pub mod error;
pub mod operator_rate_limiter;

pub use api_key_guard::ApiKeyGuard;
pub use error::{AuthError, Result};
pub use operator_rate_limiter::OperatorRateLimiter;
