use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jiff::Timestamp;

use crate::state::AppState;

/// Header carrying a simulated "now" in epoch milliseconds.
pub const TEST_NOW_HEADER: &str = "x-test-now-ms";

/// Logical time a read should be evaluated at.
///
/// `None` unless the server runs in test mode. There the `x-test-now-ms`
/// header wins, then the server-wide fixed time, if one is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestNow(pub Option<Timestamp>);

impl FromRequestParts<AppState> for RequestNow {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.test_mode() {
            return Ok(Self(None));
        }

        let now = parts
            .headers
            .get(TEST_NOW_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_epoch_millis)
            .or(state.test_now());
        Ok(Self(now))
    }
}

/// Parses epoch milliseconds, accepting fractional values like `1700000000000.5`.
pub fn parse_epoch_millis(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    let millis = match raw.parse::<i64>() {
        Ok(millis) => millis,
        Err(_) => {
            let millis = raw.parse::<f64>().ok().filter(|f| f.is_finite())?.floor();
            if millis < i64::MIN as f64 || millis >= i64::MAX as f64 {
                return None;
            }
            millis as i64
        }
    };
    Timestamp::from_millisecond(millis).ok()
}
