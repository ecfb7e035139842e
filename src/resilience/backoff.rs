//! Reconnect delay policies.

use std::time::Duration;

use rand::Rng;

use crate::config::{ReconnectConfig, ReconnectPolicy};

/// Delay to wait before reconnect attempt `attempt` (1-based).
///
/// `fixed` sleeps the base delay every time. `exponential` doubles per
/// attempt, capped at `max_delay_ms`, with 0 to 10% jitter on top.
pub fn reconnect_delay(config: &ReconnectConfig, attempt: u32) -> Duration {
    match config.policy {
        ReconnectPolicy::Fixed => Duration::from_millis(config.base_delay_ms),
        ReconnectPolicy::Exponential => {
            calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms)
        }
    }
}

/// Calculate exponential backoff delay with jitter.
fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}
