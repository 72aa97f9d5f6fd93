//! Bounded polling of a line or flag.

use crate::config::PollBudget;
use crate::error::{LinkError, WaitPoint};
use embedded_hal_async::delay::DelayNs;

/// Poll `done` until it returns `true` or the budget runs out.
///
/// The first check happens without delay, so a condition that already holds
/// costs a single call.
pub(crate) async fn poll_until<D, C>(
    delay: &mut D,
    budget: PollBudget,
    point: WaitPoint,
    mut done: C,
) -> Result<(), LinkError>
where
    D: DelayNs,
    C: FnMut() -> bool,
{
    for _ in 0..budget.max_attempts {
        if done() {
            return Ok(());
        }
        if budget.interval_us > 0 {
            delay.delay_us(budget.interval_us).await;
        }
    }
    Err(LinkError::Timeout(point))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::{block_on, new_log, Event, MockDelay};
    use std::vec;

    #[test]
    fn test_ready_condition_skips_delay() {
        let log = new_log();
        let mut delay = MockDelay::new(log.clone());

        let result = block_on(poll_until(
            &mut delay,
            PollBudget::new(3, 10),
            WaitPoint::PeerRts,
            || true,
        ));

        assert_eq!(result, Ok(()));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_waits_between_attempts() {
        let log = new_log();
        let mut delay = MockDelay::new(log.clone());
        let mut remaining = 2;

        let result = block_on(poll_until(
            &mut delay,
            PollBudget::new(5, 10),
            WaitPoint::LinkUp,
            || {
                if remaining == 0 {
                    true
                } else {
                    remaining -= 1;
                    false
                }
            },
        ));

        assert_eq!(result, Ok(()));
        assert_eq!(
            *log.lock().unwrap(),
            vec![Event::Delay(10_000), Event::Delay(10_000)]
        );
    }

    #[test]
    fn test_exhausted_budget_times_out() {
        let log = new_log();
        let mut delay = MockDelay::new(log.clone());
        let mut calls = 0;

        let result = block_on(poll_until(
            &mut delay,
            PollBudget::new(4, 0),
            WaitPoint::TransmitComplete,
            || {
                calls += 1;
                false
            },
        ));

        assert_eq!(result, Err(LinkError::Timeout(WaitPoint::TransmitComplete)));
        assert_eq!(calls, 4);
        assert!(log.lock().unwrap().is_empty());
    }
}
