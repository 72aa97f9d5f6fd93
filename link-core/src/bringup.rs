//! Power-up sequence of the Bluetooth module.

use crate::config::PollBudget;
use crate::error::{LinkError, WaitPoint};
use crate::lines::{ModuleControl, StatusLines};
use crate::poll::poll_until;
use embedded_hal_async::delay::DelayNs;

const POWER_SETTLE_MS: u32 = 500;
const RESET_PULSE_MS: u32 = 100;

/// Reset the module and wait until it has booted.
///
/// The module reports "booting" by holding both status lines high. The
/// sequence is: wake high, reset pulse, software button high, then wait for
/// the status lines to leave the booting combination.
///
/// # Errors
///
/// Returns [`LinkError::Timeout`] with [`WaitPoint::ModuleBoot`] if the
/// module is still booting when the budget runs out.
pub async fn bring_up<M, S, D>(
    module: &mut M,
    status: &mut S,
    delay: &mut D,
    budget: PollBudget,
) -> Result<(), LinkError>
where
    M: ModuleControl,
    S: StatusLines,
    D: DelayNs,
{
    module.set_soft_button(false);
    module.set_reset(false);
    module.set_wake(true);

    delay.delay_ms(POWER_SETTLE_MS).await;
    module.set_reset(true);
    delay.delay_ms(RESET_PULSE_MS).await;
    module.set_reset(false);
    delay.delay_ms(RESET_PULSE_MS).await;
    module.set_soft_button(true);
    delay.delay_ms(POWER_SETTLE_MS).await;

    poll_until(delay, budget, WaitPoint::ModuleBoot, || {
        let a = status.read_status_a();
        let b = status.read_status_b();
        !(a && b)
    })
    .await?;

    delay.delay_ms(POWER_SETTLE_MS).await;
    info!("Bluetooth module up");
    Ok(())
}
