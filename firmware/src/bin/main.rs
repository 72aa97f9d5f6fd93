#![no_std]
#![no_main]

use copter_remote::{
    GpioFlowControl, GpioModuleControl, GpioStatusLines, Irqs, Joystick, LatestInput, Uart1Port,
};
use defmt::{debug, error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Duration, Ticker, Timer};
use link_core::{
    bring_up, ControlUplink, LinkConfig, LinkSession, ReadySignal, Sampler, SamplerConfig,
    StickInputs, MODULE_BOOT_BUDGET,
};
use msp_proto::ControlInput;
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

/// Ignore contact bounce after a button edge.
const DEBOUNCE_MS: u64 = 20;

/// Raised once the handshake has finished; the sampler stays quiet until then.
static READY: ReadySignal = ReadySignal::new();

/// Arm and throttle state, written by the buttons task and read by the sampler.
static STICK: StickInputs = StickInputs::new(&SamplerConfig::DEFAULT);

/// Signal for passing control inputs from the sampler to the link task.
/// Using Signal instead of Channel provides "latest value wins" semantics.
static INPUT_SIGNAL: StaticCell<Signal<CriticalSectionRawMutex, ControlInput>> = StaticCell::new();

type Session = LinkSession<
    'static,
    copter_remote::UartTransport<'static>,
    GpioFlowControl<'static>,
    GpioStatusLines<'static>,
    Delay,
>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Copter remote starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let signal = INPUT_SIGNAL.init(Signal::new());

    // --- Bluetooth module ---
    let port = Uart1Port::new(p.UART1, p.PIN_8, p.PIN_9, p.DMA_CH0, p.DMA_CH1);
    let flow = GpioFlowControl::new(
        Output::new(p.PIN_10, Level::Low),
        Input::new(p.PIN_11, Pull::Down),
    );
    let status = GpioStatusLines::new(
        Input::new(p.PIN_12, Pull::None),
        Input::new(p.PIN_13, Pull::None),
    );
    let module = GpioModuleControl::new(
        Output::new(p.PIN_14, Level::High),
        Output::new(p.PIN_15, Level::Low),
        Output::new(p.PIN_16, Level::Low),
    );

    // --- Joystick ---
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let joystick = Joystick::new(
        adc,
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
    );

    let arm = Input::new(p.PIN_18, Pull::Up);
    let up = Input::new(p.PIN_19, Pull::Up);
    let down = Input::new(p.PIN_20, Pull::Up);

    // On-board LED, lit once the link is ready
    let led = Output::new(p.PIN_25, Level::Low);

    spawner.spawn(link_task(port, flow, status, module, led, signal).unwrap());
    spawner.spawn(sampler_task(joystick, signal).unwrap());
    spawner.spawn(buttons_task(arm, up, down).unwrap());

    info!("Copter remote initialized, connecting...");
}

/// Link task - brings up the module, connects, then forwards control inputs.
///
/// Any failure before the link is ready is final: the task logs it and ends,
/// and the readiness signal stays low until the next reset.
#[embassy_executor::task]
async fn link_task(
    port: Uart1Port,
    flow: GpioFlowControl<'static>,
    mut status: GpioStatusLines<'static>,
    mut module: GpioModuleControl<'static>,
    mut led: Output<'static>,
    signal: &'static Signal<CriticalSectionRawMutex, ControlInput>,
) {
    let mut delay = Delay;
    if let Err(e) = bring_up(&mut module, &mut status, &mut delay, MODULE_BOOT_BUDGET).await {
        error!("Bluetooth module bring-up failed: {:?}", e);
        return;
    }

    let mut session: Session =
        match LinkSession::open(port, flow, status, Delay, LinkConfig::DEFAULT, &READY) {
            Ok(session) => session,
            Err(e) => {
                error!("Link unavailable: {:?}", e);
                return;
            }
        };

    if let Err(e) = session.handshake().await {
        error!("Link failed: {:?}", e);
        return;
    }
    led.set_high();

    let mut uplink = ControlUplink::new(LatestInput::new(signal), session);
    uplink.run().await
}

/// Sampler task - calibrates the joystick, then signals a control input
/// every period while the link is ready.
#[embassy_executor::task]
async fn sampler_task(
    mut joystick: Joystick<'static>,
    signal: &'static Signal<CriticalSectionRawMutex, ControlInput>,
) {
    let config = SamplerConfig::DEFAULT;

    // The stick must be at rest while this reading is taken.
    let rest = match joystick.read().await {
        Ok(raw) => raw,
        Err(e) => {
            error!("Joystick calibration failed: {:?}", e);
            return;
        }
    };
    let sampler = Sampler::calibrate(&STICK, rest, &config);
    info!("Joystick calibrated at {:?}", rest);

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config.period_ms)));
    loop {
        ticker.next().await;
        if !READY.is_ready() {
            continue;
        }

        match joystick.read().await {
            Ok(raw) => signal.signal(sampler.sample(raw)),
            Err(e) => warn!("Joystick read failed: {:?}", e),
        }
    }
}

/// Buttons task - arm toggle and throttle steps on falling edges.
#[embassy_executor::task]
async fn buttons_task(mut arm: Input<'static>, mut up: Input<'static>, mut down: Input<'static>) {
    loop {
        match select3(
            arm.wait_for_falling_edge(),
            up.wait_for_falling_edge(),
            down.wait_for_falling_edge(),
        )
        .await
        {
            Either3::First(()) => {
                let armed = STICK.toggle_arm();
                info!("Armed: {}", armed);
            }
            Either3::Second(()) => {
                let throttle = STICK.throttle_up();
                debug!("Throttle {}", throttle);
            }
            Either3::Third(()) => {
                let throttle = STICK.throttle_down();
                debug!("Throttle {}", throttle);
            }
        }
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
    }
}
