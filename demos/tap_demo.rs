//! Demonstration of the notch controller on a simulated device.
//!
//! This example shows how to:
//! 1. Connect the service to a simulated platform
//! 2. Feed it taps, a double tap and a long press
//! 3. Deliver torch acknowledgements the way the camera service would
//! 4. Rotate the display and watch the overlay follow
//!
//! Run with: cargo run --example tap_demo

use crossbeam_channel::unbounded;

use notch_touch::{
    config::Config,
    core::NotchService,
    platform::{DisplayEvent, PlatformCall, Rotation, SimulatedPlatform, TouchEvent},
    runtime::ServiceEvent,
    GESTURE_CARD,
};

fn main() {
    println!("Notch Touch - Tap Demo");
    println!("======================");
    println!();
    println!("{GESTURE_CARD}");
    println!();

    let config = Config::default();
    let (tx, rx) = unbounded();
    let platform = SimulatedPlatform::new(config.simulation.clone()).with_ack_sender(tx);
    let mut service = NotchService::new(platform, &config);

    service.on_connect();
    println!("Overlay: {:?}", service.overlay_state());
    println!("Hold delays: {:?}", service.press_delays());
    println!();

    // Single tap, confirmed once the double-tap window closes
    println!("Single tap at t=0...");
    service.on_touch(TouchEvent::down(50.0, 10.0, 0));
    service.on_touch(TouchEvent::up(50.0, 10.0, 60));
    service.advance(400);
    print_calls(&mut service);

    // Double tap
    println!("Double tap at t=1000...");
    service.on_touch(TouchEvent::down(50.0, 10.0, 1_000));
    service.on_touch(TouchEvent::up(50.0, 10.0, 1_050));
    service.on_touch(TouchEvent::down(52.0, 11.0, 1_150));
    service.on_touch(TouchEvent::up(52.0, 11.0, 1_200));
    service.advance(1_600);
    print_calls(&mut service);

    // Long press: torch on, then the acknowledgement arrives
    println!("Hold from t=2000...");
    service.on_touch(TouchEvent::down(50.0, 10.0, 2_000));
    service.advance(3_000);
    while let Ok(ServiceEvent::TorchChanged { camera_id, enabled }) = rx.try_recv() {
        service.on_torch_changed(&camera_id, enabled);
    }
    service.on_touch(TouchEvent::up(50.0, 10.0, 3_100));
    println!("Torch on: {}", service.torch().is_on());
    print_calls(&mut service);

    // Rotate the display
    println!("Rotating to landscape...");
    service.platform_mut().set_rotation(Rotation::Deg90);
    let outcome = service.on_display_event(DisplayEvent::Rotated(Rotation::Deg90));
    println!("Sync: {outcome:?}");
    print_calls(&mut service);

    service.on_disconnect();
    print_calls(&mut service);

    println!("{}", service.activity().summary());
}

fn print_calls(service: &mut NotchService<SimulatedPlatform>) {
    for call in service.platform_mut().take_calls() {
        match call {
            PlatformCall::AddSurface(p) | PlatformCall::UpdateSurface(p) => {
                println!("  overlay at {:?}", p.bounds)
            }
            other => println!("  {other:?}"),
        }
    }
    println!();
}
