//! Integration tests: host events → delivery thread → client queries.

use pretty_assertions::assert_eq;
use sd_canvas::{Canvas, CanvasConfig, DrawError, InputEvent, KeyCode};
use std::time::{Duration, Instant};

/// Poll until `ready` holds or a generous deadline passes.
fn wait_for(mut ready: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if ready() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn typed_keys_arrive_in_order_and_drain() {
    let mut canvas = Canvas::new(CanvasConfig::default()).unwrap();
    let sender = canvas.event_sender().unwrap();

    let host = std::thread::spawn(move || {
        for c in "hi!".chars() {
            assert!(sender.send(InputEvent::KeyTyped(c)));
        }
    });
    host.join().unwrap();

    let mut typed = String::new();
    assert!(wait_for(|| {
        while canvas.has_next_key_typed() {
            typed.push(canvas.next_key_typed().unwrap());
        }
        typed.len() == 3
    }));
    assert_eq!(typed, "hi!");
    assert_eq!(canvas.next_key_typed(), Err(DrawError::EmptyQueue));
}

#[test]
fn pointer_follows_current_scale() {
    let mut canvas = Canvas::new(CanvasConfig::default()).unwrap();
    canvas.set_scale(-1.0, 1.0).unwrap();
    let sender = canvas.event_sender().unwrap();

    sender.send(InputEvent::PointerDown { x: 256.0, y: 256.0 });
    assert!(wait_for(|| canvas.mouse_pressed()));
    assert!(canvas.mouse_x().abs() < 1e-9);
    assert!(canvas.mouse_y().abs() < 1e-9);

    sender.send(InputEvent::PointerUp);
    assert!(wait_for(|| !canvas.mouse_pressed()));
    assert!(canvas.mouse_x().abs() < 1e-9);
}

#[test]
fn held_keys_track_down_and_up() {
    let mut canvas = Canvas::new(CanvasConfig::default()).unwrap();
    let sender = canvas.event_sender().unwrap();
    let again = canvas.event_sender().unwrap();

    sender.send(InputEvent::KeyDown(KeyCode::SPACE));
    assert!(wait_for(|| canvas.is_key_pressed(KeyCode::SPACE)));
    // Held-key queries never consume.
    assert!(canvas.is_key_pressed(KeyCode::SPACE));

    again.send(InputEvent::KeyUp(KeyCode::SPACE));
    assert!(wait_for(|| !canvas.is_key_pressed(KeyCode::SPACE)));
    assert!(!canvas.has_next_key_typed());
}
