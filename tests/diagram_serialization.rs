#[path = "support/loader.rs"]
mod loader;

use eye_diagram::diagram::composite::RgbaBuffer;
use eye_diagram::diagram::save::{decode_data_url, PNG_DATA_URL_PREFIX};
use eye_diagram::diagram::settings::DiagramSettings;
use eye_diagram::diagram::{Color, Eye, EyeDiagram, MountOptions, PointerPosition, SurfaceRect};
use loader::{recorder, solid_data_url, solid_image, MemoryLoader, SIZE};
use std::time::Duration;

fn rect() -> SurfaceRect {
    SurfaceRect::scaled(SIZE, 1.0)
}

#[test]
fn every_settle_point_emits_the_visible_surface() {
    let (events, observer) = recorder();
    let settings = DiagramSettings {
        surface: SIZE,
        ..DiagramSettings::default()
    };
    let loader = MemoryLoader::new()
        .with_template("eye_right.png", solid_image(Color::WHITE))
        .shared();
    let mut diagram =
        EyeDiagram::mount(settings, MountOptions::default(), loader, Some(observer)).expect("mount");
    diagram.wait_settled();

    diagram.pointer_down(Eye::Right, PointerPosition::new(2.0, 2.0), rect());
    for step in 1..20 {
        let t = step as f32 * 2.0;
        diagram.pointer_move(Eye::Right, PointerPosition::new(2.0 + t, 2.0 + t / 2.0), rect());
    }
    assert!(events.lock().expect("events").is_empty(), "no emission mid-drag");
    diagram.pointer_up(Eye::Right);
    let after_commit = diagram.surface(Eye::Right).clone();

    diagram.undo(Eye::Right);
    diagram.wait_settled();
    let after_undo = diagram.surface(Eye::Right).clone();

    diagram.redo(Eye::Right);
    diagram.wait_settled();
    diagram.clear(Eye::Right);
    diagram.wait_settled();

    let events = events.lock().expect("events");
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|(eye, url)| *eye == Eye::Right
        && url.starts_with(PNG_DATA_URL_PREFIX)));

    let decoded = |idx: usize| RgbaBuffer::from_image(decode_data_url(&events[idx].1).expect("decode"));
    assert_eq!(decoded(0), after_commit);
    assert_eq!(decoded(1), after_undo);
    assert_eq!(decoded(2), after_commit);
    assert_eq!(decoded(3), after_undo);
    assert_eq!(diagram.last_emitted(Eye::Right), Some(events[3].1.as_str()));
}

fn snapshot(url: &str) -> RgbaBuffer {
    RgbaBuffer::from_image(decode_data_url(url).expect("decode snapshot"))
}

#[test]
fn stroke_committed_before_baseline_loads_emits_settled_surface() {
    let (events, observer) = recorder();
    let settings = DiagramSettings {
        surface: SIZE,
        ..DiagramSettings::default()
    };
    let loader = MemoryLoader::new()
        .with_template("eye_right.png", solid_image(Color::WHITE))
        .gated()
        .shared();
    let options = MountOptions {
        right_baseline: Some(solid_data_url(Color::RED)),
        ..MountOptions::default()
    };
    let mut diagram = EyeDiagram::mount(settings, options, loader.clone(), Some(observer))
        .expect("mount");

    diagram.set_brush_color(Color::BLACK);
    diagram.pointer_down(Eye::Right, PointerPosition::new(5.0, 20.0), rect());
    diagram.pointer_move(Eye::Right, PointerPosition::new(50.0, 20.0), rect());
    assert!(diagram.pointer_up(Eye::Right));
    assert!(events.lock().expect("events").is_empty());

    loader.open_gate();
    assert!(diagram.wait_settled_for(Duration::from_secs(10)));

    let events = events.lock().expect("events");
    assert_eq!(events.len(), 1);
    let emitted = snapshot(&events[0].1);
    assert_eq!(&emitted, diagram.surface(Eye::Right));
    assert_eq!(emitted.pixel(0, 0), Color::RED);
    assert_eq!(emitted.pixel(20, 20), Color::BLACK);
}

#[test]
fn stroke_committed_during_pending_undo_emits_after_recomposite() {
    let (events, observer) = recorder();
    let settings = DiagramSettings {
        surface: SIZE,
        ..DiagramSettings::default()
    };
    let loader = MemoryLoader::new()
        .with_template("eye_right.png", solid_image(Color::WHITE))
        .shared();
    let options = MountOptions {
        right_baseline: Some(solid_data_url(Color::RED)),
        ..MountOptions::default()
    };
    let mut diagram = EyeDiagram::mount(settings, options, loader.clone(), Some(observer))
        .expect("mount");
    diagram.wait_settled();

    diagram.set_brush_color(Color::BLACK);
    diagram.pointer_down(Eye::Right, PointerPosition::new(5.0, 10.0), rect());
    diagram.pointer_move(Eye::Right, PointerPosition::new(50.0, 10.0), rect());
    assert!(diagram.pointer_up(Eye::Right));
    assert_eq!(events.lock().expect("events").len(), 1);

    loader.close_gate();
    assert!(diagram.undo(Eye::Right));
    diagram.set_brush_color(Color::BLUE);
    diagram.pointer_down(Eye::Right, PointerPosition::new(5.0, 30.0), rect());
    diagram.pointer_move(Eye::Right, PointerPosition::new(50.0, 30.0), rect());
    assert!(diagram.pointer_up(Eye::Right));
    assert_eq!(events.lock().expect("events").len(), 1);

    loader.open_gate();
    assert!(diagram.wait_settled_for(Duration::from_secs(10)));

    let events = events.lock().expect("events");
    assert_eq!(events.len(), 2);
    let emitted = snapshot(&events[1].1);
    assert_eq!(&emitted, diagram.surface(Eye::Right));
    assert_eq!(emitted.pixel(20, 10), Color::RED);
    assert_eq!(emitted.pixel(20, 30), Color::BLUE);
}
