#![allow(dead_code)]

use anyhow::{anyhow, Result};
use eye_diagram::diagram::composite::RgbaBuffer;
use eye_diagram::diagram::save::{decode_data_url, encode_png_data_url};
use eye_diagram::diagram::{Color, ImageLoader, ImageSource, SurfaceSize};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

pub const SIZE: SurfaceSize = SurfaceSize::new(60, 40);

pub fn solid_image(color: Color) -> RgbaImage {
    RgbaImage::from_pixel(SIZE.width, SIZE.height, Rgba(color.to_rgba_array()))
}

pub fn solid_data_url(color: Color) -> String {
    encode_png_data_url(&RgbaBuffer::from_image(solid_image(color))).expect("encode solid image")
}

/// Serves templates from memory and decodes encoded values. Encoded loads
/// can be held back until [`MemoryLoader::open_gate`] is called.
pub struct MemoryLoader {
    templates: HashMap<PathBuf, RgbaImage>,
    gate: Mutex<bool>,
    gate_changed: Condvar,
    blocked: Mutex<usize>,
    loads: Mutex<Vec<String>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            gate: Mutex::new(true),
            gate_changed: Condvar::new(),
            blocked: Mutex::new(0),
            loads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_template(mut self, path: &str, image: RgbaImage) -> Self {
        self.templates.insert(PathBuf::from(path), image);
        self
    }

    pub fn gated(self) -> Self {
        *self.gate.lock().expect("gate") = false;
        self
    }

    pub fn open_gate(&self) {
        *self.gate.lock().expect("gate") = true;
        self.gate_changed.notify_all();
    }

    pub fn close_gate(&self) {
        *self.gate.lock().expect("gate") = false;
    }

    /// Waits until `count` encoded loads are parked at the closed gate.
    pub fn wait_for_blocked_loads(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while *self.blocked.lock().expect("blocked") < count {
            assert!(Instant::now() < deadline, "loads never reached the gate");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    pub fn encoded_loads(&self) -> Vec<String> {
        self.loads.lock().expect("loads").clone()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl ImageLoader for MemoryLoader {
    fn load(&self, source: &ImageSource) -> Result<RgbaImage> {
        match source {
            ImageSource::Asset(path) => self
                .templates
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow!("no template {}", path.display())),
            ImageSource::Encoded(value) => {
                let mut open = self.gate.lock().expect("gate");
                if !*open {
                    *self.blocked.lock().expect("blocked") += 1;
                }
                while !*open {
                    open = self.gate_changed.wait(open).expect("gate wait");
                }
                drop(open);
                self.loads.lock().expect("loads").push(value.clone());
                decode_data_url(value)
            }
        }
    }
}

pub type Events = Arc<Mutex<Vec<(eye_diagram::diagram::Eye, String)>>>;

pub fn recorder() -> (Events, eye_diagram::diagram::save::DiagramObserver) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let observer: eye_diagram::diagram::save::DiagramObserver = Box::new(move |eye, url| {
        sink.lock().expect("events").push((eye, url));
    });
    (events, observer)
}
