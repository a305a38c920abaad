use crate::diagram::composite::RgbaBuffer;
use crate::diagram::model::Eye;
use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use tracing::{debug, error};

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Receives `(eye, data_url)` every time an eye's surface settles.
pub type DiagramObserver = Box<dyn FnMut(Eye, String) + Send>;

pub fn encode_png(buffer: &RgbaBuffer) -> Result<Vec<u8>> {
    let expected = (buffer.width as usize) * (buffer.height as usize) * 4;
    if buffer.pixels.len() != expected {
        bail!(
            "surface buffer holds {} bytes, expected {expected} for {}x{}",
            buffer.pixels.len(),
            buffer.width,
            buffer.height
        );
    }
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(&buffer.pixels, buffer.width, buffer.height, ColorType::Rgba8)
        .context("encode surface as png")?;
    Ok(bytes)
}

pub fn encode_png_data_url(buffer: &RgbaBuffer) -> Result<String> {
    let bytes = encode_png(buffer)?;
    Ok(format!(
        "{PNG_DATA_URL_PREFIX}{}",
        general_purpose::STANDARD.encode(bytes)
    ))
}

/// Decodes a `data:<mime>;base64,<payload>` URL or a bare base64 payload
/// into RGBA pixels.
pub fn decode_data_url(value: &str) -> Result<RgbaImage> {
    let value = value.trim();
    let payload = match value.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| anyhow!("data url has no payload separator"))?;
            if !header.ends_with(";base64") {
                bail!("data url is not base64 encoded: {header}");
            }
            payload
        }
        None => value,
    };
    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .context("decode base64 image payload")?;
    let image = image::load_from_memory(&bytes).context("decode image bytes")?;
    Ok(image.to_rgba8())
}

/// Owns the host callback and remembers what was last handed out per eye.
pub struct Notifier {
    observer: Option<DiagramObserver>,
    last_emitted: [Option<String>; 2],
}

impl Notifier {
    pub fn new(observer: Option<DiagramObserver>) -> Self {
        Self {
            observer,
            last_emitted: [None, None],
        }
    }

    pub fn notify(&mut self, eye: Eye, surface: &RgbaBuffer) -> bool {
        let encoded = match encode_png_data_url(surface) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(%eye, "failed to serialize eye diagram: {err:#}");
                return false;
            }
        };
        debug!(%eye, bytes = encoded.len(), "eye diagram settled");
        self.last_emitted[eye.index()] = Some(encoded.clone());
        if let Some(observer) = self.observer.as_mut() {
            observer(eye, encoded);
        }
        true
    }

    /// True when `value` is the snapshot this notifier last produced for
    /// `eye`, i.e. the host is echoing our own output back as a baseline.
    pub fn is_echo(&self, eye: Eye, value: &str) -> bool {
        self.last_emitted[eye.index()].as_deref() == Some(value)
    }

    pub fn last_emitted(&self, eye: Eye) -> Option<&str> {
        self.last_emitted[eye.index()].as_deref()
    }
}
