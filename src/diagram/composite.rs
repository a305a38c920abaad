use crate::diagram::model::{Color, SurfaceSize};
use image::imageops::FilterType;
use image::RgbaImage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&fill.to_rgba_array());
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn filled(size: SurfaceSize, fill: Color) -> Self {
        Self::new(size.width, size.height, fill)
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y * self.width + x) * 4) as usize;
        Color::from_rgba_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Paints `layer` over the whole buffer, stretching it when its size
    /// differs.
    pub fn draw_layer(&mut self, layer: &RgbaImage) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let stretched;
        let layer = if layer.dimensions() == (self.width, self.height) {
            layer
        } else {
            stretched = image::imageops::resize(layer, self.width, self.height, FilterType::Triangle);
            &stretched
        };

        for (dst, src) in self.pixels.chunks_exact_mut(4).zip(layer.as_raw().chunks_exact(4)) {
            let blended = blend_pixel(
                Color::from_rgba_array([dst[0], dst[1], dst[2], dst[3]]),
                Color::from_rgba_array([src[0], src[1], src[2], src[3]]),
            );
            dst.copy_from_slice(&blended.to_rgba_array());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStyle {
    pub background: Color,
    pub spacing: u32,
    pub dot_radius: u32,
    pub dot_color: Color,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            spacing: 20,
            dot_radius: 1,
            dot_color: Color::rgb(204, 204, 204),
        }
    }
}

/// Background fill plus the dot grid. Dots sit on every multiple of
/// `spacing`, starting one spacing in from the top-left corner.
pub fn grid_floor(size: SurfaceSize, style: &GridStyle) -> RgbaBuffer {
    let mut floor = RgbaBuffer::filled(size, style.background);
    if style.spacing == 0 {
        return floor;
    }
    let radius = style.dot_radius as i32;
    let spacing = style.spacing as usize;
    for cy in (style.spacing..size.height).step_by(spacing) {
        for cx in (style.spacing..size.width).step_by(spacing) {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx * dx + dy * dy <= radius * radius {
                        floor.set_pixel(cx as i32 + dx, cy as i32 + dy, style.dot_color);
                    }
                }
            }
        }
    }
    floor
}

/// Builds the pre-stroke state of one eye: grid, then template, then the
/// caller's baseline raster. Missing layers are skipped.
pub fn compose_floor(
    size: SurfaceSize,
    grid: &GridStyle,
    template: Option<&RgbaImage>,
    baseline: Option<&RgbaImage>,
) -> RgbaBuffer {
    let mut floor = grid_floor(size, grid);
    if let Some(template) = template {
        floor.draw_layer(template);
    }
    if let Some(baseline) = baseline {
        floor.draw_layer(baseline);
    }
    floor
}

fn blend_pixel(bottom: Color, top: Color) -> Color {
    if top.a == 255 {
        return top;
    }
    let sa = top.a as f32 / 255.0;
    let da = bottom.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return Color::rgba(0, 0, 0, 0);
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color::rgba(
        blend(top.r, bottom.r),
        blend(top.g, bottom.g),
        blend(top.b, bottom.b),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}
