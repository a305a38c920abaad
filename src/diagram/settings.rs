use crate::diagram::composite::GridStyle;
use crate::diagram::model::{BrushConfig, Color, Eye, SurfaceSize};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const MAX_SURFACE_EDGE: u32 = 4096;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagramSettings {
    #[serde(default)]
    pub surface: SurfaceSize,
    #[serde(default = "default_background_color")]
    pub background_color: Color,
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: u32,
    #[serde(default = "default_grid_dot_radius")]
    pub grid_dot_radius: u32,
    #[serde(default = "default_grid_dot_color")]
    pub grid_dot_color: Color,
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
    #[serde(default = "default_right_template")]
    pub right_template: Option<PathBuf>,
    #[serde(default = "default_left_template")]
    pub left_template: Option<PathBuf>,
    #[serde(default = "default_brush_color")]
    pub brush_color: Color,
    #[serde(default = "default_brush_width")]
    pub brush_width: u32,
    #[serde(default = "default_min_brush_width")]
    pub min_brush_width: u32,
    #[serde(default = "default_max_brush_width")]
    pub max_brush_width: u32,
    #[serde(default = "default_quick_colors")]
    pub quick_colors: Vec<Color>,
}

fn default_background_color() -> Color {
    Color::WHITE
}

fn default_grid_spacing() -> u32 {
    20
}

fn default_grid_dot_radius() -> u32 {
    1
}

fn default_grid_dot_color() -> Color {
    Color::rgb(204, 204, 204)
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_right_template() -> Option<PathBuf> {
    Some(PathBuf::from("eye_right.png"))
}

fn default_left_template() -> Option<PathBuf> {
    Some(PathBuf::from("eye_left.png"))
}

fn default_brush_color() -> Color {
    Color::RED
}

fn default_brush_width() -> u32 {
    2
}

fn default_min_brush_width() -> u32 {
    1
}

fn default_max_brush_width() -> u32 {
    20
}

fn default_quick_colors() -> Vec<Color> {
    vec![Color::RED, Color::BLUE, Color::GREEN, Color::BLACK]
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            surface: SurfaceSize::default(),
            background_color: default_background_color(),
            grid_spacing: default_grid_spacing(),
            grid_dot_radius: default_grid_dot_radius(),
            grid_dot_color: default_grid_dot_color(),
            asset_root: default_asset_root(),
            right_template: default_right_template(),
            left_template: default_left_template(),
            brush_color: default_brush_color(),
            brush_width: default_brush_width(),
            min_brush_width: default_min_brush_width(),
            max_brush_width: default_max_brush_width(),
            quick_colors: default_quick_colors(),
        }
    }
}

impl DiagramSettings {
    /// Pulls out-of-range values from a hand-edited file back into a usable
    /// configuration.
    pub fn sanitize(&mut self) {
        if self.surface.is_empty() {
            self.surface = SurfaceSize::default();
        }
        self.surface.width = self.surface.width.min(MAX_SURFACE_EDGE);
        self.surface.height = self.surface.height.min(MAX_SURFACE_EDGE);
        self.min_brush_width = self.min_brush_width.max(1);
        if self.max_brush_width < self.min_brush_width {
            self.max_brush_width = self.min_brush_width;
        }
        self.brush_width = self.clamp_width(self.brush_width);
        if self.quick_colors.is_empty() {
            self.quick_colors = default_quick_colors();
        }
    }

    pub fn clamp_width(&self, width: u32) -> u32 {
        width.clamp(self.min_brush_width.max(1), self.max_brush_width.max(1))
    }

    pub fn default_brush(&self) -> BrushConfig {
        BrushConfig {
            color: self.brush_color,
            width: self.clamp_width(self.brush_width),
        }
    }

    pub fn grid_style(&self) -> GridStyle {
        GridStyle {
            background: self.background_color,
            spacing: self.grid_spacing,
            dot_radius: self.grid_dot_radius,
            dot_color: self.grid_dot_color,
        }
    }

    pub fn template_for(&self, eye: Eye) -> Option<&PathBuf> {
        match eye {
            Eye::Right => self.right_template.as_ref(),
            Eye::Left => self.left_template.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_object_yields_defaults() {
        let parsed: DiagramSettings = serde_json::from_str("{}").expect("parse");
        assert_eq!(parsed, DiagramSettings::default());
    }

    #[test]
    fn colors_are_read_as_hex_strings() {
        let parsed: DiagramSettings =
            serde_json::from_str(r##"{"brush_color": "#0000ff", "quick_colors": ["#000000"]}"##)
                .expect("parse");
        assert_eq!(parsed.brush_color, Color::BLUE);
        assert_eq!(parsed.quick_colors, vec![Color::BLACK]);
        assert!(serde_json::from_str::<DiagramSettings>(r#"{"brush_color": "blue"}"#).is_err());
    }

    #[test]
    fn sanitize_repairs_out_of_range_values() {
        let mut settings = DiagramSettings {
            surface: SurfaceSize::new(0, 10),
            min_brush_width: 0,
            max_brush_width: 0,
            brush_width: 50,
            quick_colors: Vec::new(),
            ..DiagramSettings::default()
        };
        settings.sanitize();

        assert_eq!(settings.surface, SurfaceSize::default());
        assert_eq!(settings.min_brush_width, 1);
        assert_eq!(settings.max_brush_width, 1);
        assert_eq!(settings.brush_width, 1);
        assert!(!settings.quick_colors.is_empty());
    }

    #[test]
    fn templates_are_looked_up_per_eye() {
        let settings = DiagramSettings::default();
        assert_eq!(
            settings.template_for(Eye::Left),
            Some(&PathBuf::from("eye_left.png"))
        );
        assert_eq!(
            settings.template_for(Eye::Right),
            Some(&PathBuf::from("eye_right.png"))
        );
    }
}
