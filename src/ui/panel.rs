//! Declarative control panel.
//!
//! The host GUI renders a [`Panel`] and reports [`super::GuiEvent`]s back.
//! Widgets never hold references into the controller; a [`Binding`] names
//! the value a widget edits.

use crate::config::{ranges, AppConfig};
use crate::terrain::TerrainKind;

pub const TITLE: &str = "Real-Time Physics Based Destruction With Density-Field Terrains";
pub const REBUILD_TERRAIN: &str = "Rebuild Terrain";
pub const SLICE: &str = "Slice";
pub const SLICE_DONE: &str = "Slice Done";

/// Value a widget is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    GridResolution,
    GridZoom,
    SmoothNormals,
    RayResolutionX,
    RayResolutionY,
    RayMaxSteps,
    RayMaxDistance,
    PhysicsEnabled,
    Wireframe,
    Timescale,
    FrameTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Label(String),
    Break { height: f32 },
    Folder {
        name: String,
        color: [u8; 3],
        widgets: Vec<Widget>,
    },
    Slider {
        label: String,
        min: f32,
        max: f32,
        value: f32,
        /// Decimal places shown and kept
        precision: u32,
        binding: Binding,
    },
    Toggle {
        label: String,
        enabled: bool,
        binding: Binding,
    },
    Button { label: String },
    Dropdown {
        label: String,
        options: Vec<String>,
        selected: usize,
    },
    FrameRate,
    TextInput {
        label: String,
        text: String,
        binding: Binding,
    },
    ValuePlotter {
        label: String,
        min: f32,
        max: f32,
        value: f32,
    },
    Footer {
        collapsed_label: String,
        expanded_label: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    pub widgets: Vec<Widget>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&mut self, text: &str) -> &mut Self {
        self.widgets.push(Widget::Label(text.to_string()));
        self
    }

    pub fn break_line(&mut self, height: f32) -> &mut Self {
        self.widgets.push(Widget::Break { height });
        self
    }

    pub fn folder(&mut self, name: &str, color: [u8; 3], build: impl FnOnce(&mut Panel)) -> &mut Self {
        let mut inner = Panel::new();
        build(&mut inner);
        self.widgets.push(Widget::Folder {
            name: name.to_string(),
            color,
            widgets: inner.widgets,
        });
        self
    }

    pub fn slider(
        &mut self,
        label: &str,
        (min, max): (f32, f32),
        value: f32,
        precision: u32,
        binding: Binding,
    ) -> &mut Self {
        self.widgets.push(Widget::Slider {
            label: label.to_string(),
            min,
            max,
            value,
            precision,
            binding,
        });
        self
    }

    pub fn toggle(&mut self, label: &str, enabled: bool, binding: Binding) -> &mut Self {
        self.widgets.push(Widget::Toggle {
            label: label.to_string(),
            enabled,
            binding,
        });
        self
    }

    pub fn button(&mut self, label: &str) -> &mut Self {
        self.widgets.push(Widget::Button {
            label: label.to_string(),
        });
        self
    }

    pub fn dropdown(&mut self, label: &str, options: &[&str], selected: usize) -> &mut Self {
        self.widgets.push(Widget::Dropdown {
            label: label.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            selected,
        });
        self
    }

    pub fn frame_rate(&mut self) -> &mut Self {
        self.widgets.push(Widget::FrameRate);
        self
    }

    pub fn text_input(&mut self, label: &str, text: &str, binding: Binding) -> &mut Self {
        self.widgets.push(Widget::TextInput {
            label: label.to_string(),
            text: text.to_string(),
            binding,
        });
        self
    }

    pub fn value_plotter(&mut self, label: &str, min: f32, max: f32) -> &mut Self {
        self.widgets.push(Widget::ValuePlotter {
            label: label.to_string(),
            min,
            max,
            value: min,
        });
        self
    }

    pub fn footer(&mut self, collapsed_label: &str, expanded_label: &str) -> &mut Self {
        self.widgets.push(Widget::Footer {
            collapsed_label: collapsed_label.to_string(),
            expanded_label: expanded_label.to_string(),
        });
        self
    }

    /// Depth-first walk over every widget, folders included
    pub fn walk(&self) -> Vec<&Widget> {
        fn visit<'a>(widgets: &'a [Widget], out: &mut Vec<&'a Widget>) {
            for widget in widgets {
                out.push(widget);
                if let Widget::Folder { widgets, .. } = widget {
                    visit(widgets, out);
                }
            }
        }
        let mut out = Vec::new();
        visit(&self.widgets, &mut out);
        out
    }

    fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Widget)) {
        fn visit(widgets: &mut [Widget], f: &mut dyn FnMut(&mut Widget)) {
            for widget in widgets {
                f(widget);
                if let Widget::Folder { widgets, .. } = widget {
                    visit(widgets, f);
                }
            }
        }
        visit(&mut self.widgets, f);
    }

    pub fn widget_count(&self) -> usize {
        self.walk().len()
    }

    pub fn find_slider(&self, binding: Binding) -> Option<&Widget> {
        self.walk()
            .into_iter()
            .find(|w| matches!(w, Widget::Slider { binding: b, .. } if *b == binding))
    }

    pub fn has_button(&self, label: &str) -> bool {
        self.walk()
            .iter()
            .any(|w| matches!(w, Widget::Button { label: l } if l == label))
    }

    /// Rename a button; false when no button carries `from`
    pub fn rename_button(&mut self, from: &str, to: &str) -> bool {
        let mut renamed = false;
        self.walk_mut(&mut |w| {
            if let Widget::Button { label } = w {
                if label.as_str() == from {
                    *label = to.to_string();
                    renamed = true;
                }
            }
        });
        renamed
    }

    pub fn set_text(&mut self, binding: Binding, text: &str) {
        self.walk_mut(&mut |w| {
            if let Widget::TextInput { text: t, binding: b, .. } = w {
                if *b == binding {
                    *t = text.to_string();
                }
            }
        });
    }

    pub fn set_plot_value(&mut self, label: &str, value: f32) {
        self.walk_mut(&mut |w| {
            if let Widget::ValuePlotter { label: l, value: v, .. } = w {
                if l.as_str() == label {
                    *v = value;
                }
            }
        });
    }

    /// Copy live values into the matching sliders and toggles
    pub fn sync(&mut self, config: &AppConfig) {
        self.walk_mut(&mut |w| match w {
            Widget::Slider { value, binding, .. } => {
                if let Some(v) = slider_value(config, *binding) {
                    *value = v;
                }
            }
            Widget::Toggle { enabled, binding, .. } => {
                if let Some(v) = toggle_value(config, *binding) {
                    *enabled = v;
                }
            }
            _ => {}
        });
    }
}

fn slider_value(config: &AppConfig, binding: Binding) -> Option<f32> {
    let grid = &config.terrain.grid;
    let ray = &config.terrain.raymarch;
    Some(match binding {
        Binding::GridResolution => grid.resolution as f32,
        Binding::GridZoom => grid.zoom,
        Binding::RayResolutionX => ray.resolution_x as f32,
        Binding::RayResolutionY => ray.resolution_y as f32,
        Binding::RayMaxSteps => ray.max_steps as f32,
        Binding::RayMaxDistance => ray.max_distance,
        Binding::Timescale => config.physics.timescale,
        _ => return None,
    })
}

fn toggle_value(config: &AppConfig, binding: Binding) -> Option<bool> {
    match binding {
        Binding::SmoothNormals => Some(config.terrain.grid.smooth_normals),
        Binding::PhysicsEnabled => Some(config.physics.enabled),
        Binding::Wireframe => Some(config.physics.wireframe),
        _ => None,
    }
}

/// Panel layout for the current configuration and active terrain
pub fn build_panel(config: &AppConfig, active: TerrainKind) -> Panel {
    let options: Vec<&str> = TerrainKind::ALL.iter().map(|k| k.label()).collect();
    let mut panel = Panel::new();

    panel
        .label(TITLE)
        .break_line(2.0)
        .folder("Diagnostics", [255, 255, 255], |f| {
            f.frame_rate()
                .text_input("Frame-Time", "0ms", Binding::FrameTime)
                .value_plotter("FT", 0.0, 0.1);
        })
        .break_line(2.0)
        .label("Terrain Type: ")
        .dropdown(active.label(), &options, active.index())
        .break_line(2.0)
        .folder("Terrain Controls", [0, 139, 139], |f| match active {
            TerrainKind::RaymarchedDistanceField => {
                f.slider("Render Resolution X", ranges::RAY_RESOLUTION_X, 1280.0, 0, Binding::RayResolutionX)
                    .slider("Render Resolution Y", ranges::RAY_RESOLUTION_Y, 720.0, 0, Binding::RayResolutionY)
                    .slider("Max Steps", ranges::RAY_MAX_STEPS, 256.0, 0, Binding::RayMaxSteps)
                    .slider("Max Distance", ranges::RAY_MAX_DISTANCE, 1500.0, 2, Binding::RayMaxDistance)
                    .button(REBUILD_TERRAIN);
            }
            _ => {
                f.slider("Grid Resolution", ranges::GRID_RESOLUTION, 64.0, 0, Binding::GridResolution)
                    .slider("Grid Zoom", ranges::GRID_ZOOM, 5.0, 1, Binding::GridZoom)
                    .toggle("Smooth Normals", false, Binding::SmoothNormals)
                    .button(REBUILD_TERRAIN);
            }
        })
        .folder("Physics", [255, 0, 0], |f| {
            f.toggle("Physics Enabled", false, Binding::PhysicsEnabled)
                .toggle("Wireframe", false, Binding::Wireframe)
                .slider("Timescale", ranges::PHYSICS_TIMESCALE, 1.0, 2, Binding::Timescale)
                .button(SLICE);
        })
        .footer(":: SHOW TOOLS ::", ":: HIDE TOOLS ::");

    panel.sync(config);
    panel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raymarch_layout() {
        let panel = build_panel(&AppConfig::default(), TerrainKind::RaymarchedDistanceField);

        assert!(panel.find_slider(Binding::RayMaxSteps).is_some());
        assert!(panel.find_slider(Binding::GridResolution).is_none());
        assert!(panel.has_button(REBUILD_TERRAIN));
        assert!(panel.has_button(SLICE));

        let dropdown = panel
            .walk()
            .into_iter()
            .find_map(|w| match w {
                Widget::Dropdown { options, selected, .. } => Some((options.clone(), *selected)),
                _ => None,
            })
            .expect("terrain dropdown");
        assert_eq!(dropdown.0.len(), 3);
        assert_eq!(dropdown.1, 2);
    }

    #[test]
    fn test_grid_layout_reflects_config() {
        let mut config = AppConfig::default();
        config.terrain.grid.resolution = 32;
        config.terrain.grid.smooth_normals = true;
        let panel = build_panel(&config, TerrainKind::GridMarchingCubes);

        match panel.find_slider(Binding::GridResolution) {
            Some(Widget::Slider { value, min, max, .. }) => {
                assert_eq!(*value, 32.0);
                assert_eq!((*min, *max), (3.0, 128.0));
            }
            other => panic!("unexpected widget {:?}", other),
        }
        assert!(panel.walk().iter().any(|w| matches!(
            w,
            Widget::Toggle { binding: Binding::SmoothNormals, enabled: true, .. }
        )));
    }

    #[test]
    fn test_rename_button() {
        let mut panel = build_panel(&AppConfig::default(), TerrainKind::GridMarchingCubes);
        assert!(panel.rename_button(SLICE, SLICE_DONE));
        assert!(panel.has_button(SLICE_DONE));
        assert!(!panel.has_button(SLICE));
        assert!(!panel.rename_button(SLICE, SLICE_DONE));
    }

    #[test]
    fn test_diagnostics_text_updates() {
        let mut panel = build_panel(&AppConfig::default(), TerrainKind::GridMarchingCubes);
        panel.set_text(Binding::FrameTime, "16.67 ms");
        assert!(panel.walk().iter().any(|w| matches!(
            w,
            Widget::TextInput { text, .. } if text == "16.67 ms"
        )));
    }
}
