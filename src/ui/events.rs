//! GUI events reported by the host and their translation into controller actions.

use super::panel::{Binding, Panel, Widget, REBUILD_TERRAIN, SLICE};
use crate::config::ConfigChange;
use crate::terrain::TerrainKind;

#[derive(Debug, Clone, PartialEq)]
pub enum GuiEvent {
    Slider { binding: Binding, value: f32 },
    Toggle { binding: Binding, enabled: bool },
    Button { name: String },
    Dropdown { index: usize },
}

/// Operations a widget can trigger beyond editing a value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    RebuildTerrain,
    Slice,
    SelectTerrain(TerrainKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuiAction {
    Config(ConfigChange),
    Command(Command),
}

/// Map a GUI event onto the controller.
///
/// Slider values are clamped to the widget range and rounded to its
/// precision. Events for widgets the panel does not contain yield `None`.
pub fn translate_event(panel: &Panel, event: &GuiEvent) -> Option<GuiAction> {
    match event {
        GuiEvent::Slider { binding, value } => {
            let value = match panel.find_slider(*binding)? {
                Widget::Slider {
                    min,
                    max,
                    precision,
                    ..
                } => snap(*value, *min, *max, *precision),
                _ => return None,
            };
            slider_change(*binding, value).map(GuiAction::Config)
        }
        GuiEvent::Toggle { binding, enabled } => {
            toggle_change(*binding, *enabled).map(GuiAction::Config)
        }
        GuiEvent::Button { name } => match name.as_str() {
            REBUILD_TERRAIN => Some(GuiAction::Command(Command::RebuildTerrain)),
            SLICE => Some(GuiAction::Command(Command::Slice)),
            _ => None,
        },
        GuiEvent::Dropdown { index } => {
            TerrainKind::from_index(*index).map(|k| GuiAction::Command(Command::SelectTerrain(k)))
        }
    }
}

fn snap(value: f32, min: f32, max: f32, precision: u32) -> f32 {
    let value = if value.is_nan() { min } else { value.clamp(min, max) };
    let scale = 10f32.powi(precision as i32);
    ((value * scale).round() / scale).clamp(min, max)
}

fn slider_change(binding: Binding, value: f32) -> Option<ConfigChange> {
    let whole = value.round() as u32;
    Some(match binding {
        Binding::GridResolution => ConfigChange::GridResolution(whole),
        Binding::GridZoom => ConfigChange::GridZoom(value),
        Binding::RayResolutionX => ConfigChange::RayResolutionX(whole),
        Binding::RayResolutionY => ConfigChange::RayResolutionY(whole),
        Binding::RayMaxSteps => ConfigChange::RayMaxSteps(whole),
        Binding::RayMaxDistance => ConfigChange::RayMaxDistance(value),
        Binding::Timescale => ConfigChange::Timescale(value),
        _ => return None,
    })
}

fn toggle_change(binding: Binding, enabled: bool) -> Option<ConfigChange> {
    match binding {
        Binding::SmoothNormals => Some(ConfigChange::SmoothNormals(enabled)),
        Binding::PhysicsEnabled => Some(ConfigChange::PhysicsEnabled(enabled)),
        Binding::Wireframe => Some(ConfigChange::Wireframe(enabled)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::ui::build_panel;

    fn grid_panel() -> Panel {
        build_panel(&AppConfig::default(), TerrainKind::GridMarchingCubes)
    }

    #[test]
    fn test_slider_is_clamped_and_rounded() {
        let panel = grid_panel();
        let action = translate_event(
            &panel,
            &GuiEvent::Slider {
                binding: Binding::GridResolution,
                value: 512.7,
            },
        );
        assert_eq!(action, Some(GuiAction::Config(ConfigChange::GridResolution(128))));

        let action = translate_event(
            &panel,
            &GuiEvent::Slider {
                binding: Binding::GridZoom,
                value: 7.26,
            },
        );
        match action {
            Some(GuiAction::Config(ConfigChange::GridZoom(v))) => assert!((v - 7.3).abs() < 1e-5),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_slider_missing_from_layout_is_ignored() {
        let panel = grid_panel();
        let event = GuiEvent::Slider {
            binding: Binding::RayMaxSteps,
            value: 100.0,
        };
        assert_eq!(translate_event(&panel, &event), None);
    }

    #[test]
    fn test_buttons_and_dropdown() {
        let panel = grid_panel();
        let slice = GuiEvent::Button {
            name: SLICE.to_string(),
        };
        assert_eq!(
            translate_event(&panel, &slice),
            Some(GuiAction::Command(Command::Slice))
        );
        assert_eq!(
            translate_event(&panel, &GuiEvent::Dropdown { index: 2 }),
            Some(GuiAction::Command(Command::SelectTerrain(
                TerrainKind::RaymarchedDistanceField
            )))
        );
        assert_eq!(translate_event(&panel, &GuiEvent::Dropdown { index: 9 }), None);
    }

    #[test]
    fn test_toggle() {
        let panel = grid_panel();
        let event = GuiEvent::Toggle {
            binding: Binding::Wireframe,
            enabled: true,
        };
        assert_eq!(
            translate_event(&panel, &event),
            Some(GuiAction::Config(ConfigChange::Wireframe(true)))
        );
    }
}
