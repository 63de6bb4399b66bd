pub mod diagnostics;
pub mod events;
pub mod panel;

pub use diagnostics::Diagnostics;
pub use events::{translate_event, Command, GuiAction, GuiEvent};
pub use panel::{build_panel, Binding, Panel, Widget, REBUILD_TERRAIN, SLICE, SLICE_DONE};
