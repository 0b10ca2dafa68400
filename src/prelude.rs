//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use sprocket_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder, EngineError};

// Dispatch
pub use crate::core::dispatch::{
    script_names, Context, Dispatcher, EngineConfig, Handler, MouseAction, ScriptArgs,
    ScriptHandler,
};

// Event sources and listeners
pub use crate::core::audio::{Audio, AudioCommand, AudioError, AudioSink};
pub use crate::core::caller::{AudioId, Caller, CallerType, Listener, Target, TimerId, WidgetId};
pub use crate::core::widget::{Button, TextBox};

// Geometry and regions
pub use crate::core::geometry::{Color, Point, Rect};
pub use crate::core::region::{Bitmap, PixelBuffer, Region, RegionError, Shape};

// Input
pub use crate::core::input::{HostEvent, KeyCode, Modifiers, MouseButton};
