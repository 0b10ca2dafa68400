//=========================================================================
// Input
//=========================================================================
//
// Host event types plus keyboard state tracking.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod event;
mod keyboard;

//=== Public API ==========================================================

pub use event::{HostEvent, KeyCode, Modifiers, MouseButton};
pub use keyboard::{KeyMonitor, KeyboardState};
