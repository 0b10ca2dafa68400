//=========================================================================
// Platform Adapter
//
// Bridges winit window events into the engine's host event channel.
//
// Architecture:
// ```text
//  Host thread (owns the window)          Engine::run thread
//  ┌──────────────────────────┐           ┌──────────────────┐
//  │  winit event loop        │           │  EventCollector  │
//  │   ↓ WindowEvent          │           │   ↓              │
//  │  InputTranslator         │           │  Dispatcher      │
//  │   ├─ tracks modifiers    │           │   ↓              │
//  │   ├─ tracks cursor       │  channel  │  Handler hooks   │
//  │   └─ synthesizes dbl-clk │ ────────> │                  │
//  └──────────────────────────┘ HostEvent └──────────────────┘
// ```
//
// The engine never creates windows or runs the winit loop itself. The
// host owns both and forwards what it receives.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_translator;

//=== Public API ==========================================================

pub use input_translator::{InputTranslator, WHEEL_DELTA};
