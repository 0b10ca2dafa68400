//=========================================================================
// Sprocket Engine — Library Root
//
// A small 2D game engine core: hit regions, listener-driven timers and
// widgets, and dispatch of host window events to a game handler.
//
// Typical usage:
// ```no_run
// use sprocket_engine::prelude::*;
//
// struct Game;
//
// impl Handler for Game {
//     fn tick(&mut self, _ctx: &mut Context) {}
// }
//
// let engine = EngineBuilder::new().with_title("Demo").build();
// let events = engine.event_sender(); // give this to the window host
// engine.run(Game).unwrap();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds every engine system. `platform` translates winit window
// events for hosts built on winit.
//
pub mod core;
pub mod platform;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------

mod engine;

//--- Public Exports ------------------------------------------------------

pub use crate::core::dispatch::{Context, EngineConfig, Handler};
pub use engine::{Engine, EngineBuilder, EngineError};
