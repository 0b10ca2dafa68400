//=========================================================================
// Core
//
// Engine systems that do not depend on any windowing library.
//
// Layers (bottom-up):
// - `geometry`: points, rectangles, colours
// - `region`:   point sets for hit and collision tests
// - `caller`:   event source ids and listener registries
// - `timer`, `widget`, `audio`: event sources
// - `input`:    host event contract and keyboard state
// - `dispatch`: handler trait, context, dispatcher
//
//=========================================================================

pub mod audio;
pub mod caller;
pub mod dispatch;
pub mod geometry;
pub mod input;
pub mod region;
pub mod timer;
pub mod widget;
