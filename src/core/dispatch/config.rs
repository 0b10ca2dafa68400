//=========================================================================
// Engine Configuration
//=========================================================================
//
// Window and pacing settings chosen before the run loop starts.
//
// The builder fills in an `EngineConfig`, `Handler::initialize` may adjust
// it, and the result is moved into the `Context` where the game can still
// change the frame rate and key list while running.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::input::KeyCode;

//=== Defaults ============================================================

pub const DEFAULT_TITLE: &str = "Game Engine";
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;
pub const DEFAULT_FRAME_RATE: u32 = 50;

//=== EngineConfig ========================================================

/// Window and pacing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    frame_rate: u32,
    key_list: Vec<KeyCode>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            frame_rate: DEFAULT_FRAME_RATE,
            key_list: Vec::new(),
        }
    }

    //--- Frame Pacing -----------------------------------------------------

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Sets frames per second. Returns `false` and keeps the old rate
    /// when `fps` is zero.
    pub fn set_frame_rate(&mut self, fps: u32) -> bool {
        if fps == 0 {
            return false;
        }
        self.frame_rate = fps;
        true
    }

    /// Time between frames, `1000 / frame_rate` whole milliseconds.
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(u64::from(1000 / self.frame_rate))
    }

    //--- Key List ---------------------------------------------------------

    pub fn key_list(&self) -> &[KeyCode] {
        &self.key_list
    }

    pub fn set_keys<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = KeyCode>,
    {
        self.key_list = keys.into_iter().collect();
    }

    /// Sets the watched keys from characters, e.g. `"WASD "`.
    ///
    /// Letters match regardless of case. Characters without a key are
    /// skipped.
    pub fn set_key_list(&mut self, keys: &str) {
        self.key_list = keys
            .chars()
            .filter_map(|c| {
                let key = KeyCode::from_char(c);
                if key.is_none() {
                    debug!(target: "engine", "No key for {:?} in key list", c);
                }
                key
            })
            .collect();
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
