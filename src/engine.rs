//=========================================================================
// Sprocket Engine
//
// Main entry point and run loop.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run(handler)──>  [Run Loop]
//         │                          │
//         ├─ with_title()            ├─ event_sender() for the host
//         ├─ with_size()             └─ blocks until Destroy, quit or
//         ├─ with_frame_rate()          host disconnect
//         ├─ with_key_list()
//         └─ with_channel_capacity()
// ```
//
// Run loop (single thread):
//   1. Handler::initialize adjusts the EngineConfig
//   2. Collect host events until the next frame is due
//   3. Dispatch them in arrival order
//   4. Run a frame once the frame delay has elapsed
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{info, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::audio::{AudioService, AudioSink, NullAudioSink};
use crate::core::dispatch::{
    Context, Dispatcher, EngineConfig, EventCollector, Handler, TickControl,
};
use crate::core::input::{HostEvent, KeyCode};
use crate::core::timer::TimerService;

//=== EngineError =========================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Every event sender was dropped before `Destroy` arrived.
    #[error("host event channel disconnected before the window was destroyed")]
    ChannelDisconnected,

    /// The host hung up without ever sending `Create`.
    #[error("host event channel closed before the window was created")]
    NotStarted,
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Title**: "Game Engine"
/// - **Size**: 640 × 480
/// - **Frame rate**: 50 fps
/// - **Channel capacity**: 128 events
///
/// # Examples
///
/// ```no_run
/// use sprocket_engine::{Context, EngineBuilder, Handler};
///
/// struct Game;
///
/// impl Handler for Game {
///     fn tick(&mut self, _ctx: &mut Context) {}
/// }
///
/// let engine = EngineBuilder::new()
///     .with_title("Demo")
///     .with_frame_rate(60)
///     .with_key_list("WASD")
///     .build();
///
/// let events = engine.event_sender();
/// // hand `events` to the window host, then:
/// engine.run(Game).unwrap();
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    channel_capacity: usize,
    audio_sink: Box<dyn AudioSink>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            channel_capacity: 128,
            audio_sink: Box::new(NullAudioSink),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Sets the client area size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Sets frames per second.
    ///
    /// Default: 50
    ///
    /// # Panics
    ///
    /// Panics if `fps == 0`.
    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        assert!(fps > 0, "Frame rate must be positive, got {}", fps);
        self.config.set_frame_rate(fps);
        self
    }

    /// Keys reported through [`Handler::key_pressed`], as characters.
    pub fn with_key_list(mut self, keys: &str) -> Self {
        self.config.set_key_list(keys);
        self
    }

    /// Keys reported through [`Handler::key_pressed`].
    pub fn with_keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = KeyCode>,
    {
        self.config.set_keys(keys);
        self
    }

    /// Sets the capacity of the host → engine event channel.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Device that executes audio commands. Defaults to discarding them.
    pub fn with_audio_sink(mut self, sink: impl AudioSink + 'static) -> Self {
        self.audio_sink = Box::new(sink);
        self
    }

    pub fn build(self) -> Engine {
        info!(
            target: "engine",
            "Building engine ({} fps, channel: {})",
            self.config.frame_rate(),
            self.channel_capacity
        );

        let (sender, receiver) = bounded(self.channel_capacity);
        Engine {
            config: self.config,
            channel_capacity: self.channel_capacity,
            audio_sink: self.audio_sink,
            sender,
            receiver,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Engine runtime. Create via [`EngineBuilder`].
pub struct Engine {
    config: EngineConfig,
    channel_capacity: usize,
    audio_sink: Box<dyn AudioSink>,
    sender: Sender<HostEvent>,
    receiver: Receiver<HostEvent>,
}

impl Engine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sender for the host window's events. Clone freely.
    pub fn event_sender(&self) -> Sender<HostEvent> {
        self.sender.clone()
    }

    //--- Execution --------------------------------------------------------

    /// Drives `handler` until the window is destroyed.
    ///
    /// # Lifecycle
    ///
    /// 1. `Handler::initialize` may change the configuration
    /// 2. Frames start once the host sends `Create`
    /// 3. `Destroy`, or [`Context::quit`], runs `Handler::end` and returns `Ok`
    /// 4. If the host drops every sender first, `Handler::end` still runs
    ///    and the call fails with [`EngineError::ChannelDisconnected`]
    pub fn run<H: Handler>(self, mut handler: H) -> Result<(), EngineError> {
        let Engine {
            mut config,
            channel_capacity,
            audio_sink,
            sender,
            receiver,
        } = self;
        drop(sender);

        handler.initialize(&mut config);
        info!(
            target: "engine",
            "Starting engine \"{}\" ({}x{}, {} fps, channel: {})",
            config.title,
            config.width,
            config.height,
            config.frame_rate(),
            channel_capacity
        );

        let ctx = Context::new(config, TimerService::threaded(), AudioService::new(audio_sink));
        let mut dispatcher = Dispatcher::new(handler, ctx);
        let mut collector = EventCollector::new(receiver);
        let mut next_frame = Instant::now();

        loop {
            //--- 1. Collect host events --------------------------------------
            let wait = next_frame.saturating_duration_since(Instant::now());
            let control = collector.collect_frame(wait);

            //--- 2. Dispatch in arrival order --------------------------------
            for event in collector.take_events() {
                dispatcher.dispatch(event);
            }

            if dispatcher.is_ended() {
                info!(target: "engine", "Engine shutdown complete");
                return Ok(());
            }

            if control == TickControl::Exit && collector.is_disconnected() {
                return Self::hang_up(&mut dispatcher);
            }

            if dispatcher.context().quit_requested() {
                dispatcher.dispatch(HostEvent::Destroy);
                info!(target: "engine", "Engine shutdown complete");
                return Ok(());
            }

            //--- 3. Frame ----------------------------------------------------
            let now = Instant::now();
            if now >= next_frame {
                dispatcher.frame();
                next_frame = now + dispatcher.context().config().frame_delay();
            }
        }
    }

    fn hang_up<H: Handler>(dispatcher: &mut Dispatcher<H>) -> Result<(), EngineError> {
        if !dispatcher.is_started() {
            warn!(target: "engine", "Host disconnected before Create");
            return Err(EngineError::NotStarted);
        }

        warn!(target: "engine", "Host disconnected without Destroy, ending game");
        dispatcher.dispatch(HostEvent::Destroy);
        Err(EngineError::ChannelDisconnected)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
