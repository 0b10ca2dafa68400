//=========================================================================
// Audio Sources
//=========================================================================
//
// Playback state and command queues for audio files. The device itself
// lives behind an `AudioSink`; this module only decides which command
// to send and when.
//
// Architecture:
// ```text
//   play / pause / stop / set_volume ──> Audio.commands (VecDeque)
//                                             │ one per frame
//                                             ▼
//                       AudioService::pump ──> AudioSink::send(alias, cmd)
//
//   HostEvent::PlaybackFinished(id) ──> on_playback_finished
//                                         ├─ repeat: queue Play again
//                                         └─ else:   notify listeners
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace};
use slotmap::SlotMap;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::caller::{AudioId, Caller, ListenerRegistry};

//=== AudioError ==========================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("audio file not found: {filename}")]
    FileNotFound { filename: String },

    /// Names must be longer than their 4-character suffix.
    #[error("bad audio filename: {filename}")]
    BadFilename { filename: String },

    #[error("unsupported audio format: {filename} (expected .mp3, .wav or .mid)")]
    UnsupportedFormat { filename: String },
}

//=== AudioFormat =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Midi,
}

impl AudioFormat {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            ".mp3" => Some(Self::Mp3),
            ".wav" => Some(Self::Wav),
            ".mid" => Some(Self::Midi),
            _ => None,
        }
    }
}

//=== AudioCommand ========================================================

/// One device command, executed by the [`AudioSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCommand {
    Open { path: PathBuf, format: AudioFormat },
    /// Play from `from_ms`, up to `to_ms` or the end.
    Play { from_ms: u32, to_ms: Option<u32> },
    Pause,
    Resume,
    Stop,
    /// Volume in percent, `0..=100`.
    SetVolume(u8),
    Close,
}

//=== AudioSink ===========================================================

/// Host audio device. Called on the main thread only.
///
/// Closures taking `(&str, &AudioCommand)` implement this trait.
pub trait AudioSink {
    fn send(&mut self, alias: &str, command: &AudioCommand);
}

impl<F> AudioSink for F
where
    F: FnMut(&str, &AudioCommand),
{
    fn send(&mut self, alias: &str, command: &AudioCommand) {
        self(alias, command)
    }
}

/// Discards every command. Used when the host has no audio device.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn send(&mut self, alias: &str, command: &AudioCommand) {
        trace!(target: "audio", "{} <- {:?} (discarded)", alias, command);
    }
}

//=== Audio ===============================================================

static NEXT_ALIAS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct Audio {
    filename: PathBuf,
    alias: String,
    format: AudioFormat,
    playing: bool,
    paused: bool,
    repeat: bool,
    volume: u8,
    duration: Option<u32>,
    commands: VecDeque<AudioCommand>,
    listeners: ListenerRegistry,
}

impl Audio {
    /// Validates `filename` and queues the command that opens it.
    ///
    /// The file must exist, its name must be longer than 4 characters and
    /// end in `.mp3`, `.wav` or `.mid`. Each source gets a unique alias
    /// `audioN`.
    pub fn new(filename: impl AsRef<Path>) -> Result<Self, AudioError> {
        let path = filename.as_ref();
        let name = path.to_string_lossy().into_owned();

        if !path.is_file() {
            return Err(AudioError::FileNotFound { filename: name });
        }

        let chars: Vec<char> = name.chars().collect();
        if chars.len() < 5 {
            return Err(AudioError::BadFilename { filename: name });
        }

        let suffix: String = chars[chars.len() - 4..].iter().collect();
        let Some(format) = AudioFormat::from_suffix(&suffix) else {
            return Err(AudioError::UnsupportedFormat { filename: name });
        };

        let alias = format!("audio{}", NEXT_ALIAS.fetch_add(1, Ordering::Relaxed));
        let mut commands = VecDeque::new();
        commands.push_back(AudioCommand::Open {
            path: path.to_path_buf(),
            format,
        });

        Ok(Self {
            filename: path.to_path_buf(),
            alias,
            format,
            playing: false,
            paused: false,
            repeat: false,
            volume: 100,
            duration: None,
            commands,
            listeners: ListenerRegistry::new(),
        })
    }

    //--- Playback ---------------------------------------------------------

    /// Starts playback, or resumes if paused. No-op while already playing.
    pub fn play(&mut self, from_ms: u32, to_ms: Option<u32>) {
        if !self.playing {
            self.playing = true;
            self.paused = false;
            self.commands.push_back(AudioCommand::Play { from_ms, to_ms });
        } else if self.paused {
            self.paused = false;
            self.commands.push_back(AudioCommand::Resume);
        }
    }

    pub fn pause(&mut self) {
        if self.playing && !self.paused {
            self.paused = true;
            self.commands.push_back(AudioCommand::Pause);
        }
    }

    pub fn stop(&mut self) {
        if self.playing {
            self.playing = false;
            self.paused = false;
            self.commands.push_back(AudioCommand::Stop);
        }
    }

    /// Sets the volume in percent, clamped to `0..=100`.
    pub fn set_volume(&mut self, volume: i32) {
        self.volume = volume.clamp(0, 100) as u8;
        self.commands.push_back(AudioCommand::SetVolume(self.volume));
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    /// Pops the next queued command. At most one is sent per frame.
    pub fn tick(&mut self) -> Option<AudioCommand> {
        self.commands.pop_front()
    }

    /// Handles the device's end-of-playback notice.
    ///
    /// Returns `true` when listeners must be notified. A repeating source
    /// restarts from the beginning instead.
    pub fn on_playback_finished(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.playing = false;
        self.paused = false;

        if self.repeat {
            self.play(0, None);
            false
        } else {
            true
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Length in milliseconds, once reported by the host.
    pub fn duration(&self) -> Option<u32> {
        self.duration
    }

    pub fn set_duration(&mut self, duration_ms: u32) {
        self.duration = Some(duration_ms);
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }
}

//=== AudioService ========================================================

/// Owns every audio source and the sink their commands go to.
pub struct AudioService {
    sources: SlotMap<AudioId, Audio>,
    sink: Box<dyn AudioSink>,
}

impl AudioService {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sources: SlotMap::with_key(),
            sink,
        }
    }

    pub fn load(&mut self, filename: impl AsRef<Path>) -> Result<AudioId, AudioError> {
        let audio = Audio::new(filename)?;
        debug!(target: "audio", "loaded {} as {}", audio.filename.display(), audio.alias);
        Ok(self.sources.insert(audio))
    }

    pub fn get(&self, id: AudioId) -> Option<&Audio> {
        self.sources.get(id)
    }

    pub fn get_mut(&mut self, id: AudioId) -> Option<&mut Audio> {
        self.sources.get_mut(id)
    }

    /// Stops and closes a source right away, dropping its pending queue.
    pub fn destroy(&mut self, id: AudioId) -> bool {
        let Some(audio) = self.sources.remove(id) else {
            return false;
        };
        if audio.playing {
            self.sink.send(&audio.alias, &AudioCommand::Stop);
        }
        self.sink.send(&audio.alias, &AudioCommand::Close);
        true
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sends at most one queued command per source to the sink.
    pub fn pump(&mut self) {
        for audio in self.sources.values_mut() {
            if let Some(command) = audio.tick() {
                trace!(target: "audio", "{} <- {:?}", audio.alias, command);
                self.sink.send(&audio.alias, &command);
            }
        }
    }

    /// Applies an end-of-playback notice. Returns the caller to notify.
    pub fn playback_finished(&mut self, id: AudioId) -> Option<Caller> {
        let audio = self.sources.get_mut(id)?;
        audio.on_playback_finished().then_some(Caller::Audio(id))
    }
}

impl Default for AudioService {
    fn default() -> Self {
        Self::new(Box::new(NullAudioSink))
    }
}

impl std::fmt::Debug for AudioService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioService")
            .field("sources", &self.sources.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
