//! Embedded player control
//!
//! A thin facade over whatever actually renders the video (an iframe bridge,
//! a desktop player, a test double). The handle is owned by a
//! [`PlayerSession`]; readiness is an explicit signal the backend fires once
//! it can accept commands.

use crate::timecode::{TimeValue, coerce};
use crate::video_search::VideoRecord;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

/// Errors reported by a player backend or session
#[derive(Debug, Error)]
pub enum PlayerError {
    /// A command was issued before the backend signalled readiness
    #[error("Player is not ready yet")]
    NotReady,

    /// The backend went away before it ever became ready
    #[error("Player was dropped before becoming ready")]
    ReadinessLost,

    /// The backend rejected a command
    #[error("Player backend error: {0}")]
    Backend(String),
}

/// Playback state as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// Loaded, never played
    Unstarted,
    /// Currently playing
    Playing,
    /// Stopped by a pause command or the user
    Paused,
    /// Waiting for data
    Buffering,
    /// Reached the end of the video
    Ended,
}

/// Commands understood by a player backend
pub trait PlayerControl: Send {
    fn play(&mut self) -> Result<(), PlayerError>;

    fn pause(&mut self) -> Result<(), PlayerError>;

    /// Sets the volume, `0..=100`
    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError>;

    /// Jumps to an absolute position in seconds
    fn seek(&mut self, seconds: u64) -> Result<(), PlayerError>;

    /// Replaces the current video, cueing it at `start_seconds`
    fn load_video(&mut self, video_id: &str, start_seconds: u64) -> Result<(), PlayerError>;

    fn play_state(&self) -> PlayState;
}

/// Sending half of the readiness signal, held by the backend
#[derive(Debug)]
pub struct ReadySignal {
    sender: watch::Sender<bool>,
}

impl ReadySignal {
    /// Marks the backend as ready to accept commands
    pub fn mark_ready(&self) {
        self.sender.send_replace(true);
    }
}

/// Receiving half of the readiness signal, held by the session
#[derive(Debug, Clone)]
pub struct ReadyHandle {
    receiver: watch::Receiver<bool>,
}

impl ReadyHandle {
    pub fn is_ready(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Waits until the backend is ready
    ///
    /// Returns immediately if it already is.
    pub async fn wait(&mut self) -> Result<(), PlayerError> {
        self.receiver
            .wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| PlayerError::ReadinessLost)
    }
}

/// Creates a connected readiness signal pair
pub fn ready_channel() -> (ReadySignal, ReadyHandle) {
    let (sender, receiver) = watch::channel(false);
    (ReadySignal { sender }, ReadyHandle { receiver })
}

/// Owns a player backend and drives it
pub struct PlayerSession<P: PlayerControl> {
    player: P,
    ready: ReadyHandle,
}

impl<P: PlayerControl> PlayerSession<P> {
    /// Creates a session for a backend and its readiness handle
    pub fn new(player: P, ready: ReadyHandle) -> Self {
        Self { player, ready }
    }

    /// Read access to the backend
    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn into_inner(self) -> P {
        self.player
    }

    /// Loads a clip and plays it from its start offset
    ///
    /// Waits for the backend to become ready first, which only blocks the
    /// first time.
    pub async fn start_clip(&mut self, video: &VideoRecord) -> Result<(), PlayerError> {
        self.ready.wait().await?;

        let descriptor = &video.embed_descriptor;
        debug!(
            video_id = %descriptor.video_id,
            start_seconds = descriptor.start_seconds,
            "Starting clip"
        );
        self.player
            .load_video(&descriptor.video_id, descriptor.start_seconds)?;
        self.player.seek(descriptor.start_seconds)?;
        self.player.play()
    }

    /// Pauses while playing, plays otherwise
    pub fn toggle_play(&mut self) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        match self.player.play_state() {
            PlayState::Playing => self.player.pause(),
            _ => self.player.play(),
        }
    }

    /// Seeks to a timecode string or a number of seconds
    ///
    /// Unparseable timecodes seek to the beginning.
    pub fn seek_to<'a>(&mut self, position: impl Into<TimeValue<'a>>) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        self.player.seek(coerce(position))
    }

    /// Sets the volume from a fraction, clamped to `0.0..=1.0`
    pub fn set_volume_fraction(&mut self, fraction: f32) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        self.player.set_volume(volume_from_fraction(fraction))
    }

    fn ensure_ready(&self) -> Result<(), PlayerError> {
        if self.ready.is_ready() {
            Ok(())
        } else {
            Err(PlayerError::NotReady)
        }
    }
}

/// NaN maps to silence
fn volume_from_fraction(fraction: f32) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}
