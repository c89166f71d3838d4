use crate::a11y::VolumeLevel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Playing,
    Cancelled,
    Failed,
    Done,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Cancelled | RequestStatus::Failed | RequestStatus::Done
        )
    }
}

/// One spoken-feedback attempt. The id doubles as the engine generation: a
/// request whose id no longer matches the engine's counter is stale and every
/// continuation carrying it must be discarded.
#[derive(Clone, Debug)]
pub struct AudioRequest {
    pub id: u64,
    pub text: String,
    /// Playback rate multiplier; 1.0 is the recorded rate.
    pub speed: f32,
    pub gain: f32,
    pub status: RequestStatus,
}

impl AudioRequest {
    pub fn new(id: u64, text: impl Into<String>, gain: f32, speed: f32) -> Self {
        Self {
            id,
            text: text.into(),
            speed,
            gain,
            status: RequestStatus::Pending,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadSource {
    Cache,
    Remote,
    Local,
}

/// Opaque audio bytes plus where they came from (tests and diagnostics only;
/// playback does not care).
#[derive(Clone, Debug)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub source: PayloadSource,
}

#[derive(Clone, Copy, Debug)]
pub struct SpeakOptions {
    /// Whether the Repeat key may re-speak this phrase later. Transient
    /// confirmations opt out so Repeat never replays a bare "processing".
    pub replayable: bool,
    pub volume: VolumeLevel,
    pub speed: f32,
}

impl SpeakOptions {
    pub fn replayable(volume: VolumeLevel) -> Self {
        Self {
            replayable: true,
            volume,
            speed: 1.0,
        }
    }

    pub fn transient(volume: VolumeLevel) -> Self {
        Self {
            replayable: false,
            volume,
            speed: 1.0,
        }
    }

    pub fn at_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}
