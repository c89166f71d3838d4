use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::a11y::VolumeLevel;
use crate::audio::cache::AudioCache;
use crate::audio::remote::{LocalSynth, RemoteSynth};
use crate::audio::request::{
    AudioPayload, AudioRequest, PayloadSource, RequestStatus, SpeakOptions,
};
use crate::event::AppEvent;

/// Asynchronous continuation of a speak() call. Every variant carries the
/// generation captured when the work was started; the engine discards any
/// event whose generation no longer matches its counter.
#[derive(Clone, Debug)]
pub enum AudioEvent {
    RemoteReady { generation: u64, bytes: Vec<u8> },
    RemoteFailed { generation: u64, error: String },
    PlaybackEnded { generation: u64 },
    PlaybackFailed { generation: u64, error: String },
}

impl AudioEvent {
    pub fn generation(&self) -> u64 {
        match *self {
            AudioEvent::RemoteReady { generation, .. }
            | AudioEvent::RemoteFailed { generation, .. }
            | AudioEvent::PlaybackEnded { generation }
            | AudioEvent::PlaybackFailed { generation, .. } => generation,
        }
    }
}

/// Playback device seam. The shipped sink simulates playback timing; tests
/// inject recording sinks.
pub trait AudioSink: Send {
    fn play(&mut self, payload: &AudioPayload, gain: f32, speed: f32, generation: u64);
    fn stop(&mut self);
}

/// Estimates playback duration from the payload size (16kHz mono i16 PCM)
/// and the playback rate, then posts `PlaybackEnded` after that long. A stale
/// generation makes the eventual event a no-op, so `stop` has nothing to tear
/// down.
pub struct SimulatedSink {
    tx: Sender<AppEvent>,
}

impl SimulatedSink {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl AudioSink for SimulatedSink {
    fn play(&mut self, payload: &AudioPayload, _gain: f32, speed: f32, generation: u64) {
        let base = payload.bytes.len() as f32 * 1000.0 / 32_000.0;
        let millis = (base / speed.max(0.25)).clamp(200.0, 6_000.0) as u64;
        let tx = self.tx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(millis));
            let _ = tx.send(AppEvent::Audio(AudioEvent::PlaybackEnded { generation }));
        });
    }

    fn stop(&mut self) {}
}

/// One silent failure, kept for observability. The user never sees these.
#[derive(Clone, Debug)]
pub struct SynthFailure {
    pub at: DateTime<Utc>,
    pub text: String,
    pub detail: String,
}

const DIAGNOSTICS_CAP: usize = 32;

/// Single-flight spoken feedback with a cache → remote → local fallback chain.
///
/// A plain instance owned by the application (or a test); holds all of its
/// own state. Cancellation is implicit: each speak() bumps the generation and
/// any continuation from an earlier generation is discarded on arrival.
pub struct AudioFeedbackEngine {
    generation: u64,
    playing: bool,
    current: Option<AudioRequest>,
    last_replayable: Option<String>,
    cache: Option<AudioCache>,
    remote: Option<Arc<dyn RemoteSynth>>,
    local: Box<dyn LocalSynth>,
    sink: Box<dyn AudioSink>,
    tx: Sender<AppEvent>,
    diagnostics: VecDeque<SynthFailure>,
}

impl AudioFeedbackEngine {
    pub fn new(
        cache: Option<AudioCache>,
        remote: Option<Arc<dyn RemoteSynth>>,
        local: Box<dyn LocalSynth>,
        sink: Box<dyn AudioSink>,
        tx: Sender<AppEvent>,
    ) -> Self {
        Self {
            generation: 0,
            playing: false,
            current: None,
            last_replayable: None,
            cache,
            remote,
            local,
            sink,
            tx,
            diagnostics: VecDeque::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current(&self) -> Option<&AudioRequest> {
        self.current.as_ref()
    }

    pub fn diagnostics(&self) -> &VecDeque<SynthFailure> {
        &self.diagnostics
    }

    /// Start a new utterance, cancelling whatever was in flight.
    pub fn speak(&mut self, text: &str, opts: SpeakOptions) {
        if text.is_empty() {
            return;
        }

        // Clear the playing flag before any asynchronous work: if a previous
        // attempt never reached a terminal state, the engine must not wedge.
        self.playing = false;
        self.sink.stop();
        if let Some(prior) = self.current.as_mut() {
            if !prior.status.is_terminal() {
                prior.status = RequestStatus::Cancelled;
            }
        }

        self.generation += 1;
        if opts.replayable {
            self.last_replayable = Some(text.to_string());
        }
        self.current = Some(AudioRequest::new(
            self.generation,
            text,
            opts.volume.gain(),
            opts.speed,
        ));

        if let Some(bytes) = self.cache.as_ref().and_then(|c| c.get(text)) {
            self.start_playback(AudioPayload {
                bytes,
                source: PayloadSource::Cache,
            });
            return;
        }

        match self.remote.clone() {
            Some(remote) => self.spawn_remote(remote, text.to_string()),
            None => self.local_fallback(),
        }
    }

    /// Re-speak the last phrase that was marked replayable.
    pub fn replay(&mut self, volume: VolumeLevel, speed: f32) {
        if let Some(text) = self.last_replayable.clone() {
            self.speak(&text, SpeakOptions::replayable(volume).at_speed(speed));
        }
    }

    /// Deliver an asynchronous continuation. Stale generations are discarded
    /// with no side effects; last-issued wins even when completions arrive
    /// out of order.
    pub fn handle_event(&mut self, event: AudioEvent) {
        if event.generation() != self.generation {
            return;
        }
        match event {
            AudioEvent::RemoteReady { bytes, .. } => {
                self.persist_to_cache(&bytes);
                self.start_playback(AudioPayload {
                    bytes,
                    source: PayloadSource::Remote,
                });
            }
            AudioEvent::RemoteFailed { .. } => self.local_fallback(),
            AudioEvent::PlaybackEnded { .. } => {
                if let Some(req) = self.current.as_mut() {
                    req.status = RequestStatus::Done;
                }
                self.playing = false;
                self.current = None;
            }
            AudioEvent::PlaybackFailed { error, .. } => {
                let text = self
                    .current
                    .as_ref()
                    .map(|r| r.text.clone())
                    .unwrap_or_default();
                self.record_failure(text, format!("playback error: {error}"));
                if let Some(req) = self.current.as_mut() {
                    req.status = RequestStatus::Failed;
                }
                self.playing = false;
                self.current = None;
            }
        }
    }

    fn spawn_remote(&self, remote: Arc<dyn RemoteSynth>, text: String) {
        let generation = self.generation;
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match remote.synthesize(&text) {
                Ok(bytes) => AudioEvent::RemoteReady { generation, bytes },
                Err(e) => AudioEvent::RemoteFailed {
                    generation,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(AppEvent::Audio(event));
        });
    }

    /// Best-effort, off the main flow: a persistence failure never fails
    /// playback.
    fn persist_to_cache(&self, bytes: &[u8]) {
        let (Some(cache), Some(req)) = (self.cache.clone(), self.current.as_ref()) else {
            return;
        };
        let text = req.text.clone();
        let bytes = bytes.to_vec();
        thread::spawn(move || {
            let _ = cache.put(&text, &bytes);
        });
    }

    fn local_fallback(&mut self) {
        let Some(text) = self.current.as_ref().map(|r| r.text.clone()) else {
            return;
        };
        match self.local.synthesize(&text) {
            Ok(bytes) => self.start_playback(AudioPayload {
                bytes,
                source: PayloadSource::Local,
            }),
            Err(e) => {
                // Exhausted fallback chain: silence, never an error.
                self.record_failure(text, e.to_string());
                if let Some(req) = self.current.as_mut() {
                    req.status = RequestStatus::Failed;
                }
                self.playing = false;
                self.current = None;
            }
        }
    }

    fn start_playback(&mut self, payload: AudioPayload) {
        let Some(req) = self.current.as_mut() else {
            return;
        };
        req.status = RequestStatus::Playing;
        let gain = req.gain;
        let speed = req.speed;
        let generation = req.id;
        self.playing = true;
        self.sink.play(&payload, gain, speed, generation);
    }

    fn record_failure(&mut self, text: String, detail: String) {
        if self.diagnostics.len() == DIAGNOSTICS_CAP {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(SynthFailure {
            at: Utc::now(),
            text,
            detail,
        });
    }
}
