use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use kioska::app::{App, KeypadKey};
use kioska::audio::engine::{AudioFeedbackEngine, AudioSink};
use kioska::audio::remote::{LocalSynth, SynthError};
use kioska::audio::request::AudioPayload;
use kioska::config::Config;
use kioska::event::AppEvent;
use kioska::route::{ModalKind, Screen};

struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _payload: &AudioPayload, _gain: f32, _speed: f32, _generation: u64) {}
    fn stop(&mut self) {}
}

/// Local-only voice that records what was spoken. No remote, no cache, no
/// worker threads, so the whole fixture is deterministic.
struct EchoLocal {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl LocalSynth for EchoLocal {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthError> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(text.as_bytes().to_vec())
    }
}

struct Fixture {
    app: App,
    spoken: Arc<Mutex<Vec<String>>>,
    start: Instant,
    _rx: Receiver<AppEvent>,
}

fn fixture() -> Fixture {
    let (tx, rx) = mpsc::channel();
    let spoken = Arc::new(Mutex::new(Vec::new()));
    let engine = AudioFeedbackEngine::new(
        None,
        None,
        Box::new(EchoLocal {
            spoken: spoken.clone(),
        }),
        Box::new(NullSink),
        tx,
    );
    let start = Instant::now();
    let app = App::new(Config::default(), engine, start);
    Fixture {
        app,
        spoken,
        start,
        _rx: rx,
    }
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

impl Fixture {
    /// Drive the 100ms tick over a span, like the event loop would.
    fn run_ticks(&mut self, from: Duration, to: Duration) {
        let mut at = from;
        while at <= to {
            self.app.handle_tick(self.start + at);
            at += Duration::from_millis(100);
        }
    }

    fn start_an_order(&mut self) {
        self.app.handle_keypad(KeypadKey::Down, secs_at(self.start, 1));
        self.app.handle_keypad(KeypadKey::Select, secs_at(self.start, 2));
        assert_eq!(self.app.route.screen(), Screen::Menu);
        self.app.handle_keypad(KeypadKey::Select, secs_at(self.start, 3));
        self.app.handle_keypad(KeypadKey::Select, secs_at(self.start, 4));
        self.app.handle_keypad(KeypadKey::Back, secs_at(self.start, 5));
        assert_eq!(self.app.order.total_items(), 1);
    }

    fn spoken_count(&self, needle: &str) -> usize {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.starts_with(needle))
            .count()
    }
}

fn secs_at(start: Instant, s: u64) -> Instant {
    start + secs(s)
}

// Defaults: 120s timeout, warning at 30s remaining, 20s pinned window.

#[test]
fn test_warning_interstitial_appears_once_then_session_resets() {
    let mut f = fixture();
    f.start_an_order();

    // Last activity at 5s; the warning band starts at 95s.
    f.run_ticks(secs(6), secs(96));
    assert!(f.app.route.modal_open());
    assert_eq!(f.app.route.modal().unwrap().kind, ModalKind::IdleWarning);
    assert_eq!(f.spoken_count("Are you still there?"), 1);

    // Pinned 20s window runs out with no response.
    f.run_ticks(secs(96), secs(116));
    assert_eq!(f.app.route.screen(), Screen::Start);
    assert!(!f.app.route.modal_open());
    assert!(f.app.order.is_empty());
    assert_eq!(f.spoken_count("Welcome"), 2); // boot + reset
}

#[test]
fn test_keypad_noise_does_not_extend_pinned_window() {
    let mut f = fixture();
    f.start_an_order();
    f.run_ticks(secs(6), secs(96));
    assert!(f.app.idle.is_pinned());

    // Arrow mashing while the interstitial is up moves focus but must not
    // push the deadline back.
    for i in 0..5 {
        f.app
            .handle_keypad(KeypadKey::Right, f.start + secs(97) + secs(i));
    }
    f.run_ticks(secs(103), secs(117));
    assert_eq!(f.app.route.screen(), Screen::Start);
    assert!(f.app.order.is_empty());
}

#[test]
fn test_more_time_restarts_full_cycle() {
    let mut f = fixture();
    f.start_an_order();
    f.run_ticks(secs(6), secs(96));

    // Interstitial anchors on "I need more time".
    f.app.handle_keypad(KeypadKey::Select, secs_at(f.start, 100));
    assert!(!f.app.route.modal_open());
    assert_eq!(f.app.route.screen(), Screen::Menu);
    assert_eq!(f.app.order.total_items(), 1);
    assert_eq!(f.app.remaining_idle(secs_at(f.start, 100)), secs(120));

    // The next cycle warns again, from the new anchor.
    f.run_ticks(secs(101), secs(191));
    assert!(f.app.route.modal_open());
    assert_eq!(f.spoken_count("Are you still there?"), 2);
}

#[test]
fn test_start_over_now_resets_immediately() {
    let mut f = fixture();
    f.start_an_order();
    f.run_ticks(secs(6), secs(96));

    // Second interstitial option is the immediate reset.
    f.app.handle_keypad(KeypadKey::Right, secs_at(f.start, 97));
    f.app.handle_keypad(KeypadKey::Select, secs_at(f.start, 98));
    assert_eq!(f.app.route.screen(), Screen::Start);
    assert!(f.app.order.is_empty());
    assert_eq!(f.app.remaining_idle(secs_at(f.start, 98)), secs(120));
}

#[test]
fn test_reset_restores_accessibility_defaults() {
    let mut f = fixture();
    // Toggle everything away from defaults on the start screen.
    f.app.handle_keypad(KeypadKey::Select, secs_at(f.start, 1)); // contrast on
    f.app.handle_keypad(KeypadKey::Right, secs_at(f.start, 2)); // volume
    f.app.handle_keypad(KeypadKey::Select, secs_at(f.start, 3)); // -> full
    assert!(f.app.settings.high_contrast);
    assert_eq!(f.app.settings.volume.label(), "full");

    f.start_an_order();
    f.run_ticks(secs(6), secs(96));
    f.run_ticks(secs(96), secs(117));

    assert!(!f.app.settings.high_contrast);
    assert_eq!(f.app.settings.volume.label(), "medium");
}

#[test]
fn test_expiry_during_double_tick_resets_once() {
    let mut f = fixture();
    f.start_an_order();
    f.run_ticks(secs(6), secs(96));
    let expire_at = secs_at(f.start, 117);
    // The same deadline observed twice must not run the reset twice.
    f.app.handle_tick(expire_at);
    f.app.handle_tick(expire_at);
    assert_eq!(f.app.route.screen(), Screen::Start);
    assert_eq!(f.spoken_count("Welcome"), 2);
}

#[test]
fn test_attract_screen_never_shows_warning() {
    let mut f = fixture();
    // No interaction at all: the kiosk idles on the start screen.
    f.run_ticks(secs(1), secs(400));
    assert!(!f.app.route.modal_open());
    assert_eq!(f.app.route.screen(), Screen::Start);
    assert_eq!(f.spoken_count("Are you still there?"), 0);
    // Only the boot announcement was ever spoken.
    assert_eq!(f.spoken_count("Welcome"), 1);
}
