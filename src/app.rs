use std::time::{Duration, Instant};

use crate::a11y::AccessibilitySettings;
use crate::audio::engine::{AudioEvent, AudioFeedbackEngine};
use crate::audio::request::SpeakOptions;
use crate::config::Config;
use crate::focus::graph::{Direction, FocusGraph, FocusOutcome};
use crate::focus::tree::{ElementTree, Scope};
use crate::idle::{IdleController, IdleTransition, ResetActions, run_reset_sequence};
use crate::order::OrderState;
use crate::route::{ModalKind, RouteController, Screen};
use crate::screens::{self, Action, HELP_SCRIPT};

/// Logical keypad keys. The terminal front end maps physical input onto
/// these; everything below this point is hardware-agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeypadKey {
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    Home,
    Help,
    Repeat,
}

/// How long the simulated payment terminal takes to confirm.
const PAYMENT_SETTLE: Duration = Duration::from_secs(3);

pub struct App {
    pub config: Config,
    pub route: RouteController,
    pub focus: FocusGraph,
    pub tree: ElementTree,
    pub audio: AudioFeedbackEngine,
    pub idle: IdleController,
    pub order: OrderState,
    pub settings: AccessibilitySettings,
    /// Target of the open item-options modal, if any.
    modal_item: Option<&'static str>,
    payment_committed: bool,
    payment_deadline: Option<Instant>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, audio: AudioFeedbackEngine, now: Instant) -> Self {
        let idle = IdleController::new(
            config.idle_timeout(),
            config.warning_threshold(),
            config.activity_debounce(),
            now,
        );
        let settings = AccessibilitySettings::new(config.default_volume());
        let mut app = Self {
            config,
            route: RouteController::new(),
            focus: FocusGraph::new(),
            tree: ElementTree::default(),
            audio,
            idle,
            order: OrderState::demo_catalog(),
            settings,
            modal_item: None,
            payment_committed: false,
            payment_deadline: None,
            should_quit: false,
        };
        app.focus.register_sections(screens::all_sections());
        app.rebuild();
        let outcome = app.focus.anchor(&app.tree, Scope::Main);
        app.announce(Screen::Start.title(), &outcome);
        app
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn remaining_idle(&self, now: Instant) -> Duration {
        self.idle.remaining(now)
    }

    pub fn payment_in_progress(&self) -> bool {
        self.payment_committed
    }

    fn rebuild(&mut self) {
        self.tree = screens::build_tree(
            &self.route,
            &self.order,
            &self.settings,
            self.modal_item,
            self.payment_committed,
        );
    }

    fn active_scope(&self) -> Scope {
        if self.route.modal_open() {
            Scope::Modal
        } else {
            Scope::Main
        }
    }

    fn speak(&mut self, text: &str) {
        let opts =
            SpeakOptions::replayable(self.settings.volume).at_speed(self.config.speech_rate);
        self.audio.speak(text, opts);
    }

    fn speak_transient(&mut self, text: &str) {
        let opts =
            SpeakOptions::transient(self.settings.volume).at_speed(self.config.speech_rate);
        self.audio.speak(text, opts);
    }

    /// One composed utterance per transition: the container title, then the
    /// anchored element if there is one.
    fn announce(&mut self, title: &str, outcome: &FocusOutcome) {
        let text = match outcome {
            FocusOutcome::Moved { spoken, .. } => format!("{title}. {spoken}"),
            _ => title.to_string(),
        };
        self.speak(&text);
    }

    pub fn handle_keypad(&mut self, key: KeypadKey, now: Instant) {
        self.idle.record_activity(now);
        match key {
            KeypadKey::Up => self.directional(Direction::Up),
            KeypadKey::Down => self.directional(Direction::Down),
            KeypadKey::Left => self.directional(Direction::Left),
            KeypadKey::Right => self.directional(Direction::Right),
            KeypadKey::Select => self.select(now),
            KeypadKey::Back => self.back(now),
            KeypadKey::Home => self.home(now),
            KeypadKey::Help => self.speak(HELP_SCRIPT),
            KeypadKey::Repeat => self
                .audio
                .replay(self.settings.volume, self.config.speech_rate),
        }
    }

    fn directional(&mut self, direction: Direction) {
        let outcome =
            self.focus
                .on_directional_key(&self.tree, direction, self.route.modal_open());
        match outcome {
            FocusOutcome::Moved { spoken, .. } => self.speak(&spoken),
            FocusOutcome::NoOtherSection => self.speak_transient("No other section"),
            FocusOutcome::Unchanged => {}
        }
    }

    fn select(&mut self, now: Instant) {
        let Some(element) = self.focus.focused().and_then(|id| self.tree.get(id)) else {
            return;
        };
        if !element.interactive || !element.enabled || element.scope != self.active_scope() {
            return;
        }
        self.run_action(element.action, now);
    }

    /// Home and Back are unavailable from the moment payment is committed
    /// until the terminal answers.
    fn exit_blocked(&self) -> bool {
        self.payment_committed
            || self
                .route
                .modal()
                .is_some_and(|modal| modal.kind.blocks_home())
    }

    fn back(&mut self, now: Instant) {
        if self.exit_blocked() {
            self.speak_transient("Please wait, your payment is processing");
            return;
        }
        if self.route.modal_open() {
            self.dismiss_modal(now, None);
            return;
        }
        if let Some(target) = self.route.screen().back_target() {
            self.navigate(target);
        }
    }

    fn home(&mut self, now: Instant) {
        if self.exit_blocked() {
            self.speak_transient("Please wait, your payment is processing");
            return;
        }
        self.reset_session(now);
    }

    fn run_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::None => {}
            Action::Navigate(screen) => self.navigate(screen),
            Action::OpenItemOptions(id) => {
                self.modal_item = Some(id);
                self.open_modal(ModalKind::ItemOptions, now);
            }
            Action::AddItem(id) => {
                if let Some(qty) = self.order.add_one(id) {
                    self.quantity_changed(id, qty);
                }
            }
            Action::RemoveItem(id) => {
                if let Some(qty) = self.order.remove_one(id) {
                    self.quantity_changed(id, qty);
                }
            }
            Action::ConfirmOrder => self.open_modal(ModalKind::OrderConfirm, now),
            Action::PlaceOrder => self.navigate(Screen::Payment),
            Action::CommitPayment => {
                self.payment_committed = true;
                self.payment_deadline = Some(now + PAYMENT_SETTLE);
                self.open_modal(ModalKind::PaymentProcessing, now);
            }
            Action::ConfirmItem => {
                let summary = self.modal_item.and_then(|id| self.order.line(id)).map(
                    |line| format!("{}, {} in your order", line.name, line.qty),
                );
                self.dismiss_modal(now, summary.as_deref());
            }
            Action::CloseModal => self.dismiss_modal(now, None),
            Action::ToggleContrast => {
                self.settings.high_contrast = !self.settings.high_contrast;
                self.setting_changed(&format!(
                    "High contrast {}",
                    if self.settings.high_contrast { "on" } else { "off" }
                ));
            }
            Action::CycleVolume => {
                self.settings.volume = self.settings.volume.cycled();
                // Spoken at the new level so the user hears the change.
                self.setting_changed(&format!("Volume {}", self.settings.volume.label()));
            }
            Action::ToggleLargeText => {
                self.settings.large_text = !self.settings.large_text;
                self.setting_changed(&format!(
                    "Large text {}",
                    if self.settings.large_text { "on" } else { "off" }
                ));
            }
            Action::ToggleLowScreen => {
                self.settings.low_screen = !self.settings.low_screen;
                self.setting_changed(&format!(
                    "Lower screen {}",
                    if self.settings.low_screen { "on" } else { "off" }
                ));
            }
            Action::StartOver => self.reset_session(now),
            Action::ExtendSession => {
                self.dismiss_modal(now, Some("Okay, take your time"));
            }
        }
    }

    /// A setting flipped in place: rebuild so labels reflect the new state,
    /// keep focus on the same element, and confirm aloud.
    fn setting_changed(&mut self, confirmation: &str) {
        self.rebuild();
        let scope = self.active_scope();
        self.focus.anchor_restore(&self.tree, scope, self.focus.focused());
        self.speak_transient(confirmation);
    }

    fn quantity_changed(&mut self, id: &'static str, qty: u32) {
        let name = self
            .order
            .line(id)
            .map(|l| l.name)
            .unwrap_or("item");
        let confirmation = format!("{name}, quantity {qty}");
        self.rebuild();
        let scope = self.active_scope();
        self.focus.anchor_restore(&self.tree, scope, self.focus.focused());
        self.speak_transient(&confirmation);
    }

    pub fn navigate(&mut self, screen: Screen) {
        if self.route.screen() == Screen::Payment && screen != Screen::Payment {
            self.payment_committed = false;
            self.payment_deadline = None;
        }
        self.route.navigate(screen);
        self.modal_item = None;
        self.rebuild();
        self.focus.clear();
        let outcome = self.focus.anchor(&self.tree, Scope::Main);
        self.announce(screen.title(), &outcome);
    }

    pub fn open_modal(&mut self, kind: ModalKind, now: Instant) {
        let restore = self.focus.focused();
        self.route.open_modal(kind, now, restore);
        self.rebuild();
        let outcome = self.focus.anchor(&self.tree, Scope::Modal);
        self.announce(kind.title(), &outcome);
    }

    /// Close the open modal and hand focus back to the element that opened
    /// it. `lead` is spoken ahead of the restored focus announcement.
    fn dismiss_modal(&mut self, now: Instant, lead: Option<&str>) {
        let Some(entry) = self.route.close_modal() else {
            return;
        };
        if entry.kind == ModalKind::IdleWarning {
            self.idle.unpin(now);
        }
        if entry.kind == ModalKind::ItemOptions {
            self.modal_item = None;
        }
        self.rebuild();
        let outcome = self
            .focus
            .anchor_restore(&self.tree, Scope::Main, entry.restore_focus);
        match (lead, &outcome) {
            (Some(lead), FocusOutcome::Moved { spoken, .. }) => {
                let text = format!("{lead}. {spoken}");
                self.speak(&text);
            }
            (Some(lead), _) => self.speak(lead),
            (None, FocusOutcome::Moved { spoken, .. }) => {
                let text = spoken.clone();
                self.speak(&text);
            }
            (None, _) => {}
        }
    }

    pub fn handle_tick(&mut self, now: Instant) {
        if let Some(deadline) = self.payment_deadline {
            if now >= deadline {
                self.payment_deadline = None;
                self.payment_committed = false;
                self.order.clear_quantities();
                self.navigate(Screen::Complete);
                return;
            }
        }
        match self.idle.tick(now) {
            IdleTransition::None => {}
            IdleTransition::EnterWarning => {
                if self.payment_committed
                    || (self.route.screen() == Screen::Start && !self.route.modal_open())
                {
                    // Nothing to lose on the attract screen, and a session
                    // mid-payment must never be interrupted; quietly rearm.
                    self.idle.restart(now);
                } else {
                    self.idle.pin_warning_window(now, self.config.warning_window());
                    self.open_modal(ModalKind::IdleWarning, now);
                }
            }
            IdleTransition::Expired => self.reset_session(now),
        }
    }

    pub fn handle_audio(&mut self, event: AudioEvent) {
        self.audio.handle_event(event);
    }

    /// Shared by the idle timeout and the explicit start-over paths. Safe to
    /// run twice in a row.
    pub fn reset_session(&mut self, now: Instant) {
        run_reset_sequence(self);
        self.idle.restart(now);
        self.rebuild();
        self.focus.clear();
        let outcome = self.focus.anchor(&self.tree, Scope::Main);
        self.announce("Welcome", &outcome);
    }
}

impl ResetActions for App {
    fn close_all_modals(&mut self) {
        self.route.close_modal();
        self.modal_item = None;
        self.payment_committed = false;
        self.payment_deadline = None;
    }

    fn clear_selection_state(&mut self) {
        self.order.clear_quantities();
    }

    fn restore_default_accessibility(&mut self) {
        self.settings.restore_defaults(self.config.default_volume());
    }

    fn navigate_to_start(&mut self) {
        self.route.navigate(Screen::Start);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::audio::engine::AudioSink;
    use crate::audio::remote::{LocalSynth, SynthError};
    use crate::audio::request::AudioPayload;
    use crate::event::AppEvent;

    struct NullSink;

    impl AudioSink for NullSink {
        fn play(&mut self, _payload: &AudioPayload, _gain: f32, _speed: f32, _generation: u64) {}
        fn stop(&mut self) {}
    }

    /// Synthesizes the text itself so tests can read back what was spoken.
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
        _rx: Receiver<AppEvent>,
        start: Instant,
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
            _rx: rx,
            start,
        }
    }

    impl Fixture {
        fn press(&mut self, key: KeypadKey, offset: Duration) {
            self.app.handle_keypad(key, self.start + offset);
        }

        fn last_spoken(&self) -> String {
            self.spoken.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_boot_announces_start_screen() {
        let f = fixture();
        assert_eq!(f.app.route.screen(), Screen::Start);
        assert!(f.last_spoken().starts_with("Welcome. "));
    }

    #[test]
    fn test_directional_moves_speak() {
        let mut f = fixture();
        f.press(KeypadKey::Right, secs(1));
        assert_eq!(f.last_spoken(), "Volume, medium");
        f.press(KeypadKey::Down, secs(2));
        assert_eq!(f.last_spoken(), "Actions. Start order");
    }

    #[test]
    fn test_select_toggles_setting_and_keeps_focus() {
        let mut f = fixture();
        // Boot anchors on "High contrast".
        f.press(KeypadKey::Select, secs(1));
        assert!(f.app.settings.high_contrast);
        assert_eq!(f.last_spoken(), "High contrast on");

        let focused = f.app.focus.focused().unwrap();
        let element = f.app.tree.get(focused).unwrap();
        assert_eq!(element.label, "High contrast");
        assert_eq!(element.spoken_label(), "High contrast, on");
    }

    #[test]
    fn test_volume_cycle_affects_subsequent_speech() {
        let mut f = fixture();
        f.press(KeypadKey::Right, secs(1)); // Volume
        f.press(KeypadKey::Select, secs(2));
        assert_eq!(f.app.settings.volume.label(), "full");
        assert_eq!(f.last_spoken(), "Volume full");
    }

    #[test]
    fn test_configured_speech_rate_reaches_requests() {
        let (tx, _rx) = mpsc::channel();
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let engine = AudioFeedbackEngine::new(
            None,
            None,
            Box::new(EchoLocal { spoken }),
            Box::new(NullSink),
            tx,
        );
        let mut config = Config::default();
        config.speech_rate = 0.75;
        let start = Instant::now();
        let mut app = App::new(config, engine, start);
        // The boot announcement and every subsequent one carry the rate.
        assert_eq!(app.audio.current().unwrap().speed, 0.75);
        app.handle_keypad(KeypadKey::Right, start + secs(1));
        assert_eq!(app.audio.current().unwrap().speed, 0.75);
    }

    fn walk_to_menu(f: &mut Fixture) {
        f.press(KeypadKey::Down, secs(1)); // Actions. Start order
        f.press(KeypadKey::Select, secs(2)); // Menu
        assert_eq!(f.app.route.screen(), Screen::Menu);
    }

    #[test]
    fn test_navigation_announces_screen_and_anchor() {
        let mut f = fixture();
        walk_to_menu(&mut f);
        assert_eq!(f.last_spoken(), "Menu. Menu items. Americano");
    }

    #[test]
    fn test_item_modal_opens_and_restores_focus_on_cancel() {
        let mut f = fixture();
        walk_to_menu(&mut f);
        // Navigation anchored focus on the first menu item.
        let before = f.app.focus.focused();
        f.press(KeypadKey::Select, secs(4));
        assert!(f.app.route.modal_open());
        assert_eq!(f.last_spoken(), "Item options. Quantity. Add one Americano");

        f.press(KeypadKey::Back, secs(5));
        assert!(!f.app.route.modal_open());
        assert_eq!(f.app.focus.focused(), before);
        assert_eq!(f.last_spoken(), "Menu items. Americano");
    }

    #[test]
    fn test_add_item_updates_quantity_and_speaks() {
        let mut f = fixture();
        walk_to_menu(&mut f);
        f.press(KeypadKey::Select, secs(4)); // open item options, anchored on Add one
        f.press(KeypadKey::Select, secs(5)); // Add one
        assert_eq!(f.app.order.line("americano").unwrap().qty, 1);
        assert_eq!(f.last_spoken(), "Americano, quantity 1");
        // Focus stayed inside the modal.
        let el = f.app.tree.get(f.app.focus.focused().unwrap()).unwrap();
        assert_eq!(el.scope, Scope::Modal);
    }

    #[test]
    fn test_help_and_repeat() {
        let mut f = fixture();
        f.press(KeypadKey::Help, secs(1));
        assert_eq!(f.last_spoken(), HELP_SCRIPT);
        f.press(KeypadKey::Repeat, secs(2));
        assert_eq!(f.last_spoken(), HELP_SCRIPT);
    }

    #[test]
    fn test_repeat_skips_transient_notices() {
        let mut f = fixture();
        f.press(KeypadKey::Right, secs(1)); // "Volume, medium" (replayable)
        f.press(KeypadKey::Select, secs(2)); // "Volume full" (transient)
        f.press(KeypadKey::Repeat, secs(3));
        assert_eq!(f.last_spoken(), "Volume, medium");
    }

    #[test]
    fn test_home_resets_session() {
        let mut f = fixture();
        walk_to_menu(&mut f);
        f.press(KeypadKey::Right, secs(3));
        f.press(KeypadKey::Select, secs(4));
        f.press(KeypadKey::Select, secs(5)); // Americano qty 1
        f.app.settings.large_text = true;

        f.press(KeypadKey::Home, secs(6));
        assert_eq!(f.app.route.screen(), Screen::Start);
        assert!(!f.app.route.modal_open());
        assert!(f.app.order.is_empty());
        assert!(!f.app.settings.large_text);
        assert!(f.last_spoken().starts_with("Welcome. "));
    }

    fn walk_to_payment(f: &mut Fixture) {
        walk_to_menu(f);
        f.press(KeypadKey::Select, secs(4)); // Americano options
        f.press(KeypadKey::Select, secs(5)); // Add one
        f.press(KeypadKey::Back, secs(6)); // close modal
        f.press(KeypadKey::Down, secs(7)); // Actions. Review order
        f.press(KeypadKey::Select, secs(8)); // OrderSummary
        f.press(KeypadKey::Down, secs(9)); // Actions. Proceed to payment
        f.press(KeypadKey::Select, secs(10)); // OrderConfirm modal
        f.press(KeypadKey::Select, secs(11)); // Place order
        assert_eq!(f.app.route.screen(), Screen::Payment);
    }

    #[test]
    fn test_payment_processing_blocks_home_and_back() {
        let mut f = fixture();
        walk_to_payment(&mut f);
        f.press(KeypadKey::Select, secs(12)); // Pay now
        assert!(f.app.payment_in_progress());
        assert!(f.app.route.modal_open());

        f.press(KeypadKey::Home, secs(13));
        assert!(f.app.route.modal_open());
        assert_eq!(f.app.route.screen(), Screen::Payment);
        f.press(KeypadKey::Back, secs(13));
        assert!(f.app.route.modal_open());
        assert_eq!(f.last_spoken(), "Please wait, your payment is processing");
    }

    #[test]
    fn test_payment_settles_into_complete() {
        let mut f = fixture();
        walk_to_payment(&mut f);
        f.press(KeypadKey::Select, secs(12)); // Pay now
        f.app.handle_tick(f.start + secs(13));
        assert_eq!(f.app.route.screen(), Screen::Payment);
        f.app.handle_tick(f.start + secs(16));
        assert_eq!(f.app.route.screen(), Screen::Complete);
        assert!(!f.app.route.modal_open());
        assert!(f.app.order.is_empty());
        assert!(f.last_spoken().starts_with("Order complete. "));
    }

    #[test]
    fn test_idle_warning_opens_modal_and_pins_window() {
        let mut f = fixture();
        walk_to_menu(&mut f);
        // Last activity at 2s; warning band begins 90s later.
        let warn_at = f.start + secs(93);
        f.app.handle_tick(warn_at);
        assert!(f.app.route.modal_open());
        assert_eq!(f.app.route.modal().unwrap().kind, ModalKind::IdleWarning);
        assert!(f.app.idle.is_pinned());
        assert_eq!(f.app.remaining_idle(warn_at), secs(20));
        assert!(f.last_spoken().starts_with("Are you still there?"));
    }

    #[test]
    fn test_extend_session_restores_full_duration() {
        let mut f = fixture();
        walk_to_menu(&mut f);
        let warn_at = f.start + secs(93);
        f.app.handle_tick(warn_at);
        // Anchored on "I need more time".
        f.app.handle_keypad(KeypadKey::Select, warn_at + secs(5));
        assert!(!f.app.route.modal_open());
        assert_eq!(f.app.route.screen(), Screen::Menu);
        assert_eq!(f.app.remaining_idle(warn_at + secs(5)), secs(120));
        assert!(f.last_spoken().starts_with("Okay, take your time"));
    }

    #[test]
    fn test_warning_window_expiry_resets() {
        let mut f = fixture();
        walk_to_menu(&mut f);
        f.app.order.add_one("latte");
        let warn_at = f.start + secs(93);
        f.app.handle_tick(warn_at);
        f.app.handle_tick(warn_at + secs(20));
        assert_eq!(f.app.route.screen(), Screen::Start);
        assert!(!f.app.route.modal_open());
        assert!(f.app.order.is_empty());
    }

    #[test]
    fn test_warning_on_start_screen_just_rearms() {
        let mut f = fixture();
        let warn_at = f.start + secs(91);
        f.app.handle_tick(warn_at);
        assert!(!f.app.route.modal_open());
        assert_eq!(f.app.remaining_idle(warn_at), secs(120));
    }

    #[test]
    fn test_reset_is_reentrant() {
        let mut f = fixture();
        walk_to_menu(&mut f);
        f.app.reset_session(f.start + secs(10));
        f.app.reset_session(f.start + secs(10));
        assert_eq!(f.app.route.screen(), Screen::Start);
        assert!(f.app.order.is_empty());
    }
}
