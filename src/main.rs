mod a11y;
mod app;
mod audio;
mod config;
mod event;
mod focus;
mod idle;
mod order;
mod route;
mod screens;
mod ui;

use std::io;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::{App, KeypadKey};
use audio::cache::AudioCache;
use audio::engine::{AudioFeedbackEngine, SimulatedSink};
use audio::remote::{TonePrompt, http_synth};
use config::Config;
use event::{AppEvent, EventHandler};
use ui::screen_view::ScreenView;
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "kioska", version, about = "Self-service kiosk with keypad navigation and spoken feedback")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Speech synthesis endpoint URL")]
    endpoint: Option<String>,

    #[arg(long, help = "Idle timeout in seconds")]
    idle_timeout: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(endpoint) = cli.endpoint {
        config.synth_endpoint = endpoint;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(secs) = cli.idle_timeout {
        config.idle_timeout_ms = secs * 1_000;
    }
    config.validate();

    let base_theme = Theme::load(&config.theme).unwrap_or_default();
    let contrast_theme = Theme::high_contrast();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(config.tick_rate());

    let remote = if config.remote_synthesis_enabled {
        http_synth(&config.synth_endpoint)
    } else {
        None
    };
    let engine = AudioFeedbackEngine::new(
        AudioCache::new(),
        remote,
        Box::new(TonePrompt::new()),
        Box::new(SimulatedSink::new(events.sender())),
        events.sender(),
    );
    let mut app = App::new(config, engine, Instant::now());

    let result = run_app(&mut terminal, &mut app, &events, &base_theme, &contrast_theme);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    base_theme: &Theme,
    contrast_theme: &Theme,
) -> Result<()> {
    let sections = screens::all_sections();

    loop {
        let now = Instant::now();
        let theme = if app.settings.high_contrast {
            contrast_theme
        } else {
            base_theme
        };
        let title = match app.route.modal() {
            Some(modal) => modal.kind.title(),
            None => app.route.screen().title(),
        };
        let view = ScreenView {
            title,
            tree: &app.tree,
            sections: &sections,
            focused: app.focus.focused(),
            modal: app.route.modal().map(|m| m.kind),
            warning_remaining: app
                .route
                .modal()
                .filter(|m| m.kind == route::ModalKind::IdleWarning)
                .map(|_| app.remaining_idle(now)),
            volume_label: app.settings.volume.label(),
            muted_failures: app.audio.diagnostics().len(),
            large_text: app.settings.large_text,
            low_screen: app.settings.low_screen,
            theme,
        };
        terminal.draw(|frame| frame.render_widget(&view, frame.area()))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.handle_tick(Instant::now()),
            AppEvent::Audio(audio) => app.handle_audio(audio),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Map terminal input onto the fixed kiosk keypad. Anything outside the
/// keypad vocabulary is ignored, matching the physical device.
fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    let keypad = match key.code {
        KeyCode::Up => KeypadKey::Up,
        KeyCode::Down => KeypadKey::Down,
        KeyCode::Left => KeypadKey::Left,
        KeyCode::Right => KeypadKey::Right,
        KeyCode::Enter => KeypadKey::Select,
        KeyCode::Esc => KeypadKey::Back,
        KeyCode::Char('h') => KeypadKey::Home,
        KeyCode::Char('r') => KeypadKey::Repeat,
        KeyCode::Char('?') => KeypadKey::Help,
        KeyCode::Char('q') => {
            app.quit();
            return;
        }
        _ => return,
    };
    app.handle_keypad(keypad, Instant::now());
}
