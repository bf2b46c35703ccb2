mod app;
mod config;
mod cover_art;
mod keys;
mod log_buffer;
mod style;
mod ui;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use app::App;
use config::Config;
use cover_art::CoverArtCache;
use keys::Action;
use log_buffer::{LogBuffer, LogBufferLayer};
use songbattle_core::{self as sbc, View, auth::FileTokenStore};

use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

fn main() -> anyhow::Result<()> {
    // The config decides where logs go, so it is read before logging starts.
    let config_existed = Config::exists();
    let config = Config::load()?;

    // Create log buffer for TUI display instead of stdout.
    let log_buffer = LogBuffer::new(config.general.log_capacity);

    let log_file = std::fs::File::create(&config.general.log_file)?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(LogBufferLayer::new(log_buffer.clone()))
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("songbattle=info")),
        )
        .init();

    if !config_existed {
        tracing::info!("no {} found, writing defaults", Config::FILENAME);
        config.save()?;
    }

    let (cover_art_loaded_tx, cover_art_loaded_rx) = std::sync::mpsc::channel::<sbc::CoverArt>();

    let logic = sbc::Logic::new(sbc::LogicArgs {
        client_id: config.spotify.client_id.clone(),
        redirect_uri: config.spotify.redirect_uri.clone(),
        scopes: config.spotify.scopes.clone(),
        api_base_url: config.spotify.api_base_url.clone(),
        relay_url: config.spotify.relay_url.clone(),
        token_store: Arc::new(FileTokenStore::new(&config.general.token_file)),
        sample_options: config.tournament.sample_options(),
        autoplay_previews: config.tournament.autoplay_previews,
        cover_art_loaded_tx,
    })?;
    if !logic.get_state().read().unwrap().is_logged_in() {
        tracing::info!("log in at {}", logic.login_url());
    }

    let cover_art_cache = CoverArtCache::new(cover_art_loaded_rx);
    let mut app = App::new(config, logic, cover_art_cache, log_buffer);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(app.config.general.tick_rate_ms);
    let result = run_app(&mut terminal, &mut app, tick_rate);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> anyhow::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        if app.needs_redraw {
            terminal.draw(|frame| ui::draw(frame, app))?;
            app.needs_redraw = false;
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            let mut scroll_delta: i32 = 0;

            // Process the first event, then drain all remaining queued events.
            let mut process_event = |evt: Event, app: &mut App| match evt {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    handle_key_event(app, &key);
                    app.needs_redraw = true;
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        scroll_delta -= 1;
                        app.needs_redraw = true;
                    }
                    MouseEventKind::ScrollDown => {
                        scroll_delta += 1;
                        app.needs_redraw = true;
                    }
                    _ => {}
                },
                Event::Paste(text) => {
                    if !app.show_logs && !app.quit_confirming && app.view() == View::Landing {
                        ui::landing::handle_paste(app, &text);
                        app.needs_redraw = true;
                    }
                }
                Event::Resize(_, _) => {
                    app.needs_redraw = true;
                }
                _ => {}
            };

            process_event(event::read()?, app);
            while event::poll(Duration::ZERO)? {
                process_event(event::read()?, app);
            }

            // Apply coalesced scroll as a single operation.
            if scroll_delta != 0 {
                apply_scroll(app, scroll_delta);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_event(app: &mut App, key: &event::KeyEvent) {
    // Handle quit confirmation dialog
    if app.quit_confirming {
        match keys::quit_confirm_action(key) {
            Action::Select => app.should_quit = true,
            _ => app.quit_confirming = false,
        }
        return;
    }

    // Any key dismisses the error bar; the key still does its usual job.
    if app.logic.get_state().read().unwrap().error.is_some() {
        app.logic.clear_error();
    }

    if app.show_logs {
        if let Some(action) = keys::logs_action(key)
            && let Some(la) = ui::logs::handle_key(&mut app.logs, action)
        {
            match la {
                ui::logs::LogsAction::Close => app.toggle_logs(),
            }
        }
        return;
    }

    match app.view() {
        View::Landing => {
            if let Some(action) = keys::landing_action(key)
                && let Some(la) = ui::landing::handle_key(app, action)
            {
                match la {
                    ui::landing::LandingAction::Quit => app.quit_confirming = true,
                    ui::landing::LandingAction::ToggleLogs => app.toggle_logs(),
                }
            }
        }
        View::Playlists => {
            if let Some(action) = keys::playlists_action(key)
                && !handle_global_action(app, action)
            {
                ui::playlists::handle_key(app, action);
            }
        }
        View::Battle { .. } => {
            if let Some(action) = keys::battle_action(key)
                && !handle_global_action(app, action)
                && let Some(ba) = ui::battle::handle_key(app, action)
            {
                match ba {
                    ui::battle::BattleAction::Back => app.logic.back_to_playlists(),
                }
            }
        }
    }
}

/// Actions available outside the landing view. Returns whether `action` was one.
fn handle_global_action(app: &mut App, action: Action) -> bool {
    match action {
        Action::Quit => app.quit_confirming = true,
        Action::SignOut => app.sign_out(),
        Action::Home => app.logic.back_to_playlists(),
        Action::Logs => app.toggle_logs(),
        _ => return false,
    }
    true
}

/// Applies a coalesced scroll delta to whatever is scrollable on screen.
fn apply_scroll(app: &mut App, scroll_delta: i32) {
    let steps = scroll_delta.unsigned_abs() as usize * ui::layout::SCROLL_WHEEL_STEPS;
    let direction = scroll_delta.signum();

    if app.show_logs {
        app.logs.scroll_by(direction * steps as i32);
    } else if app.logic.get_state().read().unwrap().allows_playlist_scroll() {
        ui::playlists::handle_scroll(app, direction, steps);
    }
}
