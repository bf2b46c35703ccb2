use songbattle_core::{self as sbc, View};

use crate::{
    config::Config,
    cover_art::CoverArtCache,
    log_buffer::LogBuffer,
    ui::{landing::LandingState, logs::LogsState, playlists::PlaylistsViewState},
};

pub struct App {
    // Core infrastructure (shared across views)
    pub logic: sbc::Logic,
    pub config: Config,
    pub cover_art_cache: CoverArtCache,

    // Global UI orchestration
    pub show_logs: bool,
    pub quit_confirming: bool,
    pub should_quit: bool,
    pub needs_redraw: bool,
    pub tick_count: u64,

    // Per-view state (owned by their respective modules)
    pub landing: LandingState,
    pub playlists: PlaylistsViewState,
    pub logs: LogsState,
}

impl App {
    pub fn new(
        config: Config,
        logic: sbc::Logic,
        cover_art_cache: CoverArtCache,
        log_buffer: LogBuffer,
    ) -> Self {
        Self {
            logic,
            config,
            cover_art_cache,

            show_logs: false,
            quit_confirming: false,
            should_quit: false,
            needs_redraw: true,
            tick_count: 0,

            landing: LandingState::default(),
            playlists: PlaylistsViewState::default(),
            logs: LogsState::new(log_buffer),
        }
    }

    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        self.cover_art_cache.update();

        // Keep the selection inside the list as playlists arrive or refresh.
        let state = self.logic.get_state();
        let len = state.read().unwrap().playlists.playlists().len();
        self.playlists.clamp(len);

        // Background tasks update the state at any time; animations advance on ticks.
        self.needs_redraw = true;
    }

    /// The view currently shown, cloned out of the shared state.
    pub fn view(&self) -> View {
        self.logic.get_state().read().unwrap().view.clone()
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if self.show_logs {
            self.logs.scroll_to_end();
        }
    }

    pub fn sign_out(&mut self) {
        self.logic.sign_out();
        self.landing = LandingState::default();
        self.playlists = PlaylistsViewState::default();
    }
}
