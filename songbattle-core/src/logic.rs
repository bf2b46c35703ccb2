use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, mpsc};

use crate::{
    app_state::{AppState, AppStateError, PlaylistsState, View},
    auth::{self, TokenStore},
    preview::{PreviewHandle, PreviewMessage},
    sampling::{self, SampleOptions, ThreadRandom},
    sc,
    tokio_thread::TokioThread,
    tournament::{Advance, LoadTicket, Side},
};

/// Downloaded cover image bytes, keyed by the URL they came from.
#[derive(Debug, Clone)]
pub struct CoverArt {
    pub url: String,
    pub data: Arc<[u8]>,
}

pub struct Logic {
    tokio: TokioThread,
    state: Arc<RwLock<AppState>>,
    client: Arc<sc::Client>,
    token_store: Arc<dyn TokenStore>,
    previews: PreviewHandle,
    cover_art_loaded_tx: mpsc::Sender<CoverArt>,

    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    sample_options: SampleOptions,
    autoplay_previews: bool,
}

pub struct LogicArgs {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub api_base_url: String,
    pub relay_url: Option<String>,
    pub token_store: Arc<dyn TokenStore>,
    pub sample_options: SampleOptions,
    pub autoplay_previews: bool,
    pub cover_art_loaded_tx: mpsc::Sender<CoverArt>,
}

impl Logic {
    pub fn new(args: LogicArgs) -> std::io::Result<Self> {
        let mut client = sc::Client::new(args.api_base_url);
        if let Some(relay_url) = args.relay_url {
            client = client.with_relay(relay_url);
        }

        let state = Arc::new(RwLock::new(AppState::default()));
        let logic = Logic {
            tokio: TokioThread::new()?,
            previews: PreviewHandle::spawn(state.clone()),
            state,
            client: Arc::new(client),
            token_store: args.token_store,
            cover_art_loaded_tx: args.cover_art_loaded_tx,

            client_id: args.client_id,
            redirect_uri: args.redirect_uri,
            scopes: args.scopes,
            sample_options: args.sample_options,
            autoplay_previews: args.autoplay_previews,
        };

        if let Some(token) = auth::extract_token("", logic.token_store.as_ref()) {
            tracing::info!("resuming stored session");
            logic.begin_session(token);
        }
        Ok(logic)
    }

    pub fn login_url(&self) -> String {
        auth::build_login_url(&self.client_id, &self.redirect_uri, self.scopes.as_slice())
    }

    /// Accept the URL (or bare fragment) the login page redirected to.
    /// Returns whether a session was started.
    pub fn submit_redirect(&self, input: &str) -> bool {
        match auth::extract_token(auth::fragment_of(input), self.token_store.as_ref()) {
            Some(token) => {
                self.begin_session(token);
                true
            }
            None => {
                tracing::warn!("no access token in submitted redirect");
                self.write_state().error = Some(AppStateError::LoginFailed);
                false
            }
        }
    }

    pub fn sign_out(&self) {
        auth::sign_out(self.token_store.as_ref());
        let mut state = self.write_state();
        self.stop_preview_locked(&mut state);
        state.token = None;
        state.view = View::Landing;
        state.playlists = PlaylistsState::NotLoaded;
        state.tournament.reset();
    }

    pub fn fetch_playlists(&self) {
        let token = {
            let mut state = self.write_state();
            let Some(token) = state.token.clone() else {
                drop(state);
                self.require_login();
                return;
            };
            state.playlists = PlaylistsState::Loading;
            token
        };

        let client = self.client.clone();
        let state = self.state.clone();
        let token_store = self.token_store.clone();
        self.tokio.spawn(async move {
            tracing::info!("fetching playlists");
            let result = client.get_user_playlists(&token).await;

            let mut state = state.write().unwrap();
            if state.token.as_ref() != Some(&token) {
                tracing::debug!("discarding playlists for a session that has ended");
                return;
            }
            match result {
                Ok(page) => {
                    tracing::info!(
                        "fetched {} of {} playlists",
                        page.items.len(),
                        page.total
                    );
                    state.playlists = PlaylistsState::Loaded {
                        playlists: page.items,
                        total: page.total,
                    };
                }
                Err(e) => {
                    tracing::error!("failed to fetch playlists: {e}");
                    end_session(
                        &mut state,
                        token_store.as_ref(),
                        AppStateError::PlaylistsFetchFailed {
                            error: e.to_string(),
                        },
                    );
                }
            }
        });
    }

    pub fn start_tournament(&self, playlist_id: &str) {
        let mut state = self.write_state();
        let Some(token) = state.token.clone() else {
            drop(state);
            self.require_login();
            return;
        };
        self.stop_preview_locked(&mut state);
        state.view = View::Battle {
            playlist_id: playlist_id.to_string(),
        };
        let ticket = state.tournament.begin_loading(playlist_id);
        drop(state);

        self.spawn_sample(ticket, token, playlist_id.to_string());
    }

    /// Pick the track on `side` as the winner of the current matchup.
    pub fn choose(&self, side: Side) {
        let mut state = self.write_state();
        self.stop_preview_locked(&mut state);
        let advance = state.tournament.choose(side);
        match advance {
            Some(Advance::NextMatchup) => {
                if self.autoplay_previews {
                    drop(state);
                    self.play_preview(Side::Left);
                }
            }
            Some(Advance::Winner(winner)) => {
                tracing::info!("winner: {} by {}", winner.name, winner.artist_names());
            }
            None => {}
        }
    }

    /// Re-sample the same playlist after a finished or stalled run.
    pub fn restart(&self) {
        let mut state = self.write_state();
        let Some(token) = state.token.clone() else {
            drop(state);
            self.require_login();
            return;
        };
        let Some((ticket, playlist_id)) = state.tournament.restart() else {
            return;
        };
        self.stop_preview_locked(&mut state);
        drop(state);

        self.spawn_sample(ticket, token, playlist_id);
    }

    pub fn back_to_playlists(&self) {
        let needs_fetch = {
            let mut state = self.write_state();
            if !state.is_logged_in() {
                drop(state);
                self.require_login();
                return;
            }
            self.stop_preview_locked(&mut state);
            state.tournament.reset();
            state.view = View::Playlists;
            state.playlists == PlaylistsState::NotLoaded
        };
        if needs_fetch {
            self.fetch_playlists();
        }
    }

    pub fn play_preview(&self, side: Side) {
        let mut state = self.write_state();
        let Some(url) = begin_preview(&mut state, side) else {
            return;
        };
        self.previews.send(PreviewMessage::Stop);
        let generation = state.preview_generation;
        drop(state);

        let client = self.client.clone();
        let state = self.state.clone();
        let previews = self.previews.clone();
        self.tokio.spawn(async move {
            play_downloaded(&client, &state, &previews, &url, side, generation).await;
        });
    }

    pub fn stop_preview(&self) {
        let mut state = self.write_state();
        self.stop_preview_locked(&mut state);
    }

    /// Fetch a cover image in the background. The result arrives on the
    /// `cover_art_loaded_tx` channel; failures are only logged.
    pub fn request_cover_art(&self, url: &str) {
        let client = self.client.clone();
        let tx = self.cover_art_loaded_tx.clone();
        let url = url.to_string();
        self.tokio.spawn(async move {
            match client.download(&url).await {
                Ok(data) => {
                    tracing::debug!("loaded cover art {url} ({} bytes)", data.len());
                    let _ = tx.send(CoverArt {
                        url,
                        data: data.into(),
                    });
                }
                Err(e) => tracing::warn!("failed to load cover art {url}: {e}"),
            }
        });
    }

    pub fn get_state(&self) -> Arc<RwLock<AppState>> {
        self.state.clone()
    }

    pub fn clear_error(&self) {
        self.write_state().error = None;
    }

    fn begin_session(&self, token: sc::AccessToken) {
        {
            let mut state = self.write_state();
            state.token = Some(token);
            state.view = View::Playlists;
            state.error = None;
        }
        self.fetch_playlists();
    }

    /// An operation needed a session and there wasn't one.
    fn require_login(&self) {
        tracing::warn!("no access token; returning to login");
        let mut state = self.write_state();
        self.stop_preview_locked(&mut state);
        state.view = View::Landing;
        state.tournament.reset();
    }

    fn spawn_sample(&self, ticket: LoadTicket, token: sc::AccessToken, playlist_id: String) {
        let client = self.client.clone();
        let state = self.state.clone();
        let token_store = self.token_store.clone();
        let previews = self.previews.clone();
        let options = self.sample_options.clone();
        let autoplay = self.autoplay_previews;

        self.tokio.spawn(async move {
            let result =
                sampling::sample_pool(&*client, &token, &playlist_id, &options, &mut ThreadRandom)
                    .await;

            let autoplay_url = {
                let mut state = state.write().unwrap();
                match result {
                    Ok(pool) => {
                        let started = state.tournament.finish_loading(ticket, pool)
                            && state.tournament.matchup().is_some();
                        if started && autoplay {
                            begin_preview(&mut state, Side::Left)
                                .map(|url| (url, state.preview_generation))
                        } else {
                            None
                        }
                    }
                    Err(e) if e.is_unauthorized() => {
                        if state.tournament.fail_loading(ticket, e.to_string()) {
                            tracing::error!("catalog rejected the session: {e}");
                            end_session(
                                &mut state,
                                token_store.as_ref(),
                                AppStateError::SessionExpired,
                            );
                        }
                        None
                    }
                    Err(e) => {
                        if state.tournament.fail_loading(ticket, e.to_string()) {
                            tracing::error!("failed to sample playlist {playlist_id}: {e}");
                            state.error = Some(AppStateError::TournamentFetchFailed {
                                error: e.to_string(),
                            });
                        }
                        None
                    }
                }
            };

            if let Some((url, generation)) = autoplay_url {
                previews.send(PreviewMessage::Stop);
                play_downloaded(&client, &state, &previews, &url, Side::Left, generation).await;
            }
        });
    }

    fn stop_preview_locked(&self, state: &mut AppState) {
        state.preview_generation += 1;
        if state.previewing.take().is_some() {
            tracing::debug!("stopping preview");
        }
        self.previews.send(PreviewMessage::Stop);
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap()
    }

    #[allow(unused)]
    fn read_state(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap()
    }
}

/// Drop the session after the catalog turned it away.
fn end_session(state: &mut AppState, token_store: &dyn TokenStore, error: AppStateError) {
    auth::sign_out(token_store);
    state.token = None;
    state.view = View::Landing;
    state.playlists = PlaylistsState::NotLoaded;
    state.tournament.reset();
    state.preview_generation += 1;
    state.previewing = None;
    state.error = Some(error);
}

/// Claims the preview slot for `side`, returning the clip to fetch.
fn begin_preview(state: &mut AppState, side: Side) -> Option<String> {
    let track = state.tournament.matchup()?.get(side);
    let Some(url) = track.playable_preview().map(str::to_string) else {
        tracing::info!("{} has no preview", track.name);
        state.error = Some(AppStateError::PreviewFailed {
            error: format!("\"{}\" has no preview clip", track.name),
        });
        return None;
    };
    state.preview_generation += 1;
    state.previewing = None;
    Some(url)
}

async fn play_downloaded(
    client: &sc::Client,
    state: &RwLock<AppState>,
    previews: &PreviewHandle,
    url: &str,
    side: Side,
    generation: u64,
) {
    let result = client.download(url).await;

    let mut state = state.write().unwrap();
    if state.preview_generation != generation {
        tracing::debug!("discarding superseded {side:?} preview");
        return;
    }
    match result {
        Ok(data) => {
            state.previewing = Some(side);
            previews.send(PreviewMessage::Play {
                side,
                generation,
                data,
            });
        }
        Err(e) => {
            tracing::warn!("failed to download preview: {e}");
            state.error = Some(AppStateError::PreviewFailed {
                error: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::{auth::MemoryTokenStore, tournament::TournamentState};

    fn logic_with(store: Arc<MemoryTokenStore>) -> Logic {
        logic_with_art(store, mpsc::channel().0)
    }

    fn logic_with_art(
        store: Arc<MemoryTokenStore>,
        cover_art_loaded_tx: mpsc::Sender<CoverArt>,
    ) -> Logic {
        Logic::new(LogicArgs {
            client_id: "client".to_string(),
            redirect_uri: "http://localhost:3000".to_string(),
            scopes: vec!["user-read-private".to_string()],
            // Nothing listens here, so every request fails fast.
            api_base_url: "http://127.0.0.1:1".to_string(),
            relay_url: None,
            token_store: store,
            sample_options: SampleOptions::default(),
            autoplay_previews: false,
            cover_art_loaded_tx,
        })
        .unwrap()
    }

    fn wait_until(logic: &Logic, condition: impl Fn(&AppState) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !condition(&logic.read_state()) {
            assert!(Instant::now() < deadline, "timed out waiting for state");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn starts_on_landing_without_a_token() {
        let logic = logic_with(Arc::new(MemoryTokenStore::new()));
        let state = logic.read_state();
        assert_eq!(state.view, View::Landing);
        assert!(!state.is_logged_in());
        assert!(logic.login_url().contains("client_id=client"));
    }

    #[test]
    fn bad_redirects_are_reported() {
        let store = Arc::new(MemoryTokenStore::new());
        let logic = logic_with(store.clone());
        assert!(!logic.submit_redirect("http://localhost:3000/#error=access_denied"));
        assert_eq!(logic.read_state().error, Some(AppStateError::LoginFailed));
        assert_eq!(logic.read_state().view, View::Landing);

        logic.clear_error();
        assert!(logic.read_state().error.is_none());
    }

    #[test]
    fn failed_playlist_fetch_drops_the_session() {
        let store = Arc::new(MemoryTokenStore::new());
        let logic = logic_with(store.clone());
        assert!(logic.submit_redirect("http://localhost:3000/#access_token=ABC&token_type=Bearer"));
        assert_eq!(store.load().as_deref(), Some("ABC"));

        wait_until(&logic, |state| state.error.is_some());
        let state = logic.read_state();
        assert!(matches!(
            state.error,
            Some(AppStateError::PlaylistsFetchFailed { .. })
        ));
        assert_eq!(state.view, View::Landing);
        assert!(!state.is_logged_in());
        assert!(store.load().is_none());
    }

    #[test]
    fn tournaments_need_a_session() {
        let logic = logic_with(Arc::new(MemoryTokenStore::new()));
        logic.start_tournament("playlist");
        let state = logic.read_state();
        assert_eq!(state.view, View::Landing);
        assert_eq!(state.tournament.state(), &TournamentState::Idle);
    }

    #[test]
    fn failed_sampling_stalls_the_tournament() {
        let store = Arc::new(MemoryTokenStore::new());
        store.store("ABC").unwrap();
        let logic = logic_with(store);
        // Let the resumed session's playlist fetch fail and settle first.
        wait_until(&logic, |state| state.error.is_some());

        logic.write_state().token = sc::AccessToken::new("ABC");
        logic.clear_error();
        logic.start_tournament("playlist");
        assert_eq!(
            logic.read_state().view,
            View::Battle {
                playlist_id: "playlist".to_string()
            }
        );

        wait_until(&logic, |state| !state.tournament.is_loading());
        let state = logic.read_state();
        assert!(matches!(
            state.tournament.state(),
            TournamentState::Stalled { .. }
        ));
        assert!(matches!(
            state.error,
            Some(AppStateError::TournamentFetchFailed { .. })
        ));
    }

    #[test]
    fn failed_cover_art_is_not_an_error() {
        let (tx, rx) = mpsc::channel();
        let logic = logic_with_art(Arc::new(MemoryTokenStore::new()), tx);
        logic.request_cover_art("http://127.0.0.1:1/cover.jpg");

        assert!(rx.recv_timeout(Duration::from_secs(2)).is_err());
        assert!(logic.read_state().error.is_none());
    }

    #[test]
    fn sign_out_returns_to_landing() {
        let store = Arc::new(MemoryTokenStore::new());
        let logic = logic_with(store.clone());
        logic.write_state().token = sc::AccessToken::new("ABC");
        logic.write_state().view = View::Playlists;
        store.store("ABC").unwrap();

        logic.sign_out();
        let state = logic.read_state();
        assert_eq!(state.view, View::Landing);
        assert!(!state.is_logged_in());
        assert!(store.load().is_none());
    }
}
