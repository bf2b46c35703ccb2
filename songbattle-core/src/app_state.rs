use crate::{
    sc::{AccessToken, Playlist},
    tournament::{Side, Tournament},
};

#[derive(Default)]
pub struct AppState {
    pub view: View,
    /// The current session. `None` means the user has to log in.
    pub token: Option<AccessToken>,
    pub playlists: PlaylistsState,
    pub tournament: Tournament,

    /// Which side's preview is audible, if any.
    pub previewing: Option<Side>,
    /// Bumped whenever a preview is requested or stopped, so late downloads
    /// can tell they are no longer wanted.
    pub preview_generation: u64,

    pub error: Option<AppStateError>,
}
impl AppState {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Whether mouse-wheel scrolling should move the playlist list. The
    /// battle screens are fixed, whatever state the tournament is in.
    pub fn allows_playlist_scroll(&self) -> bool {
        self.view == View::Playlists
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Landing,
    Playlists,
    Battle {
        playlist_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlaylistsState {
    #[default]
    NotLoaded,
    Loading,
    Loaded {
        playlists: Vec<Playlist>,
        /// How many playlists the user has in total; only the first page is shown.
        total: u32,
    },
}
impl PlaylistsState {
    pub fn playlists(&self) -> &[Playlist] {
        match self {
            PlaylistsState::Loaded { playlists, .. } => playlists,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppStateError {
    LoginFailed,
    SessionExpired,
    PlaylistsFetchFailed { error: String },
    TournamentFetchFailed { error: String },
    PreviewFailed { error: String },
}
impl AppStateError {
    /// Should be paired with [`Self::display_message`]
    pub fn display_name(&self) -> &'static str {
        match self {
            AppStateError::LoginFailed => "Login failed",
            AppStateError::SessionExpired => "Session expired",
            AppStateError::PlaylistsFetchFailed { .. } => "Failed to fetch playlists",
            AppStateError::TournamentFetchFailed { .. } => "Failed to load songs",
            AppStateError::PreviewFailed { .. } => "Failed to play preview",
        }
    }

    /// Should be paired with [`Self::display_name`]
    pub fn display_message(&self) -> String {
        match self {
            AppStateError::LoginFailed => {
                "No access token found. Paste the full URL you were redirected to.".to_string()
            }
            AppStateError::SessionExpired => "Please log in again.".to_string(),
            AppStateError::PlaylistsFetchFailed { error } => {
                format!("{error}. Please log in again.")
            }
            AppStateError::TournamentFetchFailed { error } => error.clone(),
            AppStateError::PreviewFailed { error } => error.clone(),
        }
    }
}
