pub mod auth;
pub mod sampling;
pub mod tournament;

mod app_state;
pub use app_state::{AppState, AppStateError, PlaylistsState, View};

mod logic;
pub use logic::{CoverArt, Logic, LogicArgs};

mod preview;
mod tokio_thread;

pub use songbattle_catalog as sc;
