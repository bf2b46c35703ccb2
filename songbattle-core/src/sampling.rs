//! Drawing a random tournament pool out of a playlist.

use futures::future::join_all;
use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{
    sc::{AccessToken, Client, ClientError, ClientResult, PlaylistItem, Track},
    tournament::POOL_SIZE,
};

/// Where random indices come from.
pub trait RandomSource: Send {
    /// A uniformly random integer in `0..bound`. `bound` is never zero.
    fn index_below(&mut self, bound: u32) -> u32;
}

/// The thread-local generator from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;
impl RandomSource for ThreadRandom {
    fn index_below(&mut self, bound: u32) -> u32 {
        rand::rng().random_range(0..bound)
    }
}

/// The parts of the catalog sampling needs.
pub trait Catalog: Sync {
    /// The playlist's declared track count.
    fn playlist_total(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> impl Future<Output = ClientResult<u32>> + Send;

    /// A full page of entries starting at `offset`.
    fn tracks_page(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        offset: u32,
    ) -> impl Future<Output = ClientResult<Vec<PlaylistItem>>> + Send;
}

impl Catalog for Client {
    fn playlist_total(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> impl Future<Output = ClientResult<u32>> + Send {
        async move { Ok(self.get_playlist(token, playlist_id).await?.total_tracks()) }
    }

    fn tracks_page(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        offset: u32,
    ) -> impl Future<Output = ClientResult<Vec<PlaylistItem>>> + Send {
        async move {
            Ok(self
                .get_playlist_tracks_page(token, playlist_id, offset, PAGE_SIZE)
                .await?
                .items)
        }
    }
}

/// The page size used when locating a sampled index.
pub const PAGE_SIZE: u32 = Client::TRACKS_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleOptions {
    /// How many picks to draw, at most [`POOL_SIZE`]. Rejected picks are not
    /// replaced.
    pub pool_size: usize,
    /// Reject tracks without a playable preview.
    pub require_preview: bool,
}
impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            pool_size: POOL_SIZE,
            require_preview: false,
        }
    }
}

impl SampleOptions {
    /// The number of picks actually drawn.
    pub fn draw_count(&self) -> usize {
        self.pool_size.min(POOL_SIZE)
    }
}

#[derive(Debug)]
pub enum SampleError {
    Catalog(ClientError),
}
impl SampleError {
    pub fn is_unauthorized(&self) -> bool {
        match self {
            SampleError::Catalog(e) => e.is_unauthorized(),
        }
    }
}
impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Catalog(e) => write!(f, "{e}"),
        }
    }
}
impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Catalog(e) => Some(e),
        }
    }
}
impl From<ClientError> for SampleError {
    fn from(e: ClientError) -> Self {
        SampleError::Catalog(e)
    }
}

/// `count` independent indices in `0..total`. Repeats are allowed.
pub fn sample_indices(rng: &mut impl RandomSource, total: u32, count: usize) -> Vec<u32> {
    if total == 0 {
        return vec![];
    }
    (0..count).map(|_| rng.index_below(total)).collect()
}

/// Splits a playlist index into the offset of its page and its position on it.
pub fn page_position(index: u32) -> (u32, u32) {
    ((index / PAGE_SIZE) * PAGE_SIZE, index % PAGE_SIZE)
}

/// Sample a tournament pool from `playlist_id`.
///
/// Pages are fetched concurrently, but picks are accepted in the order their
/// indices were drawn. Any failed request fails the whole sample.
pub async fn sample_pool(
    catalog: &impl Catalog,
    token: &AccessToken,
    playlist_id: &str,
    options: &SampleOptions,
    rng: &mut impl RandomSource,
) -> Result<Vec<Track>, SampleError> {
    let total = catalog.playlist_total(token, playlist_id).await?;
    let indices = sample_indices(rng, total, options.draw_count());
    tracing::info!(
        "sampling {} picks from playlist {playlist_id} ({total} tracks)",
        indices.len()
    );

    let pages = join_all(
        indices
            .iter()
            .map(|&index| catalog.tracks_page(token, playlist_id, page_position(index).0)),
    )
    .await;

    let mut pool: Vec<Track> = Vec::with_capacity(indices.len());
    for (index, page) in indices.into_iter().zip(pages) {
        let (_, position) = page_position(index);
        let Some(item) = page?.into_iter().nth(position as usize) else {
            tracing::debug!("pick {index} is past the end of its page");
            continue;
        };
        let Some(track) = item.track else {
            tracing::debug!("pick {index} is not a playable track");
            continue;
        };
        if options.require_preview && track.playable_preview().is_none() {
            tracing::debug!("pick {index} ({}) has no preview", track.name);
            continue;
        }
        if pool.iter().any(|t| t.id == track.id) {
            tracing::debug!("pick {index} ({}) was already drawn", track.name);
            continue;
        }
        pool.push(track);
    }

    tracing::info!("sampled {} tracks from playlist {playlist_id}", pool.len());
    Ok(pool)
}
