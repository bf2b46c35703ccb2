use serde::{Deserialize, Serialize};

use crate::{AccessToken, Client, ClientResult, Image, PlaylistItem, track::null_as_empty};

/// A reference to a playlist's tracks, carrying the declared total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTracksRef {
    /// The endpoint listing the tracks.
    #[serde(default)]
    pub href: Option<String>,
    /// The number of entries in the playlist.
    pub total: u32,
}

/// The owner of a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistOwner {
    /// The owner's user ID.
    pub id: String,
    /// The owner's display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    /// The playlist ID.
    pub id: String,
    /// The playlist name.
    pub name: String,
    /// The playlist description.
    #[serde(default)]
    pub description: Option<String>,
    /// The cover images, largest first. Upstream sends `null` for empty playlists.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
    /// The owner of the playlist.
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
    /// The track reference. `tracks.total` is authoritative for sampling.
    #[serde(default)]
    pub tracks: PlaylistTracksRef,
}
impl Playlist {
    /// The declared number of entries.
    pub fn total_tracks(&self) -> u32 {
        self.tracks.total
    }

    /// The smallest cover image, if there is one.
    pub fn cover_url(&self) -> Option<&str> {
        self.images.last().map(|i| i.url.as_str())
    }

    /// The owner's display name, falling back to their ID.
    pub fn owner_name(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .map(|o| o.display_name.as_deref().unwrap_or(&o.id))
    }
}

/// A page of results from a paging endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// The total number of items across all pages.
    #[serde(default)]
    pub total: u32,
    /// The offset of the first item on this page.
    #[serde(default)]
    pub offset: u32,
    /// The requested page size.
    #[serde(default)]
    pub limit: u32,
    /// The URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
}

/// Playlist-related endpoints.
impl Client {
    /// The largest page the tracks endpoint will serve.
    pub const TRACKS_PAGE_SIZE: u32 = 100;

    /// Get the first page of the current user's playlists.
    pub async fn get_user_playlists(&self, token: &AccessToken) -> ClientResult<Page<Playlist>> {
        self.request(token, "me/playlists", &[]).await
    }

    /// Get a playlist's metadata, including its total track count.
    ///
    /// Goes through the relay if one is configured.
    pub async fn get_playlist(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> ClientResult<Playlist> {
        let id = urlencoding::encode(playlist_id);
        match &self.relay_base_url {
            Some(relay) => {
                let url = format!("{relay}/catalog/playlists/{id}");
                let bytes = self
                    .request_raw(&url, token.bearer().as_bytes(), &[])
                    .await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
            None => self.request(token, &format!("playlists/{id}"), &[]).await,
        }
    }

    /// Get one page of a playlist's entries, starting at `offset`.
    ///
    /// `limit` is capped at [`Self::TRACKS_PAGE_SIZE`].
    pub async fn get_playlist_tracks_page(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> ClientResult<Page<PlaylistItem>> {
        let id = urlencoding::encode(playlist_id);
        let parameters = [
            ("offset", offset.to_string()),
            ("limit", limit.min(Self::TRACKS_PAGE_SIZE).to_string()),
        ];
        self.request(token, &format!("playlists/{id}/tracks"), &parameters)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_playlist_page() {
        let page: Page<Playlist> = serde_json::from_str(
            r#"{
                "href": "https://api.example/v1/me/playlists",
                "items": [
                    {
                        "id": "p1",
                        "name": "Road Trip",
                        "description": "",
                        "images": null,
                        "owner": {"id": "u1", "display_name": null},
                        "tracks": {"href": "https://api.example/v1/playlists/p1/tracks", "total": 250}
                    }
                ],
                "limit": 20,
                "next": null,
                "offset": 0,
                "total": 1
            }"#,
        )
        .unwrap();

        assert_eq!(page.items.len(), 1);
        let playlist = &page.items[0];
        assert_eq!(playlist.total_tracks(), 250);
        assert!(playlist.images.is_empty());
        assert!(playlist.cover_url().is_none());
        assert_eq!(playlist.owner_name(), Some("u1"));
        assert!(page.next.is_none());
    }
}
