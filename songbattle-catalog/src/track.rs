use serde::{Deserialize, Deserializer, Serialize};

/// An image, as attached to albums and playlists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// The image URL.
    pub url: String,
    /// The height in pixels, if known.
    #[serde(default)]
    pub height: Option<u32>,
    /// The width in pixels, if known.
    #[serde(default)]
    pub width: Option<u32>,
}

/// A simplified album, as embedded in a track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    /// The album name.
    #[serde(default)]
    pub name: String,
    /// The cover images, largest first.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
}

/// A simplified artist, as embedded in a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// The artist ID. Absent for local files.
    #[serde(default)]
    pub id: Option<String>,
    /// The artist name.
    pub name: String,
}

/// A track in a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// The track ID, stable within a playlist.
    pub id: String,
    /// The track name.
    pub name: String,
    /// The album the track appears on.
    #[serde(default)]
    pub album: Album,
    /// The credited artists, in order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artists: Vec<Artist>,
    /// A URL to a 30 second preview clip, if the service offers one.
    #[serde(default)]
    pub preview_url: Option<String>,
    /// The duration in milliseconds.
    #[serde(default)]
    pub duration_ms: Option<u32>,
}
impl Track {
    /// The artist names joined with commas.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The smallest album cover, if there is one.
    pub fn cover_url(&self) -> Option<&str> {
        self.album.images.last().map(|i| i.url.as_str())
    }

    /// The preview URL, if it is usable.
    pub fn playable_preview(&self) -> Option<&str> {
        self.preview_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// An entry in a playlist's track listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// When the entry was added. [ISO 8601]
    #[serde(default)]
    pub added_at: Option<String>,
    /// The track, or `None` if the entry is removed, a local file without an
    /// ID, or not a track at all (e.g. a podcast episode).
    #[serde(default, deserialize_with = "lenient_track")]
    pub track: Option<Track>,
}

fn lenient_track<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Track>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_item() {
        let item: PlaylistItem = serde_json::from_str(
            r#"{
                "added_at": "2024-01-01T00:00:00Z",
                "track": {
                    "id": "t1",
                    "name": "Song",
                    "album": {"name": "Record", "images": [{"url": "big", "height": 640, "width": 640}, {"url": "small"}]},
                    "artists": [{"id": "a1", "name": "One"}, {"id": "a2", "name": "Two"}],
                    "preview_url": "https://p.example/clip.mp3",
                    "duration_ms": 180000
                }
            }"#,
        )
        .unwrap();

        let track = item.track.unwrap();
        assert_eq!(track.id, "t1");
        assert_eq!(track.artist_names(), "One, Two");
        assert_eq!(track.cover_url(), Some("small"));
        assert_eq!(track.playable_preview(), Some("https://p.example/clip.mp3"));
    }

    #[test]
    fn unusable_entries_become_empty_slots() {
        // Removed track.
        let item: PlaylistItem = serde_json::from_str(r#"{"track": null}"#).unwrap();
        assert!(item.track.is_none());

        // Local file: no ID.
        let item: PlaylistItem = serde_json::from_str(
            r#"{"track": {"id": null, "name": "Local", "album": {"name": ""}, "artists": []}}"#,
        )
        .unwrap();
        assert!(item.track.is_none());
    }

    #[test]
    fn missing_preview_and_null_images_are_tolerated() {
        let track: Track = serde_json::from_str(
            r#"{"id": "t2", "name": "Quiet", "album": {"name": "X", "images": null}, "artists": null, "preview_url": null}"#,
        )
        .unwrap();
        assert!(track.playable_preview().is_none());
        assert!(track.cover_url().is_none());
        assert_eq!(track.artist_names(), "");
    }
}
