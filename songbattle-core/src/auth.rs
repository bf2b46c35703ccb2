//! Implicit-grant login: building the authorize URL, pulling the token out of
//! the redirect fragment, and remembering it between runs.

use std::{
    path::PathBuf,
    sync::Mutex,
};

use serde::{Deserialize, Serialize};

use crate::sc::AccessToken;

pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";

const ACCESS_TOKEN_KEY: &str = "access_token";

/// Build the URL the user visits to log in.
pub fn build_login_url(
    client_id: &str,
    redirect_uri: &str,
    scopes: &[impl AsRef<str>],
) -> String {
    let scope = scopes
        .iter()
        .map(|s| urlencoding::encode(s.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join("%20");
    format!(
        "{AUTHORIZE_ENDPOINT}?client_id={}&redirect_uri={}&scope={scope}&response_type=token&show_dialog=true",
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
    )
}

/// Returns the fragment of a pasted redirect URL, or the input itself if it
/// has no `#`.
pub fn fragment_of(input: &str) -> &str {
    let input = input.trim();
    match input.split_once('#') {
        Some((_, fragment)) => fragment,
        None => input,
    }
}

/// Parses `#key=value&key=value` into decoded pairs. Malformed pairs are skipped.
pub fn parse_fragment(fragment: &str) -> Vec<(String, String)> {
    fragment
        .trim_start_matches('#')
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = urlencoding::decode(key).ok()?;
            let value = urlencoding::decode(value).ok()?;
            Some((key.into_owned(), value.into_owned()))
        })
        .collect()
}

/// Finds the access token in `fragment`, persisting it, or falls back to the
/// stored token. Never fails: no token is a normal outcome.
pub fn extract_token(fragment: &str, store: &dyn TokenStore) -> Option<AccessToken> {
    let from_fragment = parse_fragment(fragment)
        .into_iter()
        .find(|(key, _)| key == ACCESS_TOKEN_KEY)
        .and_then(|(_, value)| AccessToken::new(value));

    if let Some(token) = from_fragment {
        match store.store(token.as_str()) {
            Ok(()) => tracing::info!("persisted access token from login redirect"),
            Err(e) => tracing::warn!("failed to persist access token: {e}"),
        }
        return Some(token);
    }

    store.load().and_then(AccessToken::new)
}

/// Forget the persisted token.
pub fn sign_out(store: &dyn TokenStore) {
    match store.clear() {
        Ok(()) => tracing::info!("cleared stored access token"),
        Err(e) => tracing::warn!("failed to clear stored access token: {e}"),
    }
}

/// Client-side storage for the one token this application keeps.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str) -> std::io::Result<()>;
    fn clear(&self) -> std::io::Result<()>;
}

#[derive(Default)]
pub struct MemoryTokenStore(Mutex<Option<String>>);
impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.0.lock().unwrap().clone()
    }

    fn store(&self, token: &str) -> std::io::Result<()> {
        *self.0.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        *self.0.lock().unwrap() = None;
        Ok(())
    }
}

/// Keeps the token in a small TOML file.
pub struct FileTokenStore {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match toml::from_str::<StoredToken>(&contents) {
            Ok(stored) => Some(stored.access_token),
            Err(e) => {
                tracing::warn!("ignoring unreadable token file {}: {e}", self.path.display());
                None
            }
        }
    }

    fn store(&self, token: &str) -> std::io::Result<()> {
        let contents = toml::to_string(&StoredToken {
            access_token: token.to_string(),
        })
        .map_err(std::io::Error::other)?;
        std::fs::write(&self.path, contents)
    }

    fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_is_deterministic() {
        let url = build_login_url(
            "my-client",
            "http://localhost:3000",
            &["user-read-private", "playlist-read-private"],
        );
        assert_eq!(
            url,
            "https://accounts.spotify.com/authorize?client_id=my-client\
             &redirect_uri=http%3A%2F%2Flocalhost%3A3000\
             &scope=user-read-private%20playlist-read-private\
             &response_type=token&show_dialog=true"
        );
    }

    #[test]
    fn no_fragment_no_token_is_idempotent() {
        let store = MemoryTokenStore::new();
        assert!(extract_token("", &store).is_none());
        assert!(extract_token("", &store).is_none());
        assert!(store.load().is_none());
    }

    #[test]
    fn fragment_token_is_persisted() {
        let store = MemoryTokenStore::new();
        let token = extract_token("#access_token=ABC&token_type=Bearer", &store).unwrap();
        assert_eq!(token.as_str(), "ABC");

        let again = extract_token("", &store).unwrap();
        assert_eq!(again.as_str(), "ABC");
        assert_eq!(extract_token("", &store).unwrap().as_str(), "ABC");
    }

    #[test]
    fn fragment_token_replaces_stored_token() {
        let store = MemoryTokenStore::new();
        store.store("OLD").unwrap();
        let token = extract_token("access_token=NEW", &store).unwrap();
        assert_eq!(token.as_str(), "NEW");
        assert_eq!(store.load().as_deref(), Some("NEW"));
    }

    #[test]
    fn empty_fragment_token_falls_back_to_store() {
        let store = MemoryTokenStore::new();
        store.store("KEPT").unwrap();
        let token = extract_token("#access_token=&expires_in=3600", &store).unwrap();
        assert_eq!(token.as_str(), "KEPT");
    }

    #[test]
    fn pasted_urls_are_reduced_to_their_fragment() {
        assert_eq!(
            fragment_of("  http://localhost:3000/#access_token=x&expires_in=3600 "),
            "access_token=x&expires_in=3600"
        );
        assert_eq!(fragment_of("access_token=x"), "access_token=x");
        assert_eq!(
            parse_fragment("#access_token=a%2Bb&bogus&state=1"),
            vec![
                ("access_token".to_string(), "a+b".to_string()),
                ("state".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn sign_out_forgets_the_token() {
        let store = MemoryTokenStore::new();
        extract_token("#access_token=ABC", &store);
        sign_out(&store);
        assert!(extract_token("", &store).is_none());
    }

    #[test]
    fn file_store_round_trips() {
        let path = std::env::temp_dir().join(format!(
            "songbattle-token-test-{}.toml",
            std::process::id()
        ));
        let store = FileTokenStore::new(&path);
        store.clear().unwrap();
        assert!(store.load().is_none());

        store.store("XYZ").unwrap();
        assert_eq!(FileTokenStore::new(&path).load().as_deref(), Some("XYZ"));

        store.clear().unwrap();
        assert!(store.load().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }
}
