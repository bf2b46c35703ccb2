pub mod config {
    use std::path::Path;

    use anyhow::Context as _;
    use serde::{Deserialize, Serialize, de::DeserializeOwned};

    /// Scopes requested at login.
    pub const DEFAULT_SCOPES: &[&str] = &[
        "user-read-private",
        "playlist-read-private",
        "playlist-read-collaborative",
        "user-library-read",
    ];

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    pub struct Spotify {
        pub client_id: String,
        pub redirect_uri: String,
        pub scopes: Vec<String>,
        pub api_base_url: String,
        /// Route playlist lookups through a relay at this base URL.
        pub relay_url: Option<String>,
    }
    impl Default for Spotify {
        fn default() -> Self {
            Self {
                client_id: "YOUR_CLIENT_ID".to_string(),
                redirect_uri: "http://localhost:3000".to_string(),
                scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
                api_base_url: "https://api.spotify.com/v1".to_string(),
                relay_url: None,
            }
        }
    }

    /// Load a TOML config file, returning `T::default()` if the file doesn't exist.
    pub fn load_config<T: Default + DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found at {}, using defaults", path.display());
                Ok(T::default())
            }
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    pub fn save_config<T: Serialize>(path: impl AsRef<Path>, config: &T) -> anyhow::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, toml::to_string(config)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("saved config to {}", path.display());
        Ok(())
    }

}
