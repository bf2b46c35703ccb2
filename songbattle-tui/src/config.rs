use serde::{Deserialize, Serialize};
use songbattle_core::sampling::SampleOptions;
use songbattle_shared::config::{Spotify, load_config, save_config};

use crate::style::Style;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub spotify: Spotify,
    pub tournament: Tournament,
    pub style: Style,
}
impl Config {
    pub const FILENAME: &str = "songbattle-tui.toml";

    pub fn load() -> anyhow::Result<Self> {
        load_config(Self::FILENAME)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        save_config(Self::FILENAME, self)
    }

    pub fn exists() -> bool {
        std::path::Path::new(Self::FILENAME).exists()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct General {
    pub tick_rate_ms: u64,
    /// Where the access token is kept between runs.
    pub token_file: String,
    pub log_file: String,
    /// Entries kept for the logs panel.
    pub log_capacity: usize,
}
impl Default for General {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            token_file: "songbattle-token.toml".to_string(),
            log_file: "songbattle-tui.log".to_string(),
            log_capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tournament {
    /// Picks drawn per run. Values above 8 draw 8.
    pub pool_size: usize,
    pub require_preview: bool,
    /// Play the left-hand preview whenever a new matchup appears.
    pub autoplay_previews: bool,
}
impl Default for Tournament {
    fn default() -> Self {
        let options = SampleOptions::default();
        Self {
            pool_size: options.pool_size,
            require_preview: options.require_preview,
            autoplay_previews: false,
        }
    }
}
impl Tournament {
    pub fn sample_options(&self) -> SampleOptions {
        SampleOptions {
            pool_size: self.pool_size,
            require_preview: self.require_preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_default_independently() {
        let config: Config = toml::from_str(
            r#"
            [general]
            tick_rate_ms = 50

            [spotify]
            client_id = "abc"

            [tournament]
            require_preview = true
            "#,
        )
        .unwrap();

        assert_eq!(config.general.tick_rate_ms, 50);
        assert_eq!(config.general.log_capacity, 1000);
        assert_eq!(config.spotify.client_id, "abc");
        assert_eq!(config.spotify.redirect_uri, "http://localhost:3000");
        assert_eq!(
            config.tournament.sample_options(),
            SampleOptions {
                pool_size: 8,
                require_preview: true
            }
        );
        assert_eq!(config.style, Style::default());
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
    }
}
