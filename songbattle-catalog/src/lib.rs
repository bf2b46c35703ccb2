//! A barebones client for the Spotify Web API catalog endpoints.
#![deny(missing_docs)]

mod client;
pub use client::*;

mod playlist;
pub use playlist::*;

mod track;
pub use track::*;

mod request;
