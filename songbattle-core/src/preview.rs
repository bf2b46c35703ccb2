use std::sync::{Arc, RwLock};

use crate::{app_state::AppState, tournament::Side};

#[cfg_attr(not(feature = "audio"), allow(dead_code))]
pub(crate) enum PreviewMessage {
    Play {
        side: Side,
        generation: u64,
        data: Vec<u8>,
    },
    Stop,
}

/// Sends to the preview thread. Without the `audio` feature there is no
/// thread and every message is dropped.
#[derive(Clone)]
pub(crate) struct PreviewHandle(Option<std::sync::mpsc::Sender<PreviewMessage>>);
impl PreviewHandle {
    pub fn spawn(state: Arc<RwLock<AppState>>) -> Self {
        #[cfg(feature = "audio")]
        {
            let (tx, rx) = std::sync::mpsc::channel();
            let spawned = std::thread::Builder::new()
                .name("songbattle-preview".to_string())
                .spawn(move || audio::run(rx, state));
            match spawned {
                Ok(_) => Self(Some(tx)),
                Err(e) => {
                    tracing::warn!("failed to start preview thread: {e}");
                    Self(None)
                }
            }
        }
        #[cfg(not(feature = "audio"))]
        {
            let _ = state;
            tracing::info!("built without audio support; previews are disabled");
            Self(None)
        }
    }

    pub fn send(&self, message: PreviewMessage) {
        match &self.0 {
            Some(tx) => {
                if tx.send(message).is_err() {
                    tracing::warn!("preview thread has stopped");
                }
            }
            None => {
                if let PreviewMessage::Play { side, .. } = message {
                    tracing::info!("not playing {side:?} preview: no audio output");
                }
            }
        }
    }
}

#[cfg(feature = "audio")]
mod audio {
    use std::{
        io::Cursor,
        sync::{Arc, RwLock, mpsc::RecvTimeoutError},
        time::Duration,
    };

    use super::PreviewMessage;
    use crate::app_state::{AppState, AppStateError};

    const POLL_INTERVAL: Duration = Duration::from_millis(250);

    pub(super) fn run(rx: std::sync::mpsc::Receiver<PreviewMessage>, state: Arc<RwLock<AppState>>) {
        let stream = match rodio::OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("no audio output available, previews are disabled: {e}");
                // Keep draining so senders don't see a closed channel.
                while rx.recv().is_ok() {}
                return;
            }
        };
        let sink = rodio::Sink::connect_new(stream.mixer());
        sink.set_volume(1.0);

        let mut playing: Option<u64> = None;
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(PreviewMessage::Play {
                    side,
                    generation,
                    data,
                }) => {
                    sink.clear();
                    let decoder = rodio::decoder::DecoderBuilder::new()
                        .with_byte_len(data.len() as u64)
                        .with_data(Cursor::new(data))
                        .build();
                    match decoder {
                        Ok(decoder) => {
                            sink.append(decoder);
                            sink.play();
                            playing = Some(generation);
                            tracing::debug!("playing {side:?} preview");
                        }
                        Err(e) => {
                            playing = None;
                            let mut state = state.write().unwrap();
                            if state.preview_generation == generation {
                                state.previewing = None;
                                state.error = Some(AppStateError::PreviewFailed {
                                    error: format!("could not decode preview: {e}"),
                                });
                            }
                        }
                    }
                }
                Ok(PreviewMessage::Stop) => {
                    sink.clear();
                    playing = None;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            // Clip ran out.
            if let Some(generation) = playing
                && sink.empty()
            {
                playing = None;
                let mut state = state.write().unwrap();
                if state.preview_generation == generation {
                    state.previewing = None;
                }
            }
        }
    }
}
