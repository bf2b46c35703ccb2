use std::{collections::HashMap, sync::mpsc, time::Duration};

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use songbattle_core::{CoverArt, Logic};

/// 4 columns × 2 rows of colours averaged from a cover image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtColors {
    /// Colors arranged as [row][col], where row 0 is top, col 0 is left.
    pub colors: [[Color; 4]; 2],
}

impl Default for ArtColors {
    fn default() -> Self {
        Self {
            colors: [[Color::DarkGray; 4]; 2],
        }
    }
}

impl ArtColors {
    /// One terminal row, four cells wide: each upper half-block shows the
    /// top colour over the bottom one.
    pub fn half_blocks(&self) -> Vec<Span<'static>> {
        (0..4)
            .map(|col| {
                Span::styled(
                    "\u{2580}",
                    Style::default()
                        .fg(self.colors[0][col])
                        .bg(self.colors[1][col]),
                )
            })
            .collect()
    }

    /// Two terminal rows of full blocks, each colour `cell_width` cells wide.
    pub fn block_lines(&self, cell_width: usize) -> Vec<Line<'static>> {
        self.colors
            .iter()
            .map(|row| {
                Line::from(
                    row.iter()
                        .map(|&color| {
                            Span::styled("\u{2588}".repeat(cell_width), Style::default().fg(color))
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }
}

/// Colours for the covers currently on screen, keyed by image URL.
pub struct CoverArtCache {
    cover_art_loaded_rx: mpsc::Receiver<CoverArt>,
    cache: HashMap<String, CacheEntry>,
}

impl CoverArtCache {
    pub fn new(cover_art_loaded_rx: mpsc::Receiver<CoverArt>) -> Self {
        Self {
            cover_art_loaded_rx,
            cache: HashMap::new(),
        }
    }

    pub fn update(&mut self) {
        for incoming in self.cover_art_loaded_rx.try_iter() {
            if let Some(entry) = self.cache.get_mut(&incoming.url) {
                entry.state = CacheEntryState::Loaded(compute_art_colors(&incoming.data));
                tracing::debug!("computed cover colours for {}", incoming.url);
            }
        }

        self.cache.retain(|url, entry| {
            let keep = entry.last_requested.elapsed() <= CACHE_ENTRY_TIMEOUT;
            if !keep {
                tracing::debug!("evicting cover colours for {url}");
            }
            keep
        });

        // Oldest first.
        if self.cache.len() > MAX_CACHE_SIZE {
            let mut urls: Vec<_> = self
                .cache
                .iter()
                .map(|(url, entry)| (entry.first_requested, url.clone()))
                .collect();
            urls.sort();
            for (_, url) in urls.into_iter().take(self.cache.len() - MAX_CACHE_SIZE) {
                self.cache.remove(&url);
            }
        }
    }

    /// The colours for `url`, or grey until they have loaded. Asks `logic` for
    /// the image once the URL has been wanted for a moment.
    pub fn get(&mut self, logic: &Logic, url: Option<&str>) -> ArtColors {
        let Some(url) = url else {
            return ArtColors::default();
        };

        let now = std::time::Instant::now();
        let entry = self.cache.entry(url.to_string()).or_insert(CacheEntry {
            first_requested: now,
            last_requested: now,
            state: CacheEntryState::Unloaded,
        });
        entry.last_requested = now;

        // Rows flicking past while scrolling never get fetched.
        if let CacheEntryState::Unloaded = entry.state
            && entry.first_requested.elapsed() > TIME_BEFORE_LOAD_ATTEMPT
        {
            logic.request_cover_art(url);
            entry.state = CacheEntryState::Loading;
        }

        match entry.state {
            CacheEntryState::Loaded(colors) => colors,
            _ => ArtColors::default(),
        }
    }
}

const TIME_BEFORE_LOAD_ATTEMPT: Duration = Duration::from_millis(100);
const CACHE_ENTRY_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_CACHE_SIZE: usize = 50;

struct CacheEntry {
    first_requested: std::time::Instant,
    last_requested: std::time::Instant,
    state: CacheEntryState,
}

enum CacheEntryState {
    Unloaded,
    Loading,
    Loaded(ArtColors),
}

/// Averages each cell of a 4×2 grid over the image. Undecodable data is grey.
fn compute_art_colors(image_data: &[u8]) -> ArtColors {
    let Ok(img) = image::load_from_memory(image_data) else {
        return ArtColors::default();
    };

    let rgb = img.to_rgb8();
    let (w, h) = (rgb.width(), rgb.height());
    if w == 0 || h == 0 {
        return ArtColors::default();
    }

    let average = |x0: u32, y0: u32, x1: u32, y1: u32| -> Color {
        let (mut r, mut g, mut b, mut count) = (0u64, 0u64, 0u64, 0u64);
        for y in y0..y1.min(h) {
            for x in x0..x1.min(w) {
                let pixel = rgb.get_pixel(x, y);
                r += pixel[0] as u64;
                g += pixel[1] as u64;
                b += pixel[2] as u64;
                count += 1;
            }
        }
        if count == 0 {
            return Color::DarkGray;
        }
        Color::Rgb((r / count) as u8, (g / count) as u8, (b / count) as u8)
    };

    let (col_width, row_height) = (w / 4, h / 2);
    let mut colors = [[Color::DarkGray; 4]; 2];
    for (row, row_colors) in colors.iter_mut().enumerate() {
        for (col, color) in row_colors.iter_mut().enumerate() {
            let (col, row) = (col as u32, row as u32);
            let x0 = col * col_width;
            let y0 = row * row_height;
            let x1 = if col == 3 { w } else { (col + 1) * col_width };
            let y1 = if row == 1 { h } else { (row + 1) * row_height };
            *color = average(x0, y0, x1.max(x0 + 1), y1.max(y0 + 1));
        }
    }

    ArtColors { colors }
}
