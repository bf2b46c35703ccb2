use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use songbattle_core::{PlaylistsState, sc::Playlist};

use crate::{app::App, keys::Action};

use super::{layout, string_to_color, truncate_to_width};

/// Selection within the playlist list.
#[derive(Debug, Default)]
pub struct PlaylistsViewState {
    pub selected_index: usize,
}

impl PlaylistsViewState {
    /// Keep the selection on an existing row.
    pub fn clamp(&mut self, len: usize) {
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    fn move_by(&mut self, delta: i32, len: usize) {
        let steps = delta.unsigned_abs() as usize;
        self.selected_index = if delta < 0 {
            self.selected_index.saturating_sub(steps)
        } else {
            self.selected_index + steps
        };
        self.clamp(len);
    }
}

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let style = &app.config.style;
    let state = app.logic.get_state();
    let state = state.read().unwrap();

    let title = match &state.playlists {
        PlaylistsState::Loaded { playlists, total } if (playlists.len() as u32) < *total => {
            format!(" Playlists ({} of {total}) ", playlists.len())
        }
        PlaylistsState::Loaded { playlists, .. } => format!(" Playlists ({}) ", playlists.len()),
        _ => " Playlists ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(style.border_color()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let playlists = match &state.playlists {
        PlaylistsState::Loaded { playlists, .. } if !playlists.is_empty() => playlists,
        PlaylistsState::Loaded { .. } => {
            let empty =
                Paragraph::new("No playlists found").style(Style::default().fg(style.dim_color()));
            frame.render_widget(empty, inner);
            return;
        }
        PlaylistsState::NotLoaded | PlaylistsState::Loading => {
            let loading = Paragraph::new("Loading playlists...")
                .style(Style::default().fg(style.dim_color()));
            frame.render_widget(loading, inner);
            return;
        }
    };

    let selected = app.playlists.selected_index.min(playlists.len() - 1);
    let split = layout::split_playlists(inner);

    // Colours only for rows that can be on screen.
    let visible_rows = split.list.height as usize;
    let first_visible = selected.saturating_sub(visible_rows.saturating_sub(1));
    let art: Vec<_> = playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            if (first_visible..first_visible + visible_rows).contains(&i) {
                app.cover_art_cache.get(&app.logic, playlist.cover_url())
            } else {
                Default::default()
            }
        })
        .collect();

    let count_width = 12;
    let text_width = (split.list.width as usize).saturating_sub(ART_WIDTH);
    let name_width = text_width.saturating_sub(count_width) * 3 / 5;
    let owner_width = text_width.saturating_sub(count_width + name_width + 2);

    let items: Vec<ListItem> = playlists
        .iter()
        .zip(&art)
        .map(|(playlist, art)| {
            let owner = playlist.owner_name().unwrap_or("unknown");
            let mut spans = art.half_blocks();
            spans.push(Span::raw(" "));
            spans.extend([
                Span::styled(
                    truncate_to_width(&playlist.name, name_width),
                    Style::default().fg(style.text_color()),
                ),
                Span::raw(" "),
                Span::styled(
                    truncate_to_width(owner, owner_width),
                    Style::default().fg(string_to_color(owner)),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:>count_width$}", format!("{} tracks", playlist.total_tracks())),
                    Style::default().fg(style.dim_color()),
                ),
            ]);
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(style.selected_color())
            .add_modifier(Modifier::BOLD),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(selected));
    frame.render_stateful_widget(list, split.list, &mut list_state);

    if !split.detail.is_empty() {
        let detail = Paragraph::new(Line::styled(
            truncate_to_width(
                description_text(&playlists[selected]),
                split.detail.width as usize,
            ),
            Style::default().fg(style.dim_color()),
        ))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(style.border_color())),
        );
        frame.render_widget(detail, split.detail);
    }
}

fn description_text(playlist: &Playlist) -> &str {
    playlist
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("No description")
}

/// Four half-blocks of cover colours plus a space.
const ART_WIDTH: usize = 5;

pub fn handle_key(app: &mut App, action: Action) {
    let len = {
        let state = app.logic.get_state();
        let state = state.read().unwrap();
        state.playlists.playlists().len()
    };
    let page = layout::PAGE_SCROLL_SIZE as i32;

    match action {
        Action::MoveUp => app.playlists.move_by(-1, len),
        Action::MoveDown => app.playlists.move_by(1, len),
        Action::PageUp => app.playlists.move_by(-page, len),
        Action::PageDown => app.playlists.move_by(page, len),
        Action::GotoTop => app.playlists.selected_index = 0,
        Action::GotoBottom => app.playlists.selected_index = len.saturating_sub(1),
        Action::Refresh => app.logic.fetch_playlists(),
        Action::Select => {
            let selected = {
                let state = app.logic.get_state();
                let state = state.read().unwrap();
                state
                    .playlists
                    .playlists()
                    .get(app.playlists.selected_index)
                    .map(|p| p.id.clone())
            };
            if let Some(playlist_id) = selected {
                app.logic.start_tournament(&playlist_id);
            }
        }
        _ => {}
    }
}

/// Moves the selection by `steps` rows in `direction`, for the mouse wheel.
pub fn handle_scroll(app: &mut App, direction: i32, steps: usize) {
    let len = {
        let state = app.logic.get_state();
        let state = state.read().unwrap();
        state.playlists.playlists().len()
    };
    app.playlists.move_by(direction * steps as i32, len);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_stays_on_a_row() {
        let mut view = PlaylistsViewState::default();
        view.move_by(-1, 5);
        assert_eq!(view.selected_index, 0);
        view.move_by(20, 5);
        assert_eq!(view.selected_index, 4);
        view.clamp(2);
        assert_eq!(view.selected_index, 1);
        view.clamp(0);
        assert_eq!(view.selected_index, 0);
    }

    #[test]
    fn descriptions_fall_back_when_blank() {
        let mut playlist = Playlist {
            id: "p1".to_string(),
            name: "Road Trip".to_string(),
            description: None,
            images: vec![],
            owner: None,
            tracks: Default::default(),
        };
        assert_eq!(description_text(&playlist), "No description");

        playlist.description = Some("   ".to_string());
        assert_eq!(description_text(&playlist), "No description");

        playlist.description = Some(" songs for the road ".to_string());
        assert_eq!(description_text(&playlist), "songs for the road");
    }
}
