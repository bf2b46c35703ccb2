use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use songbattle_core::{
    sc::Track,
    tournament::{Side, TournamentState},
};

use crate::{app::App, cover_art::ArtColors, keys::Action, style};

use super::{layout, loading, string_to_color};

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let style = &app.config.style;
    let state = app.logic.get_state();
    let state = state.read().unwrap();

    match state.tournament.state() {
        TournamentState::Idle | TournamentState::Loading => {
            loading::draw(frame, app.tick_count, style, area);
        }
        TournamentState::InProgress { matchup, .. } => {
            let battle = layout::split_battle(area);

            let remaining = state.tournament.remaining_rounds();
            let round_info = Paragraph::new(Line::from(vec![
                Span::styled("Which do you prefer? ", Style::default().fg(style.text_color())),
                Span::styled(
                    format!(
                        "{remaining} round{} to go",
                        if remaining == 1 { "" } else { "s" }
                    ),
                    Style::default().fg(style.dim_color()),
                ),
            ]))
            .centered();
            frame.render_widget(round_info, battle.round_info);

            for (side, card_area) in [(Side::Left, battle.left), (Side::Right, battle.right)] {
                let track = matchup.get(side);
                let art = app.cover_art_cache.get(&app.logic, track.cover_url());
                draw_card(
                    frame,
                    style,
                    track,
                    art,
                    Card::Contender {
                        side,
                        previewing: state.previewing == Some(side),
                    },
                    card_area,
                );
            }
        }
        TournamentState::Complete { winner } => {
            let art = app.cover_art_cache.get(&app.logic, winner.cover_url());
            let card_area = layout::centered(area, area.width / 2 + 10, 13);
            draw_card(frame, style, winner, art, Card::Winner, card_area);
        }
        TournamentState::Stalled { reason } => {
            let message = Paragraph::new(vec![
                Line::styled(
                    "The battle could not go on",
                    Style::default()
                        .fg(style.error_color())
                        .add_modifier(Modifier::BOLD),
                ),
                Line::raw(""),
                Line::styled(reason.to_string(), Style::default().fg(style.text_color())),
                Line::raw(""),
                Line::styled(
                    "Press r to try again, or Esc to pick another playlist.",
                    Style::default().fg(style.dim_color()),
                ),
            ])
            .wrap(Wrap { trim: true })
            .centered();
            frame.render_widget(message, layout::centered(area, area.width, 6));
        }
    }
}

#[derive(Clone, Copy)]
enum Card {
    Contender { side: Side, previewing: bool },
    Winner,
}

fn draw_card(
    frame: &mut Frame,
    style: &style::Style,
    track: &Track,
    art: ArtColors,
    card: Card,
    area: Rect,
) {
    let (title, color) = match card {
        Card::Contender {
            side: Side::Left, ..
        } => (" Left (\u{2190}/1) ".to_string(), style.left_color()),
        Card::Contender {
            side: Side::Right, ..
        } => (" Right (\u{2192}/2) ".to_string(), style.right_color()),
        Card::Winner => (" Winner ".to_string(), style.winner_color()),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let artists = track.artist_names();
    let mut lines = art.block_lines(art_cell_width(block.inner(area).width));
    lines.push(Line::raw(""));
    lines.extend([
        Line::styled(
            track.name.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Line::styled(artists.clone(), Style::default().fg(string_to_color(&artists))),
        Line::styled(track.album.name.clone(), Style::default().fg(style.text_color())),
    ]);
    if let Some(duration_ms) = track.duration_ms {
        lines.push(Line::styled(
            format_duration(duration_ms),
            Style::default().fg(style.dim_color()),
        ));
    }
    lines.push(Line::raw(""));

    match card {
        Card::Contender { previewing: true, .. } => {
            lines.push(Line::styled(
                "\u{266A} playing preview",
                Style::default().fg(style.accent_color()),
            ));
        }
        Card::Contender { side, .. } => {
            lines.push(preview_hint(style, track, side));
        }
        Card::Winner => {
            lines.push(Line::styled(
                "The last song standing.",
                Style::default().fg(style.text_color()),
            ));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn preview_hint(style: &style::Style, track: &Track, side: Side) -> Line<'static> {
    if track.playable_preview().is_none() {
        return Line::styled("no preview available", Style::default().fg(style.dim_color()));
    }
    let key = match side {
        Side::Left => "p",
        Side::Right => "P",
    };
    Line::from(vec![
        Span::styled(
            key,
            Style::default()
                .fg(style.accent_color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" to preview", Style::default().fg(style.dim_color())),
    ])
}

/// Width of each cover colour cell, so the four cells fit on one line.
fn art_cell_width(inner_width: u16) -> usize {
    (inner_width as usize / 4).clamp(1, 4)
}

/// `m:ss`
fn format_duration(duration_ms: u32) -> String {
    let seconds = duration_ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub enum BattleAction {
    Back,
}

pub fn handle_key(app: &mut App, action: Action) -> Option<BattleAction> {
    match action {
        Action::ChooseLeft => app.logic.choose(Side::Left),
        Action::ChooseRight => app.logic.choose(Side::Right),
        Action::PreviewLeft => app.logic.play_preview(Side::Left),
        Action::PreviewRight => app.logic.play_preview(Side::Right),
        Action::StopPreview => app.logic.stop_preview(),
        Action::Restart => app.logic.restart(),
        Action::Back => return Some(BattleAction::Back),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_minutes_and_seconds() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(61_999), "1:01");
        assert_eq!(format_duration(3_600_000), "60:00");
    }

    #[test]
    fn cover_cells_shrink_with_the_card() {
        assert_eq!(art_cell_width(80), 4);
        assert_eq!(art_cell_width(10), 2);
        assert_eq!(art_cell_width(2), 1);
    }
}
