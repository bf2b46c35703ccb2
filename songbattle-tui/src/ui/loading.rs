//! Animated loading screen shown while a battle's songs are being sampled.
//!
//! Two columns of note glyphs sway towards each other in a wave pattern,
//! with the title and an animated status line centered below.

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::style;

const NOTES: [char; 2] = ['\u{266A}', '\u{266B}'];

/// Base positions of each note, as (x, y) offsets from center. The left
/// group mirrors the right one.
const CHORUS: &[(i16, i16)] = &[(6, -2), (8, -1), (5, 0), (9, 1), (7, 2)];

/// Values represent column displacement towards the center.
const SWAY_TABLE: &[i16] = &[0, 1, 2, 3, 3, 2, 1, 0];

/// Height of the animated area in terminal rows.
const CHORUS_HEIGHT: u16 = 5;

/// Total height of the loading display: chorus + blank line + title + status.
const TOTAL_HEIGHT: u16 = CHORUS_HEIGHT + 1 + 1 + 1;

/// Draws the animated loading screen centered in `area`.
pub fn draw(frame: &mut Frame, tick_count: u64, style: &style::Style, area: Rect) {
    if area.width < 24 || area.height < TOTAL_HEIGHT {
        draw_minimal(frame, style, tick_count, area);
        return;
    }

    let top_y = area.y + (area.height - TOTAL_HEIGHT) / 2;
    let center_x = area.x + area.width / 2;

    let chorus_area = Rect::new(area.x, top_y, area.width, CHORUS_HEIGHT);
    draw_chorus(
        frame.buffer_mut(),
        tick_count,
        [style.left_color(), style.right_color()],
        center_x,
        chorus_area,
    );

    let title_area = Rect::new(area.x, top_y + CHORUS_HEIGHT + 1, area.width, 1);
    let title = Paragraph::new(Line::from(Span::styled(
        "song battle",
        Style::default()
            .fg(style.accent_color())
            .add_modifier(Modifier::BOLD),
    )))
    .centered();
    frame.render_widget(title, title_area);

    let status_area = Rect::new(area.x, title_area.y + 1, area.width, 1);
    let status = Paragraph::new(Line::from(Span::styled(
        status_text(tick_count),
        Style::default().fg(style.dim_color()),
    )))
    .centered();
    frame.render_widget(status, status_area);
}

/// Renders both halves of the chorus into the buffer at their animated positions.
fn draw_chorus(buf: &mut Buffer, tick_count: u64, colors: [Color; 2], cx: u16, area: Rect) {
    let tick = tick_count as usize;
    let cy = (area.y + area.height / 2) as i16;

    for (i, &(base_x, base_y)) in CHORUS.iter().enumerate() {
        let sway = SWAY_TABLE[(tick + i * 3) % SWAY_TABLE.len()];
        let dy = SWAY_TABLE[(tick + i * 5) % SWAY_TABLE.len()] / 3;

        for (side, direction) in [-1_i16, 1].into_iter().enumerate() {
            let x = cx as i16 + direction * (base_x - sway);
            let y = cy + base_y + dy;
            if x >= area.x as i16
                && x < (area.x + area.width) as i16
                && y >= area.y as i16
                && y < (area.y + area.height) as i16
            {
                let cell = &mut buf[(x as u16, y as u16)];
                cell.set_char(NOTES[(i + side) % NOTES.len()]);
                cell.set_fg(colors[side]);
            }
        }
    }
}

/// The result is padded to a fixed width so centered text doesn't jitter
/// as the dot count cycles.
fn status_text(tick_count: u64) -> String {
    let dot_count = (tick_count / 5 % 4 + 1) as usize;
    let dots = ".".repeat(dot_count);
    let pad = " ".repeat(4 - dot_count);
    format!("picking contenders{dots}{pad}")
}

/// Minimal fallback when the area is too small for the full animation.
fn draw_minimal(frame: &mut Frame, style: &style::Style, tick_count: u64, area: Rect) {
    let paragraph =
        Paragraph::new(status_text(tick_count)).style(Style::default().fg(style.dim_color()));
    frame.render_widget(paragraph, area);
}
