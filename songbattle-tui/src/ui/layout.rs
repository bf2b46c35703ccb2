use ratatui::layout::{Constraint, Direction, Layout, Rect};

// ── Main vertical layout ────────────────────────────────────────────────────

pub const HEADER_HEIGHT: u16 = 1;
pub const CONTENT_MIN_HEIGHT: u16 = 3;
pub const ERROR_BAR_HEIGHT: u16 = 1;
pub const HELP_BAR_HEIGHT: u16 = 1;

pub struct MainLayout {
    pub header: Rect,
    pub content: Rect,
    pub error_bar: Rect,
    pub help_bar: Rect,
}

pub fn split_main(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(CONTENT_MIN_HEIGHT),
            Constraint::Length(ERROR_BAR_HEIGHT),
            Constraint::Length(HELP_BAR_HEIGHT),
        ])
        .split(area);
    MainLayout {
        header: chunks[0],
        content: chunks[1],
        error_bar: chunks[2],
        help_bar: chunks[3],
    }
}

// ── Landing ─────────────────────────────────────────────────────────────────

pub const LANDING_INPUT_HEIGHT: u16 = 3;

pub struct LandingLayout {
    pub intro: Rect,
    pub input: Rect,
}

pub fn split_landing(area: Rect) -> LandingLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(CONTENT_MIN_HEIGHT),
            Constraint::Length(LANDING_INPUT_HEIGHT),
        ])
        .split(area);
    LandingLayout {
        intro: chunks[0],
        input: chunks[1],
    }
}

// ── Playlists ───────────────────────────────────────────────────────────────

pub const PLAYLIST_DETAIL_HEIGHT: u16 = 2;

pub struct PlaylistsLayout {
    pub list: Rect,
    /// Empty when the area is too short to spare a row.
    pub detail: Rect,
}

/// Splits the inside of the playlist block into the list and a detail line
/// (separator plus description) for the selected playlist.
pub fn split_playlists(area: Rect) -> PlaylistsLayout {
    if area.height < CONTENT_MIN_HEIGHT + PLAYLIST_DETAIL_HEIGHT {
        return PlaylistsLayout {
            list: area,
            detail: Rect::new(area.x, area.y + area.height, area.width, 0),
        };
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(CONTENT_MIN_HEIGHT),
            Constraint::Length(PLAYLIST_DETAIL_HEIGHT),
        ])
        .split(area);
    PlaylistsLayout {
        list: chunks[0],
        detail: chunks[1],
    }
}

// ── Battle ──────────────────────────────────────────────────────────────────

pub const ROUND_INFO_HEIGHT: u16 = 1;

pub struct BattleLayout {
    pub round_info: Rect,
    pub left: Rect,
    pub right: Rect,
}

pub fn split_battle(area: Rect) -> BattleLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(ROUND_INFO_HEIGHT),
            Constraint::Min(CONTENT_MIN_HEIGHT),
        ])
        .split(area);
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(rows[1]);
    BattleLayout {
        round_info: rows[0],
        left: cards[0],
        right: cards[1],
    }
}

/// A rectangle of at most `width` x `height`, centred in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

// ── Interaction constants ───────────────────────────────────────────────────

pub const PAGE_SCROLL_SIZE: usize = 20;
pub const SCROLL_WHEEL_STEPS: usize = 3;

// ── Log view ────────────────────────────────────────────────────────────────

pub const LOG_TARGET_WIDTH: usize = 24;
pub const LOG_TARGET_SUFFIX_LEN: usize = 21;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_layout_reserves_bars() {
        let main = split_main(Rect::new(0, 0, 80, 24));
        assert_eq!(main.header.height, HEADER_HEIGHT);
        assert_eq!(main.content.height, 21);
        assert_eq!(main.error_bar.y, 22);
        assert_eq!(main.help_bar.y, 23);
    }

    #[test]
    fn playlist_detail_only_when_there_is_room() {
        let roomy = split_playlists(Rect::new(0, 0, 40, 10));
        assert_eq!(roomy.list.height, 8);
        assert_eq!(roomy.detail, Rect::new(0, 8, 40, PLAYLIST_DETAIL_HEIGHT));

        let cramped = split_playlists(Rect::new(0, 0, 40, 4));
        assert_eq!(cramped.list.height, 4);
        assert!(cramped.detail.is_empty());
    }

    #[test]
    fn centered_clamps_to_area() {
        let area = Rect::new(10, 5, 20, 4);
        assert_eq!(centered(area, 10, 2), Rect::new(15, 6, 10, 2));
        assert_eq!(centered(area, 100, 100), area);
    }
}
