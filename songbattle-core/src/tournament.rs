//! The single-elimination bracket.
//!
//! [`Tournament`] knows nothing about fetching or rendering; [`crate::Logic`]
//! drives it with sampled tracks and user choices, and the UI draws whatever
//! [`TournamentState`] it is in.

use crate::sc::Track;

/// Tracks entered into each run.
pub const POOL_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}
impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub left: Track,
    pub right: Track,
}
impl Matchup {
    pub fn get(&self, side: Side) -> &Track {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn get_mut(&mut self, side: Side) -> &mut Track {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StallReason {
    /// Fewer than two usable tracks were sampled.
    InsufficientTracks { found: usize },
    /// Fetching the sample failed.
    LoadFailed { message: String },
}
impl std::fmt::Display for StallReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StallReason::InsufficientTracks { found } => write!(
                f,
                "Only {found} usable track{} found; a battle needs at least two",
                if *found == 1 { "" } else { "s" }
            ),
            StallReason::LoadFailed { message } => write!(f, "Failed to load songs: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TournamentState {
    #[default]
    Idle,
    Loading,
    InProgress {
        matchup: Matchup,
        /// Tracks waiting for their turn, in entry order.
        pool: Vec<Track>,
    },
    Complete {
        winner: Track,
    },
    Stalled {
        reason: StallReason,
    },
}

/// Identifies the load a sampling result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What a choice led to.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    NextMatchup,
    Winner(Track),
}

#[derive(Debug, Default)]
pub struct Tournament {
    playlist_id: Option<String>,
    state: TournamentState,
    generation: u64,
}
impl Tournament {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TournamentState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, TournamentState::Loading)
    }

    pub fn matchup(&self) -> Option<&Matchup> {
        match &self.state {
            TournamentState::InProgress { matchup, .. } => Some(matchup),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<&Track> {
        match &self.state {
            TournamentState::Complete { winner } => Some(winner),
            _ => None,
        }
    }

    /// Tracks still in contention besides the one that will eventually win:
    /// the waiting pool plus one for an active matchup.
    pub fn remaining_rounds(&self) -> usize {
        match &self.state {
            TournamentState::InProgress { pool, .. } => pool.len() + 1,
            _ => 0,
        }
    }

    /// Start loading a fresh sample for `playlist_id`. Any load already in
    /// flight is orphaned.
    pub fn begin_loading(&mut self, playlist_id: impl Into<String>) -> LoadTicket {
        self.playlist_id = Some(playlist_id.into());
        self.state = TournamentState::Loading;
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Install a sampled pool. Stale tickets are ignored and return `false`.
    ///
    /// The first two entries open the bracket; with fewer than two the
    /// tournament stalls.
    pub fn finish_loading(&mut self, ticket: LoadTicket, sampled: Vec<Track>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }

        let mut pool = Vec::with_capacity(sampled.len());
        for track in sampled {
            if !pool.iter().any(|t: &Track| t.id == track.id) {
                pool.push(track);
            }
        }

        let found = pool.len();
        let mut waiting = pool.into_iter();
        self.state = match (waiting.next(), waiting.next()) {
            (Some(left), Some(right)) => TournamentState::InProgress {
                matchup: Matchup { left, right },
                pool: waiting.collect(),
            },
            _ => {
                tracing::warn!("tournament stalled: only {found} usable tracks");
                TournamentState::Stalled {
                    reason: StallReason::InsufficientTracks { found },
                }
            }
        };
        true
    }

    /// Record a failed load. Stale tickets are ignored and return `false`.
    pub fn fail_loading(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.state = TournamentState::Stalled {
            reason: StallReason::LoadFailed {
                message: message.into(),
            },
        };
        true
    }

    /// The user picked the track on `side`. Returns `None` if no matchup is active.
    pub fn choose(&mut self, side: Side) -> Option<Advance> {
        let TournamentState::InProgress { matchup, pool } = &mut self.state else {
            return None;
        };

        let chosen = matchup.get(side).clone();
        pool.retain(|t| t.id != chosen.id);

        if pool.is_empty() {
            self.state = TournamentState::Complete {
                winner: chosen.clone(),
            };
            return Some(Advance::Winner(chosen));
        }

        // The winner keeps its side; the challenger takes the other.
        *matchup.get_mut(side.other()) = pool.remove(0);
        Some(Advance::NextMatchup)
    }

    /// Re-sample the same playlist after a finished or stalled run.
    pub fn restart(&mut self) -> Option<(LoadTicket, String)> {
        if !matches!(
            self.state,
            TournamentState::Complete { .. } | TournamentState::Stalled { .. }
        ) {
            return None;
        }
        let playlist_id = self.playlist_id.clone()?;
        Some((self.begin_loading(playlist_id.clone()), playlist_id))
    }

    /// Back to `Idle`, orphaning any load in flight.
    pub fn reset(&mut self) {
        self.state = TournamentState::Idle;
        self.playlist_id = None;
        self.generation += 1;
    }

    fn accepts(&self, ticket: LoadTicket) -> bool {
        let current = ticket.0 == self.generation && self.is_loading();
        if !current {
            tracing::debug!("discarding result for stale load {ticket:?}");
        }
        current
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sc::{Album, Artist};

    pub(crate) fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Song {id}"),
            album: Album {
                name: format!("Album {id}"),
                images: vec![],
            },
            artists: vec![Artist {
                id: Some(format!("artist-{id}")),
                name: format!("Artist {id}"),
            }],
            preview_url: None,
            duration_ms: None,
        }
    }

    /// Tracks waiting behind the current matchup.
    fn pool(t: &Tournament) -> &[Track] {
        match t.state() {
            TournamentState::InProgress { pool, .. } => pool,
            _ => &[],
        }
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    fn matchup_ids(t: &Tournament) -> Option<(&str, &str)> {
        t.matchup()
            .map(|m| (m.left.id.as_str(), m.right.id.as_str()))
    }

    fn started(pool: &[&str]) -> Tournament {
        let mut t = Tournament::new();
        let ticket = t.begin_loading("playlist");
        assert!(t.finish_loading(ticket, pool.iter().map(|id| track(id)).collect()));
        t
    }

    #[test]
    fn four_track_bracket() {
        let mut t = started(&["A", "B", "C", "D"]);
        assert_eq!(matchup_ids(&t), Some(("A", "B")));
        assert_eq!(ids(pool(&t)), ["C", "D"]);

        assert_eq!(t.choose(Side::Left), Some(Advance::NextMatchup));
        assert_eq!(matchup_ids(&t), Some(("A", "C")));
        assert_eq!(ids(pool(&t)), ["D"]);

        assert_eq!(t.choose(Side::Right), Some(Advance::NextMatchup));
        assert_eq!(matchup_ids(&t), Some(("D", "C")));
        assert!(pool(&t).is_empty());

        assert_eq!(t.choose(Side::Left), Some(Advance::Winner(track("D"))));
        assert_eq!(t.winner().map(|w| w.id.as_str()), Some("D"));
        assert!(t.matchup().is_none());
    }

    #[test]
    fn chosen_side_is_preserved() {
        let mut t = started(&["A", "B", "C", "D", "E"]);
        for side in [Side::Right, Side::Left, Side::Right] {
            let chosen = t.matchup().unwrap().get(side).id.clone();
            t.choose(side);
            assert_eq!(t.matchup().unwrap().get(side).id, chosen);
        }
    }

    #[test]
    fn each_choice_removes_exactly_one_contender() {
        let ids: Vec<String> = (0..POOL_SIZE).map(|i| i.to_string()).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

        for pattern in 0u32..(1 << (POOL_SIZE - 1)) {
            let mut t = started(&ids);
            let mut remaining = t.remaining_rounds();
            assert_eq!(remaining, POOL_SIZE - 1);

            let mut round = 0;
            while t.matchup().is_some() {
                let side = if pattern & (1 << round) == 0 {
                    Side::Left
                } else {
                    Side::Right
                };
                t.choose(side);
                assert_eq!(t.remaining_rounds(), remaining - 1);
                remaining -= 1;
                round += 1;
            }
            assert_eq!(remaining, 0);
            assert!(t.winner().is_some());
            assert_eq!(round, POOL_SIZE - 1);
        }
    }

    #[test]
    fn one_track_stalls() {
        let mut t = Tournament::new();
        let ticket = t.begin_loading("playlist");
        t.finish_loading(ticket, vec![track("A")]);
        assert_eq!(
            t.state(),
            &TournamentState::Stalled {
                reason: StallReason::InsufficientTracks { found: 1 }
            }
        );
        assert!(t.matchup().is_none());
        assert!(t.choose(Side::Left).is_none());
    }

    #[test]
    fn duplicates_are_dropped_on_install() {
        let t = started(&["A", "A", "B", "A", "C"]);
        assert_eq!(matchup_ids(&t), Some(("A", "B")));
        assert_eq!(ids(pool(&t)), ["C"]);

        let mut t = Tournament::new();
        let ticket = t.begin_loading("playlist");
        t.finish_loading(ticket, vec![track("A"), track("A")]);
        assert!(matches!(t.state(), TournamentState::Stalled { .. }));
    }

    #[test]
    fn stale_loads_are_ignored() {
        let mut t = Tournament::new();
        let first = t.begin_loading("one");
        let second = t.begin_loading("two");
        assert!(!t.finish_loading(first, vec![track("A"), track("B")]));
        assert!(t.is_loading());
        assert!(!t.fail_loading(first, "late"));
        assert!(t.finish_loading(second, vec![track("C"), track("D")]));
        assert_eq!(matchup_ids(&t), Some(("C", "D")));

        // A reset orphans the load too.
        let third = t.begin_loading("three");
        t.reset();
        assert!(!t.finish_loading(third, vec![track("E"), track("F")]));
        assert_eq!(t.state(), &TournamentState::Idle);
    }

    #[test]
    fn restart_resamples_the_same_playlist() {
        let mut t = started(&["A", "B"]);
        assert!(t.restart().is_none(), "cannot restart mid-battle");

        t.choose(Side::Left);
        assert!(t.winner().is_some());

        let (ticket, playlist_id) = t.restart().unwrap();
        assert_eq!(playlist_id, "playlist");
        assert!(t.winner().is_none());
        assert!(t.is_loading());

        t.fail_loading(ticket, "offline");
        assert!(matches!(
            t.state(),
            TournamentState::Stalled {
                reason: StallReason::LoadFailed { .. }
            }
        ));
        assert!(t.restart().is_some());
    }
}
