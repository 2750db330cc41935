use crate::domain::PlayerId;

/// What the caller should do after a tap on a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected(PlayerId),
    Cleared,
    SwapRequested { id_a: PlayerId, id_b: PlayerId },
}

/// Two-tap swap gesture used by team-sheet screens.
///
/// The first tap remembers a player, tapping the same player again forgets it,
/// and tapping a different player asks for a swap of the two. The selection is
/// cleared as soon as a swap is requested, whether or not the swap succeeds.
///
/// This is the client-side half of `POST /api/rosters/:academy/:category/swap`:
/// the server only sees the resulting pair, so nothing in the engine holds one.
#[derive(Debug, Clone, Default)]
pub struct SwapSelection {
    first: Option<PlayerId>,
}

impl SwapSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&PlayerId> {
        self.first.as_ref()
    }

    pub fn select(&mut self, player_id: &str) -> SelectionOutcome {
        match self.first.take() {
            None => {
                self.first = Some(player_id.to_string());
                SelectionOutcome::Selected(player_id.to_string())
            }
            Some(first) if first == player_id => SelectionOutcome::Cleared,
            Some(first) => SelectionOutcome::SwapRequested {
                id_a: first,
                id_b: player_id.to_string(),
            },
        }
    }
}
