//! # ViewState
//! What the presentation layer sees for one entity, plus the tiny state machine behind it:
//! `Idle → Pending(direction) → Idle`.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct ReactionView {
    pub count: u64,
    pub liked: bool,
    /// A toggle is waiting on the server. The like control should be disabled.
    pub pending: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Like,
    Unlike,
}

impl Direction {
    /// The direction a toggle takes from the given state.
    pub fn from_liked(liked: bool) -> Self {
        if liked { Direction::Unlike } else { Direction::Like }
    }

    pub fn liked_after(self) -> bool {
        matches!(self, Direction::Like)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Like => f.write_str("like"),
            Direction::Unlike => f.write_str("unlike"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Pending(Direction),
}

/// Count and flag captured right before an optimistic flip. A failed toggle restores exactly this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub count: u64,
    pub liked: bool,
}

/// A status answer that came back while a toggle was still waiting. It only counts if that toggle fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ParkedStatus {
    pub liked: bool,
    /// The server said so, as opposed to the local shadow.
    pub from_remote: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ViewState {
    pub count: u64,
    pub liked: bool,
    pub phase: Phase,
    /// Bumped every time the server confirms a toggle. Status replies issued under an older value are stale.
    pub confirmed_toggles: u64,
    pub status_query_in_flight: bool,
    pub parked_status: Option<ParkedStatus>,
    /// The shadow as it was before the pending toggle mirrored its optimistic flag.
    pub shadow_before_toggle: Option<bool>,
}

impl ViewState {
    pub fn new(count: u64) -> Self {
        Self {
            count,
            liked: false,
            phase: Phase::Idle,
            confirmed_toggles: 0,
            status_query_in_flight: false,
            parked_status: None,
            shadow_before_toggle: None,
        }
    }

    pub fn view(&self) -> ReactionView {
        ReactionView {
            count: self.count,
            liked: self.liked,
            pending: self.phase != Phase::Idle,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            count: self.count,
            liked: self.liked,
        }
    }

    /// Flip the flag and move the count with it. Returns the direction taken.
    pub fn apply_optimistic(&mut self) -> Direction {
        let direction = Direction::from_liked(self.liked);
        match direction {
            Direction::Like => self.count = self.count.saturating_add(1),
            // a liked entity with a zero count means the cached count was stale; don't wrap
            Direction::Unlike => self.count = self.count.saturating_sub(1),
        }
        self.liked = direction.liked_after();
        self.phase = Phase::Pending(direction);
        direction
    }

    /// The server's answer is newer than any status reply still out, parked or not.
    pub fn confirm(&mut self, count: u64, liked: bool) {
        self.count = count;
        self.liked = liked;
        self.phase = Phase::Idle;
        self.confirmed_toggles += 1;
        self.parked_status = None;
    }

    /// Restore the snapshot, then apply a status answer parked during the toggle. Returns that answer.
    pub fn revert(&mut self, snapshot: Snapshot) -> Option<ParkedStatus> {
        self.count = snapshot.count;
        self.liked = snapshot.liked;
        self.phase = Phase::Idle;
        let parked = self.parked_status.take();
        if let Some(parked) = parked {
            self.liked = parked.liked;
        }
        parked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimistic_like_then_revert() {
        let mut state = ViewState::new(5);
        let before = state.snapshot();

        assert_eq!(state.apply_optimistic(), Direction::Like);
        assert_eq!(
            state.view(),
            ReactionView {
                count: 6,
                liked: true,
                pending: true
            }
        );

        state.revert(before);
        assert_eq!(
            state.view(),
            ReactionView {
                count: 5,
                liked: false,
                pending: false
            }
        );
    }

    #[test]
    fn unlike_from_zero_saturates_and_reverts_exactly() {
        let mut state = ViewState::new(0);
        state.liked = true;
        let before = state.snapshot();

        assert_eq!(state.apply_optimistic(), Direction::Unlike);
        assert_eq!(state.count, 0);
        assert!(!state.liked);

        state.revert(before);
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn only_confirmed_toggles_are_counted() {
        let mut state = ViewState::new(1);
        let before = state.snapshot();
        state.apply_optimistic();
        state.revert(before);
        assert_eq!(state.confirmed_toggles, 0);

        state.apply_optimistic();
        state.confirm(2, true);
        state.apply_optimistic();
        assert_eq!(state.confirmed_toggles, 1);
        assert_eq!(state.phase, Phase::Pending(Direction::Unlike));
    }

    #[test]
    fn revert_applies_a_parked_status() {
        let mut state = ViewState::new(5);
        let before = state.snapshot();
        state.apply_optimistic();
        let parked = ParkedStatus {
            liked: true,
            from_remote: true,
        };
        state.parked_status = Some(parked);

        assert_eq!(state.revert(before), Some(parked));
        assert_eq!(
            state.view(),
            ReactionView {
                count: 5,
                liked: true,
                pending: false
            }
        );
        assert_eq!(state.parked_status, None);
    }

    #[test]
    fn confirm_discards_a_parked_status() {
        let mut state = ViewState::new(5);
        state.apply_optimistic();
        state.parked_status = Some(ParkedStatus {
            liked: false,
            from_remote: true,
        });

        state.confirm(6, true);
        assert_eq!(state.parked_status, None);
        assert!(state.view().liked);
    }

    #[test]
    fn view_serializes_camel_case() {
        let view = ViewState::new(3).view();
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            serde_json::json!({"count": 3, "liked": false, "pending": false})
        );
    }
}
