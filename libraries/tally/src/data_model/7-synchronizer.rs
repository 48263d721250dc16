//! # ReactionSynchronizer
//! Optimistic like toggles for one entity, reconciled with the reaction service and mirrored into the flag store.
//!
//! A status reply is dropped only when a toggle was confirmed after the query went out. A reply that lands while a
//! toggle is still pending is parked and takes effect only if that toggle fails.

use std::cell::RefCell;
use std::rc::Rc;

use crate::data_model::{
    Direction, EntityRef, FlagStore, KeyValueStore, ListenerKey, ParkedStatus, Phase, ReactionService,
    ReactionView, Viewer, ViewState, VisitorIdentity,
};

/// Where `liked` came from once a status query settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// The server answered.
    Remote,
    /// The server didn't answer and the local shadow said "liked".
    Shadow,
    /// The server didn't answer and there was no shadow, so `liked` stayed false.
    Unknown,
    /// A toggle was confirmed while the query was out; its answer was dropped.
    Superseded,
    /// A toggle was still pending when the answer came back. It is applied if that toggle fails.
    Parked,
    /// Another status query for this entity was still outstanding; nothing was sent.
    AlreadyQuerying,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the toggle. The view now holds its count and flag.
    Confirmed(ReactionView),
    /// The request failed. The view is back to exactly what it was before the click.
    Reverted(ReactionView),
}

impl ToggleOutcome {
    pub fn view(&self) -> ReactionView {
        match self {
            ToggleOutcome::Confirmed(view) | ToggleOutcome::Reverted(view) => *view,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleError {
    #[error("an earlier {0} is still waiting on the server")]
    InFlight(Direction),
}

type Listener = Rc<dyn Fn(ReactionView)>;

/// Keeps one entity's like count and liked flag in step with the reaction service.
///
/// All state sits behind a `RefCell` and no borrow is held across an `.await`, so listeners and interleaved calls on
/// the same thread can't trip a "borrow while locked" panic.
pub struct ReactionSynchronizer<R, S> {
    entity: EntityRef,
    viewer: Viewer,
    remote: R,
    flags: FlagStore<S>,
    state: RefCell<ViewState>,
    listeners: RefCell<slotmap::SlotMap<slotmap::DefaultKey, Listener>>,
}

impl<R: ReactionService, S: KeyValueStore> ReactionSynchronizer<R, S> {
    /// `count` is the cached aggregate the entity was rendered with. `liked` starts out false until
    /// [`initialize`](Self::initialize) settles.
    pub fn new(entity: EntityRef, count: u64, viewer: Viewer, remote: R, flags: FlagStore<S>) -> Self {
        Self {
            entity,
            viewer,
            remote,
            flags,
            state: RefCell::new(ViewState::new(count)),
            listeners: RefCell::new(slotmap::SlotMap::new()),
        }
    }

    /// Builds the viewer and the flag store from one shared storage handle. A visitor token is only created for
    /// kinds that are scoped by one.
    pub fn connect(entity: EntityRef, count: u64, remote: R, store: S) -> Self
    where
        S: Clone,
    {
        let viewer = Viewer::for_kind(&entity.kind, &VisitorIdentity::new(store.clone()));
        Self::new(entity, count, viewer, remote, FlagStore::new(store))
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn view(&self) -> ReactionView {
        self.state.borrow().view()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    /// While this is true, [`toggle`](Self::toggle) refuses to run. Use it to disable the control.
    pub fn is_pending(&self) -> bool {
        self.phase() != Phase::Idle
    }

    /// The listener is invoked with the new view after every change.
    pub fn subscribe(&self, listener: impl Fn(ReactionView) + 'static) -> ListenerKey {
        ListenerKey(self.listeners.borrow_mut().insert(Rc::new(listener)))
    }

    pub fn unsubscribe(&self, key: ListenerKey) {
        self.listeners.borrow_mut().remove(key.0);
    }

    fn notify(&self) {
        let view = self.view();
        // collect first: listeners commonly call back into `view()` or even `toggle()`
        let listeners: Vec<Listener> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(view);
        }
    }

    /// Ask the server whether this viewer likes the entity and overwrite `liked` with the answer.
    ///
    /// When the server can't be reached the local shadow is used instead; `count` is left alone either way.
    pub async fn initialize(&self) -> Reconciliation {
        let (confirmed_toggles, shadow) = {
            let mut state = self.state.borrow_mut();
            if state.status_query_in_flight {
                return Reconciliation::AlreadyQuerying;
            }
            state.status_query_in_flight = true;
            // a pending toggle has already overwritten the shadow with its optimistic flag
            let shadow = match state.phase {
                Phase::Idle => self.flags.get(&self.entity),
                Phase::Pending(_) => state.shadow_before_toggle,
            };
            (state.confirmed_toggles, shadow)
        };

        let result = self.remote.like_status(&self.entity, &self.viewer).await;

        let reconciliation = {
            let mut state = self.state.borrow_mut();
            state.status_query_in_flight = false;

            if state.confirmed_toggles != confirmed_toggles {
                log::debug!("Dropping like status for {}: a toggle was confirmed meanwhile", self.entity);
                return Reconciliation::Superseded;
            }

            let (liked, reconciliation) = match result {
                Ok(status) => (Some(status.is_liked), Reconciliation::Remote),
                Err(e) => {
                    log::error!("Failed to sync like status for {}: {e}", self.entity);
                    if shadow == Some(true) {
                        (Some(true), Reconciliation::Shadow)
                    } else {
                        (None, Reconciliation::Unknown)
                    }
                }
            };
            let Some(liked) = liked else {
                return Reconciliation::Unknown;
            };

            if let Phase::Pending(direction) = state.phase {
                log::debug!("Parking like status for {} until the pending {direction} settles", self.entity);
                state.parked_status = Some(ParkedStatus {
                    liked,
                    from_remote: reconciliation == Reconciliation::Remote,
                });
                return Reconciliation::Parked;
            }

            state.liked = liked;
            reconciliation
        };

        if reconciliation == Reconciliation::Remote {
            self.flags.mirror(&self.entity, self.view().liked);
        }
        self.notify();
        reconciliation
    }

    /// Flip the like, tell the server, and settle on whatever it says. On failure the pre-click state comes back.
    pub async fn toggle(&self) -> Result<ToggleOutcome, ToggleError> {
        let (before, direction) = {
            let mut state = self.state.borrow_mut();
            if let Phase::Pending(direction) = state.phase {
                return Err(ToggleError::InFlight(direction));
            }
            let before = state.snapshot();
            state.shadow_before_toggle = self.flags.get(&self.entity);
            (before, state.apply_optimistic())
        };
        log::debug!("Optimistic {direction} on {}", self.entity);
        self.flags.mirror(&self.entity, direction.liked_after());
        self.notify();

        let result = self.remote.toggle_like(&self.entity, &self.viewer).await;

        let (outcome, shadow) = {
            let mut state = self.state.borrow_mut();
            match result {
                Ok(receipt) => {
                    if receipt.liked() != direction.liked_after() {
                        log::info!(
                            "Server settled {} as {} after a {direction}",
                            self.entity,
                            receipt.message
                        );
                    }
                    state.confirm(receipt.total_like, receipt.liked());
                    (ToggleOutcome::Confirmed(state.view()), state.liked)
                }
                Err(e) => {
                    log::error!("Like request for {} failed, reverting: {e}", self.entity);
                    let shadow = match state.revert(before) {
                        Some(ParkedStatus {
                            liked,
                            from_remote: true,
                        }) => liked,
                        _ => state.shadow_before_toggle == Some(true),
                    };
                    (ToggleOutcome::Reverted(state.view()), shadow)
                }
            }
        };

        self.flags.mirror(&self.entity, shadow);
        self.notify();
        Ok(outcome)
    }
}
