//! # Visitor
//! Projects scope likes to a visitor token rather than a network address, so the same browser keeps its likes when
//! it changes networks. The token is created the first time it is needed and then lives in storage until the user
//! clears site data. It is never rotated here.

use std::cell::OnceCell;

pub use eyedee::VisitorToken;

use crate::data_model::{EntityKind, KeyValueStore, ViewerScoping};

pub const VISITOR_KEY: &str = "visitor_id";

#[derive(Debug)]
pub struct VisitorIdentity<S> {
    store: S,
    token: OnceCell<VisitorToken>,
}

impl<S: KeyValueStore> VisitorIdentity<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            token: OnceCell::new(),
        }
    }

    /// Returns the persisted token, creating and persisting one if there isn't a usable one yet.
    ///
    /// If storage is broken the fresh token is still returned and remembered for the lifetime of this provider, so
    /// repeated calls agree with each other even when nothing could be written.
    pub fn get_or_create(&self) -> VisitorToken {
        self.token
            .get_or_init(|| {
                match self.store.get(VISITOR_KEY) {
                    Ok(Some(raw)) => {
                        if let Some(token) = VisitorToken::parse(&raw) {
                            return token;
                        }
                        log::warn!("Discarding malformed visitor token {raw:?}");
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("Could not read visitor token: {e}"),
                }

                let token = VisitorToken::generate();
                log::info!("Created visitor token {token}");
                if let Err(e) = self.store.set(VISITOR_KEY, token.as_str()) {
                    log::warn!("Could not persist visitor token: {e}");
                }
                token
            })
            .clone()
    }
}

/// Who is asking, as far as the reaction service is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Viewer {
    NetworkAddress,
    Visitor(VisitorToken),
}

impl Viewer {
    /// Only touches the identity provider (and so only creates a token) when the kind actually needs one.
    pub fn for_kind<S: KeyValueStore>(kind: &EntityKind, identity: &VisitorIdentity<S>) -> Self {
        match kind.viewer_scoping {
            ViewerScoping::NetworkAddress => Viewer::NetworkAddress,
            ViewerScoping::VisitorToken => Viewer::Visitor(identity.get_or_create()),
        }
    }

    pub fn visitor_token(&self) -> Option<&VisitorToken> {
        match self {
            Viewer::NetworkAddress => None,
            Viewer::Visitor(token) => Some(token),
        }
    }
}
