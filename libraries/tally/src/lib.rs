//! Like counters that feel instant but stay honest.
//!
//! Each likeable thing on the site (a blog post, a project) gets a [`ReactionSynchronizer`]. It keeps two pieces of
//! view state, the like count and whether *this viewer* has liked it, and keeps them consistent with a remote
//! service that owns the truth.
//!
//! Strategy:
//! 1. On display, the count comes from whatever the page was rendered with and `liked` starts out false. A status
//!    query then asks the server whether this viewer has liked the entity. If the server can't be reached, a local
//!    shadow flag written on earlier visits is used instead.
//! 2. On click, the view flips immediately (count ±1), the shadow flag is written through, and the toggle is sent.
//!    The server's reply overwrites both the count and the flag. A failure puts back the exact pre-click snapshot.
//! 3. Only one toggle may be in flight per entity. A status reply that arrives after a toggle started is stale and
//!    gets dropped.
//!
//! Blog posts are scoped to the viewer's network address, which the server works out on its own. Projects are scoped
//! to a visitor token generated once per browser and kept in local storage.

pub mod data_model;

pub use data_model::*;
