//! # ReactionService
//! The remote authority for like counts and per-viewer liked flags. This crate only consumes it; the HTTP client
//! lives with the frontend.

use std::fmt;

use crate::data_model::{EntityRef, Viewer};

/// Reply to a status query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LikeStatus {
    pub is_liked: bool,
}

/// Reply to a toggle. `message == "liked"` means the viewer now likes the entity; anything else means they don't.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToggleReceipt {
    pub total_like: u64,
    pub message: String,
}

impl ToggleReceipt {
    pub const LIKED: &'static str = "liked";

    pub fn liked(&self) -> bool {
        self.message == Self::LIKED
    }
}

/// Transport errors, non-success statuses and malformed bodies are all just `Err`: the synchronizer handles them
/// the same way.
#[allow(async_fn_in_trait)] // everything runs on the browser's single thread, futures need not be Send
pub trait ReactionService {
    type Error: fmt::Display;

    async fn like_status(&self, entity: &EntityRef, viewer: &Viewer) -> Result<LikeStatus, Self::Error>;

    async fn toggle_like(&self, entity: &EntityRef, viewer: &Viewer) -> Result<ToggleReceipt, Self::Error>;
}

impl<R: ReactionService + ?Sized> ReactionService for &R {
    type Error = R::Error;

    async fn like_status(&self, entity: &EntityRef, viewer: &Viewer) -> Result<LikeStatus, Self::Error> {
        (**self).like_status(entity, viewer).await
    }

    async fn toggle_like(&self, entity: &EntityRef, viewer: &Viewer) -> Result<ToggleReceipt, Self::Error> {
        (**self).toggle_like(entity, viewer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_message_decides_the_flag() {
        let receipt: ToggleReceipt =
            serde_json::from_str(r#"{"total_like": 6, "message": "liked"}"#).unwrap();
        assert!(receipt.liked());
        assert_eq!(receipt.total_like, 6);

        let receipt: ToggleReceipt =
            serde_json::from_str(r#"{"total_like": 5, "message": "unliked"}"#).unwrap();
        assert!(!receipt.liked());

        let receipt: ToggleReceipt =
            serde_json::from_str(r#"{"total_like": 5, "message": "Liked"}"#).unwrap();
        assert!(!receipt.liked());
    }

    #[test]
    fn negative_counts_are_malformed() {
        assert!(serde_json::from_str::<ToggleReceipt>(r#"{"total_like": -1, "message": "liked"}"#).is_err());
    }

    #[test]
    fn status_ignores_extra_fields() {
        let status: LikeStatus = serde_json::from_str(r#"{"is_liked": true, "ip": "10.0.0.1"}"#).unwrap();
        assert!(status.is_liked);
    }
}
