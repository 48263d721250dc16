use reqwest::Url;
use serde::de::DeserializeOwned;
use tally::{EntityRef, LikeStatus, ReactionService, ToggleReceipt, Viewer, VisitorToken};

use crate::forms::{ContactMessage, NewComment, Submissions};
use crate::models::{BlogPost, Comment, GalleryItem};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid API url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Malformed(String),
}

#[derive(serde::Serialize)]
struct VisitorBody<'a> {
    visitor_id: &'a VisitorToken,
}

/// Client for the portfolio backend. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    api_base_url: String,
}

impl ApiClient {
    pub fn new(api_base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let url = format!("{}{path}", self.api_base_url);
        Url::parse(&url).map_err(|e| ApiError::InvalidUrl {
            url,
            reason: e.to_string(),
        })
    }

    pub(crate) fn like_status_url(&self, entity: &EntityRef, viewer: &Viewer) -> Result<Url, ApiError> {
        let mut url = self.url(&entity.status_path())?;
        if let Some(token) = viewer.visitor_token() {
            url.query_pairs_mut().append_pair("visitor_id", token.as_str());
        }
        Ok(url)
    }

    pub async fn fetch_blogs(&self) -> Result<Vec<BlogPost>, ApiError> {
        self.get_json("/api/blogs/").await
    }

    pub async fn fetch_blog(&self, id: u64) -> Result<BlogPost, ApiError> {
        self.get_json(&format!("/api/blog/{id}/")).await
    }

    /// Projects featured on the home page.
    pub async fn fetch_projects(&self) -> Result<Vec<GalleryItem>, ApiError> {
        self.get_json("/api/project/").await
    }

    pub async fn fetch_gallery(&self) -> Result<Vec<GalleryItem>, ApiError> {
        self.get_json("/api/gallery/").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.client.get(self.url(path)?).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Rejected {
        status: status.as_u16(),
        body,
    })
}

impl ReactionService for ApiClient {
    type Error = ApiError;

    async fn like_status(&self, entity: &EntityRef, viewer: &Viewer) -> Result<LikeStatus, ApiError> {
        let url = self.like_status_url(entity, viewer)?;
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn toggle_like(&self, entity: &EntityRef, viewer: &Viewer) -> Result<ToggleReceipt, ApiError> {
        let request = self.client.post(self.url(&entity.toggle_path())?);
        let request = match viewer.visitor_token() {
            Some(visitor_id) => request.json(&VisitorBody { visitor_id }),
            None => request,
        };
        read_json(request.send().await?).await
    }
}

impl Submissions for ApiClient {
    async fn create_comment(&self, post_id: u64, comment: &NewComment) -> Result<Comment, ApiError> {
        let url = self.url(&format!("/api/blog/{post_id}/comment/create/"))?;
        let response = self.client.post(url).json(comment).send().await?;
        read_json(response).await
    }

    async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
        let url = self.url("/api/contact/")?;
        let response = self.client.post(url).json(message).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blog_status_url_has_no_query() {
        let api = ApiClient::new("http://127.0.0.1:8000/");
        let url = api
            .like_status_url(&EntityRef::blog_post(7u64), &Viewer::NetworkAddress)
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/blog/7/like/");
    }

    #[test]
    fn project_status_url_carries_the_visitor_token() {
        let api = ApiClient::new("https://api.example.com");
        let token = VisitorToken::parse("6f9619ff-8b86-4d01-b42d-00c04fc964ff").unwrap();
        let url = api
            .like_status_url(&EntityRef::project(3u64), &Viewer::Visitor(token))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/project/3/like?visitor_id=6f9619ff-8b86-4d01-b42d-00c04fc964ff"
        );
    }

    #[test]
    fn toggle_body_is_the_visitor_id() {
        let token = VisitorToken::parse("6f9619ff-8b86-4d01-b42d-00c04fc964ff").unwrap();
        let body = serde_json::to_value(VisitorBody { visitor_id: &token }).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"visitor_id": "6f9619ff-8b86-4d01-b42d-00c04fc964ff"})
        );
    }

    #[test]
    fn bad_base_url_is_reported() {
        let api = ApiClient::new("not a url");
        let err = api
            .like_status_url(&EntityRef::blog_post(1u64), &Viewer::NetworkAddress)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }
}
