//! Comment and contact forms. Failures are shown inline through [`SubmissionStatus`]; nothing here retries.

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::models::{BlogPost, Comment};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0:?} is not an email address")]
    InvalidEmail(String),
    #[error("a submission is already in progress")]
    Busy,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct NewComment {
    pub name: String,
    pub comment: String,
}

impl NewComment {
    /// Trimmed copy, or an error naming the first empty field.
    pub fn validated(&self) -> Result<NewComment, FormError> {
        let name = self.name.trim();
        let comment = self.comment.trim();
        if name.is_empty() {
            return Err(FormError::MissingField("name"));
        }
        if comment.is_empty() {
            return Err(FormError::MissingField("comment"));
        }
        Ok(NewComment {
            name: name.to_string(),
            comment: comment.to_string(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct ContactMessage {
    pub username: String,
    pub usermail: String,
    pub message: String,
}

impl ContactMessage {
    pub fn validated(&self) -> Result<ContactMessage, FormError> {
        let username = self.username.trim();
        let usermail = self.usermail.trim();
        let message = self.message.trim();
        if username.is_empty() {
            return Err(FormError::MissingField("name"));
        }
        if usermail.is_empty() {
            return Err(FormError::MissingField("email"));
        }
        match usermail.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(FormError::InvalidEmail(usermail.to_string())),
        }
        if message.is_empty() {
            return Err(FormError::MissingField("message"));
        }
        Ok(ContactMessage {
            username: username.to_string(),
            usermail: usermail.to_string(),
            message: message.to_string(),
        })
    }
}

/// The write endpoints behind the forms.
#[allow(async_fn_in_trait)]
pub trait Submissions {
    async fn create_comment(&self, post_id: u64, comment: &NewComment) -> Result<Comment, ApiError>;

    async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError>;
}

/// A post's comments plus the state of the "post a comment" form.
#[derive(Clone, Debug)]
pub struct CommentThread {
    post_id: u64,
    comments: Vec<Comment>,
    draft: NewComment,
    status: SubmissionStatus,
}

impl CommentThread {
    pub fn new(post: &BlogPost) -> Self {
        Self {
            post_id: post.id,
            comments: post.comments.clone(),
            draft: NewComment::default(),
            status: SubmissionStatus::Idle,
        }
    }

    /// Newest first.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn draft(&self) -> &NewComment {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut NewComment {
        &mut self.draft
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn post_id(&self) -> u64 {
        self.post_id
    }

    /// Validates the draft and moves to `Loading`. An invalid draft is refused before anything is sent and leaves
    /// the status alone.
    pub fn begin_submit(&mut self) -> Result<NewComment, FormError> {
        if self.status == SubmissionStatus::Loading {
            return Err(FormError::Busy);
        }
        let comment = self.draft.validated()?;
        self.status = SubmissionStatus::Loading;
        Ok(comment)
    }

    pub fn finish_submit(&mut self, result: Result<Comment, ApiError>) {
        match result {
            Ok(created) => {
                self.comments.insert(0, created);
                self.draft = NewComment::default();
                self.status = SubmissionStatus::Success;
            }
            Err(e) => {
                log::error!("Comment submission for post {} failed: {e}", self.post_id);
                self.status = SubmissionStatus::Error;
            }
        }
    }

    pub async fn submit(&mut self, api: &impl Submissions) -> Result<(), FormError> {
        let comment = self.begin_submit()?;
        let result = api.create_comment(self.post_id, &comment).await;
        self.finish_submit(result);
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ContactForm {
    draft: ContactMessage,
    status: SubmissionStatus,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ContactMessage {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ContactMessage {
        &mut self.draft
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Back to `Idle` once the success notice has been shown. Errors stay until the next submit.
    pub fn acknowledge(&mut self) {
        if self.status == SubmissionStatus::Success {
            self.status = SubmissionStatus::Idle;
        }
    }

    pub fn begin_submit(&mut self) -> Result<ContactMessage, FormError> {
        if self.status == SubmissionStatus::Loading {
            return Err(FormError::Busy);
        }
        let message = self.draft.validated()?;
        self.status = SubmissionStatus::Loading;
        Ok(message)
    }

    pub fn finish_submit(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.draft = ContactMessage::default();
                self.status = SubmissionStatus::Success;
            }
            Err(e) => {
                log::error!("Contact message failed: {e}");
                self.status = SubmissionStatus::Error;
            }
        }
    }

    pub async fn submit(&mut self, api: &impl Submissions) -> Result<(), FormError> {
        let message = self.begin_submit()?;
        let result = api.send_contact(&message).await;
        self.finish_submit(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{TimeZone, Utc};
    use futures::executor::block_on;

    use super::*;

    #[derive(Default)]
    struct FakeBackend {
        reject: bool,
        comments: RefCell<Vec<(u64, NewComment)>>,
        contacts: RefCell<Vec<ContactMessage>>,
    }

    impl Submissions for FakeBackend {
        async fn create_comment(&self, post_id: u64, comment: &NewComment) -> Result<Comment, ApiError> {
            if self.reject {
                return Err(ApiError::Rejected {
                    status: 400,
                    body: "{}".to_string(),
                });
            }
            self.comments.borrow_mut().push((post_id, comment.clone()));
            Ok(Comment {
                id: 99,
                name: comment.name.clone(),
                comment: comment.comment.clone(),
                posted_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            })
        }

        async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
            if self.reject {
                return Err(ApiError::Malformed("boom".to_string()));
            }
            self.contacts.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    fn post() -> BlogPost {
        BlogPost {
            id: 5,
            title: "t".to_string(),
            content: String::new(),
            image: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            total_like: 0,
            comments: vec![Comment {
                id: 1,
                name: "old".to_string(),
                comment: "first".to_string(),
                posted_at: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
            }],
        }
    }

    #[test]
    fn new_comment_goes_on_top_and_clears_the_form() {
        let api = FakeBackend::default();
        let mut thread = CommentThread::new(&post());
        *thread.draft_mut() = NewComment {
            name: " Ada ".to_string(),
            comment: "Great read".to_string(),
        };

        block_on(thread.submit(&api)).unwrap();

        assert_eq!(thread.status(), SubmissionStatus::Success);
        assert_eq!(thread.comments()[0].id, 99);
        assert_eq!(thread.comments()[0].name, "Ada");
        assert_eq!(thread.comments().len(), 2);
        assert_eq!(thread.draft(), &NewComment::default());
        assert_eq!(api.comments.borrow()[0].0, 5);
    }

    #[test]
    fn empty_comment_is_not_sent() {
        let api = FakeBackend::default();
        let mut thread = CommentThread::new(&post());
        thread.draft_mut().name = "Ada".to_string();
        thread.draft_mut().comment = "   ".to_string();

        assert_eq!(
            block_on(thread.submit(&api)),
            Err(FormError::MissingField("comment"))
        );
        assert_eq!(thread.status(), SubmissionStatus::Idle);
        assert!(api.comments.borrow().is_empty());
    }

    #[test]
    fn rejected_comment_keeps_the_draft() {
        let api = FakeBackend {
            reject: true,
            ..Default::default()
        };
        let mut thread = CommentThread::new(&post());
        thread.draft_mut().name = "Ada".to_string();
        thread.draft_mut().comment = "hello".to_string();

        block_on(thread.submit(&api)).unwrap();
        assert_eq!(thread.status(), SubmissionStatus::Error);
        assert_eq!(thread.draft().comment, "hello");
        assert_eq!(thread.comments().len(), 1);
    }

    #[test]
    fn contact_success_clears_then_acknowledges() {
        let api = FakeBackend::default();
        let mut form = ContactForm::new();
        *form.draft_mut() = ContactMessage {
            username: "Grace".to_string(),
            usermail: "grace@example.com".to_string(),
            message: "Hello, I have a project idea".to_string(),
        };

        block_on(form.submit(&api)).unwrap();
        assert_eq!(form.status(), SubmissionStatus::Success);
        assert_eq!(form.draft(), &ContactMessage::default());
        assert_eq!(api.contacts.borrow().len(), 1);

        form.acknowledge();
        assert_eq!(form.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn contact_failure_is_shown_inline() {
        let api = FakeBackend {
            reject: true,
            ..Default::default()
        };
        let mut form = ContactForm::new();
        *form.draft_mut() = ContactMessage {
            username: "Grace".to_string(),
            usermail: "grace@example.com".to_string(),
            message: "hi".to_string(),
        };

        block_on(form.submit(&api)).unwrap();
        assert_eq!(form.status(), SubmissionStatus::Error);
        form.acknowledge();
        assert_eq!(form.status(), SubmissionStatus::Error);
        assert_eq!(form.draft().username, "Grace");
    }

    #[test]
    fn second_submit_while_loading_is_refused() {
        let mut thread = CommentThread::new(&post());
        thread.draft_mut().name = "Ada".to_string();
        thread.draft_mut().comment = "hello".to_string();

        let sent = thread.begin_submit().unwrap();
        assert_eq!(sent.comment, "hello");
        assert_eq!(thread.status(), SubmissionStatus::Loading);
        assert_eq!(thread.begin_submit(), Err(FormError::Busy));

        thread.finish_submit(Err(ApiError::Malformed("truncated".to_string())));
        assert_eq!(thread.status(), SubmissionStatus::Error);
        assert!(thread.begin_submit().is_ok());
    }

    #[test]
    fn contact_validation() {
        let message = ContactMessage {
            username: "Grace".to_string(),
            usermail: "grace.example.com".to_string(),
            message: "hi".to_string(),
        };
        assert_eq!(
            message.validated(),
            Err(FormError::InvalidEmail("grace.example.com".to_string()))
        );

        let message = ContactMessage {
            usermail: "grace@example.com".to_string(),
            message: String::new(),
            ..message
        };
        assert_eq!(message.validated(), Err(FormError::MissingField("message")));
    }
}
