mod api;
mod config;
mod forms;
mod media;
mod models;
mod storage;
#[cfg(target_arch = "wasm32")]
mod utils;

use std::cell::RefCell;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use tally::{EntityId, EntityKind, EntityRef, ListenerKey, ReactionSynchronizer, ReactionView};
use wasm_bindgen::prelude::*;

pub use api::{ApiClient, ApiError};
pub use config::{SiteConfig, site_config};
pub use forms::{
    CommentThread, ContactForm, ContactMessage, FormError, NewComment, SubmissionStatus, Submissions,
};
pub use media::{Placeholder, image_url, resolve_image};
pub use models::{
    BlogIndex, BlogPost, Comment, GalleryItem, avatar_initial, blog_excerpt, display_date, format_date,
    project_year, read_time, split_tech_stack, strip_tags, viewer_offset, year_label,
};
pub use storage::BrowserStorage;

use crate::config::CONFIG;

// every like button on a page constructs its own LikeCounter, so this has to be a static
static LOGGER: LazyLock<()> = LazyLock::new(|| {
    LOGGER_INSTALLS.fetch_add(1, Ordering::Relaxed);

    #[cfg(target_arch = "wasm32")]
    {
        utils::set_panic_hook();
        wasm_logger::init(wasm_logger::Config::default());
        log::info!("Logging initialized");
    }
});

static LOGGER_INSTALLS: AtomicUsize = AtomicUsize::new(0);

fn init_logging() {
    LazyLock::force(&LOGGER);
}

fn api() -> ApiClient {
    ApiClient::new(&CONFIG.api_base_url)
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Ids come over from JS as strings; numeric ones are kept numeric.
fn entity_id(id: String) -> EntityId {
    id.parse::<u64>().map(EntityId::Number).unwrap_or(EntityId::Text(id))
}

fn clamp_count(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// The like button of one blog post or project.
#[wasm_bindgen]
pub struct LikeCounter {
    sync: ReactionSynchronizer<ApiClient, BrowserStorage>,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl LikeCounter {
    /// `kind` is `"blog"` or `"project"`; `count` is the like count the entity was fetched with.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(kind: &str, id: String, count: u32) -> Result<LikeCounter, JsValue> {
        init_logging();

        let kind = EntityKind::from_slug(kind)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown likeable kind {kind:?}")))?;
        let entity = EntityRef::new(kind, entity_id(id));

        Ok(Self {
            sync: ReactionSynchronizer::connect(
                entity,
                count.into(),
                api(),
                BrowserStorage::local(),
            ),
        })
    }

    /// Reconcile `liked` with the server. Call once after the first render; it does not block it.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn initialize(&self) -> ReactionView {
        let reconciliation = self.sync.initialize().await;
        log::debug!("Like status for {}: {reconciliation:?}", self.sync.entity());
        self.sync.view()
    }

    /// Rejects while an earlier toggle is still out; check `pending` to disable the button instead.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn toggle(&self) -> Result<ReactionView, JsValue> {
        self.sync
            .toggle()
            .await
            .map(|outcome| outcome.view())
            .map_err(js_error)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn count(&self) -> u32 {
        clamp_count(self.sync.view().count)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn liked(&self) -> bool {
        self.sync.view().liked
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn pending(&self) -> bool {
        self.sync.is_pending()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn view(&self) -> ReactionView {
        self.sync.view()
    }

    /// `callback` receives the new view (`{ count, liked, pending }`) after every change.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn subscribe(&self, callback: js_sys::Function) -> ListenerKey {
        self.sync.subscribe(move |view| {
            #[cfg(target_arch = "wasm32")]
            {
                let this = JsValue::null();
                match serde_wasm_bindgen::to_value(&view) {
                    Ok(view) => {
                        let _ = callback.call1(&this, &view);
                    }
                    Err(e) => log::error!("Could not hand like state to JS: {e:?}"),
                }
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = (&callback, view);
            }
        })
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn unsubscribe(&self, key: ListenerKey) {
        self.sync.unsubscribe(key)
    }
}

/// Comments under a blog post and the form for adding one.
#[wasm_bindgen]
pub struct CommentSection {
    // never hold a borrow across an .await
    thread: RefCell<CommentThread>,
    api: ApiClient,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl CommentSection {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(post: BlogPost) -> CommentSection {
        init_logging();
        Self {
            thread: RefCell::new(CommentThread::new(&post)),
            api: api(),
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_draft(&self, draft: NewComment) {
        *self.thread.borrow_mut().draft_mut() = draft;
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn draft(&self) -> NewComment {
        self.thread.borrow().draft().clone()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn status(&self) -> SubmissionStatus {
        self.thread.borrow().status()
    }

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen]
    pub fn comments(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.thread.borrow().comments()).map_err(Into::into)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn submit(&self) -> Result<SubmissionStatus, JsValue> {
        let (post_id, comment) = {
            let mut thread = self.thread.borrow_mut();
            (thread.post_id(), thread.begin_submit().map_err(js_error)?)
        };

        let result = self.api.create_comment(post_id, &comment).await;

        let mut thread = self.thread.borrow_mut();
        thread.finish_submit(result);
        Ok(thread.status())
    }
}

#[wasm_bindgen]
pub struct ContactSection {
    form: RefCell<ContactForm>,
    api: ApiClient,
}

impl Default for ContactSection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl ContactSection {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new() -> ContactSection {
        init_logging();
        Self {
            form: RefCell::new(ContactForm::new()),
            api: api(),
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_draft(&self, draft: ContactMessage) {
        *self.form.borrow_mut().draft_mut() = draft;
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn draft(&self) -> ContactMessage {
        self.form.borrow().draft().clone()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn status(&self) -> SubmissionStatus {
        self.form.borrow().status()
    }

    /// Call once the success notice has been on screen long enough.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn acknowledge(&self) {
        self.form.borrow_mut().acknowledge();
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn submit(&self) -> Result<SubmissionStatus, JsValue> {
        let message = self.form.borrow_mut().begin_submit().map_err(js_error)?;

        let result = self.api.send_contact(&message).await;

        let mut form = self.form.borrow_mut();
        form.finish_submit(result);
        Ok(form.status())
    }
}

// =======
// read-only page data. failures are logged and rendered as "nothing to show"
// =======

#[cfg(target_arch = "wasm32")]
fn to_js_list<T: serde::Serialize>(what: &str, result: Result<Vec<T>, ApiError>) -> JsValue {
    let items = result
        .inspect_err(|e| log::error!("Failed to fetch {what}: {e}"))
        .unwrap_or_default();
    serde_wasm_bindgen::to_value(&items).unwrap_or(JsValue::NULL)
}

/// The blog index, newest post featured. Both parts are empty when the list can't be loaded.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn fetch_blog_index() -> JsValue {
    init_logging();
    let posts = api()
        .fetch_blogs()
        .await
        .inspect_err(|e| log::error!("Failed to fetch blogs: {e}"))
        .unwrap_or_default();
    serde_wasm_bindgen::to_value(&BlogIndex::split(posts)).unwrap_or(JsValue::NULL)
}

/// `null` when the post doesn't exist or can't be loaded.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn fetch_blog(id: u32) -> JsValue {
    init_logging();
    match api().fetch_blog(id.into()).await {
        Ok(post) => serde_wasm_bindgen::to_value(&post).unwrap_or(JsValue::NULL),
        Err(e) => {
            log::error!("Error fetching blog post {id}: {e}");
            JsValue::NULL
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn fetch_projects() -> JsValue {
    init_logging();
    to_js_list("projects", api().fetch_projects().await)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn fetch_gallery() -> JsValue {
    init_logging();
    to_js_list("gallery items", api().fetch_gallery().await)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_stay_numeric() {
        assert_eq!(entity_id("12".to_string()), EntityId::Number(12));
        assert_eq!(entity_id("my-post".to_string()), EntityId::Text("my-post".to_string()));
        assert_eq!(entity_id("-1".to_string()), EntityId::Text("-1".to_string()));
    }

    #[test]
    fn logger_is_installed_once() {
        init_logging();
        init_logging();
        init_logging();
        assert_eq!(LOGGER_INSTALLS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn counts_clamp_for_js() {
        assert_eq!(clamp_count(42), 42);
        assert_eq!(clamp_count(u64::MAX), u32::MAX);
    }
}
