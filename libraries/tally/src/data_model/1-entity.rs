//! # Entity
//! A likeable entity is identified by its kind and an id that is unique within that kind.
//! The kind is a plain descriptor rather than a trait: it carries the endpoint templates and says how the viewer is
//! identified, which is everything that differs between blog posts and projects.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        EntityId::Number(id)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId::Number(id.into())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Text(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Text(id.to_string())
    }
}

/// How the server tells one viewer's like apart from another's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewerScoping {
    /// The server keys likes by the request's network address. Nothing is sent.
    NetworkAddress,
    /// The client sends its persisted visitor token with every request.
    VisitorToken,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityKind {
    /// Short name used in shadow-flag keys and logs.
    pub slug: &'static str,
    /// Path of the status query, relative to the API base. `{id}` is replaced by the entity id.
    pub status_path: &'static str,
    /// Path of the toggle request, relative to the API base. `{id}` is replaced by the entity id.
    pub toggle_path: &'static str,
    pub viewer_scoping: ViewerScoping,
}

impl EntityKind {
    pub const BLOG_POST: EntityKind = EntityKind {
        slug: "blog",
        status_path: "/api/blog/{id}/like/",
        toggle_path: "/api/blog/{id}/like/",
        viewer_scoping: ViewerScoping::NetworkAddress,
    };

    // The status and toggle routes really do live under different prefixes on the backend.
    pub const PROJECT: EntityKind = EntityKind {
        slug: "project",
        status_path: "/api/project/{id}/like",
        toggle_path: "/api/gallery/{id}/like/",
        viewer_scoping: ViewerScoping::VisitorToken,
    };

    pub const ALL: [EntityKind; 2] = [EntityKind::BLOG_POST, EntityKind::PROJECT];

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug == slug)
    }

    pub fn status_path_for(&self, id: &EntityId) -> String {
        self.status_path.replace("{id}", &id.to_string())
    }

    pub fn toggle_path_for(&self, id: &EntityId) -> String {
        self.toggle_path.replace("{id}", &id.to_string())
    }

    /// Key of the local "liked" shadow flag, e.g. `liked_blog_12`.
    pub fn shadow_key_for(&self, id: &EntityId) -> String {
        format!("liked_{}_{id}", self.slug)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<EntityId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn blog_post(id: impl Into<EntityId>) -> Self {
        Self::new(EntityKind::BLOG_POST, id)
    }

    pub fn project(id: impl Into<EntityId>) -> Self {
        Self::new(EntityKind::PROJECT, id)
    }

    pub fn status_path(&self) -> String {
        self.kind.status_path_for(&self.id)
    }

    pub fn toggle_path(&self) -> String {
        self.kind.toggle_path_for(&self.id)
    }

    pub fn shadow_key(&self) -> String {
        self.kind.shadow_key_for(&self.id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.slug, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blog_paths() {
        let post = EntityRef::blog_post(12u64);
        assert_eq!(post.status_path(), "/api/blog/12/like/");
        assert_eq!(post.toggle_path(), "/api/blog/12/like/");
        assert_eq!(post.shadow_key(), "liked_blog_12");
    }

    #[test]
    fn project_paths() {
        let project = EntityRef::project(3u64);
        assert_eq!(project.status_path(), "/api/project/3/like");
        assert_eq!(project.toggle_path(), "/api/gallery/3/like/");
        assert_eq!(project.shadow_key(), "liked_project_3");
    }

    #[test]
    fn text_ids_render_verbatim() {
        let post = EntityRef::blog_post("hello-world");
        assert_eq!(post.status_path(), "/api/blog/hello-world/like/");
        assert_eq!(post.to_string(), "blog hello-world");
    }

    #[test]
    fn kinds_round_trip_through_slugs() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_slug(kind.slug), Some(kind));
        }
        assert_eq!(EntityKind::from_slug("comment"), None);
    }

    #[test]
    fn ids_deserialize_from_numbers_or_strings() {
        let n: EntityId = serde_json::from_str("7").unwrap();
        let s: EntityId = serde_json::from_str("\"seven\"").unwrap();
        assert_eq!(n, EntityId::Number(7));
        assert_eq!(s, EntityId::Text("seven".to_string()));
    }
}
