//! Backend-agnostic records returned by the facades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::facade::excerpt::derive_excerpt;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Caller-supplied fields for create and update. Anything left `None` gets a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// The parts of a post a draft decides: title, content, excerpt, cover image and tags.
    pub(crate) fn resolve(self, excerpt_length: usize) -> ResolvedDraft {
        let content = self.content.unwrap_or_default();
        let excerpt = match self.excerpt {
            Some(excerpt) if !excerpt.is_empty() => excerpt,
            _ => derive_excerpt(&content, excerpt_length),
        };
        let title = match self.title {
            Some(title) if !title.is_empty() => title,
            _ => "Untitled".to_string(),
        };

        ResolvedDraft {
            title,
            content,
            excerpt,
            cover_image: self.cover_image.filter(|c| !c.is_empty()),
            tags: dedup_tags(self.tags.unwrap_or_default()),
        }
    }
}

pub(crate) struct ResolvedDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
}

impl ResolvedDraft {
    pub(crate) fn into_post(self, id: String, author: User, created_at: DateTime<Utc>) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            author,
            created_at,
            updated_at: Utc::now(),
            cover_image: self.cover_image,
            tags: self.tags,
        }
    }
}

/// Drop repeated tags, keeping the first occurrence.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}
