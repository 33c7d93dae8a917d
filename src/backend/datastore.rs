//! Data owned by one simulated provider.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::facade::{Post, User};
use crate::store::file::write_json_atomic;
use crate::store::StoreResult;

/// A user row with its password digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub user: User,
    pub password_sha256: String,
}

impl StoredUser {
    pub fn new(user: User, password: &str) -> Self {
        Self {
            user,
            password_sha256: digest_password(password),
        }
    }

    pub fn password_matches(&self, password: &str) -> bool {
        self.password_sha256 == digest_password(password)
    }
}

fn digest_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// On-disk shape.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    users: BTreeMap<String, StoredUser>,
    sessions: BTreeMap<String, String>,
    posts: BTreeMap<String, Post>,
}

/// Users, sessions and posts of a provider.
#[derive(Debug, Default)]
pub struct Datastore {
    /// Keyed by lowercased email.
    users: DashMap<String, StoredUser>,
    /// Token -> lowercased email.
    sessions: DashMap<String, String>,
    posts: DashMap<String, Post>,
    persistence_path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl Datastore {
    /// An in-memory datastore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a datastore persisted at `path`, loading it if the file exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            persistence_path: Some(path.clone()),
            ..Default::default()
        };

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;
            for (k, v) in snapshot.users {
                store.users.insert(k, v);
            }
            for (k, v) in snapshot.sessions {
                store.sessions.insert(k, v);
            }
            for (k, v) in snapshot.posts {
                store.posts.insert(k, v);
            }
            tracing::info!(
                path = %path.display(),
                users = store.users.len(),
                posts = store.posts.len(),
                "Loaded backend data"
            );
        }
        Ok(store)
    }

    /// Persist to disk when a path is configured.
    fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = Snapshot {
            users: self.users.iter().map(|r| (r.key().clone(), r.value().clone())).collect(),
            sessions: self.sessions.iter().map(|r| (r.key().clone(), r.value().clone())).collect(),
            posts: self.posts.iter().map(|r| (r.key().clone(), r.value().clone())).collect(),
        };
        write_json_atomic(path, &snapshot)
    }

    // --- Users ---

    pub fn find_user(&self, email: &str) -> Option<StoredUser> {
        self.users.get(&email_key(email)).map(|r| r.value().clone())
    }

    /// Insert a user. Returns `false` without touching anything if the email is taken.
    pub fn insert_user(&self, stored: StoredUser) -> StoreResult<bool> {
        use dashmap::mapref::entry::Entry;

        match self.users.entry(email_key(&stored.user.email)) {
            Entry::Occupied(_) => return Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(stored);
            }
        }
        self.save()?;
        Ok(true)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // --- Sessions ---

    pub fn open_session(&self, token: &str, email: &str) -> StoreResult<()> {
        self.sessions.insert(token.to_string(), email_key(email));
        self.save()
    }

    pub fn close_session(&self, token: &str) -> StoreResult<()> {
        if self.sessions.remove(token).is_some() {
            self.save()?;
        }
        Ok(())
    }

    /// The user a token belongs to.
    pub fn session_user(&self, token: &str) -> Option<User> {
        let email = self.sessions.get(token)?.value().clone();
        self.users.get(&email).map(|r| r.value().user.clone())
    }

    // --- Posts ---

    /// Every post, oldest first, ties broken by id.
    pub fn list_posts(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.iter().map(|r| r.value().clone()).collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        posts
    }

    pub fn get_post(&self, id: &str) -> Option<Post> {
        self.posts.get(id).map(|r| r.value().clone())
    }

    pub fn put_post(&self, post: Post) -> StoreResult<()> {
        self.posts.insert(post.id.clone(), post);
        self.save()
    }

    /// Returns whether the post existed.
    pub fn remove_post(&self, id: &str) -> StoreResult<bool> {
        let existed = self.posts.remove(id).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(email: &str) -> User {
        User {
            id: format!("id-{}", email),
            name: "Test".into(),
            email: email.into(),
            avatar: None,
        }
    }

    fn post(id: &str, offset_secs: i64) -> Post {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Post {
            id: id.into(),
            title: id.into(),
            content: String::new(),
            excerpt: String::new(),
            author: user("a@example.com"),
            created_at: at,
            updated_at: at,
            cover_image: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_user_lookup_is_case_insensitive() {
        let store = Datastore::new();
        assert!(store.insert_user(StoredUser::new(user("Ada@Example.com"), "pw")).unwrap());
        assert!(!store.insert_user(StoredUser::new(user("ada@example.com"), "other")).unwrap());

        let found = store.find_user("ADA@example.com").unwrap();
        assert!(found.password_matches("pw"));
        assert!(!found.password_matches("other"));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_sessions() {
        let store = Datastore::new();
        store.insert_user(StoredUser::new(user("a@example.com"), "pw")).unwrap();
        store.open_session("tok", "a@example.com").unwrap();
        assert_eq!(store.session_user("tok").unwrap().email, "a@example.com");

        store.close_session("tok").unwrap();
        assert!(store.session_user("tok").is_none());
    }

    #[test]
    fn test_posts_are_listed_oldest_first() {
        let store = Datastore::new();
        store.put_post(post("b", 10)).unwrap();
        store.put_post(post("a", 20)).unwrap();
        store.put_post(post("c", 0)).unwrap();

        let ids: Vec<String> = store.list_posts().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        assert!(store.remove_post("b").unwrap());
        assert!(!store.remove_post("b").unwrap());
        assert_eq!(store.list_posts().len(), 2);
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primary.json");

        let store = Datastore::open(&path).unwrap();
        store.insert_user(StoredUser::new(user("a@example.com"), "pw")).unwrap();
        store.open_session("tok", "a@example.com").unwrap();
        store.put_post(post("p1", 0)).unwrap();
        drop(store);

        let loaded = Datastore::open(&path).unwrap();
        assert_eq!(loaded.session_user("tok").unwrap().email, "a@example.com");
        assert_eq!(loaded.get_post("p1").unwrap().title, "p1");
    }
}
