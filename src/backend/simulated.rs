//! In-process provider implementing both facades.
//!
//! # Responsibilities
//! - Run every auth and content operation against this provider's datastore
//! - Route each remote step through the provider's link
//! - Read and write the session credential in the client store
//! - Convert every failure into an Envelope error

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::backend::datastore::{Datastore, StoredUser};
use crate::backend::link::SimulatedLink;
use crate::backend::BackendKind;
use crate::config::ProviderConfig;
use crate::facade::{
    AuthFacade, ContentFacade, Envelope, FacadeError, FacadeResult, Post, PostDraft,
    SessionCredential, User,
};
use crate::observability::metrics;
use crate::store::KeyValueStore;

/// One simulated provider.
pub struct SimulatedBackend {
    kind: BackendKind,
    /// Prefix of every identifier and token this provider issues.
    namespace: String,
    endpoint: String,
    api_key: Option<String>,
    link: Arc<SimulatedLink>,
    data: Arc<Datastore>,
    store: Arc<dyn KeyValueStore>,
    excerpt_length: usize,
}

impl std::fmt::Debug for SimulatedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedBackend")
            .field("kind", &self.kind)
            .field("namespace", &self.namespace)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl SimulatedBackend {
    /// Create a provider from its configuration.
    pub fn new(
        kind: BackendKind,
        config: &ProviderConfig,
        link: Arc<SimulatedLink>,
        data: Arc<Datastore>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            kind,
            namespace: config.name.clone(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            link,
            data,
            store,
            excerpt_length: 150,
        }
    }

    /// A provider with an instant link and in-memory data.
    pub fn in_memory(kind: BackendKind, namespace: &str, store: Arc<dyn KeyValueStore>) -> Self {
        let config = ProviderConfig {
            name: namespace.to_string(),
            endpoint: format!("http://{}.invalid", namespace),
            api_key: None,
            data_path: None,
        };
        Self::new(
            kind,
            &config,
            Arc::new(SimulatedLink::instant(kind)),
            Arc::new(Datastore::new()),
            store,
        )
    }

    pub fn with_excerpt_length(mut self, excerpt_length: usize) -> Self {
        self.excerpt_length = excerpt_length;
        self
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn link(&self) -> &Arc<SimulatedLink> {
        &self.link
    }

    pub fn datastore(&self) -> &Arc<Datastore> {
        &self.data
    }

    fn new_id(&self, entity: &str) -> String {
        format!("{}-{}-{}", self.namespace, entity, Uuid::new_v4().simple())
    }

    /// Log, count and wrap the outcome of an operation.
    fn finish<T>(&self, operation: &'static str, result: FacadeResult<T>) -> Envelope<T> {
        match &result {
            Ok(_) => {
                tracing::debug!(backend = %self.kind, operation, "Facade call succeeded");
                metrics::record_facade_call(self.kind, operation, "success");
            }
            Err(e) => {
                tracing::warn!(backend = %self.kind, operation, error = %e, "Facade call failed");
                metrics::record_facade_call(self.kind, operation, e.kind());
            }
        }
        result.into()
    }

    /// Issue a token for `user` and persist the credential.
    fn establish_session(&self, user: &User) -> FacadeResult<()> {
        let token = format!("{}-token-{}", self.namespace, Uuid::new_v4().simple());
        self.data.open_session(&token, &user.email)?;
        SessionCredential {
            token,
            issuer: self.kind,
        }
        .save(self.store.as_ref())?;
        tracing::info!(backend = %self.kind, user_id = %user.id, "Session established");
        Ok(())
    }

    /// Local half of the session check: a credential issued by this provider.
    fn local_credential(&self, missing: FacadeError) -> FacadeResult<SessionCredential> {
        let credential = SessionCredential::load(self.store.as_ref()).ok_or(missing)?;
        if credential.issuer != self.kind {
            return Err(FacadeError::ForeignSession(credential.issuer));
        }
        Ok(credential)
    }

    /// Full session check for content writes. Returns the acting user.
    async fn require_session(&self, operation: &'static str) -> FacadeResult<User> {
        let credential = self.local_credential(FacadeError::AuthRequired)?;
        self.link.transmit(operation).await?;
        self.data
            .session_user(&credential.token)
            .ok_or(FacadeError::AuthRequired)
    }

    // --- Auth ---

    async fn do_login(&self, email: &str, password: &str) -> FacadeResult<User> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(FacadeError::Validation("Email and password are required".into()));
        }
        self.link.transmit("login").await?;

        let user = match self.data.find_user(email) {
            Some(stored) if stored.password_matches(password) => stored.user,
            Some(_) => return Err(FacadeError::InvalidCredentials),
            None => self.provision(email, password)?,
        };
        self.establish_session(&user)?;
        Ok(user)
    }

    /// Create an account on first sign-in with an unknown email.
    fn provision(&self, email: &str, password: &str) -> FacadeResult<User> {
        let name = email.split('@').next().unwrap_or(email).to_string();
        let user = User {
            id: self.new_id("user"),
            name,
            email: email.to_string(),
            avatar: None,
        };
        if self.data.insert_user(StoredUser::new(user.clone(), password))? {
            tracing::info!(backend = %self.kind, user_id = %user.id, "Provisioned account on first login");
            return Ok(user);
        }
        // Lost a race with a concurrent registration of the same email.
        match self.data.find_user(email) {
            Some(stored) if stored.password_matches(password) => Ok(stored.user),
            _ => Err(FacadeError::InvalidCredentials),
        }
    }

    async fn do_register(&self, name: &str, email: &str, password: &str) -> FacadeResult<User> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() || !email.contains('@') || password.is_empty() {
            return Err(FacadeError::Validation("Invalid registration details".into()));
        }
        self.link.transmit("register").await?;

        let user = User {
            id: self.new_id("user"),
            name: name.to_string(),
            email: email.to_string(),
            avatar: None,
        };
        if !self.data.insert_user(StoredUser::new(user.clone(), password))? {
            return Err(FacadeError::Conflict);
        }
        self.establish_session(&user)?;
        Ok(user)
    }

    async fn do_logout(&self) -> FacadeResult<()> {
        if let Some(credential) = SessionCredential::load(self.store.as_ref()) {
            if credential.issuer == self.kind {
                // Remote revocation is best effort; the local credential goes regardless.
                match self.link.transmit("logout").await {
                    Ok(()) => {
                        if let Err(e) = self.data.close_session(&credential.token) {
                            tracing::warn!(backend = %self.kind, error = %e, "Failed to revoke session");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(backend = %self.kind, error = %e, "Logout could not reach backend");
                    }
                }
            }
        }
        SessionCredential::clear(self.store.as_ref())?;
        Ok(())
    }

    async fn do_get_current_user(&self) -> FacadeResult<User> {
        let credential = self.local_credential(FacadeError::NotAuthenticated)?;
        self.link.transmit("get_current_user").await?;
        self.data
            .session_user(&credential.token)
            .ok_or(FacadeError::NotAuthenticated)
    }

    // --- Content ---

    async fn do_get_all_posts(&self) -> FacadeResult<Vec<Post>> {
        self.link.transmit("get_all_posts").await?;
        Ok(self.data.list_posts())
    }

    async fn do_get_post_by_id(&self, id: &str) -> FacadeResult<Post> {
        self.link.transmit("get_post_by_id").await?;
        self.data
            .get_post(id)
            .ok_or_else(|| FacadeError::NotFound(format!("Post not found: {}", id)))
    }

    async fn do_create_post(&self, draft: PostDraft) -> FacadeResult<Post> {
        let author = self.require_session("create_post").await?;
        let post = draft
            .resolve(self.excerpt_length)
            .into_post(self.new_id("post"), author, Utc::now());
        self.data.put_post(post.clone())?;
        tracing::info!(backend = %self.kind, post_id = %post.id, "Post created");
        Ok(post)
    }

    async fn do_update_post(&self, id: &str, draft: PostDraft) -> FacadeResult<Post> {
        self.require_session("update_post").await?;
        let existing = self
            .data
            .get_post(id)
            .ok_or_else(|| FacadeError::NotFound(format!("Post not found: {}", id)))?;
        let post = draft
            .resolve(self.excerpt_length)
            .into_post(existing.id, existing.author, existing.created_at);
        self.data.put_post(post.clone())?;
        tracing::info!(backend = %self.kind, post_id = %post.id, "Post updated");
        Ok(post)
    }

    async fn do_delete_post(&self, id: &str) -> FacadeResult<()> {
        self.require_session("delete_post").await?;
        if !self.data.remove_post(id)? {
            tracing::debug!(backend = %self.kind, post_id = %id, "Delete of unknown post reported as success");
        }
        Ok(())
    }
}

#[async_trait]
impl AuthFacade for SimulatedBackend {
    fn backend(&self) -> BackendKind {
        self.kind
    }

    async fn login(&self, email: &str, password: &str) -> Envelope<User> {
        let result = self.do_login(email, password).await;
        self.finish("login", result)
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Envelope<User> {
        let result = self.do_register(name, email, password).await;
        self.finish("register", result)
    }

    async fn logout(&self) -> Envelope<()> {
        let result = self.do_logout().await;
        self.finish("logout", result)
    }

    async fn get_current_user(&self) -> Envelope<User> {
        let result = self.do_get_current_user().await;
        self.finish("get_current_user", result)
    }
}

#[async_trait]
impl ContentFacade for SimulatedBackend {
    fn backend(&self) -> BackendKind {
        self.kind
    }

    async fn get_all_posts(&self) -> Envelope<Vec<Post>> {
        let result = self.do_get_all_posts().await;
        self.finish("get_all_posts", result)
    }

    async fn get_post_by_id(&self, id: &str) -> Envelope<Post> {
        let result = self.do_get_post_by_id(id).await;
        self.finish("get_post_by_id", result)
    }

    async fn create_post(&self, draft: PostDraft) -> Envelope<Post> {
        let result = self.do_create_post(draft).await;
        self.finish("create_post", result)
    }

    async fn update_post(&self, id: &str, draft: PostDraft) -> Envelope<Post> {
        let result = self.do_update_post(id, draft).await;
        self.finish("update_post", result)
    }

    async fn delete_post(&self, id: &str) -> Envelope<()> {
        let result = self.do_delete_post(id).await;
        self.finish("delete_post", result)
    }
}
