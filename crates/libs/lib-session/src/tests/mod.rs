//! # Session Tests
//!
//! Test suite for identity resolution and session management, driven through
//! counting test doubles for the store and cache ports.


use crate::{IdentityResolver, SessionManager};
use async_trait::async_trait;
use lib_auth::token::TokenCodec;
use lib_core::cache::{CacheError, IdentityCache};
use lib_core::{AuthError, AuthenticatedIdentity, Identity, IdentityForCreate, IdentityStore, Result, Role};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

pub const SECRET: &str = "test-secret-key-must-be-at-least-32-characters!";

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(SECRET, "HS256").expect("codec construction should succeed")
}

pub fn identity(id: i64, username: &str, password_hash: &str, confirmed: bool, role: Role) -> Identity {
    Identity {
        id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: password_hash.to_string(),
        refresh_token: None,
        confirmed,
        role,
        avatar_url: None,
        created_at: chrono::Utc::now(),
    }
}

pub fn session_manager(store: Arc<MockStore>) -> SessionManager {
    SessionManager::new(
        store,
        test_codec(),
        chrono::Duration::minutes(15),
        chrono::Duration::days(7),
        StdDuration::from_secs(1),
    )
}

pub fn resolver(store: Arc<MockStore>, cache: Arc<MockCache>) -> IdentityResolver {
    IdentityResolver::new(
        store,
        cache,
        test_codec(),
        StdDuration::from_secs(60),
        StdDuration::from_secs(1),
    )
}

/// In-memory identity store that counts lookups and can be switched into a
/// failing state to simulate an outage.
pub struct MockStore {
    identities: Mutex<Vec<Identity>>,
    pub find_by_username_calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            identities: Mutex::new(Vec::new()),
            find_by_username_calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn with_identity(identity: Identity) -> Arc<Self> {
        let store = Self::new();
        store.insert(identity);
        store
    }

    pub fn insert(&self, identity: Identity) {
        self.identities.lock().unwrap().push(identity);
    }

    pub fn username_lookups(&self) -> usize {
        self.find_by_username_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn stored_refresh_token(&self, username: &str) -> Option<String> {
        self.identities
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.username == username)
            .and_then(|i| i.refresh_token.clone())
    }

    fn check_available(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuthError::Unavailable("mock store is down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MockStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        self.find_by_username_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        Ok(self
            .identities
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        self.check_available()?;

        Ok(self
            .identities
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn create(&self, identity: IdentityForCreate) -> Result<Identity> {
        self.check_available()?;

        let mut identities = self.identities.lock().unwrap();
        let id = identities.len() as i64 + 1;
        let created = Identity {
            id,
            username: identity.username,
            email: identity.email,
            password_hash: identity.password_hash,
            refresh_token: None,
            confirmed: false,
            role: Role::User,
            avatar_url: identity.avatar_url,
            created_at: chrono::Utc::now(),
        };
        identities.push(created.clone());
        Ok(created)
    }

    async fn update_refresh_token(&self, id: i64, refresh_token: Option<&str>) -> Result<()> {
        self.check_available()?;

        let mut identities = self.identities.lock().unwrap();
        if let Some(identity) = identities.iter_mut().find(|i| i.id == id) {
            identity.refresh_token = refresh_token.map(str::to_string);
        }
        Ok(())
    }

    async fn rotate_refresh_token(&self, id: i64, current: &str, next: &str) -> Result<bool> {
        self.check_available()?;

        let mut identities = self.identities.lock().unwrap();
        match identities.iter_mut().find(|i| i.id == id) {
            Some(identity) if identity.refresh_token.as_deref() == Some(current) => {
                identity.refresh_token = Some(next.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_confirmed(&self, email: &str) -> Result<()> {
        self.check_available()?;

        let mut identities = self.identities.lock().unwrap();
        match identities.iter_mut().find(|i| i.email == email) {
            Some(identity) => {
                identity.confirmed = true;
                Ok(())
            }
            None => Err(AuthError::NotFound),
        }
    }
}

/// In-memory identity cache that counts puts and can simulate backend failure.
/// Entry TTLs are accepted but not enforced; tests that care about expiry
/// exercise it through the resolver's TTL configuration instead.
pub struct MockCache {
    entries: Mutex<HashMap<String, AuthenticatedIdentity>>,
    pub put_calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            put_calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn failing() -> Arc<Self> {
        let cache = Self::new();
        cache.fail.store(true, Ordering::SeqCst);
        cache
    }

    pub fn puts(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.entries.lock().unwrap().contains_key(username)
    }
}

#[async_trait]
impl IdentityCache for MockCache {
    async fn get(&self, username: &str) -> std::result::Result<Option<AuthenticatedIdentity>, CacheError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("mock cache is down".to_string()));
        }

        Ok(self.entries.lock().unwrap().get(username).cloned())
    }

    async fn put(
        &self,
        username: &str,
        snapshot: &AuthenticatedIdentity,
        _ttl: StdDuration,
    ) -> std::result::Result<(), CacheError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("mock cache is down".to_string()));
        }

        self.entries
            .lock()
            .unwrap()
            .insert(username.to_string(), snapshot.clone());
        Ok(())
    }
}
