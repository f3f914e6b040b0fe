use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::store::UserDirectory;

/// When cached display names are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCachePolicy {
    /// Entries live for the whole process; renames are not picked up until restart.
    Never,
    TimeToLive(Duration),
}

/// Process-wide identity → display name memo in front of a [`UserDirectory`]
pub struct NameCache {
    cache: Cache<String, String>,
    directory: Arc<dyn UserDirectory>,
}

impl NameCache {
    pub fn new(directory: Arc<dyn UserDirectory>, policy: NameCachePolicy, capacity: u64) -> Self {
        let builder = Cache::builder().max_capacity(capacity);
        let cache = match policy {
            NameCachePolicy::Never => builder.build(),
            NameCachePolicy::TimeToLive(ttl) => builder.time_to_live(ttl).build(),
        };
        info!("Display name cache initialized ({:?})", policy);
        Self { cache, directory }
    }

    /// Cached name or a directory lookup. Identities the directory cannot
    /// resolve are shown by id and not cached, so a later lookup can still succeed.
    pub async fn resolve(&self, uid: &str) -> String {
        if let Some(name) = self.cache.get(uid).await {
            return name;
        }

        match self.directory.display_name(uid).await {
            Ok(Some(name)) => {
                self.cache.insert(uid.to_string(), name.clone()).await;
                name
            }
            Ok(None) => uid.to_string(),
            Err(e) => {
                warn!("Failed to resolve display name for {}: {}", uid, e);
                uid.to_string()
            }
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::StaticDirectory;

    #[tokio::test]
    async fn names_are_memoized_and_never_refreshed() {
        let directory = Arc::new(StaticDirectory::with_names([("u1", "Ada")]));
        let names = NameCache::new(directory.clone(), NameCachePolicy::Never, 100);

        assert_eq!(names.resolve("u1").await, "Ada");
        directory.set_name("u1", "Ada Lovelace").await;
        // Stale on purpose until the process restarts
        assert_eq!(names.resolve("u1").await, "Ada");
    }

    #[tokio::test]
    async fn unknown_identities_fall_back_without_caching() {
        let directory = Arc::new(StaticDirectory::new());
        let names = NameCache::new(directory.clone(), NameCachePolicy::Never, 100);

        assert_eq!(names.resolve("u2").await, "u2");
        directory.set_name("u2", "Grace").await;
        assert_eq!(names.resolve("u2").await, "Grace");
    }

    #[tokio::test]
    async fn ttl_policy_expires_entries() {
        let directory = Arc::new(StaticDirectory::with_names([("u1", "Ada")]));
        let names = NameCache::new(
            directory.clone(),
            NameCachePolicy::TimeToLive(Duration::from_millis(50)),
            100,
        );

        assert_eq!(names.resolve("u1").await, "Ada");
        directory.set_name("u1", "Countess").await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(names.resolve("u1").await, "Countess");
    }
}
