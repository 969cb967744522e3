//! Application state: caches and repositories wired together.

use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheConfig, CacheRegistry, CacheStore, ModelCache, MokaStore};
use crate::config::Config;
use crate::database::{Database, EntityBackend, Repository, User, Video};
use crate::events::InvalidationHook;

pub type UserRepository = Repository<User, EntityBackend<User>>;
pub type VideoRepository = Repository<Video, EntityBackend<Video>>;

/// Shared application state.
///
/// Built once at startup; cloning shares everything.
#[derive(Clone)]
pub struct AppState {
    /// Registry owning every named cache.
    pub registry: CacheRegistry,

    /// Store used for computed values.
    pub store: Arc<dyn CacheStore>,

    /// Users, with `user_cache` invalidated on every save/delete.
    pub users: Arc<UserRepository>,
    pub user_cache: ModelCache,

    /// Videos, with `video_cache` invalidated on every save/delete.
    pub videos: Arc<VideoRepository>,
    pub video_cache: ModelCache,
}

impl AppState {
    /// Connect to MongoDB when configured, then build the state.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let db = match &config.mongodb_uri {
            Some(uri) => Some(Database::connect(uri, &config.mongodb_database).await?),
            None => {
                info!("MONGODB_URI not set, keeping entities in memory");
                None
            }
        };

        Self::build(config, db.as_ref())
    }

    /// Build the state over an optional database.
    pub fn build(config: &Config, db: Option<&Database>) -> anyhow::Result<Self> {
        let registry = CacheRegistry::new();
        let store: Arc<dyn CacheStore> = Arc::new(MokaStore::new(&registry, &config.cache)?);
        let generations: Arc<dyn CacheStore> = Arc::new(MokaStore::named(
            &registry,
            ModelCache::GENERATIONS_CACHE_NAME,
            &CacheConfig::with_capacity(config.cache.max_capacity).no_ttl(),
        )?);

        let user_cache = ModelCache::new(store.clone(), generations.clone(), "user");
        let users: Arc<UserRepository> = Arc::new(Repository::new(EntityBackend::from_database(db)));
        users
            .signals()
            .connect(Arc::new(InvalidationHook::new(user_cache.clone())));

        let video_cache = ModelCache::new(store.clone(), generations, "video");
        let videos: Arc<VideoRepository> = Arc::new(Repository::new(EntityBackend::from_database(db)));
        videos
            .signals()
            .connect(Arc::new(InvalidationHook::new(video_cache.clone())));

        info!("Application state ready (caches: {:?})", registry.cache_names());

        Ok(Self {
            registry,
            store,
            users,
            user_cache,
            videos,
            video_cache,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registry", &self.registry)
            .field("user_cache", &self.user_cache)
            .field("video_cache", &self.video_cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::convert::Infallible;

    use super::*;

    fn state() -> AppState {
        let config = Config::from_lookup(|_| None).unwrap();
        AppState::build(&config, None).unwrap()
    }

    #[tokio::test]
    async fn test_saving_user_invalidates_its_cache() {
        let state = state();
        let mut user = User::new(1, "grace");
        state.users.save(&user).await.unwrap();

        let calls = Cell::new(0);
        let display = |user: &User| {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(user.display_name().to_string())
        };

        let name: String = state.user_cache.get_or_calc(1, "display_name", || display(&user)).unwrap();
        assert_eq!(name, "grace");
        let _: String = state.user_cache.get_or_calc(1, "display_name", || display(&user)).unwrap();
        assert_eq!(calls.get(), 1);

        user.full_name = Some("Grace Hopper".to_string());
        state.users.save(&user).await.unwrap();

        let name: String = state.user_cache.get_or_calc(1, "display_name", || display(&user)).unwrap();
        assert_eq!(name, "Grace Hopper");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_deleting_video_invalidates_only_that_video() {
        let state = state();
        let first = Video::new(10, "Launch keynote");
        let second = Video::new(11, "Q&A");
        state.videos.save(&first).await.unwrap();
        state.videos.save(&second).await.unwrap();

        state.video_cache.get_or_calc(10, "title", || Ok::<_, Infallible>(first.title.clone())).unwrap();
        state.video_cache.get_or_calc(11, "title", || Ok::<_, Infallible>(second.title.clone())).unwrap();

        assert!(state.videos.delete(&first).await.unwrap());

        let recomputed = Cell::new(false);
        let _: String = state
            .video_cache
            .get_or_calc(10, "title", || {
                recomputed.set(true);
                Ok::<_, Infallible>(String::new())
            })
            .unwrap();
        assert!(recomputed.get());

        let kept: String = state
            .video_cache
            .get_or_calc(11, "title", || -> Result<String, Infallible> { panic!("video 11 must stay cached") })
            .unwrap();
        assert_eq!(kept, "Q&A");
    }

    #[test]
    fn test_user_and_video_caches_share_stores() {
        let state = state();
        let mut names = state.registry.cache_names();
        names.sort();
        assert_eq!(
            names,
            vec![
                MokaStore::CACHE_NAME.to_string(),
                ModelCache::GENERATIONS_CACHE_NAME.to_string(),
            ]
        );
        assert_eq!(state.user_cache.prefix(), "user");
        assert_eq!(state.video_cache.prefix(), "video");
    }
}
