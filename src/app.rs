//! The assembled photo browser.

use std::rc::Rc;

use futures::task::LocalSpawn;
use marsview_api::PhotoSource;
use marsview_core::{DomRef, StorageRef};
use marsview_router::{NavigationRef, Router};

use crate::{
    Config, Error,
    pages::{NotFoundPage, PageContext, PhotoDetailPage, SearchPage},
};

/// The ports an [`App`] runs on.
///
/// The web backend supplies browser-backed implementations; tests use the
/// in-memory ones from `marsview-core` and `marsview-router`.
#[derive(Clone)]
pub struct Services {
    /// Document pages render into.
    pub dom: DomRef,
    /// Location the router follows.
    pub navigation: NavigationRef,
    /// Session-scoped key/value store.
    pub storage: StorageRef,
    /// Source of rover photos.
    pub photos: Rc<dyn PhotoSource>,
    /// Executor for photo requests.
    pub spawner: Rc<dyn LocalSpawn>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Builder for [`App`].
#[derive(Debug)]
#[must_use]
pub struct AppBuilder {
    services: Services,
    config: Config,
}

impl AppBuilder {
    /// Replaces the default configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Creates the router and registers the pages.
    ///
    /// Nothing is rendered until [`App::start`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Router`] when the document has no element with the
    /// configured root id.
    pub fn build(self) -> Result<App, Error> {
        let Services {
            dom,
            navigation,
            storage,
            photos,
            spawner,
        } = self.services;
        let config = Rc::new(self.config);
        let router = Router::new(&dom, navigation, &config.root_id)?;
        let context = PageContext {
            dom: Rc::clone(&dom),
            photos,
            spawner,
            storage,
            navigator: router.navigator(),
            config: Rc::clone(&config),
        };

        router.register("/", move |_| SearchPage::construct(&context).erase());
        let detail = Rc::clone(&dom);
        router.register("/photo/:id", move |params| {
            PhotoDetailPage::construct(&detail, params.get("id").unwrap_or_default()).erase()
        });
        router.set_not_found(move |_| NotFoundPage::construct(&dom).erase());

        tracing::info!(root = config.root_id.as_str(), "app assembled");
        Ok(App { router, config })
    }
}

/// The photo browser: a router with the search, detail and not-found pages.
///
/// | Path          | Page                 |
/// |---------------|----------------------|
/// | `/`           | [`SearchPage`]       |
/// | `/photo/:id`  | [`PhotoDetailPage`]  |
/// | anything else | [`NotFoundPage`]     |
#[derive(Debug)]
pub struct App {
    router: Router,
    config: Rc<Config>,
}

impl App {
    /// Starts building an app on `services` with the default configuration.
    pub fn builder(services: Services) -> AppBuilder {
        AppBuilder {
            services,
            config: Config::default(),
        }
    }

    /// Mounts the page for the current location and follows navigation.
    pub fn start(&self) {
        self.router.start();
    }

    /// Unmounts the current page and stops following navigation.
    pub fn stop(&self) {
        self.router.stop();
    }

    /// The router driving the pages.
    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// The configuration the app was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use futures::{FutureExt, executor::LocalPool, future::LocalBoxFuture};
    use marsview_api::{ApiError, Photo, PhotoQuery};
    use marsview_core::{MemoryDom, MemoryStorage, NodeId, Storage};
    use marsview_router::{MemoryNavigation, RouterState};

    use super::*;
    use crate::{pages::search::SNAPSHOT_KEY, widget::photo_card::tests::photo};

    struct Fixed;

    impl PhotoSource for Fixed {
        fn fetch_photos(&self, query: &PhotoQuery) -> LocalBoxFuture<'static, Result<Vec<Photo>, ApiError>> {
            let photos = (1..=3).map(|id| photo(id, query.sol)).collect();
            async move { Ok(photos) }.boxed_local()
        }
    }

    struct World {
        memory: Rc<MemoryDom>,
        host: NodeId,
        navigation: Rc<MemoryNavigation>,
        storage: Rc<MemoryStorage>,
        pool: LocalPool,
    }

    impl World {
        fn new(path: &str) -> Self {
            let memory = Rc::new(MemoryDom::new());
            let host = memory.create_root("app");
            Self {
                memory,
                host,
                navigation: Rc::new(MemoryNavigation::new(path)),
                storage: Rc::new(MemoryStorage::new()),
                pool: LocalPool::new(),
            }
        }

        fn services(&self) -> Services {
            Services {
                dom: self.memory.clone(),
                navigation: self.navigation.clone(),
                storage: self.storage.clone(),
                photos: Rc::new(Fixed),
                spawner: Rc::new(self.pool.spawner()),
            }
        }

        fn text(&self) -> String {
            self.memory.text_content(self.host)
        }
    }

    #[test]
    fn pages_follow_the_location() {
        let mut world = World::new("/");
        let app = App::builder(world.services()).build().expect("root exists");
        app.start();
        world.pool.run_until_stalled();
        assert_eq!(app.router().current_route().as_deref(), Some("/"));
        assert!(world.text().contains("Mars Rover Photos"));
        assert_eq!(world.memory.find_all_by_class(world.host, "photo-card").len(), 3);

        let card = world.memory.find_all_by_class(world.host, "photo-card")[2];
        world.memory.dispatch(card, marsview_core::EventKind::Click);
        assert!(world.text().contains("Mars Rover Photos"));
        world.navigation.flush();
        assert!(world.text().contains("Photo #3"));
        assert!(world.storage.get(SNAPSHOT_KEY).is_some());

        app.router().navigate("/nowhere");
        world.navigation.flush();
        assert!(world.text().contains("404"));
        assert_eq!(app.router().current_route(), None);

        app.router().navigate("/");
        world.navigation.flush();
        world.pool.run_until_stalled();
        assert!(world.storage.get(SNAPSHOT_KEY).is_none());
        assert_eq!(world.memory.find_all_by_class(world.host, "photo-card").len(), 3);

        app.stop();
        assert_eq!(app.router().state(), RouterState::Idle);
        assert!(world.memory.children(world.host).is_empty());
    }

    #[test]
    fn unknown_root_id_fails_to_build() {
        let world = World::new("/");
        let config = Config {
            root_id: "missing".into(),
            ..Config::default()
        };
        let error = App::builder(world.services())
            .config(config)
            .build()
            .expect_err("no such root");
        assert!(matches!(error, Error::Router(_)));
        assert!(error.to_string().contains("missing"));
    }
}
