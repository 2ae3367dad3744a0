//! The pages mounted by the router.

use std::rc::Rc;

use futures::task::LocalSpawn;
use marsview_api::PhotoSource;
use marsview_core::{DomRef, StorageRef};
use marsview_router::Navigator;

use crate::Config;

pub mod detail;
pub mod not_found;
pub mod search;

pub use detail::PhotoDetailPage;
pub use not_found::NotFoundPage;
pub use search::{SearchPage, SearchPatch, SearchSnapshot, SearchState};

/// Everything a page needs from its surroundings.
#[derive(Clone)]
pub struct PageContext {
    /// DOM pages render into.
    pub dom: DomRef,
    /// Source of rover photos.
    pub photos: Rc<dyn PhotoSource>,
    /// Executor for requests in flight.
    pub spawner: Rc<dyn LocalSpawn>,
    /// Store for page snapshots.
    pub storage: StorageRef,
    /// Handle for leaving the page.
    pub navigator: Navigator,
    /// Application settings.
    pub config: Rc<Config>,
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("navigator", &self.navigator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
