//! Photo search, the page mounted on `/`.
//!
//! The page owns the search controls, one [`PhotoCard`] per result and the
//! pagination buttons, all registered as children. Requests run on the
//! page's spawner; each carries a [`Ticket`] and only the answer to the
//! latest ticket is applied.

use futures::task::LocalSpawnExt;
use marsview_api::{ApiError, Photo, PhotoQuery};
use marsview_controls::{Button, ButtonPatch, Input, InputType, Select, SelectOption, button, input, select};
use marsview_core::{Component, ComponentRef, Element, EventKind, Markup, Phase, WeakRef, element, slot, state};
use serde::{Deserialize, Serialize};

use super::PageContext;
use crate::widget::PhotoCard;

/// Storage key of the snapshot saved when the page unmounts.
pub const SNAPSHOT_KEY: &str = "marsview.search";

const CAMERAS: &[(&str, &str)] = &[
    ("", "All cameras"),
    ("FHAZ", "Front Hazard Avoidance Camera"),
    ("RHAZ", "Rear Hazard Avoidance Camera"),
    ("MAST", "Mast Camera"),
    ("CHEMCAM", "Chemistry and Camera Complex"),
    ("MAHLI", "Mars Hand Lens Imager"),
    ("MARDI", "Mars Descent Imager"),
    ("NAVCAM", "Navigation Camera"),
    ("PANCAM", "Panoramic Camera"),
    ("MINITES", "Miniature Thermal Emission Spectrometer"),
];

/// Identifies one photo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    query: PhotoQuery,
}

impl Ticket {
    /// Position of the request in the page's request sequence.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The query that was sent.
    #[must_use]
    pub const fn query(&self) -> &PhotoQuery {
        &self.query
    }
}

state! {
    /// Mutable part of the [`SearchPage`].
    #[derive(Debug, Clone, Default)]
    pub struct SearchState => SearchPatch {
        /// Rover of the current search.
        pub rover: String,
        /// Sol of the current search.
        pub sol: u32,
        /// Camera filter of the current search.
        pub camera: Option<String>,
        /// One-based result page.
        pub page: u32,
        /// Photos of the last successful request.
        pub photos: Vec<Photo>,
        /// A request is in flight.
        pub loading: bool,
        /// Message of the last failed request.
        pub error: Option<String>,
        /// Ticket of the request whose answer is awaited.
        pub ticket: Option<Ticket>,
        /// Generation of the latest ticket issued.
        pub generation: u64,
    }
}

/// Search parameters kept across visits to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    /// Rover name.
    pub rover: String,
    /// Martian day.
    pub sol: u32,
    /// Camera filter.
    #[serde(default)]
    pub camera: Option<String>,
    /// Result page.
    pub page: u32,
}

/// The photo search page.
#[derive(Debug)]
pub struct SearchPage {
    context: PageContext,
}

impl SearchPage {
    /// Builds the page with the configured default search.
    pub fn construct(context: &PageContext) -> ComponentRef<Self> {
        let config = &context.config;
        let state = SearchState {
            rover: config.default_rover.clone(),
            sol: config.default_sol,
            page: 1,
            ..SearchState::default()
        };
        let page = Self {
            context: context.clone(),
        };
        ComponentRef::construct(&context.dom, "div", page, state)
    }

    fn restore(&self, this: &ComponentRef<Self>) {
        let Some(raw) = self.context.storage.take(SNAPSHOT_KEY) else {
            return;
        };
        match serde_json::from_str::<SearchSnapshot>(&raw) {
            Ok(snapshot) => {
                tracing::debug!(?snapshot, "restoring search");
                this.update_state(
                    SearchPatch::default()
                        .rover(snapshot.rover)
                        .sol(snapshot.sol)
                        .camera(snapshot.camera)
                        .page(snapshot.page.max(1)),
                );
            }
            Err(error) => tracing::warn!(%error, "discarding unreadable search snapshot"),
        }
    }

    fn save(&self, this: &ComponentRef<Self>) {
        let snapshot = {
            let state = this.state();
            SearchSnapshot {
                rover: state.rover.clone(),
                sol: state.sol,
                camera: state.camera.clone(),
                page: state.page,
            }
        };
        match serde_json::to_string(&snapshot) {
            Ok(json) => self.context.storage.set(SNAPSHOT_KEY, &json),
            Err(error) => tracing::warn!(%error, "search snapshot not saved"),
        }
    }

    fn create_controls(&self, this: &ComponentRef<Self>) {
        let (rover, sol, camera, page) = {
            let state = this.state();
            (state.rover.clone(), state.sol, state.camera.clone(), state.page)
        };
        let dom = &self.context.dom;
        let weak = this.downgrade();

        this.add_child(
            "rover-input",
            input("rover-input", "Rover Name")
                .placeholder("curiosity, perseverance, opportunity, spirit")
                .value(rover)
                .construct(dom),
        );
        this.add_child(
            "sol-input",
            input("sol-input", "Martian Sol (Day)")
                .placeholder("1000")
                .kind(InputType::Number)
                .value(sol.to_string())
                .construct(dom),
        );
        this.add_child(
            "camera-select",
            select("camera-select", "Camera")
                .options(CAMERAS.iter().map(|(value, label)| SelectOption::new(*value, *label)))
                .value(camera.unwrap_or_default())
                .construct(dom),
        );
        this.add_child(
            "search-button",
            button("🔍 Search")
                .class("search-button")
                .on_click(on_page(&weak, Self::search))
                .construct(dom),
        );
        this.add_child(
            "prev-button",
            button("← Previous")
                .disabled(page <= 1)
                .on_click(on_page(&weak, Self::previous))
                .construct(dom),
        );
        this.add_child(
            "next-button",
            button("Next →")
                .disabled(true)
                .on_click(on_page(&weak, Self::next))
                .construct(dom),
        );
    }

    fn search(&self, this: &ComponentRef<Self>) {
        let config = &self.context.config;
        let rover = control::<Input>(this, "rover-input")
            .map(|field| Input::current_value(&field).trim().to_owned())
            .filter(|rover| !rover.is_empty())
            .unwrap_or_else(|| config.default_rover.clone());
        let sol = control::<Input>(this, "sol-input")
            .and_then(|field| Input::current_value(&field).trim().parse().ok())
            .unwrap_or(config.default_sol);
        let camera = control::<Select>(this, "camera-select")
            .map(|field| field.state().value.clone())
            .filter(|camera| !camera.is_empty());
        self.load(
            this,
            SearchPatch::default().rover(rover).sol(sol).camera(camera).page(1),
        );
    }

    fn previous(&self, this: &ComponentRef<Self>) {
        let page = this.state().page;
        if page > 1 {
            self.load(this, SearchPatch::default().page(page - 1));
        }
    }

    fn next(&self, this: &ComponentRef<Self>) {
        let page = this.state().page;
        if let Some(next) = page.checked_add(1) {
            self.load(this, SearchPatch::default().page(next));
        }
    }

    fn retry(&self, this: &ComponentRef<Self>) {
        self.load(this, SearchPatch::default());
    }

    /// Applies `patch` to the search parameters and requests the matching photos.
    fn load(&self, this: &ComponentRef<Self>, patch: SearchPatch) {
        let (generation, query) = {
            let state = this.state();
            let rover = patch.rover.clone().unwrap_or_else(|| state.rover.clone());
            let camera = patch.camera.clone().unwrap_or_else(|| state.camera.clone());
            let query = PhotoQuery::new(rover, patch.sol.unwrap_or(state.sol))
                .camera(camera.unwrap_or_default())
                .page(patch.page.unwrap_or(state.page));
            (state.generation.wrapping_add(1), query)
        };
        let ticket = Ticket {
            generation,
            query: query.clone(),
        };
        tracing::debug!(generation, rover = query.rover.as_str(), sol = query.sol, page = query.page, "searching");
        this.update_state(
            patch
                .page(query.page)
                .loading(true)
                .error(None)
                .ticket(Some(ticket.clone()))
                .generation(generation),
        );

        let request = self.context.photos.fetch_photos(&query);
        let weak = this.downgrade();
        let task = async move {
            let result = request.await;
            if let Some(this) = weak.upgrade() {
                this.config().complete(&this, &ticket, result);
            }
        };
        if let Err(error) = self.context.spawner.spawn_local(task) {
            tracing::error!(%error, "photo request not started");
            this.update_state(
                SearchPatch::default()
                    .loading(false)
                    .error(Some(format!("Failed to fetch photos: {error}")))
                    .ticket(None),
            );
        }
    }

    fn complete(&self, this: &ComponentRef<Self>, ticket: &Ticket, result: Result<Vec<Photo>, ApiError>) {
        if this.phase() != Phase::Mounted {
            tracing::debug!(generation = ticket.generation, "page gone, response dropped");
            return;
        }
        let current = this.state().ticket.as_ref() == Some(ticket);
        if !current {
            tracing::debug!(
                generation = ticket.generation,
                sol = ticket.query.sol,
                "stale response discarded"
            );
            return;
        }
        match result {
            Ok(photos) => {
                tracing::debug!(count = photos.len(), "photos received");
                self.show_photos(this, &photos);
                set_disabled(this, "prev-button", ticket.query.page <= 1);
                let last = photos.len() < self.context.config.page_size || ticket.query.page == u32::MAX;
                set_disabled(this, "next-button", last);
                this.update_state(
                    SearchPatch::default()
                        .photos(photos)
                        .loading(false)
                        .ticket(None),
                );
            }
            Err(error) => {
                tracing::warn!(%error, "photo search failed");
                this.update_state(
                    SearchPatch::default()
                        .loading(false)
                        .error(Some(error.to_string()))
                        .ticket(None),
                );
            }
        }
    }

    fn show_photos(&self, this: &ComponentRef<Self>, photos: &[Photo]) {
        let shown = this.state().photos.len();
        for (index, photo) in photos.iter().enumerate() {
            let navigator = self.context.navigator.clone();
            let card = PhotoCard::new(photo.clone())
                .on_select(move |photo| navigator.navigate(&format!("/photo/{}", photo.id)))
                .construct(&self.context.dom);
            if let Some(previous) = this.add_child(format!("photo-{index}"), card) {
                previous.unmount();
            }
        }
        for index in photos.len()..shown {
            if let Some(stale) = this.remove_child(&format!("photo-{index}")) {
                stale.unmount();
            }
        }
    }

    fn wire(this: &ComponentRef<Self>) {
        this.listen("retry", EventKind::Click, |this, _| this.config().retry(this));
    }
}

fn on_page(
    weak: &WeakRef<SearchPage>,
    action: fn(&SearchPage, &ComponentRef<SearchPage>),
) -> impl Fn() + 'static {
    let weak = weak.clone();
    move || {
        if let Some(this) = weak.upgrade() {
            action(this.config(), &this);
        }
    }
}

fn control<C: Component>(this: &ComponentRef<SearchPage>, key: &str) -> Option<ComponentRef<C>> {
    this.child(key).and_then(|child| child.downcast::<C>())
}

fn set_disabled(this: &ComponentRef<SearchPage>, key: &str, disabled: bool) {
    if let Some(button) = control::<Button>(this, key) {
        button.update_state(ButtonPatch::default().disabled(disabled));
    }
}

fn status(state: &SearchState) -> Vec<Element> {
    if state.loading {
        return vec![
            element("div")
                .class("loading")
                .child(element("div").class("spinner"))
                .child(element("p").text("Loading photos from Mars...")),
        ];
    }
    if let Some(error) = &state.error {
        return vec![
            element("div")
                .class("error")
                .child(element("p").text(format!("⚠️ {error}")))
                .child(
                    element("button")
                        .named("retry")
                        .attr("type", "button")
                        .class("retry-button")
                        .text("Try Again"),
                ),
        ];
    }
    if state.photos.is_empty() {
        return vec![
            element("div")
                .class("no-results")
                .child(element("p").text("🔍 No photos found"))
                .child(element("p").text("Try different search parameters")),
        ];
    }
    vec![
        element("div")
            .class("results-info")
            .child(element("p").text(format!("Found {} photos", state.photos.len()))),
        element("div")
            .class("photo-grid")
            .children((0..state.photos.len()).map(|index| slot(format!("photo-{index}")))),
        element("div")
            .class("pagination")
            .child(slot("prev-button"))
            .child(element("span").class("page-number").text(format!("Page {}", state.page)))
            .child(slot("next-button")),
    ]
}

impl Component for SearchPage {
    type State = SearchState;

    fn render(&self, state: &SearchState) -> Markup {
        element("div")
            .class("page-mars-rover-search")
            .child(
                element("header")
                    .class("page-header")
                    .child(element("h1").class("page-title").text("Mars Rover Photos"))
                    .child(
                        element("p")
                            .class("page-subtitle")
                            .text("Explore photos from NASA's Mars rovers"),
                    ),
            )
            .child(
                element("div")
                    .class("search-section")
                    .child(
                        element("div")
                            .class("search-inputs")
                            .child(slot("rover-input"))
                            .child(slot("sol-input"))
                            .child(slot("camera-select")),
                    )
                    .child(slot("search-button")),
            )
            .children(status(state))
            .into()
    }

    fn mounted(&self, this: &ComponentRef<Self>) {
        self.restore(this);
        self.create_controls(this);
        Self::wire(this);
        self.load(this, SearchPatch::default());
    }

    fn updated(&self, this: &ComponentRef<Self>) {
        Self::wire(this);
    }

    fn unmounting(&self, this: &ComponentRef<Self>) {
        self.save(this);
    }
}
