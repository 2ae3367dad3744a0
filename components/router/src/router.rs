//! The router state machine.

use alloc::{rc::Rc, string::String, vec::Vec};
use core::{cell::RefCell, fmt};

use marsview_core::{AnyComponent, DomRef, Error, NodeId};

use crate::{
    RouterError,
    navigation::{NavigationRef, Navigator, Subscription},
    pattern::{Params, RoutePattern},
};

/// Builds a page from the parameters of the matched route.
pub type PageFactory = Rc<dyn Fn(&Params) -> AnyComponent>;

/// Where the router is in its resolution cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RouterState {
    /// No page is mounted.
    #[default]
    Idle,
    /// A resolution pass is running.
    Resolving,
    /// A page is mounted under the root element.
    Mounted,
}

struct Route {
    pattern: RoutePattern,
    factory: PageFactory,
}

struct Active {
    page: AnyComponent,
    pattern: Option<String>,
    params: Params,
}

struct Shared {
    dom: DomRef,
    navigation: NavigationRef,
    root: NodeId,
    routes: Vec<Route>,
    not_found: Option<PageFactory>,
    current: Option<Active>,
    state: RouterState,
    subscription: Option<Subscription>,
    pending: bool,
    /// Set by [`Router::stop`] while a resolve pass is running.
    halted: bool,
}

/// Hash router owning one root element.
///
/// Routes are tried in registration order and the first full match wins.
/// Exactly one page is mounted at a time: the previous page is unmounted
/// before the next one is built.
///
/// ```
/// use std::rc::Rc;
///
/// use marsview_core::{Component, ComponentRef, DomRef, Markup, MemoryDom, element};
/// use marsview_router::{MemoryNavigation, Router, RouterState};
///
/// struct Home;
///
/// impl Component for Home {
///     type State = ();
///
///     fn render(&self, _: &()) -> Markup {
///         element("h1").text("Home").into()
///     }
/// }
///
/// let memory = Rc::new(MemoryDom::new());
/// memory.create_root("app");
/// let dom: DomRef = memory;
/// let router = Router::new(&dom, Rc::new(MemoryNavigation::new("/")), "app")?;
/// let pages = dom.clone();
/// router.register("/", move |_| ComponentRef::construct(&pages, "div", Home, ()).erase());
/// router.start();
/// assert_eq!(router.state(), RouterState::Mounted);
/// # Ok::<(), marsview_router::RouterError>(())
/// ```
#[derive(Clone)]
pub struct Router(Rc<RefCell<Shared>>);

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.0.borrow();
        f.debug_struct("Router")
            .field("root", &shared.root)
            .field(
                "routes",
                &shared
                    .routes
                    .iter()
                    .map(|route| route.pattern.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("state", &shared.state)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Creates a router owning the element with id `root_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Configuration`] when the document has no such
    /// element.
    pub fn new(dom: &DomRef, navigation: NavigationRef, root_id: &str) -> Result<Self, RouterError> {
        let root = dom
            .find_root(root_id)
            .ok_or_else(|| Error::RootNotFound(root_id.into()))?;
        Ok(Self::with_root(dom, navigation, root))
    }

    /// Creates a router owning `root`.
    #[must_use]
    pub fn with_root(dom: &DomRef, navigation: NavigationRef, root: NodeId) -> Self {
        Self(Rc::new(RefCell::new(Shared {
            dom: Rc::clone(dom),
            navigation,
            root,
            routes: Vec::new(),
            not_found: None,
            current: None,
            state: RouterState::Idle,
            subscription: None,
            pending: false,
            halted: false,
        })))
    }

    /// Appends a route. Earlier registrations take precedence.
    pub fn register(
        &self,
        pattern: &str,
        factory: impl Fn(&Params) -> AnyComponent + 'static,
    ) -> &Self {
        self.0.borrow_mut().routes.push(Route {
            pattern: RoutePattern::parse(pattern),
            factory: Rc::new(factory),
        });
        self
    }

    /// Sets the page mounted when no route matches. It receives empty
    /// parameters.
    pub fn set_not_found(&self, factory: impl Fn(&Params) -> AnyComponent + 'static) -> &Self {
        self.0.borrow_mut().not_found = Some(Rc::new(factory));
        self
    }

    /// Subscribes to navigation changes and resolves the current path.
    ///
    /// Starting a running router only resolves again.
    pub fn start(&self) {
        let subscribed = self.0.borrow().subscription.is_some();
        if !subscribed {
            let navigation = Rc::clone(&self.0.borrow().navigation);
            let weak = Rc::downgrade(&self.0);
            let subscription = navigation.subscribe(Rc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    Self(shared).resolve();
                }
            }));
            self.0.borrow_mut().subscription = Some(subscription);
        }
        self.0.borrow_mut().halted = false;
        self.resolve();
    }

    /// Unsubscribes from navigation changes and unmounts the current page.
    ///
    /// Called from a page hook during a resolve pass, the pass unmounts the
    /// page it was placing and ends in [`RouterState::Idle`].
    pub fn stop(&self) {
        let (navigation, subscription, current, dom, root) = {
            let mut shared = self.0.borrow_mut();
            if shared.state == RouterState::Resolving {
                shared.halted = true;
            } else {
                shared.state = RouterState::Idle;
            }
            (
                Rc::clone(&shared.navigation),
                shared.subscription.take(),
                shared.current.take(),
                Rc::clone(&shared.dom),
                shared.root,
            )
        };
        if let Some(subscription) = subscription {
            navigation.unsubscribe(subscription);
        }
        if let Some(active) = current {
            active.page.unmount();
        }
        dom.clear(root);
        tracing::debug!("router stopped");
    }

    /// Writes `path` to the navigation port. The page is swapped when the
    /// change notification arrives, not during this call.
    pub fn navigate(&self, path: &str) {
        self.navigator().navigate(path);
    }

    /// Returns a handle pages can keep to request navigation.
    #[must_use]
    pub fn navigator(&self) -> Navigator {
        Navigator::new(Rc::clone(&self.0.borrow().navigation))
    }

    /// Resolves the current path: unmounts the active page, then builds and
    /// mounts the page of the first matching route, or the not-found page.
    ///
    /// A resolve requested while one is running is folded into the running
    /// pass, which starts over once the current page is in place.
    pub fn resolve(&self) {
        {
            let mut shared = self.0.borrow_mut();
            if shared.state == RouterState::Resolving {
                shared.pending = true;
                return;
            }
            shared.state = RouterState::Resolving;
        }
        loop {
            let (previous, path, dom, root) = {
                let mut shared = self.0.borrow_mut();
                shared.pending = false;
                (
                    shared.current.take(),
                    shared.navigation.read(),
                    Rc::clone(&shared.dom),
                    shared.root,
                )
            };
            if let Some(previous) = previous {
                tracing::debug!(page = previous.page.type_name(), "unmounting page");
                previous.page.unmount();
            }
            dom.clear(root);
            if self.0.borrow().halted {
                self.halt(None, &dom, root);
                break;
            }

            let next = self.lookup(&path).map(|(factory, pattern, params)| Active {
                page: factory(&params),
                pattern,
                params,
            });
            if let Some(active) = &next {
                tracing::debug!(
                    path = path.as_str(),
                    route = active.pattern.as_deref().unwrap_or("<not found>"),
                    "mounting page"
                );
                active.page.mount(root);
            }

            if self.0.borrow().halted {
                self.halt(next, &dom, root);
                break;
            }
            let mut shared = self.0.borrow_mut();
            shared.current = next;
            if !shared.pending {
                shared.state = if shared.current.is_some() {
                    RouterState::Mounted
                } else {
                    RouterState::Idle
                };
                break;
            }
        }
    }

    /// Ends a resolve pass interrupted by [`Router::stop`].
    fn halt(&self, next: Option<Active>, dom: &DomRef, root: NodeId) {
        if let Some(active) = next {
            active.page.unmount();
        }
        dom.clear(root);
        let mut shared = self.0.borrow_mut();
        shared.halted = false;
        shared.pending = false;
        shared.state = RouterState::Idle;
        tracing::debug!("resolve interrupted by stop");
    }

    fn lookup(&self, path: &str) -> Option<(PageFactory, Option<String>, Params)> {
        let shared = self.0.borrow();
        for route in &shared.routes {
            if let Some(params) = route.pattern.matches(path) {
                return Some((
                    Rc::clone(&route.factory),
                    Some(route.pattern.as_str().into()),
                    params,
                ));
            }
        }
        tracing::warn!(path, "no route matched");
        shared
            .not_found
            .as_ref()
            .map(|factory| (Rc::clone(factory), None, Params::new()))
    }

    /// Returns the resolution state.
    #[must_use]
    pub fn state(&self) -> RouterState {
        self.0.borrow().state
    }

    /// Returns the pattern of the mounted route, `None` when idle or when
    /// the not-found page is showing.
    #[must_use]
    pub fn current_route(&self) -> Option<String> {
        self.0
            .borrow()
            .current
            .as_ref()
            .and_then(|active| active.pattern.clone())
    }

    /// Returns the parameters the mounted page was built with.
    #[must_use]
    pub fn params(&self) -> Params {
        self.0
            .borrow()
            .current
            .as_ref()
            .map(|active| active.params.clone())
            .unwrap_or_default()
    }

    /// Returns the mounted page.
    #[must_use]
    pub fn current_page(&self) -> Option<AnyComponent> {
        self.0
            .borrow()
            .current
            .as_ref()
            .map(|active| active.page.clone())
    }

    /// Returns the element the router mounts pages into.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.0.borrow().root
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString, vec};
    use core::cell::Cell;

    use marsview_core::{Component, ComponentRef, Markup, MemoryDom, Phase, element};

    use super::*;
    use crate::MemoryNavigation;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Page {
        label: String,
        log: Log,
    }

    impl Component for Page {
        type State = ();

        fn render(&self, _: &()) -> Markup {
            element("h1").text(self.label.clone()).into()
        }

        fn mounted(&self, _this: &ComponentRef<Self>) {
            self.log.borrow_mut().push(format!("mount {}", self.label));
        }

        fn unmounting(&self, _this: &ComponentRef<Self>) {
            self.log.borrow_mut().push(format!("unmount {}", self.label));
        }
    }

    struct Fixture {
        memory: Rc<MemoryDom>,
        navigation: Rc<MemoryNavigation>,
        router: Router,
        log: Log,
    }

    impl Fixture {
        fn new(path: &str) -> Self {
            let memory = Rc::new(MemoryDom::new());
            memory.create_root("app");
            let dom: DomRef = memory.clone();
            let navigation = Rc::new(MemoryNavigation::new(path));
            let router = Router::new(&dom, navigation.clone(), "app").expect("root exists");
            Self {
                memory,
                navigation,
                router,
                log: Rc::default(),
            }
        }

        fn page(&self, label: impl Fn(&Params) -> String + 'static) -> impl Fn(&Params) -> AnyComponent + 'static {
            let dom: DomRef = self.memory.clone();
            let log = self.log.clone();
            move |params| {
                let label = label(params);
                log.borrow_mut().push(format!("construct {label}"));
                ComponentRef::construct(
                    &dom,
                    "div",
                    Page {
                        label,
                        log: log.clone(),
                    },
                    (),
                )
                .erase()
            }
        }

        fn go(&self, path: &str) {
            self.router.navigate(path);
            self.navigation.flush();
        }

        fn text(&self) -> String {
            self.memory.text_content(self.router.root())
        }
    }

    #[test]
    fn first_registered_route_wins() {
        let fixture = Fixture::new("/photo/new");
        fixture
            .router
            .register("/photo/new", fixture.page(|_| "create".into()))
            .register("/photo/:id", fixture.page(|p| format!("photo {}", p.get("id").unwrap_or("?"))));
        fixture.router.start();
        assert_eq!(fixture.text(), "create");
        assert_eq!(fixture.router.current_route().as_deref(), Some("/photo/new"));

        let reversed = Fixture::new("/photo/new");
        reversed
            .router
            .register("/photo/:id", reversed.page(|p| format!("photo {}", p.get("id").unwrap_or("?"))))
            .register("/photo/new", reversed.page(|_| "create".into()));
        reversed.router.start();
        assert_eq!(reversed.text(), "photo new");
    }

    #[test]
    fn params_are_extracted() {
        let fixture = Fixture::new("/photo/42");
        fixture.router.register("/photo/:id", fixture.page(|_| "photo".into()));
        fixture.router.start();
        let params = fixture.router.params();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn trailing_slash_resolves_the_same_route() {
        let fixture = Fixture::new("/photo/42/");
        fixture.router.register("/photo/:id", fixture.page(|p| p.get("id").unwrap_or("").into()));
        fixture.router.start();
        assert_eq!(fixture.text(), "42");

        fixture.go("/photo/42");
        assert_eq!(fixture.text(), "42");
        assert_eq!(fixture.router.params().get("id"), Some("42"));
    }

    #[test]
    fn exactly_one_page_is_mounted_across_navigations() {
        let fixture = Fixture::new("/item/0");
        fixture.router.register("/item/:id", fixture.page(|p| p.get("id").unwrap_or("").into()));
        fixture.router.start();

        for index in 1..=5 {
            fixture.go(&format!("/item/{index}"));
            assert_eq!(fixture.memory.children(fixture.router.root()).len(), 1);
            assert_eq!(fixture.text(), index.to_string());
        }

        let log = fixture.log.borrow();
        for index in 0..5 {
            let unmounted = log
                .iter()
                .position(|entry| *entry == format!("unmount {index}"))
                .expect("page unmounted");
            let next = log
                .iter()
                .position(|entry| *entry == format!("construct {}", index + 1))
                .expect("next page constructed");
            assert!(unmounted < next, "page {index} must unmount before its successor is built");
        }
    }

    #[test]
    fn navigate_does_not_swap_synchronously() {
        let fixture = Fixture::new("/");
        fixture
            .router
            .register("/", fixture.page(|_| "home".into()))
            .register("/about", fixture.page(|_| "about".into()));
        fixture.router.start();

        fixture.router.navigate("/about");
        assert_eq!(fixture.text(), "home");
        fixture.navigation.flush();
        assert_eq!(fixture.text(), "about");
    }

    #[test]
    fn end_to_end_scenario() {
        let fixture = Fixture::new("");
        fixture
            .router
            .register("/", fixture.page(|_| "PageA".into()))
            .register("/item/:id", fixture.page(|p| format!("PageB {}", p.get("id").unwrap_or(""))))
            .set_not_found(fixture.page(|_| "Page404".into()));
        fixture.router.start();
        assert_eq!(fixture.text(), "PageA");
        assert_eq!(fixture.router.state(), RouterState::Mounted);

        fixture.go("/item/7");
        assert_eq!(fixture.text(), "PageB 7");

        fixture.go("/nowhere");
        assert_eq!(fixture.text(), "Page404");
        assert_eq!(fixture.router.current_route(), None);
        assert!(fixture.router.params().is_empty());

        fixture.go("/");
        assert_eq!(fixture.text(), "PageA");
        assert_eq!(
            *fixture.log.borrow(),
            vec![
                "construct PageA",
                "mount PageA",
                "unmount PageA",
                "construct PageB 7",
                "mount PageB 7",
                "unmount PageB 7",
                "construct Page404",
                "mount Page404",
                "unmount Page404",
                "construct PageA",
                "mount PageA",
            ]
        );
    }

    #[test]
    fn unmatched_path_without_fallback_leaves_root_empty() {
        let fixture = Fixture::new("/");
        fixture.router.register("/", fixture.page(|_| "home".into()));
        fixture.router.start();
        let home = fixture.router.current_page().expect("home mounted");

        fixture.go("/missing");
        assert_eq!(fixture.router.state(), RouterState::Idle);
        assert!(fixture.memory.children(fixture.router.root()).is_empty());
        assert_eq!(home.phase(), Phase::Unmounted);
    }

    #[test]
    fn redirect_from_mounted_hook_is_applied_on_next_event() {
        struct Redirect(crate::Navigator);

        impl Component for Redirect {
            type State = ();

            fn render(&self, _: &()) -> Markup {
                Markup::new()
            }

            fn mounted(&self, _this: &ComponentRef<Self>) {
                self.0.navigate("/new");
            }
        }

        let fixture = Fixture::new("/old");
        let dom: DomRef = fixture.memory.clone();
        let navigator = fixture.router.navigator();
        fixture
            .router
            .register("/old", move |_| {
                ComponentRef::construct(&dom, "div", Redirect(navigator.clone()), ()).erase()
            })
            .register("/new", fixture.page(|_| "new".into()));
        fixture.router.start();
        assert_eq!(fixture.text(), "");

        fixture.navigation.flush();
        assert_eq!(fixture.text(), "new");
        assert_eq!(fixture.router.current_route().as_deref(), Some("/new"));
    }

    #[test]
    fn resolve_requested_during_mount_runs_again() {
        struct Reentrant(RefCell<Option<Router>>, Rc<Cell<u32>>);

        impl Component for Reentrant {
            type State = ();

            fn render(&self, _: &()) -> Markup {
                Markup::new()
            }

            fn mounted(&self, _this: &ComponentRef<Self>) {
                self.1.set(self.1.get() + 1);
                if let Some(router) = self.0.borrow_mut().take() {
                    router.resolve();
                }
            }
        }

        let fixture = Fixture::new("/");
        let dom: DomRef = fixture.memory.clone();
        let mounts = Rc::new(Cell::new(0));
        let router = fixture.router.clone();
        let first = Rc::new(Cell::new(true));
        {
            let mounts = mounts.clone();
            fixture.router.register("/", move |_| {
                let router = first.replace(false).then(|| router.clone());
                ComponentRef::construct(&dom, "div", Reentrant(RefCell::new(router), mounts.clone()), ())
                    .erase()
            });
        }
        fixture.router.start();

        assert_eq!(mounts.get(), 2);
        assert_eq!(fixture.router.state(), RouterState::Mounted);
        assert_eq!(fixture.memory.children(fixture.router.root()).len(), 1);
    }

    #[test]
    fn stop_unmounts_and_ignores_later_events() {
        let fixture = Fixture::new("/");
        fixture
            .router
            .register("/", fixture.page(|_| "home".into()))
            .register("/about", fixture.page(|_| "about".into()));
        fixture.router.start();
        fixture.router.stop();
        assert_eq!(fixture.router.state(), RouterState::Idle);
        assert_eq!(fixture.navigation.listener_count(), 0);

        fixture.go("/about");
        assert_eq!(fixture.text(), "");
    }

    #[test]
    fn stop_from_mounted_hook_leaves_the_router_idle() {
        struct Stopper(Router, Rc<Cell<Phase>>);

        impl Component for Stopper {
            type State = ();

            fn render(&self, _: &()) -> Markup {
                element("p").text("leaving").into()
            }

            fn mounted(&self, this: &ComponentRef<Self>) {
                self.0.stop();
                self.1.set(this.phase());
            }

            fn unmounting(&self, _this: &ComponentRef<Self>) {
                self.1.set(Phase::Unmounted);
            }
        }

        let fixture = Fixture::new("/");
        let dom: DomRef = fixture.memory.clone();
        let router = fixture.router.clone();
        let seen = Rc::new(Cell::new(Phase::Constructed));
        {
            let seen = seen.clone();
            fixture.router.register("/", move |_| {
                ComponentRef::construct(&dom, "div", Stopper(router.clone(), seen.clone()), ()).erase()
            });
        }
        fixture.router.start();

        assert_eq!(fixture.router.state(), RouterState::Idle);
        assert!(fixture.router.current_page().is_none());
        assert_eq!(seen.get(), Phase::Unmounted);
        assert!(fixture.memory.children(fixture.router.root()).is_empty());
        assert_eq!(fixture.navigation.listener_count(), 0);
    }

    #[test]
    fn missing_root_is_a_configuration_error() {
        let dom: DomRef = Rc::new(MemoryDom::new());
        let error = Router::new(&dom, Rc::new(MemoryNavigation::default()), "app").expect_err("no root");
        assert_eq!(error, RouterError::Configuration(Error::RootNotFound("app".into())));
        assert_eq!(error.to_string(), "router configuration: root element `#app` not found");
    }
}
