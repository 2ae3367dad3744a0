use std::rc::Rc;

use marsview::{App, Config, Services};
use marsview_api::MarsApi;
use wasm_bindgen::prelude::*;

use crate::{
    console,
    dom::{WebDom, inject_stylesheet},
    error::WebError,
    fetch::FetchClient,
    navigation::HashNavigation,
    spawn::WebSpawner,
    storage::SessionStorage,
};

/// Builder for [`WebApp`].
#[derive(Debug, Clone)]
pub struct WebAppBuilder {
    root_id: Option<String>,
    inject_default_styles: bool,
    config: Config,
}

impl Default for WebAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAppBuilder {
    /// Creates a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root_id: None,
            inject_default_styles: true,
            config: Config::default(),
        }
    }

    /// Sets the DOM element identifier that should host the application.
    #[must_use]
    pub fn with_root_id(mut self, id: impl Into<String>) -> Self {
        self.root_id = Some(id.into());
        self
    }

    /// Controls whether the backend injects the default stylesheet.
    #[must_use]
    pub const fn inject_default_styles(mut self, inject: bool) -> Self {
        self.inject_default_styles = inject;
        self
    }

    /// Replaces the application configuration. A root id set with
    /// [`WebAppBuilder::with_root_id`] still takes precedence.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Finalises the builder and creates a [`WebApp`].
    ///
    /// # Errors
    ///
    /// Returns an error if the DOM is unavailable, the root element cannot
    /// be found, or the stylesheet cannot be injected.
    pub fn build(self) -> Result<WebApp, WebError> {
        WebApp::new_with_options(self)
    }
}

/// Entry point for running the photo browser inside the browser.
#[wasm_bindgen]
#[derive(Debug)]
pub struct WebApp {
    app: App,
}

impl WebApp {
    fn new_with_options(builder: WebAppBuilder) -> Result<Self, WebError> {
        let WebAppBuilder {
            root_id,
            inject_default_styles,
            mut config,
        } = builder;
        if let Some(root_id) = root_id {
            config.root_id = root_id;
        }
        console::install(&config.log_filter);

        let window = web_sys::window().ok_or(WebError::DomUnavailable)?;
        let document = window.document().ok_or(WebError::DomUnavailable)?;
        if inject_default_styles {
            inject_stylesheet(&document)?;
        }
        if document.get_element_by_id(&config.root_id).is_none() {
            return Err(WebError::RootNotFound(config.root_id));
        }

        let services = Services {
            dom: Rc::new(WebDom::new(document)),
            navigation: Rc::new(HashNavigation::new(window.clone())),
            storage: Rc::new(SessionStorage::new(&window)),
            photos: Rc::new(MarsApi::new(
                config.api_base_url.clone(),
                FetchClient::new(window),
            )),
            spawner: Rc::new(WebSpawner),
        };
        let app = App::builder(services).config(config).build()?;
        Ok(Self { app })
    }

    /// Returns the assembled application.
    #[must_use]
    pub const fn app(&self) -> &App {
        &self.app
    }
}

#[wasm_bindgen]
impl WebApp {
    /// Creates a new [`WebApp`] mounting into `#app` with the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the DOM root element cannot be found or initialized.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Self, WebError> {
        Self::new_with_options(WebAppBuilder::new())
    }

    /// Mounts the page for the current location and starts following
    /// `hashchange`.
    #[wasm_bindgen]
    pub fn mount(&self) {
        self.app.start();
    }

    /// Unmounts the current page and stops following `hashchange`.
    #[wasm_bindgen]
    pub fn unmount(&self) {
        self.app.stop();
    }
}
