#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Browser backend for marsview.
//!
//! This crate supplies web-sys implementations of every port the app runs
//! on and a [`WebApp`] entry point exported to JavaScript:
//!
//! - [`WebDom`] drives the document;
//! - [`HashNavigation`] follows `location.hash`;
//! - [`SessionStorage`] keeps the search snapshot;
//! - [`FetchClient`] issues photo requests;
//! - [`WebSpawner`] runs them on the microtask queue.
//!
//! ```js
//! import init, { WebApp } from "./pkg/marsview_web.js";
//!
//! await init();
//! new WebApp().mount();
//! ```

mod app;
pub mod console;
mod dom;
mod error;
mod fetch;
mod navigation;
mod spawn;
mod storage;

pub use app::{WebApp, WebAppBuilder};
pub use dom::WebDom;
pub use error::WebError;
pub use fetch::FetchClient;
pub use navigation::HashNavigation;
pub use spawn::WebSpawner;
pub use storage::SessionStorage;
