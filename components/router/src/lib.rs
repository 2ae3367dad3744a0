#![no_std]

//! Hash router for marsview pages.
//!
//! A [`Router`] owns one root element and mounts exactly one page under it.
//! It reads the current path from a [`Navigation`] port, matches it against
//! [`RoutePattern`]s in registration order and hands the captured
//! [`Params`] to the page factory. The web backend supplies a
//! `hashchange`-driven navigation; [`MemoryNavigation`] serves tests.
extern crate alloc;

mod error;
pub mod navigation;
pub mod pattern;
mod router;

pub use error::RouterError;
#[doc(inline)]
pub use navigation::{
    MemoryNavigation, Navigation, NavigationListener, NavigationRef, Navigator, Subscription,
    href,
};
#[doc(inline)]
pub use pattern::{Params, RoutePattern, normalize, segments};
pub use router::{PageFactory, Router, RouterState};
