//! # marsview API client
//!
//! Typed access to the rover photos endpoint:
//!
//! ```text
//! GET {base}/rovers/{rover}/photos?sol={sol}&page={page}[&camera={camera}]
//! ```
//!
//! The transport is a seam: [`HttpClient`] performs the request and
//! [`MarsApi`] turns the response into [`Photo`]s. Pages only see the
//! [`PhotoSource`] trait, so they can be driven by a scripted source in
//! tests.

mod client;
mod error;
pub mod model;
mod query;

pub use client::{HttpClient, HttpResponse, MarsApi, PhotoSource};
pub use error::ApiError;
pub use model::{Camera, Photo, PhotoResponse, Rover};
pub use query::PhotoQuery;
