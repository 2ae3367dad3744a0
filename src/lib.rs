#![doc = include_str!("../README.md")]
#![allow(clippy::future_not_send)]

pub mod app;
pub mod config;
mod error;
pub mod logging;
pub mod pages;
pub mod widget;

#[doc(inline)]
pub use app::{App, AppBuilder, Services};
#[doc(inline)]
pub use config::Config;
pub use error::Error;
