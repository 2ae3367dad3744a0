//! # marsview core
//!
//! A small component engine for browser user interfaces.
//!
//! - [`Component`] describes what a unit renders and which lifecycle hooks
//!   it runs; [`ComponentRef`] drives an instance through
//!   construct, mount, update and unmount.
//! - [`Markup`] is the output of a render pass. [`slot`] placeholders mark
//!   where registered children are mounted.
//! - [`Dom`] is the port every node operation goes through, with
//!   [`MemoryDom`] as the in-memory implementation.
//! - [`Storage`] persists small string snapshots across page changes.

#![no_std]
extern crate alloc;

#[macro_use]
mod macros;
/// Components and their lifecycle.
pub mod component;
pub mod dom;
/// Error types.
pub mod error;
pub mod markup;
pub mod memory;
pub mod registry;
pub mod state;
pub mod storage;

#[doc(inline)]
pub use component::{AnyComponent, Component, ComponentRef, Phase, WeakRef};
#[doc(inline)]
pub use dom::{
    Dom, DomEvent, DomRef, EventHandler, EventKind, ListenerToken, MountPoints, NodeId,
};
pub use error::{Error, Result};
#[doc(inline)]
pub use markup::{Element, Markup, Node, element, escape, slot, text};
pub use memory::MemoryDom;
pub use registry::ChildRegistry;
pub use state::Merge;
pub use storage::{MemoryStorage, Storage, StorageRef};
