//! marsview controls
//!
//! Form controls built on the marsview component engine. Each control is
//! its own configuration: build it with the chainable setters, then call
//! `construct` to get a component handle ready to be registered as a child.

#![no_std]
extern crate alloc;

pub mod button;
pub use button::{Button, ButtonPatch, ButtonState, button};
pub mod input;
pub use input::{Input, InputPatch, InputState, InputType, input};
pub mod select;
pub use select::{Select, SelectOption, SelectPatch, SelectState, select};

/// Callback receiving the new value of a control.
pub type ChangeHandler = alloc::rc::Rc<dyn Fn(&str)>;
