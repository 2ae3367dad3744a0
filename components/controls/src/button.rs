//! A clickable button with a disabled state.

use alloc::{borrow::Cow, format, rc::Rc, string::String};

use marsview_core::{Component, ComponentRef, DomRef, EventKind, Markup, element, impl_debug, state};

state! {
    /// Mutable part of a [`Button`].
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ButtonState => ButtonPatch {
        /// Clicks are ignored while set.
        pub disabled: bool,
    }
}

/// A `<button>` invoking a callback when clicked.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
///
/// use marsview_controls::{ButtonPatch, button};
/// use marsview_core::{DomRef, MemoryDom};
///
/// let dom: DomRef = Rc::new(MemoryDom::new());
/// let search = button("Search").class("primary").on_click(|| {}).construct(&dom);
/// search.update_state(ButtonPatch::default().disabled(true));
/// assert!(search.state().disabled);
/// ```
#[must_use]
pub struct Button {
    text: Cow<'static, str>,
    class: Option<String>,
    disabled: bool,
    on_click: Option<Rc<dyn Fn()>>,
}

impl_debug!(Button);

impl Button {
    /// Creates an enabled button showing `text`.
    pub fn new(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            text: text.into(),
            class: None,
            disabled: false,
            on_click: None,
        }
    }

    /// Adds a class next to the base `button` class.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Sets the initial disabled state.
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets the click callback.
    pub fn on_click(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    /// Builds the component.
    pub fn construct(self, dom: &DomRef) -> ComponentRef<Self> {
        let state = ButtonState {
            disabled: self.disabled,
        };
        ComponentRef::construct(dom, "div", self, state)
    }

    fn wire(this: &ComponentRef<Self>) {
        this.listen("button", EventKind::Click, |this, _| {
            if this.state().disabled {
                tracing::trace!("click on disabled button ignored");
                return;
            }
            if let Some(handler) = &this.config().on_click {
                handler();
            }
        });
    }
}

impl Component for Button {
    type State = ButtonState;

    fn render(&self, state: &ButtonState) -> Markup {
        let class = self
            .class
            .as_ref()
            .map_or_else(|| "button".into(), |extra| format!("button {extra}"));
        element("button")
            .named("button")
            .attr("type", "button")
            .class(class)
            .flag("disabled", state.disabled)
            .text(self.text.clone())
            .into()
    }

    fn mounted(&self, this: &ComponentRef<Self>) {
        Self::wire(this);
    }

    fn updated(&self, this: &ComponentRef<Self>) {
        Self::wire(this);
    }
}

/// Creates a [`Button`] showing `text`.
pub fn button(text: impl Into<Cow<'static, str>>) -> Button {
    Button::new(text)
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use marsview_core::{MemoryDom, NodeId};

    use super::*;

    fn mounted(button: Button) -> (Rc<MemoryDom>, ComponentRef<Button>, NodeId) {
        let memory = Rc::new(MemoryDom::new());
        let host = memory.create_root("app");
        let dom: DomRef = memory.clone();
        let this = button.construct(&dom);
        this.mount(host);
        let node = this.named("button").expect("rendered button");
        (memory, this, node)
    }

    #[test]
    fn click_invokes_callback() {
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        let (memory, _this, node) = mounted(button("Go").on_click(move || counter.set(counter.get() + 1)));

        memory.dispatch(node, EventKind::Click);
        memory.dispatch(node, EventKind::Click);
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn disabled_button_ignores_clicks() {
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        let (memory, this, node) = mounted(
            button("Next")
                .disabled(true)
                .on_click(move || counter.set(counter.get() + 1)),
        );
        assert_eq!(memory.attribute(node, "disabled").as_deref(), Some(""));
        memory.dispatch(node, EventKind::Click);
        assert_eq!(clicks.get(), 0);

        this.update_state(ButtonPatch::default().disabled(false));
        let node = this.named("button").expect("re-rendered button");
        assert_eq!(memory.attribute(node, "disabled"), None);
        memory.dispatch(node, EventKind::Click);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn renders_extra_class() {
        let (memory, this, _node) = mounted(button("Retry").class("retry"));
        assert_eq!(
            memory.outer_html(this.root()),
            r#"<div><button type="button" class="button retry">Retry</button></div>"#
        );
    }

    #[test]
    fn updates_do_not_stack_listeners() {
        let (memory, this, _node) = mounted(button("Go"));
        for disabled in [true, false, true] {
            this.update_state(ButtonPatch::default().disabled(disabled));
        }
        assert_eq!(memory.total_listeners(), 1);
    }
}
