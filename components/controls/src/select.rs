//! A labelled drop-down.

use alloc::{borrow::Cow, rc::Rc, string::String, vec::Vec};

use marsview_core::{Component, ComponentRef, DomRef, EventKind, Markup, element, impl_debug, state};

use crate::ChangeHandler;

state! {
    /// Mutable part of a [`Select`].
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct SelectState => SelectPatch {
        /// Value of the selected option.
        pub value: String,
    }
}

/// One entry of a [`Select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Displayed text.
    pub label: String,
}

impl SelectOption {
    /// Creates an option.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A `<label>` and `<select>` pair. Picking an option re-renders the
/// control with the new selection, then runs the change callback.
#[must_use]
pub struct Select {
    id: String,
    label: Cow<'static, str>,
    options: Vec<SelectOption>,
    value: Option<String>,
    on_change: Option<ChangeHandler>,
}

impl_debug!(Select);

impl Select {
    /// Creates a drop-down without options.
    pub fn new(id: impl Into<String>, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            options: Vec::new(),
            value: None,
            on_change: None,
        }
    }

    /// Appends an option.
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

    /// Appends every option yielded by `options`.
    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Sets the initially selected value. Defaults to the first option.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the callback invoked with the newly selected value.
    pub fn on_change(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.on_change = Some(Rc::new(handler));
        self
    }

    /// Builds the component.
    pub fn construct(self, dom: &DomRef) -> ComponentRef<Self> {
        let value = self
            .value
            .clone()
            .or_else(|| self.options.first().map(|option| option.value.clone()))
            .unwrap_or_default();
        ComponentRef::construct(dom, "div", self, SelectState { value })
    }

    fn wire(this: &ComponentRef<Self>) {
        this.listen("field", EventKind::Change, |this, event| {
            let value = event.value.clone().unwrap_or_default();
            this.update_state(SelectPatch::default().value(value.clone()));
            if let Some(handler) = &this.config().on_change {
                handler(&value);
            }
        });
    }
}

impl Component for Select {
    type State = SelectState;

    fn render(&self, state: &SelectState) -> Markup {
        let options = self.options.iter().map(|option| {
            element("option")
                .attr("value", &option.value)
                .flag("selected", option.value == state.value)
                .text(option.label.clone())
        });
        element("div")
            .class("select-wrapper")
            .child(
                element("label")
                    .attr("for", &self.id)
                    .class("select-label")
                    .text(self.label.clone()),
            )
            .child(
                element("select")
                    .named("field")
                    .id(&self.id)
                    .class("select-field")
                    .children(options),
            )
            .into()
    }

    fn mounted(&self, this: &ComponentRef<Self>) {
        Self::wire(this);
    }

    fn updated(&self, this: &ComponentRef<Self>) {
        Self::wire(this);
    }
}

/// Creates a [`Select`] with the given element id and label.
pub fn select(id: impl Into<String>, label: impl Into<Cow<'static, str>>) -> Select {
    Select::new(id, label)
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use marsview_core::{Dom, MemoryDom};

    use super::*;

    fn cameras() -> Select {
        select("camera-select", "Camera")
            .option("", "All cameras")
            .option("FHAZ", "Front Hazard")
            .option("NAVCAM", "Navigation")
    }

    #[test]
    fn defaults_to_first_option() {
        let dom: DomRef = Rc::new(MemoryDom::new());
        let this = cameras().construct(&dom);
        assert_eq!(this.state().value, "");
    }

    #[test]
    fn change_rerenders_then_notifies() {
        let memory = Rc::new(MemoryDom::new());
        let host = memory.create_root("app");
        let dom: DomRef = memory.clone();
        let picked = Rc::new(RefCell::new(None));
        let sink = picked.clone();
        let this = cameras()
            .on_change(move |value| *sink.borrow_mut() = Some(String::from(value)))
            .construct(&dom);
        this.mount(host);
        let before = this.named("field").expect("select");

        memory.choose(before, "NAVCAM");

        assert_eq!(picked.borrow().as_deref(), Some("NAVCAM"));
        assert_eq!(this.state().value, "NAVCAM");
        let after = this.named("field").expect("re-rendered select");
        assert_ne!(after, before);
        assert_eq!(memory.value(after).as_deref(), Some("NAVCAM"));
        assert_eq!(memory.total_listeners(), 1);
    }

    #[test]
    fn explicit_value_is_selected() {
        let memory = Rc::new(MemoryDom::new());
        let host = memory.create_root("app");
        let dom: DomRef = memory.clone();
        let this = cameras().value("FHAZ").construct(&dom);
        this.mount(host);
        let field = this.named("field").expect("select");
        assert_eq!(memory.value(field).as_deref(), Some("FHAZ"));
        assert!(memory.outer_html(field).contains(r#"<option value="FHAZ" selected>"#));
    }
}
