//! A labelled text field.
//!
//! The field never re-renders while the user types: the typed text lives in
//! the element and is read back on demand, so focus and caret position stay
//! where the user left them.

use alloc::{borrow::Cow, rc::Rc, string::String};

use marsview_core::{Component, ComponentRef, DomRef, EventKind, Markup, element, impl_debug, state};

use crate::ChangeHandler;

state! {
    /// Mutable part of an [`Input`].
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct InputState => InputPatch {
        /// The value rendered into the field.
        pub value: String,
    }
}

/// Value of the `type` attribute of an [`Input`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputType {
    /// Free text.
    #[default]
    Text,
    /// Numeric entry.
    Number,
    /// A search box.
    Search,
}

impl InputType {
    /// Returns the attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Search => "search",
        }
    }
}

/// A `<label>` and `<input>` pair reporting every keystroke.
#[must_use]
pub struct Input {
    id: String,
    label: Cow<'static, str>,
    placeholder: Cow<'static, str>,
    kind: InputType,
    value: String,
    on_change: Option<ChangeHandler>,
}

impl_debug!(Input);

impl Input {
    /// Creates an empty text field with the given element id and label.
    pub fn new(id: impl Into<String>, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            placeholder: Cow::Borrowed(""),
            kind: InputType::Text,
            value: String::new(),
            on_change: None,
        }
    }

    /// Sets the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<Cow<'static, str>>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the `type` attribute.
    pub const fn kind(mut self, kind: InputType) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the initial value.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the callback invoked with the field value on every keystroke.
    pub fn on_change(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.on_change = Some(Rc::new(handler));
        self
    }

    /// Builds the component.
    pub fn construct(self, dom: &DomRef) -> ComponentRef<Self> {
        let state = InputState {
            value: self.value.clone(),
        };
        ComponentRef::construct(dom, "div", self, state)
    }

    /// Returns what the field currently holds: the live element value when
    /// rendered, the state value otherwise.
    #[must_use]
    pub fn current_value(this: &ComponentRef<Self>) -> String {
        this.value("field")
            .unwrap_or_else(|| this.state().value.clone())
    }

    fn wire(this: &ComponentRef<Self>) {
        this.listen("field", EventKind::Input, |this, event| {
            let value = event.value.as_deref().unwrap_or_default();
            if let Some(handler) = &this.config().on_change {
                handler(value);
            }
        });
    }
}

impl Component for Input {
    type State = InputState;

    fn render(&self, state: &InputState) -> Markup {
        element("div")
            .class("input-wrapper")
            .child(
                element("label")
                    .attr("for", &self.id)
                    .class("input-label")
                    .text(self.label.clone()),
            )
            .child(
                element("input")
                    .named("field")
                    .attr("type", self.kind.as_str())
                    .id(&self.id)
                    .class("input-field")
                    .attr("placeholder", &self.placeholder)
                    .attr("value", &state.value),
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

/// Creates an [`Input`] with the given element id and label.
pub fn input(id: impl Into<String>, label: impl Into<Cow<'static, str>>) -> Input {
    Input::new(id, label)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use marsview_core::{Dom, MemoryDom};

    use super::*;

    #[test]
    fn typing_reports_value_without_rerendering() {
        let memory = Rc::new(MemoryDom::new());
        let host = memory.create_root("app");
        let dom: DomRef = memory.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let field = input("sol-input", "Sol")
            .kind(InputType::Number)
            .value("1000")
            .on_change(move |value| sink.borrow_mut().push(String::from(value)))
            .construct(&dom);
        field.mount(host);
        let node = field.named("field").expect("input element");

        memory.type_text(node, "10");
        memory.type_text(node, "100");

        assert_eq!(*seen.borrow(), ["10", "100"]);
        assert_eq!(field.named("field"), Some(node));
        assert_eq!(field.state().value, "1000");
        assert_eq!(Input::current_value(&field), "100");
        assert_eq!(memory.total_listeners(), 1);
    }

    #[test]
    fn renders_label_and_attributes() {
        let memory = Rc::new(MemoryDom::new());
        let host = memory.create_root("app");
        let dom: DomRef = memory.clone();
        let field = input("rover-input", "Rover")
            .placeholder("curiosity")
            .construct(&dom);
        field.mount(host);

        let node = field.named("field").expect("input element");
        assert_eq!(memory.attribute(node, "id").as_deref(), Some("rover-input"));
        assert_eq!(memory.attribute(node, "type").as_deref(), Some("text"));
        let label = memory.find_by_tag(field.root(), "label").expect("label");
        assert_eq!(memory.text_content(label), "Rover");
        assert_eq!(memory.value(node).as_deref(), Some(""));
    }

    #[test]
    fn current_value_falls_back_to_state_before_mount() {
        let dom: DomRef = Rc::new(MemoryDom::new());
        let field = input("x", "X").value("opportunity").construct(&dom);
        assert_eq!(Input::current_value(&field), "opportunity");

        field.update_state(InputPatch::default().value("spirit".into()));
        assert_eq!(Input::current_value(&field), "spirit");
    }
}
