//! Fallback page for paths no route matches.

use marsview_core::{Component, ComponentRef, DomRef, Markup, element};
use marsview_router::href;

/// The 404 page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotFoundPage;

impl NotFoundPage {
    /// Builds the page.
    pub fn construct(dom: &DomRef) -> ComponentRef<Self> {
        ComponentRef::construct(dom, "div", Self, ())
    }
}

impl Component for NotFoundPage {
    type State = ();

    fn render(&self, _: &()) -> Markup {
        element("div")
            .class("page-not-found")
            .child(
                element("div")
                    .class("not-found-content")
                    .child(element("h1").class("not-found-title").text("404"))
                    .child(element("p").class("not-found-message").text("Page not found"))
                    .child(
                        element("p")
                            .class("not-found-description")
                            .text("The page you are looking for does not exist."),
                    )
                    .child(
                        element("a")
                            .attr("href", href("/"))
                            .class("not-found-link")
                            .text("Go to Home"),
                    ),
            )
            .into()
    }
}
