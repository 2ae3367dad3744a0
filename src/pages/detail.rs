//! Detail page for a single photo, mounted on `/photo/:id`.

use marsview_core::{Component, ComponentRef, DomRef, Markup, element};
use marsview_router::href;

/// Placeholder page for a single photo, reached through `/photo/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoDetailPage {
    id: String,
}

impl PhotoDetailPage {
    /// Builds the page for photo `id`.
    pub fn construct(dom: &DomRef, id: impl Into<String>) -> ComponentRef<Self> {
        ComponentRef::construct(dom, "div", Self { id: id.into() }, ())
    }

    /// The photo id taken from the path.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Component for PhotoDetailPage {
    type State = ();

    fn render(&self, _: &()) -> Markup {
        element("div")
            .class("page-photo-detail")
            .child(
                element("div")
                    .class("photo-detail-content")
                    .child(element("h1").text("Photo Detail Page"))
                    .child(element("p").class("photo-detail-id").text(format!("Photo #{}", self.id)))
                    .child(
                        element("p")
                            .text("This page will show detailed information about a Mars rover photo."),
                    )
                    .child(
                        element("a")
                            .attr("href", href("/"))
                            .class("back-link")
                            .text("← Back to Gallery"),
                    ),
            )
            .into()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use marsview_core::MemoryDom;

    use super::*;

    #[test]
    fn shows_id_and_link_home() {
        let memory = Rc::new(MemoryDom::new());
        let host = memory.create_root("app");
        let dom: DomRef = memory.clone();
        let page = PhotoDetailPage::construct(&dom, "102693");
        page.mount(host);

        let id = memory.find_by_class(page.root(), "photo-detail-id").expect("id line");
        assert_eq!(memory.text_content(id), "Photo #102693");
        let back = memory.find_by_class(page.root(), "back-link").expect("back link");
        assert_eq!(memory.attribute(back, "href").as_deref(), Some("#/"));
    }
}
