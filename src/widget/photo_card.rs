//! A clickable summary of one rover photo.

use std::rc::Rc;

use marsview_api::Photo;
use marsview_core::{Component, ComponentRef, DomRef, EventKind, Markup, element, impl_debug};

/// Card showing a photo with its camera, date, rover and sol.
#[must_use]
pub struct PhotoCard {
    photo: Photo,
    on_select: Option<Rc<dyn Fn(&Photo)>>,
}

impl_debug!(PhotoCard);

impl PhotoCard {
    /// Creates a card for `photo`.
    pub const fn new(photo: Photo) -> Self {
        Self {
            photo,
            on_select: None,
        }
    }

    /// Sets the callback run when the card is clicked.
    pub fn on_select(mut self, handler: impl Fn(&Photo) + 'static) -> Self {
        self.on_select = Some(Rc::new(handler));
        self
    }

    /// Builds the component.
    pub fn construct(self, dom: &DomRef) -> ComponentRef<Self> {
        ComponentRef::construct(dom, "div", self, ())
    }

    /// The photo shown by the card.
    #[must_use]
    pub const fn photo(&self) -> &Photo {
        &self.photo
    }
}

fn detail(class: &'static str, label: &'static str, value: String) -> marsview_core::Element {
    element("p")
        .class(class)
        .child(element("strong").text(label))
        .text(" ")
        .text(value)
}

impl Component for PhotoCard {
    type State = ();

    fn render(&self, _: &()) -> Markup {
        let photo = &self.photo;
        element("div")
            .named("card")
            .class("photo-card")
            .attr("data-photo-id", photo.id)
            .child(
                element("img")
                    .attr("src", &photo.img_src)
                    .attr("alt", format!("Mars photo from {}", photo.rover.name))
                    .attr("loading", "lazy")
                    .class("photo-image"),
            )
            .child(
                element("div")
                    .class("photo-info")
                    .child(detail("photo-camera", "Camera:", photo.camera.full_name.clone()))
                    .child(detail("photo-date", "Date:", photo.earth_date.clone()))
                    .child(detail("photo-rover", "Rover:", photo.rover.name.clone()))
                    .child(detail("photo-sol", "Sol:", photo.sol.to_string())),
            )
            .into()
    }

    fn mounted(&self, this: &ComponentRef<Self>) {
        this.listen("card", EventKind::Click, |this, _| {
            let card = this.config();
            if let Some(handler) = &card.on_select {
                handler(&card.photo);
            }
        });
    }
}
