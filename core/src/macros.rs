/// Implements a basic `Debug` trait for types using their type name.
///
/// Useful for configuration types holding callbacks that have no meaningful
/// debug representation.
#[macro_export]
macro_rules! impl_debug {
    ($ty:ty) => {
        impl core::fmt::Debug for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(core::any::type_name::<Self>())
            }
        }
    };
}

/// Declares a component state struct together with its partial-update type.
///
/// The patch type has one optional field per state field and a builder method
/// of the same name; [`Merge`](crate::Merge) copies every field that was set.
///
/// # Usage
///
/// ```
/// use marsview_core::{Merge, state};
///
/// state! {
///     #[derive(Debug, Default)]
///     pub struct SearchState => SearchPatch {
///         pub loading: bool,
///         pub page: u32,
///     }
/// }
///
/// let mut state = SearchState::default();
/// state.merge(SearchPatch::default().page(2));
/// state.merge(SearchPatch::default().loading(true));
/// assert_eq!(state.page, 2);
/// assert!(state.loading);
/// ```
#[macro_export]
macro_rules! state {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $patch:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        #[doc = concat!("Partial update for [`", stringify!($name), "`]. Unset fields keep their value.")]
        #[derive(Debug, Default)]
        #[must_use]
        $vis struct $patch {
            $(
                $field_vis $field: ::core::option::Option<$ty>,
            )*
        }

        #[allow(dead_code)]
        impl $patch {
            $(
                #[doc = concat!("Sets `", stringify!($field), "`.")]
                $field_vis fn $field(mut self, value: $ty) -> Self {
                    self.$field = ::core::option::Option::Some(value);
                    self
                }
            )*

            /// Returns `true` when no field is set.
            #[must_use]
            pub const fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }
        }

        impl $crate::Merge for $name {
            type Patch = $patch;

            fn merge(&mut self, patch: $patch) {
                $(
                    if let ::core::option::Option::Some(value) = patch.$field {
                        self.$field = value;
                    }
                )*
            }
        }
    };
}
