//! Shallow state merging.

/// State that can absorb a partial update.
///
/// Merging is shallow: every field present in the patch overrides the
/// current value, every other field is left untouched. The [`state!`]
/// macro derives an implementation together with its patch type.
///
/// [`state!`]: crate::state
pub trait Merge {
    /// The partial update accepted by [`Merge::merge`].
    type Patch;

    /// Applies `patch` on top of `self`.
    fn merge(&mut self, patch: Self::Patch);
}

impl Merge for () {
    type Patch = ();

    fn merge(&mut self, (): ()) {}
}

#[cfg(test)]
mod tests {
    use super::Merge;

    crate::state! {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        struct Counters => CountersPatch {
            a: u32,
            b: u32,
            label: Option<&'static str>,
        }
    }

    #[test]
    fn unrelated_keys_survive_successive_merges() {
        let mut state = Counters::default();
        state.merge(CountersPatch::default().a(1));
        state.merge(CountersPatch::default().b(2));
        assert_eq!(state.a, 1);
        assert_eq!(state.b, 2);
    }

    #[test]
    fn patch_can_reset_optional_fields() {
        let mut state = Counters {
            label: Some("loading"),
            ..Counters::default()
        };
        state.merge(CountersPatch::default().label(None));
        assert_eq!(state.label, None);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut state = Counters { a: 4, b: 5, label: Some("x") };
        let before = state.clone();
        state.merge(CountersPatch::default());
        assert_eq!(state, before);
        assert!(CountersPatch::default().is_empty());
    }
}
