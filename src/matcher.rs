use crate::Method;

///
/// A predicate over the arguments of one call to the method `M`.
///
pub struct ArgMatcher<M: Method> {
    kind: MatcherKind<M>,
}

enum MatcherKind<M: Method> {
    Any,
    Using {
        expected: M::Args,
        eq: fn(&M::Args, &M::Args) -> bool,
    },
    #[allow(clippy::type_complexity)]
    Matching(Box<dyn Fn(&M::Args) -> bool + Send + Sync>),
}

impl<M: Method> ArgMatcher<M> {
    /// Match any call.
    pub fn any() -> Self {
        Self {
            kind: MatcherKind::Any,
        }
    }

    /// Match calls whose arguments equal `expected`, compared pairwise with [PartialEq].
    pub fn using(expected: M::Args) -> Self
    where
        M::Args: PartialEq,
    {
        Self {
            kind: MatcherKind::Using {
                expected,
                eq: <M::Args as PartialEq>::eq,
            },
        }
    }

    /// Match calls whose arguments satisfy a predicate.
    pub fn matching(predicate: impl Fn(&M::Args) -> bool + Send + Sync + 'static) -> Self {
        Self {
            kind: MatcherKind::Matching(Box::new(predicate)),
        }
    }

    /// Evaluate the matcher against an argument snapshot.
    pub fn matches(&self, args: &M::Args) -> bool {
        match &self.kind {
            MatcherKind::Any => true,
            MatcherKind::Using { expected, eq } => eq(args, expected),
            MatcherKind::Matching(predicate) => predicate(args),
        }
    }

    /// Render the matcher as an argument list, e.g. `(5, "x")`, `(..)` or `(?)`.
    pub fn describe(&self) -> String {
        match &self.kind {
            MatcherKind::Any => "(..)".to_string(),
            MatcherKind::Using { expected, .. } => M::debug_args(expected),
            MatcherKind::Matching(_) => "(?)".to_string(),
        }
    }
}

impl<M: Method> Default for ArgMatcher<M> {
    fn default() -> Self {
        Self::any()
    }
}
