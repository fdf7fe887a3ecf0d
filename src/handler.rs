use crate::behavior::{Action, BehaviorSequence};
use crate::debug::{FnActualCall, MethodInfo, PatIndex, StubbingDebug};
use crate::error::{FakeError, FakeResult};
use crate::matcher::ArgMatcher;
use crate::Method;

/// One (matcher, sequence) pair.
struct Stubbing<M: Method> {
    matcher: ArgMatcher<M>,
    sequence: BehaviorSequence<M>,
}

///
/// Everything programmed for one method of one proxy.
///
/// A handler holds any number of (matcher, sequence) pairs. A call is served by the
/// most recently registered pair whose matcher accepts the arguments.
///
pub struct InvocationHandler<M: Method> {
    stubbings: Vec<Stubbing<M>>,
}

impl<M: Method> InvocationHandler<M> {
    /// A handler without stubbings. Every call to it fails with
    /// [FakeError::NoMatchingStubbing].
    pub fn new() -> Self {
        Self { stubbings: vec![] }
    }

    /// Register a pair, builder style.
    pub fn with(mut self, matcher: ArgMatcher<M>, sequence: BehaviorSequence<M>) -> Self {
        self.add(matcher, sequence);
        self
    }

    /// Register a pair. It takes precedence over all pairs registered before it.
    pub fn add(&mut self, matcher: ArgMatcher<M>, sequence: BehaviorSequence<M>) {
        self.stubbings.push(Stubbing { matcher, sequence });
    }

    /// Number of registered pairs.
    pub fn len(&self) -> usize {
        self.stubbings.len()
    }

    /// Whether no pairs are registered.
    pub fn is_empty(&self) -> bool {
        self.stubbings.is_empty()
    }

    /// Select the stubbing for a call and consume its next behavior.
    pub(crate) fn next_action(
        &self,
        args: &M::Args,
        fn_call: impl Fn() -> FnActualCall,
    ) -> FakeResult<(PatIndex, Action<M>)> {
        let (pat_index, stubbing) = self
            .stubbings
            .iter()
            .enumerate()
            .rev()
            .find(|(_, stubbing)| stubbing.matcher.matches(args))
            .map(|(index, stubbing)| (PatIndex(index), stubbing))
            .ok_or_else(|| FakeError::NoMatchingStubbing {
                call: fn_call(),
                stubbings: self.stubbings.len(),
            })?;

        match stubbing.sequence.next_action() {
            Some(action) => Ok((pat_index, action)),
            None => Err(FakeError::BehaviorExhausted {
                call: fn_call(),
                stubbing: self.debug_stubbing(pat_index),
                configured: stubbing.sequence.len(),
            }),
        }
    }

    pub(crate) fn debug_stubbing(&self, pat_index: PatIndex) -> StubbingDebug {
        StubbingDebug {
            info: MethodInfo::of::<M>(),
            matcher_debug: self
                .stubbings
                .get(pat_index.0)
                .map(|stubbing| stubbing.matcher.describe())
                .unwrap_or_default(),
            pat_index,
        }
    }
}

impl<M: Method> Default for InvocationHandler<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Method> From<BehaviorSequence<M>> for InvocationHandler<M> {
    fn from(sequence: BehaviorSequence<M>) -> Self {
        Self::new().with(ArgMatcher::any(), sequence)
    }
}
