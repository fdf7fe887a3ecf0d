//! Behaviors are the programmed responses of a stubbed method.

use std::sync::Arc;

use crate::Method;

/// How often a [Behavior] responds before the sequence moves on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Respond once, then advance to the next behavior.
    Once,
    /// Respond to every remaining call. The sequence never advances past it.
    Forever,
}

/// What a behavior does when it is reached.
pub(crate) enum Action<M: Method> {
    #[allow(clippy::type_complexity)]
    Answer(Arc<dyn Fn(M::Args) -> M::Output + Send + Sync>),
    Panic(Arc<str>),
    CallReal,
}

impl<M: Method> Clone for Action<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Answer(answer) => Self::Answer(answer.clone()),
            Self::Panic(msg) => Self::Panic(msg.clone()),
            Self::CallReal => Self::CallReal,
        }
    }
}

///
/// One programmed response of a stubbed method.
///
pub struct Behavior<M: Method> {
    repeat: Repeat,
    action: Action<M>,
}

impl<M: Method> Behavior<M> {
    /// Return a value once.
    ///
    /// The value is moved out on the call, so it does not need to be [Clone].
    pub fn returns_once(value: M::Output) -> Self
    where
        M::Output: Send,
    {
        let cell = spin::Mutex::new(Some(value));
        Self::answers_once(move |_| match cell.lock().take() {
            Some(value) => value,
            None => panic!("Behavior::returns_once: value already taken"),
        })
    }

    /// Return a clone of the value on every call.
    pub fn returns(value: M::Output) -> Self
    where
        M::Output: Clone + Send + Sync,
    {
        Self::answers(move |_| value.clone())
    }

    /// Compute the output from the arguments, once.
    pub fn answers_once(answer: impl Fn(M::Args) -> M::Output + Send + Sync + 'static) -> Self {
        Self {
            repeat: Repeat::Once,
            action: Action::Answer(Arc::new(answer)),
        }
    }

    /// Compute the output from the arguments, on every call.
    pub fn answers(answer: impl Fn(M::Args) -> M::Output + Send + Sync + 'static) -> Self {
        Self {
            repeat: Repeat::Forever,
            action: Action::Answer(Arc::new(answer)),
        }
    }

    /// Fail the call with an explicit panic.
    pub fn panics(repeat: Repeat, msg: impl Into<String>) -> Self {
        Self {
            repeat,
            action: Action::Panic(Arc::from(msg.into())),
        }
    }

    /// Delegate the call to the real object the proxy wraps, see [Proxy::spy](crate::Proxy::spy).
    pub fn calls_real(repeat: Repeat) -> Self {
        Self {
            repeat,
            action: Action::CallReal,
        }
    }

    /// How often this behavior responds.
    pub fn repeat(&self) -> Repeat {
        self.repeat
    }
}

/// Observable state of a [BehaviorSequence].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceState {
    /// Behaviors remain to be consumed.
    Pending,
    /// All behaviors were consumed and none of them repeats.
    ExhaustedFinite,
    /// A [Repeat::Forever] behavior was reached. Terminal.
    Repeating,
}

///
/// An ordered list of behaviors for one stubbing.
///
/// Every call consumes the behavior at the cursor: a [Repeat::Once] behavior advances
/// the cursor, a [Repeat::Forever] behavior keeps it in place.
///
pub struct BehaviorSequence<M: Method> {
    behaviors: Vec<Behavior<M>>,
    cursor: spin::Mutex<usize>,
}

impl<M: Method> BehaviorSequence<M> {
    /// An empty sequence. Calling into it reports exhaustion.
    pub fn new() -> Self {
        Self {
            behaviors: vec![],
            cursor: spin::Mutex::new(0),
        }
    }

    /// Append a behavior, builder style.
    pub fn then(mut self, behavior: Behavior<M>) -> Self {
        self.push(behavior);
        self
    }

    /// Append a behavior.
    pub fn push(&mut self, behavior: Behavior<M>) -> &mut Self {
        self.behaviors.push(behavior);
        self
    }

    /// Number of behaviors in the sequence.
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Whether the sequence has no behaviors.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// The current state.
    pub fn state(&self) -> SequenceState {
        let cursor = *self.cursor.lock();
        match self.behaviors.get(cursor) {
            None => SequenceState::ExhaustedFinite,
            Some(behavior) if behavior.repeat == Repeat::Forever => SequenceState::Repeating,
            Some(_) => SequenceState::Pending,
        }
    }

    /// Consume the behavior at the cursor.
    ///
    /// Returns `None` when the sequence is exhausted.
    pub(crate) fn next_action(&self) -> Option<Action<M>> {
        let mut cursor = self.cursor.lock();
        let behavior = self.behaviors.get(*cursor)?;
        if behavior.repeat == Repeat::Once {
            *cursor += 1;
        }

        Some(behavior.action.clone())
    }
}

impl<M: Method> Default for BehaviorSequence<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Method> FromIterator<Behavior<M>> for BehaviorSequence<M> {
    fn from_iter<T: IntoIterator<Item = Behavior<M>>>(iter: T) -> Self {
        Self {
            behaviors: iter.into_iter().collect(),
            cursor: spin::Mutex::new(0),
        }
    }
}

impl<M: Method> From<Behavior<M>> for BehaviorSequence<M> {
    fn from(behavior: Behavior<M>) -> Self {
        Self::new().then(behavior)
    }
}
