use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{FakeError, FakeResult};
use crate::proxy::{FallbackMode, Proxy, ProxyId, SessionId};
use crate::recorder::{ActualInvocation, Recorder};
use crate::verify::{self, Expectation, Times};
use crate::Interface;

static NEXT_SESSION_ID: AtomicUsize = AtomicUsize::new(0);

struct SessionState {
    id: SessionId,
    recorder: Recorder,
    next_proxy_id: AtomicUsize,
    failures: spin::Mutex<Vec<FakeError>>,
}

///
/// The scope of one invocation log.
///
/// Proxies created from the same session share a sequence counter, so the relative
/// order of calls on different proxies can be verified. Cloning a session yields a
/// handle to the same log.
///
/// # Example
/// ```rust
/// use polymock::*;
///
/// #[fake]
/// trait Source {
///     fn read(&self) -> u8;
/// }
///
/// #[fake]
/// trait Sink {
///     fn write(&self, byte: u8);
/// }
///
/// let session = Session::new();
/// let mut source = session.proxy::<dyn Source>();
/// let mut sink = session.proxy::<dyn Sink>();
/// source.stub::<SourceFake::read>(ArgMatcher::any(), Behavior::returns(7).into()).unwrap();
/// sink.stub::<SinkFake::write>(ArgMatcher::any(), Behavior::returns(()).into()).unwrap();
///
/// sink.get().write(source.get().read());
///
/// session
///     .verify_in_order(
///         &Expectation::new()
///             .then(source.invocation::<SourceFake::read>(ArgMatcher::any()))
///             .then(sink.invocation::<SinkFake::write>(ArgMatcher::using((7,)))),
///         Times::Exactly(1),
///     )
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct Session {
    state: Arc<SessionState>,
}

impl Session {
    /// A new session with an empty log.
    pub fn new() -> Self {
        Self {
            state: Arc::new(SessionState {
                id: SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)),
                recorder: Recorder::new(),
                next_proxy_id: AtomicUsize::new(0),
                failures: spin::Mutex::new(vec![]),
            }),
        }
    }

    /// The identity of this session. Clones share it.
    pub fn id(&self) -> SessionId {
        self.state.id
    }

    /// Create a proxy in this session. Every method is unmocked.
    ///
    /// # Panics
    /// If the interface has more methods than the dispatch table holds.
    #[track_caller]
    pub fn proxy<I: ?Sized + Interface>(&self) -> Proxy<I> {
        match self.try_proxy() {
            Ok(proxy) => proxy,
            Err(error) => panic!("{}", self.prepare_panic(error)),
        }
    }

    /// Create a proxy in this session, reporting an oversized interface as an error.
    pub fn try_proxy<I: ?Sized + Interface>(&self) -> FakeResult<Proxy<I>> {
        Proxy::build(self.clone(), FallbackMode::Error, None)
    }

    /// Create a proxy over a real object in this session.
    ///
    /// # Panics
    /// If the interface has more methods than the dispatch table holds.
    #[track_caller]
    pub fn spy<I: ?Sized + Interface>(&self, real: Box<I>) -> Proxy<I> {
        match Proxy::build(self.clone(), FallbackMode::CallReal, Some(real)) {
            Ok(proxy) => proxy,
            Err(error) => panic!("{}", self.prepare_panic(error)),
        }
    }

    /// Every recorded invocation of the session, in call order.
    pub fn invocations(&self) -> Vec<Arc<ActualInvocation>> {
        self.state.recorder.invocations()
    }

    /// Errors that made calls through faked objects panic.
    pub fn failures(&self) -> Vec<FakeError> {
        self.state.failures.lock().clone()
    }

    /// Verify that the expectation occurs `times` times as an ordered subsequence of the calls
    /// made on the proxies it involves.
    ///
    /// Calls of other methods may come in between. Occurrences do not share calls.
    /// Patterns of proxies from another session are rejected with [FakeError::ForeignProxy].
    pub fn verify_in_order(&self, expectation: &Expectation, times: Times) -> FakeResult<()> {
        self.check_owned(expectation.proxies())?;
        verify::verify_in_order(&self.state.recorder, expectation, times)
    }

    /// Verify that the expectation occurs `times` times, in any order.
    ///
    /// Every expected element of every occurrence is assigned a distinct matching call.
    pub fn verify_in_any_order(&self, expectation: &Expectation, times: Times) -> FakeResult<()> {
        self.check_owned(expectation.proxies())?;
        verify::verify_in_any_order(&self.state.recorder, expectation, times)
    }

    /// Verify that every call on the given proxies was consumed by an earlier successful verification.
    pub fn verify_no_other_invocations(&self, proxies: &[ProxyId]) -> FakeResult<()> {
        let proxies: BTreeSet<ProxyId> = proxies.iter().copied().collect();
        self.check_owned(proxies.iter().copied())?;
        verify::verify_no_other_invocations(&self.state.recorder, &proxies)
    }

    pub(crate) fn recorder(&self) -> &Recorder {
        &self.state.recorder
    }

    pub(crate) fn next_proxy_id(&self) -> ProxyId {
        ProxyId::new(
            self.state.id,
            self.state.next_proxy_id.fetch_add(1, Ordering::SeqCst),
        )
    }

    fn check_owned(&self, proxies: impl IntoIterator<Item = ProxyId>) -> FakeResult<()> {
        match proxies
            .into_iter()
            .find(|proxy| proxy.session() != self.state.id)
        {
            Some(proxy) => Err(FakeError::ForeignProxy {
                proxy,
                session: self.state.id,
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn prepare_panic(&self, error: FakeError) -> String {
        let msg = format!("{error}");
        tracing::debug!(%msg, "failing call");

        self.state.failures.lock().push(error);

        msg
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.state.id)
            .field("invocations", &self.state.recorder.invocations().len())
            .finish()
    }
}
