use std::sync::Arc;

use crate::debug::FnActualCall;
use crate::error::{FakeError, FakeResult};
use crate::handler::InvocationHandler;
use crate::matcher::ArgMatcher;
use crate::member::Members;
use crate::recorder::ActualInvocation;
use crate::session::Session;
use crate::table::{DispatchTable, Slot, SlotIndex};
use crate::trampoline::{AnyBox, Trampoline};
use crate::verify::{Expectation, InvocationPattern, Times};
use crate::{resolve, BehaviorSequence, DataMember, Interface, Method};

/// Identity of a [Session], unique within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub(crate) usize);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a proxy: the session it belongs to, and its index within that session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId {
    session: SessionId,
    index: usize,
}

impl ProxyId {
    pub(crate) const fn new(session: SessionId, index: usize) -> Self {
        Self { session, index }
    }

    /// The session the proxy records into.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Creation index of the proxy within its session, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Display for ProxyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// What happens when a slot without a trampoline is dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackMode {
    /// Fail the call with [FakeError::UnmockedMethodCall].
    Error,
    /// Record the call and delegate it to the real object.
    CallReal,
}

///
/// A fake object implementing the trait `I`, when `I` is `dyn Trait` for a trait annotated with [fake](crate::fake).
///
/// The proxy owns a dispatch table with one slot per trait method, a side table of
/// invocation handlers indexed by slot, and the faked data members of the trait.
/// Calls through [get](Self::get) are dispatched through the table.
///
/// # Example
/// ```rust
/// use polymock::*;
///
/// #[fake]
/// trait Greeter {
///     fn greet(&self, name: &str) -> String;
/// }
///
/// let mut greeter = Proxy::<dyn Greeter>::new();
/// greeter
///     .stub::<GreeterFake::greet>(
///         ArgMatcher::using(("world".to_string(),)),
///         Behavior::returns("hello world".to_string()).into(),
///     )
///     .unwrap();
///
/// assert_eq!("hello world", greeter.get().greet("world"));
/// ```
pub struct Proxy<I: ?Sized + Interface> {
    id: ProxyId,
    session: Session,
    fallback: FallbackMode,
    table: DispatchTable,
    handlers: Vec<Option<AnyBox>>,
    members: Members,
    real: Option<spin::Mutex<Box<I>>>,
}

impl<I: ?Sized + Interface> Proxy<I> {
    /// Create a proxy in its own session. Every method is unmocked.
    ///
    /// # Panics
    /// If the interface has more methods than the dispatch table holds.
    #[track_caller]
    pub fn new() -> Self {
        Session::new().proxy()
    }

    /// Create a proxy in its own session, reporting an oversized interface as an error.
    pub fn try_new() -> FakeResult<Self> {
        Session::new().try_proxy()
    }

    /// Create a proxy over a real object, in its own session.
    ///
    /// Methods that are not stubbed delegate to the real object. Those calls are recorded too.
    #[track_caller]
    pub fn spy(real: Box<I>) -> Self {
        Session::new().spy(real)
    }

    pub(crate) fn build(
        session: Session,
        fallback: FallbackMode,
        real: Option<Box<I>>,
    ) -> FakeResult<Self> {
        let table = DispatchTable::new(I::NAME, I::METHODS)?;
        let id = session.next_proxy_id();
        tracing::debug!(
            interface = I::NAME,
            proxy = %id,
            slots = table.len(),
            capacity = table.size(),
            ?fallback,
            "created proxy"
        );

        Ok(Self {
            id,
            fallback,
            handlers: (0..table.len()).map(|_| None).collect(),
            table,
            members: Members::new::<I>(),
            real: real.map(spin::Mutex::new),
            session,
        })
    }

    /// View the proxy as the faked trait object.
    pub fn get(&self) -> &I {
        I::upcast(self)
    }

    /// View the proxy as the mutable faked trait object.
    pub fn get_mut(&mut self) -> &mut I {
        I::upcast_mut(self)
    }

    /// The identity of this proxy within its session.
    pub fn id(&self) -> ProxyId {
        self.id
    }

    /// The session this proxy records into.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The fallback mode chosen at construction.
    pub fn fallback_mode(&self) -> FallbackMode {
        self.fallback
    }

    /// Install a handler for the method `M`.
    ///
    /// A handler installed earlier for the same method is replaced.
    pub fn stub_method<M: Method<Interface = I>>(
        &mut self,
        handler: impl Into<InvocationHandler<M>>,
    ) -> FakeResult<()> {
        let slot = resolve::<M>()?;
        let handler: InvocationHandler<M> = handler.into();

        tracing::debug!(
            interface = I::NAME,
            proxy = %self.id,
            method = M::NAME,
            %slot,
            stubbings = handler.len(),
            "installing trampoline"
        );

        self.table.set_slot(
            slot,
            Slot::Trampoline(Trampoline::<M>::generate(slot).into_dyn()),
        );
        self.handlers[slot.0] = Some(Box::new(handler));

        Ok(())
    }

    /// Add one (matcher, sequence) pair to the handler of the method `M`, installing the handler when absent.
    ///
    /// The pair takes precedence over every pair registered before it for the same method.
    pub fn stub<M: Method<Interface = I>>(
        &mut self,
        matcher: ArgMatcher<M>,
        sequence: BehaviorSequence<M>,
    ) -> FakeResult<()> {
        let slot = resolve::<M>()?;
        let id = self.id;

        match self.handler_mut::<M>(slot) {
            Some(handler) => {
                handler.add(matcher, sequence);
                tracing::debug!(
                    interface = I::NAME,
                    proxy = %id,
                    method = M::NAME,
                    stubbings = handler.len(),
                    "added stubbing"
                );
                Ok(())
            }
            None => self.stub_method::<M>(InvocationHandler::new().with(matcher, sequence)),
        }
    }

    /// Whether a handler is installed for the method `M`.
    pub fn is_stubbed<M: Method<Interface = I>>(&self) -> bool {
        match resolve::<M>() {
            Ok(slot) => !self.table.is_unmocked(slot) && self.handler::<M>(slot).is_some(),
            Err(_) => false,
        }
    }

    /// Construct the data member `D` with its default value and return it.
    ///
    /// Stubbing a member again replaces it. The old value is dropped.
    pub fn stub_data_member<D: DataMember<Interface = I>>(&mut self) -> FakeResult<&mut D::Value> {
        self.members.construct::<D>()
    }

    /// Whether the data member `D` has been stubbed.
    pub fn is_data_member_stubbed<D: DataMember<Interface = I>>(&self) -> bool {
        self.members.is_constructed::<D>()
    }

    /// Read the data member `D`.
    pub fn member<D: DataMember<Interface = I>>(&self) -> FakeResult<&D::Value> {
        self.members.get::<D>()
    }

    /// Write the data member `D`.
    pub fn member_mut<D: DataMember<Interface = I>>(&mut self) -> FakeResult<&mut D::Value> {
        self.members.get_mut::<D>()
    }

    /// Call the method `M` through the dispatch table, without panicking on failure.
    pub fn try_call<M: Method<Interface = I>>(&self, args: M::Args) -> FakeResult<M::Output> {
        let slot = resolve::<M>()?;
        self.dispatch::<M>(slot, args)
    }

    /// A pattern matching calls of the method `M` on this proxy, for use in an [Expectation].
    pub fn invocation<M: Method<Interface = I>>(&self, matcher: ArgMatcher<M>) -> InvocationPattern {
        InvocationPattern::new::<M>(self.id, matcher)
    }

    /// Verify how many calls of the method `M` on this proxy were accepted by `matcher`.
    pub fn verify<M: Method<Interface = I>>(
        &self,
        matcher: ArgMatcher<M>,
        times: Times,
    ) -> FakeResult<()> {
        self.session
            .verify_in_order(&Expectation::new().then(self.invocation(matcher)), times)
    }

    /// Verify that every call on this proxy has been accounted for by an earlier successful verification.
    pub fn verify_no_other_invocations(&self) -> FakeResult<()> {
        self.session.verify_no_other_invocations(&[self.id])
    }

    /// The recorded calls on this proxy, in call order.
    pub fn invocations(&self) -> Vec<Arc<ActualInvocation>> {
        self.session.recorder().invocations_of(&[self.id].into())
    }

    pub(crate) fn dispatch<M: Method<Interface = I>>(
        &self,
        slot: SlotIndex,
        args: M::Args,
    ) -> FakeResult<M::Output> {
        match self.table.slot(slot) {
            Some(Slot::Trampoline(installed)) => match installed.downcast::<M>() {
                Some(trampoline) if trampoline.slot() == slot => trampoline.invoke(self, args),
                _ => Err(FakeError::Downcast {
                    call: FnActualCall::new::<M>(&args),
                    slot,
                    installed: installed.info(),
                }),
            },
            Some(Slot::Unmocked) | None => match self.fallback {
                FallbackMode::Error => Err(FakeError::UnmockedMethodCall {
                    call: FnActualCall::new::<M>(&args),
                }),
                FallbackMode::CallReal => {
                    self.record::<M>(&args);
                    self.call_real::<M>(args)
                }
            },
        }
    }

    pub(crate) fn record<M: Method>(&self, args: &M::Args) -> Arc<ActualInvocation> {
        self.session.recorder().record::<M>(self.id, args)
    }

    pub(crate) fn handler<M: Method>(&self, slot: SlotIndex) -> Option<&InvocationHandler<M>> {
        self.handlers.get(slot.0)?.as_ref()?.downcast_ref()
    }

    fn handler_mut<M: Method>(&mut self, slot: SlotIndex) -> Option<&mut InvocationHandler<M>> {
        self.handlers.get_mut(slot.0)?.as_mut()?.downcast_mut()
    }

    pub(crate) fn call_real<M: Method<Interface = I>>(&self, args: M::Args) -> FakeResult<M::Output> {
        let real = self.real.as_ref().ok_or_else(|| FakeError::NoRealObject {
            call: FnActualCall::new::<M>(&args),
        })?;

        // The real object stays locked for the whole call, so a call reaching it again fails.
        match real.try_lock() {
            Some(mut real) => Ok(M::call_real(&mut **real, args)),
            None => Err(FakeError::RealObjectBusy {
                call: FnActualCall::new::<M>(&args),
            }),
        }
    }
}

impl<I: ?Sized + Interface> Default for Proxy<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized + Interface> std::fmt::Debug for Proxy<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("interface", &I::NAME)
            .field("id", &self.id)
            .field("fallback", &self.fallback)
            .finish()
    }
}
