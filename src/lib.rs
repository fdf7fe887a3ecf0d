//!
//! `polymock` fabricates fake objects for trait objects at runtime.
//!
//! A trait annotated with [fake] gets a dispatch table emulation: every method call on a
//! [`Proxy<dyn Trait>`](Proxy) goes through a slot of that table. Slots that have been stubbed
//! hold a trampoline which routes the call into a programmable [BehaviorSequence], and every
//! such call is recorded in the [Session] the proxy belongs to, so that calls can be verified
//! afterwards, also across several proxies.
//!
//! ```rust
//! use polymock::*;
//!
//! #[fake]
//! trait Calculator {
//!     fn add(&self, a: i32, b: i32) -> i32;
//! }
//!
//! fn sum(calc: &dyn Calculator) -> i32 {
//!     calc.add(1, 2) + calc.add(3, 4)
//! }
//!
//! let mut calc = Proxy::<dyn Calculator>::new();
//! calc.stub::<CalculatorFake::add>(
//!     ArgMatcher::any(),
//!     BehaviorSequence::new()
//!         .then(Behavior::returns_once(1))
//!         .then(Behavior::returns(2)),
//! )
//! .unwrap();
//!
//! assert_eq!(3, sum(calc.get()));
//!
//! calc.verify::<CalculatorFake::add>(ArgMatcher::using((3, 4)), Times::Exactly(1))
//!     .unwrap();
//! ```
//!
//! # Sessions
//! All proxies created from the same [Session] share one invocation log and one sequence
//! counter, which makes the relative order of calls on different proxies observable.
//! Nothing is process-wide: tests running in parallel use separate sessions.
//!
//! # Failures
//! Operations that configure or verify return [FakeResult]. A call through the faked trait
//! has no error channel, so a failing call (for example an [unmocked](FakeError::UnmockedMethodCall)
//! method) panics with the [FakeError] message. The error is also kept in the session,
//! see [Session::failures].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod behavior;
mod debug;
mod error;
mod handler;
mod matcher;
mod member;
mod proxy;
mod recorder;
mod resolve;
mod session;
mod table;
mod trampoline;
mod verify;

#[cfg(test)]
mod test_interface;

#[doc(hidden)]
pub mod private;

pub use behavior::{Behavior, BehaviorSequence, Repeat, SequenceState};
pub use debug::{FnActualCall, MethodInfo, StubbingDebug};
pub use error::{FakeError, FakeResult, SlotResolutionReason};
pub use handler::InvocationHandler;
pub use matcher::ArgMatcher;
pub use proxy::{FallbackMode, Proxy, ProxyId, SessionId};
pub use recorder::ActualInvocation;
pub use resolve::resolve;
pub use session::Session;
pub use table::{SlotIndex, MAX_SLOTS};
pub use verify::{Expectation, InvocationPattern, SequenceMismatch, Times, VerificationOrder};

///
/// Generate a fake implementation of a trait.
///
/// The macro keeps the trait as it is and additionally generates:
/// 1. An [Interface] implementation for `dyn Trait`, describing the method layout.
/// 2. A module, by default named `TraitFake`, with one [Method] type per trait method
///    and one [DataMember] type per data member.
/// 3. An implementation of the trait for [`Proxy<dyn Trait>`](Proxy).
///
/// # Attributes
/// * `api = Ident`: the name of the generated module.
/// * `prefix = path`: path to the polymock crate, `::polymock` by default.
///
/// A method annotated with `#[fake(member = name)]` is not dispatched through the table.
/// It must take no arguments and return `&T` from `&self` or `&mut T` from `&mut self`, and
/// accesses the faked data member `name` of type `T` instead, see [Proxy::stub_data_member].
///
/// ```rust
/// use polymock::*;
///
/// #[fake(api = StoreApi)]
/// trait Store {
///     fn get(&self, key: &str) -> Option<String>;
///     fn put(&mut self, key: String, value: String);
///
///     #[fake(member = hits)]
///     fn hits(&self) -> &u64;
///
///     #[fake(member = hits)]
///     fn hits_mut(&mut self) -> &mut u64;
/// }
/// ```
pub use polymock_macros::fake;

/// Description of a faked trait, implemented for `dyn Trait` by [fake].
///
/// The descriptor is only used to size and validate the dispatch table and the
/// data member region of a [Proxy].
pub trait Interface: 'static {
    /// The name of the trait.
    const NAME: &'static str;

    /// Names of the dispatched methods, in declaration order.
    /// The position of a method in this list is its slot.
    const METHODS: &'static [&'static str];

    /// Names of the data members.
    const MEMBERS: &'static [&'static str];

    /// View a proxy as the trait object.
    fn upcast(proxy: &Proxy<Self>) -> &Self;

    /// View a proxy as the mutable trait object.
    fn upcast_mut(proxy: &mut Proxy<Self>) -> &mut Self;
}

///
/// The identity of one faked method.
///
/// Types implementing this trait are generated by [fake]. They serve the same purpose as a
/// pointer to a virtual method: naming a method without calling it.
///
pub trait Method: Sized + 'static {
    /// The faked trait this method belongs to.
    type Interface: ?Sized + Interface;

    /// Owned snapshot of the arguments, as a tuple.
    /// Reference arguments are snapshotted through [ToOwned].
    type Args: Clone + Send + Sync + 'static;

    /// The return type of the method.
    type Output: 'static;

    /// The name of the method.
    const NAME: &'static str;

    /// Render an argument snapshot, e.g. `(5, "x")`.
    fn debug_args(args: &Self::Args) -> String;

    /// Call this method on a real implementation of the trait.
    fn call_real(real: &mut Self::Interface, args: Self::Args) -> Self::Output;
}

/// The identity of one faked data member, generated by [fake].
pub trait DataMember: 'static {
    /// The faked trait this member belongs to.
    type Interface: ?Sized + Interface;

    /// The type of the member. It is default-constructed when stubbed.
    type Value: Default + Send + Sync + 'static;

    /// The name of the member.
    const NAME: &'static str;
}
