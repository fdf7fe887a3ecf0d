use crate::debug::{FnActualCall, MethodInfo, StubbingDebug};
use crate::proxy::{ProxyId, SessionId};
use crate::table::SlotIndex;
use crate::verify::SequenceMismatch;

/// Result type of fallible polymock operations.
pub type FakeResult<T> = Result<T, FakeError>;

/// Everything that can go wrong while faking, calling or verifying.
///
/// Every variant carries enough structured data to render a diagnostic,
/// the [Display](std::fmt::Display) implementation is one such rendering.
#[derive(Clone, Debug)]
pub enum FakeError {
    /// A call reached a slot with no installed handler.
    UnmockedMethodCall {
        /// The call.
        call: FnActualCall,
    },
    /// A stubbed method was called more times than its behavior sequence supports.
    BehaviorExhausted {
        /// The call.
        call: FnActualCall,
        /// The stubbing whose sequence ran out.
        stubbing: StubbingDebug,
        /// How many behaviors the sequence had.
        configured: usize,
    },
    /// The method is stubbed, but none of its argument matchers accepted the call.
    NoMatchingStubbing {
        /// The call.
        call: FnActualCall,
        /// Number of registered stubbings for the method.
        stubbings: usize,
    },
    /// A behavior programmed to panic was reached.
    ExplicitPanic {
        /// The call.
        call: FnActualCall,
        /// The stubbing holding the behavior.
        stubbing: StubbingDebug,
        /// The programmed message.
        msg: String,
    },
    /// A call should be delegated to the real object, but the proxy has none.
    NoRealObject {
        /// The call.
        call: FnActualCall,
    },
    /// The real object was reached again while a call to it was in progress.
    RealObjectBusy {
        /// The call.
        call: FnActualCall,
    },
    /// A method could not be mapped to exactly one slot.
    SlotResolutionFailure {
        /// The trait.
        interface: &'static str,
        /// The method.
        method: &'static str,
        /// Why resolution failed.
        reason: SlotResolutionReason,
    },
    /// The trampoline installed at a slot belongs to another method.
    Downcast {
        /// The call.
        call: FnActualCall,
        /// The slot the call was dispatched through.
        slot: SlotIndex,
        /// The method whose trampoline occupies the slot.
        installed: MethodInfo,
    },
    /// The data member is not declared by the trait.
    MemberNotDeclared {
        /// The trait.
        interface: &'static str,
        /// The member.
        member: &'static str,
    },
    /// The data member was accessed before it was stubbed.
    MemberNotStubbed {
        /// The trait.
        interface: &'static str,
        /// The member.
        member: &'static str,
    },
    /// A proxy of another session was passed to a session's verification.
    ForeignProxy {
        /// The foreign proxy.
        proxy: ProxyId,
        /// The verifying session.
        session: SessionId,
    },
    /// An expected call sequence did not match the actual invocations.
    SequenceVerificationFailure(Box<SequenceMismatch>),
    /// Actual invocations remained that no verification accounted for.
    UnexpectedInvocation {
        /// The first unverified invocation.
        invocation: FnActualCall,
        /// Its sequence number within the session.
        seq: usize,
        /// Number of unverified invocations in total.
        remaining: usize,
    },
}

/// Why a method could not be resolved to a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotResolutionReason {
    /// The method is not part of the interface layout.
    NotDeclared,
    /// The method occupies several slots.
    Ambiguous(usize),
    /// The method's position lies beyond the dispatch table capacity.
    CapacityExceeded {
        /// Position of the method in the layout.
        position: usize,
        /// Capacity of the dispatch table.
        capacity: usize,
    },
}

impl std::fmt::Display for SlotResolutionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDeclared => write!(f, "method is not declared by the interface"),
            Self::Ambiguous(hits) => write!(f, "method occupies {hits} slots"),
            Self::CapacityExceeded { position, capacity } => write!(
                f,
                "method position {position} exceeds the dispatch table capacity of {capacity}"
            ),
        }
    }
}

impl std::fmt::Display for FakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmockedMethodCall { call } => {
                write!(f, "{call}: Unmocked method called. No stubbing installed.")
            }
            Self::BehaviorExhausted {
                call,
                stubbing,
                configured,
            } => {
                write!(f, "{call}: No more invocations configured for {stubbing}. All {configured} behaviors have been used.")
            }
            Self::NoMatchingStubbing { call, stubbings } => {
                write!(
                    f,
                    "{call}: No matching stubbing. None of {stubbings} argument matchers accepted the call."
                )
            }
            Self::ExplicitPanic {
                call,
                stubbing,
                msg,
            } => write!(f, "{call}: Explicit panic from {stubbing}: {msg}"),
            Self::NoRealObject { call } => {
                write!(
                    f,
                    "{call}: Cannot call the real method. The proxy does not wrap a real object."
                )
            }
            Self::RealObjectBusy { call } => {
                write!(
                    f,
                    "{call}: Cannot call the real method. The real object is already executing a call of this proxy."
                )
            }
            Self::SlotResolutionFailure {
                interface,
                method,
                reason,
            } => write!(f, "{interface}::{method}: Slot resolution failed: {reason}."),
            Self::Downcast {
                call,
                slot,
                installed,
            } => {
                write!(
                    f,
                    "{call}: Fatal: The trampoline at slot {slot} belongs to {installed}."
                )
            }
            Self::MemberNotDeclared { interface, member } => {
                write!(f, "{interface}::{member}: Not a data member of {interface}.")
            }
            Self::MemberNotStubbed { interface, member } => {
                write!(
                    f,
                    "{interface}::{member}: Data member accessed before it was stubbed."
                )
            }
            Self::ForeignProxy { proxy, session } => write!(
                f,
                "Proxy {proxy} belongs to session {}, it cannot be verified in session {session}.",
                proxy.session()
            ),
            Self::SequenceVerificationFailure(mismatch) => write!(f, "{mismatch}"),
            Self::UnexpectedInvocation {
                invocation,
                seq,
                remaining,
            } => {
                write!(f, "Expected no more invocations, but {invocation} (invocation {seq}) was never verified. {remaining} unverified in total.")
            }
        }
    }
}

impl std::error::Error for FakeError {}
