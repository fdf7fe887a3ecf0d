//! Trampolines are the callables installed into dispatch table slots.
//!
//! A [Trampoline] is generated per method type and carries the slot it was generated for.
//! Invoking it recovers the proxy from the receiver of the call, finds the handler in the
//! proxy's side table at its own slot, and forwards the arguments to it.

use std::any::Any;
use std::marker::PhantomData;

use crate::behavior::Action;
use crate::debug::MethodInfo;
use crate::error::{FakeError, FakeResult};
use crate::table::SlotIndex;
use crate::{Method, Proxy};

pub(crate) type AnyBox = Box<dyn Any + Send + Sync + 'static>;

pub(crate) struct Trampoline<M: Method> {
    slot: SlotIndex,
    _method: PhantomData<fn(M)>,
}

impl<M: Method> Trampoline<M> {
    pub fn generate(slot: SlotIndex) -> Self {
        Self {
            slot,
            _method: PhantomData,
        }
    }

    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    pub fn into_dyn(self) -> DynTrampoline {
        DynTrampoline {
            info: MethodInfo::of::<M>(),
            inner: Box::new(self),
        }
    }

    pub fn invoke(&self, proxy: &Proxy<M::Interface>, args: M::Args) -> FakeResult<M::Output> {
        let invocation = proxy.record::<M>(&args);

        let handler =
            proxy
                .handler::<M>(self.slot)
                .ok_or_else(|| FakeError::UnmockedMethodCall {
                    call: invocation.call(),
                })?;

        let (pat_index, action) = handler.next_action(&args, || invocation.call())?;

        match action {
            Action::Answer(answer) => Ok(answer(args)),
            Action::Panic(msg) => Err(FakeError::ExplicitPanic {
                call: invocation.call(),
                stubbing: handler.debug_stubbing(pat_index),
                msg: msg.to_string(),
            }),
            Action::CallReal => proxy.call_real::<M>(args),
        }
    }
}

/// Type-erased trampoline, as stored in a slot.
pub(crate) struct DynTrampoline {
    info: MethodInfo,
    inner: AnyBox,
}

impl DynTrampoline {
    pub fn info(&self) -> MethodInfo {
        self.info
    }

    pub fn downcast<M: Method>(&self) -> Option<&Trampoline<M>> {
        self.inner.downcast_ref()
    }
}
