use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::debug::{FnActualCall, MethodInfo};
use crate::proxy::ProxyId;
use crate::trampoline::AnyBox;
use crate::Method;

///
/// An immutable record of one call that reached a stubbed method.
///
pub struct ActualInvocation {
    seq: usize,
    proxy: ProxyId,
    info: MethodInfo,
    args: AnyBox,
    args_debug: String,
}

impl ActualInvocation {
    /// Sequence number within the session. The first invocation is `1`.
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// The proxy that was called.
    pub fn proxy(&self) -> ProxyId {
        self.proxy
    }

    /// The called method.
    pub fn method(&self) -> MethodInfo {
        self.info
    }

    /// Whether this is an invocation of `M`.
    pub fn is<M: Method>(&self) -> bool {
        self.info.is::<M>()
    }

    /// The argument snapshot, if this is an invocation of `M`.
    pub fn args<M: Method>(&self) -> Option<&M::Args> {
        if !self.is::<M>() {
            return None;
        }
        self.args.downcast_ref()
    }

    /// The rendered call.
    pub fn call(&self) -> FnActualCall {
        FnActualCall {
            info: self.info,
            inputs_debug: self.args_debug.clone(),
        }
    }
}

impl std::fmt::Display for ActualInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.info, self.args_debug)
    }
}

impl std::fmt::Debug for ActualInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActualInvocation")
            .field("seq", &self.seq)
            .field("proxy", &self.proxy)
            .field("call", &format_args!("{self}"))
            .finish()
    }
}

/// Append-only invocation log of a session.
pub(crate) struct Recorder {
    next_seq: AtomicUsize,
    log: spin::Mutex<Vec<Arc<ActualInvocation>>>,
    verified: spin::Mutex<BTreeSet<usize>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            next_seq: AtomicUsize::new(1),
            log: spin::Mutex::new(vec![]),
            verified: spin::Mutex::new(BTreeSet::new()),
        }
    }

    pub fn record<M: Method>(&self, proxy: ProxyId, args: &M::Args) -> Arc<ActualInvocation> {
        let mut log = self.log.lock();

        // The sequence number is taken under the log lock, so the log stays sorted.
        let invocation = Arc::new(ActualInvocation {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
            proxy,
            info: MethodInfo::of::<M>(),
            args: Box::new(args.clone()),
            args_debug: M::debug_args(args),
        });
        tracing::trace!(seq = invocation.seq, %proxy, call = %invocation, "recorded invocation");

        log.push(invocation.clone());
        invocation
    }

    /// All invocations, ordered by sequence number.
    pub fn invocations(&self) -> Vec<Arc<ActualInvocation>> {
        self.log.lock().clone()
    }

    /// Invocations of the given proxies, ordered by sequence number.
    pub fn invocations_of(&self, proxies: &BTreeSet<ProxyId>) -> Vec<Arc<ActualInvocation>> {
        self.log
            .lock()
            .iter()
            .filter(|invocation| proxies.contains(&invocation.proxy))
            .cloned()
            .collect()
    }

    pub fn mark_verified(&self, seqs: impl IntoIterator<Item = usize>) {
        self.verified.lock().extend(seqs);
    }

    pub fn is_verified(&self, seq: usize) -> bool {
        self.verified.lock().contains(&seq)
    }
}
