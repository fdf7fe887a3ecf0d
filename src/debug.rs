use std::any::TypeId;

use crate::{Interface, Method};

/// Static information about a faked method.
#[derive(Clone, Copy, Debug)]
pub struct MethodInfo {
    type_id: TypeId,
    interface: &'static str,
    name: &'static str,
}

impl MethodInfo {
    /// Information about the method `M`.
    pub fn of<M: Method>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            interface: <M::Interface as Interface>::NAME,
            name: M::NAME,
        }
    }

    /// The name of the trait.
    pub fn interface(&self) -> &'static str {
        self.interface
    }

    /// The name of the method.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn is<M: Method>(&self) -> bool {
        self.type_id == TypeId::of::<M>()
    }
}

impl PartialEq for MethodInfo {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for MethodInfo {}

impl std::fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.interface, self.name)
    }
}

/// A rendered call: method and arguments.
#[derive(Clone, Debug)]
pub struct FnActualCall {
    pub(crate) info: MethodInfo,
    pub(crate) inputs_debug: String,
}

impl FnActualCall {
    pub(crate) fn new<M: Method>(args: &M::Args) -> Self {
        Self {
            info: MethodInfo::of::<M>(),
            inputs_debug: M::debug_args(args),
        }
    }

    /// The called method.
    pub fn method(&self) -> MethodInfo {
        self.info
    }

    /// The rendered arguments, e.g. `(5, "x")`.
    pub fn inputs(&self) -> &str {
        &self.inputs_debug
    }
}

impl std::fmt::Display for FnActualCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.info, self.inputs_debug)
    }
}

/// Position of a (matcher, sequence) pair within a method's handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PatIndex(pub usize);

impl std::fmt::Display for PatIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rendered stubbing: method, argument matcher and its position within the method's handler.
#[derive(Clone, Debug)]
pub struct StubbingDebug {
    pub(crate) info: MethodInfo,
    pub(crate) matcher_debug: String,
    pub(crate) pat_index: PatIndex,
}

impl StubbingDebug {
    /// The stubbed method.
    pub fn method(&self) -> MethodInfo {
        self.info
    }

    /// Registration index of the stubbing within the method's handler.
    pub fn index(&self) -> usize {
        self.pat_index.0
    }
}

impl std::fmt::Display for StubbingDebug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} [{}]",
            self.info, self.matcher_debug, self.pat_index
        )
    }
}
