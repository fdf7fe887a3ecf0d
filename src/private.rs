//! Support functions called by the code generated by [fake](crate::fake).

use crate::table::SlotIndex;
use crate::{DataMember, Method, Proxy};

/// Dispatch a call through the slot `slot` of the proxy's dispatch table.
///
/// A failing call panics with the error message, after storing the error in the session.
#[track_caller]
pub fn dispatch<M: Method>(proxy: &Proxy<M::Interface>, slot: usize, args: M::Args) -> M::Output {
    match proxy.dispatch::<M>(SlotIndex(slot), args) {
        Ok(output) => output,
        Err(error) => panic!("{}", proxy.session().prepare_panic(error)),
    }
}

/// Read a faked data member through the faked object.
#[track_caller]
pub fn member<D: DataMember>(proxy: &Proxy<D::Interface>) -> &D::Value {
    match proxy.member::<D>() {
        Ok(value) => value,
        Err(error) => panic!("{}", proxy.session().prepare_panic(error)),
    }
}

/// Write a faked data member through the faked object.
#[track_caller]
pub fn member_mut<D: DataMember>(proxy: &mut Proxy<D::Interface>) -> &mut D::Value {
    let session = proxy.session().clone();
    match proxy.member_mut::<D>() {
        Ok(value) => value,
        Err(error) => panic!("{}", session.prepare_panic(error)),
    }
}

/// Render optionally debuggable arguments as an argument list.
pub fn format_inputs(inputs: &[Option<String>]) -> String {
    let inputs: Vec<&str> = inputs
        .iter()
        .map(|input| input.as_deref().unwrap_or("?"))
        .collect();

    format!("({})", inputs.join(", "))
}

/// Trait for computing the proper [std::fmt::Debug] representation of a value.
pub trait ProperDebug {
    /// Optionally format a debug representation.
    fn polymock_try_debug(&self) -> Option<String>;
}

/// Fallback trait (using autoref specialization) for returning [None] when the implementing value does not implement [std::fmt::Debug].
pub trait NoDebug {
    /// Optionally format a debug representation.
    fn polymock_try_debug(&self) -> Option<String>;
}

// Autoref specialization:
// https://github.com/dtolnay/case-studies/blob/master/autoref-specialization/README.md

impl<T: std::fmt::Debug> ProperDebug for T {
    fn polymock_try_debug(&self) -> Option<String> {
        Some(format!("{self:?}"))
    }
}

impl<T> NoDebug for &T {
    fn polymock_try_debug(&self) -> Option<String> {
        None
    }
}
