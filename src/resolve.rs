use crate::error::{FakeError, FakeResult, SlotResolutionReason};
use crate::table::{SlotIndex, MAX_SLOTS};
use crate::{Interface, Method};

///
/// Resolve the slot occupied by the method `M`.
///
/// Every candidate slot of the interface layout is probed for the method.
/// The result depends on the layout only, so resolving the same method always
/// yields the same slot, and distinct methods of one interface yield distinct slots.
///
pub fn resolve<M: Method>() -> FakeResult<SlotIndex> {
    let interface = <M::Interface as Interface>::NAME;
    let failure = |reason| FakeError::SlotResolutionFailure {
        interface,
        method: M::NAME,
        reason,
    };

    let hits: Vec<usize> = <M::Interface as Interface>::METHODS
        .iter()
        .enumerate()
        .filter(|(_, name)| **name == M::NAME)
        .map(|(position, _)| position)
        .collect();

    match hits.as_slice() {
        [] => Err(failure(SlotResolutionReason::NotDeclared)),
        [position] if *position >= MAX_SLOTS => {
            Err(failure(SlotResolutionReason::CapacityExceeded {
                position: *position,
                capacity: MAX_SLOTS,
            }))
        }
        [position] => {
            tracing::trace!(interface, method = M::NAME, slot = position, "resolved slot");
            Ok(SlotIndex(*position))
        }
        _ => Err(failure(SlotResolutionReason::Ambiguous(hits.len()))),
    }
}
