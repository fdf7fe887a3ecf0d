//! Emulation of a virtual dispatch table.

use crate::error::{FakeError, FakeResult, SlotResolutionReason};
use crate::trampoline::DynTrampoline;

/// Upper bound on the number of dispatched methods of a faked trait.
pub const MAX_SLOTS: usize = 64;

/// Position of a method in the dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(pub usize);

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) enum Slot {
    /// Dispatching to this slot signals an unmocked call.
    Unmocked,
    Trampoline(DynTrampoline),
}

/// Fixed-capacity table of slots. Only the first `len` slots belong to the interface.
pub(crate) struct DispatchTable {
    slots: Box<[Slot]>,
    len: usize,
}

impl DispatchTable {
    pub fn new(interface: &'static str, methods: &'static [&'static str]) -> FakeResult<Self> {
        if methods.len() > MAX_SLOTS {
            return Err(FakeError::SlotResolutionFailure {
                interface,
                method: methods[MAX_SLOTS],
                reason: SlotResolutionReason::CapacityExceeded {
                    position: MAX_SLOTS,
                    capacity: MAX_SLOTS,
                },
            });
        }

        Ok(Self {
            slots: (0..MAX_SLOTS).map(|_| Slot::Unmocked).collect(),
            len: methods.len(),
        })
    }

    /// The fixed capacity.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots used by the interface.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&Slot> {
        if index.0 < self.len {
            self.slots.get(index.0)
        } else {
            None
        }
    }

    pub fn set_slot(&mut self, index: SlotIndex, slot: Slot) {
        assert!(
            index.0 < self.len,
            "slot {index} out of range for a table of {} slots",
            self.len
        );
        self.slots[index.0] = slot;
    }

    pub fn is_unmocked(&self, index: SlotIndex) -> bool {
        matches!(self.slot(index), Some(Slot::Unmocked) | None)
    }
}
