//! Storage for the faked data members of a proxy.

use std::any::{Any, TypeId};

use crate::error::{FakeError, FakeResult};
use crate::{DataMember, Interface};

struct MemberSlot {
    type_id: TypeId,
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// The data member region of one proxy.
///
/// Members are exclusively owned. They are dropped in reverse order of construction,
/// before the region itself is released.
pub(crate) struct Members {
    interface: &'static str,
    declared: &'static [&'static str],
    slots: Vec<MemberSlot>,
}

impl Members {
    pub fn new<I: ?Sized + Interface>() -> Self {
        Self {
            interface: I::NAME,
            declared: I::MEMBERS,
            slots: Vec::with_capacity(I::MEMBERS.len()),
        }
    }

    /// Construct the member `D` with its default value.
    /// A member that was already constructed is replaced, and its old value dropped.
    pub fn construct<D: DataMember>(&mut self) -> FakeResult<&mut D::Value> {
        if !self.declared.contains(&D::NAME) {
            return Err(FakeError::MemberNotDeclared {
                interface: self.interface,
                member: D::NAME,
            });
        }

        let value: Box<dyn Any + Send + Sync> = Box::new(D::Value::default());
        let index = match self.position::<D>() {
            Some(index) => {
                tracing::debug!(interface = self.interface, member = D::NAME, "replacing data member");
                self.slots[index].value = value;
                index
            }
            None => {
                tracing::debug!(interface = self.interface, member = D::NAME, "constructing data member");
                self.slots.push(MemberSlot {
                    type_id: TypeId::of::<D>(),
                    name: D::NAME,
                    value,
                });
                self.slots.len() - 1
            }
        };

        self.slots[index]
            .value
            .downcast_mut()
            .ok_or(FakeError::MemberNotDeclared {
                interface: self.interface,
                member: D::NAME,
            })
    }

    pub fn get<D: DataMember>(&self) -> FakeResult<&D::Value> {
        self.position::<D>()
            .and_then(|index| self.slots[index].value.downcast_ref())
            .ok_or_else(|| self.not_stubbed::<D>())
    }

    pub fn get_mut<D: DataMember>(&mut self) -> FakeResult<&mut D::Value> {
        let error = self.not_stubbed::<D>();
        match self.position::<D>() {
            Some(index) => self.slots[index].value.downcast_mut().ok_or(error),
            None => Err(error),
        }
    }

    pub fn is_constructed<D: DataMember>(&self) -> bool {
        self.position::<D>().is_some()
    }

    fn position<D: DataMember>(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.type_id == TypeId::of::<D>())
    }

    fn not_stubbed<D: DataMember>(&self) -> FakeError {
        FakeError::MemberNotStubbed {
            interface: self.interface,
            member: D::NAME,
        }
    }
}

impl Drop for Members {
    fn drop(&mut self) {
        while let Some(slot) = self.slots.pop() {
            tracing::trace!(interface = self.interface, member = slot.name, "dropping data member");
            drop(slot);
        }
    }
}
