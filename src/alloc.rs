//! Heap-type allocation, the `PyType_Type.tp_alloc` analogue.

use crate::{
    error::{TypeError, TypeResult},
    slots::TypeFlags,
    typeobject::{TypeObject, TypeRef},
};
use crossbeam_utils::atomic::AtomicCell;

/// Hands out unfinalized heap-type objects. The storage for the object
/// header itself belongs to the surrounding runtime; this layer only tracks
/// how many type objects it has produced so a runtime with a bounded type
/// table can surface exhaustion as an error instead of aborting.
pub struct HeapTypeAllocator {
    budget: Option<usize>,
    allocated: AtomicCell<usize>,
}

impl HeapTypeAllocator {
    pub(crate) fn new(budget: Option<usize>) -> Self {
        Self {
            budget,
            allocated: AtomicCell::new(0),
        }
    }

    /// A fresh, unfinalized type: HEAPTYPE set, empty ht_name slot, no base.
    pub fn allocate(&self, declared_size: usize, flags: TypeFlags) -> TypeResult<TypeRef> {
        if let Some(limit) = self.budget {
            if self.allocated.load() >= limit {
                return Err(TypeError::Allocation { limit });
            }
        }
        self.allocated.fetch_add(1);
        debug!(
            "allocated heap type #{} ({} declared bytes)",
            self.allocated.load(),
            declared_size
        );
        Ok(TypeObject::new_heap(declared_size, flags))
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_starts_unfinalized_with_heaptype_flag() {
        let allocator = HeapTypeAllocator::new(None);
        let typ = allocator.allocate(500, TypeFlags::DEFAULT | TypeFlags::BASETYPE).unwrap();
        assert!(!typ.is_ready());
        assert!(typ.flags().has_feature(TypeFlags::HEAPTYPE));
        assert!(typ.base().is_none());
        assert!(typ.heap_name().is_none());
        assert_eq!(typ.declared_size(), 500);
    }

    #[test]
    fn exhausted_budget_is_an_allocation_error() {
        let allocator = HeapTypeAllocator::new(Some(2));
        allocator.allocate(0, TypeFlags::heap_type_flags()).unwrap();
        allocator.allocate(0, TypeFlags::heap_type_flags()).unwrap();
        assert!(matches!(
            allocator.allocate(0, TypeFlags::heap_type_flags()),
            Err(TypeError::Allocation { limit: 2 })
        ));
        assert_eq!(allocator.allocated(), 2);
    }
}
