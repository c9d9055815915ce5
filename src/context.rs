//! Process-scoped owner of the type system: the header-size constant the
//! runtime supplies, the root `object` type, the allocator, the export
//! registry, and the finalization lock.

use crate::{
    alloc::HeapTypeAllocator,
    error::TypeResult,
    ready,
    registry::TypeRegistry,
    slots::TypeFlags,
    typeobject::{ReadyState, TypeObject, TypeRef},
};
use parking_lot::Mutex;

pub struct Context {
    header_size: usize,
    allocator: HeapTypeAllocator,
    registry: TypeRegistry,
    object_type: TypeRef,
    pub(crate) ready_lock: Mutex<()>,
}

impl Context {
    /// `header_size` is the runtime's fixed object-header size (refcount +
    /// type pointer); this layer never computes it.
    pub fn new(header_size: usize) -> Self {
        Self::new_inner(header_size, None)
    }

    /// Like [`Context::new`], with a cap on how many heap types may be
    /// allocated over the context's lifetime.
    pub fn with_type_budget(header_size: usize, budget: usize) -> Self {
        Self::new_inner(header_size, Some(budget))
    }

    fn new_inner(header_size: usize, budget: Option<usize>) -> Self {
        // Bootstrap of the root type: it has no base, so its layout is just
        // the header, and it is born ready rather than going through the
        // finalizer it anchors.
        let object_type =
            TypeObject::new_static("object", 0, TypeFlags::DEFAULT | TypeFlags::BASETYPE);
        object_type.slots.basicsize.store(header_size);
        object_type.state.store(ReadyState::Ready);

        let ctx = Self {
            header_size,
            allocator: HeapTypeAllocator::new(budget),
            registry: TypeRegistry::default(),
            object_type,
            ready_lock: Mutex::new(()),
        };
        if ctx
            .registry
            .register("object", ctx.object_type.clone())
            .is_err()
        {
            // The registry is empty and the root type was just forced Ready.
            unreachable!("root type registration cannot fail");
        }
        ctx
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// The root of every base chain.
    pub fn object_type(&self) -> &TypeRef {
        &self.object_type
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn allocator(&self) -> &HeapTypeAllocator {
        &self.allocator
    }

    pub fn new_heap_type(&self, declared_size: usize, flags: TypeFlags) -> TypeResult<TypeRef> {
        self.allocator.allocate(declared_size, flags)
    }

    /// Finalizes `typ` (and, first, any unready base), locking in its
    /// layout. Idempotent on a ready type.
    pub fn type_ready(&self, typ: &TypeRef) -> TypeResult {
        ready::type_ready(self, typ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_starts_with_a_ready_root_type() {
        let ctx = Context::new(16);
        let object = ctx.object_type();
        assert!(object.is_ready());
        assert_eq!(object.basicsize().unwrap(), 16);
        assert!(object.base().is_none());
        assert!(object.flags().has_feature(TypeFlags::BASETYPE));
        assert!(std::sync::Arc::ptr_eq(
            &ctx.registry().get("object").unwrap(),
            object
        ));
    }

    #[test]
    fn type_budget_is_enforced_through_the_context() {
        let ctx = Context::with_type_budget(16, 1);
        ctx.new_heap_type(0, TypeFlags::heap_type_flags()).unwrap();
        assert!(ctx.new_heap_type(0, TypeFlags::heap_type_flags()).is_err());
        assert_eq!(ctx.allocator().allocated(), 1);
    }
}
