use crate::{
    error::{TypeError, TypeResult},
    slots::{TypeFlags, TypeSlots},
};
use crossbeam_utils::atomic::AtomicCell;
use parking_lot::RwLock;
use std::{fmt, sync::Arc};

pub type TypeRef = Arc<TypeObject>;

/// Lifecycle of a type object. Layout-affecting fields are mutable only in
/// `Unfinalized`; `Ready` and `Failed` are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadyState {
    Unfinalized,
    Readying,
    Ready,
    Failed,
}

/// The emulated `PyTypeObject`. Heap types (the only kind external callers
/// can create) additionally carry a [`HeapTypeExt`] with the owned `ht_name`.
pub struct TypeObject {
    pub(crate) base: RwLock<Option<TypeRef>>, // tp_base
    pub(crate) declared_size: AtomicCell<usize>,
    pub(crate) slots: TypeSlots,
    pub(crate) state: AtomicCell<ReadyState>,
    pub(crate) heaptype_ext: Option<HeapTypeExt>,
}

pub(crate) struct HeapTypeExt {
    pub(crate) name: RwLock<Option<String>>, // ht_name
}

impl TypeObject {
    pub(crate) fn new_static(name: &str, declared_size: usize, flags: TypeFlags) -> TypeRef {
        let slots = TypeSlots::from_flags(flags);
        *slots.name.write() = Some(name.to_owned());
        Arc::new(Self {
            base: RwLock::new(None),
            declared_size: AtomicCell::new(declared_size),
            slots,
            state: AtomicCell::new(ReadyState::Unfinalized),
            heaptype_ext: None,
        })
    }

    pub(crate) fn new_heap(declared_size: usize, flags: TypeFlags) -> TypeRef {
        Arc::new(Self {
            base: RwLock::new(None),
            declared_size: AtomicCell::new(declared_size),
            slots: TypeSlots::from_flags(flags | TypeFlags::HEAPTYPE),
            state: AtomicCell::new(ReadyState::Unfinalized),
            heaptype_ext: Some(HeapTypeExt {
                name: RwLock::new(None),
            }),
        })
    }

    /// tp_name, or a placeholder for a type whose name was never set. Used
    /// in every error message, so it must not itself be fallible.
    pub fn name(&self) -> String {
        self.slots
            .name
            .read()
            .clone()
            .unwrap_or_else(|| "<anonymous type>".to_owned())
    }

    /// ht_name of a heap type.
    pub fn heap_name(&self) -> Option<String> {
        self.heaptype_ext.as_ref().and_then(|ext| ext.name.read().clone())
    }

    pub fn base(&self) -> Option<TypeRef> {
        self.base.read().clone()
    }

    pub fn flags(&self) -> TypeFlags {
        self.slots.flags.load()
    }

    pub fn declared_size(&self) -> usize {
        self.declared_size.load()
    }

    pub fn state(&self) -> ReadyState {
        self.state.load()
    }

    pub fn is_ready(&self) -> bool {
        self.state.load() == ReadyState::Ready
    }

    /// tp_basicsize of a finalized type. The size is undefined until the
    /// finalizer has fixed the layout, so reading it earlier is an error.
    pub fn basicsize(&self) -> TypeResult<usize> {
        if !self.is_ready() {
            return Err(TypeError::UnreadyBase { name: self.name() });
        }
        Ok(self.slots.basicsize.load())
    }

    fn ensure_mutable(&self) -> TypeResult {
        match self.state.load() {
            ReadyState::Unfinalized => Ok(()),
            _ => Err(TypeError::Finalized { name: self.name() }),
        }
    }

    pub fn set_name(&self, name: impl Into<String>) -> TypeResult {
        self.ensure_mutable()?;
        *self.slots.name.write() = Some(name.into());
        Ok(())
    }

    pub fn set_heap_name(&self, name: impl Into<String>) -> TypeResult {
        self.ensure_mutable()?;
        match &self.heaptype_ext {
            Some(ext) => {
                *ext.name.write() = Some(name.into());
                Ok(())
            }
            None => Err(TypeError::NotHeapType { name: self.name() }),
        }
    }

    pub fn set_declared_size(&self, declared_size: usize) -> TypeResult {
        self.ensure_mutable()?;
        self.declared_size.store(declared_size);
        Ok(())
    }

    pub fn set_flags(&self, flags: TypeFlags) -> TypeResult {
        self.ensure_mutable()?;
        self.slots.flags.store(flags);
        Ok(())
    }

    /// Sets tp_base. The base chain must stay acyclic, so the candidate's
    /// own chain may not already contain this type.
    pub fn set_base(&self, base: TypeRef) -> TypeResult {
        self.ensure_mutable()?;
        let mut cursor = Some(base.clone());
        while let Some(ancestor) = cursor {
            if std::ptr::eq(Arc::as_ptr(&ancestor), self) {
                return Err(TypeError::BaseCycle { name: self.name() });
            }
            cursor = ancestor.base.read().clone();
        }
        *self.base.write() = Some(base);
        Ok(())
    }
}

impl fmt::Debug for TypeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[TypeObject {:?} {:?}]", self.name(), self.state.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_type_always_carries_heaptype_flag() {
        let typ = TypeObject::new_heap(0, TypeFlags::DEFAULT);
        assert!(typ.flags().has_feature(TypeFlags::HEAPTYPE));
    }

    #[test]
    fn heap_name_lives_in_its_own_slot() {
        let typ = TypeObject::new_heap(0, TypeFlags::heap_type_flags());
        typ.set_name("number").unwrap();
        typ.set_heap_name("ht_number").unwrap();
        assert_eq!(typ.name(), "number");
        assert_eq!(typ.heap_name().unwrap(), "ht_number");
    }

    #[test]
    fn static_type_rejects_heap_name() {
        let typ = TypeObject::new_static("object", 0, TypeFlags::BASETYPE);
        assert!(matches!(
            typ.set_heap_name("ht_object"),
            Err(TypeError::NotHeapType { .. })
        ));
    }

    #[test]
    fn basicsize_is_unreadable_before_finalization() {
        let typ = TypeObject::new_heap(32, TypeFlags::heap_type_flags());
        assert!(matches!(
            typ.basicsize(),
            Err(TypeError::UnreadyBase { .. })
        ));
    }

    #[test]
    fn self_base_is_a_cycle() {
        let typ = TypeObject::new_heap(0, TypeFlags::heap_type_flags());
        assert!(matches!(
            typ.set_base(typ.clone()),
            Err(TypeError::BaseCycle { .. })
        ));
    }

    #[test]
    fn longer_base_cycles_are_rejected() {
        let a = TypeObject::new_heap(0, TypeFlags::heap_type_flags());
        let b = TypeObject::new_heap(0, TypeFlags::heap_type_flags());
        b.set_base(a.clone()).unwrap();
        assert!(matches!(
            a.set_base(b.clone()),
            Err(TypeError::BaseCycle { .. })
        ));
    }
}
