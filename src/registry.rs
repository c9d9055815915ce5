//! The export registry: publishing finalized types under stable names, the
//! `PyModule_AddObject` analogue. Registration keeps a strong reference, so
//! a registered type outlives its creator.

use crate::{
    error::{TypeError, TypeResult},
    typeobject::TypeRef,
};
use indexmap::{map::Entry, IndexMap};
use parking_lot::RwLock;

/// Stable handle to a registered type. Handles stay valid for the life of
/// the registry; entries are never removed, matching module-level exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle(usize);

#[derive(Default)]
pub struct TypeRegistry {
    entries: RwLock<IndexMap<String, TypeRef, ahash::RandomState>>,
}

impl TypeRegistry {
    /// Publishes a finalized type. A type that never reached `Ready` (or
    /// failed to) must not be observable through the export surface.
    pub fn register(&self, name: &str, typ: TypeRef) -> TypeResult<TypeHandle> {
        if !typ.is_ready() {
            return Err(TypeError::UnreadyBase { name: typ.name() });
        }
        let mut entries = self.entries.write();
        match entries.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(TypeError::DuplicateName {
                name: name.to_owned(),
            }),
            Entry::Vacant(entry) => {
                let handle = TypeHandle(entry.index());
                debug!("registered type '{}' as '{}'", typ.name(), name);
                entry.insert(typ);
                Ok(handle)
            }
        }
    }

    pub fn lookup(&self, handle: TypeHandle) -> Option<TypeRef> {
        self.entries
            .read()
            .get_index(handle.0)
            .map(|(_, typ)| typ.clone())
    }

    pub fn get(&self, name: &str) -> Option<TypeRef> {
        self.entries.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
