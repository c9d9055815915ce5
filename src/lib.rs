//! Emulation of CPython's type-object layout for a C-API compatibility layer.
//!
//! The layer models the part of the object model that `PyType_Ready` locks
//! in: heap-allocated type objects, the base chain, and the computation of
//! `tp_basicsize` from a type's declared instance fields and its base's
//! finalized layout. A derived type's instances may never be smaller than
//! its base's, even when the derived type declares no extra fields of its
//! own; getting that ordering wrong (reading a base's size before the base
//! is ready) is the bug class this crate exists to make impossible.
//!
//! Entry point is [`Context`], which owns the runtime-supplied object-header
//! size, the root `object` type, the heap-type allocator, and the export
//! registry. All finalization runs under the context's global lock.

#[macro_use]
extern crate log;

mod alloc;
mod context;
mod error;
mod layout;
mod ready;
mod registry;
mod slots;
mod typeobject;

pub use alloc::HeapTypeAllocator;
pub use context::Context;
pub use error::{TypeError, TypeResult};
pub use registry::{TypeHandle, TypeRegistry};
pub use slots::TypeFlags;
pub use typeobject::{ReadyState, TypeObject, TypeRef};
