//! The `PyType_Ready` analogue: fixes a type's layout and locks it in.

use crate::{
    context::Context,
    error::{TypeError, TypeResult},
    layout,
    slots::TypeFlags,
    typeobject::{ReadyState, TypeRef},
};

/// Readies `typ`, first readying its base chain bottom-up. Runs under the
/// context's finalization lock: the recursion assumes nothing else mutates
/// the chain while it walks it.
pub(crate) fn type_ready(ctx: &Context, typ: &TypeRef) -> TypeResult {
    let _guard = ctx.ready_lock.lock();
    ready_inner(ctx, typ)
}

fn ready_inner(ctx: &Context, typ: &TypeRef) -> TypeResult {
    match typ.state.load() {
        ReadyState::Ready => return Ok(()),
        // Only this finalizer sets Readying, so meeting it again means the
        // base walk came back around to a type it started from.
        ReadyState::Readying => {
            return Err(TypeError::BaseCycle { name: typ.name() });
        }
        // Terminal: retrying with unchanged inputs fails identically.
        ReadyState::Failed => {
            return Err(TypeError::Failed { name: typ.name() });
        }
        ReadyState::Unfinalized => {}
    }

    typ.state.store(ReadyState::Readying);
    trace!("readying type '{}'", typ.name());

    if let Err(err) = ready_steps(ctx, typ) {
        typ.state.store(ReadyState::Failed);
        return Err(TypeError::Ready {
            name: typ.name(),
            source: Box::new(err),
        });
    }

    typ.state.store(ReadyState::Ready);
    trace!(
        "type '{}' is ready, basicsize {}",
        typ.name(),
        typ.slots.basicsize.load()
    );
    Ok(())
}

fn ready_steps(ctx: &Context, typ: &TypeRef) -> TypeResult {
    let base = typ.base.read().clone();

    if let Some(base) = &base {
        if !base.is_ready() {
            ready_inner(ctx, base)?;
        }
        if !base.flags().has_feature(TypeFlags::BASETYPE) {
            return Err(TypeError::UnacceptableBase {
                name: typ.name(),
                base: base.name(),
            });
        }
    }

    let basicsize =
        layout::compute_basicsize(ctx.header_size(), base.as_deref(), typ.declared_size.load())?;
    typ.slots.basicsize.store(basicsize);

    // Flags stay exactly as the constructing caller declared them; nothing
    // is copied over from the base. The one resolution step is re-asserting
    // HEAPTYPE on heap types, which a caller-supplied flag set may have
    // dropped.
    if typ.heaptype_ext.is_some() {
        typ.slots.flags.store(typ.flags() | TypeFlags::HEAPTYPE);
    }

    Ok(())
}
