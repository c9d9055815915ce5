//! Instance-size computation: the tp_basicsize inheritance rule.

use crate::{error::TypeResult, typeobject::TypeObject};

/// Computes the final instance size of a type from the runtime's object
/// header size, its base (if any), and the extra bytes it declared for its
/// own fields.
///
/// A derived type's instances must be at least as large as its base's, even
/// when the derived type declares fewer extra bytes than the base ended up
/// with. The base's size is read through the readiness-checked accessor:
/// reading a not-yet-ready base would pick up a stale, too-small value and
/// every instance of the subtype would be allocated short.
pub(crate) fn compute_basicsize(
    header_size: usize,
    base: Option<&TypeObject>,
    declared_size: usize,
) -> TypeResult<usize> {
    let own = header_size + declared_size;
    let Some(base) = base else {
        return Ok(own);
    };
    let inherited = base.basicsize()?;
    trace!(
        "layout: own size {} vs inherited {} from '{}'",
        own,
        inherited,
        base.name()
    );
    Ok(own.max(inherited))
}

#[cfg(test)]
mod tests {
    use super::compute_basicsize;
    use crate::{
        error::TypeError,
        slots::TypeFlags,
        typeobject::{ReadyState, TypeObject},
    };

    const HEADER: usize = 16;

    fn readied(declared_size: usize, basicsize: usize) -> crate::TypeRef {
        let typ = TypeObject::new_heap(declared_size, TypeFlags::heap_type_flags());
        typ.slots.basicsize.store(basicsize);
        typ.state.store(ReadyState::Ready);
        typ
    }

    #[test]
    fn rootless_type_is_header_plus_declared() {
        assert_eq!(compute_basicsize(HEADER, None, 500).unwrap(), 516);
        assert_eq!(compute_basicsize(HEADER, None, 0).unwrap(), HEADER);
    }

    #[test]
    fn small_subtype_grows_to_base_size() {
        let base = readied(500, 516);
        assert_eq!(compute_basicsize(HEADER, Some(&base), 0).unwrap(), 516);
    }

    #[test]
    fn larger_subtype_keeps_its_own_size() {
        let base = readied(8, 24);
        assert_eq!(compute_basicsize(HEADER, Some(&base), 100).unwrap(), 116);
    }

    #[test]
    fn unready_base_is_an_error() {
        let base = TypeObject::new_heap(500, TypeFlags::heap_type_flags());
        assert!(matches!(
            compute_basicsize(HEADER, Some(&base), 0),
            Err(TypeError::UnreadyBase { .. })
        ));
    }
}
