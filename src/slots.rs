use bitflags::bitflags;
use crossbeam_utils::atomic::AtomicCell;
use parking_lot::RwLock;

// The corresponding field in CPython is `tp_` prefixed.
// e.g. name -> tp_name
pub struct TypeSlots {
    pub(crate) name: RwLock<Option<String>>, // tp_name

    // tp_basicsize: final instance size, object header included. Written
    // exactly once, by the finalizer; callers only ever declare the extra
    // bytes of their own fields on the TypeObject.
    pub(crate) basicsize: AtomicCell<usize>,

    // tp_flags
    pub(crate) flags: AtomicCell<TypeFlags>,
}

impl TypeSlots {
    pub(crate) fn from_flags(flags: TypeFlags) -> Self {
        Self {
            name: RwLock::new(None),
            basicsize: AtomicCell::new(0),
            flags: AtomicCell::new(flags),
        }
    }
}

impl std::fmt::Debug for TypeSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TypeSlots")
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct TypeFlags: u64 {
        const CHECKTYPES = 1 << 4;
        const HEAPTYPE = 1 << 9;
        const BASETYPE = 1 << 10;
    }
}

impl TypeFlags {
    // CPython's Py_TPFLAGS_DEFAULT carries HAVE_* capability bits that have
    // no meaning in this layer: empty, for now.
    pub const DEFAULT: Self = Self::empty();

    /// Flags every dynamically created type carries: subclassable and a
    /// heap type.
    pub const fn heap_type_flags() -> Self {
        match Self::from_bits(Self::DEFAULT.bits() | Self::HEAPTYPE.bits() | Self::BASETYPE.bits())
        {
            Some(flags) => flags,
            None => unreachable!(),
        }
    }

    pub const fn has_feature(self, flag: Self) -> bool {
        self.contains(flag)
    }
}

impl Default for TypeFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}
