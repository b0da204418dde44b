//! Type identifiers and the type pool.
//!
//! The middle-end only needs a thin view of the type system: the builtin
//! `bool` type (for synthesized error-exists temporaries), the `Error`
//! class (the sentinel error type), and subtype queries against it for
//! catch-clause dispatch.

use std::fmt;

use crate::{Name, StringInterner};

/// Interned type identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Builtin `bool`.
    pub const BOOL: TypeId = TypeId(0);
    /// The `Error` class, root of the error hierarchy. A value of this
    /// type is either nil ("no error") or a concrete error instance.
    pub const ERROR: TypeId = TypeId(1);

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the pool's definition table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TypeId::BOOL => write!(f, "TypeId(bool)"),
            TypeId::ERROR => write!(f, "TypeId(Error)"),
            TypeId(raw) => write!(f, "TypeId({raw})"),
        }
    }
}

/// A type definition record.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDef {
    pub name: Name,
    /// Superclass, for class types. `None` for builtins and roots.
    pub parent: Option<TypeId>,
}

/// Pool of type definitions visible to the middle-end.
///
/// Upstream resolution/type-checking populates the pool; passes treat it
/// as read-only.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypePool {
    defs: Vec<TypeDef>,
    /// Whether the `Error` class definition was materialized in the
    /// program tree (false under minimal-modules builds, where the
    /// module defining it is not compiled in).
    error_in_tree: bool,
}

impl TypePool {
    /// Create a pool with the builtins (`bool`, `Error`) registered.
    pub fn new(interner: &StringInterner) -> Self {
        let mut pool = TypePool {
            defs: Vec::new(),
            error_in_tree: true,
        };
        let bool_id = pool.register(interner.intern("bool"), None);
        debug_assert_eq!(bool_id, TypeId::BOOL);
        let error_id = pool.register(interner.intern("Error"), None);
        debug_assert_eq!(error_id, TypeId::ERROR);
        pool
    }

    /// Register a type definition, returning its id.
    pub fn register(&mut self, name: Name, parent: Option<TypeId>) -> TypeId {
        let id = TypeId(u32::try_from(self.defs.len()).unwrap_or_else(|_| {
            panic!("type pool overflow: more than u32::MAX types");
        }));
        self.defs.push(TypeDef { name, parent });
        id
    }

    /// Look up a type definition.
    pub fn def(&self, id: TypeId) -> &TypeDef {
        &self.defs[id.index()]
    }

    /// Check whether `ty` is `Error` or a (transitive) subclass of it.
    pub fn is_error_subtype(&self, ty: TypeId) -> bool {
        let mut cur = Some(ty);
        while let Some(id) = cur {
            if id == TypeId::ERROR {
                return true;
            }
            cur = self.defs[id.index()].parent;
        }
        false
    }

    /// Whether the `Error` class is materialized in the program tree.
    pub fn error_in_tree(&self) -> bool {
        self.error_in_tree
    }

    /// Mark the `Error` class as absent from the program tree
    /// (minimal-modules builds).
    pub fn set_error_in_tree(&mut self, in_tree: bool) {
        self.error_in_tree = in_tree;
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Check if the pool has no registered types.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
