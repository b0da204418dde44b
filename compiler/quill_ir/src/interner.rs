//! String interner.
//!
//! Maps strings to compact [`Name`] identifiers. Interning takes `&self`
//! so the interner can be shared between compiler phases without threading
//! mutable borrows through every pass.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

#[derive(Default)]
struct Inner {
    map: FxHashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

/// Thread-safe string interner.
pub struct StringInterner {
    inner: RwLock<Inner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned as
    /// [`Name::EMPTY`].
    pub fn new() -> Self {
        let interner = StringInterner {
            inner: RwLock::new(Inner::default()),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// Interning the same string twice yields the same name.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.inner.read().map.get(s) {
            return name;
        }
        let mut inner = self.inner.write();
        // Re-check under the write lock: another thread may have interned
        // the string between the read and write acquisitions.
        if let Some(&name) = inner.map.get(s) {
            return name;
        }
        let name = Name::from_raw(u32::try_from(inner.strings.len()).unwrap_or_else(|_| {
            panic!("interner overflow: more than u32::MAX strings");
        }));
        let boxed: Box<str> = s.into();
        inner.strings.push(boxed.clone());
        inner.map.insert(boxed, name);
        name
    }

    /// Resolve a [`Name`] back to its string.
    ///
    /// # Panics
    /// Panics if the name was not produced by this interner.
    pub fn resolve(&self, name: Name) -> String {
        self.inner.read().strings[name.index()].to_string()
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Check whether the interner holds only the pre-interned empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("handler");
        let b = interner.intern("handler");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "handler");
    }

    #[test]
    fn distinct_strings_get_distinct_names() {
        let interner = StringInterner::new();
        let a = interner.intern("error");
        let b = interner.intern("error_out");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_string_is_pre_interned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
    }
}
