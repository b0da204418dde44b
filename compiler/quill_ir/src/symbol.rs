//! Symbols: variables, labels, and the per-module symbol table.

use std::fmt;

use crate::{Name, Span, TypeId};

macro_rules! symbol_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Get raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Index into the owning table.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

symbol_id! {
    /// Identifier of a variable (local, temporary, or formal parameter).
    VarId
}
symbol_id! {
    /// Identifier of a label.
    LabelId
}
symbol_id! {
    /// Identifier of a function in [`Module::functions`](crate::Module).
    FuncId
}

impl FuncId {
    /// Create from a raw index. Used by upstream resolution when binding
    /// call sites to function symbols.
    pub const fn from_raw(raw: u32) -> Self {
        FuncId(raw)
    }
}

/// Argument-passing intent of a formal parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Intent {
    #[default]
    Value,
    /// Passed by mutable reference. The synthesized out-error parameter
    /// uses this intent.
    Ref,
}

/// A variable symbol.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VarSymbol {
    pub name: Name,
    pub ty: TypeId,
    pub intent: Intent,
    /// Compiler-introduced temporary (not user-declared).
    pub is_temp: bool,
    pub span: Span,
}

/// A label symbol. Labels are declaration points for gotos; each has
/// exactly one definition site in a lowered body.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LabelSymbol {
    pub name: Name,
    pub span: Span,
}

/// Per-module symbol table for variables and labels.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SymbolTable {
    vars: Vec<VarSymbol>,
    labels: Vec<LabelSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Declare a user variable.
    pub fn new_var(&mut self, name: Name, ty: TypeId, span: Span) -> VarId {
        self.push_var(VarSymbol {
            name,
            ty,
            intent: Intent::Value,
            is_temp: false,
            span,
        })
    }

    /// Declare a formal parameter with an explicit intent.
    pub fn new_formal(&mut self, name: Name, ty: TypeId, intent: Intent, span: Span) -> VarId {
        self.push_var(VarSymbol {
            name,
            ty,
            intent,
            is_temp: false,
            span,
        })
    }

    /// Declare a compiler-introduced temporary.
    pub fn new_temp(&mut self, name: Name, ty: TypeId, span: Span) -> VarId {
        self.push_var(VarSymbol {
            name,
            ty,
            intent: Intent::Value,
            is_temp: true,
            span,
        })
    }

    /// Declare a fresh label.
    pub fn new_label(&mut self, name: Name, span: Span) -> LabelId {
        let id = LabelId(u32::try_from(self.labels.len()).unwrap_or_else(|_| {
            panic!("symbol table overflow: more than u32::MAX labels");
        }));
        self.labels.push(LabelSymbol { name, span });
        id
    }

    fn push_var(&mut self, sym: VarSymbol) -> VarId {
        let id = VarId(u32::try_from(self.vars.len()).unwrap_or_else(|_| {
            panic!("symbol table overflow: more than u32::MAX variables");
        }));
        self.vars.push(sym);
        id
    }

    /// Look up a variable symbol.
    pub fn var(&self, id: VarId) -> &VarSymbol {
        &self.vars[id.index()]
    }

    /// Look up a label symbol.
    pub fn label(&self, id: LabelId) -> &LabelSymbol {
        &self.labels[id.index()]
    }

    /// Number of declared variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Number of declared labels.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}
