//! Caller-owned string interning.
//!
//! Symbols are small copyable handles for names such as channel or
//! statistic labels. Each [`SymbolTable`] is independent; a symbol is only
//! meaningful for the table that issued it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handle for an interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Position of this symbol in its table.
    #[must_use]
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interning table mapping names to [`Symbol`]s.
///
/// # Examples
///
/// ```
/// use mfkit::index::SymbolTable;
///
/// let mut table = SymbolTable::new();
/// let a = table.intern("rmse");
/// let b = table.intern("rmse");
/// assert_eq!(a, b);
/// assert_eq!(table.name(a), Some("rmse"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: Vec<Arc<str>>,
    lookup: HashMap<Arc<str>, Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol for `name`, creating it on first use.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` distinct names are interned.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.lookup.get(name) {
            return sym;
        }
        let id = u32::try_from(self.names.len()).expect("symbol table exhausted");
        let sym = Symbol(id);
        let name: Arc<str> = Arc::from(name);
        self.names.push(Arc::clone(&name));
        self.lookup.insert(name, sym);
        sym
    }

    /// Looks up an existing symbol without interning.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.lookup.get(name).copied()
    }

    /// Name of `symbol`, if it came from this table.
    #[must_use]
    pub fn name(&self, symbol: Symbol) -> Option<&str> {
        self.names.get(symbol.0 as usize).map(|s| &**s)
    }

    /// Number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
