//! Symbol table management and scope handling.
//!
//! Every declared name gets one [`Symbol`] stored in a single arena and
//! addressed by a stable [`SymbolId`]. Scope tables only map names to ids, so
//! a symbol keeps its identity after its scope is closed: closed tables are
//! archived on a roster instead of being dropped.

use std::fmt;
use std::num::NonZeroU32;

use hashbrown::HashMap;
use indexmap::IndexMap;
use log::debug;

use crate::ast::NameId;
use crate::semantic::types::{Attributes, Roles, Type};
use crate::source::SourceLoc;

/// Stable handle of a symbol in the [`SymbolTable`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(NonZeroU32);

impl SymbolId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn index(self) -> usize {
        (self.get() - 1) as usize
    }
}

/// Lexical block number. Block 0 is the global scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    pub const GLOBAL: BlockId = BlockId(0);

    pub fn is_global(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One declared name: variable, parameter, function, struct tag or field.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: NameId,
    pub loc: SourceLoc,
    pub block: BlockId,
    pub attrs: Attributes,
    /// Field table. `Some` only for a struct whose body has been seen.
    pub fields: Option<IndexMap<NameId, SymbolId>>,
    /// Parameter chain, in declaration order. `Some` only for functions.
    pub params: Option<Vec<SymbolId>>,
}

impl Symbol {
    pub fn new(name: NameId, loc: SourceLoc, block: BlockId, attrs: Attributes) -> Self {
        Self {
            name,
            loc,
            block,
            attrs,
            fields: None,
            params: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fields.is_some()
    }

    pub fn field(&self, name: NameId) -> Option<SymbolId> {
        self.fields.as_ref().and_then(|fields| fields.get(&name).copied())
    }
}

/// Name to symbol mapping of one lexical block.
#[derive(Debug, Clone)]
pub struct ScopeTable {
    pub block: BlockId,
    pub symbols: HashMap<NameId, SymbolId>,
}

impl ScopeTable {
    fn new(block: BlockId) -> Self {
        Self {
            block,
            symbols: HashMap::new(),
        }
    }

    pub fn get(&self, name: NameId) -> Option<SymbolId> {
        self.symbols.get(&name).copied()
    }
}

#[derive(Debug, Clone, Copy)]
enum ListingLine {
    Symbol { depth: usize, id: SymbolId },
    Blank,
}

/// Scope stack, struct type table and symbol arena.
#[derive(Debug)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
    stack: Vec<ScopeTable>,
    roster: Vec<ScopeTable>,
    structs: IndexMap<NameId, SymbolId>,
    next_block: u32,
    listing: Vec<ListingLine>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            stack: vec![ScopeTable::new(BlockId::GLOBAL)],
            roster: Vec::new(),
            structs: IndexMap::new(),
            next_block: 1,
            listing: Vec::new(),
        }
    }

    pub fn current_block(&self) -> BlockId {
        self.stack.last().map(|scope| scope.block).unwrap_or(BlockId::GLOBAL)
    }

    /// Nesting depth of the innermost open scope. The global scope is depth 0.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    pub fn enter_block(&mut self) -> BlockId {
        let block = BlockId(self.next_block);
        self.next_block += 1;
        self.stack.push(ScopeTable::new(block));
        debug!("SymbolTable: Entered block {} (depth {})", block, self.depth());
        block
    }

    /// Close the innermost block and archive its table. The global scope is
    /// never closed.
    pub fn exit_block(&mut self) -> Option<BlockId> {
        if self.stack.len() <= 1 {
            debug!("SymbolTable: Attempted to exit global block. No change.");
            return None;
        }
        let scope = self.stack.pop()?;
        let block = scope.block;
        debug!(
            "SymbolTable: Exited block {} ({} symbols archived)",
            block,
            scope.symbols.len()
        );
        self.roster.push(scope);
        Some(block)
    }

    pub fn push_symbol(&mut self, symbol: Symbol) -> SymbolId {
        self.entries.push(symbol);
        match SymbolId::new(self.entries.len() as u32) {
            Some(id) => id,
            None => panic!("ICE: symbol arena overflow"),
        }
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.entries[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.entries[id.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bind `name` in the innermost scope. On a clash the existing binding is
    /// kept and returned as the error.
    pub fn insert(&mut self, name: NameId, id: SymbolId) -> Result<(), SymbolId> {
        let scope = match self.stack.last_mut() {
            Some(scope) => scope,
            None => panic!("ICE: symbol table has no open scope"),
        };
        if let Some(existing) = scope.get(name) {
            debug!("SymbolTable: '{}' already bound in block {}", name, scope.block);
            return Err(existing);
        }
        scope.symbols.insert(name, id);
        debug!("SymbolTable: Bound '{}' in block {}", name, scope.block);
        Ok(())
    }

    /// Name lookup from the innermost scope outwards.
    pub fn lookup(&self, name: NameId) -> Option<SymbolId> {
        self.stack.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Name lookup restricted to the innermost scope.
    pub fn lookup_local(&self, name: NameId) -> Option<SymbolId> {
        self.stack.last().and_then(|scope| scope.get(name))
    }

    /// Lookup inside a given block, whether it is still open or archived.
    pub fn lookup_in_block(&self, block: BlockId, name: NameId) -> Option<SymbolId> {
        self.scopes().find(|scope| scope.block == block).and_then(|scope| scope.get(name))
    }

    /// Every scope table created so far: archived ones first, then open ones.
    pub fn scopes(&self) -> impl Iterator<Item = &ScopeTable> {
        self.roster.iter().chain(self.stack.iter())
    }

    pub fn struct_symbol(&self, name: NameId) -> Option<SymbolId> {
        self.structs.get(&name).copied()
    }

    /// Struct type symbol for `name`, creating an incomplete placeholder at
    /// `loc` if the tag has not been seen yet.
    pub fn struct_or_placeholder(&mut self, name: NameId, loc: SourceLoc) -> SymbolId {
        if let Some(id) = self.struct_symbol(name) {
            return id;
        }
        let attrs = Attributes::typed(Type::structure(name), Roles::empty());
        let id = self.push_symbol(Symbol::new(name, loc, BlockId::GLOBAL, attrs));
        self.structs.insert(name, id);
        debug!("SymbolTable: Placeholder for incomplete struct '{}'", name);
        id
    }

    /// Struct tags in first-seen order.
    pub fn structs(&self) -> impl Iterator<Item = (NameId, SymbolId)> + '_ {
        self.structs.iter().map(|(name, id)| (*name, *id))
    }

    /// Add a symbol line to the definition listing.
    pub fn record(&mut self, depth: usize, id: SymbolId) {
        self.listing.push(ListingLine::Symbol { depth, id });
    }

    pub fn record_blank(&mut self) {
        self.listing.push(ListingLine::Blank);
    }

    /// Render the definition listing. A blank line separates consecutive
    /// global non-field entries.
    pub fn dump_listing(&self) -> String {
        let mut out = String::new();
        let mut need_line = false;
        for line in &self.listing {
            match *line {
                ListingLine::Blank => out.push('\n'),
                ListingLine::Symbol { depth, id } => {
                    let symbol = self.get(id);
                    if symbol.block.is_global() && !symbol.attrs.has(Roles::FIELD) {
                        if need_line {
                            out.push('\n');
                        }
                        need_line = true;
                    }
                    out.push_str(&"   ".repeat(depth));
                    out.push_str(&format!(
                        "{} ({}) {{{}}} {}\n",
                        symbol.name, symbol.loc, symbol.block, symbol.attrs
                    ));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileId;

    fn variable(table: &mut SymbolTable, name: &str, line: u32) -> SymbolId {
        let attrs = Attributes::typed(Type::INT, Roles::VARIABLE | Roles::LVALUE);
        let block = table.current_block();
        table.push_symbol(Symbol::new(
            NameId::new(name),
            SourceLoc::new(FileId(0), line, 4),
            block,
            attrs,
        ))
    }

    #[test]
    fn blocks_are_numbered_monotonically_and_archived() {
        let mut table = SymbolTable::new();
        assert_eq!(table.current_block(), BlockId::GLOBAL);
        assert_eq!(table.enter_block(), BlockId(1));
        assert_eq!(table.exit_block(), Some(BlockId(1)));
        assert_eq!(table.enter_block(), BlockId(2));
        assert_eq!(table.enter_block(), BlockId(3));
        assert_eq!(table.depth(), 2);
        table.exit_block();
        table.exit_block();
        assert_eq!(table.exit_block(), None);
        assert_eq!(table.scopes().count(), 4);
    }

    #[test]
    fn innermost_binding_wins_and_globals_stay_visible() {
        let mut table = SymbolTable::new();
        let x = NameId::new("x");
        let g = NameId::new("g");
        let outer = variable(&mut table, "x", 1);
        table.insert(x, outer).unwrap();
        let global = variable(&mut table, "g", 2);
        table.insert(g, global).unwrap();

        let block = table.enter_block();
        let inner = variable(&mut table, "x", 3);
        table.insert(x, inner).unwrap();
        assert_eq!(table.lookup(x), Some(inner));
        assert_eq!(table.lookup(g), Some(global));
        assert_eq!(table.lookup_local(g), None);

        table.exit_block();
        assert_eq!(table.lookup(x), Some(outer));
        assert_eq!(table.lookup_in_block(block, x), Some(inner));
    }

    #[test]
    fn redeclaration_keeps_original_binding() {
        let mut table = SymbolTable::new();
        let x = NameId::new("x");
        let first = variable(&mut table, "x", 1);
        let second = variable(&mut table, "x", 2);
        table.insert(x, first).unwrap();
        assert_eq!(table.insert(x, second), Err(first));
        assert_eq!(table.lookup(x), Some(first));
    }

    #[test]
    fn struct_placeholder_is_created_once() {
        let mut table = SymbolTable::new();
        let node = NameId::new("node");
        let loc = SourceLoc::new(FileId(0), 1, 7);
        let id = table.struct_or_placeholder(node, loc);
        assert!(!table.get(id).is_complete());
        assert_eq!(table.struct_or_placeholder(node, loc), id);
        assert_eq!(table.structs().count(), 1);
    }

    #[test]
    fn listing_separates_global_entries() {
        let mut table = SymbolTable::new();
        let a = variable(&mut table, "a", 1);
        table.record(0, a);
        let b = variable(&mut table, "b", 2);
        table.record(0, b);
        table.enter_block();
        let c = variable(&mut table, "c", 3);
        table.record(1, c);
        insta::assert_snapshot!(table.dump_listing(), @r"
        a (0.1.4) {0} int variable lval

        b (0.2.4) {0} int variable lval
           c (0.3.4) {1} int variable lval
        ");
    }
}
