//! Abstract syntax tree for oc programs.
//!
//! The tree is stored flattened: every node lives in one arena and is
//! addressed by a [`NodeRef`]. Each node owns an ordered child list and is
//! adopted by at most one parent, so the arena still describes a strict tree.
//!
//! Nodes are built bottom-up by the parser and decorated in place by the
//! semantic passes through [`Decoration`].

use std::fmt::{self, Display};
use std::num::NonZeroU32;

use log::trace;
use thin_vec::ThinVec;
use thiserror::Error;

use crate::semantic::symbol_table::{BlockId, SymbolId};
use crate::semantic::types::{Attributes, BaseType};
pub use crate::source::{FileId, SourceLoc};

pub mod dumper;

/// Interned lexeme text, shared program-wide and never owned by a node.
pub type NameId = symbol_table::GlobalSymbol;

/// Grammar symbol a node is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeSymbol {
    Root,
    Struct,
    Function,
    Prototype,
    ParamList,
    Block,
    VarDecl,
    /// `base[] name` declaration wrapper.
    Array,
    Void,
    Bool,
    Char,
    Int,
    String,
    TypeId,
    DeclId,
    Field,
    Ident,
    While,
    If,
    IfElse,
    Return,
    ReturnVoid,
    Semicolon,
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pos,
    Neg,
    Not,
    Ord,
    Chr,
    New,
    NewString,
    NewArray,
    Call,
    Index,
    Select,
    IntCon,
    CharCon,
    StringCon,
    False,
    True,
    Null,
    /// Tombstone left behind by [`Ast::release_subtree`].
    Released,
}

impl NodeSymbol {
    /// Name used in tree dumps.
    pub fn name(self) -> &'static str {
        match self {
            NodeSymbol::Root => "ROOT",
            NodeSymbol::Struct => "STRUCT",
            NodeSymbol::Function => "FUNCTION",
            NodeSymbol::Prototype => "PROTOTYPE",
            NodeSymbol::ParamList => "PARAMLIST",
            NodeSymbol::Block => "BLOCK",
            NodeSymbol::VarDecl => "VARDECL",
            NodeSymbol::Array => "ARRAY",
            NodeSymbol::Void => "VOID",
            NodeSymbol::Bool => "BOOL",
            NodeSymbol::Char => "CHAR",
            NodeSymbol::Int => "INT",
            NodeSymbol::String => "STRING",
            NodeSymbol::TypeId => "TYPEID",
            NodeSymbol::DeclId => "DECLID",
            NodeSymbol::Field => "FIELD",
            NodeSymbol::Ident => "IDENT",
            NodeSymbol::While => "WHILE",
            NodeSymbol::If => "IF",
            NodeSymbol::IfElse => "IFELSE",
            NodeSymbol::Return => "RETURN",
            NodeSymbol::ReturnVoid => "RETURNVOID",
            NodeSymbol::Semicolon => "';'",
            NodeSymbol::Assign => "'='",
            NodeSymbol::Eq => "EQ",
            NodeSymbol::Ne => "NE",
            NodeSymbol::Lt => "LT",
            NodeSymbol::Le => "LE",
            NodeSymbol::Gt => "GT",
            NodeSymbol::Ge => "GE",
            NodeSymbol::Add => "'+'",
            NodeSymbol::Sub => "'-'",
            NodeSymbol::Mul => "'*'",
            NodeSymbol::Div => "'/'",
            NodeSymbol::Rem => "'%'",
            NodeSymbol::Pos => "POS",
            NodeSymbol::Neg => "NEG",
            NodeSymbol::Not => "'!'",
            NodeSymbol::Ord => "ORD",
            NodeSymbol::Chr => "CHR",
            NodeSymbol::New => "NEW",
            NodeSymbol::NewString => "NEWSTRING",
            NodeSymbol::NewArray => "NEWARRAY",
            NodeSymbol::Call => "CALL",
            NodeSymbol::Index => "INDEX",
            NodeSymbol::Select => "'.'",
            NodeSymbol::IntCon => "INTCON",
            NodeSymbol::CharCon => "CHARCON",
            NodeSymbol::StringCon => "STRINGCON",
            NodeSymbol::False => "FALSE",
            NodeSymbol::True => "TRUE",
            NodeSymbol::Null => "NULL",
            NodeSymbol::Released => "RELEASED",
        }
    }

    /// Base type named by a type node, if this is one.
    pub fn base_type(self, lexeme: NameId) -> Option<BaseType> {
        match self {
            NodeSymbol::Void => Some(BaseType::Void),
            NodeSymbol::Bool => Some(BaseType::Bool),
            NodeSymbol::Char => Some(BaseType::Char),
            NodeSymbol::Int => Some(BaseType::Int),
            NodeSymbol::String => Some(BaseType::String),
            NodeSymbol::TypeId => Some(BaseType::Struct(lexeme)),
            _ => None,
        }
    }
}

impl Display for NodeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Node reference type for referencing child nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(NonZeroU32);

impl NodeRef {
    pub const ROOT: NodeRef = NodeRef(NonZeroU32::new(1).unwrap());

    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn index(self) -> usize {
        (self.get() - 1) as usize
    }
}

/// Facts added to a node by the semantic passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoration {
    pub attrs: Attributes,
    /// Lexical block the node belongs to, or the declaring block for names.
    pub block: BlockId,
    /// Declaring symbol for identifiers and declarations.
    pub symbol: Option<SymbolId>,
}

impl Decoration {
    pub fn type_name(&self) -> Option<NameId> {
        self.attrs.type_name()
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub symbol: NodeSymbol,
    pub loc: SourceLoc,
    pub lexeme: NameId,
    pub children: ThinVec<NodeRef>,
    pub parent: Option<NodeRef>,
    pub decoration: Decoration,
}

/// Structural misuse of the tree. These are compiler bugs, not user errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AstError {
    #[error("node {child:?} is already adopted by {parent:?}")]
    AlreadyAdopted { child: NodeRef, parent: NodeRef },
    #[error("node {0:?} cannot adopt itself")]
    SelfAdoption(NodeRef),
    #[error("node {0:?} has been released")]
    Released(NodeRef),
}

/// The flattened AST storage. Node 1 is always the synthetic program root.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    pub fn new() -> Self {
        let mut ast = Ast { nodes: Vec::new() };
        ast.push_node(NodeSymbol::Root, SourceLoc::default(), "<<ROOT>>");
        ast
    }

    /// Construct a detached node from its symbol, location and lexeme.
    pub fn push_node(&mut self, symbol: NodeSymbol, loc: SourceLoc, lexeme: &str) -> NodeRef {
        let index = self.nodes.len() as u32 + 1;
        self.nodes.push(Node {
            symbol,
            loc,
            lexeme: NameId::new(lexeme),
            children: ThinVec::new(),
            parent: None,
            decoration: Decoration::default(),
        });
        let Some(node) = NodeRef::new(index) else {
            panic!("ICE: node arena overflow");
        };
        trace!("astree {:?}->{{{}: {}: \"{}\"}}", node, loc, symbol, lexeme);
        node
    }

    pub fn root(&self) -> NodeRef {
        NodeRef::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node: NodeRef) -> &Node {
        &self.nodes[node.index()]
    }

    pub fn node_mut(&mut self, node: NodeRef) -> &mut Node {
        &mut self.nodes[node.index()]
    }

    pub fn symbol(&self, node: NodeRef) -> NodeSymbol {
        self.node(node).symbol
    }

    pub fn loc(&self, node: NodeRef) -> SourceLoc {
        self.node(node).loc
    }

    pub fn lexeme(&self, node: NodeRef) -> NameId {
        self.node(node).lexeme
    }

    pub fn children(&self, node: NodeRef) -> &[NodeRef] {
        &self.node(node).children
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node).parent
    }

    /// The `index`-th child. The parser guarantees the shapes the passes rely
    /// on, so a missing child is an internal error.
    pub fn child(&self, node: NodeRef, index: usize) -> NodeRef {
        match self.children(node).get(index) {
            Some(&child) => child,
            None => panic!(
                "ICE: {} node at {} has no child {}",
                self.symbol(node),
                self.loc(node),
                index
            ),
        }
    }

    pub fn decoration(&self, node: NodeRef) -> &Decoration {
        &self.node(node).decoration
    }

    pub fn decoration_mut(&mut self, node: NodeRef) -> &mut Decoration {
        &mut self.node_mut(node).decoration
    }

    /// Append `child` to `parent`'s child list.
    pub fn adopt(&mut self, parent: NodeRef, child: NodeRef) -> Result<NodeRef, AstError> {
        if parent == child {
            return Err(AstError::SelfAdoption(child));
        }
        if self.symbol(parent) == NodeSymbol::Released {
            return Err(AstError::Released(parent));
        }
        if self.symbol(child) == NodeSymbol::Released {
            return Err(AstError::Released(child));
        }
        if let Some(existing) = self.parent(child) {
            return Err(AstError::AlreadyAdopted { child, parent: existing });
        }
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        trace!(
            "{:?} ({}) adopting {:?} ({})",
            parent,
            self.lexeme(parent),
            child,
            self.lexeme(child)
        );
        Ok(parent)
    }

    pub fn adopt2(&mut self, parent: NodeRef, left: NodeRef, right: NodeRef) -> Result<NodeRef, AstError> {
        self.adopt(parent, left)?;
        self.adopt(parent, right)
    }

    /// Adopt `child` and re-tag the parent in one step.
    pub fn adopt_sym(&mut self, parent: NodeRef, child: NodeRef, symbol: NodeSymbol) -> Result<NodeRef, AstError> {
        self.adopt(parent, child)?;
        Ok(self.change_sym(parent, symbol))
    }

    /// Re-tag a node after the fact.
    pub fn change_sym(&mut self, node: NodeRef, symbol: NodeSymbol) -> NodeRef {
        self.node_mut(node).symbol = symbol;
        node
    }

    /// Build a function definition or a prototype from its declaration,
    /// parameter list and terminator. A `;` terminator makes a prototype and
    /// is released; a block becomes the function body.
    pub fn adopt_function(&mut self, decl: NodeRef, params: NodeRef, terminator: NodeRef) -> Result<NodeRef, AstError> {
        let loc = self.loc(decl);
        if self.symbol(terminator) == NodeSymbol::Semicolon {
            let root = self.push_node(NodeSymbol::Prototype, loc, "<<PROTOTYPE>>");
            self.adopt2(root, decl, params)?;
            self.release_subtree(terminator);
            Ok(root)
        } else {
            let root = self.push_node(NodeSymbol::Function, loc, "<<FUNCTION>>");
            self.adopt2(root, decl, params)?;
            self.adopt(root, terminator)
        }
    }

    /// Split a declaration into `(base type node, declared name node, is_array)`.
    /// Handles both `type NAME` and `ARRAY(type, NAME)` shapes.
    pub fn declaration_parts(&self, decl: NodeRef) -> (NodeRef, NodeRef, bool) {
        if self.symbol(decl) == NodeSymbol::Array {
            (self.child(decl, 0), self.child(decl, 1), true)
        } else {
            (decl, self.child(decl, 0), false)
        }
    }

    /// Release a subtree post-order, children before parent. Released nodes
    /// become tombstones and are detached from their parent. Returns the
    /// number of nodes released.
    pub fn release_subtree(&mut self, node: NodeRef) -> usize {
        if self.symbol(node) == NodeSymbol::Released {
            return 0;
        }
        let mut released = 0;
        let children = std::mem::take(&mut self.node_mut(node).children);
        for child in children.iter().rev() {
            self.node_mut(*child).parent = None;
            released += self.release_subtree(*child);
        }
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != node);
        }
        let n = self.node_mut(node);
        trace!("free {:?} -> {}: {}: \"{}\"", node, n.loc, n.symbol, n.lexeme);
        n.symbol = NodeSymbol::Released;
        n.decoration = Decoration::default();
        released + 1
    }

    /// Depth-first pre-order walk of a subtree.
    pub fn walk(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, col: u32) -> SourceLoc {
        SourceLoc::new(FileId(0), line, col)
    }

    #[test]
    fn adopt_preserves_child_order() {
        let mut ast = Ast::new();
        let plus = ast.push_node(NodeSymbol::Add, loc(1, 2), "+");
        let a = ast.push_node(NodeSymbol::IntCon, loc(1, 0), "1");
        let b = ast.push_node(NodeSymbol::IntCon, loc(1, 4), "2");
        ast.adopt2(plus, a, b).unwrap();
        assert_eq!(ast.children(plus), &[a, b]);
        assert_eq!(ast.parent(a), Some(plus));
    }

    #[test]
    fn adopting_twice_is_rejected() {
        let mut ast = Ast::new();
        let p1 = ast.push_node(NodeSymbol::Block, loc(1, 0), "{");
        let p2 = ast.push_node(NodeSymbol::Block, loc(2, 0), "{");
        let c = ast.push_node(NodeSymbol::Semicolon, loc(1, 1), ";");
        ast.adopt(p1, c).unwrap();
        assert_eq!(
            ast.adopt(p2, c),
            Err(AstError::AlreadyAdopted { child: c, parent: p1 })
        );
        assert_eq!(ast.adopt(p1, p1), Err(AstError::SelfAdoption(p1)));
    }

    #[test]
    fn adopt_sym_retags_parent() {
        let mut ast = Ast::new();
        let minus = ast.push_node(NodeSymbol::Sub, loc(1, 0), "-");
        let x = ast.push_node(NodeSymbol::Ident, loc(1, 1), "x");
        ast.adopt_sym(minus, x, NodeSymbol::Neg).unwrap();
        assert_eq!(ast.symbol(minus), NodeSymbol::Neg);
    }

    #[test]
    fn function_or_prototype_is_chosen_by_terminator() {
        let mut ast = Ast::new();
        let decl = ast.push_node(NodeSymbol::Int, loc(1, 0), "int");
        let params = ast.push_node(NodeSymbol::ParamList, loc(1, 5), "(");
        let semi = ast.push_node(NodeSymbol::Semicolon, loc(1, 7), ";");
        let proto = ast.adopt_function(decl, params, semi).unwrap();
        assert_eq!(ast.symbol(proto), NodeSymbol::Prototype);
        assert_eq!(ast.children(proto).len(), 2);
        assert_eq!(ast.symbol(semi), NodeSymbol::Released);

        let decl = ast.push_node(NodeSymbol::Int, loc(2, 0), "int");
        let params = ast.push_node(NodeSymbol::ParamList, loc(2, 5), "(");
        let body = ast.push_node(NodeSymbol::Block, loc(2, 7), "{");
        let func = ast.adopt_function(decl, params, body).unwrap();
        assert_eq!(ast.symbol(func), NodeSymbol::Function);
        assert_eq!(ast.children(func), &[decl, params, body]);
    }

    #[test]
    fn release_is_post_order_and_counts_nodes() {
        let mut ast = Ast::new();
        let plus = ast.push_node(NodeSymbol::Add, loc(1, 2), "+");
        let a = ast.push_node(NodeSymbol::IntCon, loc(1, 0), "1");
        let b = ast.push_node(NodeSymbol::IntCon, loc(1, 4), "2");
        ast.adopt2(plus, a, b).unwrap();
        ast.adopt(NodeRef::ROOT, plus).unwrap();
        assert_eq!(ast.release_subtree(plus), 3);
        assert!(ast.children(NodeRef::ROOT).is_empty());
        assert_eq!(ast.symbol(a), NodeSymbol::Released);
        assert_eq!(ast.release_subtree(plus), 0);
        assert!(ast.adopt(NodeRef::ROOT, plus).is_err());
    }
}
