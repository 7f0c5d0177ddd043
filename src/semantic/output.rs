use crate::ast::NodeRef;
use crate::semantic::symbol_table::SymbolTable;

/// Declarations collected during analysis, each in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclQueues {
    /// STRUCT nodes whose body was accepted.
    pub structs: Vec<NodeRef>,
    /// STRINGCON nodes.
    pub strings: Vec<NodeRef>,
    /// Global VARDECL nodes.
    pub globals: Vec<NodeRef>,
    /// FUNCTION nodes. Prototypes are never queued.
    pub functions: Vec<NodeRef>,
}

/// Complete semantic analysis output
#[derive(Debug)]
pub struct SemaOutput {
    pub symbols: SymbolTable,
    pub queues: DeclQueues,
}
