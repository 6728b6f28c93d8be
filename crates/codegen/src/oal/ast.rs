//! Statement-level syntax tree of an OAL action body.
//!
//! Expressions stay as source text; they are rewritten token by token when
//! the tree is emitted.

use xtuml_core::grammar::Cardinality;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `// text`, without the slashes.
    Comment(String),
    /// `create object instance <var> of <class>;`
    Create { var: String, class: String },
    /// `select <cardinality> <var> related by <navigation> [where <condition>];`
    Select {
        cardinality: Cardinality,
        var: String,
        navigation: String,
        condition: Option<String>,
    },
    /// `delete object instance <var>;`
    Delete { var: String },
    /// `relate <from> to <to> across <label>;`
    Relate {
        from: String,
        to: String,
        label: String,
    },
    /// `<target> = <value>;`
    Assign { target: String, value: String },
    /// Any other statement, such as a bare bridge call.
    Expr(String),
    /// `if` / `elif` branches in order, then the optional `else` body.
    If {
        branches: Vec<(String, Vec<Stmt>)>,
        otherwise: Option<Vec<Stmt>>,
    },
    /// `for each <var> in <collection>`
    ForEach {
        var: String,
        collection: String,
        body: Vec<Stmt>,
    },
}
