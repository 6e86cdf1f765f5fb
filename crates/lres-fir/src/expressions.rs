//! Bodies: statements and expressions.

use crate::arena::DeclId;
use crate::symbols::SymbolId;
use crate::types::{ConeType, TypeRef};
use lres_syntax::SourceElement;

/// Where a `return` goes: the innermost enclosing function, or the one named
/// by its label. `bound` is `None` when no enclosing function matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnTarget {
    pub label: Option<String>,
    pub bound: Option<SymbolId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    IntLiteral(i64),
    StringLiteral(String),
    BooleanLiteral(bool),
    Name {
        name: String,
        resolved: Option<SymbolId>,
    },
    Call {
        callee: String,
        resolved: Option<SymbolId>,
        args: Vec<Expr>,
    },
    Return {
        target: ReturnTarget,
        value: Option<Box<Expr>>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub source: Option<SourceElement>,
    /// Set by body resolution.
    pub ty: Option<ConeType>,
}

impl Expr {
    pub fn new(kind: ExprKind, source: Option<SourceElement>) -> Expr {
        Expr {
            kind,
            source,
            ty: None,
        }
    }

    /// Direct subexpressions.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Call { args, .. } => args.iter().collect(),
            ExprKind::Return {
                value: Some(value), ..
            } => vec![value.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Visit this expression and all subexpressions, outermost first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    fn rebind_return_targets(&self, from: SymbolId, to: SymbolId) -> Expr {
        let kind = match &self.kind {
            ExprKind::Call {
                callee,
                resolved,
                args,
            } => ExprKind::Call {
                callee: callee.clone(),
                resolved: *resolved,
                args: args
                    .iter()
                    .map(|a| a.rebind_return_targets(from, to))
                    .collect(),
            },
            ExprKind::Return { target, value } => ExprKind::Return {
                target: ReturnTarget {
                    label: target.label.clone(),
                    bound: target.bound.map(|s| if s == from { to } else { s }),
                },
                value: value
                    .as_ref()
                    .map(|v| Box::new(v.rebind_return_targets(from, to))),
            },
            other => other.clone(),
        };
        Expr {
            kind,
            source: self.source.clone(),
            ty: self.ty.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalVariable {
    pub symbol: SymbolId,
    pub name: String,
    pub is_var: bool,
    pub return_type: TypeRef,
    pub initializer: Option<Expr>,
    pub source: Option<SourceElement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Expr(Expr),
    Local(LocalVariable),
    /// A class declared inside the body; lives in the file's arena.
    LocalClass(DeclId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub source: Option<SourceElement>,
}

impl Block {
    /// Visit every expression of the block (initializers included).
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        for statement in &self.statements {
            match statement {
                Statement::Expr(expr) => expr.walk(f),
                Statement::Local(local) => {
                    if let Some(init) = &local.initializer {
                        init.walk(f);
                    }
                }
                Statement::LocalClass(_) => {}
            }
        }
    }

    /// Every return target in the block.
    pub fn return_targets(&self) -> Vec<&ReturnTarget> {
        let mut targets = Vec::new();
        self.walk(&mut |expr| {
            if let ExprKind::Return { target, .. } = &expr.kind {
                targets.push(target);
            }
        });
        targets
    }

    /// A copy of the block where every return bound to `from` is bound to
    /// `to`. Every return node is visited; none is skipped by position.
    pub fn rebind_return_targets(&self, from: SymbolId, to: SymbolId) -> Block {
        let statements = self
            .statements
            .iter()
            .map(|statement| match statement {
                Statement::Expr(expr) => Statement::Expr(expr.rebind_return_targets(from, to)),
                Statement::Local(local) => Statement::Local(LocalVariable {
                    initializer: local
                        .initializer
                        .as_ref()
                        .map(|i| i.rebind_return_targets(from, to)),
                    ..local.clone()
                }),
                Statement::LocalClass(id) => Statement::LocalClass(*id),
            })
            .collect();
        Block {
            statements,
            source: self.source.clone(),
        }
    }

    pub fn local_classes(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.statements.iter().filter_map(|s| match s {
            Statement::LocalClass(id) => Some(*id),
            _ => None,
        })
    }

    pub(crate) fn remap_decl_ids(&mut self, map: &impl Fn(DeclId) -> DeclId) {
        for statement in &mut self.statements {
            if let Statement::LocalClass(id) = statement {
                *id = map(*id);
            }
        }
    }
}
