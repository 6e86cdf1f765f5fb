//! Raw builder: syntax trees to unresolved declarations.
//!
//! The raw builder reads the tree exactly once and resolves nothing: type
//! references stay `Unresolved`, names in bodies stay unbound. The one thing
//! settled here is where each `return` goes, because that depends only on
//! the nesting of functions in the syntax.

pub mod context;
pub mod fragment;

pub use context::{BuilderContext, ClassFrame};
pub use fragment::{ReplacementPair, build_fragment};

use crate::arena::{DeclArena, DeclId};
use crate::declarations::{
    Accessor, ClassData, ContractDescription, DeclData, DeclFlags, DeclKind, Declaration,
    FunctionData, PropertyData, RawContractEffect, TypeAliasData, TypeParameter, TypeParameterRef,
    ValueParameter,
};
use crate::error::ResolveError;
use crate::expressions::{Block, Expr, ExprKind, LocalVariable, ReturnTarget, Statement};
use crate::file::{FirFile, FirImport};
use crate::phase::ResolvePhase;
use crate::session::FirSession;
use crate::types::{ConeType, TypeRef};
use lres_syntax::{SourceElement, SyntaxKind, SyntaxNode, is_declaration_kind};
use tracing::{debug, trace};

const NO_NAME: &str = "<no name>";

/// Build the raw semantic model of a whole file.
pub fn build_file(session: &FirSession, root: &SyntaxNode) -> Result<FirFile, ResolveError> {
    if root.kind() != SyntaxKind::File {
        return Err(ResolveError::UnsupportedDeclaration(root.kind()));
    }
    let package = root
        .first_child(SyntaxKind::PackageDirective)
        .and_then(|p| p.name())
        .unwrap_or_default();

    let mut builder = RawBuilder::new(session, BuilderContext::new(package.clone()), None);
    let mut imports = Vec::new();
    let mut declarations = Vec::new();
    for child in root.children() {
        match child.kind() {
            SyntaxKind::ImportDirective => imports.push(FirImport {
                path: child.name().unwrap_or_default(),
                source: Some(SourceElement::new(&child)),
                resolved: None,
            }),
            kind if is_declaration_kind(kind) => {
                declarations.push(builder.convert_declaration(&child)?);
            }
            _ => {}
        }
    }

    let file = FirFile {
        id: session.next_file_id(),
        name: root.file_name().to_string(),
        package,
        imports,
        imports_resolved: false,
        diagnostics: Vec::new(),
        declarations,
        arena: builder.into_arena(),
        syntax: root.clone(),
    };
    debug!(
        file = %file.name,
        declarations = file.arena.len(),
        light = root.is_light(),
        "raw file built"
    );
    Ok(file)
}

/// Converts declaration syntax into arena entries.
pub struct RawBuilder<'a> {
    session: &'a FirSession,
    ctx: BuilderContext,
    arena: DeclArena,
    replacement: Option<&'a ReplacementPair>,
}

impl<'a> RawBuilder<'a> {
    pub fn new(
        session: &'a FirSession,
        ctx: BuilderContext,
        replacement: Option<&'a ReplacementPair>,
    ) -> RawBuilder<'a> {
        RawBuilder {
            session,
            ctx,
            arena: DeclArena::new(),
            replacement,
        }
    }

    pub fn into_arena(self) -> DeclArena {
        self.arena
    }

    /// The substitute when the walker meets the replaced node.
    fn substitute(&self, node: &SyntaxNode) -> SyntaxNode {
        match self.replacement {
            Some(pair) if pair.original.key() == node.key() => {
                trace!(original = ?pair.original, "substituting replacement node");
                pair.substitute.clone()
            }
            _ => node.clone(),
        }
    }

    fn children(&self, node: &SyntaxNode) -> Vec<SyntaxNode> {
        node.children().iter().map(|c| self.substitute(c)).collect()
    }

    fn child(&self, node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.children(node).into_iter().find(|c| c.kind() == kind)
    }

    fn flags(&self) -> DeclFlags {
        if self.ctx.in_body() {
            DeclFlags::LOCAL
        } else {
            DeclFlags::empty()
        }
    }

    pub fn convert_declaration(&mut self, node: &SyntaxNode) -> Result<DeclId, ResolveError> {
        let node = self.substitute(node);
        match DeclKind::from_syntax(node.kind()) {
            Some(DeclKind::Class) => Ok(self.convert_class(&node)),
            Some(DeclKind::Function) => Ok(self.convert_function(&node)),
            Some(DeclKind::Property) => Ok(self.convert_property(&node)),
            Some(DeclKind::TypeAlias) => Ok(self.convert_type_alias(&node)),
            None => Err(ResolveError::UnsupportedDeclaration(node.kind())),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn convert_class(&mut self, node: &SyntaxNode) -> DeclId {
        let name = node.name().unwrap_or_else(|| NO_NAME.to_string());
        let mut flags = self.flags();
        if node.has_keyword("inner") {
            flags |= DeclFlags::INNER;
        }
        let type_parameters = self.convert_type_parameters(node);
        let own = type_parameter_refs(&type_parameters);
        let captures_outer = flags.intersects(DeclFlags::INNER | DeclFlags::LOCAL);
        let frame = self.ctx.enter_class(&name, captures_outer, own);

        let mut super_types = Vec::new();
        if let Some(list) = self.child(node, SyntaxKind::SuperTypeList) {
            for entry in self.children(&list) {
                let reference = match entry.kind() {
                    SyntaxKind::SuperTypeCallEntry => self
                        .child(&entry, SyntaxKind::ConstructorCallee)
                        .and_then(|callee| self.child(&callee, SyntaxKind::TypeReference)),
                    SyntaxKind::SuperTypeEntry => self.child(&entry, SyntaxKind::TypeReference),
                    _ => None,
                };
                if let Some(reference) = reference {
                    super_types.push(type_ref(&reference));
                }
            }
        }

        let mut members = Vec::new();
        if let Some(body) = self.child(node, SyntaxKind::ClassBody) {
            for member in self.children(&body) {
                if is_declaration_kind(member.kind()) {
                    // Declaration kinds always convert.
                    if let Ok(id) = self.convert_declaration(&member) {
                        members.push(id);
                    }
                }
            }
        }

        let captured = frame.captured.clone();
        let self_type = frame.self_type.clone();
        self.ctx.exit_class(frame);

        self.arena.alloc(Declaration {
            symbol: self.session.fresh_symbol(),
            name,
            kind: DeclKind::Class,
            flags,
            phase: ResolvePhase::Raw,
            source: Some(SourceElement::new(node)),
            type_parameters,
            captured_type_parameters: captured,
            data: DeclData::Class(ClassData {
                self_type,
                super_types,
                members,
            }),
            diagnostics: Vec::new(),
        })
    }

    fn convert_function(&mut self, node: &SyntaxNode) -> DeclId {
        let name = node.name().unwrap_or_else(|| NO_NAME.to_string());
        let symbol = self.session.fresh_symbol();
        let type_parameters = self.convert_type_parameters(node);

        let value_parameters = self
            .child(node, SyntaxKind::ValueParameterList)
            .map(|list| self.convert_value_parameters(&list, None))
            .unwrap_or_default();

        let contract = self.child(node, SyntaxKind::ContractBlock).map(|block| {
            let effects = self
                .children(&block)
                .into_iter()
                .filter(|c| c.kind() == SyntaxKind::ContractEffect)
                .map(|effect| RawContractEffect {
                    effect: effect
                        .first_child(SyntaxKind::Keyword)
                        .and_then(|k| k.text().map(str::to_string))
                        .unwrap_or_default(),
                    parameter: effect.name(),
                    source: Some(SourceElement::new(&effect)),
                })
                .collect();
            ContractDescription::Raw(effects)
        });

        let body_node = self.child(node, SyntaxKind::Block);
        let return_type = match self.child(node, SyntaxKind::TypeReference) {
            Some(reference) => type_ref(&reference),
            None if body_node.is_some() => TypeRef::Implicit,
            None => TypeRef::resolved(ConeType::UNIT),
        };

        let captured = self.ctx.captured_type_parameters().to_vec();
        let dispatch_receiver = self.dispatch_receiver();
        let flags = self.flags();

        let body = body_node.map(|block| {
            self.ctx.enter_body(Some(&name), symbol);
            let block = self.convert_block(&block);
            self.ctx.exit_body();
            block
        });

        self.arena.alloc(Declaration {
            symbol,
            name,
            kind: DeclKind::Function,
            flags,
            phase: ResolvePhase::Raw,
            source: Some(SourceElement::new(node)),
            type_parameters,
            captured_type_parameters: captured,
            data: DeclData::Function(FunctionData {
                dispatch_receiver,
                value_parameters,
                return_type,
                contract,
                body,
            }),
            diagnostics: Vec::new(),
        })
    }

    fn convert_property(&mut self, node: &SyntaxNode) -> DeclId {
        let name = node.name().unwrap_or_else(|| NO_NAME.to_string());
        let mut flags = self.flags();
        if node.has_keyword("var") {
            flags |= DeclFlags::VAR;
        }
        let return_type = self
            .child(node, SyntaxKind::TypeReference)
            .map(|r| type_ref(&r))
            .unwrap_or(TypeRef::Implicit);
        let initializer = self
            .children(node)
            .into_iter()
            .find(|c| c.kind().is_expression())
            .and_then(|e| self.convert_expr(&e));

        let getter = self
            .child(node, SyntaxKind::Getter)
            .map(|g| self.convert_accessor(&g, &return_type));
        let setter = self
            .child(node, SyntaxKind::Setter)
            .map(|s| self.convert_accessor(&s, &return_type));

        self.arena.alloc(Declaration {
            symbol: self.session.fresh_symbol(),
            name,
            kind: DeclKind::Property,
            flags,
            phase: ResolvePhase::Raw,
            source: Some(SourceElement::new(node)),
            type_parameters: Vec::new(),
            captured_type_parameters: self.ctx.captured_type_parameters().to_vec(),
            data: DeclData::Property(PropertyData {
                dispatch_receiver: self.dispatch_receiver(),
                return_type,
                initializer,
                getter,
                setter,
            }),
            diagnostics: Vec::new(),
        })
    }

    /// Getters return the property type; setters take one parameter of the
    /// property type unless it says otherwise, and return `Unit`.
    fn convert_accessor(&mut self, node: &SyntaxNode, property_type: &TypeRef) -> Accessor {
        let symbol = self.session.fresh_symbol();
        let is_setter = node.kind() == SyntaxKind::Setter;
        let (label, value_parameter, return_type) = if is_setter {
            let parameter = self
                .child(node, SyntaxKind::ValueParameterList)
                .and_then(|list| {
                    self.convert_value_parameters(&list, Some(property_type))
                        .into_iter()
                        .next()
                })
                .unwrap_or_else(|| ValueParameter {
                    symbol: self.session.fresh_symbol(),
                    name: "value".to_string(),
                    return_type: property_type.clone(),
                    source: None,
                });
            ("set", Some(parameter), TypeRef::resolved(ConeType::UNIT))
        } else {
            ("get", None, property_type.clone())
        };

        let body = self.child(node, SyntaxKind::Block).map(|block| {
            self.ctx.enter_body(Some(label), symbol);
            let block = self.convert_block(&block);
            self.ctx.exit_body();
            block
        });

        Accessor {
            symbol,
            source: Some(SourceElement::new(node)),
            value_parameter,
            return_type,
            body,
        }
    }

    fn convert_type_alias(&mut self, node: &SyntaxNode) -> DeclId {
        let name = node.name().unwrap_or_else(|| NO_NAME.to_string());
        let type_parameters = self.convert_type_parameters(node);
        let expanded = self
            .child(node, SyntaxKind::TypeReference)
            .map(|r| type_ref(&r))
            .unwrap_or_else(|| TypeRef::resolved(ConeType::Error("missing aliased type".into())));
        self.arena.alloc(Declaration {
            symbol: self.session.fresh_symbol(),
            name,
            kind: DeclKind::TypeAlias,
            flags: self.flags(),
            phase: ResolvePhase::Raw,
            source: Some(SourceElement::new(node)),
            type_parameters,
            captured_type_parameters: self.ctx.captured_type_parameters().to_vec(),
            data: DeclData::TypeAlias(TypeAliasData { expanded }),
            diagnostics: Vec::new(),
        })
    }

    fn dispatch_receiver(&self) -> Option<ConeType> {
        if self.ctx.in_body() {
            return None;
        }
        self.ctx.current_self_type().cloned()
    }

    // =========================================================================
    // Header parts
    // =========================================================================

    /// Type parameters with their inline bound, followed by the bounds
    /// declared for them in a `where` clause.
    fn convert_type_parameters(&mut self, node: &SyntaxNode) -> Vec<TypeParameter> {
        let mut parameters: Vec<TypeParameter> = Vec::new();
        if let Some(list) = self.child(node, SyntaxKind::TypeParameterList) {
            for parameter in self.children(&list) {
                if parameter.kind() != SyntaxKind::TypeParameter {
                    continue;
                }
                parameters.push(TypeParameter {
                    symbol: self.session.fresh_symbol(),
                    name: parameter.name().unwrap_or_else(|| NO_NAME.to_string()),
                    bounds: self
                        .child(&parameter, SyntaxKind::TypeReference)
                        .map(|r| type_ref(&r))
                        .into_iter()
                        .collect(),
                    source: Some(SourceElement::new(&parameter)),
                });
            }
        }
        if let Some(list) = self.child(node, SyntaxKind::TypeConstraintList) {
            for constraint in self.children(&list) {
                let (Some(subject), Some(bound)) = (
                    constraint.name(),
                    self.child(&constraint, SyntaxKind::TypeReference),
                ) else {
                    continue;
                };
                if let Some(parameter) = parameters.iter_mut().find(|p| p.name == subject) {
                    parameter.bounds.push(type_ref(&bound));
                }
            }
        }
        parameters
    }

    fn convert_value_parameters(
        &mut self,
        list: &SyntaxNode,
        default_type: Option<&TypeRef>,
    ) -> Vec<ValueParameter> {
        self.children(list)
            .into_iter()
            .filter(|p| p.kind() == SyntaxKind::ValueParameter)
            .map(|parameter| ValueParameter {
                symbol: self.session.fresh_symbol(),
                name: parameter.name().unwrap_or_else(|| NO_NAME.to_string()),
                return_type: self
                    .child(&parameter, SyntaxKind::TypeReference)
                    .map(|r| type_ref(&r))
                    .or_else(|| default_type.cloned())
                    .unwrap_or(TypeRef::Implicit),
                source: Some(SourceElement::new(&parameter)),
            })
            .collect()
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    fn convert_block(&mut self, node: &SyntaxNode) -> Block {
        let mut statements = Vec::new();
        for child in self.children(node) {
            let statement = match child.kind() {
                SyntaxKind::Property => Some(Statement::Local(self.convert_local(&child))),
                SyntaxKind::Class => Some(Statement::LocalClass(self.convert_class(&child))),
                kind if kind.is_expression() => self.convert_expr(&child).map(Statement::Expr),
                _ => None,
            };
            statements.extend(statement);
        }
        Block {
            statements,
            source: Some(SourceElement::new(node)),
        }
    }

    fn convert_local(&mut self, node: &SyntaxNode) -> LocalVariable {
        LocalVariable {
            symbol: self.session.fresh_symbol(),
            name: node.name().unwrap_or_else(|| NO_NAME.to_string()),
            is_var: node.has_keyword("var"),
            return_type: self
                .child(node, SyntaxKind::TypeReference)
                .map(|r| type_ref(&r))
                .unwrap_or(TypeRef::Implicit),
            initializer: self
                .children(node)
                .into_iter()
                .find(|c| c.kind().is_expression())
                .and_then(|e| self.convert_expr(&e)),
            source: Some(SourceElement::new(node)),
        }
    }

    fn convert_expr(&mut self, node: &SyntaxNode) -> Option<Expr> {
        let node = self.substitute(node);
        let text = node.text().unwrap_or_default();
        let kind = match node.kind() {
            SyntaxKind::IntegerLiteral => ExprKind::IntLiteral(text.parse().unwrap_or_default()),
            SyntaxKind::StringLiteral => ExprKind::StringLiteral(text.trim_matches('"').to_string()),
            SyntaxKind::BooleanLiteral => ExprKind::BooleanLiteral(text == "true"),
            SyntaxKind::ReferenceExpression => ExprKind::Name {
                name: node.name().unwrap_or_default(),
                resolved: None,
            },
            SyntaxKind::CallExpression => {
                let callee = self
                    .child(&node, SyntaxKind::ReferenceExpression)
                    .and_then(|r| r.name())
                    .unwrap_or_default();
                let args = self
                    .child(&node, SyntaxKind::ValueArgumentList)
                    .map(|list| {
                        self.children(&list)
                            .iter()
                            .filter_map(|a| self.convert_expr(a))
                            .collect()
                    })
                    .unwrap_or_default();
                ExprKind::Call {
                    callee,
                    resolved: None,
                    args,
                }
            }
            SyntaxKind::ReturnExpression => {
                let label = self
                    .child(&node, SyntaxKind::Label)
                    .and_then(|l| l.text().map(|t| t.trim_start_matches('@').to_string()));
                let bound = self.ctx.bind_return(label.as_deref());
                let value = self
                    .children(&node)
                    .into_iter()
                    .find(|c| c.kind().is_expression())
                    .and_then(|v| self.convert_expr(&v))
                    .map(Box::new);
                ExprKind::Return {
                    target: ReturnTarget { label, bound },
                    value,
                }
            }
            _ => return None,
        };
        Some(Expr::new(kind, Some(SourceElement::new(&node))))
    }
}

fn type_ref(node: &SyntaxNode) -> TypeRef {
    TypeRef::unresolved(
        node.name().unwrap_or_default(),
        Some(SourceElement::new(node)),
    )
}

fn type_parameter_refs(parameters: &[TypeParameter]) -> Vec<TypeParameterRef> {
    parameters
        .iter()
        .map(|p| TypeParameterRef {
            name: p.name.clone(),
            symbol: p.symbol,
        })
        .collect()
}

/// Symbols of every type parameter visible at `decl`: its own, then the
/// captured ones of its enclosing classes.
pub fn visible_type_parameters(decl: &Declaration) -> Vec<TypeParameterRef> {
    let mut visible = type_parameter_refs(&decl.type_parameters);
    visible.extend(decl.captured_type_parameters.iter().cloned());
    visible
}
