//! Syntax factory: builds trees from declarative specs.
//!
//! This stands in for the parser (whole files) and for the editor's element
//! factory (standalone expressions and declarations used as hypothetical
//! edits). The shapes it emits are the shapes the raw builder consumes.
//!
//! ```ignore
//! let file = FileSpec::new()
//!     .package("app")
//!     .decl(ClassSpec::new("Outer").member(
//!         FunctionSpec::new("answer").returns("Int").statement(ExprSpec::ret(ExprSpec::int(42))),
//!     ));
//! let tree = SyntaxFactory::file(&file, "app.kt");
//! ```

use crate::builder::TreeBuilder;
use crate::kind::SyntaxKind;
use crate::light::LightTree;
use crate::node::SyntaxNode;
use crate::tree::{SyntaxTree, TreeOrigin};
use std::sync::Arc;

// =============================================================================
// Specs
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum ExprSpec {
    Int(i64),
    Str(String),
    Bool(bool),
    Name(String),
    Call(String, Vec<ExprSpec>),
    Return {
        label: Option<String>,
        value: Option<Box<ExprSpec>>,
    },
}

impl ExprSpec {
    pub fn int(value: i64) -> ExprSpec {
        ExprSpec::Int(value)
    }

    pub fn string(value: &str) -> ExprSpec {
        ExprSpec::Str(value.to_string())
    }

    pub fn name(name: &str) -> ExprSpec {
        ExprSpec::Name(name.to_string())
    }

    pub fn call(callee: &str, args: Vec<ExprSpec>) -> ExprSpec {
        ExprSpec::Call(callee.to_string(), args)
    }

    pub fn ret(value: ExprSpec) -> ExprSpec {
        ExprSpec::Return {
            label: None,
            value: Some(Box::new(value)),
        }
    }

    /// `return@label value`
    pub fn ret_at(label: &str, value: ExprSpec) -> ExprSpec {
        ExprSpec::Return {
            label: Some(label.to_string()),
            value: Some(Box::new(value)),
        }
    }

    pub fn ret_unit() -> ExprSpec {
        ExprSpec::Return {
            label: None,
            value: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtSpec {
    Expr(ExprSpec),
    Local(PropertySpec),
    Class(ClassSpec),
}

impl From<ExprSpec> for StmtSpec {
    fn from(expr: ExprSpec) -> Self {
        StmtSpec::Expr(expr)
    }
}

impl From<PropertySpec> for StmtSpec {
    fn from(property: PropertySpec) -> Self {
        StmtSpec::Local(property)
    }
}

impl From<ClassSpec> for StmtSpec {
    fn from(class: ClassSpec) -> Self {
        StmtSpec::Class(class)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParamSpec {
    pub name: String,
    pub bound: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeclSpec {
    Class(ClassSpec),
    Function(FunctionSpec),
    Property(PropertySpec),
    TypeAlias(TypeAliasSpec),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassSpec {
    pub name: String,
    pub inner: bool,
    pub type_params: Vec<TypeParamSpec>,
    pub constraints: Vec<(String, String)>,
    pub super_class: Option<String>,
    pub super_interfaces: Vec<String>,
    pub members: Vec<DeclSpec>,
}

impl ClassSpec {
    pub fn new(name: &str) -> ClassSpec {
        ClassSpec {
            name: name.to_string(),
            ..ClassSpec::default()
        }
    }

    pub fn inner(mut self) -> Self {
        self.inner = true;
        self
    }

    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(TypeParamSpec {
            name: name.to_string(),
            bound: None,
        });
        self
    }

    pub fn bounded_type_param(mut self, name: &str, bound: &str) -> Self {
        self.type_params.push(TypeParamSpec {
            name: name.to_string(),
            bound: Some(bound.to_string()),
        });
        self
    }

    /// `where name : bound`
    pub fn constraint(mut self, name: &str, bound: &str) -> Self {
        self.constraints.push((name.to_string(), bound.to_string()));
        self
    }

    /// Superclass with a constructor call: `: Base()`.
    pub fn extends(mut self, name: &str) -> Self {
        self.super_class = Some(name.to_string());
        self
    }

    pub fn implements(mut self, name: &str) -> Self {
        self.super_interfaces.push(name.to_string());
        self
    }

    pub fn member(mut self, member: impl Into<DeclSpec>) -> Self {
        self.members.push(member.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContractEffectSpec {
    pub effect: String,
    pub parameter: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    pub type_params: Vec<TypeParamSpec>,
    pub constraints: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub return_type: Option<String>,
    pub contract: Vec<ContractEffectSpec>,
    pub body: Option<Vec<StmtSpec>>,
}

impl FunctionSpec {
    pub fn new(name: &str) -> FunctionSpec {
        FunctionSpec {
            name: name.to_string(),
            ..FunctionSpec::default()
        }
    }

    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(TypeParamSpec {
            name: name.to_string(),
            bound: None,
        });
        self
    }

    pub fn bounded_type_param(mut self, name: &str, bound: &str) -> Self {
        self.type_params.push(TypeParamSpec {
            name: name.to_string(),
            bound: Some(bound.to_string()),
        });
        self
    }

    pub fn constraint(mut self, name: &str, bound: &str) -> Self {
        self.constraints.push((name.to_string(), bound.to_string()));
        self
    }

    pub fn param(mut self, name: &str, ty: &str) -> Self {
        self.params.push((name.to_string(), ty.to_string()));
        self
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.return_type = Some(ty.to_string());
        self
    }

    pub fn contract_effect(mut self, effect: &str, parameter: Option<&str>) -> Self {
        self.contract.push(ContractEffectSpec {
            effect: effect.to_string(),
            parameter: parameter.map(str::to_string),
        });
        self
    }

    /// Append a statement, creating the body if needed.
    pub fn statement(mut self, statement: impl Into<StmtSpec>) -> Self {
        self.body.get_or_insert_with(Vec::new).push(statement.into());
        self
    }

    /// An empty body `{}`.
    pub fn empty_body(mut self) -> Self {
        self.body.get_or_insert_with(Vec::new);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccessorSpec {
    /// Setter parameter name and optional explicit type.
    pub parameter: Option<(String, Option<String>)>,
    pub body: Vec<StmtSpec>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub is_var: bool,
    pub ty: Option<String>,
    pub initializer: Option<ExprSpec>,
    pub getter: Option<AccessorSpec>,
    pub setter: Option<AccessorSpec>,
}

impl PropertySpec {
    pub fn val(name: &str) -> PropertySpec {
        PropertySpec {
            name: name.to_string(),
            ..PropertySpec::default()
        }
    }

    pub fn var(name: &str) -> PropertySpec {
        PropertySpec {
            name: name.to_string(),
            is_var: true,
            ..PropertySpec::default()
        }
    }

    pub fn ty(mut self, ty: &str) -> Self {
        self.ty = Some(ty.to_string());
        self
    }

    pub fn init(mut self, initializer: ExprSpec) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn getter(mut self, body: Vec<StmtSpec>) -> Self {
        self.getter = Some(AccessorSpec {
            parameter: None,
            body,
        });
        self
    }

    pub fn setter(mut self, parameter: &str, ty: Option<&str>, body: Vec<StmtSpec>) -> Self {
        self.setter = Some(AccessorSpec {
            parameter: Some((parameter.to_string(), ty.map(str::to_string))),
            body,
        });
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeAliasSpec {
    pub name: String,
    pub type_params: Vec<TypeParamSpec>,
    pub target: String,
}

impl TypeAliasSpec {
    pub fn new(name: &str, target: &str) -> TypeAliasSpec {
        TypeAliasSpec {
            name: name.to_string(),
            type_params: Vec::new(),
            target: target.to_string(),
        }
    }

    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(TypeParamSpec {
            name: name.to_string(),
            bound: None,
        });
        self
    }
}

macro_rules! impl_into_decl_spec {
    ($($spec:ident => $variant:ident),+ $(,)?) => {
        $(impl From<$spec> for DeclSpec {
            fn from(spec: $spec) -> Self {
                DeclSpec::$variant(spec)
            }
        })+
    };
}

impl_into_decl_spec!(
    ClassSpec => Class,
    FunctionSpec => Function,
    PropertySpec => Property,
    TypeAliasSpec => TypeAlias,
);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileSpec {
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub declarations: Vec<DeclSpec>,
}

impl FileSpec {
    pub fn new() -> FileSpec {
        FileSpec::default()
    }

    pub fn package(mut self, name: &str) -> Self {
        self.package = Some(name.to_string());
        self
    }

    pub fn import(mut self, path: &str) -> Self {
        self.imports.push(path.to_string());
        self
    }

    pub fn decl(mut self, declaration: impl Into<DeclSpec>) -> Self {
        self.declarations.push(declaration.into());
        self
    }
}

// =============================================================================
// Factory
// =============================================================================

pub struct SyntaxFactory;

impl SyntaxFactory {
    /// A physical file, as the parser would produce for an open editor file.
    pub fn file(spec: &FileSpec, file_name: &str) -> Arc<SyntaxTree> {
        let mut builder = TreeBuilder::new();
        emit_file(&mut builder, spec);
        builder.finish(file_name, TreeOrigin::Physical)
    }

    /// A non-physical copy of a file carrying a hypothetical edit.
    pub fn file_copy(spec: &FileSpec, file_name: &str) -> Arc<SyntaxTree> {
        let mut builder = TreeBuilder::new();
        emit_file(&mut builder, spec);
        builder.finish(file_name, TreeOrigin::NonPhysical)
    }

    /// The same file as a light tree.
    pub fn light_file(spec: &FileSpec, file_name: &str) -> Arc<LightTree> {
        let mut builder = TreeBuilder::new();
        emit_file(&mut builder, spec);
        builder.finish_light(file_name, TreeOrigin::Physical)
    }

    /// A standalone, non-physical expression.
    pub fn expression(spec: &ExprSpec) -> SyntaxNode {
        let mut builder = TreeBuilder::new();
        emit_expr(&mut builder, spec);
        builder.finish("<expression>", TreeOrigin::NonPhysical).root()
    }

    /// A standalone, non-physical declaration.
    pub fn declaration(spec: &DeclSpec) -> SyntaxNode {
        let mut builder = TreeBuilder::new();
        emit_decl(&mut builder, spec);
        builder.finish("<declaration>", TreeOrigin::NonPhysical).root()
    }

    /// A standalone, non-physical block.
    pub fn block(statements: &[StmtSpec]) -> SyntaxNode {
        let mut builder = TreeBuilder::new();
        emit_block(&mut builder, statements);
        builder.finish("<block>", TreeOrigin::NonPhysical).root()
    }
}

fn emit_file(b: &mut TreeBuilder, spec: &FileSpec) {
    b.start_node(SyntaxKind::File);
    if let Some(package) = &spec.package {
        b.start_node(SyntaxKind::PackageDirective)
            .token(SyntaxKind::Keyword, "package")
            .token(SyntaxKind::Identifier, package)
            .finish_node();
    }
    for import in &spec.imports {
        b.start_node(SyntaxKind::ImportDirective)
            .token(SyntaxKind::Keyword, "import")
            .token(SyntaxKind::Identifier, import)
            .finish_node();
    }
    for decl in &spec.declarations {
        emit_decl(b, decl);
    }
    b.finish_node();
}

fn emit_decl(b: &mut TreeBuilder, spec: &DeclSpec) {
    match spec {
        DeclSpec::Class(class) => emit_class(b, class),
        DeclSpec::Function(function) => emit_function(b, function),
        DeclSpec::Property(property) => emit_property(b, property),
        DeclSpec::TypeAlias(alias) => emit_type_alias(b, alias),
    }
}

fn emit_class(b: &mut TreeBuilder, spec: &ClassSpec) {
    b.start_node(SyntaxKind::Class);
    if spec.inner {
        b.start_node(SyntaxKind::ModifierList)
            .token(SyntaxKind::Keyword, "inner")
            .finish_node();
    }
    b.token(SyntaxKind::Keyword, "class")
        .token(SyntaxKind::Identifier, &spec.name);
    emit_type_params(b, &spec.type_params);

    if spec.super_class.is_some() || !spec.super_interfaces.is_empty() {
        b.start_node(SyntaxKind::SuperTypeList);
        if let Some(super_class) = &spec.super_class {
            b.start_node(SyntaxKind::SuperTypeCallEntry)
                .start_node(SyntaxKind::ConstructorCallee);
            emit_type_ref(b, super_class);
            b.finish_node()
                .start_node(SyntaxKind::ValueArgumentList)
                .finish_node()
                .finish_node();
        }
        for interface in &spec.super_interfaces {
            b.start_node(SyntaxKind::SuperTypeEntry);
            emit_type_ref(b, interface);
            b.finish_node();
        }
        b.finish_node();
    }

    emit_constraints(b, &spec.constraints);

    if !spec.members.is_empty() {
        b.start_node(SyntaxKind::ClassBody);
        for member in &spec.members {
            emit_decl(b, member);
        }
        b.finish_node();
    }
    b.finish_node();
}

fn emit_function(b: &mut TreeBuilder, spec: &FunctionSpec) {
    b.start_node(SyntaxKind::Function)
        .token(SyntaxKind::Keyword, "fun");
    emit_type_params(b, &spec.type_params);
    b.token(SyntaxKind::Identifier, &spec.name);

    b.start_node(SyntaxKind::ValueParameterList);
    for (name, ty) in &spec.params {
        b.start_node(SyntaxKind::ValueParameter)
            .token(SyntaxKind::Identifier, name);
        emit_type_ref(b, ty);
        b.finish_node();
    }
    b.finish_node();

    if let Some(return_type) = &spec.return_type {
        emit_type_ref(b, return_type);
    }
    emit_constraints(b, &spec.constraints);

    if !spec.contract.is_empty() {
        b.start_node(SyntaxKind::ContractBlock)
            .token(SyntaxKind::Keyword, "contract");
        for effect in &spec.contract {
            b.start_node(SyntaxKind::ContractEffect)
                .token(SyntaxKind::Keyword, &effect.effect);
            if let Some(parameter) = &effect.parameter {
                b.token(SyntaxKind::Identifier, parameter);
            }
            b.finish_node();
        }
        b.finish_node();
    }

    if let Some(body) = &spec.body {
        emit_block(b, body);
    }
    b.finish_node();
}

fn emit_property(b: &mut TreeBuilder, spec: &PropertySpec) {
    b.start_node(SyntaxKind::Property)
        .token(SyntaxKind::Keyword, if spec.is_var { "var" } else { "val" })
        .token(SyntaxKind::Identifier, &spec.name);
    if let Some(ty) = &spec.ty {
        emit_type_ref(b, ty);
    }
    if let Some(initializer) = &spec.initializer {
        emit_expr(b, initializer);
    }
    if let Some(getter) = &spec.getter {
        b.start_node(SyntaxKind::Getter)
            .token(SyntaxKind::Keyword, "get");
        emit_block(b, &getter.body);
        b.finish_node();
    }
    if let Some(setter) = &spec.setter {
        b.start_node(SyntaxKind::Setter)
            .token(SyntaxKind::Keyword, "set");
        if let Some((name, ty)) = &setter.parameter {
            b.start_node(SyntaxKind::ValueParameterList)
                .start_node(SyntaxKind::ValueParameter)
                .token(SyntaxKind::Identifier, name);
            if let Some(ty) = ty {
                emit_type_ref(b, ty);
            }
            b.finish_node().finish_node();
        }
        emit_block(b, &setter.body);
        b.finish_node();
    }
    b.finish_node();
}

fn emit_type_alias(b: &mut TreeBuilder, spec: &TypeAliasSpec) {
    b.start_node(SyntaxKind::TypeAlias)
        .token(SyntaxKind::Keyword, "typealias")
        .token(SyntaxKind::Identifier, &spec.name);
    emit_type_params(b, &spec.type_params);
    emit_type_ref(b, &spec.target);
    b.finish_node();
}

fn emit_type_params(b: &mut TreeBuilder, params: &[TypeParamSpec]) {
    if params.is_empty() {
        return;
    }
    b.start_node(SyntaxKind::TypeParameterList);
    for param in params {
        b.start_node(SyntaxKind::TypeParameter)
            .token(SyntaxKind::Identifier, &param.name);
        if let Some(bound) = &param.bound {
            emit_type_ref(b, bound);
        }
        b.finish_node();
    }
    b.finish_node();
}

fn emit_constraints(b: &mut TreeBuilder, constraints: &[(String, String)]) {
    if constraints.is_empty() {
        return;
    }
    b.start_node(SyntaxKind::TypeConstraintList)
        .token(SyntaxKind::Keyword, "where");
    for (name, bound) in constraints {
        b.start_node(SyntaxKind::TypeConstraint)
            .token(SyntaxKind::Identifier, name);
        emit_type_ref(b, bound);
        b.finish_node();
    }
    b.finish_node();
}

fn emit_type_ref(b: &mut TreeBuilder, name: &str) {
    b.start_node(SyntaxKind::TypeReference)
        .token(SyntaxKind::Identifier, name)
        .finish_node();
}

fn emit_block(b: &mut TreeBuilder, statements: &[StmtSpec]) {
    b.start_node(SyntaxKind::Block);
    for statement in statements {
        match statement {
            StmtSpec::Expr(expr) => emit_expr(b, expr),
            StmtSpec::Local(property) => emit_property(b, property),
            StmtSpec::Class(class) => emit_class(b, class),
        }
    }
    b.finish_node();
}

fn emit_expr(b: &mut TreeBuilder, spec: &ExprSpec) {
    match spec {
        ExprSpec::Int(value) => {
            b.token(SyntaxKind::IntegerLiteral, &value.to_string());
        }
        ExprSpec::Str(value) => {
            b.token(SyntaxKind::StringLiteral, &format!("\"{value}\""));
        }
        ExprSpec::Bool(value) => {
            b.token(SyntaxKind::BooleanLiteral, if *value { "true" } else { "false" });
        }
        ExprSpec::Name(name) => {
            b.start_node(SyntaxKind::ReferenceExpression)
                .token(SyntaxKind::Identifier, name)
                .finish_node();
        }
        ExprSpec::Call(callee, args) => {
            b.start_node(SyntaxKind::CallExpression)
                .start_node(SyntaxKind::ReferenceExpression)
                .token(SyntaxKind::Identifier, callee)
                .finish_node()
                .start_node(SyntaxKind::ValueArgumentList);
            for arg in args {
                emit_expr(b, arg);
            }
            b.finish_node().finish_node();
        }
        ExprSpec::Return { label, value } => {
            b.start_node(SyntaxKind::ReturnExpression)
                .token(SyntaxKind::Keyword, "return");
            if let Some(label) = label {
                b.token(SyntaxKind::Label, &format!("@{label}"));
            }
            if let Some(value) = value {
                emit_expr(b, value);
            }
            b.finish_node();
        }
    }
}
