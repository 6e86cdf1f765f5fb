//! Syntax kinds shared by both tree representations.

/// Kind of a syntax node or token.
///
/// Tokens (identifiers, literals, keywords, labels) are leaves; every other
/// kind is a composite node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // Tokens
    Identifier,
    Keyword,
    Label,
    IntegerLiteral,
    StringLiteral,
    BooleanLiteral,

    // File structure
    File,
    PackageDirective,
    ImportDirective,

    // Declarations
    Class,
    Function,
    Property,
    TypeAlias,
    Getter,
    Setter,

    // Declaration parts
    ModifierList,
    ClassBody,
    TypeParameterList,
    TypeParameter,
    TypeConstraintList,
    TypeConstraint,
    SuperTypeList,
    SuperTypeCallEntry,
    SuperTypeEntry,
    ConstructorCallee,
    TypeReference,
    ValueParameterList,
    ValueParameter,
    ContractBlock,
    ContractEffect,

    // Bodies
    Block,
    ReturnExpression,
    CallExpression,
    ValueArgumentList,
    ReferenceExpression,
}

impl SyntaxKind {
    pub const fn is_token(self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::Keyword
                | SyntaxKind::Label
                | SyntaxKind::IntegerLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::BooleanLiteral
        )
    }

    /// Kinds that can appear as a statement or expression inside a block.
    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntegerLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::BooleanLiteral
                | SyntaxKind::ReturnExpression
                | SyntaxKind::CallExpression
                | SyntaxKind::ReferenceExpression
        )
    }
}
