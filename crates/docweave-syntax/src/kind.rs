//! Node kinds
//!
//! Grammar kind names are classified once, at tree construction, into the
//! closed [`NodeKind`] enumeration. Everything downstream matches on the enum.

/// Structural classification of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// File root
    Module,
    /// `def` / `async def`
    Function,
    /// `class`
    Class,
    /// Wrapper holding decorators plus the decorated function or class
    DecoratedDefinition,
    /// `@expr` line attached to a definition
    Decorator,
    /// Indented body of a compound statement
    Block,
    /// `import a, b as c`
    Import,
    /// `from m import a`
    ImportFrom,
    /// `from __future__ import ...`
    FutureImport,
    /// `a.b as c` inside an import
    AliasedImport,
    /// `global x` / `nonlocal x`
    ScopeDeclaration,
    /// Statement wrapping a bare expression or an assignment
    ExpressionStatement,
    /// `target = value`
    Assignment,
    /// `target += value` and friends
    AugmentedAssignment,
    /// Plain name
    Identifier,
    /// String literal, possibly implicitly concatenated
    StringLiteral,
    /// `# ...`
    Comment,
    /// Parameter list of a `def` or `lambda`
    Parameters,
    /// `x=1` or `x: int = 1` in a parameter list
    DefaultParameter,
    /// `x: int` in a parameter list
    TypedParameter,
    /// `*args` / `**kwargs`
    SplatPattern,
    /// `name=value` in a call
    KeywordArgument,
    /// `value.member`
    Attribute,
    /// Any other statement (`if`, `return`, `with`, ...)
    Statement,
    /// Any other named construct (expressions, clauses, patterns, ...)
    Other,
    /// Anonymous token (keywords, punctuation, operators)
    Token,
    /// Parser error recovery node
    Error,
}

impl NodeKind {
    /// Classify a tree-sitter grammar kind
    #[must_use]
    pub fn classify(grammar: &str, named: bool) -> Self {
        if !named {
            return Self::Token;
        }

        match grammar {
            "module" => Self::Module,
            "function_definition" => Self::Function,
            "class_definition" => Self::Class,
            "decorated_definition" => Self::DecoratedDefinition,
            "decorator" => Self::Decorator,
            "block" => Self::Block,
            "import_statement" => Self::Import,
            "import_from_statement" => Self::ImportFrom,
            "future_import_statement" => Self::FutureImport,
            "aliased_import" => Self::AliasedImport,
            "global_statement" | "nonlocal_statement" => Self::ScopeDeclaration,
            "expression_statement" => Self::ExpressionStatement,
            "assignment" => Self::Assignment,
            "augmented_assignment" => Self::AugmentedAssignment,
            "identifier" => Self::Identifier,
            "string" | "concatenated_string" => Self::StringLiteral,
            "comment" => Self::Comment,
            "parameters" | "lambda_parameters" => Self::Parameters,
            "default_parameter" | "typed_default_parameter" => Self::DefaultParameter,
            "typed_parameter" => Self::TypedParameter,
            "list_splat_pattern" | "dictionary_splat_pattern" => Self::SplatPattern,
            "keyword_argument" => Self::KeywordArgument,
            "attribute" => Self::Attribute,
            "ERROR" => Self::Error,
            other if other.ends_with("_statement") => Self::Statement,
            _ => Self::Other,
        }
    }

    /// Function or class
    #[inline]
    #[must_use]
    pub fn is_definition(self) -> bool {
        matches!(self, Self::Function | Self::Class)
    }

    /// Occupies a statement slot inside a module or block
    #[must_use]
    pub fn is_statement(self) -> bool {
        match self {
            Self::Function
            | Self::Class
            | Self::DecoratedDefinition
            | Self::Import
            | Self::ImportFrom
            | Self::FutureImport
            | Self::ScopeDeclaration
            | Self::ExpressionStatement
            | Self::Statement => true,
            Self::Module
            | Self::Decorator
            | Self::Block
            | Self::AliasedImport
            | Self::Assignment
            | Self::AugmentedAssignment
            | Self::Identifier
            | Self::StringLiteral
            | Self::Comment
            | Self::Parameters
            | Self::DefaultParameter
            | Self::TypedParameter
            | Self::SplatPattern
            | Self::KeywordArgument
            | Self::Attribute
            | Self::Other
            | Self::Token
            | Self::Error => false,
        }
    }

    /// Any of the import statement forms
    #[inline]
    #[must_use]
    pub fn is_import(self) -> bool {
        matches!(self, Self::Import | Self::ImportFrom | Self::FutureImport)
    }

    /// Can hold a leading documentation literal as its first statement
    #[inline]
    #[must_use]
    pub fn is_statement_container(self) -> bool {
        matches!(self, Self::Module | Self::Block)
    }
}
