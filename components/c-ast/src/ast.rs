/// A header under construction.
///
/// Scopes opened with `enter_*` collect items on `nested_builders` until
/// they are closed, at which point they are appended to the enclosing one.
#[derive(Clone, Debug)]
pub struct File {
    pub(crate) scope: GlobalSyntax,
    pub(crate) nested_builders: Vec<(NestedGlobalSyntax, GlobalSyntax)>,
}

#[derive(Clone, Debug)]
pub struct Comment(pub String);

#[derive(Clone, Debug)]
pub struct Include {
    pub system: bool,
    pub path: String,
}

#[derive(Clone, Debug)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

/// Operand of `#if` and `#elif`.
#[derive(Clone, Debug)]
pub enum ConditionalExpression {
    Defined(String),
    Constant(String),
    Not(Box<ConditionalExpression>),
    And(Box<ConditionalExpression>, Box<ConditionalExpression>),
    Or(Box<ConditionalExpression>, Box<ConditionalExpression>),
}

#[derive(Clone, Debug)]
pub struct GlobalConditional {
    pub cases: Vec<(ConditionalExpression, GlobalSyntax)>,
    pub fallthrough: Option<GlobalSyntax>,
}

#[derive(Clone, Debug)]
pub struct Declaration {
    /// Emitted verbatim before the type, e.g. an export macro
    pub prefix: Option<String>,
    pub ty: TypeSpecifier,
    pub declarator: Declarator,
}

#[derive(Clone, Debug)]
pub enum TypeSpecifier {
    /// A builtin or typedef name
    Name(String),
    Struct(StructDef),
}

#[derive(Clone, Debug)]
pub enum Declarator {
    Abstract,
    Name(String),
    Function(String, Vec<Declaration>),
}

/// `struct tag { members }`
#[derive(Clone, Debug)]
pub struct StructDef {
    pub tag: Option<String>,
    pub members: Vec<Declaration>,
}

#[derive(Clone, Debug)]
pub struct GlobalSyntax {
    pub items: Vec<GlobalSyntaxItem>,
}

#[derive(Clone, Debug)]
pub enum GlobalSyntaxItem {
    Whitespace(u32),
    Comment(Comment),
    Include(Include),
    Define(Define),
    Conditional(GlobalConditional),
    Typedef(Declaration),
    Declaration(Declaration),
    ExternC(GlobalSyntax),
}

#[derive(Clone, Debug)]
pub(crate) enum NestedGlobalSyntax {
    Conditional(ConditionalExpression),
    ExternC,
}
