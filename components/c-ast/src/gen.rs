use crate::ast::*;

pub fn new() -> File {
    File {
        scope: GlobalSyntax { items: Vec::new() },
        nested_builders: Vec::new(),
    }
}

pub fn file(items: &[GlobalSyntaxItem]) -> File {
    File {
        scope: GlobalSyntax {
            items: items.to_vec(),
        },
        nested_builders: Vec::new(),
    }
}

pub mod global {
    use crate::ast::*;

    pub fn scope(items: &[GlobalSyntaxItem]) -> GlobalSyntax {
        GlobalSyntax {
            items: items.to_vec(),
        }
    }

    pub fn ws(lines: u32) -> GlobalSyntaxItem {
        GlobalSyntaxItem::Whitespace(lines)
    }

    pub fn comment<S: AsRef<str>>(comment: S) -> GlobalSyntaxItem {
        GlobalSyntaxItem::Comment(Comment(comment.as_ref().to_owned()))
    }

    pub fn include<S: AsRef<str>>(system: bool, path: S) -> GlobalSyntaxItem {
        GlobalSyntaxItem::Include(Include {
            system,
            path: path.as_ref().to_owned(),
        })
    }

    pub fn define<S: AsRef<str>>(name: S, value: Option<S>) -> GlobalSyntaxItem {
        GlobalSyntaxItem::Define(Define {
            name: name.as_ref().to_owned(),
            value: value.map(|x| x.as_ref().to_owned()),
        })
    }

    pub fn conditional(
        conditional: ConditionalExpression,
        items: &[GlobalSyntaxItem],
    ) -> GlobalSyntaxItem {
        GlobalSyntaxItem::Conditional(GlobalConditional {
            cases: vec![(conditional, scope(items))],
            fallthrough: None,
        })
    }

    pub fn complex_conditional(
        cases: &[(ConditionalExpression, GlobalSyntax)],
        fallthrough: Option<GlobalSyntax>,
    ) -> GlobalSyntaxItem {
        GlobalSyntaxItem::Conditional(GlobalConditional {
            cases: cases.to_vec(),
            fallthrough,
        })
    }

    pub fn typedef(decl: Declaration) -> GlobalSyntaxItem {
        GlobalSyntaxItem::Typedef(decl)
    }

    pub fn decl(decl: Declaration) -> GlobalSyntaxItem {
        GlobalSyntaxItem::Declaration(decl)
    }
}

pub mod func {
    use crate::ast::*;
    use crate::gen::ty::Type;

    /// `prefix ret name(args)`, with unnamed arguments left abstract.
    pub fn decl<S: AsRef<str>>(
        prefix: Option<String>,
        ret: Type,
        name: S,
        args: &[(Option<String>, Type)],
    ) -> Declaration {
        let params = args
            .iter()
            .map(|(name, ty)| Declaration {
                prefix: None,
                ty: ty.specifier(),
                declarator: match name {
                    Some(name) => Declarator::Name(name.clone()),
                    None => Declarator::Abstract,
                },
            })
            .collect();

        Declaration {
            prefix,
            ty: ret.specifier(),
            declarator: Declarator::Function(name.as_ref().to_owned(), params),
        }
    }
}

pub mod structure {
    use crate::ast::*;

    /// `struct tag { members } name`
    pub fn def(tag: Option<String>, members: &[Declaration], name: Option<String>) -> Declaration {
        Declaration {
            prefix: None,
            ty: TypeSpecifier::Struct(StructDef {
                tag,
                members: members.to_vec(),
            }),
            declarator: name.map(Declarator::Name).unwrap_or(Declarator::Abstract),
        }
    }
}

pub mod conditional {
    use crate::ast::*;

    pub fn defined<S: AsRef<str>>(define: S) -> ConditionalExpression {
        ConditionalExpression::Defined(define.as_ref().to_owned())
    }

    pub fn constant<S: AsRef<str>>(constant: S) -> ConditionalExpression {
        ConditionalExpression::Constant(constant.as_ref().to_owned())
    }

    pub fn and(x: ConditionalExpression, y: ConditionalExpression) -> ConditionalExpression {
        ConditionalExpression::And(Box::new(x), Box::new(y))
    }

    pub fn or(x: ConditionalExpression, y: ConditionalExpression) -> ConditionalExpression {
        ConditionalExpression::Or(Box::new(x), Box::new(y))
    }

    pub fn not(x: ConditionalExpression) -> ConditionalExpression {
        ConditionalExpression::Not(Box::new(x))
    }
}

pub mod var {
    use crate::ast::*;
    use crate::gen::ty::Type;

    pub fn decl<S: AsRef<str>>(ty: Type, name: S) -> Declaration {
        Declaration {
            prefix: None,
            ty: ty.specifier(),
            declarator: Declarator::Name(name.as_ref().to_owned()),
        }
    }
}

pub mod ty {
    use crate::ast::TypeSpecifier;

    /// A type named by a builtin keyword or a typedef.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Type(String);

    impl Type {
        pub(crate) fn specifier(&self) -> TypeSpecifier {
            TypeSpecifier::Name(self.0.clone())
        }
    }

    macro_rules! primitive {
        ($($name:ident)*) => {
            $(
                pub fn $name() -> Type {
                    Type(stringify!($name).to_owned())
                }
            )*
        };
    }

    primitive!(void char short int long float double);

    pub fn ident<S: AsRef<str>>(name: S) -> Type {
        Type(name.as_ref().to_owned())
    }
}
