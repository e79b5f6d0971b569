use std::ops::{Deref, DerefMut};

use crate::ast::*;

impl File {
    pub fn enter_conditional(&mut self, conditional: ConditionalExpression) {
        self.nested_builders.push((
            NestedGlobalSyntax::Conditional(conditional),
            GlobalSyntax { items: Vec::new() },
        ))
    }

    pub fn enter_extern_c(&mut self) {
        self.nested_builders.push((
            NestedGlobalSyntax::ExternC,
            GlobalSyntax { items: Vec::new() },
        ))
    }

    /// Close the innermost scope opened with one of the `enter_*` methods.
    ///
    /// Does nothing when no scope is open.
    pub fn leave(&mut self) {
        let (builder, scope) = match self.nested_builders.pop() {
            Some(nested) => nested,
            None => return,
        };

        match builder {
            NestedGlobalSyntax::Conditional(expression) => {
                self.append(GlobalSyntaxItem::Conditional(GlobalConditional {
                    cases: vec![(expression, scope)],
                    fallthrough: None,
                }));
            }
            NestedGlobalSyntax::ExternC => {
                self.append(GlobalSyntaxItem::ExternC(scope));
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.nested_builders.len()
    }
}

impl Deref for File {
    type Target = GlobalSyntax;

    fn deref(&self) -> &Self::Target {
        match self.nested_builders.last() {
            Some((_, scope)) => scope,
            None => &self.scope,
        }
    }
}

impl DerefMut for File {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.nested_builders.last_mut() {
            Some((_, scope)) => scope,
            None => &mut self.scope,
        }
    }
}

impl GlobalSyntax {
    pub fn append(&mut self, item: GlobalSyntaxItem) -> &mut GlobalSyntax {
        self.items.push(item);
        self
    }
}
