use std::io;
use std::io::Write;

use crate::ast::*;
use crate::writer::Writer;

impl File {
    pub fn to_string(&self) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Render the file, closing any scope still left open.
    pub fn write<W: Write>(&self, out: W) -> io::Result<()> {
        let mut file = self.clone();
        while file.depth() > 0 {
            file.leave();
        }

        let mut writer = Writer::new(out);
        file.scope.write(&mut writer);
        writer.finish().map(|_| ())
    }
}

impl Comment {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        for line in self.0.lines() {
            if line.is_empty() {
                writeln!(out, "//");
            } else {
                writeln!(out, "// {}", line);
            }
        }
    }
}

impl Include {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        if self.system {
            writeln!(out, "#include <{}>", self.path);
        } else {
            writeln!(out, "#include \"{}\"", self.path);
        }
    }
}

impl Define {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        if let Some(value) = self.value.as_ref() {
            writeln!(out, "#define {} {}", self.name, value);
        } else {
            writeln!(out, "#define {}", self.name);
        }
    }
}

impl ConditionalExpression {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        match self {
            ConditionalExpression::Defined(x) => {
                write!(out, "defined({})", x);
            }
            ConditionalExpression::Constant(x) => {
                write!(out, "{}", x);
            }
            ConditionalExpression::Not(x) => {
                write!(out, "!");
                self.write_operand(x, out);
            }
            ConditionalExpression::And(x, y) => {
                self.write_operand(x, out);
                write!(out, " && ");
                self.write_operand(y, out);
            }
            ConditionalExpression::Or(x, y) => {
                self.write_operand(x, out);
                write!(out, " || ");
                self.write_operand(y, out);
            }
        }
    }

    fn write_operand<F: Write>(&self, operand: &ConditionalExpression, out: &mut Writer<F>) {
        if self.precedence() > operand.precedence() {
            write!(out, "(");
            operand.write(out);
            write!(out, ")");
        } else {
            operand.write(out);
        }
    }

    fn precedence(&self) -> usize {
        match self {
            ConditionalExpression::Defined(..) => 3,
            ConditionalExpression::Constant(..) => 3,
            ConditionalExpression::Not(..) => 3,
            ConditionalExpression::And(..) => 2,
            ConditionalExpression::Or(..) => 1,
        }
    }
}

impl GlobalConditional {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        for (i, case) in self.cases.iter().enumerate() {
            if i == 0 {
                write!(out, "#if ");
            } else {
                write!(out, "#elif ");
            }
            case.0.write(out);
            writeln!(out);
            case.1.write(out);
        }

        if let Some(fallthrough) = self.fallthrough.as_ref() {
            writeln!(out, "#else");
            fallthrough.write(out);
        }
        if !self.cases.is_empty() {
            writeln!(out, "#endif");
        }
    }
}

impl Declaration {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        if let Some(prefix) = self.prefix.as_ref() {
            write!(out, "{} ", prefix);
        }
        self.ty.write(out);
        match &self.declarator {
            Declarator::Abstract => {}
            Declarator::Name(name) => write!(out, " {}", name),
            Declarator::Function(name, params) => {
                write!(out, " {}(", name);
                for (i, param) in params.iter().enumerate() {
                    if i != 0 {
                        write!(out, ", ");
                    }
                    param.write(out);
                }
                write!(out, ")");
            }
        }
    }
}

impl TypeSpecifier {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        match self {
            TypeSpecifier::Name(name) => write!(out, "{}", name),
            TypeSpecifier::Struct(def) => def.write(out),
        }
    }
}

impl StructDef {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        write!(out, "struct");
        if let Some(tag) = self.tag.as_ref() {
            write!(out, " {}", tag);
        }
        out.open_brace();
        for member in &self.members {
            member.write(out);
            writeln!(out, ";");
        }
        out.close_brace();
    }
}

impl GlobalSyntax {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        for item in &self.items {
            item.write(out);
        }
    }
}

impl GlobalSyntaxItem {
    pub(crate) fn write<F: Write>(&self, out: &mut Writer<F>) {
        match self {
            GlobalSyntaxItem::Whitespace(lines) => out.new_lines(*lines),
            GlobalSyntaxItem::Comment(x) => x.write(out),
            GlobalSyntaxItem::Include(x) => x.write(out),
            GlobalSyntaxItem::Define(x) => x.write(out),
            GlobalSyntaxItem::Conditional(x) => x.write(out),
            GlobalSyntaxItem::Typedef(x) => {
                write!(out, "typedef ");
                x.write(out);
                writeln!(out, ";");
            }
            GlobalSyntaxItem::Declaration(x) => {
                x.write(out);
                writeln!(out, ";");
            }
            GlobalSyntaxItem::ExternC(x) => {
                write!(out, "extern \"C\"");
                out.open_brace();
                x.write(out);
                out.close_brace();
                out.new_line();
            }
        }
    }
}
