extern crate c_ast as c;
extern crate metadata_ffi as ffi;
#[macro_use]
extern crate log;

use std::io;
use std::io::Write;

use c::ast;
use thiserror::Error;

const VERSION: &str = concat!("Generated with c-ffi version ", env!("CARGO_PKG_VERSION"));
const C_STANDARD_INCLUDES: &[&str] = &["stdint.h", "stdlib.h", "stdbool.h"];
const CXX_STANDARD_INCLUDES: &[&str] = &["cstdint", "cstdlib"];

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid crate metadata: {0}")]
    Metadata(#[from] ffi::Error),
    #[error("failed to write header: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Language {
    Cxx,
    C,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Optional text to output at the beginning of the file
    pub header: Option<String>,
    /// Optional text to output at the end of the file
    pub trailer: Option<String>,
    /// Optional name to use for an include guard
    pub include_guard: Option<String>,
    /// A list of additional includes to put at the beginning of the generated header
    pub includes: Vec<String>,
    /// A list of additional system includes to put at the beginning of the generated header
    pub sys_includes: Vec<String>,
    /// Optional text to output at major sections to deter manual editing
    pub autogen_warning: Option<String>,
    /// Include a comment with the version of c-ffi used to generate the file
    pub include_version: bool,
    /// The language to output bindings for
    pub language: Language,
    /// Name of a macro defined as the import qualifier of the library's
    /// functions and prefixed to every function declaration
    pub export_macro: Option<String>,
    /// Annotate every struct with its size and alignment on this target
    pub layout_target: Option<ffi::Target>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            header: None,
            trailer: None,
            include_guard: None,
            includes: Vec::new(),
            sys_includes: Vec::new(),
            autogen_warning: None,
            include_version: true,
            language: Language::C,
            export_macro: None,
            layout_target: None,
        }
    }
}

struct Context<'a> {
    lib: &'a ffi::Crate,
}

trait Convert {
    type Out;
    fn convert(&self, ctx: &Context) -> Self::Out;
}

impl Convert for ffi::Type {
    type Out = c::ty::Type;

    fn convert(&self, ctx: &Context) -> Self::Out {
        match self {
            ffi::Type::Void => c::ty::void(),
            ffi::Type::Bool => c::ty::ident("bool"),
            ffi::Type::Char => c::ty::char(),
            ffi::Type::Short => c::ty::short(),
            ffi::Type::Int => c::ty::int(),
            ffi::Type::Long => c::ty::long(),
            ffi::Type::I8 => c::ty::ident("int8_t"),
            ffi::Type::I16 => c::ty::ident("int16_t"),
            ffi::Type::I32 => c::ty::ident("int32_t"),
            ffi::Type::I64 => c::ty::ident("int64_t"),
            ffi::Type::U8 => c::ty::ident("uint8_t"),
            ffi::Type::U16 => c::ty::ident("uint16_t"),
            ffi::Type::U32 => c::ty::ident("uint32_t"),
            ffi::Type::U64 => c::ty::ident("uint64_t"),
            ffi::Type::F32 => c::ty::float(),
            ffi::Type::F64 => c::ty::double(),
            // Paths were checked by `Crate::validate`, and every item is
            // emitted as a typedef of the same name.
            ffi::Type::Path(path) => c::ty::ident(&ctx.lib.items[path.index].name),
        }
    }
}

impl Convert for ffi::Field {
    type Out = ast::Declaration;

    fn convert(&self, ctx: &Context) -> Self::Out {
        c::var::decl(self.ty.convert(ctx), &self.name)
    }
}

fn struct_definition(name: &str, structure: &ffi::Struct, ctx: &Context) -> ast::Declaration {
    let members: Vec<_> = structure.fields.iter().map(|x| x.convert(ctx)).collect();
    c::structure::def(Some(name.to_owned()), &members, Some(name.to_owned()))
}

fn layout_comment(
    lib: &ffi::Crate,
    path: ffi::Path,
    target: ffi::Target,
) -> Result<String, ffi::Error> {
    let layout = target.layout_of(lib, path)?;
    let returned = match target.return_path(lib, path)? {
        ffi::ReturnPath::Registers => "registers",
        ffi::ReturnPath::Memory => "memory",
    };
    Ok(format!(
        "size {}, align {} on {}, returned in {}",
        layout.size, layout.align, target, returned
    ))
}

fn export_macro_block(name: &str) -> ast::GlobalSyntaxItem {
    c::global::complex_conditional(
        &[(
            c::conditional::defined("_MSC_VER"),
            c::global::scope(&[c::global::define(name, Some("__declspec(dllimport)"))]),
        )],
        Some(c::global::scope(&[c::global::define(name, Some("extern"))])),
    )
}

/// Build the header for `lib` as a syntax tree.
pub fn build(lib: &ffi::Crate, config: &Config) -> Result<ast::File, Error> {
    lib.validate()?;

    let ctx = Context { lib };
    let mut ast = c::new();

    if config.include_version {
        ast.append(c::global::comment(VERSION));
    }

    if let Some(header) = config.header.as_ref() {
        ast.append(c::global::comment(header));
    }

    if let Some(include_guard) = config.include_guard.as_ref() {
        ast.enter_conditional(c::conditional::not(c::conditional::defined(include_guard)));
        ast.append(c::global::define(include_guard.as_str(), None));
    }

    let standard_includes = match config.language {
        Language::Cxx => CXX_STANDARD_INCLUDES,
        Language::C => C_STANDARD_INCLUDES,
    };
    for include in standard_includes {
        ast.append(c::global::include(true, include));
    }
    for include in &config.sys_includes {
        ast.append(c::global::include(true, include));
    }
    for include in &config.includes {
        ast.append(c::global::include(false, include));
    }

    if let Some(export_macro) = config.export_macro.as_ref() {
        ast.append(c::global::ws(1));
        ast.append(export_macro_block(export_macro));
    }

    if let Some(autogen_warning) = config.autogen_warning.as_ref() {
        ast.append(c::global::ws(1));
        ast.append(c::global::comment(autogen_warning));
    }

    // Items
    for (index, item) in lib.items.iter().enumerate() {
        debug!("emitting item `{}`", item.name);
        ast.append(c::global::ws(1));

        if let Some(target) = config.layout_target {
            let comment = layout_comment(lib, ffi::Path::new(index), target)?;
            ast.append(c::global::comment(comment));
        }

        match &item.node {
            ffi::ItemKind::Struct(structure) => {
                ast.append(c::global::typedef(struct_definition(
                    &item.name, structure, &ctx,
                )));
            }
        }
    }

    // Functions
    if !lib.functions.is_empty() {
        ast.append(c::global::ws(1));
    }
    if config.language == Language::Cxx {
        ast.enter_extern_c();
    }
    for function in &lib.functions {
        debug!("emitting function `{}`", function.name);

        let mut inputs: Vec<_> = function
            .signature
            .inputs
            .iter()
            .map(|x| (None, x.convert(&ctx)))
            .collect();
        // An empty list means "unspecified arguments" in C
        if inputs.is_empty() && config.language == Language::C {
            inputs.push((None, c::ty::void()));
        }

        let decl = c::func::decl(
            config.export_macro.clone(),
            function.signature.output.convert(&ctx),
            &function.name,
            &inputs,
        );
        ast.append(c::global::decl(decl));
    }
    if config.language == Language::Cxx {
        ast.leave();
    }

    if let Some(autogen_warning) = config.autogen_warning.as_ref() {
        ast.append(c::global::comment(autogen_warning));
    }

    if config.include_guard.is_some() {
        ast.append(c::global::ws(1));
        ast.leave();
    }

    if let Some(trailer) = config.trailer.as_ref() {
        ast.append(c::global::comment(trailer));
    }

    Ok(ast)
}

/// Write the header for `lib` to `out`.
pub fn generate<W: Write>(lib: &ffi::Crate, config: &Config, out: W) -> Result<(), Error> {
    let ast = build(lib, config)?;
    ast.write(out)?;
    info!(
        "generated header for `{}`: {} items, {} functions",
        lib.crate_name,
        lib.items.len(),
        lib.functions.len()
    );
    Ok(())
}
