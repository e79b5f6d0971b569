//! Reference C aggregate layout.
//!
//! Computes sizes, alignments and field offsets with the natural
//! alignment rules a C compiler applies to a plain struct, for a handful
//! of targets whose data models differ in the places that matter here:
//! the width of `long` and the alignment of 8-byte scalars.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::{Crate, Error, ItemKind, Path, Type};

/// A data model and calling convention, serialized by its name in
/// `TARGETS`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(into = "String", try_from = "String")]
pub enum Target {
    X86_64SysV,
    X86_64Windows,
    Aarch64,
    I686SysV,
    I686Windows,
}

const TARGETS: &[(Target, &str)] = &[
    (Target::X86_64SysV, "x86_64-sysv"),
    (Target::X86_64Windows, "x86_64-windows"),
    (Target::Aarch64, "aarch64"),
    (Target::I686SysV, "i686-sysv"),
    (Target::I686Windows, "i686-windows"),
];

/// How an aggregate returned by value travels back to the caller.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReturnPath {
    Registers,
    /// Through a buffer the caller passes as a hidden pointer argument
    Memory,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub offset: usize,
    pub size: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub name: String,
    pub size: usize,
    pub align: usize,
    pub fields: Vec<FieldLayout>,
}

impl Target {
    pub fn all() -> impl Iterator<Item = Target> {
        TARGETS.iter().map(|&(target, _)| target)
    }

    /// The target this crate is being compiled for, if it is one we model.
    pub fn host() -> Option<Target> {
        // x32 has a 4-byte `long` and is not modelled
        if cfg!(all(target_arch = "x86_64", target_pointer_width = "64", windows)) {
            Some(Target::X86_64Windows)
        } else if cfg!(all(target_arch = "x86_64", target_pointer_width = "64")) {
            Some(Target::X86_64SysV)
        } else if cfg!(all(target_arch = "aarch64", not(windows))) {
            Some(Target::Aarch64)
        } else if cfg!(all(target_arch = "x86", windows)) {
            Some(Target::I686Windows)
        } else if cfg!(target_arch = "x86") {
            Some(Target::I686SysV)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        TARGETS
            .iter()
            .find(|&&(target, _)| target == *self)
            .map(|&(_, name)| name)
            .unwrap_or("unknown")
    }

    pub fn long_size(&self) -> usize {
        match self {
            Target::X86_64SysV | Target::Aarch64 => 8,
            Target::X86_64Windows | Target::I686SysV | Target::I686Windows => 4,
        }
    }

    /// Alignment of `double` and 8-byte integers inside a struct
    pub fn wide_align(&self) -> usize {
        match self {
            Target::I686SysV => 4,
            _ => 8,
        }
    }

    /// How the struct at `path` is returned by value.
    ///
    /// AArch64 also returns homogeneous floating-point aggregates of up
    /// to four members in `v0`-`v3`, whatever their size.
    pub fn return_path(&self, lib: &Crate, path: Path) -> Result<ReturnPath, Error> {
        let layout = self.layout_of(lib, path)?;
        let in_registers = match self {
            Target::X86_64SysV => layout.size <= 16,
            Target::Aarch64 => layout.size <= 16 || is_homogeneous_float(lib, path)?,
            Target::X86_64Windows | Target::I686Windows => match layout.size {
                1 | 2 | 4 | 8 => true,
                _ => false,
            },
            Target::I686SysV => false,
        };

        Ok(if in_registers {
            ReturnPath::Registers
        } else {
            ReturnPath::Memory
        })
    }

    fn scalar(&self, size: usize) -> (usize, usize) {
        if size == 8 {
            (8, self.wide_align())
        } else {
            (size, size)
        }
    }

    /// Compute the C layout of the struct at `path`.
    pub fn layout_of(&self, lib: &Crate, path: Path) -> Result<Layout, Error> {
        let mut stack = Vec::new();
        self.item_layout(lib, path, &mut stack)
    }

    fn type_size_align(
        &self,
        lib: &Crate,
        ty: &Type,
        stack: &mut Vec<Path>,
    ) -> Result<(usize, usize), Error> {
        Ok(match ty {
            Type::Void => (0, 1),
            Type::Bool | Type::Char | Type::I8 | Type::U8 => (1, 1),
            Type::Short | Type::I16 | Type::U16 => (2, 2),
            Type::Int | Type::I32 | Type::U32 | Type::F32 => (4, 4),
            Type::I64 | Type::U64 | Type::F64 => self.scalar(8),
            Type::Long => self.scalar(self.long_size()),
            Type::Path(path) => {
                let layout = self.item_layout(lib, *path, stack)?;
                (layout.size, layout.align)
            }
        })
    }

    fn item_layout(&self, lib: &Crate, path: Path, stack: &mut Vec<Path>) -> Result<Layout, Error> {
        let item = lib.item(path)?;
        if stack.contains(&path) {
            return Err(Error::InfiniteTypeSize(item.name.clone()));
        }
        stack.push(path);

        let mut layout = Layout {
            name: item.name.clone(),
            size: 0,
            align: 1,
            fields: Vec::new(),
        };

        match &item.node {
            ItemKind::Struct(structure) => {
                for field in &structure.fields {
                    let (size, align) = self.type_size_align(lib, &field.ty, stack)?;
                    let offset = round_up(layout.size, align);
                    layout.fields.push(FieldLayout {
                        name: field.name.clone(),
                        offset,
                        size,
                    });
                    layout.size = offset + size;
                    layout.align = layout.align.max(align);
                }
            }
        }
        layout.size = round_up(layout.size, layout.align);

        stack.pop();
        Ok(layout)
    }
}

fn round_up(value: usize, align: usize) -> usize {
    (value + align - 1) / align * align
}

/// Collect the scalar members of `ty`, flattening nested structs.
/// Returns false as soon as a member is not floating point.
fn float_members(lib: &Crate, ty: &Type, members: &mut Vec<Type>) -> Result<bool, Error> {
    match ty {
        Type::F32 | Type::F64 => {
            members.push(ty.clone());
            Ok(true)
        }
        Type::Path(path) => match &lib.item(*path)?.node {
            ItemKind::Struct(structure) => {
                for field in &structure.fields {
                    if !float_members(lib, &field.ty, members)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        },
        _ => Ok(false),
    }
}

// Only called once `layout_of` has succeeded, so the item is not recursive.
fn is_homogeneous_float(lib: &Crate, path: Path) -> Result<bool, Error> {
    let mut members = Vec::new();
    if !float_members(lib, &Type::Path(path), &mut members)? {
        return Ok(false);
    }
    Ok(match members.first() {
        Some(first) => members.len() <= 4 && members.iter().all(|x| x == first),
        None => false,
    })
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Target> for String {
    fn from(target: Target) -> String {
        target.name().to_owned()
    }
}

impl TryFrom<String> for Target {
    type Error = Error;

    fn try_from(name: String) -> Result<Target, Error> {
        name.parse()
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Target, Error> {
        TARGETS
            .iter()
            .find(|&&(_, name)| name == s)
            .map(|&(target, _)| target)
            .ok_or_else(|| Error::UnknownTarget(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, Item};

    fn mixed() -> Crate {
        Crate::new(
            "mixed",
            vec![
                Item::structure(
                    "mixed",
                    vec![
                        Field::new("tag", Type::Char),
                        Field::new("count", Type::Long),
                        Field::new("ratio", Type::F64),
                        Field::new("flag", Type::Bool),
                    ],
                ),
                Item::structure(
                    "outer",
                    vec![
                        Field::new("head", Type::U16),
                        Field::new("inner", Type::Path(Path::new(0))),
                    ],
                ),
            ],
            Vec::new(),
        )
    }

    fn offsets(layout: &Layout) -> Vec<usize> {
        layout.fields.iter().map(|x| x.offset).collect()
    }

    #[test]
    fn lp64_padding() {
        let layout = Target::X86_64SysV.layout_of(&mixed(), Path::new(0)).unwrap();
        assert_eq!(offsets(&layout), vec![0, 8, 16, 24]);
        assert_eq!(layout.size, 32);
        assert_eq!(layout.align, 8);
    }

    #[test]
    fn llp64_padding() {
        let layout = Target::X86_64Windows.layout_of(&mixed(), Path::new(0)).unwrap();
        assert_eq!(offsets(&layout), vec![0, 4, 8, 16]);
        assert_eq!(layout.size, 24);
    }

    #[test]
    fn i386_packs_doubles_to_four() {
        let layout = Target::I686SysV.layout_of(&mixed(), Path::new(0)).unwrap();
        assert_eq!(offsets(&layout), vec![0, 4, 8, 16]);
        assert_eq!(layout.size, 20);
        assert_eq!(layout.align, 4);
    }

    #[test]
    fn nested_struct_uses_inner_alignment() {
        let layout = Target::Aarch64.layout_of(&mixed(), Path::new(1)).unwrap();
        assert_eq!(offsets(&layout), vec![0, 8]);
        assert_eq!(layout.fields[1].size, 32);
        assert_eq!(layout.size, 40);
    }

    fn returns() -> Crate {
        let structure = |name: &str, fields: &[Type]| {
            let fields = fields
                .iter()
                .enumerate()
                .map(|(i, ty)| Field::new(format!("f{}", i), ty.clone()))
                .collect();
            Item::structure(name, fields)
        };
        let pair = Type::Path(Path::new(5));

        Crate::new(
            "returns",
            vec![
                structure("one", &[Type::Char]),
                structure("three", &[Type::U8, Type::U8, Type::U8]),
                structure("eight", &[Type::I64]),
                structure("sixteen", &[Type::I64, Type::I64]),
                structure("triple", &[Type::I64, Type::I64, Type::I64]),
                structure("pair", &[Type::F64, Type::F64]),
                structure("vec3", &[Type::F64, Type::F64, Type::F64]),
                structure("nested", &[pair.clone(), Type::F64]),
                structure("mixed", &[Type::F64, Type::F64, Type::F32]),
                structure("five", &[pair.clone(), pair, Type::F64]),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn return_paths() {
        use self::ReturnPath::{Memory, Registers};

        let lib = returns();
        let path = |target: Target, name: &str| {
            target.return_path(&lib, lib.lookup(name).unwrap()).unwrap()
        };

        assert_eq!(path(Target::X86_64SysV, "sixteen"), Registers);
        assert_eq!(path(Target::X86_64SysV, "triple"), Memory);
        assert_eq!(path(Target::X86_64SysV, "vec3"), Memory);
        assert_eq!(path(Target::Aarch64, "one"), Registers);
        assert_eq!(path(Target::Aarch64, "triple"), Memory);
        assert_eq!(path(Target::X86_64Windows, "eight"), Registers);
        assert_eq!(path(Target::X86_64Windows, "three"), Memory);
        assert_eq!(path(Target::X86_64Windows, "sixteen"), Memory);
        assert_eq!(path(Target::I686Windows, "eight"), Registers);
        assert_eq!(path(Target::I686SysV, "one"), Memory);
    }

    #[test]
    fn aarch64_returns_float_aggregates_in_registers() {
        let lib = returns();
        let path = |name: &str| {
            Target::Aarch64
                .return_path(&lib, lib.lookup(name).unwrap())
                .unwrap()
        };

        assert_eq!(path("vec3"), ReturnPath::Registers);
        assert_eq!(path("nested"), ReturnPath::Registers);
        // More than four members, or mixed float widths
        assert_eq!(path("five"), ReturnPath::Memory);
        assert_eq!(path("mixed"), ReturnPath::Memory);
    }

    #[test]
    fn target_names() {
        for target in Target::all() {
            assert_eq!(target.name().parse::<Target>(), Ok(target));
            assert_eq!(target.to_string(), target.name());
        }
        assert_eq!(
            "sparc".parse::<Target>(),
            Err(Error::UnknownTarget("sparc".into()))
        );
    }

    #[test]
    fn targets_serialize_by_name() {
        assert_eq!(
            serde_json::to_string(&Target::I686Windows).unwrap(),
            "\"i686-windows\""
        );
        let target: Target = serde_json::from_str("\"aarch64\"").unwrap();
        assert_eq!(target, Target::Aarch64);
        assert!(serde_json::from_str::<Target>("\"sparc\"").is_err());
    }
}
