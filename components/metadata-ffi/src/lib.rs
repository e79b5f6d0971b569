#[macro_use]
extern crate serde_derive;
extern crate serde;
extern crate thiserror;

mod error;
pub mod layout;

use std::collections::HashSet;

pub use crate::error::Error;
pub use crate::layout::{FieldLayout, Layout, ReturnPath, Target};

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename = "path")]
pub struct Path {
    pub index: usize,
}

impl Path {
    pub fn new(index: usize) -> Path {
        Path { index }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename = "type")]
#[serde(rename_all = "lowercase")]
#[serde(tag = "kind")]
pub enum Type {
    /// A zero-sized type used when a function returns ()
    Void,

    Bool,
    /// C `char`, whatever its signedness on the target
    Char,
    /// C `short`
    Short,
    /// C `int`
    Int,
    /// C `long`, the width of which depends on the target's data model
    Long,

    I8,
    I16,
    I32,
    I64,

    U8,
    U16,
    U32,
    U64,

    F32,
    F64,

    Path(Path),
}

impl Type {
    pub fn for_each_path<F: FnMut(Path)>(&self, callback: &mut F) {
        if let Type::Path(path) = *self {
            callback(path);
        }
    }

    pub fn is_void(&self) -> bool {
        *self == Type::Void
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename = "field")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Field {
    pub fn new<S: Into<String>>(name: S, ty: Type) -> Field {
        Field {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename = "struct")]
pub struct Struct {
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn new(fields: Vec<Field>) -> Struct {
        Struct { fields }
    }

    pub fn for_each_path<F: FnMut(Path)>(&self, callback: &mut F) {
        for field in &self.fields {
            field.ty.for_each_path(callback);
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename = "item-kind")]
#[serde(tag = "kind")]
pub enum ItemKind {
    #[serde(rename = "Struct")]
    Struct(Struct),
}

impl ItemKind {
    pub fn for_each_path<F: FnMut(Path)>(&self, callback: &mut F) {
        match self {
            ItemKind::Struct(structure) => structure.for_each_path(callback),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename = "item")]
pub struct Item {
    pub name: String,
    pub node: ItemKind,
}

impl Item {
    pub fn structure<S: Into<String>>(name: S, fields: Vec<Field>) -> Item {
        Item {
            name: name.into(),
            node: ItemKind::Struct(Struct::new(fields)),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename = "function-signature")]
pub struct FunctionSignature {
    pub output: Box<Type>,
    pub inputs: Vec<Type>,
}

impl FunctionSignature {
    pub fn new(output: Type, inputs: Vec<Type>) -> FunctionSignature {
        FunctionSignature {
            output: Box::new(output),
            inputs,
        }
    }

    pub fn for_each_path<F: FnMut(Path)>(&self, callback: &mut F) {
        self.output.for_each_path(callback);
        for arg in &self.inputs {
            arg.for_each_path(callback);
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename = "function")]
pub struct Function {
    pub name: String,
    #[serde(flatten)]
    pub signature: FunctionSignature,
}

impl Function {
    pub fn new<S: Into<String>>(name: S, signature: FunctionSignature) -> Function {
        Function {
            name: name.into(),
            signature,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename = "crate")]
pub struct Crate {
    #[serde(rename = "crate-name")]
    pub crate_name: String,
    pub items: Vec<Item>,
    pub functions: Vec<Function>,
}

impl Crate {
    pub fn new<S: Into<String>>(crate_name: S, items: Vec<Item>, functions: Vec<Function>) -> Crate {
        Crate {
            crate_name: crate_name.into(),
            items,
            functions,
        }
    }

    /// Find the path of an item by name
    pub fn lookup(&self, name: &str) -> Option<Path> {
        self.items
            .iter()
            .position(|item| item.name == name)
            .map(Path::new)
    }

    pub fn item(&self, path: Path) -> Result<&Item, Error> {
        self.items
            .get(path.index)
            .ok_or(Error::UnknownPath(path.index))
    }

    /// Apply a closure on all paths in all items and functions
    pub fn for_each_path<F: FnMut(Path)>(&self, callback: &mut F) {
        for item in &self.items {
            item.node.for_each_path(callback);
        }
        for function in &self.functions {
            function.signature.for_each_path(callback);
        }
    }

    /// Check that the crate describes declarations a C compiler accepts.
    pub fn validate(&self) -> Result<(), Error> {
        let mut names = HashSet::new();
        for item in &self.items {
            if !names.insert(item.name.as_str()) {
                return Err(Error::DuplicateItem(item.name.clone()));
            }

            match &item.node {
                ItemKind::Struct(structure) => {
                    if structure.fields.is_empty() {
                        return Err(Error::EmptyStruct(item.name.clone()));
                    }
                    if let Some(field) = structure.fields.iter().find(|x| x.ty.is_void()) {
                        return Err(Error::VoidField {
                            item: item.name.clone(),
                            field: field.name.clone(),
                        });
                    }
                }
            }
        }

        for function in &self.functions {
            if function.signature.inputs.iter().any(Type::is_void) {
                return Err(Error::VoidInput(function.name.clone()));
            }
        }

        let mut dangling = None;
        self.for_each_path(&mut |path| {
            if path.index >= self.items.len() && dangling.is_none() {
                dangling = Some(path.index);
            }
        });
        if let Some(index) = dangling {
            return Err(Error::UnknownPath(index));
        }

        // Any target works here, only the recursion check matters
        for i in 0..self.items.len() {
            Target::X86_64SysV.layout_of(self, Path::new(i))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Crate {
        Crate::new(
            "pair",
            vec![Item::structure(
                "pair",
                vec![Field::new("one", Type::Long), Field::new("two", Type::Long)],
            )],
            vec![Function::new(
                "returnPair",
                FunctionSignature::new(Type::Path(Path::new(0)), Vec::new()),
            )],
        )
    }

    #[test]
    fn valid_crate() {
        assert_eq!(pair().validate(), Ok(()));
        assert_eq!(pair().lookup("pair"), Some(Path::new(0)));
        assert_eq!(pair().lookup("missing"), None);
    }

    #[test]
    fn duplicate_items() {
        let mut lib = pair();
        let copy = lib.items[0].clone();
        lib.items.push(copy);
        assert_eq!(lib.validate(), Err(Error::DuplicateItem("pair".into())));
    }

    #[test]
    fn empty_struct() {
        let mut lib = pair();
        lib.items.push(Item::structure("unit", Vec::new()));
        assert_eq!(lib.validate(), Err(Error::EmptyStruct("unit".into())));
    }

    #[test]
    fn void_field() {
        let mut lib = pair();
        lib.items.push(Item::structure("bad", vec![Field::new("x", Type::Void)]));
        assert_eq!(
            lib.validate(),
            Err(Error::VoidField {
                item: "bad".into(),
                field: "x".into(),
            })
        );
    }

    #[test]
    fn void_input() {
        let mut lib = pair();
        lib.functions[0].signature.inputs.push(Type::Void);
        assert_eq!(lib.validate(), Err(Error::VoidInput("returnPair".into())));
    }

    #[test]
    fn dangling_path() {
        let mut lib = pair();
        lib.functions[0].signature.output = Box::new(Type::Path(Path::new(7)));
        assert_eq!(lib.validate(), Err(Error::UnknownPath(7)));
    }

    #[test]
    fn self_containing_struct() {
        let mut lib = pair();
        lib.items.push(Item::structure(
            "ouroboros",
            vec![Field::new("tail", Type::Path(Path::new(1)))],
        ));
        assert_eq!(
            lib.validate(),
            Err(Error::InfiniteTypeSize("ouroboros".into()))
        );
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(&pair()).unwrap();
        assert_eq!(json["crate-name"], "pair");
        assert_eq!(json["items"][0]["node"]["kind"], "Struct");
        assert_eq!(json["items"][0]["node"]["fields"][1]["type"]["kind"], "long");
        assert_eq!(json["functions"][0]["name"], "returnPair");
        assert_eq!(json["functions"][0]["output"]["kind"], "path");
        assert_eq!(json["functions"][0]["output"]["index"], 0);

        let back: Crate = serde_json::from_value(json).unwrap();
        assert_eq!(back, pair());
    }
}
