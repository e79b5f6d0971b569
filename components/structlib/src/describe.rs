use std::mem;

use ffi::{Crate, Field, FieldLayout, Function, FunctionSignature, Item, Layout, Path, Type};

use crate::{Big, Huge, Small, Tiny};

/// Describe the exported types and functions of this library.
pub fn describe() -> Crate {
    let items = vec![
        Item::structure("tiny", vec![Field::new("b1", Type::Char)]),
        Item::structure(
            "small",
            vec![Field::new("one", Type::Long), Field::new("two", Type::Long)],
        ),
        Item::structure(
            "big",
            vec![
                Field::new("one", Type::Long),
                Field::new("two", Type::Long),
                Field::new("three", Type::F64),
            ],
        ),
        Item::structure(
            "huge",
            vec![
                Field::new("one", Type::Long),
                Field::new("two", Type::Long),
                Field::new("three", Type::F64),
                Field::new("four", Type::Long),
                Field::new("five", Type::Long),
                Field::new("six", Type::F64),
            ],
        ),
    ];

    let returning = |name: &str, index: usize| {
        Function::new(
            name,
            FunctionSignature::new(Type::Path(Path::new(index)), Vec::new()),
        )
    };
    let functions = vec![
        returning("returnTiny", 0),
        returning("returnSmall", 1),
        returning("returnBig", 2),
        returning("returnHuge", 3),
    ];

    Crate::new("structlib", items, functions)
}

macro_rules! compiled_layout {
    ($name:expr, $ty:ty, [$($field:ident: $field_ty:ty),*]) => {
        Layout {
            name: $name.to_owned(),
            size: mem::size_of::<$ty>(),
            align: mem::align_of::<$ty>(),
            fields: vec![$(FieldLayout {
                name: stringify!($field).to_owned(),
                offset: mem::offset_of!($ty, $field),
                size: mem::size_of::<$field_ty>(),
            }),*],
        }
    };
}

/// The layouts rustc gave the exported types on this target, in the
/// same order as the items of [`describe`].
pub fn compiled_layouts() -> Vec<Layout> {
    use std::os::raw::{c_char, c_long};

    vec![
        compiled_layout!("tiny", Tiny, [b1: c_char]),
        compiled_layout!("small", Small, [one: c_long, two: c_long]),
        compiled_layout!("big", Big, [one: c_long, two: c_long, three: f64]),
        compiled_layout!(
            "huge",
            Huge,
            [
                one: c_long,
                two: c_long,
                three: f64,
                four: c_long,
                five: c_long,
                six: f64
            ]
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_a_valid_crate() {
        let lib = describe();
        assert_eq!(lib.validate(), Ok(()));
        assert_eq!(lib.items.len(), 4);
        assert_eq!(lib.functions.len(), 4);
    }

    #[test]
    fn functions_return_their_struct() {
        let lib = describe();
        for (function, item) in lib.functions.iter().zip(&["tiny", "small", "big", "huge"]) {
            assert!(function.signature.inputs.is_empty());
            match *function.signature.output {
                Type::Path(path) => assert_eq!(lib.items[path.index].name, *item),
                ref other => panic!("{} returns {:?}", function.name, other),
            }
        }
    }

    #[test]
    fn compiled_layouts_follow_item_order() {
        let lib = describe();
        let names: Vec<_> = compiled_layouts().into_iter().map(|x| x.name).collect();
        let items: Vec<_> = lib.items.iter().map(|x| x.name.clone()).collect();
        assert_eq!(names, items);
    }
}
