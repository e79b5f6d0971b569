//! Functions returning C aggregates of increasing size by value.
//!
//! The shared library built from this crate exports `returnTiny`,
//! `returnSmall`, `returnBig` and `returnHuge`. Each returns a fixed
//! literal, so an FFI layer calling them can check every field it reads
//! back. The types are laid out exactly as the equivalent C declarations
//! on the host: `char` for the single byte, `long` for the integers.

extern crate metadata_ffi as ffi;

mod describe;

use std::os::raw::{c_char, c_long};

pub use crate::describe::{compiled_layouts, describe};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tiny {
    pub b1: c_char,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Small {
    pub one: c_long,
    pub two: c_long,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Big {
    pub one: c_long,
    pub two: c_long,
    pub three: f64,
}

/// Too large to come back in registers on any common calling
/// convention, so the caller passes a hidden return buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Huge {
    pub one: c_long,
    pub two: c_long,
    pub three: f64,
    pub four: c_long,
    pub five: c_long,
    pub six: f64,
}

#[export_name = "returnTiny"]
pub extern "C" fn return_tiny() -> Tiny {
    Tiny { b1: b'z' as c_char }
}

#[export_name = "returnSmall"]
pub extern "C" fn return_small() -> Small {
    Small { one: 111, two: 222 }
}

#[export_name = "returnBig"]
#[allow(clippy::approx_constant)]
pub extern "C" fn return_big() -> Big {
    Big {
        one: 111,
        two: 222,
        three: 3.14159,
    }
}

#[export_name = "returnHuge"]
pub extern "C" fn return_huge() -> Huge {
    Huge {
        one: 111,
        two: 222,
        three: 3.5,
        four: 444,
        five: 555,
        six: 6.789,
    }
}
