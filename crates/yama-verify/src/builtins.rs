//! Fullnames of the built-in primitive types the verifier needs to name
//! symbolically (object constants don't carry a qualified name of their
//! own, so the verifier maps them onto these).

use yama_ir::Fullname;

fn builtin(tag: &str) -> Fullname {
    Fullname::parse(&format!("yama:{tag}")).expect("builtin tag is always a valid ident")
}

pub fn none_type() -> Fullname {
    builtin("None")
}

pub fn int_type() -> Fullname {
    builtin("Int")
}

pub fn uint_type() -> Fullname {
    builtin("Uint")
}

pub fn float_type() -> Fullname {
    builtin("Float")
}

pub fn bool_type() -> Fullname {
    builtin("Bool")
}

pub fn char_type() -> Fullname {
    builtin("Char")
}
