//! Type introspection: typeOf
//!
//! - `typeOf`: runtime type name of the argument ("Int", "Float", "Bool",
//!   "String", "Null", "Array", "Dict", "Function", or the enum's own name)

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::eval::{Arguments, Interpreter};
use crate::token::Token;
use crate::value::Value;
use std::rc::Rc;

/// Returns the type name of the argument as a String.
pub fn builtin_type_of(
    _interp: &mut Interpreter,
    _token: &Token,
    args: &Arguments,
) -> Result<Value, RuntimeError> {
    Ok(Value::Str(args.positional[0].type_name()))
}

/// Register the type introspection builtins in the environment.
pub fn register(globals: &Rc<Environment>) {
    super::define(globals, "typeOf", 1, 1, Rc::new(builtin_type_of));
}
