//! # Built-in Functions
//!
//! The fixed set of host-implemented callables bound into the global
//! environment at interpreter startup, one category per sub-module:
//!
//! - **[console]** (2): print, input - console I/O (input is permission-gated)
//! - **[time]** (1): clock - wall-clock milliseconds
//! - **[types]** (1): typeOf - runtime type name of a value
//!
//! Each category exposes a `register` function that binds its callables with
//! their arity windows. Built-in bindings are protected: no scope may
//! reassign a name registered here.

use crate::env::Environment;
use crate::value::{BuiltIn, BuiltInBody, Value};
use std::rc::Rc;

pub mod console;
pub mod time;
pub mod types;

/// Register all built-in functions in the global environment.
pub fn register_builtins(globals: &Rc<Environment>) {
    console::register(globals);
    time::register(globals);
    types::register(globals);
}

/// Shared binding helper: wraps a host function with its arity window and
/// installs it through the startup-only registration path.
pub(crate) fn define(
    globals: &Rc<Environment>,
    name: &'static str,
    min_arity: usize,
    max_arity: usize,
    body: BuiltInBody,
) {
    globals.define_builtin(
        name,
        Value::BuiltIn(Rc::new(BuiltIn {
            name,
            min_arity,
            max_arity,
            body,
        })),
    );
}
