//! Time operations: clock
//!
//! - `clock`: milliseconds since the Unix epoch, as an Int

use crate::env::Environment;
use crate::error::{ErrorKind, RuntimeError};
use crate::eval::{Arguments, Interpreter};
use crate::token::Token;
use crate::value::Value;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns milliseconds since the Unix epoch.
pub fn builtin_clock(
    _interp: &mut Interpreter,
    token: &Token,
    _args: &Arguments,
) -> Result<Value, RuntimeError> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| RuntimeError::new(token, ErrorKind::Io(e.to_string())))?;
    Ok(Value::Int(elapsed.as_millis() as i64))
}

/// Register the time builtins in the environment.
pub fn register(globals: &Rc<Environment>) {
    super::define(globals, "clock", 0, 0, Rc::new(builtin_clock));
}
