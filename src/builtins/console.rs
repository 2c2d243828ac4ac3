//! Console I/O operations: print, input
//!
//! - `print`: writes the stringified argument followed by a newline
//! - `input`: writes a prompt, reads one line from stdin; requires the
//!   `--allow-input` permission
//!
//! Both report host I/O failures as runtime errors at the call site.

use crate::env::Environment;
use crate::error::{ErrorKind, RuntimeError};
use crate::eval::{Arguments, Interpreter};
use crate::token::Token;
use crate::value::Value;
use std::rc::Rc;

/// Writes the stringified argument and a newline to the interpreter's output
/// sink. Returns null.
pub fn builtin_print(
    interp: &mut Interpreter,
    token: &Token,
    args: &Arguments,
) -> Result<Value, RuntimeError> {
    let text = args.positional[0].to_display_string();
    writeln!(interp.out_mut(), "{}", text)
        .map_err(|e| RuntimeError::new(token, ErrorKind::Io(e.to_string())))?;
    Ok(Value::Null)
}

/// Writes the prompt, reads one line from standard input, and returns it as a
/// String (empty on EOF). Gated on the `--allow-input` permission.
pub fn builtin_input(
    interp: &mut Interpreter,
    token: &Token,
    args: &Arguments,
) -> Result<Value, RuntimeError> {
    if !interp.permissions().input {
        return Err(RuntimeError::new(
            token,
            ErrorKind::PermissionDenied {
                builtin: "input".to_string(),
                flag: "--allow-input".to_string(),
            },
        ));
    }

    let prompt = args.positional[0].to_display_string();
    write!(interp.out_mut(), "{}", prompt)
        .and_then(|_| interp.out_mut().flush())
        .map_err(|e| RuntimeError::new(token, ErrorKind::Io(e.to_string())))?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| RuntimeError::new(token, ErrorKind::Io(e.to_string())))?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::Str(line))
}

/// Register all console I/O builtins in the environment.
pub fn register(globals: &Rc<Environment>) {
    super::define(globals, "print", 1, 1, Rc::new(builtin_print));
    super::define(globals, "input", 1, 1, Rc::new(builtin_input));
}
