// ABOUTME: Property protocol: named members on arrays, dictionaries, and enums

use crate::error::{ErrorKind, RuntimeError};
use crate::eval::{Arguments, Interpreter};
use crate::token::Token;
use crate::value::{new_array, ArrayRef, BuiltIn, DictRef, Value};
use std::rc::Rc;

/// Dictionary member names claimed by the protocol. User keys with these
/// names are hidden on access and rejected on write.
pub const DICT_RESERVED: &[&str] = &["size", "put", "get", "getKeys"];

/// Resolves `object.name` for the built-in container kinds. Container
/// methods come back as bound callables closing over the host container
/// cell, so mutations land in the original value.
pub fn member_access(object: &Value, name: &Token) -> Result<Value, RuntimeError> {
    match object {
        Value::Array(items) => array_member(items, name),
        Value::Dict(entries) => dict_member(entries, name),
        Value::Enum(decl) => match name.lexeme.as_str() {
            "length" => Ok(Value::Int(decl.members.len() as i64)),
            member => match decl.members.get(member) {
                Some(ordinal) => Ok(Value::Int(*ordinal)),
                None => Err(unknown_property(object, name)),
            },
        },
        _ => Err(unknown_property(object, name)),
    }
}

/// Resolves `object.name = value`. Only dictionaries have settable members.
pub fn member_set(object: &Value, name: &Token, value: Value) -> Result<(), RuntimeError> {
    match object {
        Value::Dict(entries) => {
            if DICT_RESERVED.contains(&name.lexeme.as_str()) {
                return Err(RuntimeError::new(
                    name,
                    ErrorKind::ReservedKey(name.lexeme.clone()),
                ));
            }
            entries.borrow_mut().insert(name.lexeme.clone(), value);
            Ok(())
        }
        other => Err(RuntimeError::new(
            name,
            ErrorKind::NotSettable {
                type_name: other.type_name(),
                property: name.lexeme.clone(),
            },
        )),
    }
}

fn array_member(items: &ArrayRef, name: &Token) -> Result<Value, RuntimeError> {
    match name.lexeme.as_str() {
        "length" => Ok(Value::Int(items.borrow().len() as i64)),
        "push" => {
            let items = items.clone();
            Ok(bound("push", 1, 1, move |_, _, args| {
                items.borrow_mut().push(args.positional[0].clone());
                Ok(Value::Null)
            }))
        }
        "pop" => {
            let items = items.clone();
            Ok(bound("pop", 0, 0, move |_, token, _| {
                items
                    .borrow_mut()
                    .pop()
                    .ok_or_else(|| RuntimeError::new(token, ErrorKind::PopFromEmpty))
            }))
        }
        "contains" => {
            let items = items.clone();
            Ok(bound("contains", 1, 1, move |_, _, args| {
                let needle = &args.positional[0];
                let found = items.borrow().iter().any(|item| item.equals(needle));
                Ok(Value::Bool(found))
            }))
        }
        "forEach" => {
            let items = items.clone();
            Ok(bound("forEach", 1, 1, move |interp, token, args| {
                let callback = args.positional[0].clone();
                // Snapshot up front so the callback may mutate the array.
                let snapshot: Vec<Value> = items.borrow().clone();
                for item in snapshot {
                    interp.call_value(&callback, token, Arguments::from_positional(vec![item]))?;
                }
                Ok(Value::Null)
            }))
        }
        _ => Err(RuntimeError::new(
            name,
            ErrorKind::UnknownProperty {
                type_name: "Array".to_string(),
                property: name.lexeme.clone(),
            },
        )),
    }
}

fn dict_member(entries: &DictRef, name: &Token) -> Result<Value, RuntimeError> {
    match name.lexeme.as_str() {
        "size" => Ok(Value::Int(entries.borrow().len() as i64)),
        "put" => {
            let entries = entries.clone();
            Ok(bound("put", 2, 2, move |_, token, args| {
                let key = string_arg(token, &args.positional[0], "put")?;
                entries
                    .borrow_mut()
                    .insert(key, args.positional[1].clone());
                Ok(Value::Null)
            }))
        }
        "get" => {
            let entries = entries.clone();
            Ok(bound("get", 1, 1, move |_, token, args| {
                let key = string_arg(token, &args.positional[0], "get")?;
                Ok(entries.borrow().get(&key).cloned().unwrap_or(Value::Null))
            }))
        }
        "getKeys" => {
            let entries = entries.clone();
            Ok(bound("getKeys", 0, 0, move |_, _, _| {
                let keys = entries
                    .borrow()
                    .keys()
                    .map(|k| Value::Str(k.clone()))
                    .collect();
                Ok(new_array(keys))
            }))
        }
        key => match entries.borrow().get(key) {
            Some(value) => Ok(value.clone()),
            None => Err(RuntimeError::new(
                name,
                ErrorKind::UnknownProperty {
                    type_name: "Dict".to_string(),
                    property: name.lexeme.clone(),
                },
            )),
        },
    }
}

fn unknown_property(object: &Value, name: &Token) -> RuntimeError {
    RuntimeError::new(
        name,
        ErrorKind::UnknownProperty {
            type_name: object.type_name(),
            property: name.lexeme.clone(),
        },
    )
}

fn string_arg(token: &Token, value: &Value, method: &str) -> Result<String, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(RuntimeError::new(
            token,
            ErrorKind::BadOperand {
                operator: method.to_string(),
                operand: other.type_name(),
            },
        )),
    }
}

fn bound<F>(name: &'static str, min_arity: usize, max_arity: usize, body: F) -> Value
where
    F: Fn(&mut Interpreter, &Token, &Arguments) -> Result<Value, RuntimeError> + 'static,
{
    Value::BuiltIn(Rc::new(BuiltIn {
        name,
        min_arity,
        max_arity,
        body: Rc::new(body),
    }))
}
