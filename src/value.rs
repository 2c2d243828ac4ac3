// ABOUTME: Runtime value variants and their coercion, equality, and display rules

use crate::ast::{Parameter, Stmt};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::eval::{Arguments, Interpreter};
use crate::token::Token;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Arrays and dictionaries are shared interior-mutable cells: the property
/// protocol's `push`/`put`/`forEach` mutate the host container, not a copy.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type DictRef = Rc<RefCell<IndexMap<String, Value>>>;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
    Array(ArrayRef),
    Dict(DictRef),
    Function(Rc<UserFunction>),
    Lambda(Rc<UserFunction>),
    BuiltIn(Rc<BuiltIn>),
    Enum(Rc<EnumValue>),
}

/// A user-declared function or lambda: shared parameter list and body, plus
/// an owning handle on the definition-site environment.
#[derive(Debug)]
pub struct UserFunction {
    pub name: Option<String>,
    pub params: Rc<Vec<Parameter>>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<Environment>,
}

impl UserFunction {
    pub fn min_arity(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }

    pub fn max_arity(&self) -> usize {
        self.params.len()
    }

    /// Display name for diagnostics.
    pub fn describe(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => "<lambda>".to_string(),
        }
    }
}

/// An enum value: member names mapped to their 0-based declaration ordinals.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub members: IndexMap<String, i64>,
}

/// Host-callable signature: the evaluator reference, the caller's source
/// token for error reporting, and the evaluated argument map.
pub type BuiltInBody = Rc<dyn Fn(&mut Interpreter, &Token, &Arguments) -> Result<Value, RuntimeError>>;

/// A host-implemented callable bound into the global environment at startup,
/// or produced as a bound container method by the property protocol.
pub struct BuiltIn {
    pub name: &'static str,
    pub min_arity: usize,
    pub max_arity: usize,
    pub body: BuiltInBody,
}

impl fmt::Debug for BuiltIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltIn")
            .field("name", &self.name)
            .field("min_arity", &self.min_arity)
            .field("max_arity", &self.max_arity)
            .finish_non_exhaustive()
    }
}

impl Value {
    /// Runtime type name as surfaced by `typeOf` and used in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Int(_) => "Int".to_string(),
            Value::Float(_) => "Float".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::Str(_) => "String".to_string(),
            Value::Null => "Null".to_string(),
            Value::Array(_) => "Array".to_string(),
            Value::Dict(_) => "Dict".to_string(),
            Value::Function(_) | Value::Lambda(_) | Value::BuiltIn(_) => "Function".to_string(),
            Value::Enum(e) => e.name.clone(),
        }
    }

    /// Null, integer zero, and float zero are falsy; booleans are themselves;
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Language-level equality: structural equality plus the Bool-to-number
    /// coercion (`true` compares equal to `1` and `1.0`).
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(b), Value::Int(n)) | (Value::Int(n), Value::Bool(b)) => i64::from(*b) == *n,
            (Value::Bool(b), Value::Float(f)) | (Value::Float(f), Value::Bool(b)) => {
                i64::from(*b) as f64 == *f
            }
            _ => self == other,
        }
    }

    /// Numeric view used by the comparison operators: Ints, Floats, and
    /// Bools (as 0/1) qualify.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(i64::from(*b) as f64),
            _ => None,
        }
    }

    /// Stringification used by `print` and string concatenation: like
    /// `Display`, but top-level strings render without quotes.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Structural equality. Containers compare by contents (dictionaries also by
/// insertion order); callables compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.equals(vb))
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltIn(a), Value::BuiltIn(b)) => Rc::ptr_eq(a, b),
            (Value::Enum(a), Value::Enum(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Null => write!(f, "null"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Dict(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => write!(f, "<func {}>", func.describe()),
            Value::Lambda(_) => write!(f, "<lambda>"),
            Value::BuiltIn(b) => write!(f, "<built-in fn {}>", b.name),
            Value::Enum(e) => write!(f, "<enum {}>", e.name),
        }
    }
}

/// Convenience constructors for the shared container cells.
pub fn new_array(items: Vec<Value>) -> Value {
    Value::Array(Rc::new(RefCell::new(items)))
}

pub fn new_dict(entries: IndexMap<String, Value>) -> Value {
    Value::Dict(Rc::new(RefCell::new(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "Int");
        assert_eq!(Value::Float(1.0).type_name(), "Float");
        assert_eq!(Value::Bool(true).type_name(), "Bool");
        assert_eq!(Value::Str("s".into()).type_name(), "String");
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(new_array(vec![]).type_name(), "Array");
        assert_eq!(new_dict(IndexMap::new()).type_name(), "Dict");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::Str(String::new()).is_truthy());
        assert!(new_array(vec![]).is_truthy());
    }

    #[test]
    fn test_bool_number_coercion_in_equality() {
        assert!(Value::Bool(true).equals(&Value::Int(1)));
        assert!(Value::Int(0).equals(&Value::Bool(false)));
        assert!(Value::Bool(true).equals(&Value::Float(1.0)));
        assert!(!Value::Bool(true).equals(&Value::Int(2)));
    }

    #[test]
    fn test_int_float_variants_do_not_compare_equal() {
        assert!(!Value::Int(1).equals(&Value::Float(1.0)));
    }

    #[test]
    fn test_array_equality_by_contents() {
        let a = new_array(vec![Value::Int(1), Value::Int(2)]);
        let b = new_array(vec![Value::Int(1), Value::Int(2)]);
        let c = new_array(vec![Value::Int(2), Value::Int(1)]);
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
    }

    #[test]
    fn test_dict_equality_respects_insertion_order() {
        let mut first = IndexMap::new();
        first.insert("a".to_string(), Value::Int(1));
        first.insert("b".to_string(), Value::Int(2));

        let mut same = IndexMap::new();
        same.insert("a".to_string(), Value::Int(1));
        same.insert("b".to_string(), Value::Int(2));

        let mut reordered = IndexMap::new();
        reordered.insert("b".to_string(), Value::Int(2));
        reordered.insert("a".to_string(), Value::Int(1));

        assert!(new_dict(first.clone()).equals(&new_dict(same)));
        assert!(!new_dict(first).equals(&new_dict(reordered)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Str("hi".into()).to_string(), "\"hi\"");

        let arr = new_array(vec![Value::Int(1), Value::Str("x".into())]);
        assert_eq!(arr.to_string(), "[1, \"x\"]");

        let mut entries = IndexMap::new();
        entries.insert("k".to_string(), Value::Int(1));
        assert_eq!(new_dict(entries).to_string(), "{k: 1}");
    }

    #[test]
    fn test_display_string_is_bare_for_strings() {
        assert_eq!(Value::Str("hi".into()).to_display_string(), "hi");
        assert_eq!(Value::Int(3).to_display_string(), "3");
    }
}
