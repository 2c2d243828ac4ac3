// ABOUTME: Environment chain: insertion-ordered scope frames with declaration kinds

use crate::error::ErrorKind;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// How a name was introduced. Constants, functions, and built-ins refuse
/// reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Variable,
    Constant,
    Function,
    BuiltIn,
    Enum,
}

/// A single cell. `value` stays `None` for `var x;` until the first
/// assignment; reading it before then is an error distinct from "undefined".
#[derive(Debug, Clone)]
struct Binding {
    value: Option<Value>,
    kind: DeclKind,
}

/// One frame of the lexical chain. Frames are shared (`Rc`) because closures
/// keep their definition-site frame alive, and mutated through `RefCell`
/// because sibling closures observe each other's writes.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<IndexMap<String, Binding>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(IndexMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment chained onto `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(IndexMap::new()),
            parent: Some(parent),
        })
    }

    /// Inserts into THIS frame. A duplicate in the same frame is an error.
    pub fn define(
        &self,
        name: &str,
        value: Option<Value>,
        kind: DeclKind,
    ) -> Result<(), ErrorKind> {
        let mut bindings = self.bindings.borrow_mut();
        if bindings.contains_key(name) {
            return Err(ErrorKind::AlreadyDeclared(name.to_string()));
        }
        bindings.insert(name.to_string(), Binding { value, kind });
        Ok(())
    }

    /// Startup-only registration path for host functions: skips the duplicate
    /// check and always tags the cell as a built-in.
    pub fn define_builtin(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(
            name.to_string(),
            Binding {
                value: Some(value),
                kind: DeclKind::BuiltIn,
            },
        );
    }

    /// Looks the name up in this frame and then outward through the chain.
    pub fn get(&self, name: &str) -> Result<Value, ErrorKind> {
        if let Some(binding) = self.bindings.borrow().get(name) {
            return binding
                .value
                .clone()
                .ok_or_else(|| ErrorKind::Uninitialized(name.to_string()));
        }
        match &self.parent {
            Some(parent) => parent.get(name),
            None => Err(ErrorKind::Undefined(name.to_string())),
        }
    }

    /// Ascends exactly `distance` frames, then reads directly there. Used for
    /// resolver-annotated local reads.
    pub fn get_at(&self, distance: usize, name: &str) -> Result<Value, ErrorKind> {
        if distance == 0 {
            return match self.bindings.borrow().get(name) {
                Some(binding) => binding
                    .value
                    .clone()
                    .ok_or_else(|| ErrorKind::Uninitialized(name.to_string())),
                None => Err(ErrorKind::Undefined(name.to_string())),
            };
        }
        match &self.parent {
            Some(parent) => parent.get_at(distance - 1, name),
            None => Err(ErrorKind::Undefined(name.to_string())),
        }
    }

    /// Walks outward until the name is found, refusing writes to protected
    /// declaration kinds.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), ErrorKind> {
        if self.try_assign_here(name, &value)? {
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(ErrorKind::Undefined(name.to_string())),
        }
    }

    /// Same refusal policy as [`assign`](Self::assign), but at a specific
    /// ancestor frame.
    pub fn assign_at(&self, distance: usize, name: &str, value: Value) -> Result<(), ErrorKind> {
        if distance == 0 {
            if self.try_assign_here(name, &value)? {
                return Ok(());
            }
            return Err(ErrorKind::Undefined(name.to_string()));
        }
        match &self.parent {
            Some(parent) => parent.assign_at(distance - 1, name, value),
            None => Err(ErrorKind::Undefined(name.to_string())),
        }
    }

    /// Recursive existence check over the whole chain.
    pub fn contains(&self, name: &str) -> bool {
        if self.bindings.borrow().contains_key(name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.contains(name),
            None => false,
        }
    }

    fn try_assign_here(&self, name: &str, value: &Value) -> Result<bool, ErrorKind> {
        let mut bindings = self.bindings.borrow_mut();
        let Some(binding) = bindings.get_mut(name) else {
            return Ok(false);
        };
        match binding.kind {
            DeclKind::Constant => Err(ErrorKind::ConstReassignment(name.to_string())),
            DeclKind::BuiltIn => Err(ErrorKind::BuiltInReassignment(name.to_string())),
            DeclKind::Function => Err(ErrorKind::FunctionReassignment(name.to_string())),
            DeclKind::Variable | DeclKind::Enum => {
                binding.value = Some(value.clone());
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        env.define("x", Some(int(42)), DeclKind::Variable).unwrap();
        assert_eq!(env.get("x"), Ok(int(42)));
    }

    #[test]
    fn test_undefined_name() {
        let env = Environment::new();
        assert_eq!(
            env.get("missing"),
            Err(ErrorKind::Undefined("missing".to_string()))
        );
    }

    #[test]
    fn test_uninitialized_read() {
        let env = Environment::new();
        env.define("x", None, DeclKind::Variable).unwrap();
        assert_eq!(env.get("x"), Err(ErrorKind::Uninitialized("x".to_string())));

        env.assign("x", int(1)).unwrap();
        assert_eq!(env.get("x"), Ok(int(1)));
    }

    #[test]
    fn test_duplicate_in_same_frame() {
        let env = Environment::new();
        env.define("x", Some(int(1)), DeclKind::Variable).unwrap();
        assert_eq!(
            env.define("x", Some(int(2)), DeclKind::Variable),
            Err(ErrorKind::AlreadyDeclared("x".to_string()))
        );
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new();
        parent.define("x", Some(int(1)), DeclKind::Variable).unwrap();

        let child = Environment::with_parent(parent.clone());
        child.define("x", Some(int(2)), DeclKind::Variable).unwrap();

        assert_eq!(child.get("x"), Ok(int(2)));
        assert_eq!(parent.get("x"), Ok(int(1)));
    }

    #[test]
    fn test_parent_lookup_and_assignment() {
        let parent = Environment::new();
        parent.define("x", Some(int(1)), DeclKind::Variable).unwrap();

        let child = Environment::with_parent(parent.clone());
        assert_eq!(child.get("x"), Ok(int(1)));

        child.assign("x", int(5)).unwrap();
        assert_eq!(parent.get("x"), Ok(int(5)));
    }

    #[test]
    fn test_get_at_distances() {
        let grandparent = Environment::new();
        grandparent
            .define("a", Some(int(1)), DeclKind::Variable)
            .unwrap();
        let parent = Environment::with_parent(grandparent);
        parent.define("a", Some(int(2)), DeclKind::Variable).unwrap();
        let child = Environment::with_parent(parent);

        assert_eq!(child.get_at(1, "a"), Ok(int(2)));
        assert_eq!(child.get_at(2, "a"), Ok(int(1)));
    }

    #[test]
    fn test_assign_at() {
        let parent = Environment::new();
        parent.define("a", Some(int(1)), DeclKind::Variable).unwrap();
        let child = Environment::with_parent(parent.clone());

        child.assign_at(1, "a", int(9)).unwrap();
        assert_eq!(parent.get("a"), Ok(int(9)));
    }

    #[test]
    fn test_constant_refuses_reassignment() {
        let env = Environment::new();
        env.define("k", Some(int(7)), DeclKind::Constant).unwrap();
        assert_eq!(
            env.assign("k", int(8)),
            Err(ErrorKind::ConstReassignment("k".to_string()))
        );
    }

    #[test]
    fn test_builtin_refuses_reassignment_at_any_depth() {
        let global = Environment::new();
        global.define_builtin("print", int(0));
        let inner = Environment::with_parent(global);

        assert_eq!(
            inner.assign("print", int(1)),
            Err(ErrorKind::BuiltInReassignment("print".to_string()))
        );
    }

    #[test]
    fn test_function_kind_refuses_reassignment() {
        let env = Environment::new();
        env.define("f", Some(int(0)), DeclKind::Function).unwrap();
        assert_eq!(
            env.assign("f", int(1)),
            Err(ErrorKind::FunctionReassignment("f".to_string()))
        );
    }

    #[test]
    fn test_contains_walks_chain() {
        let parent = Environment::new();
        parent.define("x", Some(int(1)), DeclKind::Variable).unwrap();
        let child = Environment::with_parent(parent);

        assert!(child.contains("x"));
        assert!(!child.contains("y"));
    }
}
