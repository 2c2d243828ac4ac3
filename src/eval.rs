// ABOUTME: Tree-walking evaluator: statements, operators, calls, and control-flow signals

use crate::ast::{Argument, Expr, ExprId, Stmt};
use crate::builtins::register_builtins;
use crate::config::Permissions;
use crate::env::{DeclKind, Environment};
use crate::error::{ErrorKind, RuntimeError};
use crate::properties;
use crate::token::{LiteralValue, Token, TokenKind};
use crate::value::{new_array, new_dict, ArrayRef, UserFunction, Value};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

/// How a statement completed. `return`, `break`, and `continue` travel
/// through this channel instead of unwinding: every enclosing node inspects
/// the signal and either absorbs it (loops absorb Break/Continue, call frames
/// absorb Return) or propagates it outward.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Evaluated call-site arguments, keyed by position and by name. Named
/// entries keep their token so binding errors point at the argument.
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: Vec<(Token, Value)>,
}

impl Arguments {
    pub fn from_positional(positional: Vec<Value>) -> Self {
        Arguments {
            positional,
            named: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.positional.len() + self.named.len()
    }
}

/// Integer pair or promoted float pair, for the arithmetic operators.
enum NumPair {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn numeric_pair(left: &Value, right: &Value) -> Option<NumPair> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(NumPair::Ints(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Some(NumPair::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(NumPair::Floats(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(NumPair::Floats(*a, *b)),
        _ => None,
    }
}

pub struct Interpreter {
    pub globals: Rc<Environment>,
    env: Rc<Environment>,
    locals: HashMap<ExprId, usize>,
    permissions: Permissions,
    out: Box<dyn Write>,
}

impl Interpreter {
    pub fn new(permissions: Permissions) -> Self {
        Interpreter::with_output(permissions, Box::new(std::io::stdout()))
    }

    pub fn with_output(permissions: Permissions, out: Box<dyn Write>) -> Self {
        let globals = Environment::new();
        register_builtins(&globals);
        Interpreter {
            env: globals.clone(),
            globals,
            locals: HashMap::new(),
            permissions,
            out,
        }
    }

    /// Install resolver output. A REPL calls this once per line; distances
    /// are keyed by expression id, so maps from different lines never clash.
    pub fn add_resolutions(&mut self, locals: HashMap<ExprId, usize>) {
        self.locals.extend(locals);
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn out_mut(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Runs a program to completion. Loop and return signals cannot escape to
    /// the top level once the resolver has accepted the program.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    /// REPL variant: returns the value of a trailing expression statement so
    /// the shell can echo it.
    pub fn interpret_repl(&mut self, statements: &[Stmt]) -> Result<Option<Value>, RuntimeError> {
        let mut last = None;
        for statement in statements {
            match statement {
                Stmt::Expression { expr } => last = Some(self.evaluate(expr)?),
                other => {
                    self.execute(other)?;
                    last = None;
                }
            }
        }
        Ok(last)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Block { statements } => {
                let frame = Environment::with_parent(self.env.clone());
                self.execute_block(statements, frame)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => Some(self.evaluate(init)?),
                    None => None,
                };
                self.env
                    .define(&name.lexeme, value, DeclKind::Variable)
                    .map_err(|kind| RuntimeError::new(name, kind))?;
                Ok(Flow::Normal)
            }
            Stmt::Const { name, initializer } => {
                let value = self.evaluate(initializer)?;
                self.env
                    .define(&name.lexeme, Some(value), DeclKind::Constant)
                    .map_err(|kind| RuntimeError::new(name, kind))?;
                Ok(Flow::Normal)
            }
            Stmt::Function { name, params, body } => {
                let function = UserFunction {
                    name: Some(name.lexeme.clone()),
                    params: params.clone(),
                    body: body.clone(),
                    closure: self.env.clone(),
                };
                self.env
                    .define(
                        &name.lexeme,
                        Some(Value::Function(Rc::new(function))),
                        DeclKind::Function,
                    )
                    .map_err(|kind| RuntimeError::new(name, kind))?;
                Ok(Flow::Normal)
            }
            Stmt::Enum { name, members } => {
                let mut ordinals = IndexMap::new();
                for (ordinal, member) in members.iter().enumerate() {
                    if ordinals
                        .insert(member.lexeme.clone(), ordinal as i64)
                        .is_some()
                    {
                        return Err(RuntimeError::new(
                            member,
                            ErrorKind::DuplicateMember(member.lexeme.clone()),
                        ));
                    }
                }
                let value = Value::Enum(Rc::new(crate::value::EnumValue {
                    name: name.lexeme.clone(),
                    members: ordinals,
                }));
                self.env
                    .define(&name.lexeme, Some(value), DeclKind::Enum)
                    .map_err(|kind| RuntimeError::new(name, kind))?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(branch) = else_branch {
                    self.execute(branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While {
                condition,
                body,
                post,
            } => {
                loop {
                    if !self.evaluate(condition)?.is_truthy() {
                        break;
                    }
                    match self.execute(body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        // The step of a lowered `for` runs after normal
                        // completion AND after `continue`.
                        Flow::Normal | Flow::Continue => {
                            if let Some(post) = post {
                                self.execute(post)?;
                            }
                        }
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Continue { .. } => Ok(Flow::Continue),
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    /// Runs `statements` inside `frame`, restoring the previous environment
    /// on every exit path.
    fn execute_block(&mut self, statements: &[Stmt], frame: Rc<Environment>) -> Result<Flow, RuntimeError> {
        let previous = std::mem::replace(&mut self.env, frame);
        let result = self.run_block(statements);
        self.env = previous;
        result
    }

    fn run_block(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        for statement in statements {
            match self.execute(statement)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value } => Ok(literal_value(value)),
            Expr::Grouping { inner } => self.evaluate(inner),
            Expr::Variable { name, id } => self.lookup_variable(name, *id),
            Expr::Assign { name, value, id } => {
                let value = self.evaluate(value)?;
                self.store_variable(name, *id, value.clone())?;
                Ok(value)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply_binary(operator, left, right)
            }
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let is_or = operator.kind == TokenKind::PipePipe;
                if is_or == left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate(right)
            }
            Expr::Unary { operator, operand } => {
                let operand = self.evaluate(operand)?;
                apply_unary(operator, operand)
            }
            Expr::DeIncrement {
                operator,
                target,
                prefix,
            } => self.de_increment(operator, target, *prefix),
            Expr::Call { callee, paren, args } => {
                let callee = self.evaluate(callee)?;
                let mut positional = Vec::new();
                let mut named = Vec::new();
                for Argument { name, value } in args {
                    let value = self.evaluate(value)?;
                    match name {
                        Some(token) => named.push((token.clone(), value)),
                        None => positional.push(value),
                    }
                }
                self.call_value(&callee, paren, Arguments { positional, named })
            }
            Expr::MemberAccess { object, name } => {
                let object = self.evaluate(object)?;
                properties::member_access(&object, name)
            }
            Expr::MemberSet {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;
                let value = self.evaluate(value)?;
                properties::member_set(&object, name, value.clone())?;
                Ok(value)
            }
            Expr::Index {
                bracket,
                object,
                index,
            } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                let (items, slot) = array_slot(bracket, &object, &index)?;
                let element = items.borrow()[slot].clone();
                Ok(element)
            }
            Expr::IndexSet {
                bracket,
                object,
                index,
                value,
            } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                let value = self.evaluate(value)?;
                let (items, slot) = array_slot(bracket, &object, &index)?;
                items.borrow_mut()[slot] = value.clone();
                Ok(value)
            }
            Expr::Array { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate(element)?);
                }
                Ok(new_array(items))
            }
            Expr::Dict { pairs, .. } => {
                let mut entries = IndexMap::with_capacity(pairs.len());
                for (key_token, value_expr) in pairs {
                    let key = dict_key(key_token);
                    if properties::DICT_RESERVED.contains(&key.as_str()) {
                        return Err(RuntimeError::new(key_token, ErrorKind::ReservedKey(key)));
                    }
                    let value = self.evaluate(value_expr)?;
                    if entries.insert(key.clone(), value).is_some() {
                        return Err(RuntimeError::new(key_token, ErrorKind::DuplicateKey(key)));
                    }
                }
                Ok(new_dict(entries))
            }
            Expr::Lambda { params, body, .. } => {
                let function = UserFunction {
                    name: None,
                    params: params.clone(),
                    body: body.clone(),
                    closure: self.env.clone(),
                };
                Ok(Value::Lambda(Rc::new(function)))
            }
        }
    }

    fn lookup_variable(&self, name: &Token, id: ExprId) -> Result<Value, RuntimeError> {
        let result = match self.locals.get(&id) {
            Some(distance) => self.env.get_at(*distance, &name.lexeme),
            None => self.globals.get(&name.lexeme),
        };
        result.map_err(|kind| RuntimeError::new(name, kind))
    }

    fn store_variable(&mut self, name: &Token, id: ExprId, value: Value) -> Result<(), RuntimeError> {
        let result = match self.locals.get(&id) {
            Some(distance) => self.env.assign_at(*distance, &name.lexeme, value),
            None => self.globals.assign(&name.lexeme, value),
        };
        result.map_err(|kind| RuntimeError::new(name, kind))
    }

    fn de_increment(
        &mut self,
        operator: &Token,
        target: &Expr,
        prefix: bool,
    ) -> Result<Value, RuntimeError> {
        if !matches!(
            target,
            Expr::Variable { .. } | Expr::Index { .. } | Expr::MemberAccess { .. }
        ) {
            return Err(RuntimeError::new(
                operator,
                ErrorKind::InvalidTarget(operator.lexeme.clone()),
            ));
        }

        let current = self.evaluate(target)?;
        let Value::Int(old) = current else {
            return Err(RuntimeError::new(
                operator,
                ErrorKind::BadOperand {
                    operator: operator.lexeme.clone(),
                    operand: current.type_name(),
                },
            ));
        };
        let updated = if operator.kind == TokenKind::PlusPlus {
            old.wrapping_add(1)
        } else {
            old.wrapping_sub(1)
        };
        self.store_target(target, Value::Int(updated))?;
        Ok(Value::Int(if prefix { updated } else { old }))
    }

    /// Writes back to an lvalue expression already validated as a variable,
    /// index, or member access.
    fn store_target(&mut self, target: &Expr, value: Value) -> Result<(), RuntimeError> {
        match target {
            Expr::Variable { name, id } => self.store_variable(name, *id, value),
            Expr::Index {
                bracket,
                object,
                index,
            } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                let (items, slot) = array_slot(bracket, &object, &index)?;
                items.borrow_mut()[slot] = value;
                Ok(())
            }
            Expr::MemberAccess { object, name } => {
                let object = self.evaluate(object)?;
                properties::member_set(&object, name, value)
            }
            _ => unreachable!("validated by de_increment"),
        }
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    /// Invokes any callable value. Also the entry point for host callables
    /// that re-enter the evaluator, like `forEach`.
    pub fn call_value(
        &mut self,
        callee: &Value,
        token: &Token,
        args: Arguments,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(func) | Value::Lambda(func) => self.call_user(func.clone(), token, args),
            Value::BuiltIn(builtin) => {
                if let Some((name_token, _)) = args.named.first() {
                    return Err(RuntimeError::new(
                        name_token,
                        ErrorKind::UnknownParameter {
                            callee: builtin.name.to_string(),
                            name: name_token.lexeme.clone(),
                        },
                    ));
                }
                if args.count() < builtin.min_arity || args.count() > builtin.max_arity {
                    return Err(RuntimeError::new(
                        token,
                        ErrorKind::arity(
                            builtin.name,
                            builtin.min_arity,
                            builtin.max_arity,
                            args.count(),
                        ),
                    ));
                }
                let body = builtin.body.clone();
                body(self, token, &args)
            }
            other => Err(RuntimeError::new(
                token,
                ErrorKind::NotCallable(other.type_name()),
            )),
        }
    }

    fn call_user(
        &mut self,
        func: Rc<UserFunction>,
        token: &Token,
        args: Arguments,
    ) -> Result<Value, RuntimeError> {
        let count = args.count();
        let (min, max) = (func.min_arity(), func.max_arity());
        if count < min || count > max {
            return Err(RuntimeError::new(
                token,
                ErrorKind::arity(func.describe(), min, max, count),
            ));
        }

        let frame = Environment::with_parent(func.closure.clone());
        let previous = std::mem::replace(&mut self.env, frame);
        let result = self.bind_and_execute(&func, token, args);
        self.env = previous;
        result
    }

    /// Argument binding per the invocation state machine: every parameter is
    /// pre-bound to its default (null for required ones), evaluated in the
    /// fresh frame, then supplied arguments overwrite by index and by name.
    fn bind_and_execute(
        &mut self,
        func: &UserFunction,
        token: &Token,
        args: Arguments,
    ) -> Result<Value, RuntimeError> {
        let Arguments { positional, named } = args;

        for param in func.params.iter() {
            let default = match &param.default {
                Some(expr) => self.evaluate(expr)?,
                None => Value::Null,
            };
            self.env
                .define(&param.name.lexeme, Some(default), DeclKind::Variable)
                .map_err(|kind| RuntimeError::new(&param.name, kind))?;
        }

        let positional_count = positional.len();
        for (index, value) in positional.into_iter().enumerate() {
            let name = &func.params[index].name.lexeme;
            self.env
                .assign_at(0, name, value)
                .map_err(|kind| RuntimeError::new(token, kind))?;
        }

        let mut bound_names: Vec<String> = Vec::new();
        for (name_token, value) in named {
            let Some(index) = func
                .params
                .iter()
                .position(|p| p.name.lexeme == name_token.lexeme)
            else {
                return Err(RuntimeError::new(
                    &name_token,
                    ErrorKind::UnknownParameter {
                        callee: func.describe(),
                        name: name_token.lexeme.clone(),
                    },
                ));
            };
            if index < positional_count || bound_names.contains(&name_token.lexeme) {
                return Err(RuntimeError::new(
                    &name_token,
                    ErrorKind::DuplicateBinding {
                        callee: func.describe(),
                        name: name_token.lexeme.clone(),
                    },
                ));
            }
            self.env
                .assign_at(0, &name_token.lexeme, value)
                .map_err(|kind| RuntimeError::new(&name_token, kind))?;
            bound_names.push(name_token.lexeme.clone());
        }

        match self.run_block(&func.body)? {
            Flow::Return(value) => Ok(value),
            _ => Ok(Value::Null),
        }
    }
}

// ----------------------------------------------------------------------
// Operators
// ----------------------------------------------------------------------

fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Int(n) => Value::Int(*n),
        LiteralValue::Float(f) => Value::Float(*f),
        LiteralValue::Str(s) => Value::Str(s.clone()),
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Null => Value::Null,
    }
}

fn dict_key(token: &Token) -> String {
    match &token.literal {
        Some(LiteralValue::Str(s)) => s.clone(),
        _ => token.lexeme.clone(),
    }
}

fn bad_operands(operator: &Token, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::new(
        operator,
        ErrorKind::BadOperands {
            operator: operator.lexeme.clone(),
            left: left.type_name(),
            right: right.type_name(),
        },
    )
}

fn apply_binary(operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match operator.kind {
        TokenKind::Plus => {
            // String concatenation wins over numeric addition.
            if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                return Ok(Value::Str(format!(
                    "{}{}",
                    left.to_display_string(),
                    right.to_display_string()
                )));
            }
            match numeric_pair(&left, &right) {
                Some(NumPair::Ints(a, b)) => Ok(Value::Int(a.wrapping_add(b))),
                Some(NumPair::Floats(a, b)) => Ok(Value::Float(a + b)),
                None => Err(bad_operands(operator, &left, &right)),
            }
        }
        TokenKind::Minus => match numeric_pair(&left, &right) {
            Some(NumPair::Ints(a, b)) => Ok(Value::Int(a.wrapping_sub(b))),
            Some(NumPair::Floats(a, b)) => Ok(Value::Float(a - b)),
            None => Err(bad_operands(operator, &left, &right)),
        },
        TokenKind::Star => {
            // String repetition: String * Int or Int * String.
            match (&left, &right) {
                (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                    if *n < 0 {
                        return Err(RuntimeError::new(operator, ErrorKind::NegativeRepeat));
                    }
                    return Ok(Value::Str(s.repeat(*n as usize)));
                }
                _ => {}
            }
            match numeric_pair(&left, &right) {
                Some(NumPair::Ints(a, b)) => Ok(Value::Int(a.wrapping_mul(b))),
                Some(NumPair::Floats(a, b)) => Ok(Value::Float(a * b)),
                None => Err(bad_operands(operator, &left, &right)),
            }
        }
        TokenKind::Slash => match numeric_pair(&left, &right) {
            Some(NumPair::Ints(_, 0)) => {
                Err(RuntimeError::new(operator, ErrorKind::DivisionByZero))
            }
            Some(NumPair::Ints(a, b)) => Ok(Value::Float(a as f64 / b as f64)),
            Some(NumPair::Floats(a, b)) => {
                if b == 0.0 {
                    Err(RuntimeError::new(operator, ErrorKind::DivisionByZero))
                } else {
                    Ok(Value::Float(a / b))
                }
            }
            None => Err(bad_operands(operator, &left, &right)),
        },
        TokenKind::Percent => match numeric_pair(&left, &right) {
            Some(NumPair::Ints(_, 0)) => {
                Err(RuntimeError::new(operator, ErrorKind::DivisionByZero))
            }
            Some(NumPair::Ints(a, b)) => Ok(Value::Int(a.wrapping_rem(b))),
            Some(NumPair::Floats(a, b)) => {
                if b == 0.0 {
                    Err(RuntimeError::new(operator, ErrorKind::DivisionByZero))
                } else {
                    // Remainder coerces to Int even for float operands.
                    Ok(Value::Int((a % b) as i64))
                }
            }
            None => Err(bad_operands(operator, &left, &right)),
        },
        TokenKind::StarStar => match numeric_pair(&left, &right) {
            Some(NumPair::Ints(a, b)) => Ok(Value::Int((a as f64).powf(b as f64) as i64)),
            Some(NumPair::Floats(a, b)) => Ok(Value::Float(a.powf(b))),
            None => Err(bad_operands(operator, &left, &right)),
        },
        TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual => {
            let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
                return Err(bad_operands(operator, &left, &right));
            };
            let result = match operator.kind {
                TokenKind::Less => a < b,
                TokenKind::LessEqual => a <= b,
                TokenKind::Greater => a > b,
                _ => a >= b,
            };
            Ok(Value::Bool(result))
        }
        TokenKind::EqualEqual => Ok(Value::Bool(left.equals(&right))),
        TokenKind::BangEqual => Ok(Value::Bool(!left.equals(&right))),
        TokenKind::Range => match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => Ok(new_array(make_range(*a, *b))),
            _ => Err(bad_operands(operator, &left, &right)),
        },
        _ => Err(bad_operands(operator, &left, &right)),
    }
}

/// `a..b`, exclusive of `b`: ascending when `a < b`, descending when
/// `a > b`, and the single-element `[a]` when the endpoints are equal.
fn make_range(a: i64, b: i64) -> Vec<Value> {
    if a == b {
        vec![Value::Int(a)]
    } else if a < b {
        (a..b).map(Value::Int).collect()
    } else {
        (b + 1..=a).rev().map(Value::Int).collect()
    }
}

fn apply_unary(operator: &Token, operand: Value) -> Result<Value, RuntimeError> {
    match operator.kind {
        TokenKind::Bang => Ok(Value::Bool(!operand.is_truthy())),
        TokenKind::Minus => match operand {
            Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Bool(b) => Ok(Value::Int(-i64::from(b))),
            other => Err(RuntimeError::new(
                operator,
                ErrorKind::BadOperand {
                    operator: operator.lexeme.clone(),
                    operand: other.type_name(),
                },
            )),
        },
        _ => Err(RuntimeError::new(
            operator,
            ErrorKind::BadOperand {
                operator: operator.lexeme.clone(),
                operand: operand.type_name(),
            },
        )),
    }
}

/// Resolves an indexing pair to the backing array and a normalized slot.
/// Negative indices count from the end; anything outside `[-len, len - 1]`
/// is out of range.
fn array_slot(
    bracket: &Token,
    object: &Value,
    index: &Value,
) -> Result<(ArrayRef, usize), RuntimeError> {
    let Value::Array(items) = object else {
        return Err(RuntimeError::new(
            bracket,
            ErrorKind::NotIndexable(object.type_name()),
        ));
    };
    let Value::Int(raw) = index else {
        return Err(RuntimeError::new(
            bracket,
            ErrorKind::BadIndex(index.type_name()),
        ));
    };
    let length = items.borrow().len();
    let normalized = if *raw < 0 {
        raw + length as i64
    } else {
        *raw
    };
    if normalized < 0 || normalized >= length as i64 {
        return Err(RuntimeError::new(
            bracket,
            ErrorKind::IndexOutOfRange {
                index: *raw,
                length,
            },
        ));
    }
    Ok((items.clone(), normalized as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::resolver::resolve;
    use std::cell::RefCell;
    use std::io;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Full pipeline over `source`, returning captured `print` output.
    fn run(source: &str) -> Result<String, RuntimeError> {
        let (tokens, lex_errors) = Lexer::new(source).scan_tokens();
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
        let parsed = Parser::new(tokens).parse();
        assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
        let (locals, resolve_errors) = resolve(&parsed.statements);
        assert!(
            resolve_errors.is_empty(),
            "resolve errors: {:?}",
            resolve_errors
        );

        let buf = SharedBuf::default();
        let mut interp =
            Interpreter::with_output(Permissions::default(), Box::new(buf.clone()));
        interp.add_resolutions(locals);
        interp.interpret(&parsed.statements)?;
        let bytes = buf.0.borrow().clone();
        Ok(String::from_utf8(bytes).expect("output is UTF-8"))
    }

    fn output(source: &str) -> String {
        run(source).expect("program should succeed")
    }

    fn failure(source: &str) -> RuntimeError {
        run(source).expect_err("program should fail")
    }

    #[test]
    fn test_division_always_yields_float() {
        assert_eq!(output("print(7 / 2);"), "3.5\n");
        assert_eq!(output("print(typeOf(4 / 2));"), "Float\n");
    }

    #[test]
    fn test_modulo_always_yields_int() {
        assert_eq!(output("print(7 % 2);"), "1\n");
        assert_eq!(output("print(typeOf(5.5 % 2));"), "Int\n");
        assert_eq!(output("print(5.5 % 2);"), "1\n");
    }

    #[test]
    fn test_division_by_zero() {
        let err = failure("print(1 / 0);");
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        let err = failure("print(1 % 0);");
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(output("print(1 + 2);"), "3\n");
        assert_eq!(output("print(1 + 2.5);"), "3.5\n");
        assert_eq!(output("print(2 ** 10);"), "1024\n");
        assert_eq!(output("print(2.0 ** 0.5 > 1.41);"), "true\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(output("print(\"x = \" + 3);"), "x = 3\n");
        assert_eq!(output("print(3 + \"!\");"), "3!\n");
        assert_eq!(output("print(\"a\" + \"b\");"), "ab\n");
    }

    #[test]
    fn test_string_repetition() {
        assert_eq!(output("print(\"ab\" * 3);"), "ababab\n");
        assert_eq!(output("print(2 * \"ha\");"), "haha\n");
        let err = failure("print(\"x\" * -1);");
        assert_eq!(err.kind, ErrorKind::NegativeRepeat);
    }

    #[test]
    fn test_type_mismatch_names_types() {
        let err = failure("print(1 - \"x\");");
        assert_eq!(
            err.kind,
            ErrorKind::BadOperands {
                operator: "-".to_string(),
                left: "Int".to_string(),
                right: "String".to_string(),
            }
        );
    }

    #[test]
    fn test_short_circuit_skips_right_side() {
        let source = "var hits = 0;\n\
                      func bump() { hits = hits + 1; return true; }\n\
                      true || bump();\n\
                      false && bump();\n\
                      print(hits);";
        assert_eq!(output(source), "0\n");
    }

    #[test]
    fn test_logical_operators_yield_operands() {
        assert_eq!(output("print(null || 3);"), "3\n");
        assert_eq!(output("print(0 && 3);"), "0\n");
        assert_eq!(output("print(2 || 3);"), "2\n");
    }

    #[test]
    fn test_word_form_operators() {
        assert_eq!(output("print(true and false);"), "false\n");
        assert_eq!(output("print(false or true);"), "true\n");
        assert_eq!(output("print(not true);"), "false\n");
        assert_eq!(output("print(1 equals 1);"), "true\n");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(output("print(1..5);"), "[1, 2, 3, 4]\n");
        assert_eq!(output("print(5..1);"), "[5, 4, 3, 2]\n");
        assert_eq!(output("print(3..3);"), "[3]\n");
        let err = failure("print(1.5..3);");
        assert!(matches!(err.kind, ErrorKind::BadOperands { .. }));
    }

    #[test]
    fn test_negative_indexing() {
        assert_eq!(output("var a = [10, 20, 30]; print(a[-1]);"), "30\n");
        assert_eq!(output("var a = [10, 20, 30]; print(a[-3]);"), "10\n");
        let err = failure("var a = [1]; print(a[-2]);");
        assert_eq!(
            err.kind,
            ErrorKind::IndexOutOfRange {
                index: -2,
                length: 1
            }
        );
    }

    #[test]
    fn test_index_set() {
        assert_eq!(output("var a = [1, 2]; a[0] = 9; print(a);"), "[9, 2]\n");
        let err = failure("var d = 1; d[0] = 2;");
        assert_eq!(err.kind, ErrorKind::NotIndexable("Int".to_string()));
    }

    #[test]
    fn test_increment_decrement() {
        assert_eq!(output("var i = 1; print(i++); print(i);"), "1\n2\n");
        assert_eq!(output("var i = 1; print(++i); print(i);"), "2\n2\n");
        assert_eq!(output("var i = 1; print(i--); print(--i);"), "1\n-1\n");
        assert_eq!(output("var a = [5]; a[0]++; print(a[0]);"), "6\n");

        let err = failure("var f = 1.5; f++;");
        assert!(matches!(err.kind, ErrorKind::BadOperand { .. }));
        let err = failure("1++;");
        assert_eq!(err.kind, ErrorKind::InvalidTarget("++".to_string()));
    }

    #[test]
    fn test_unary_minus_coerces_bool() {
        assert_eq!(output("print(-true);"), "-1\n");
        assert_eq!(output("print(-2.5);"), "-2.5\n");
    }

    #[test]
    fn test_uninitialized_variable_read() {
        let err = failure("var x; print(x);");
        assert_eq!(err.kind, ErrorKind::Uninitialized("x".to_string()));
        assert_eq!(output("var x; x = 1; print(x);"), "1\n");
    }

    #[test]
    fn test_const_protection() {
        let err = failure("const k = 7; k = 8;");
        assert_eq!(err.kind, ErrorKind::ConstReassignment("k".to_string()));
    }

    #[test]
    fn test_builtin_protection() {
        let err = failure("print = 1;");
        assert_eq!(
            err.kind,
            ErrorKind::BuiltInReassignment("print".to_string())
        );
    }

    #[test]
    fn test_closure_captures_environment() {
        let source = "func make() {\n\
                      var a = \"one\";\n\
                      func get() { return a; }\n\
                      return get;\n\
                      }\n\
                      print(make()());";
        assert_eq!(output(source), "one\n");
    }

    #[test]
    fn test_closure_sees_later_mutation() {
        let source = "func make() {\n\
                      var n = 0;\n\
                      func get() { return n; }\n\
                      n = 5;\n\
                      return get;\n\
                      }\n\
                      print(make()());";
        assert_eq!(output(source), "5\n");
    }

    #[test]
    fn test_arity_window() {
        let source = "func f(a, b?, c = 3) { return a; }";
        assert_eq!(output(&format!("{source} print(f(1));")), "1\n");
        assert_eq!(output(&format!("{source} print(f(1, 2));")), "1\n");
        assert_eq!(output(&format!("{source} print(f(1, 2, 3));")), "1\n");

        let err = failure(&format!("{source} f();"));
        assert_eq!(
            err.kind,
            ErrorKind::Arity {
                callee: "f".to_string(),
                expected: "1 to 3".to_string(),
                got: 0
            }
        );
        let err = failure(&format!("{source} f(1, 2, 3, 4);"));
        assert!(matches!(err.kind, ErrorKind::Arity { .. }));
    }

    #[test]
    fn test_optional_parameter_defaults() {
        let source = "func f(a, b?, c = 10) { return [a, b, c]; } print(f(1));";
        assert_eq!(output(source), "[1, null, 10]\n");
    }

    #[test]
    fn test_named_arguments() {
        let source = "func f(a, b = 2) { return a * 10 + b; } print(f(1, b = 5));";
        assert_eq!(output(source), "15\n");
    }

    #[test]
    fn test_unknown_named_argument() {
        let err = failure("func f(a) { return a; } f(x = 1);");
        assert_eq!(
            err.kind,
            ErrorKind::UnknownParameter {
                callee: "f".to_string(),
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_double_binding_rejected() {
        let err = failure("func f(a, b?) { return a; } f(1, a = 2);");
        assert_eq!(
            err.kind,
            ErrorKind::DuplicateBinding {
                callee: "f".to_string(),
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_named_argument_to_builtin_rejected() {
        let err = failure("print(value = 1);");
        assert!(matches!(err.kind, ErrorKind::UnknownParameter { .. }));
    }

    #[test]
    fn test_lambda_invocation() {
        assert_eq!(output("var double = fn (x) { return x * 2; }; print(double(21));"), "42\n");
    }

    #[test]
    fn test_not_callable() {
        let err = failure("var x = 1; x();");
        assert_eq!(err.kind, ErrorKind::NotCallable("Int".to_string()));
    }

    #[test]
    fn test_while_with_break_and_continue() {
        let source = "var i = 0;\n\
                      while (true) { i = i + 1; if (i == 3) break; }\n\
                      print(i);";
        assert_eq!(output(source), "3\n");

        let source = "var i = 0; var evens = [];\n\
                      while (i < 6) {\n\
                      i = i + 1;\n\
                      if (i % 2 == 1) continue;\n\
                      evens.push(i);\n\
                      }\n\
                      print(evens);";
        assert_eq!(output(source), "[2, 4, 6]\n");
    }

    #[test]
    fn test_for_continue_still_steps() {
        let source = "for (var i = 0; i < 5; i = i + 1) {\n\
                      if (i == 3) continue;\n\
                      if (i == 4) break;\n\
                      print(i);\n\
                      }";
        assert_eq!(output(source), "0\n1\n2\n");
    }

    #[test]
    fn test_array_properties() {
        assert_eq!(output("var a = [1, 2, 3]; a.push(4); print(a.length); print(a[-1]);"), "4\n4\n");
        assert_eq!(output("var a = [1, 2]; print(a.pop()); print(a.length);"), "2\n1\n");
        assert_eq!(output("var a = [1, 2]; print(a.contains(2)); print(a.contains(9));"), "true\nfalse\n");
        assert_eq!(output("[10, 20].forEach(fn (x) { print(x); });"), "10\n20\n");
        let err = failure("[].pop();");
        assert_eq!(err.kind, ErrorKind::PopFromEmpty);
    }

    #[test]
    fn test_dict_properties() {
        let source = "var d = { a: 1 };\n\
                      d.put(\"b\", 2);\n\
                      print(d.size);\n\
                      print(d.get(\"a\"));\n\
                      print(d.get(\"missing\"));\n\
                      print(d.getKeys());";
        assert_eq!(output(source), "2\n1\nnull\n[\"a\", \"b\"]\n");
    }

    #[test]
    fn test_dict_member_access_and_set() {
        assert_eq!(output("var d = { a: 1 }; d.b = 2; print(d.a + d.b);"), "3\n");
        let err = failure("var d = {}; d.size = 1;");
        assert_eq!(err.kind, ErrorKind::ReservedKey("size".to_string()));
        let err = failure("var d = {}; print(d.missing);");
        assert!(matches!(err.kind, ErrorKind::UnknownProperty { .. }));
    }

    #[test]
    fn test_dict_literal_rejects_reserved_and_duplicate_keys() {
        let err = failure("var d = { size: 1 };");
        assert_eq!(err.kind, ErrorKind::ReservedKey("size".to_string()));
        let err = failure("var d = { a: 1, a: 2 };");
        assert_eq!(err.kind, ErrorKind::DuplicateKey("a".to_string()));
    }

    #[test]
    fn test_enum_declaration_and_members() {
        let source = "enum Color { Red, Green, Blue }\n\
                      print(Color.Red);\n\
                      print(Color.Blue);\n\
                      print(Color.length);\n\
                      print(typeOf(Color));";
        assert_eq!(output(source), "0\n2\n3\nColor\n");

        let err = failure("enum Bad { A, A }");
        assert_eq!(err.kind, ErrorKind::DuplicateMember("A".to_string()));
    }

    #[test]
    fn test_type_of() {
        let source = "print(typeOf(1)); print(typeOf(1.0)); print(typeOf(true));\n\
                      print(typeOf(\"s\")); print(typeOf(null)); print(typeOf([]));\n\
                      print(typeOf({})); print(typeOf(print));";
        assert_eq!(
            output(source),
            "Int\nFloat\nBool\nString\nNull\nArray\nDict\nFunction\n"
        );
    }

    #[test]
    fn test_evaluation_order_left_to_right() {
        let source = "func tap(n) { print(n); return n; }\n\
                      tap(1) + tap(2) * tap(3);";
        assert_eq!(output(source), "1\n2\n3\n");
    }

    #[test]
    fn test_block_scoping_restores_environment() {
        let source = "var x = 1; { var x = 2; print(x); } print(x);";
        assert_eq!(output(source), "2\n1\n");
    }

    #[test]
    fn test_return_unwinds_only_to_call_boundary() {
        let source = "func f() {\n\
                      while (true) { return 7; }\n\
                      }\n\
                      print(f());";
        assert_eq!(output(source), "7\n");
    }

    #[test]
    fn test_function_returns_null_without_return() {
        assert_eq!(output("func f() {} print(f());"), "null\n");
    }

    #[test]
    fn test_shared_initializer_multi_var() {
        assert_eq!(output("var a, b = 2; print(a + b);"), "4\n");
    }

    #[test]
    fn test_recursive_fib() {
        let source = "func fib(n) { if (n < 2) return n; return fib(n - 2) + fib(n - 1); }\n\
                      print(fib(10));";
        assert_eq!(output(source), "55\n");
    }

    #[test]
    fn test_compound_assignment() {
        assert_eq!(output("var x = 0; while x <= 2 { print(x); x += 1; }"), "0\n1\n2\n");
        assert_eq!(output("var x = 10; x -= 2; x *= 3; print(x);"), "24\n");
    }

    #[test]
    fn test_comparisons_coerce_bool() {
        assert_eq!(output("print(true > 0);"), "true\n");
        assert_eq!(output("print(false < 0.5);"), "true\n");
        let err = failure("print(\"a\" < 1);");
        assert!(matches!(err.kind, ErrorKind::BadOperands { .. }));
    }

    #[test]
    fn test_repl_echo_value() {
        let (tokens, _) = Lexer::new("1 + 2;").scan_tokens();
        let parsed = Parser::new(tokens).parse();
        let (locals, _) = resolve(&parsed.statements);
        let mut interp = Interpreter::with_output(
            Permissions::default(),
            Box::new(SharedBuf::default()),
        );
        interp.add_resolutions(locals);
        let value = interp.interpret_repl(&parsed.statements).unwrap();
        assert_eq!(value, Some(Value::Int(3)));
    }
}
