//! Runtime values and variable frames.
//!
//! Values are compared and hashed structurally, so a tuple of values can key
//! the call memo table. Reference cells are shared through `Rc<RefCell<_>>`;
//! [`Frame::snapshot`] is the only way to get a copy whose cells are
//! independent of the original.
//!
//! A cell may end up containing itself. Equality treats a pair of cells
//! already under comparison as equal, hashing only looks inside the
//! outermost cell on each path, and `Display` prints a revisited cell as
//! `&...`.

use crate::expr::Expr;
use num_bigint::BigInt;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

type CellMap = HashMap<*const RefCell<Value>, Rc<RefCell<Value>>>;
type CellPairs = HashSet<(*const RefCell<Value>, *const RefCell<Value>)>;
type CellSet = HashSet<*const RefCell<Value>>;

/// A value manipulated by contracts and generators
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(BigInt),
    Byte(u8),
    Array(Vec<Value>),
    /// Field names are unique; ordering is by name
    Record(BTreeMap<String, Value>),
    /// Owning cell, mutable through every alias
    Reference(Rc<RefCell<Value>>),
    Lambda(Box<Lambda>),
}

impl Value {
    pub fn int<T: Into<BigInt>>(n: T) -> Value {
        Value::Int(n.into())
    }

    pub fn record<I, S>(fields: I) -> Value
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn reference(value: Value) -> Value {
        Value::Reference(Rc::new(RefCell::new(value)))
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the value's shape, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Byte(_) => "byte",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Reference(_) => "reference",
            Value::Lambda(_) => "lambda",
        }
    }

    /// Copy with fresh reference cells; aliasing inside the value is preserved
    pub fn deep_copy(&self) -> Value {
        self.copy_with(&mut HashMap::new())
    }

    fn copy_with(&self, cells: &mut CellMap) -> Value {
        match self {
            Value::Reference(cell) => {
                let key = Rc::as_ptr(cell);
                if let Some(existing) = cells.get(&key) {
                    return Value::Reference(Rc::clone(existing));
                }
                let fresh = Rc::new(RefCell::new(Value::Null));
                cells.insert(key, Rc::clone(&fresh));
                let inner = cell.borrow().copy_with(cells);
                *fresh.borrow_mut() = inner;
                Value::Reference(fresh)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| v.copy_with(cells)).collect()),
            Value::Record(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.copy_with(cells)))
                    .collect(),
            ),
            Value::Lambda(lambda) => Value::Lambda(Box::new(Lambda {
                parameters: lambda.parameters.clone(),
                returns: lambda.returns.clone(),
                body: lambda.body.clone(),
                captured: lambda.captured.copy_with(cells),
            })),
            other => other.clone(),
        }
    }

    fn eq_with(&self, other: &Value, seen: &mut CellPairs) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_with(y, seen))
            }
            (Value::Record(a), Value::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.eq_with(vb, seen))
            }
            (Value::Reference(a), Value::Reference(b)) => {
                if Rc::ptr_eq(a, b) || !seen.insert((Rc::as_ptr(a), Rc::as_ptr(b))) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.eq_with(&b, seen)
            }
            (Value::Lambda(a), Value::Lambda(b)) => a.eq_with(b, seen),
            _ => false,
        }
    }

    /// Contents of nested cells are not hashed, so cyclic values terminate
    fn hash_with<H: Hasher>(&self, state: &mut H, inside_cell: bool) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(n) => {
                2u8.hash(state);
                n.hash(state);
            }
            Value::Byte(b) => {
                3u8.hash(state);
                b.hash(state);
            }
            Value::Array(items) => {
                4u8.hash(state);
                items.len().hash(state);
                for item in items {
                    item.hash_with(state, inside_cell);
                }
            }
            Value::Record(fields) => {
                5u8.hash(state);
                fields.len().hash(state);
                for (name, value) in fields {
                    name.hash(state);
                    value.hash_with(state, inside_cell);
                }
            }
            Value::Reference(cell) => {
                6u8.hash(state);
                if !inside_cell {
                    cell.borrow().hash_with(state, true);
                }
            }
            Value::Lambda(lambda) => {
                7u8.hash(state);
                lambda.parameters.hash(state);
                lambda.returns.hash(state);
            }
        }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter<'_>, open: &mut CellSet) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Byte(b) => write!(f, "{:08b}b", b),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_with(f, open)?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", name)?;
                    value.fmt_with(f, open)?;
                }
                write!(f, "}}")
            }
            Value::Reference(cell) => {
                let key = Rc::as_ptr(cell);
                if !open.insert(key) {
                    return write!(f, "&...");
                }
                write!(f, "&")?;
                let result = cell.borrow().fmt_with(f, open);
                open.remove(&key);
                result
            }
            Value::Lambda(lambda) => write!(
                f,
                "&({}) -> ({})",
                lambda.parameters.join(", "),
                lambda.returns.join(", ")
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.eq_with(other, &mut HashSet::new())
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_with(state, false);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, &mut HashSet::new())
    }
}

/// What a lambda does when applied
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    /// A body owned by the host program, identified by name; run by the executor
    Declared(String),
    /// Return the captured bindings named by `Lambda::returns`
    ReturnCaptured,
}

/// A closure value: parameter/return names, a body and the bindings it captured
#[derive(Debug, Clone)]
pub struct Lambda {
    pub parameters: Vec<String>,
    pub returns: Vec<String>,
    pub body: LambdaBody,
    pub captured: Frame,
}

impl Lambda {
    fn eq_with(&self, other: &Lambda, seen: &mut CellPairs) -> bool {
        self.parameters == other.parameters
            && self.returns == other.returns
            && self.body == other.body
            && self.captured.len() == other.captured.len()
            && self
                .captured
                .iter()
                .zip(other.captured.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va.eq_with(vb, seen))
    }

    /// Outputs of a lambda whose body only returns captured values
    pub fn captured_outputs(&self) -> Option<Vec<Value>> {
        match self.body {
            LambdaBody::ReturnCaptured => self
                .returns
                .iter()
                .map(|name| self.captured.get(name).cloned())
                .collect(),
            LambdaBody::Declared(_) => None,
        }
    }

    /// Expressions yielding each output, evaluated in the captured frame
    pub fn return_expressions(&self) -> Vec<Expr> {
        self.returns.iter().map(|name| Expr::var(name.as_str())).collect()
    }
}

impl PartialEq for Lambda {
    fn eq(&self, other: &Lambda) -> bool {
        self.eq_with(other, &mut HashSet::new())
    }
}

impl Eq for Lambda {}

/// Variable bindings of one activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    bindings: BTreeMap<String, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn bind<S: Into<String>>(&mut self, name: S, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Builder-style bind
    pub fn with<S: Into<String>>(mut self, name: S, value: Value) -> Self {
        self.bind(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.bindings.iter()
    }

    /// Independent copy: no reference cell is shared with `self`, while
    /// bindings that alias each other keep aliasing in the copy.
    pub fn snapshot(&self) -> Frame {
        self.copy_with(&mut HashMap::new())
    }

    fn copy_with(&self, cells: &mut CellMap) -> Frame {
        Frame {
            bindings: self
                .bindings
                .iter()
                .map(|(k, v)| (k.clone(), v.copy_with(cells)))
                .collect(),
        }
    }
}

impl Hash for Frame {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bindings.hash(state);
    }
}
