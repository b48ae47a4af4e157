//! Declared types and callable declarations.

use crate::expr::Expr;
use std::fmt;

/// A declared type; selects the generator used for a parameter slot
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Null,
    Bool,
    Byte,
    Int,
    Array(Box<Type>),
    /// Fields in declaration order
    Record(Vec<(String, Type)>),
    Union(Vec<Type>),
    Reference(Box<Type>),
    Function(FunctionType),
    Nominal(NominalType),
}

impl Type {
    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn reference(element: Type) -> Type {
        Type::Reference(Box::new(element))
    }

    pub fn record<S: Into<String>>(fields: Vec<(S, Type)>) -> Type {
        Type::Record(fields.into_iter().map(|(n, t)| (n.into(), t)).collect())
    }

    /// The invariant conjuncts attached to this type, if it is nominal
    pub fn invariant(&self) -> Option<&NominalType> {
        match self {
            Type::Nominal(nominal) if !nominal.invariant.is_empty() => Some(nominal),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => write!(f, "null"),
            Type::Bool => write!(f, "bool"),
            Type::Byte => write!(f, "byte"),
            Type::Int => write!(f, "int"),
            Type::Array(element) => write!(f, "{}[]", element),
            Type::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", ty, name)?;
                }
                write!(f, "}}")
            }
            Type::Union(options) => {
                for (i, ty) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", ty)?;
                }
                Ok(())
            }
            Type::Reference(element) => write!(f, "&{}", element),
            Type::Function(signature) => write!(f, "function{}", signature),
            Type::Nominal(nominal) => write!(f, "{}", nominal.name),
        }
    }
}

/// Parameter and return types of a callable
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub parameters: Vec<Type>,
    pub returns: Vec<Type>,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |types: &[Type]| {
            types
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        write!(f, "({})->({})", join(&self.parameters), join(&self.returns))
    }
}

/// A named type over a base type, narrowed by a `where` clause over `variable`
#[derive(Debug, Clone, PartialEq)]
pub struct NominalType {
    pub name: String,
    pub variable: String,
    pub base: Box<Type>,
    pub invariant: Vec<Expr>,
}

impl NominalType {
    pub fn new(name: &str, variable: &str, base: Type, invariant: Vec<Expr>) -> Self {
        Self {
            name: name.to_string(),
            variable: variable.to_string(),
            base: Box::new(base),
            invariant,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

impl Parameter {
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

/// A function or method declaration with its contract
#[derive(Debug, Clone, PartialEq)]
pub struct CallableDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub returns: Vec<Parameter>,
    pub requires: Vec<Expr>,
    pub ensures: Vec<Expr>,
}

impl CallableDeclaration {
    pub fn new(name: &str, parameters: Vec<Parameter>, returns: Vec<Parameter>) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            returns,
            requires: Vec::new(),
            ensures: Vec::new(),
        }
    }

    pub fn with_requires(mut self, requires: Vec<Expr>) -> Self {
        self.requires = requires;
        self
    }

    pub fn with_ensures(mut self, ensures: Vec<Expr>) -> Self {
        self.ensures = ensures;
        self
    }

    pub fn signature(&self) -> FunctionType {
        FunctionType {
            parameters: self.parameters.iter().map(|p| p.ty.clone()).collect(),
            returns: self.returns.iter().map(|p| p.ty.clone()).collect(),
        }
    }

    /// Name plus signature; distinguishes overloads in the memo table
    pub fn identity(&self) -> String {
        format!("{}{}", self.name, self.signature())
    }
}
