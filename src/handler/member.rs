//! Named callable members and their calling contract.
//!
//! # Responsibilities
//! - Describe each member's shape (parameters, returns) at registration time
//! - Check a member against the `fn(&mut dyn Context)` contract
//! - Turn an accepted member into a uniform [`Handler`]
//!
//! # Design Decisions
//! - Shapes are recorded when a member is registered, never guessed later
//! - A member that fails the contract is never wrapped, so it can never be invoked
//! - Opaque members describe a shape but carry no invoker

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handler::context::{handler, Context, Handler, HandlerError};

/// Type of a parameter or return slot in a member signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeShape {
    /// The request/response capability (`&mut dyn Context`).
    Context,
    /// An error-like value.
    Error,
    /// Anything else, by type name.
    Other(String),
}

impl TypeShape {
    pub fn other(name: impl Into<String>) -> Self {
        TypeShape::Other(name.into())
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Context => f.write_str("&mut dyn Context"),
            TypeShape::Error => f.write_str("Result<(), HandlerError>"),
            TypeShape::Other(name) => f.write_str(name),
        }
    }
}

/// Parameter and return shape of a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<TypeShape>,
    pub returns: Vec<TypeShape>,
}

impl Signature {
    pub fn new(params: Vec<TypeShape>, returns: Vec<TypeShape>) -> Self {
        Self { params, returns }
    }

    /// `fn(&mut dyn Context)`
    pub fn plain() -> Self {
        Self::new(vec![TypeShape::Context], Vec::new())
    }

    /// `fn(&mut dyn Context) -> Result<(), HandlerError>`
    pub fn fallible() -> Self {
        Self::new(vec![TypeShape::Context], vec![TypeShape::Error])
    }

    /// Every way this signature breaks the handler contract.
    pub fn violations(&self) -> Vec<ContractViolation> {
        let mut violations = Vec::new();

        if self.params.len() != 1 {
            violations.push(ContractViolation::Arity(self.params.len()));
        } else if self.params[0] != TypeShape::Context {
            violations.push(ContractViolation::ParamType(self.params[0].clone()));
        }

        match self.returns.as_slice() {
            [] | [TypeShape::Error] => {}
            other => violations.push(ContractViolation::ReturnShape(join_shapes(other))),
        }

        violations
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({})", join_shapes(&self.params))?;
        match self.returns.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {}", single),
            many => write!(f, " -> ({})", join_shapes(many)),
        }
    }
}

fn join_shapes(shapes: &[TypeShape]) -> String {
    shapes
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One reason a member cannot serve as a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("expected exactly one parameter, found {0}")]
    Arity(usize),

    #[error("parameter must be &mut dyn Context, found {0}")]
    ParamType(TypeShape),

    #[error("must return nothing or a single error, found ({0})")]
    ReturnShape(String),

    #[error("no invoker is registered for this member")]
    NotInvocable,
}

type PlainFn = Arc<dyn Fn(&mut dyn Context) + Send + Sync>;

#[derive(Clone)]
enum Callable {
    Plain(PlainFn),
    Fallible(Handler),
    Opaque,
}

/// A named callable exposed by a handler instance.
#[derive(Clone)]
pub struct Member {
    name: String,
    signature: Signature,
    callable: Callable,
}

impl Member {
    /// A member shaped `fn(&mut dyn Context)`.
    pub fn plain<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn Context) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature: Signature::plain(),
            callable: Callable::Plain(Arc::new(f)),
        }
    }

    /// A member shaped `fn(&mut dyn Context) -> Result<(), HandlerError>`.
    pub fn fallible<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn Context) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature: Signature::fallible(),
            callable: Callable::Fallible(Arc::new(f)),
        }
    }

    /// A member known only by its shape. It is never invocable.
    pub fn opaque(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
            callable: Callable::Opaque,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Check the contract and wrap the member as a uniform handler.
    pub fn to_handler(&self) -> Result<Handler, Vec<ContractViolation>> {
        let mut violations = self.signature.violations();
        if violations.is_empty() {
            match &self.callable {
                Callable::Plain(f) => {
                    let f = f.clone();
                    return Ok(handler(move |ctx| {
                        f(ctx);
                        Ok(())
                    }));
                }
                Callable::Fallible(f) => return Ok(f.clone()),
                Callable::Opaque => violations.push(ContractViolation::NotInvocable),
            }
        }
        Err(violations)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .finish()
    }
}
