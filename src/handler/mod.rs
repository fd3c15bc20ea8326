//! Handler subsystem.
//!
//! # Data Flow
//! ```text
//! caller builds HandlerObject (members described at registration time)
//!     → pool.rs (ordered registry)
//!     → resolver looks members up by name
//!     → member.rs (contract check, wrap as Handler)
//!
//! At request time:
//!     transport builds a Context
//!     → Handler(&mut dyn Context)
//! ```
//!
//! # Design Decisions
//! - No runtime reflection: members carry their shape from registration
//! - Handlers are synchronous and object safe; transports own async I/O
//! - Registration order is significant (first match wins)

pub mod context;
pub mod instance;
pub mod local;
pub mod member;
pub mod pool;

pub use context::{handler, Context, ContextExt, Handler, HandlerError, RouteConfig};
pub use instance::{HandlerInstance, HandlerObject, HandlerObjectBuilder};
pub use local::{LocalContext, ResponseBody};
pub use member::{ContractViolation, Member, Signature, TypeShape};
pub use pool::HandlerPool;
