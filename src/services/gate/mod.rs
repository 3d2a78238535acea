pub mod credential;
pub mod decision;
pub mod policy;
pub mod role;

pub use decision::{Admission, GateDecision};
pub use policy::{GateConfig, GateConfigError, RouteGate};
pub use role::Role;
