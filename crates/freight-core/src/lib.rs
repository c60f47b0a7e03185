//! # freight-core: Foundational Types for the Freight Workflow Stack
//!
//! Leaf crate of the workspace. Defines the primitives every other crate
//! shares: the top-level error type, identifier newtypes, and the UTC-only
//! timestamp used in transition logs.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `freight-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Public types derive `Debug`, `Clone`, and `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::FreightError;
pub use identity::ShipmentId;
pub use temporal::Timestamp;
