//! # freight-cli: Freight Workflow Command-Line Interface
//!
//! ## Subcommands
//!
//! - `workflow`: query phases, transitions, document requirements and
//!   upload policy.
//! - `shipment`: create shipments, attach documents, and advance status,
//!   stored as JSON files in a local state directory.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - Handlers delegate workflow rules to `freight-workflow`; nothing here
//!   decides whether a transition is legal.

pub mod config;
pub mod shipment;
pub mod store;
pub mod workflow;
