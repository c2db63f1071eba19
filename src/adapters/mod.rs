//! Conversion of generic documents into typed provider state.
//!
//! Adapters are plain functions. Each one looks up blocks by resource type,
//! extracts the fields it models through the [`Block`](crate::document::Block)
//! query interface and wraps every scalar with its provenance. Absent
//! attributes become defaults located at their enclosing block, and
//! references that cannot be resolved degrade to defaults as well, so an
//! adapter never fails.
//!
//! ```rust,ignore
//! use rampart::adapters::terraform;
//!
//! let state = terraform::adapt(&documents);
//! println!("{} instances", state.openstack.compute.instances.len());
//! ```

pub mod cloudformation;
pub mod terraform;
