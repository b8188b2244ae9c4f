//! Story Explorer — offline path discovery for branching narrative stories.
//!
//! Drives an opaque narrative session (advance / choices / choose /
//! snapshot / restore) through a bounded depth-first enumeration of every
//! choice combination, shortest-path search to a named knot, and
//! reachability analysis over the discovered paths.

pub mod core;
pub mod schema;
