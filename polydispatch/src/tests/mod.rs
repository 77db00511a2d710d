//! Tests for the object system
//!
//! Grouped by area: the class graph, object construction and slots, method
//! resolution, next-method chains, construction hooks, interop and
//! configuration, plus property-based checks of the dispatch rules.

mod test_class_graph;
mod test_initialize;
