//! Test suite for the harness
//!
//! Organized by subsystem: XML codec behavior, the two table-driven
//! runners, property-based round-trip invariants, and an end-to-end module
//! that drives the public entry points the way a plugin test file would.

#[cfg(test)]
mod harness_tests;
