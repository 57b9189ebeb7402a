//! Test suites for the fleet orchestrator.

pub(crate) mod support;
