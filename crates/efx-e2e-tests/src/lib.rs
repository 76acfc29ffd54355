//! End-to-end tests for the efx compiler backends.
//!
//! All tests live under `tests/`; shared AST-building and artifact
//! inspection helpers are in `tests/common/`.
