//! Workspace package hosting the end-to-end propagation tests in `tests/`

pub use recursive_wrapper_core::*;
