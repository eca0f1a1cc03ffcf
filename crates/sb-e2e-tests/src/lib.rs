//! End-to-end tests for the storebot workspace live under `tests/`.
