//! TinRDP test suite. The tests live in the single integration-test binary
//! under `tests/`.
