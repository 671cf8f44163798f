// ==========================================
// Shared integration-test helpers
// ==========================================

#![allow(dead_code)]

pub mod builders;
pub mod flaky_source;
pub mod test_env;
