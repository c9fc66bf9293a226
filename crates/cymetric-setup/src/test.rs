//! utilities for tests
#![cfg(test)]

use crate::router::Router;

/// A fresh scratch directory, removed when dropped.
pub fn scratch_dir() -> tempdir::TempDir {
    tempdir::TempDir::new("cymetric-setup").unwrap()
}

/// A router for `setup.py` in `dir`, building into `dir/build`.
pub fn router_in(dir: &std::path::Path) -> Router {
    Router::new("setup.py", dir, dir.join("build"))
}

pub fn strings(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|&token| token.to_owned()).collect()
}
