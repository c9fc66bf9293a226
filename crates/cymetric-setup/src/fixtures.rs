//! Database fixtures for metric tests.
//!
//! A simulation is run once per output backend to produce an original database. Each test
//! then works on a fresh copy of that original, so tests cannot see each other's writes.

use crate::process::safe_call;
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Output format of a simulation database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// HDF5 file.
    Hdf5,
    /// SQLite file.
    Sqlite,
}

/// One database under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbFixture {
    /// File the test body works on; recreated for every test.
    pub working: &'static str,
    /// Pristine output of the simulator.
    pub original: &'static str,
    /// Format of both files.
    pub backend: Backend,
}

/// Every backend the tests run against.
pub const DBS: [DbFixture; 2] = [
    DbFixture {
        working: "test.h5",
        original: "orig.h5",
        backend: Backend::Hdf5,
    },
    DbFixture {
        working: "test.sqlite",
        original: "orig.sqlite",
        backend: Backend::Sqlite,
    },
];

/// The simulator that produces original databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulator {
    /// Executable name or path.
    pub program: String,
    /// Input deck, relative to the fixture directory.
    pub input: String,
}

impl Default for Simulator {
    #[inline]
    fn default() -> Self {
        Self {
            program: "cyclus".to_owned(),
            input: "test-input.xml".to_owned(),
        }
    }
}

impl Simulator {
    /// `cyclus -o<output> test-input.xml`
    pub fn command_line(&self, output: &str) -> Vec<String> {
        vec![
            self.program.clone(),
            format!("-o{output}"),
            self.input.clone(),
        ]
    }
}

/// Run `simulator` in `dir` for every original database that does not exist yet.
///
/// # Errors
/// If the simulator cannot be run or exits unsuccessfully.
pub fn generate_originals(dir: &Path, simulator: &Simulator) -> anyhow::Result<()> {
    for fixture in &DBS {
        if dir.join(fixture.original).is_file() {
            log::debug!("'{}' already generated", fixture.original);
            continue;
        }
        let command = simulator.command_line(fixture.original);
        log::info!("generating '{}' with `{}`", fixture.original, command.join(" "));
        safe_call(&command, Some(dir), &[])
            .with_context(|| format!("generating fixture '{}'", fixture.original))?;
    }
    Ok(())
}

/// Refresh the working copy of `fixture` in `dir` from its original.
///
/// # Errors
/// If the stale copy cannot be removed or the original cannot be copied.
pub fn fresh_copy(dir: &Path, fixture: &DbFixture) -> anyhow::Result<PathBuf> {
    let working = dir.join(fixture.working);
    if working.exists() {
        std::fs::remove_file(&working)
            .with_context(|| format!("removing stale '{}'", working.display()))?;
    }
    let original = dir.join(fixture.original);
    std::fs::copy(&original, &working).with_context(|| {
        format!(
            "copying '{}' to '{}'",
            original.display(),
            working.display()
        )
    })?;
    Ok(working)
}

/// Run `test` once per backend against a fresh copy of its database.
///
/// `open` turns a database path into whatever handle the test body needs.
///
/// # Errors
/// The first error from copying, opening or the test body itself.
pub fn dbtest<H, O, T>(dir: &Path, mut open: O, mut test: T) -> anyhow::Result<()>
where
    O: FnMut(&Path, Backend) -> anyhow::Result<H>,
    T: FnMut(H, &Path, Backend) -> anyhow::Result<()>,
{
    for fixture in &DBS {
        let path = fresh_copy(dir, fixture)?;
        let handle = open(&path, fixture.backend)
            .with_context(|| format!("opening {:?} database '{}'", fixture.backend, path.display()))?;
        log::debug!("running test against '{}'", path.display());
        test(handle, &path, fixture.backend)?;
    }
    Ok(())
}
