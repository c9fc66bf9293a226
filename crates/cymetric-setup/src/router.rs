//! Splits one command line into the argument lists of the three build steps plus the
//! environment they run in.
//!
//! Routing is a small state machine:
//!
//! ```text
//! Parsing --> Routing --> Complete
//!                  \
//!                   `---> EarlyExit   (sub-command `clean`)
//! ```
//!
//! The router never touches the process environment. Environment bindings are returned in
//! [`Routes::env`] for whoever spawns the external tools to apply.

use crate::build_type::BuildType;
use crate::error::SetupError;
use crate::namespace::{Namespace, Value};
use crate::schema::{Destination, FlagId};
use std::path::{Component, Path, PathBuf};

/// The sub-command that only removes the build directory.
pub const CLEAN_COMMAND: &str = "clean";

/// Environment variable set by `--hdf5`.
pub const HDF5_ROOT: &str = "HDF5_ROOT";

/// Environment variable set by `--moab`.
pub const MOAB_ROOT: &str = "MOAB_ROOT";

/// The four projections of one command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Routes {
    /// Argument vector for the packaging step, program name first.
    pub setup: Vec<String>,
    /// Extra arguments for `cmake`.
    pub cmake: Vec<String>,
    /// Extra arguments for `make`.
    pub make: Vec<String>,
    /// Environment bindings for every spawned process.
    pub env: Vec<(String, String)>,
}

/// A completed routing: the parsed command line and what was derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    /// What was parsed.
    pub namespace: Namespace,
    /// What each destination receives.
    pub routes: Routes,
}

/// What happened to the build directory on the `clean` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    /// The directory that was targeted.
    pub build_dir: PathBuf,
    /// `false` when there was nothing to remove.
    pub removed: bool,
}

/// States of a single routing run.
#[derive(Debug)]
pub enum RouterState {
    /// Raw tokens, program name excluded.
    Parsing(Vec<String>),
    /// Tokens matched, projections pending.
    Routing(Namespace),
    /// `clean` was requested; nothing else runs.
    EarlyExit(CleanReport),
    /// All projections built.
    Complete(Box<Routed>),
}

impl RouterState {
    /// Whether no further step is possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::EarlyExit(_) | Self::Complete(_))
    }
}

/// Terminal result of [`Router::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The `clean` sub-command ran; the caller should stop.
    EarlyExit(CleanReport),
    /// Routing succeeded; the caller should run the build.
    Complete(Box<Routed>),
}

/// Routes command lines for one project checkout.
#[derive(Debug, Clone)]
pub struct Router {
    /// `argv[0]`, passed through as the first setup token.
    program: String,
    /// Directory containing `program`; `--egg-base` is relative to it.
    script_dir: PathBuf,
    /// Directory removed by `clean` and `--clean`.
    build_dir: PathBuf,
}

impl Router {
    /// Create a router for a program invoked as `program` from `cwd`.
    pub fn new(program: impl Into<String>, cwd: &Path, build_dir: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let script_dir = script_dir(&program, cwd);
        log::trace!("program '{program}' lives in '{}'", script_dir.display());
        Self {
            program,
            script_dir,
            build_dir: build_dir.into(),
        }
    }

    /// The build directory this router cleans.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Drive the state machine from raw tokens to a terminal state.
    ///
    /// # Errors
    /// Parse failures and unknown build types, plus I/O errors while cleaning.
    pub fn run<I, S>(&self, tokens: I) -> Result<Outcome, SetupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = RouterState::Parsing(tokens.into_iter().map(Into::into).collect());
        loop {
            state = match self.step(state)? {
                RouterState::EarlyExit(report) => return Ok(Outcome::EarlyExit(report)),
                RouterState::Complete(routed) => return Ok(Outcome::Complete(routed)),
                pending @ (RouterState::Parsing(_) | RouterState::Routing(_)) => pending,
            };
        }
    }

    /// Advance one state.
    ///
    /// # Errors
    /// See [`Router::run`].
    pub fn step(&self, state: RouterState) -> Result<RouterState, SetupError> {
        match state {
            RouterState::Parsing(tokens) => Ok(RouterState::Routing(Namespace::parse(tokens)?)),
            RouterState::Routing(namespace) => self.route(namespace),
            terminal @ (RouterState::EarlyExit(_) | RouterState::Complete(_)) => Ok(terminal),
        }
    }

    /// Build every projection, or stop early on `clean`.
    fn route(&self, namespace: Namespace) -> Result<RouterState, SetupError> {
        let setup = self.project_setup(&namespace);

        if namespace.command() == CLEAN_COMMAND {
            let removed = self.remove_build_dir()?;
            return Ok(RouterState::EarlyExit(CleanReport {
                build_dir: self.build_dir.clone(),
                removed,
            }));
        }
        // Independent of the `clean` sub-command above.
        if namespace.is_set(FlagId::Clean) {
            self.remove_build_dir()?;
        }

        let routes = Routes {
            setup,
            cmake: project_cmake(&namespace)?,
            make: project_make(&namespace),
            env: project_env(&namespace),
        };
        log::debug!("routes: {routes:#?}");
        Ok(RouterState::Complete(Box::new(Routed { namespace, routes })))
    }

    /// Arguments for the packaging step.
    fn project_setup(&self, namespace: &Namespace) -> Vec<String> {
        let mut tokens = vec![self.program.clone(), namespace.command().to_owned()];
        for (spec, value) in namespace.routed(Destination::Setup) {
            match (spec.id, value) {
                (FlagId::User, Value::Set) => tokens.push("--user".to_owned()),
                (FlagId::Prefix, Value::Text(prefix)) => tokens.push(format!("--prefix={prefix}")),
                (FlagId::EggBase, Value::Text(egg_base)) => tokens.push(format!(
                    "--egg-base={}",
                    self.script_dir.join(egg_base).display()
                )),
                // `--clean` is a side effect, not a token.
                _ => {}
            }
        }
        tokens
    }

    /// Remove the build directory if there is one.
    fn remove_build_dir(&self) -> Result<bool, SetupError> {
        if !self.build_dir.exists() {
            log::debug!("no build directory at '{}'", self.build_dir.display());
            return Ok(false);
        }
        log::info!("removing build directory '{}'", self.build_dir.display());
        std::fs::remove_dir_all(&self.build_dir).map_err(|source| SetupError::Clean {
            path: self.build_dir.clone(),
            source,
        })?;
        Ok(true)
    }
}

/// Arguments appended to the `cmake` base command.
fn project_cmake(namespace: &Namespace) -> Result<Vec<String>, SetupError> {
    let mut tokens = Vec::new();
    for (spec, value) in namespace.routed(Destination::Cmake) {
        match (spec.id, value) {
            (FlagId::Define, Value::List(defines)) => {
                tokens.extend(defines.iter().map(|define| format!("-D{define}")));
            }
            (FlagId::BuildType, Value::Text(given)) => {
                let build_type: BuildType = given.parse()?;
                tokens.push(format!("-DCMAKE_BUILD_TYPE={build_type}"));
            }
            (FlagId::Prefix, Value::Text(prefix)) => {
                tokens.push(format!("-DCMAKE_INSTALL_PREFIX={prefix}"));
            }
            _ => {}
        }
    }
    Ok(tokens)
}

/// Arguments appended to the `make` base command.
fn project_make(namespace: &Namespace) -> Vec<String> {
    namespace
        .routed(Destination::Make)
        .filter_map(|(spec, value)| match (spec.id, value) {
            (FlagId::Jobs, Value::Text(jobs)) => Some(format!("-j{jobs}")),
            _ => None,
        })
        .collect()
}

/// Environment bindings for every spawned process.
fn project_env(namespace: &Namespace) -> Vec<(String, String)> {
    namespace
        .routed(Destination::Other)
        .filter_map(|(spec, value)| match (spec.id, value) {
            (FlagId::Hdf5, Value::Text(root)) => Some((HDF5_ROOT.to_owned(), root.clone())),
            (FlagId::Moab, Value::Text(root)) => Some((MOAB_ROOT.to_owned(), root.clone())),
            _ => None,
        })
        .collect()
}

/// Absolute directory of `program` as invoked from `cwd`, with `.` and `..` resolved.
fn script_dir(program: &str, cwd: &Path) -> PathBuf {
    let mut absolute = PathBuf::new();
    for component in cwd.join(program).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                absolute.pop();
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                absolute.push(component.as_os_str());
            }
        }
    }
    absolute.pop();
    absolute
}
