//! Build driver for cymetric.
//!
//! cymetric mixes compiled code, built with CMake and make, with Python code installed by
//! the usual packaging tools. This program takes one command line and hands each part of it
//! to the tool it belongs to:
//!
//! 1. parse the command line against a fixed schema,
//! 2. run `cmake` from the build directory,
//! 3. run `make` from the build directory,
//! 4. run the Python packaging script from the build directory.
//!
//! # Routing
//!
//! Every flag is declared once in [`schema::SCHEMA`] along with the set of destinations that
//! read it. A flag may feed several destinations; `--prefix`, for example, becomes both
//! `--prefix=<dir>` for packaging and `-DCMAKE_INSTALL_PREFIX=<dir>` for CMake.
//!
//! | destination | receives                                               |
//! |-------------|--------------------------------------------------------|
//! | setup       | program name, sub-command, `--user`, `--prefix`, `--egg-base` |
//! | cmake       | `-D` definitions, `--build-type`, `--prefix`           |
//! | make        | `-j`                                                   |
//! | other       | `HDF5_ROOT` and `MOAB_ROOT` in the tools' environment  |
//!
//! To add a flag, add a [`schema::FlagSpec`] and handle its id in the projection of each
//! destination listed for it in [`router`].
//!
//! # Cleaning
//!
//! The `clean` sub-command removes the build directory and stops. The `--clean` flag removes
//! it too but carries on with the build.

use anyhow::Context as _;
use std::path::Path;

pub mod build_type;
pub mod cmake;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod namespace;
pub mod pipeline;
pub mod process;
pub mod router;
pub mod schema;
mod test;

pub use error::SetupError;

/// Central function to write to the user.
#[macro_export]
macro_rules! user_output {
    ($($args: tt)*) => {
        #[allow(
            clippy::allow_attributes,
            clippy::useless_attribute,
            unused_imports,
            reason = "`std::io::Write` is only sometimes called??"
        )]
        use std::io::Write as _;

        print!("==> ");
        print!($($args)*);
        std::io::stdout().flush().ok();
   }
}

/// Route `env_args` (program name first) and run the build for the project in `cwd`.
///
/// # Errors
/// Any routing or build failure. Routing failures are returned as [`SetupError`] so the
/// caller can tell `--help` apart from real errors.
pub fn run(env_args: &[String], cwd: &Path) -> anyhow::Result<()> {
    let (program, tokens) = env_args
        .split_first()
        .context("no program name in the argument list")?;
    let config = config::Config::load(cwd)?;
    let router = router::Router::new(program.as_str(), cwd, cwd.join(&config.build_dir));

    match router.run(tokens.iter().cloned())? {
        router::Outcome::EarlyExit(report) => {
            log::debug!(
                "clean of '{}' finished: {report:?}",
                router.build_dir().display()
            );
            user_output!("build directory cleaned ... exiting\n");
        }
        router::Outcome::Complete(routed) => {
            pipeline::Pipeline::new(&config, cwd).run(&routed.routes)?;
            let note = pipeline::install_note(routed.namespace.text(schema::FlagId::Prefix))?;
            #[expect(
                clippy::print_stderr,
                reason = "Post-install advice goes to stderr so stdout stays clean"
            )]
            {
                eprintln!("{note}");
            };
        }
    }
    Ok(())
}

/// What the user sees for a fatal `error`: the error chain followed by the support message.
///
/// Command line errors are printed the way `clap` renders them.
pub fn failure_report(error: &anyhow::Error) -> String {
    let message = match error.downcast_ref::<SetupError>() {
        Some(SetupError::Cli(clap_error)) => clap_error.render().to_string(),
        _ => format!("Error: {error:#}\n"),
    };
    format!("{message}{}\n", pipeline::support_message())
}
