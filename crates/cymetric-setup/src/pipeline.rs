//! The fixed build sequence: `cmake`, then `make`, then the Python packaging step, all run
//! from the build directory with the routed arguments and environment.

use crate::cmake;
use crate::config::Config;
use crate::process::safe_call;
use crate::router::Routes;
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Where users can get help when a build fails.
const SUPPORT_CHANNEL: &str = "If you are having issues building cymetric, please report your \
    problem to cyclus-dev@googlegroups.com or look for help at http://fuelcycle.org";

/// Runs the external build tools for one project checkout.
#[derive(Debug)]
pub struct Pipeline<'config> {
    /// Tool names and locations.
    config: &'config Config,
    /// Project root; relative config paths are resolved against it.
    root: PathBuf,
}

impl<'config> Pipeline<'config> {
    /// A pipeline for the project at `root`.
    pub fn new(config: &'config Config, root: &Path) -> Self {
        Self {
            config,
            root: root.to_owned(),
        }
    }

    /// Absolute build directory.
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.config.build_dir)
    }

    /// Run all three steps in order, stopping at the first failure.
    ///
    /// # Errors
    /// A missing `cmake`, or any step that fails to run or exits unsuccessfully.
    pub fn run(&self, routes: &Routes) -> anyhow::Result<()> {
        let build_dir = self.build_dir();
        std::fs::create_dir_all(&build_dir).with_context(|| {
            format!("could not create build directory '{}'", build_dir.display())
        })?;

        cmake::ensure_installed(&self.config.cmake)?;
        let cmake_command =
            cmake::command_line_for_host(&self.config.cmake, &routes.cmake, &self.config.python);
        crate::user_output!("CMake command is\n{}\n", cmake_command.join(" "));
        safe_call(&cmake_command, Some(&build_dir), &routes.env).context("running cmake")?;

        let make_command = self.make_command(&routes.make);
        crate::user_output!("Building with `{}`\n", make_command.join(" "));
        safe_call(&make_command, Some(&build_dir), &routes.env).context("running make")?;

        let packaging_command = self.packaging_command(&routes.setup);
        crate::user_output!("Packaging with `{}`\n", packaging_command.join(" "));
        safe_call(&packaging_command, Some(&build_dir), &routes.env)
            .context("running the packaging step")?;

        Ok(())
    }

    /// `make` plus the routed make arguments.
    fn make_command(&self, make_args: &[String]) -> Vec<String> {
        core::iter::once(self.config.make.clone())
            .chain(make_args.iter().cloned())
            .collect()
    }

    /// The packaging script sees the routed setup vector, with itself in place of the program name.
    fn packaging_command(&self, setup: &[String]) -> Vec<String> {
        let script = self.root.join(&self.config.packaging_script);
        [
            self.config.python.clone(),
            format!("{}", script.display()),
        ]
        .into_iter()
        .chain(setup.iter().skip(1).cloned())
        .collect()
    }
}

/// The closing message printed on every fatal error.
pub fn support_message() -> String {
    let rule = "-".repeat(20);
    format!("\n{rule}\n\n{SUPPORT_CHANNEL}\n\n{rule}")
}

/// Advice on the environment variables needed to use an install under `prefix`.
///
/// Without a prefix the user-local `~/.local` is assumed.
///
/// # Errors
/// If no prefix is given and the home directory cannot be determined.
pub fn install_note(prefix: Option<&str>) -> anyhow::Result<String> {
    let prefix = match prefix {
        Some(prefix) => PathBuf::from(prefix),
        None => directories::BaseDirs::new()
            .context("could not find the user home directory")?
            .home_dir()
            .join(".local"),
    };
    let bin = prefix.join("bin");
    let lib = prefix.join("lib");
    Ok(format!(
        "\nNOTE: unless you have done so already, make sure PATH and LD_LIBRARY_PATH \
        (DYLD_FALLBACK_LIBRARY_PATH on macOS) include the install prefix of cymetric. \
        For this install you can add these lines to '~/.bashrc' or equivalent:\n\n\
        # Cymetric Environment Settings\n\
        export PATH=\"{}:${{PATH}}\"\n\
        export LD_LIBRARY_PATH=\"{}:${{LD_LIBRARY_PATH}}\"",
        bin.display(),
        lib.display()
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{scratch_dir, strings};

    #[test_log::test]
    fn packaging_replaces_the_program_name() {
        let config = Config::default();
        let pipeline = Pipeline::new(&config, Path::new("/src/cymetric"));
        let command =
            pipeline.packaging_command(&strings(&["cymetric-setup", "install", "--user"]));
        assert_eq!(
            command,
            [
                "python3".to_owned(),
                format!("{}", Path::new("/src/cymetric").join("setup.py").display()),
                "install".to_owned(),
                "--user".to_owned()
            ]
        );
    }

    #[test_log::test]
    fn make_gets_the_routed_jobs() {
        let config = Config::default();
        let pipeline = Pipeline::new(&config, Path::new("."));
        assert_eq!(pipeline.make_command(&strings(&["-j4"])), ["make", "-j4"]);
    }

    #[test_log::test]
    fn support_message_names_the_channel() {
        let message = support_message();
        assert!(message.contains("cyclus-dev@googlegroups.com"));
        assert!(message.contains("http://fuelcycle.org"));
        assert!(message.contains(&"-".repeat(20)));
    }

    #[test_log::test]
    fn install_note_uses_the_prefix() {
        let note = install_note(Some("/opt/cyclus")).unwrap();
        let bin = Path::new("/opt/cyclus").join("bin");
        let lib = Path::new("/opt/cyclus").join("lib");
        assert!(note.contains(&format!("export PATH=\"{}:${{PATH}}\"", bin.display())));
        assert!(note.contains(&format!(
            "export LD_LIBRARY_PATH=\"{}:${{LD_LIBRARY_PATH}}\"",
            lib.display()
        )));
    }

    #[cfg(unix)]
    #[test_log::test]
    fn runs_every_step_in_the_build_dir() {
        let dir = scratch_dir();
        std::fs::write(
            dir.path().join("package.sh"),
            "echo \"$@ $HDF5_ROOT\" > packaged.txt\n",
        )
        .unwrap();
        let config = Config {
            cmake: "true".to_owned(),
            make: "true".to_owned(),
            python: "sh".to_owned(),
            packaging_script: PathBuf::from("package.sh"),
            ..Config::default()
        };
        let routes = Routes {
            setup: strings(&["cymetric-setup", "install", "--user"]),
            cmake: strings(&["-DCMAKE_BUILD_TYPE=Release"]),
            make: strings(&["-j2"]),
            env: vec![("HDF5_ROOT".to_owned(), "/opt/hdf5".to_owned())],
        };

        Pipeline::new(&config, dir.path()).run(&routes).unwrap();

        let packaged = std::fs::read_to_string(dir.path().join("build").join("packaged.txt")).unwrap();
        assert_eq!(packaged.trim(), "install --user /opt/hdf5");
    }

    #[cfg(unix)]
    #[test_log::test]
    fn failing_make_stops_the_build() {
        let dir = scratch_dir();
        let config = Config {
            cmake: "true".to_owned(),
            make: "false".to_owned(),
            python: "sh".to_owned(),
            packaging_script: PathBuf::from("never-run.sh"),
            ..Config::default()
        };
        let error = Pipeline::new(&config, dir.path())
            .run(&Routes::default())
            .unwrap_err();
        assert!(format!("{error:#}").contains("running make"), "{error:#}");
    }

    #[cfg(unix)]
    #[test_log::test]
    fn missing_cmake_aborts_before_building() {
        let dir = scratch_dir();
        let config = Config {
            cmake: "cymetric-setup-no-such-cmake".to_owned(),
            ..Config::default()
        };
        let error = Pipeline::new(&config, dir.path())
            .run(&Routes::default())
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<crate::error::SetupError>(),
            Some(crate::error::SetupError::ExternalToolMissing { .. })
        ));
    }
}
