//! main executable of cymetric-setup
use anyhow::Context as _;
use cymetric_setup::SetupError;

fn main() {
    #[cfg(debug_assertions)]
    std::env::set_var("RUST_BACKTRACE", "1");

    env_logger::builder().init();

    if let Err(error) = run() {
        log::error!("{error:?}");

        #[expect(
            clippy::print_stderr,
            reason = "Our central place for outputting error messages"
        )]
        {
            // `--help` and `--version` end up here too; clap knows how to exit for those.
            if let Some(SetupError::Cli(clap_error)) = error.downcast_ref::<SetupError>() {
                if !clap_error.use_stderr() {
                    clap_error.exit();
                }
            }
            eprint!("{}", cymetric_setup::failure_report(&error));

            // `clippy::exit` seems to be a false positive in `main()`.
            // See: https://github.com/rust-lang/rust-clippy/issues/13518
            #[expect(clippy::restriction, reason = "Our central place for safely exiting")]
            std::process::exit(1);
        };
    }
}

/// Wrappable "main" to catch errors.
fn run() -> anyhow::Result<()> {
    let env_args = std::env::args().collect::<Vec<_>>();
    log::trace!("CLI args: {env_args:#?}");
    let cwd = std::env::current_dir().context("could not read the current directory")?;
    cymetric_setup::run(&env_args, &cwd)
}
