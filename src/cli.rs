// src/cli.rs
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;

use crate::core::config::{CliOptions, DEFAULT_CONFIG_PATH};

/// Builds the flag surface a host runner embeds to control reporting. The
/// enable flag has a settings-file twin of the same name; both resolve into
/// one boolean during configuration resolution.
fn build_cli() -> Command {
    Command::new("adaptavist-reporter")
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .about("Report test executions to Adaptavist Test Management")
        .arg(
            Arg::new("adaptavist")
                .long("adaptavist")
                .help("Enable reporting to Adaptavist Test Management")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("project-key")
                .long("project-key")
                .help("Project key results are filed under, e.g. TEST")
                .value_name("PROJECT_KEY")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-run-key")
                .long("test-run-key")
                .help("Existing test run to report into, e.g. TEST-C1")
                .value_name("TEST_RUN_KEY")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("environment")
                .long("environment")
                .help("Environment label attached to every reported result")
                .value_name("ENVIRONMENT")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .help("Reporting identity checked against Adaptavist")
                .value_name("USER")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path of the JSON config file")
                .value_name("CONFIG")
                .default_value(DEFAULT_CONFIG_PATH)
                .action(ArgAction::Set),
        )
}

/// Parses the process arguments into CLI options.
pub fn parse_args() -> CliOptions {
    options_from_matches(&build_cli().get_matches())
}

/// Parses an explicit argument list; hosts embedding the flag surface hand
/// their own argv slice through here.
pub fn parse_args_from<I, T>(args: I) -> Result<CliOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Ok(options_from_matches(&build_cli().try_get_matches_from(args)?))
}

fn options_from_matches(matches: &ArgMatches) -> CliOptions {
    CliOptions {
        adaptavist: matches.get_flag("adaptavist"),
        project_key: matches.get_one::<String>("project-key").cloned(),
        test_run_key: matches.get_one::<String>("test-run-key").cloned(),
        environment: matches.get_one::<String>("environment").cloned(),
        user: matches.get_one::<String>("user").cloned(),
        config_path: matches.get_one::<String>("config").cloned(),
    }
}
