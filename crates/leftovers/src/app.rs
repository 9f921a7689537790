use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("leftovers")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Remove cloud resources left behind by automated test runs")
        .long_about("leftovers lists the resources of every supported kind, keeps the ones whose name matches a filter, asks before deleting each one and retries dependency-blocked deletes over several passes until nothing more can be removed.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("sweep")
                .about("Delete every resource whose name matches the filter")
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .short('f')
                        .env("LEFTOVERS_FILTER")
                        .help("Only sweep resources whose name contains this text (overrides config)")
                )
                .arg(
                    Arg::new("regex")
                        .long("regex")
                        .help("Treat --filter as a regular expression")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("no-confirm")
                        .long("no-confirm")
                        .short('n')
                        .env("LEFTOVERS_NO_CONFIRM")
                        .help("Delete without asking for confirmation")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("List what would be deleted without deleting anything")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .help("Only sweep this resource kind (repeatable, see `leftovers types`)")
                        .action(ArgAction::Append)
                )
                .arg(
                    Arg::new("max-passes")
                        .long("max-passes")
                        .help("Upper bound on deletion passes (overrides config, default: 3)")
                        .value_parser(value_parser!(u32).range(1..))
                )
                .arg(
                    Arg::new("concurrent")
                        .long("concurrent")
                        .help("Sweep resource kinds in parallel (only with --no-confirm)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("gcp-project")
                        .long("gcp-project")
                        .env("GOOGLE_CLOUD_PROJECT")
                        .help("GCP project to sweep (overrides config)")
                )
                .arg(
                    Arg::new("gcp-token")
                        .long("gcp-token")
                        .env("GOOGLE_OAUTH_ACCESS_TOKEN")
                        .hide_env_values(true)
                        .help("OAuth access token for the compute and Cloud SQL admin APIs")
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("types")
                .about("List the resource kinds leftovers can sweep")
        )
}
