use std::io::{self, BufReader};
use std::sync::Arc;

use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use leftovers_core::config::LeftoversConfig;
use leftovers_core::events;
use leftovers_core::interaction::{
    ConfirmationGate, Prompter, TerminalAdvisor, TerminalPrompter,
};
use leftovers_core::providers::gcp::GcpProvider;
use leftovers_core::resources::{ListOutcome, Lister, list_resource_sets};
use leftovers_core::sweep::{SweepReport, Sweeper};
use leftovers_core::LeftoversError;

use super::load_config_with_warning;
use crate::table::ReportTable;

pub(crate) async fn handle_sweep_command(
    matches: &ArgMatches,
    cancel: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.sweep_started");

    let mut config = load_config_with_warning();
    apply_cli_overrides(&mut config, matches);

    if let Err(e) = config.validate() {
        eprintln!("❌ Invalid configuration: {}", e);
        events::log_command_rejected(&e);
        return Err(e.into());
    }

    let filter = match config.name_filter() {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("❌ {}", e);
            events::log_command_rejected(&e);
            return Err(e.into());
        }
    };

    let token = matches.get_one::<String>("gcp-token").cloned();
    let provider = match GcpProvider::new(
        config.gcp.project.clone(),
        token,
        config.wait_config(),
        cancel.clone(),
    ) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("❌ {}", e);
            events::log_command_rejected(&e);
            return Err(e.into());
        }
    };

    let listers = select_listers(&provider, matches)?;
    let json = matches.get_flag("json");

    if matches.get_flag("dry-run") {
        let listing = list_resource_sets(&listers, provider.project(), &filter, &cancel).await;
        print_dry_run(provider.project(), &listing, json)?;
        info!(
            event = "cli.sweep_dry_run_completed",
            kinds = listing.sets.len(),
            list_errors = listing.failures.len()
        );
        return Ok(());
    }

    let no_confirm = matches.get_flag("no-confirm");
    // Prompts move to stderr so --json output stays parseable
    let prompter: Arc<dyn Prompter> = if json {
        Arc::new(TerminalPrompter::new(BufReader::new(io::stdin()), io::stderr()))
    } else {
        Arc::new(TerminalPrompter::stdio())
    };
    let gate = ConfirmationGate::from_no_confirm(no_confirm, prompter);

    let sweeper = Sweeper::new(
        gate,
        Arc::new(TerminalAdvisor),
        config.sweep_options(),
        cancel,
    );
    let report = sweeper.run(&listers, provider.project(), &filter).await;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }

    if report.is_success() {
        info!(
            event = "cli.sweep_completed",
            deleted = report.deleted_count(),
            skipped = report.skipped_count(),
            passes = report.passes
        );
        Ok(())
    } else {
        error!(
            event = "cli.sweep_failed",
            failed = report.failed_count(),
            passes = report.passes
        );
        Err(format!("{} resource(s) could not be deleted", report.failed_count()).into())
    }
}

/// CLI flags and environment variables override file configuration.
fn apply_cli_overrides(config: &mut LeftoversConfig, matches: &ArgMatches) {
    if let Some(filter) = matches.get_one::<String>("filter") {
        config.sweep.filter = Some(filter.clone());
    }
    if matches.get_flag("regex") {
        config.sweep.regex = true;
    }
    if let Some(max_passes) = matches.get_one::<u32>("max-passes") {
        config.sweep.max_passes = Some(*max_passes);
    }
    if matches.get_flag("concurrent") {
        config.sweep.concurrent_kinds = true;
    }
    if let Some(project) = matches.get_one::<String>("gcp-project") {
        config.gcp.project = Some(project.clone());
    }
}

fn select_listers(
    provider: &GcpProvider,
    matches: &ArgMatches,
) -> Result<Vec<Arc<dyn Lister>>, Box<dyn std::error::Error>> {
    let Some(kinds) = matches.get_many::<String>("type") else {
        return Ok(provider.listers());
    };

    let mut listers = Vec::new();
    for kind in kinds {
        match provider.lister_for(kind) {
            Ok(lister) => listers.push(lister),
            Err(e) => {
                eprintln!("❌ {}", e);
                eprintln!("   Run `leftovers types` to see the supported kinds.");
                events::log_command_rejected(&e);
                return Err(e.into());
            }
        }
    }
    Ok(listers)
}

fn print_dry_run(
    project: &str,
    listing: &ListOutcome,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let resources: Vec<serde_json::Value> = listing
            .sets
            .iter()
            .filter(|set| !set.is_empty())
            .map(|set| {
                serde_json::json!({
                    "resource_type": set.resource_type(),
                    "identifiers": set.identifiers(),
                })
            })
            .collect();
        let list_errors: Vec<serde_json::Value> = listing
            .failures
            .iter()
            .map(|(resource_type, e)| {
                serde_json::json!({
                    "resource_type": resource_type,
                    "code": e.error_code(),
                    "message": e.to_string(),
                })
            })
            .collect();
        let output = serde_json::json!({
            "project": project,
            "resources": resources,
            "list_errors": list_errors,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let total: usize = listing.sets.iter().map(|set| set.len()).sum();
    if total == 0 {
        println!("No matching resources found in project {}.", project);
    } else {
        println!("Would delete {} resource(s) in project {}:", total, project);
        for set in listing.sets.iter().filter(|set| !set.is_empty()) {
            println!("   {} ({}):", set.resource_type(), set.len());
            for identifier in set.identifiers() {
                println!("      - {}", identifier);
            }
        }
    }

    print_list_errors(listing.failures.iter().map(|(t, e)| (t.as_str(), e.to_string())));
    Ok(())
}

fn print_report(report: &SweepReport) {
    if report.entries().is_empty() {
        println!("No matching resources found.");
    } else {
        ReportTable::new(report.entries()).print_table(report.entries());
    }

    println!(
        "Deleted: {}  Skipped: {}  Failed: {}  Passes: {}",
        report.deleted_count(),
        report.skipped_count(),
        report.failed_count(),
        report.passes
    );

    print_list_errors(
        report
            .list_errors()
            .iter()
            .map(|f| (f.resource_type.as_str(), f.message.clone())),
    );
}

fn print_list_errors<'a>(failures: impl Iterator<Item = (&'a str, String)>) {
    let failures: Vec<_> = failures.collect();
    if failures.is_empty() {
        return;
    }

    eprintln!("⚠️  Could not list {} resource kind(s):", failures.len());
    for (resource_type, message) in failures {
        eprintln!("   {}: {}", resource_type, message);
    }
}
