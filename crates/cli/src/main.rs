//! `gh-org-provision` entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: arguments and environment (including `.env`),
//!    validated into a [`provisioning::ProvisionConfig`].
//! 2. **Wire observability**: `tracing-subscriber` with a text or JSON layer
//!    and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OTLP exporter.
//! 3. **Construct infrastructure**: the live [`github::GithubClient`], wrapped
//!    in a [`provisioning::DryRunAdmin`] for dry runs.
//! 4. **Select the command**: provisioning (default) or the weekly
//!    pull request `report`.
//!
//! Exits 0 when a run completes (warnings included) and 1 on any fatal error.

mod args;
mod settings;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;
use provisioning::{
    build_weekly_report, load_roster, report_cutoff, DryRunAdmin, Provisioner, RunId, TeamScope,
};
use tracing::{error, info, info_span, Instrument};

use crate::args::{Cli, Command, ProvisionArgs, ReportArgs};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let telemetry = match telemetry::init(cli.common().log_format) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let run_id = RunId::new_random();
    let outcome = run(cli)
        .instrument(info_span!("run", run_id = %run_id))
        .await;

    let code = match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(run_id = %run_id, error = %format!("{err:#}"), "Run failed");
            ExitCode::FAILURE
        }
    };
    telemetry.shutdown();
    code
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Command::Report(args)) => report(args).await,
        None => provision(cli.provision).await,
    }
}

async fn provision(args: ProvisionArgs) -> anyhow::Result<()> {
    let config = settings::provision_config(&args)?;
    let client = settings::github_client(&args.common)?;
    let roster = load_roster(&args.roster)?;

    info!(
        org = %config.org,
        admin_team = %config.admin_team,
        api_url = client.api_url(),
        dry_run = config.dry_run,
        "Starting provisioning run"
    );

    let report = if config.dry_run {
        let recorder = DryRunAdmin::new(client);
        let report = Provisioner::new(&recorder, &config).run(&roster).await?;
        info!(
            planned_actions = recorder.planned_actions().len(),
            "Dry run complete; no changes were made"
        );
        report
    } else {
        Provisioner::new(&client, &config).run(&roster).await?
    };

    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

async fn report(args: ReportArgs) -> anyhow::Result<()> {
    let (org, scope) = settings::report_target(&args.common)?;
    let client = settings::github_client(&args.common)?;
    let teams = match scope {
        TeamScope::Discovered => scope.team_numbers(load_roster(&args.roster)?.team_numbers()),
        TeamScope::Range { .. } => scope.team_numbers(std::iter::empty()),
    };

    let now = chrono::Local::now().naive_local();
    let cutoff = report_cutoff(now);
    info!(org = %org, teams = teams.len(), cutoff = %cutoff, "Building weekly report");

    let report = build_weekly_report(&client, &org, &teams, cutoff, now).await;
    print!("{report}");
    Ok(())
}
