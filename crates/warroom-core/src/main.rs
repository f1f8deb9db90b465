use std::sync::Arc;

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use warroom_core::{DispatchScope, FindingStatus, TroubleshootReport, WarRoom, WarRoomConfig};
use warroom_oracle::{HttpOracle, HttpOracleConfig};
use warroom_scenario::builtin_catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Command::new("warroom")
        .version(warroom_core::VERSION)
        .about("AI War Room - multi-agent incident root-cause analysis")
        .arg_required_else_help(true)
        .subcommand(Command::new("scenarios").about("List available chaos scenarios"))
        .subcommand(
            Command::new("run")
                .about("Replay a chaos scenario and analyze the resulting incidents")
                .arg(Arg::new("scenario").required(true).help("Scenario name"))
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Dispatch every specialist, not only active categories"),
                )
                .arg(
                    Arg::new("templates")
                        .long("templates")
                        .action(ArgAction::SetTrue)
                        .help("Use deterministic verdict prose instead of oracle refinement"),
                ),
        )
        .subcommand(
            Command::new("troubleshoot")
                .about("Dispatch specialists without replaying a scenario")
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Dispatch every specialist, not only active categories"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("scenarios", _)) => {
            for scenario in builtin_catalog().all() {
                println!("{}\n    {}", scenario.name, scenario.description);
            }
        }
        Some(("run", args)) => {
            let name = args
                .get_one::<String>("scenario")
                .context("scenario name is required")?;
            let warroom = build_warroom(args.get_flag("templates"))?;

            let run = warroom.run_scenario(name).await?;
            println!(
                "Scenario '{}': {} of {} payloads delivered",
                run.scenario, run.report.delivered, run.report.total_payloads
            );

            let report = warroom.troubleshoot(scope_from(args.get_flag("all"))).await;
            print_report(&report);
        }
        Some(("troubleshoot", args)) => {
            let warroom = build_warroom(false)?;
            let report = warroom.troubleshoot(scope_from(args.get_flag("all"))).await;
            if report.findings.is_empty() {
                println!("No active incidents to analyze.");
            } else {
                print_report(&report);
            }
        }
        _ => {}
    }

    Ok(())
}

fn build_warroom(template_verdicts: bool) -> anyhow::Result<WarRoom> {
    let oracle = HttpOracle::new(HttpOracleConfig::from_env()?)?;
    let config = WarRoomConfig {
        template_verdicts,
        ..WarRoomConfig::default()
    };
    Ok(WarRoom::new(Arc::new(oracle), config))
}

fn scope_from(all: bool) -> DispatchScope {
    if all {
        DispatchScope::AllCategories
    } else {
        DispatchScope::OnlyActive
    }
}

fn print_report(report: &TroubleshootReport) {
    println!();
    println!("Specialist findings:");
    for finding in &report.findings {
        let confidence = match finding.status {
            FindingStatus::Unknown => "n/a".to_string(),
            _ => format!("{:.0}%", finding.confidence * 100.0),
        };
        println!(
            "  [{}] {} ({}): {}",
            finding.status, finding.agent_name, confidence, finding.hypothesis
        );
    }

    println!();
    match (&report.verdict, &report.judge_error) {
        (Some(verdict), _) => {
            println!("ROOT CAUSE ({}): {}", verdict.root_cause_category, verdict.root_cause_headline);
            println!();
            println!("Causal chain:\n  {}", verdict.causal_explanation);
            println!();
            println!("Remediation:\n  {}", verdict.remediation_plan);
        }
        (None, Some(reason)) => println!("No verdict: {reason}"),
        (None, None) => println!("No verdict."),
    }
}
