//! Dark Starter CLI

use clap::{Parser, Subcommand};
use colored::*;
use dark_starter::generator::config::parse_stylesheets_from_file;
use dark_starter::scenario::{parse_scenario_from_file, replay};
use dark_starter::{
    ControllerOptions, CssGenerator, MemoryHost, StaticCssGenerator, StyleDispatcher, TabHandle,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dark-starter")]
#[command(about = "Drive the page-darkening controller against a simulated browser", long_about = None)]
#[command(version)]
struct Cli {
    /// Log controller decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario of switch flips and tab events
    Replay {
        /// Path to the scenario (JSON5)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Stylesheet configuration (JSON5); builtin sheet when omitted
        #[arg(long)]
        stylesheets: Option<PathBuf>,

        /// Write a markdown report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the page script dispatched for a URL
    Script {
        /// Page URL; the default stylesheet is used when omitted
        #[arg(short, long)]
        url: Option<String>,

        /// Print the removal script instead
        #[arg(long)]
        remove: bool,

        /// Stylesheet configuration (JSON5); builtin sheet when omitted
        #[arg(long)]
        stylesheets: Option<PathBuf>,
    },
}

fn load_generator(path: Option<&Path>) -> anyhow::Result<Rc<dyn CssGenerator>> {
    let generator = match path {
        Some(path) => StaticCssGenerator::from_config(parse_stylesheets_from_file(path)?)?,
        None => StaticCssGenerator::builtin(),
    };
    Ok(Rc::new(generator))
}

fn run_replay(
    scenario_path: &Path,
    stylesheets: Option<&Path>,
    report_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let generator = load_generator(stylesheets)?;
    let scenario = parse_scenario_from_file(scenario_path)?;
    let report = replay(&scenario, generator)?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", "Dark Starter Replay".bold().blue());
        println!("{}", "=".repeat(50).blue());
        println!();

        for execution in &report.executions {
            let target = match execution.target {
                Some(id) => format!("tab {}", id),
                None => "current tab".to_string(),
            };
            let action = if execution.script.is_injection() {
                "inject".green()
            } else {
                "remove".yellow()
            };
            let suffix = if execution.rejected {
                " (rejected by host)".red().to_string()
            } else {
                String::new()
            };
            println!("  {} → {} [{}]{}", action, target, execution.script.run_at, suffix);
        }

        println!();
        println!("📊 Summary:");
        println!(
            "  - State: {}",
            if report.enabled { "enabled".green() } else { "disabled".yellow() }
        );
        println!("  - Listeners: {}", report.listeners);
        println!("  - Injections: {}", report.injection_count());
        println!("  - Removals: {}", report.removal_count());
        for tab in &report.tabs {
            println!(
                "  - Tab {}: {}",
                tab.id,
                if tab.styled { "styled".green() } else { "unstyled".dimmed() }
            );
        }
    }

    if let Some(path) = report_path {
        std::fs::write(path, report.to_markdown())?;
        println!("  - Report: {}", path.display());
    }

    Ok(())
}

fn run_script(url: Option<&str>, remove: bool, stylesheets: Option<&Path>) -> anyhow::Result<()> {
    let generator = load_generator(stylesheets)?;
    let dispatcher = StyleDispatcher::new(
        generator,
        Rc::new(MemoryHost::new()),
        ControllerOptions::default(),
    );

    if let Some(url) = url {
        if let Err(reason) = dispatcher.check_tab(&TabHandle::new(0, url)) {
            eprintln!("{}", format!("⚠️  {}; the controller would skip it", reason).yellow());
        }
    }

    let script = if remove {
        dispatcher.build_removal_script()
    } else {
        dispatcher.build_injection_script(url)
    };
    println!("{}", script.to_js());
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Replay {
            scenario,
            stylesheets,
            report,
            json,
        } => run_replay(scenario, stylesheets.as_deref(), report.as_deref(), *json),
        Commands::Script {
            url,
            remove,
            stylesheets,
        } => run_script(url.as_deref(), *remove, stylesheets.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{}", "❌ Failed!".red().bold());
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}
