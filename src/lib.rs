// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod launch;
pub mod logging;
pub mod process;
pub mod types;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::engine::{Runtime, RuntimeOptions, Supervisor, SupervisorEvent, UserCommand};
use crate::process::{NodeKind, ProcessNode};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - the supervisor (process forest)
/// - the headless runtime shell
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    let supervisor = Supervisor::from_config(&cfg)?;

    if args.dry_run {
        print_dry_run(&supervisor);
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<SupervisorEvent>(64);

    // Ctrl-C → kill everything, then exit once reaped.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(SupervisorEvent::Command(UserCommand::Quit)).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    info!(config = %args.config.display(), once = args.once, "starting supervisor");

    let runtime = Runtime::new(supervisor, tx, rx, options);
    runtime.run().await?;
    Ok(())
}

/// Dry-run output: the validated process tree.
fn print_dry_run(supervisor: &Supervisor) {
    println!("sheepdog dry-run");
    println!();
    for node in supervisor.nodes() {
        print_node(node, 0);
    }
}

fn print_node(node: &ProcessNode, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    let autorun = if node.autorun() { " (autorun)" } else { "" };

    match node.kind() {
        NodeKind::Leaf(leaf) => {
            println!("{indent}- {}{autorun}", node.name());
            println!("{indent}    command: {:?}", leaf.command());
            if let Some(cwd) = leaf.cwd() {
                println!("{indent}    cwd: {cwd}");
            }
            if let Some(re) = leaf.ready_pattern() {
                println!("{indent}    ready_pattern: {}", re.as_str());
            }
        }
        NodeKind::Group(group) => {
            println!("{indent}- {} [{}]{autorun}", node.name(), group.kind());
            for child in group.children() {
                print_node(child, depth + 1);
            }
        }
    }
}
