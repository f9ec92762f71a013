// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::types::{LogLevel, NodeId};

use super::supervisor::Supervisor;
use super::{RuntimeOptions, SupervisorCommand, SupervisorEvent, TICK_INTERVAL};

/// Drives the [`Supervisor`] in response to [`SupervisorEvent`]s and turns
/// its tick requests into timers.
///
/// This is a headless IO shell around the supervisor: every new log line of
/// every leaf is written to stdout as `[name] message`. After a quit request
/// (or, with `exit_when_idle`, once nothing runs) the loop keeps ticking until
/// every process has been reaped, then cleans up and returns.
pub struct Runtime {
    supervisor: Supervisor,
    event_tx: mpsc::Sender<SupervisorEvent>,
    event_rx: mpsc::Receiver<SupervisorEvent>,
    options: RuntimeOptions,
    printer: LogPrinter,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("supervisor", &self.supervisor)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// `event_tx` must be the sending half of `event_rx`; it is used to
    /// deliver scheduled ticks.
    pub fn new(
        supervisor: Supervisor,
        event_tx: mpsc::Sender<SupervisorEvent>,
        event_rx: mpsc::Receiver<SupervisorEvent>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            supervisor,
            event_tx,
            event_rx,
            options,
            printer: LogPrinter::default(),
        }
    }

    /// Main event loop. Returns the supervisor once every process is gone.
    pub async fn run(mut self) -> Result<Supervisor> {
        info!("sheepdog runtime started");

        let step = self.supervisor.init();
        self.execute(step.commands);
        self.printer.print_new(&self.supervisor)?;

        let mut shutting_down = false;

        loop {
            if (shutting_down || self.options.exit_when_idle) && self.supervisor.is_quiescent() {
                info!("no process left running; exiting");
                break;
            }

            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.supervisor.update(event);
            self.execute(step.commands);
            self.printer.print_new(&self.supervisor)?;

            if !step.keep_running && !shutting_down {
                info!("quit requested; waiting for processes to terminate");
                shutting_down = true;
            }
        }

        self.supervisor.clean_up();
        info!("runtime exiting");
        Ok(self.supervisor)
    }

    fn execute(&self, commands: Vec<SupervisorCommand>) {
        for command in commands {
            match command {
                SupervisorCommand::ScheduleTick(id) => self.schedule_tick(id),
                SupervisorCommand::RequestExit => {
                    // keep_running=false carries the same information; the
                    // loop reacts to that.
                    debug!("supervisor issued RequestExit command");
                }
            }
        }
    }

    fn schedule_tick(&self, id: NodeId) {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(TICK_INTERVAL).await;
            let _ = tx.send(SupervisorEvent::Tick(id)).await;
        });
    }
}

/// Writes log lines that appeared since the previous call.
#[derive(Debug, Default)]
struct LogPrinter {
    printed: HashMap<NodeId, usize>,
}

impl LogPrinter {
    fn print_new(&mut self, supervisor: &Supervisor) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let mut result = Ok(());

        for root in supervisor.nodes() {
            root.for_each_leaf(&mut |node, leaf| {
                let seen = self.printed.entry(node.id()).or_insert(0);
                for entry in leaf.log().iter().skip(*seen) {
                    let marker = match entry.level {
                        LogLevel::Info => "",
                        LogLevel::Error => "! ",
                    };
                    if let Err(e) = writeln!(out, "[{}] {}{}", node.name(), marker, entry.message) {
                        result = Err(e);
                    }
                }
                *seen = leaf.log().len();
            });
        }

        out.flush()?;
        Ok(result?)
    }
}
