use crate::auditor::PageAuditor;
use crate::auditor::analytics_sink::AnalyticsSink;
use crate::auditor::auditor_state::AuditorState;
use crate::auditor::links::LinkProbe;
use crate::auditor::page::PageSource;
use crate::auditor::shutdown_signal::ShutdownSignal;
use crate::console::report_renderer::render_report;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use std::io::{BufRead, Stdout, Write, stdout};
use tokio::select;

/// Commands are read between audits, so the prompt only ever shows an idle
/// or a displayed auditor.
fn prompt_hint(state: AuditorState) -> &'static str {
    match state {
        AuditorState::Displayed => "[r]e-run audit, [c]ollapse, [q]uit",
        AuditorState::Idle | AuditorState::Running => "[r]un audit, [s]how last report, [q]uit",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Run,
    Collapse,
    Show,
    Quit,
    Unknown(String),
}

impl SessionCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let command = line.trim().to_ascii_lowercase();
        match command.as_str() {
            "" => None,
            "r" | "run" => Some(SessionCommand::Run),
            "c" | "collapse" => Some(SessionCommand::Collapse),
            "s" | "show" => Some(SessionCommand::Show),
            "q" | "quit" | "exit" => Some(SessionCommand::Quit),
            _ => Some(SessionCommand::Unknown(command)),
        }
    }
}

/// Terminal stand-in for the on-page report panel: the operator re-runs,
/// shows or collapses the report until they quit or Ctrl+C arrives.
pub struct InteractiveSession<'a, P, S>
where
    P: LinkProbe,
    S: AnalyticsSink,
{
    auditor: &'a PageAuditor<P, S>,
    page_source: &'a PageSource,
    stdout: Stdout,
}

impl<'a, P, S> InteractiveSession<'a, P, S>
where
    P: LinkProbe,
    S: AnalyticsSink,
{
    pub fn new(auditor: &'a PageAuditor<P, S>, page_source: &'a PageSource) -> Self {
        Self {
            auditor,
            page_source,
            stdout: stdout(),
        }
    }

    pub async fn run(&mut self, shutdown: ShutdownSignal) -> anyhow::Result<()> {
        let (command_tx, mut command_rx) = tokio::sync::mpsc::channel::<SessionCommand>(16);
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if let Some(command) = SessionCommand::parse(&line) {
                    if command_tx.blocking_send(command).is_err() {
                        break;
                    }
                }
            }
        });

        self.auto_run().await?;
        self.print_prompt().await?;

        let mut quit_requested = shutdown.is_triggered();
        while !quit_requested {
            select! {
                command = command_rx.recv() => {
                    match command {
                        Some(SessionCommand::Quit) | None => {
                            quit_requested = true;
                        }
                        Some(command) => {
                            self.handle_command(command).await?;
                            self.print_prompt().await?;
                        }
                    }
                }
                _ = shutdown.triggered() => {
                    quit_requested = true;
                }
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: SessionCommand) -> anyhow::Result<()> {
        match command {
            SessionCommand::Run => self.run_audit().await?,
            SessionCommand::Show => match self.auditor.current_report().await {
                Some(report) => render_report(&report, &mut self.stdout)?,
                None => self.print_line(Color::Yellow, "No report yet, press r to run an audit")?,
            },
            SessionCommand::Collapse => {
                self.auditor.collapse().await;
            }
            SessionCommand::Unknown(command) => {
                self.print_line(Color::Yellow, &format!("Unknown command: {}", command))?;
            }
            SessionCommand::Quit => {}
        }
        Ok(())
    }

    /// The page-ready run: the report is taken after the settle delay and
    /// kept collapsed until the operator asks for it.
    async fn auto_run(&mut self) -> anyhow::Result<()> {
        let result = match self.page_source.load().await {
            Ok(page) => self.auditor.run_on_page_ready(page).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(report) => {
                let quality = report.quality();
                self.auditor.collapse().await;
                self.print_line(
                    Color::Blue,
                    &format!(
                        "Automatic audit of {}: {} ({})",
                        report.url(),
                        quality.score,
                        quality.label
                    ),
                )?;
            }
            Err(e) => {
                log::error!("SEO audit failed: {}", e);
                self.print_line(Color::Red, &format!("Automatic audit failed: {}", e))?;
            }
        }
        Ok(())
    }

    async fn run_audit(&mut self) -> anyhow::Result<()> {
        self.print_line(
            Color::Blue,
            &format!("Running audit of {}...", self.page_source.url()),
        )?;

        let result = match self.page_source.load().await {
            Ok(page) => self.auditor.run_audit_now(page).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(report) => render_report(&report, &mut self.stdout)?,
            Err(e) => {
                log::error!("SEO audit failed: {}", e);
                self.print_line(Color::Red, &format!("Audit failed: {}", e))?;
            }
        }
        Ok(())
    }

    async fn print_prompt(&mut self) -> anyhow::Result<()> {
        let state = self.auditor.state().await;
        queue!(
            self.stdout,
            Print(format!("\n({}) {}\n> ", state.as_str(), prompt_hint(state)))
        )?;
        self.stdout.flush()?;
        Ok(())
    }

    fn print_line(&mut self, color: Color, text: &str) -> anyhow::Result<()> {
        queue!(
            self.stdout,
            SetForegroundColor(color),
            Print(format!("{}\n", text)),
            ResetColor
        )?;
        self.stdout.flush()?;
        Ok(())
    }
}
