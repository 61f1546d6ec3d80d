//! Session management for streamsql-cli
//!
//! Drives statements on the gateway and owns the two terminal surfaces:
//! the rustyline prompt and the full-screen results view. The session is the
//! only writer of the result store; the background watcher merely reports
//! when a new statement has been scheduled.
//!
//! Gateway errors are reported and the prompt continues, except for
//! authorization failures, which end the session.

pub mod fetcher;
#[cfg(test)]
mod mock_gateway;
pub mod watcher;

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use streamsql_link::StatementGateway;

use crate::error::{CLIError, Result};
use crate::formatter::{OutputFormat, OutputFormatter};
use crate::history::CommandHistory;
use crate::parser::{split_statements, Command, CommandParser, ViewMode};
use crate::results_view::{ResultsView, ViewAction};
use crate::CLI_VERSION;

pub use fetcher::{FetcherSettings, PageOutcome, ResultFetcher};
pub use watcher::{StatementWatcher, WatchEvent};

/// Which surface currently owns the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Prompt,
    Table,
}

/// What the caller should do after a command ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Print this text
    Print(String),
    /// Present the current statement's results
    ShowResults,
    Quit,
}

/// Session construction options, resolved from config and flags
pub struct SessionOptions {
    pub gateway_url: String,
    pub format: OutputFormat,
    pub color: bool,
    pub spinner: bool,
    pub fetcher: FetcherSettings,
    pub batch_max_pages: usize,
    pub history: CommandHistory,
    /// Rendered configuration shown by `\config`
    pub config_display: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            format: OutputFormat::Table,
            color: false,
            spinner: false,
            fetcher: FetcherSettings::default(),
            batch_max_pages: 10,
            history: CommandHistory::new(1000),
            config_display: String::new(),
        }
    }
}

/// CLI session state
pub struct CLISession {
    gateway: Arc<dyn StatementGateway>,
    gateway_url: String,
    parser: CommandParser,
    formatter: OutputFormatter,
    color: bool,
    spinner: bool,
    settings: FetcherSettings,
    batch_max_pages: usize,
    history: CommandHistory,
    config_display: String,

    /// Statement properties from `SET`, sent with every new statement
    properties: HashMap<String, String>,

    /// The statement whose results are on display
    fetcher: Option<ResultFetcher>,
    watcher: StatementWatcher,
    view: ResultsView,
    surface: Surface,

    /// Last non-fatal error raised while the results view was up
    view_notice: Option<String>,
}

impl CLISession {
    pub fn new(gateway: Arc<dyn StatementGateway>, options: SessionOptions) -> Self {
        Self {
            gateway,
            gateway_url: options.gateway_url,
            parser: CommandParser::new(),
            formatter: OutputFormatter::new(options.format, options.color),
            color: options.color,
            spinner: options.spinner,
            settings: options.fetcher,
            batch_max_pages: options.batch_max_pages.max(1),
            history: options.history,
            config_display: options.config_display,
            properties: HashMap::new(),
            fetcher: None,
            watcher: StatementWatcher::new(),
            view: ResultsView::new(options.color),
            surface: Surface::Prompt,
            view_notice: None,
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    pub fn current_statement(&self) -> Option<&ResultFetcher> {
        self.fetcher.as_ref()
    }

    /// Parse and run one complete command line.
    pub async fn execute(&mut self, line: &str) -> Result<CommandOutcome> {
        let command = self.parser.parse(line)?;
        self.execute_command(command).await
    }

    async fn execute_command(&mut self, command: Command) -> Result<CommandOutcome> {
        match command {
            Command::Sql(sql) => {
                self.start_statement(&sql).await?;
                Ok(CommandOutcome::ShowResults)
            },
            Command::SetProperty { key, value } => {
                log::debug!("[SESSION] SET '{}'", key);
                let message = format!("Property '{}' set to '{}'", key, value);
                self.properties.insert(key, value);
                Ok(CommandOutcome::Print(message))
            },
            Command::ShowProperties => Ok(CommandOutcome::Print(self.format_properties())),
            Command::ResetProperty(None) => {
                let count = self.properties.len();
                self.properties.clear();
                Ok(CommandOutcome::Print(format!("Reset {} properties", count)))
            },
            Command::ResetProperty(Some(key)) => match self.properties.remove(&key) {
                Some(_) => Ok(CommandOutcome::Print(format!("Property '{}' reset", key))),
                None => Ok(CommandOutcome::Print(format!("Property '{}' was not set", key))),
            },
            Command::Quit => Ok(CommandOutcome::Quit),
            Command::Help => Ok(CommandOutcome::Print(Self::help_text())),
            Command::Config => Ok(CommandOutcome::Print(self.config_display.clone())),
            Command::Mode(mode) => {
                let table_mode = match mode {
                    Some(ViewMode::Table) => true,
                    Some(ViewMode::Changelog) => false,
                    None => !self.settings.table_mode,
                };
                self.set_table_mode(table_mode);
                let name = if table_mode { "table" } else { "changelog" };
                Ok(CommandOutcome::Print(format!("View mode: {}", name)))
            },
            Command::SetFormat(format) => {
                let parsed = OutputFormat::parse(&format).ok_or_else(|| {
                    CLIError::ParseError(format!(
                        "Unknown format '{}', expected table, json or csv",
                        format
                    ))
                })?;
                self.formatter.set_format(parsed);
                Ok(CommandOutcome::Print(format!("Output format: {}", parsed.as_str())))
            },
            Command::NextPage => {
                let fetcher = self.active_fetcher()?;
                let outcome = fetcher.fetch_next_page().await?;
                if outcome.rows_appended == 0 && !outcome.has_more {
                    return Ok(CommandOutcome::Print("No more results".to_string()));
                }
                Ok(CommandOutcome::ShowResults)
            },
            Command::Show => {
                self.active_fetcher()?;
                Ok(CommandOutcome::ShowResults)
            },
            Command::Status => match self.fetcher.as_mut() {
                Some(fetcher) => {
                    let statement = fetcher.refresh_status().await?;
                    let mut output = self.formatter.format_statement_status(statement);
                    let store = fetcher.store();
                    output.push_str(&format!(
                        "\nRows:      {} in table, {} in changelog (capacity {})",
                        store.table_len(),
                        store.changelog_len(),
                        store.max_capacity()
                    ));
                    Ok(CommandOutcome::Print(output))
                },
                None => Ok(CommandOutcome::Print(format!(
                    "No active statement\nGateway:   {}\nCLI:       {}",
                    self.gateway_url, CLI_VERSION
                ))),
            },
            Command::Stop => {
                let fetcher = self.active_fetcher()?;
                fetcher.stop().await?;
                let name = fetcher.statement().name.clone();
                Ok(CommandOutcome::Print(format!("Statement '{}' stopped", name)))
            },
            Command::Unknown(cmd) => Err(CLIError::ParseError(format!(
                "Unknown command: {}. Type \\help for help.",
                cmd
            ))),
        }
    }

    fn active_fetcher(&mut self) -> Result<&mut ResultFetcher> {
        self.fetcher
            .as_mut()
            .ok_or_else(|| CLIError::ParseError("No statement results; run a query first".into()))
    }

    fn set_table_mode(&mut self, table_mode: bool) {
        self.settings.table_mode = table_mode;
        if let Some(fetcher) = self.fetcher.as_mut() {
            fetcher.store_mut().set_table_mode(table_mode);
        }
    }

    /// Replace the current statement with a new one.
    async fn start_statement(&mut self, sql: &str) -> Result<()> {
        if let Some(mut previous) = self.fetcher.take() {
            previous.close().await;
        }
        self.view.reset();
        self.view_notice = None;

        let spinner = self.spinner.then(|| Self::create_spinner("Submitting statement..."));
        let started = ResultFetcher::start(
            Arc::clone(&self.gateway),
            sql,
            &self.properties,
            &self.settings,
            &mut self.watcher,
        )
        .await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        self.fetcher = Some(started?);
        Ok(())
    }

    fn create_spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn format_properties(&self) -> String {
        if self.properties.is_empty() {
            return "No properties set".to_string();
        }
        let mut entries: Vec<_> = self.properties.iter().collect();
        entries.sort();
        entries
            .into_iter()
            .map(|(key, value)| format!("'{}' = '{}'", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run a script non-interactively, writing results to `out`.
    ///
    /// Each query is fetched up to the configured page limit, printed in the
    /// current output format and closed. The first error stops the script.
    pub async fn execute_batch_to(&mut self, script: &str, out: &mut impl Write) -> Result<()> {
        for statement in split_statements(script) {
            log::debug!("[SESSION] Batch statement: {}", statement);
            match self.parser.parse(&statement)? {
                Command::Sql(sql) => {
                    self.start_statement(&sql).await?;
                    let output = self.drain_current().await;
                    if let Some(mut fetcher) = self.fetcher.take() {
                        fetcher.close().await;
                    }
                    writeln!(out, "{}", output?)?;
                },
                command => match self.execute_command(command).await? {
                    CommandOutcome::Print(text) => writeln!(out, "{}", text)?,
                    CommandOutcome::ShowResults => {
                        if let Some(fetcher) = self.fetcher.as_ref() {
                            writeln!(out, "{}", self.formatter.format_store(fetcher.store())?)?;
                        }
                    },
                    CommandOutcome::Quit => break,
                },
            }
        }
        Ok(())
    }

    pub async fn execute_batch(&mut self, script: &str) -> Result<()> {
        let mut stdout = std::io::stdout();
        self.execute_batch_to(script, &mut stdout).await
    }

    /// Fetch remaining pages up to the batch limit and render the store.
    async fn drain_current(&mut self) -> Result<String> {
        let Some(fetcher) = self.fetcher.as_mut() else {
            return Ok(String::new());
        };
        while fetcher.has_more() && fetcher.pages_fetched() < self.batch_max_pages {
            fetcher.fetch_next_page().await?;
        }
        if fetcher.has_more() {
            log::info!(
                "[SESSION] Stopped after {} pages of '{}'",
                fetcher.pages_fetched(),
                fetcher.statement().name
            );
        }
        self.formatter.format_store(fetcher.store())
    }

    /// Interactive prompt loop.
    ///
    /// Returns an error only when the session has to end abnormally, i.e.
    /// the gateway rejected the credentials.
    pub async fn run_interactive(&mut self) -> Result<()> {
        self.print_banner();

        let mut rl = DefaultEditor::new()?;
        match self.history.load() {
            Ok(entries) => {
                for entry in entries {
                    let _ = rl.add_history_entry(entry.as_str());
                }
            },
            Err(e) => log::warn!("[SESSION] {}", e),
        }

        let result = self.prompt_loop(&mut rl).await;

        if let Some(mut fetcher) = self.fetcher.take() {
            fetcher.close().await;
        }
        self.watcher.stop();
        result
    }

    async fn prompt_loop(&mut self, rl: &mut DefaultEditor) -> Result<()> {
        let mut accumulated = String::new();

        loop {
            let prompt = if accumulated.is_empty() {
                self.primary_prompt()
            } else {
                "        -> ".to_string()
            };

            let line = match rl.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    if accumulated.is_empty() {
                        println!("{}", "Use \\quit or \\q to exit".dimmed());
                    } else {
                        println!("{}", "Command cancelled".yellow());
                        accumulated.clear();
                    }
                    continue;
                },
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            let line = line.trim();
            if line.is_empty() && accumulated.is_empty() {
                continue;
            }
            if !accumulated.is_empty() {
                accumulated.push('\n');
            }
            accumulated.push_str(line);

            // Meta-commands are single-line; SQL runs once terminated by ';'
            let complete = accumulated.starts_with('\\') || line.ends_with(';') || line.is_empty();
            if !complete {
                continue;
            }
            let command = std::mem::take(&mut accumulated);
            let command = command.trim();

            let _ = rl.add_history_entry(command);
            if let Err(e) = self.history.append(command) {
                log::warn!("[SESSION] {}", e);
            }

            match self.execute(command).await {
                Ok(CommandOutcome::Print(text)) => println!("{}", text),
                Ok(CommandOutcome::ShowResults) => self.show_results().await?,
                Ok(CommandOutcome::Quit) => break,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => eprintln!("{}", self.formatter.format_error(&e.to_string())),
            }
        }

        if self.color {
            println!("{}", "Goodbye!".cyan());
        } else {
            println!("Goodbye!");
        }
        Ok(())
    }

    /// Hand the terminal to the results view until the user leaves it.
    ///
    /// Each action that needs the gateway returns control here; the view is
    /// re-entered once the call finished.
    async fn show_results(&mut self) -> Result<()> {
        self.surface = Surface::Table;
        let result = self.results_loop().await;
        self.surface = Surface::Prompt;
        result
    }

    async fn results_loop(&mut self) -> Result<()> {
        loop {
            let Some(fetcher) = self.fetcher.as_mut() else {
                return Ok(());
            };

            let mut status = fetcher.status_line();
            if let Some(notice) = self.view_notice.take() {
                status.push_str(&format!(" | ✗ {}", notice));
            }

            match self.view.run(fetcher.store(), &status)? {
                ViewAction::Quit => return Ok(()),
                ViewAction::ToggleMode => {
                    let table_mode = !fetcher.store().is_table_mode();
                    self.set_table_mode(table_mode);
                },
                ViewAction::NextPage => self.next_page_for_view().await?,
            }
        }
    }

    /// Page request from the results view. Failures other than an
    /// unauthorized gateway are shown as a notice and the view stays open.
    async fn next_page_for_view(&mut self) -> Result<()> {
        let Some(fetcher) = self.fetcher.as_mut() else {
            return Ok(());
        };
        match fetcher.fetch_next_page().await {
            Ok(outcome) if !outcome.has_more && outcome.rows_appended == 0 => {
                self.view_notice = Some("no more results".to_string());
            },
            Ok(_) => {},
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::warn!("[SESSION] Page fetch failed: {}", e);
                self.view_notice = Some(e.to_string());
            },
        }
        Ok(())
    }

    fn primary_prompt(&self) -> String {
        let running = self
            .fetcher
            .as_ref()
            .map(|f| !f.statement().phase().is_terminal() && !f.is_stopped())
            .unwrap_or(false);

        if !self.color || cfg!(target_os = "windows") {
            return if running {
                "streamsql* > ".to_string()
            } else {
                "streamsql > ".to_string()
            };
        }
        let marker = if running {
            "●".green().bold().to_string()
        } else {
            "○".dimmed().to_string()
        };
        format!("{} {} ", marker, "streamsql>".bright_blue().bold())
    }

    fn print_banner(&self) {
        println!();
        if self.color {
            println!("  {}", "streamsql - streaming SQL terminal".white().bold());
            println!("  {}", format!("Gateway: {}", self.gateway_url).cyan());
            println!("  {}", format!("CLI version: {}", CLI_VERSION).dimmed());
            println!(
                "  Type {} for help, {} to exit",
                "\\help".cyan().bold(),
                "\\quit".cyan().bold()
            );
        } else {
            println!("  streamsql - streaming SQL terminal");
            println!("  Gateway: {}", self.gateway_url);
            println!("  CLI version: {}", CLI_VERSION);
            println!("  Type \\help for help, \\quit to exit");
        }
        println!();
    }

    fn help_text() -> String {
        [
            "SQL statements end with ';' and may span several lines.",
            "",
            "Statement properties:",
            "  SET 'key' = 'value';     Set a property for following statements",
            "  SET;                     List properties",
            "  RESET ['key'];           Remove one or all properties",
            "",
            "Meta-commands:",
            "  \\help, \\h, \\?           Show this help",
            "  \\quit, \\q               Exit",
            "  \\show                   Re-open the results view",
            "  \\next, \\n               Fetch the next page of results",
            "  \\mode [table|changelog] Toggle or select the results view",
            "  \\format table|json|csv  Output format for printed results",
            "  \\status                 Statement status",
            "  \\stop                   Stop the running statement",
            "  \\config                 Show configuration",
            "",
            "Results view keys:",
            "  ↑↓ PgUp PgDn Home End    Scroll",
            "  n                        Next page",
            "  m, Tab                   Toggle table / changelog",
            "  q, Esc                   Back to the prompt",
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock_gateway::{change, insert, MockGateway};
    use streamsql_link::{LinkTimeouts, Operation, StatementPhase};

    fn test_session(gateway: &Arc<MockGateway>, format: OutputFormat) -> CLISession {
        let gateway: Arc<dyn StatementGateway> = gateway.clone();
        CLISession::new(
            gateway,
            SessionOptions {
                gateway_url: "http://gateway.test".into(),
                format,
                fetcher: FetcherSettings {
                    max_capacity: 100,
                    table_mode: true,
                    timeouts: LinkTimeouts::builder()
                        .poll_interval(Duration::from_millis(5))
                        .build(),
                },
                batch_max_pages: 3,
                config_display: "[results]\nmax_capacity = 100".into(),
                ..SessionOptions::default()
            },
        )
    }

    async fn run_batch(session: &mut CLISession, script: &str) -> Result<String> {
        let mut out = Vec::new();
        session.execute_batch_to(script, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_batch_fetches_all_pages_and_closes() {
        let gateway = Arc::new(MockGateway::new().with_pages(vec![
            vec![insert(1), insert(2)],
            vec![change(Operation::Delete, 1)],
        ]));
        let mut session = test_session(&gateway, OutputFormat::Csv);

        let output = run_batch(&mut session, "SELECT id FROM t;").await.unwrap();
        assert_eq!(output, "id\n2\n\n");
        assert_eq!(gateway.result_requests().len(), 2);
        assert_eq!(gateway.deleted(), vec!["stmt-1"]);
        assert!(session.current_statement().is_none());
    }

    #[tokio::test]
    async fn test_batch_page_limit() {
        let gateway = Arc::new(MockGateway::new().open_ended().with_pages(vec![
            vec![insert(1)],
            vec![insert(2)],
            vec![insert(3)],
            vec![insert(4)],
        ]));
        let mut session = test_session(&gateway, OutputFormat::Csv);

        let output = run_batch(&mut session, "SELECT id FROM t").await.unwrap();
        assert_eq!(output, "id\n1\n2\n3\n\n");
        assert_eq!(gateway.result_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_changelog_mode_in_batch() {
        let gateway = Arc::new(MockGateway::new().with_pages(vec![vec![
            insert(1),
            change(Operation::UpdateBefore, 1),
            change(Operation::UpdateAfter, 5),
        ]]));
        let mut session = test_session(&gateway, OutputFormat::Csv);

        let output = run_batch(&mut session, "\\mode changelog\nSELECT id FROM t;")
            .await
            .unwrap();
        assert_eq!(output, "View mode: changelog\nOperation,id\n+I,1\n-U,1\n+U,5\n\n");
    }

    #[tokio::test]
    async fn test_set_properties_flow_into_statements() {
        let gateway = Arc::new(MockGateway::new().with_pages(vec![vec![]]));
        let mut session = test_session(&gateway, OutputFormat::Csv);

        run_batch(
            &mut session,
            "SET 'sql.current-catalog' = 'prod'; SET 'a' = 'b'; RESET 'a'; SELECT 1;",
        )
        .await
        .unwrap();

        let created = gateway.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].1.len(), 1);
        assert_eq!(
            created[0].1.get("sql.current-catalog").map(String::as_str),
            Some("prod")
        );
    }

    #[tokio::test]
    async fn test_show_and_reset_properties() {
        let gateway = Arc::new(MockGateway::new());
        let mut session = test_session(&gateway, OutputFormat::Table);

        assert_eq!(
            session.execute("SET").await.unwrap(),
            CommandOutcome::Print("No properties set".into())
        );
        session.execute("SET 'b' = '2'").await.unwrap();
        session.execute("SET 'a' = '1'").await.unwrap();
        assert_eq!(
            session.execute("SET;").await.unwrap(),
            CommandOutcome::Print("'a' = '1'\n'b' = '2'".into())
        );
        assert_eq!(
            session.execute("RESET").await.unwrap(),
            CommandOutcome::Print("Reset 2 properties".into())
        );
        assert!(session.properties().is_empty());
    }

    #[tokio::test]
    async fn test_interactive_statement_flow() {
        let gateway = Arc::new(
            MockGateway::new()
                .open_ended()
                .with_pages(vec![vec![insert(1)], vec![insert(2)]]),
        );
        let mut session = test_session(&gateway, OutputFormat::Csv);

        assert_eq!(
            session.execute("SELECT id FROM t;").await.unwrap(),
            CommandOutcome::ShowResults
        );
        assert_eq!(session.surface(), Surface::Prompt);
        assert_eq!(session.current_statement().unwrap().store().size(), 1);

        // Pages are only fetched on request
        assert_eq!(gateway.result_requests().len(), 1);
        assert_eq!(
            session.execute("\\next").await.unwrap(),
            CommandOutcome::ShowResults
        );
        assert_eq!(session.current_statement().unwrap().store().size(), 2);

        assert_eq!(
            session.execute("\\stop").await.unwrap(),
            CommandOutcome::Print("Statement 'stmt-1' stopped".into())
        );
        assert_eq!(
            session.execute("\\next").await.unwrap(),
            CommandOutcome::Print("No more results".into())
        );
    }

    #[tokio::test]
    async fn test_new_statement_closes_previous() {
        let gateway = Arc::new(MockGateway::new().open_ended().with_pages(vec![vec![insert(1)]]));
        let mut session = test_session(&gateway, OutputFormat::Csv);

        session.execute("SELECT 1;").await.unwrap();
        session.execute("SELECT 2;").await.unwrap();
        assert_eq!(gateway.deleted(), vec!["stmt-1"]);
        assert_eq!(
            session.current_statement().unwrap().statement().name,
            "stmt-2"
        );
    }

    #[tokio::test]
    async fn test_mode_applies_to_current_store() {
        let gateway = Arc::new(MockGateway::new().with_pages(vec![vec![insert(1)]]));
        let mut session = test_session(&gateway, OutputFormat::Csv);
        session.execute("SELECT 1;").await.unwrap();

        session.execute("\\mode").await.unwrap();
        let store = session.current_statement().unwrap().store();
        assert!(!store.is_table_mode());
        assert_eq!(store.headers(), vec!["Operation", "id"]);
    }

    #[tokio::test]
    async fn test_result_commands_need_a_statement() {
        let gateway = Arc::new(MockGateway::new());
        let mut session = test_session(&gateway, OutputFormat::Table);

        for command in ["\\next", "\\show", "\\stop"] {
            let err = session.execute(command).await.err().unwrap();
            assert!(!err.is_fatal());
        }
        match session.execute("\\status").await.unwrap() {
            CommandOutcome::Print(text) => assert!(text.contains("http://gateway.test")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_format_and_config_commands() {
        let gateway = Arc::new(MockGateway::new());
        let mut session = test_session(&gateway, OutputFormat::Table);

        assert_eq!(
            session.execute("\\format json").await.unwrap(),
            CommandOutcome::Print("Output format: json".into())
        );
        assert!(session.execute("\\format yaml").await.is_err());
        assert_eq!(
            session.execute("\\config").await.unwrap(),
            CommandOutcome::Print("[results]\nmax_capacity = 100".into())
        );
        assert_eq!(session.execute("\\q").await.unwrap(), CommandOutcome::Quit);
        assert!(session.execute("\\bogus").await.is_err());
    }

    #[tokio::test]
    async fn test_unauthorized_is_fatal_and_other_errors_are_not() {
        let gateway = Arc::new(MockGateway::new().failing_create(401));
        let mut session = test_session(&gateway, OutputFormat::Csv);
        let err = session.execute("SELECT 1;").await.err().unwrap();
        assert!(err.is_fatal());

        let gateway = Arc::new(MockGateway::new().failing_create(500));
        let mut session = test_session(&gateway, OutputFormat::Csv);
        let err = session.execute("SELECT 1;").await.err().unwrap();
        assert!(!err.is_fatal());
        assert!(session.current_statement().is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_page_fetch_ends_session() {
        let gateway = Arc::new(MockGateway::new().open_ended().with_pages(vec![vec![insert(1)]]));
        let mut session = test_session(&gateway, OutputFormat::Csv);
        session.execute("SELECT 1;").await.unwrap();

        gateway.failing_results(Some(401));
        let err = session.execute("\\next").await.err().unwrap();
        assert!(err.is_fatal());
        assert!(matches!(err, CLIError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_view_page_errors_become_notice_unless_unauthorized() {
        let gateway = Arc::new(MockGateway::new().open_ended().with_pages(vec![vec![insert(1)]]));
        let mut session = test_session(&gateway, OutputFormat::Csv);
        session.execute("SELECT 1;").await.unwrap();

        gateway.failing_results(Some(503));
        session.next_page_for_view().await.unwrap();
        assert!(session.view_notice.take().is_some());

        gateway.failing_results(Some(401));
        let err = session.next_page_for_view().await.err().unwrap();
        assert!(err.is_fatal());
        assert!(session.view_notice.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_status_poll_is_fatal() {
        let gateway = Arc::new(
            MockGateway::new()
                .created_pending_then(vec![StatementPhase::Pending])
                .failing_get(401),
        );
        let mut session = test_session(&gateway, OutputFormat::Csv);
        let err = session.execute("SELECT 1;").await.err().unwrap();
        assert!(matches!(err, CLIError::Unauthorized(_)));
        assert!(session.current_statement().is_none());
    }

    #[tokio::test]
    async fn test_batch_stops_at_first_error() {
        let gateway = Arc::new(MockGateway::new().failing_create(500));
        let mut session = test_session(&gateway, OutputFormat::Csv);

        let err = run_batch(&mut session, "SELECT 1; SET 'a' = 'b';")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CLIError::LinkError(_)));
        assert!(session.properties().is_empty());
    }
}
