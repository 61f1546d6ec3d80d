//! Command parser for SQL and backslash commands
//!
//! Parses user input to distinguish between SQL statements, client-side
//! property statements (`SET` / `RESET`) and CLI meta-commands.

use crate::error::{CLIError, Result};

/// Which view of the result store to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Table,
    Changelog,
}

/// Parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// SQL statement sent to the gateway
    Sql(String),

    /// `SET 'key' = 'value'`: statement property for later statements
    SetProperty { key: String, value: String },

    /// Bare `SET`: list statement properties
    ShowProperties,

    /// `RESET` / `RESET 'key'`
    ResetProperty(Option<String>),

    /// Meta-commands (backslash commands)
    Quit,
    Help,
    Config,
    /// `\mode` toggles, `\mode table|changelog` selects
    Mode(Option<ViewMode>),
    SetFormat(String),
    NextPage,
    Show,
    Status,
    Stop,
    Unknown(String),
}

/// Command parser
pub struct CommandParser;

impl CommandParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a command line
    pub fn parse(&self, line: &str) -> Result<Command> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Err(CLIError::ParseError("Empty command".into()));
        }

        if trimmed.starts_with('\\') {
            return self.parse_meta_command(trimmed);
        }

        let statement = trimmed.trim_end_matches(';').trim();
        if let Some(command) = self.parse_property_statement(statement)? {
            return Ok(command);
        }

        Ok(Command::Sql(trimmed.to_string()))
    }

    /// Parse meta-commands (backslash commands)
    fn parse_meta_command(&self, line: &str) -> Result<Command> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Err(CLIError::ParseError("Invalid command".into()));
        }

        let command = parts[0];
        let args = parts.get(1..).unwrap_or(&[]);

        match command {
            "\\quit" | "\\q" => Ok(Command::Quit),
            "\\help" | "\\h" | "\\?" => Ok(Command::Help),
            "\\config" => Ok(Command::Config),
            "\\next" | "\\n" => Ok(Command::NextPage),
            "\\show" => Ok(Command::Show),
            "\\status" => Ok(Command::Status),
            "\\stop" => Ok(Command::Stop),
            "\\mode" => match args.first().map(|a| a.to_lowercase()) {
                None => Ok(Command::Mode(None)),
                Some(mode) if mode == "table" => Ok(Command::Mode(Some(ViewMode::Table))),
                Some(mode) if mode == "changelog" => Ok(Command::Mode(Some(ViewMode::Changelog))),
                Some(other) => Err(CLIError::ParseError(format!(
                    "\\mode expects table or changelog, got '{}'",
                    other
                ))),
            },
            "\\format" => {
                if args.is_empty() {
                    Err(CLIError::ParseError(
                        "\\format requires: table, json, or csv".into(),
                    ))
                } else {
                    Ok(Command::SetFormat(args[0].to_string()))
                }
            },
            _ => Ok(Command::Unknown(command.to_string())),
        }
    }

    /// Recognize `SET ...` and `RESET ...`. Anything else is left to the gateway.
    fn parse_property_statement(&self, statement: &str) -> Result<Option<Command>> {
        let (keyword, rest) = match statement.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (statement, ""),
        };

        if keyword.eq_ignore_ascii_case("SET") {
            if rest.is_empty() {
                return Ok(Some(Command::ShowProperties));
            }
            let (key, value) = rest.split_once('=').ok_or_else(|| {
                CLIError::ParseError("SET expects 'key' = 'value'".into())
            })?;
            let key = unquote(key.trim());
            if key.is_empty() {
                return Err(CLIError::ParseError("SET requires a property key".into()));
            }
            return Ok(Some(Command::SetProperty {
                key,
                value: unquote(value.trim()),
            }));
        }

        if keyword.eq_ignore_ascii_case("RESET") {
            let key = unquote(rest);
            return Ok(Some(Command::ResetProperty(if key.is_empty() {
                None
            } else {
                Some(key)
            })));
        }

        Ok(None)
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    for quote in ['\'', '"', '`'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

/// Split a script into statements on `;`, ignoring semicolons inside quotes
/// and `--` line comments. A line starting with `\` is a statement of its own.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            },
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    current.push(c);
                },
                '\\' if current.trim().is_empty() => {
                    // Meta-commands run to the end of their line
                    let mut command = String::from('\\');
                    for next in chars.by_ref() {
                        if next == '\n' {
                            break;
                        }
                        command.push(next);
                    }
                    statements.push(command.trim_end_matches(';').trim().to_string());
                    current.clear();
                },
                '-' if chars.peek() == Some(&'-') => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            current.push('\n');
                            break;
                        }
                    }
                },
                ';' => {
                    let statement = current.trim();
                    if !statement.is_empty() {
                        statements.push(statement.to_string());
                    }
                    current.clear();
                },
                _ => current.push(c),
            },
        }
    }

    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sql() {
        let parser = CommandParser::new();
        let cmd = parser.parse("SELECT * FROM orders").unwrap();
        assert_eq!(cmd, Command::Sql("SELECT * FROM orders".to_string()));
    }

    #[test]
    fn test_parse_quit() {
        let parser = CommandParser::new();
        assert_eq!(parser.parse("\\quit").unwrap(), Command::Quit);
        assert_eq!(parser.parse("\\q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_help() {
        let parser = CommandParser::new();
        assert_eq!(parser.parse("\\help").unwrap(), Command::Help);
        assert_eq!(parser.parse("\\h").unwrap(), Command::Help);
        assert_eq!(parser.parse("\\?").unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_mode() {
        let parser = CommandParser::new();
        assert_eq!(parser.parse("\\mode").unwrap(), Command::Mode(None));
        assert_eq!(
            parser.parse("\\mode CHANGELOG").unwrap(),
            Command::Mode(Some(ViewMode::Changelog))
        );
        assert_eq!(
            parser.parse("\\mode table").unwrap(),
            Command::Mode(Some(ViewMode::Table))
        );
        assert!(parser.parse("\\mode sideways").is_err());
    }

    #[test]
    fn test_parse_result_commands() {
        let parser = CommandParser::new();
        assert_eq!(parser.parse("\\next").unwrap(), Command::NextPage);
        assert_eq!(parser.parse("\\show").unwrap(), Command::Show);
        assert_eq!(parser.parse("\\status").unwrap(), Command::Status);
        assert_eq!(parser.parse("\\stop").unwrap(), Command::Stop);
        assert_eq!(
            parser.parse("\\format json").unwrap(),
            Command::SetFormat("json".to_string())
        );
        assert!(parser.parse("\\format").is_err());
    }

    #[test]
    fn test_parse_set_and_reset() {
        let parser = CommandParser::new();
        assert_eq!(
            parser.parse("SET 'sql.current-catalog' = 'prod';").unwrap(),
            Command::SetProperty {
                key: "sql.current-catalog".to_string(),
                value: "prod".to_string()
            }
        );
        assert_eq!(parser.parse("set").unwrap(), Command::ShowProperties);
        assert_eq!(parser.parse("RESET;").unwrap(), Command::ResetProperty(None));
        assert_eq!(
            parser.parse("reset 'a.b'").unwrap(),
            Command::ResetProperty(Some("a.b".to_string()))
        );
        assert!(parser.parse("SET 'a.b'").is_err());
    }

    #[test]
    fn test_settings_prefix_is_sql() {
        let parser = CommandParser::new();
        assert_eq!(
            parser.parse("SETTINGS").unwrap(),
            Command::Sql("SETTINGS".to_string())
        );
    }

    #[test]
    fn test_parse_unknown() {
        let parser = CommandParser::new();
        let cmd = parser.parse("\\unknown").unwrap();
        assert_eq!(cmd, Command::Unknown("\\unknown".to_string()));
    }

    #[test]
    fn test_empty_command() {
        let parser = CommandParser::new();
        assert!(parser.parse("").is_err());
        assert!(parser.parse("   ").is_err());
    }

    #[test]
    fn test_split_meta_commands_by_line() {
        let script = "\\mode changelog\nSELECT 1;\n  \\format csv;\nSELECT\n 2";
        assert_eq!(
            split_statements(script),
            vec!["\\mode changelog", "SELECT 1", "\\format csv", "SELECT\n 2"]
        );
    }

    #[test]
    fn test_split_statements() {
        let script = "SELECT 'a;b' FROM t; -- trailing; comment\nSELECT 2;\n\n;SELECT 3";
        assert_eq!(
            split_statements(script),
            vec!["SELECT 'a;b' FROM t", "SELECT 2", "SELECT 3"]
        );
    }
}
