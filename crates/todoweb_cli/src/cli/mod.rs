use clap::{ArgAction, Parser, Subcommand};
use todoweb_core::config::{ConfigOverrides, parse_flag};
use todoweb_core::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "todoweb",
    author,
    version,
    about = "Client for a remote to-do list API",
    long_about = None
)]
pub struct Cli {
    /// Without a command, starts an interactive session
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true, conflicts_with = "html")]
    pub json: bool,

    /// Output an HTML fragment
    #[arg(long, global = true)]
    pub html: bool,

    /// Base URL of the task API (the collection endpoint)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// More log output (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and list all todos
    ///
    /// Example: todoweb list
    #[command(alias = "refresh")]
    List,
    /// Add a new todo
    ///
    /// Example: todoweb add "Buy milk" -d "2 liters"
    Add {
        title: Option<String>,
        #[arg(short = 'd', long)]
        description: Option<String>,
    },
    /// Edit a todo; fields not given keep their current value
    ///
    /// Example: todoweb edit 2 --title "Buy organic milk" --completed
    /// Example: todoweb edit 6f1c0d5e-... --pending
    Edit {
        /// Row number from the list, or a todo id (`id:17` for numeric ids)
        target: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(short = 'd', long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "pending")]
        completed: bool,
        #[arg(long)]
        pending: bool,
    },
    /// Delete a todo after confirmation
    ///
    /// Example: todoweb delete 2
    /// Example: todoweb delete 2 --yes
    /// Example: todoweb delete id:17 --yes
    Delete {
        /// Row number from the list, or a todo id (`id:17` for numeric ids)
        target: String,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show details of a todo
    ///
    /// Example: todoweb show 1
    Show {
        /// Row number from the list, or a todo id (`id:17` for numeric ids)
        target: String,
    },
    /// Close the edit form without saving
    Cancel,
}

impl Cli {
    /// Config values given on the command line. `--api-url` wins over
    /// `--config-override api_url=...`.
    pub fn overrides(&self) -> Result<ConfigOverrides, AppError> {
        let mut overrides = ConfigOverrides::default();

        for raw in &self.config_override {
            let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
            match parsed.target {
                ConfigOverrideTarget::ApiUrl => overrides.api_url = Some(parsed.value),
                ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
                ConfigOverrideTarget::DesktopNotifications => {
                    overrides.desktop_notifications = Some(parse_flag(&parsed.value))
                }
            }
        }

        if let Some(api_url) = self.api_url.as_ref() {
            overrides.api_url = Some(api_url.clone());
        }

        Ok(overrides)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    ApiUrl,
    Theme,
    DesktopNotifications,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let key = canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match key.as_str() {
        "api_url" | "url" => ConfigOverrideTarget::ApiUrl,
        "theme" => ConfigOverrideTarget::Theme,
        "desktop_notifications" | "notifications" => ConfigOverrideTarget::DesktopNotifications,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() && target == ConfigOverrideTarget::ApiUrl {
        return Err("api_url override cannot be empty".to_string());
    }

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits one interactive line into arguments, honoring double quotes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}
