use std::io::{self, BufRead, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::UtcOffset;
use todoweb_core::config::Palette;
use todoweb_core::error::AppError;
use todoweb_core::model::{Task, TaskStatus};
use todoweb_core::notify::{Notice, NoticeLevel};
use todoweb_core::render::html::{task_to_html, to_html};
use todoweb_core::render::{EMPTY_STATE, ListView, Page, format_created, strip_control};
use todoweb_core::session::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Html,
}

impl OutputFormat {
    pub fn from_flags(json: bool, html: bool) -> Self {
        if json {
            Self::Json
        } else if html {
            Self::Html
        } else {
            Self::Table
        }
    }
}

/// Text destined for each stream after painting one page.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

/// Terminal front end: paints pages on stdout/stderr and reads answers
/// from `input`.
pub struct Terminal<R> {
    input: R,
    format: OutputFormat,
    palette: Palette,
    assume_yes: bool,
    muted: bool,
}

impl<R: BufRead> Terminal<R> {
    pub fn new(input: R, format: OutputFormat, palette: Palette) -> Self {
        Self {
            input,
            format,
            palette,
            assume_yes: false,
            muted: false,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Answer yes to every confirmation until reset.
    pub fn set_assume_yes(&mut self, assume_yes: bool) {
        self.assume_yes = assume_yes;
    }

    /// While muted only banners are painted, never the list.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Next input line without its line ending, or `None` at end of input.
    pub fn read_line(&mut self) -> Result<Option<String>, AppError> {
        let mut line = String::new();
        let bytes = self
            .input
            .read_line(&mut line)
            .map_err(|err| AppError::io(err.to_string()))?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead> Surface for Terminal<R> {
    fn paint(&mut self, page: &Page) {
        let output = if self.muted {
            let banners_only = Page {
                banners: page.banners.clone(),
                list: None,
            };
            page_output(&banners_only, OutputFormat::Table, &self.palette)
        } else {
            page_output(page, self.format, &self.palette)
        };

        if !output.stderr.is_empty() {
            eprint!("{}", output.stderr);
        }
        if !output.stdout.is_empty() {
            print!("{}", output.stdout);
            io::stdout().flush().ok();
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{question} [y/N] ");
        io::stdout().flush().ok();

        match self.read_line() {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => {
                println!();
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Everything one paint writes, split by stream.
pub fn page_output(page: &Page, format: OutputFormat, palette: &Palette) -> Output {
    match format {
        OutputFormat::Json => Output {
            stdout: format!("{}\n", page_json(page)),
            stderr: String::new(),
        },
        OutputFormat::Html => Output {
            stdout: format!("{}\n", to_html(page)),
            stderr: String::new(),
        },
        OutputFormat::Table => {
            let mut output = Output::default();
            for notice in &page.banners {
                let stream = match notice.level {
                    NoticeLevel::Error => &mut output.stderr,
                    NoticeLevel::Success => &mut output.stdout,
                };
                stream.push_str(&banner_line(notice, palette));
                stream.push('\n');
            }
            if let Some(list) = page.list.as_ref() {
                output.stdout.push_str(&list_text(list, palette));
            }
            output
        }
    }
}

fn status_label(status: TaskStatus, palette: &Palette) -> String {
    match status {
        TaskStatus::Completed => palette.accentize(status.label()),
        TaskStatus::Pending => palette.mutedize(status.label()),
    }
}

fn banner_line(notice: &Notice, palette: &Palette) -> String {
    let message = strip_control(&notice.message);
    match notice.level {
        NoticeLevel::Error => palette.alertize(&format!("ERROR: {message}")),
        NoticeLevel::Success => palette.accentize(&message),
    }
}

fn page_json(page: &Page) -> serde_json::Value {
    match page.list.as_ref() {
        Some(list) => serde_json::json!({
            "notifications": page.banners,
            "todos": list.rows,
            "total": list.counts.total,
            "completed": list.counts.completed,
        }),
        None => serde_json::json!({
            "notifications": page.banners,
            "todos": serde_json::Value::Null,
        }),
    }
}

fn list_text(list: &ListView, palette: &Palette) -> String {
    let mut text = String::new();

    if list.is_empty() {
        text.push_str(&palette.mutedize(EMPTY_STATE));
        text.push('\n');
    } else {
        let rows = list.rows.iter().map(|row| TableRow {
            number: row.number,
            id: strip_control(&row.id),
            title: strip_control(&row.title),
            description: row
                .description
                .as_deref()
                .map(strip_control)
                .unwrap_or_default(),
            status: status_label(row.status, palette),
            created: row.created.clone(),
        });
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        text.push_str(&table.to_string());
        text.push('\n');
    }

    text.push_str(&palette.mutedize(&list.counts.to_string()));
    text.push('\n');
    text
}

/// Single record as printed by `show`.
pub fn task_detail(task: &Task, format: OutputFormat, offset: UtcOffset) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => return Ok(serde_json::to_string(task)?),
        OutputFormat::Html => return Ok(task_to_html(task, offset)),
        OutputFormat::Table => {}
    }

    let mut lines = vec![
        format!("ID: {}", strip_control(&task.id)),
        format!("Title: {}", strip_control(&task.title)),
        format!(
            "Description: {}",
            task.description_text().map(strip_control).unwrap_or_default()
        ),
        format!("Status: {}", task.status().label()),
        format!("Created: {}", format_created(&task.created_at, offset)),
    ];
    if let Some(updated) = task.updated_at.as_deref() {
        lines.push(format!("Updated: {}", format_created(updated, offset)));
    }
    Ok(lines.join("\n"))
}
