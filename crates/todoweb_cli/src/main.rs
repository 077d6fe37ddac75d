use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, IsTerminal, StdinLock};
use time::UtcOffset;
use todoweb_cli::cli::{Cli, Command, split_command_line};
use todoweb_cli::terminal::{OutputFormat, Terminal, task_detail};
use todoweb_core::config::{apply_env, load_config_with_fallback, merge_overrides, require_api_url};
use todoweb_core::controller::{Event, NOT_EDITING, Phase};
use todoweb_core::error::AppError;
use todoweb_core::notify::{NoopNotifier, Notifier, notifier_from_env};
use todoweb_core::remote::HttpTaskStore;
use todoweb_core::session::{Session, TaskRef};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TODOWEB_LOG";

type App = Session<HttpTaskStore, Terminal<StdinLock<'static>>>;

fn init_tracing(verbose: u8, quiet: u8) {
    let default_level = if quiet >= 1 {
        "error"
    } else if verbose >= 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing already initialized: {err}");
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn build_notifier(enabled: bool) -> Box<dyn Notifier> {
    notifier_from_env(enabled).unwrap_or_else(|err| {
        warn!(error = %err, "desktop notifications unavailable");
        Box::new(NoopNotifier)
    })
}

/// Runs the initial load without painting the list. Returns `false` when the
/// load failed; the error notice has been shown by then.
async fn ensure_loaded(session: &mut App) -> bool {
    if session.state().load_attempted() {
        return true;
    }

    session.surface_mut().set_muted(true);
    session.dispatch(Event::Refresh).await;
    session.surface_mut().set_muted(false);
    session.state().phase() != Phase::ErrorShown
}

async fn run_command(session: &mut App, command: Command) -> Result<(), AppError> {
    match command {
        Command::List => session.dispatch(Event::Refresh).await,
        Command::Add { title, description } => {
            session
                .dispatch(Event::SubmitCreate {
                    title: title.unwrap_or_default(),
                    description: description.unwrap_or_default(),
                })
                .await
        }
        Command::Edit {
            target,
            title,
            description,
            completed,
            pending,
        } => {
            let targeted = target.is_some();
            if let Some(target) = target {
                let reference: TaskRef = target.parse()?;
                if !ensure_loaded(session).await {
                    return Ok(());
                }
                let id = session.resolve(&reference)?;
                session.dispatch(Event::OpenEdit(id)).await;
            }

            let Some(draft) = session.state().editor().cloned() else {
                if targeted {
                    return Ok(());
                }
                return Err(AppError::invalid_input(format!(
                    "{NOT_EDITING}; pass a row number or id"
                )));
            };

            let completed = if completed {
                true
            } else if pending {
                false
            } else {
                draft.completed
            };
            session
                .dispatch(Event::SubmitEdit {
                    title: title.unwrap_or(draft.title),
                    description: description.unwrap_or(draft.description),
                    completed,
                })
                .await
        }
        Command::Delete { target, yes } => {
            let reference: TaskRef = target.parse()?;
            if matches!(reference, TaskRef::Row(_)) && !ensure_loaded(session).await {
                return Ok(());
            }
            let id = session.resolve(&reference)?;

            session.surface_mut().set_assume_yes(yes);
            session.dispatch(Event::RequestDelete(id)).await;
            session.surface_mut().set_assume_yes(false);
        }
        Command::Show { target } => {
            let reference: TaskRef = target.parse()?;
            if matches!(reference, TaskRef::Row(_)) && !ensure_loaded(session).await {
                return Ok(());
            }
            let task = session.show(&reference).await?;
            let detail = task_detail(&task, session.surface().format(), session.offset())?;
            println!("{detail}");
        }
        Command::Cancel => session.dispatch(Event::CancelEdit).await,
    }

    Ok(())
}

async fn run_interactive(session: &mut App) -> Result<(), AppError> {
    session.dispatch(Event::Refresh).await;

    while let Some(input) = session.surface_mut().read_line()? {
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("todoweb".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        let Some(command) = cli.command else {
            debug!("line without a command ignored");
            continue;
        };

        if let Err(err) = run_command(session, command).await {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

async fn run(cli: Cli, offset: UtcOffset) -> Result<i32, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        warn!(error = %err, "config file ignored, using defaults");
    }
    let config = merge_overrides(&apply_env(&loaded.config), &cli.overrides()?);

    let store = HttpTaskStore::new(require_api_url(&config)?)?;
    debug!(api_url = %store.base_url(), theme = config.theme().name(), "starting");

    let format = OutputFormat::from_flags(cli.json, cli.html);
    let terminal = Terminal::new(io::stdin().lock(), format, config.theme().palette());
    let mut session = Session::new(store, terminal)
        .with_notifier(build_notifier(config.desktop_notifications))
        .with_offset(offset);

    match cli.command {
        None => {
            run_interactive(&mut session).await?;
            Ok(0)
        }
        Some(command) => {
            run_command(&mut session, command).await?;
            Ok(if session.errors_shown() > 0 { 1 } else { 0 })
        }
    }
}

fn main() {
    // Read before the runtime exists; the lookup refuses to run once other
    // threads are alive.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("ERROR: {}", AppError::io(err.to_string()));
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(cli, offset)) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    }
}
