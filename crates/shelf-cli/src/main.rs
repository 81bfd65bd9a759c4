use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use shelf_search::prelude::*;
use shelf_search::BookRow;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "shelf=info,shelf_search=info";

const INTERACTIVE_HELP: &str = "\
Type a keyword and press enter; each line replaces the keyword.
Commands:
  :select N         pick suggestion N
  :type title|author
  :focus            reopen suggestions
  :dismiss          close suggestions
  :clear            clear the keyword
  :submit           submit the search
  :quit";

fn cli() -> Command {
    Command::new("shelf")
        .version(shelf_search::VERSION)
        .about("Book autocomplete against the storefront search endpoint")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Storefront API base URL (overrides config and SHELF_API_URL)"),
        )
        .arg(
            Arg::new("type")
                .long("type")
                .short('t')
                .global(true)
                .value_parser(["title", "author"])
                .help("Field to search"),
        )
        .subcommand(
            Command::new("lookup")
                .about("Run a single autocomplete lookup")
                .arg(
                    Arg::new("keyword")
                        .required(true)
                        .help("Keyword to look up"),
                ),
        )
        .subcommand(
            Command::new("interactive")
                .about("Drive a debounced autocomplete session from stdin")
                .arg(
                    Arg::new("quiet-ms")
                        .long("quiet-ms")
                        .value_parser(value_parser!(u64))
                        .help("Debounce quiet period in milliseconds"),
                )
                .arg(
                    Arg::new("no-help")
                        .long("no-help")
                        .action(ArgAction::SetTrue)
                        .help("Do not print the command summary"),
                ),
        )
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<ShelfConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ShelfConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ShelfConfig::new(),
    }
    .with_env_overrides();

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(search_type) = matches.get_one::<String>("type") {
        let search_type = search_type
            .parse::<SearchType>()
            .map_err(anyhow::Error::msg)?;
        config = config.with_search_type(search_type);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let matches = cli().get_matches();
    let mut config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("lookup", args)) => {
            config.validate()?;
            let keyword = args
                .get_one::<String>("keyword")
                .context("keyword is required")?;
            run_lookup(&config, keyword).await
        }
        Some(("interactive", args)) => {
            if let Some(quiet_ms) = args.get_one::<u64>("quiet-ms") {
                config = config.with_quiet_ms(*quiet_ms);
            }
            if !args.get_flag("no-help") {
                println!("{INTERACTIVE_HELP}");
                println!();
            }
            run_interactive(&config).await
        }
        _ => Ok(()),
    }
}

async fn run_lookup(config: &ShelfConfig, keyword: &str) -> Result<()> {
    let lookup = HttpBookLookup::new(config)?;
    tracing::info!(endpoint = %lookup.endpoint(), "using autocomplete endpoint");

    let books = lookup.lookup(keyword.trim(), config.search_type).await?;
    let view = if books.is_empty() {
        AutocompleteView::Empty
    } else {
        AutocompleteView::Results(books.iter().map(BookRow::from).collect())
    };
    println!("{}", view.render_text());
    Ok(())
}

async fn run_interactive(config: &ShelfConfig) -> Result<()> {
    let mut session = AutocompleteSession::connect(config)?;
    let mut snapshots = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = AutocompleteView::Hidden;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&mut session, &line) {
                    return Ok(());
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                snapshots.borrow_and_update();
            }
        }
        redraw(&session, &mut shown);
    }

    // Stdin closed: let the last keyword settle before exiting.
    if session.is_debouncing() {
        tokio::time::sleep(config.quiet_period() + Duration::from_millis(10)).await;
    }
    session.executor().settled().await;
    redraw(&session, &mut shown);
    Ok(())
}

/// Apply one input line; returns false on quit
fn handle_line<L>(session: &mut AutocompleteSession<L>, line: &str) -> bool
where
    L: BookLookup + 'static,
{
    let Some(command) = line.strip_prefix(':') else {
        session.input(line);
        return true;
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "q"), _) => return false,
        (Some("clear"), _) => session.clear(),
        (Some("focus"), _) => session.focus(),
        (Some("dismiss"), _) => session.dismiss(),
        (Some("select"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => match session.select_index(n - 1) {
                Some(book) => println!("selected: {} ({})", book.title, book.author),
                None => println!("no suggestion #{n}"),
            },
            _ => println!("usage: :select N"),
        },
        (Some("type"), Some(kind)) => match kind.parse::<SearchType>() {
            Ok(search_type) => session.set_search_type(search_type),
            Err(err) => println!("{err}"),
        },
        (Some("submit"), _) => match session.submit() {
            Submission::Book(book) => println!("submit: book #{} {}", book.id, book.title),
            Submission::Keyword(keyword) if keyword.is_empty() => println!("submit: nothing to search"),
            Submission::Keyword(keyword) => println!("submit: search \"{keyword}\""),
        },
        _ => println!("{INTERACTIVE_HELP}"),
    }
    true
}

fn redraw<L>(session: &AutocompleteSession<L>, shown: &mut AutocompleteView)
where
    L: BookLookup + 'static,
{
    let view = session.view();
    if view == *shown {
        return;
    }
    if !view.is_hidden() {
        println!("{}", view.render_text());
    }
    *shown = view;
}
