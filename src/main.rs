use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::mpsc::RecvTimeoutError,
    time::Duration,
};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use typ0::{
    app::{Action, App},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, Overrides},
    metrics::Timespan,
    runtime::{CrosstermEventSource, FixedTicker, ThokEvent, ThokEventSource},
    session::{Session, SessionEnd, POLL_RATE_MS},
    stats::StatsFile,
    thok::Thok,
    ui,
    words::{FixedWordSource, HttpWordSource, OfflineWordSource, WordSource},
};

const LOG_ENV: &str = "TYP0_LOG";

/// timed typing practice with per-letter, per-finger and per-word mistake statistics
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type random words against the clock. Every mistake is attributed to a letter, the finger that should have typed it and the word it belonged to, and the history of all sessions is kept in a plain text file."
)]
pub struct Cli {
    /// session length in seconds for this run
    #[clap(short = 's', long)]
    secs: Option<Timespan>,

    /// language code for the random words (e.g. en, de)
    #[clap(short = 'l', long)]
    lang: Option<String>,

    /// number of words to fetch per session
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// use the bundled word lists instead of the word API
    #[clap(long)]
    offline: bool,

    /// type this text instead of random words
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// statistics file to read and append to
    #[clap(long)]
    stats_file: Option<PathBuf>,

    /// log file (filter with TYP0_LOG, default info)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            timespan: self.secs,
            language: self.lang.clone(),
            word_count: self.words,
            offline: self.offline,
        }
    }

    fn word_source(&self, config: &Config) -> Box<dyn WordSource> {
        match &self.prompt {
            Some(text) => Box::new(FixedWordSource::from_text(text)),
            None if config.offline => Box::new(OfflineWordSource),
            None => Box::new(HttpWordSource::new(config.word_api_url.clone())),
        }
    }
}

/// Everything the main loop needs besides the terminal and the app state.
struct Context<E: ThokEventSource> {
    events: E,
    words: Box<dyn WordSource>,
    stats: StatsFile,
    store: Box<dyn ConfigStore>,
    /// Config as stored on disk, without the command line overrides.
    stored: Config,
    ticker: FixedTicker,
    next_session: u64,
}

fn init_logging(path: &Path) -> Option<WorkerGuard> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name()?;
    fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    let _log_guard = init_logging(&log_path);

    let store = FileConfigStore::new();
    let stored = store.load();
    let config = stored.clone().with_overrides(&cli.overrides());
    let stats = StatsFile::new(cli.stats_file.clone().unwrap_or_else(AppDirs::stats_path));
    info!(
        timespan = config.timespan_secs,
        lang = %config.language,
        offline = config.offline,
        stats = %stats.path().display(),
        "starting"
    );

    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        error!(%info, "panic");
        default_panic(info);
    }));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut ctx = Context {
        events: CrosstermEventSource::new(),
        words: cli.word_source(&config),
        stats,
        store: Box::new(store),
        stored,
        ticker: FixedTicker::seconds(),
        next_session: 1,
    };
    let mut app = App::new(config);
    let outcome = start_tui(&mut terminal, &mut app, &mut ctx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &outcome {
        error!(%err, "terminal loop failed");
    }
    info!("bye");
    outcome
}

fn start_tui<B: Backend, E: ThokEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    ctx: &mut Context<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(f, app, None))?;

    loop {
        let event = match ctx.events.recv_timeout(Duration::from_millis(POLL_RATE_MS)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match event {
            ThokEvent::Key(key) => match app.handle_key(key) {
                Action::None => {}
                Action::Quit => break,
                Action::Start(timespan) => play(terminal, app, ctx, timespan)?,
                Action::Configure(timespan) => {
                    ctx.stored.timespan_secs = timespan.secs();
                    if let Err(err) = ctx.store.save(&ctx.stored) {
                        warn!(%err, "could not save settings");
                        app.notice = Some(format!("settings not saved: {err}"));
                    }
                    play(terminal, app, ctx, timespan)?;
                }
                Action::LoadHistory => match ctx.stats.load() {
                    Ok(history) => app.show_history(history),
                    Err(err) => {
                        error!(%err, path = %ctx.stats.path().display(), "could not load statistics");
                        app.notice = Some(format!("statistics unavailable: {err}"));
                    }
                },
            },
            ThokEvent::Resize => {}
            // leftovers from a finished session's clock
            ThokEvent::Tick { .. } | ThokEvent::Deadline { .. } => continue,
        }

        terminal.draw(|f| ui::draw(f, app, None))?;
    }

    Ok(())
}

fn play<B: Backend, E: ThokEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    ctx: &mut Context<E>,
    timespan: Timespan,
) -> Result<(), Box<dyn Error>> {
    let words = ctx.words.fetch(app.config.word_count, &app.config.language);
    let id = ctx.next_session;
    ctx.next_session += 1;

    app.start_typing();
    let session = Session::new(id, Thok::new(words), timespan);
    let view: &App = app;
    let result = session.run(&ctx.events, ctx.ticker, |s| {
        terminal.draw(|f| ui::draw(f, view, Some(s))).map(|_| ())
    })?;

    if result.end == SessionEnd::Deadline {
        if let Err(err) = ctx.stats.append(&result) {
            error!(%err, path = %ctx.stats.path().display(), "could not save statistics");
            app.notice = Some(format!("statistics not saved: {err}"));
        }
    }
    app.show_results(result);
    Ok(())
}
