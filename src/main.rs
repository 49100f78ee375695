use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use moviequiz::{
    app::App,
    app_dirs::{AppDirs, StatePaths},
    config::{Config, ConfigStore, FileConfigStore},
    history::GameLog,
    logging,
    movies::{BundledMoviesLoader, FileMoviesLoader, MovieQuestionFactory, MoviesLoader},
    runtime::InputQueue,
    source::QuestionSource,
    stats::{format_date, format_statistics, StatisticsEngine},
    store::{MemoryStatisticsStore, SqliteStatisticsStore, StatisticsStore},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 50;

/// movie rating trivia in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Ten yes/no questions per round about movie ratings. Your best round and overall accuracy are kept between sessions."
)]
pub struct Cli {
    /// JSON movie list to build questions from (defaults to the bundled list)
    #[clap(short = 'f', long)]
    questions_file: Option<PathBuf>,

    /// milliseconds to show whether an answer was right before moving on
    #[clap(short = 'd', long)]
    delay_ms: Option<u64>,

    /// seed for question selection, for repeatable rounds
    #[clap(long)]
    seed: Option<u64>,

    /// directory for the statistics database, round history and log
    #[clap(long)]
    state_dir: Option<PathBuf>,

    /// print overall statistics and exit
    #[clap(long)]
    stats: bool,

    /// print the last N rounds and exit
    #[clap(long, value_name = "N")]
    history: Option<usize>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line values win over the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(path) = &self.questions_file {
            config.questions_file = Some(path.clone());
        }
        if let Some(delay) = self.delay_ms {
            config.feedback_delay_ms = delay;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
    }

    let paths = AppDirs::state_paths(cli.state_dir.as_deref());

    if cli.stats || cli.history.is_some() {
        if let Err(e) = logging::init_stderr() {
            eprintln!("logging disabled: {e}");
        }
        return print_reports(&cli, &paths);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = logging::init_file(&paths.log) {
        eprintln!("logging disabled: {e}");
    }
    info!(?config, "starting quiz");

    let mut app = App::new(
        question_source(&config),
        StatisticsEngine::new(open_store(&paths)),
        |coordinator| {
            coordinator
                .with_feedback_delay(config.feedback_delay())
                .with_history(GameLog::new(&paths.history))
        },
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_quiz(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_quiz<B: Backend, Q: QuestionSource, S: StatisticsStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<Q, S>,
) -> Result<(), Box<dyn Error>> {
    let input = InputQueue::terminal(Duration::from_millis(TICK_RATE_MS));

    app.start()?;
    loop {
        terminal.draw(|f| f.render_widget(&app.view, f.area()))?;
        if !app.handle(input.next(), Instant::now())? {
            break;
        }
    }
    Ok(())
}

fn question_source(config: &Config) -> Box<dyn QuestionSource + Send> {
    let loader: Box<dyn MoviesLoader + Send> = match &config.questions_file {
        Some(path) => Box::new(FileMoviesLoader::new(path)),
        None => Box::new(BundledMoviesLoader),
    };
    let factory = MovieQuestionFactory::new(loader);
    match config.seed {
        Some(seed) => Box::new(factory.with_seed(seed)),
        None => Box::new(factory),
    }
}

/// The on-disk store, or an in-memory one if the database cannot be opened
fn open_store(paths: &StatePaths) -> Box<dyn StatisticsStore> {
    match SqliteStatisticsStore::open(&paths.db) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, path = %paths.db.display(), "statistics will not be saved");
            Box::new(MemoryStatisticsStore::new())
        }
    }
}

fn print_reports(cli: &Cli, paths: &StatePaths) -> Result<(), Box<dyn Error>> {
    if cli.stats {
        let engine = StatisticsEngine::new(open_store(paths));
        println!("{}", format_statistics(&engine.current_snapshot()));
    }

    if let Some(limit) = cli.history {
        let rounds = GameLog::new(&paths.history).recent(limit)?;
        if rounds.is_empty() {
            println!("No rounds played yet");
        }
        for round in rounds {
            println!(
                "{}  {}/{}",
                format_date(&round.timestamp),
                round.correct,
                round.total
            );
        }
    }

    Ok(())
}
