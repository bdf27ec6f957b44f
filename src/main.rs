use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use faktorquiz::{
    app::App,
    app_dirs::AppDirs,
    codec,
    form::{SettingsControls, SettingsForm},
    logging,
    question::MAX_ATTEMPTS,
    runtime::{CrosstermEventSource, Flow, QuizEvent, Runner, TICK_RATE_MS},
    session::SessionTuning,
    settings::{parse_names, Settings},
    store::{FileStore, KeyValueStore, SettingsCache},
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    rc::Rc,
    time::{Duration, Instant},
};

/// classroom quiz for percentage and growth factors
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A classroom quiz for percentage and growth factors. Names are called in fair rotation, and every quiz can be shared and resumed through a token."
)]
pub struct Cli {
    /// quiz token, or a link fragment starting with `#`, to open directly
    token: Option<String>,

    /// participants, separated by commas
    #[clap(short = 'n', long)]
    names: Option<String>,

    /// lowest percentage to ask about
    #[clap(long, allow_negative_numbers = true)]
    from: Option<f64>,

    /// highest percentage to ask about
    #[clap(long, allow_negative_numbers = true)]
    to: Option<f64>,

    /// seconds before an unanswered question counts as wrong
    #[clap(short = 't', long)]
    timeout: Option<f64>,

    /// ask with one decimal of precision
    #[clap(long)]
    comma: bool,

    /// ask for growth factors (increase/decrease) instead of plain factors
    #[clap(long)]
    growth: bool,

    /// show the factor and ask for the percentage
    #[clap(long)]
    reverse: bool,

    /// print the quiz token for the resulting settings and exit
    #[clap(long)]
    print_token: bool,

    /// where settings and counters are kept between runs
    #[clap(long)]
    state_file: Option<PathBuf>,

    /// milliseconds during which repeated answers are ignored
    #[clap(long, default_value_t = 1500)]
    debounce_ms: u64,

    /// milliseconds a resolved question stays on screen
    #[clap(long, default_value_t = 1500)]
    advance_delay_ms: u64,

    /// draws before giving up on a range that only yields negative factors
    #[clap(long, default_value_t = MAX_ATTEMPTS)]
    max_attempts: usize,

    /// seed the question generator for a reproducible quiz
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Layer the command line on top of stored settings
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(names) = &self.names {
            settings.names = parse_names(names);
        }
        if let Some(from) = self.from {
            settings.from = from;
        }
        if let Some(to) = self.to {
            settings.to = to;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout = timeout;
        }
        settings.comma |= self.comma;
        settings.growth |= self.growth;
        settings.reverse |= self.reverse;
    }

    fn tuning(&self) -> SessionTuning {
        SessionTuning {
            debounce: Duration::from_millis(self.debounce_ms),
            advance_delay: Duration::from_millis(self.advance_delay_ms),
            max_attempts: self.max_attempts,
        }
    }

    fn store(&self) -> Rc<dyn KeyValueStore> {
        match &self.state_file {
            Some(path) => Rc::new(FileStore::with_path(path)),
            None => Rc::new(FileStore::new()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let cache = SettingsCache::new(cli.store());

    let mut settings = cache.load().unwrap_or_default();
    cli.apply_to(&mut settings);

    if cli.print_token {
        print_token(&settings);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init(&AppDirs::log_path())?;
    info!("faktorquiz {} starting", env!("CARGO_PKG_VERSION"));

    let mut app = App::new(cache, cli.tuning());
    if let Some(seed) = cli.seed {
        app = app.with_seed(seed);
    }
    app.prefill(|form| form.write_settings(&settings));
    if cli.token.is_some() {
        app.open(cli.token.as_deref(), Instant::now())?;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    if let Some(fragment) = app.fragment() {
        println!("{fragment}");
    }
    Ok(())
}

/// Settings as the start button would read them, printed as a fragment
fn print_token(settings: &Settings) {
    let mut form = SettingsForm::default();
    form.write_settings(settings);
    let settings = match form.read_settings() {
        Ok(settings) => settings,
        Err(err) => Cli::command()
            .error(ErrorKind::ValueValidation, err)
            .exit(),
    };
    if !settings.has_names() {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "no participants; pass --names",
            )
            .exit();
    }
    println!("{}", codec::fragment(&settings));
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    runner.run(|event| -> Result<Flow, Box<dyn Error>> {
        let now = Instant::now();
        let flow = match event {
            QuizEvent::Key(key) => app.on_key(key, now)?,
            QuizEvent::Tick => app.on_tick(now)?,
            QuizEvent::Resize => Flow::Continue,
        };
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        Ok(flow)
    })
}
