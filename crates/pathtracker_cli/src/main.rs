use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{LevelFilter, debug, error};
use pathtracker_core::{Bootstrap, CampaignName, JsonFileStore, Report, Session, Step};
use pathtracker_render::{render_json, render_load_summary, render_text};

const PROMPT: &str = "PathTracker> ";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Campaign to load or create; prompted for when omitted.
    #[arg(value_name = "CAMPAIGN")]
    campaign: Option<String>,
    /// Directory holding one sub-directory per campaign.
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "PATHTRACKER_DATA_DIR",
        default_value = "data"
    )]
    data_dir: PathBuf,
    /// Run these newline-separated commands instead of reading stdin.
    #[arg(short = 'c', long = "commands", value_name = "LINES")]
    commands: Option<String>,
    /// Print each report as a JSON object.
    #[arg(long)]
    json: bool,
    /// Do not save the campaign on exit.
    #[arg(long = "no-save")]
    no_save: bool,
    #[arg(short, long)]
    verbose: bool,
}

/// Routes user-facing status lines. In JSON mode stdout carries only
/// reports, so status goes to stderr.
struct Console {
    json: bool,
}

impl Console {
    fn status(&self, line: &str) {
        if self.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn prompt(&self, text: &str) {
        if self.json {
            eprint!("{text}");
            // A failed flush only delays the prompt.
            let _ = io::stderr().flush();
        } else {
            print!("{text}");
            let _ = io::stdout().flush();
        }
    }

    fn report(&self, report: &Report) {
        if self.json {
            println!("{}", render_json(report));
            return;
        }
        for line in render_text(report) {
            println!("{line}");
        }
        // Lines that failed to parse never reached a command.
        if !matches!(report, Report::ParseFailed(_)) {
            println!();
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let console = Console { json: cli.json };
    let stdin = io::stdin();
    let interactive = cli.commands.is_none() && stdin.is_terminal();
    let mut stdin_lines = stdin.lock().lines();

    console.status("");
    console.status("Starting PathTracker...");

    let raw_name = match cli.campaign.clone() {
        Some(name) => name,
        None => {
            console.prompt("Choose a campaign to load or create: ");
            match stdin_lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    eprintln!("Error reading campaign name: {e}");
                    process::exit(1);
                }
                None => {
                    eprintln!("No campaign name given.");
                    process::exit(2);
                }
            }
        }
    };
    let name = CampaignName::new(&raw_name).unwrap_or_else(|e| {
        eprintln!("{}", e.message);
        process::exit(2);
    });

    let store = JsonFileStore::new(&cli.data_dir);
    let bootstrap = store.ensure_files(&name).unwrap_or_else(|e| {
        eprintln!("Error preparing data files for campaign '{name}': {e}");
        process::exit(1);
    });
    report_bootstrap(&console, bootstrap);

    console.status("Loading campaign data...");
    let mut session = Session::open(store, name).unwrap_or_else(|e| {
        eprintln!("Error loading campaign: {e}");
        process::exit(1);
    });
    for line in render_load_summary(session.campaign()) {
        console.status(&line);
    }
    console.status("PathTracker started successfully!");
    console.status("");

    let input: Box<dyn Iterator<Item = io::Result<String>>> = match &cli.commands {
        Some(commands) => Box::new(
            commands
                .lines()
                .map(|line| Ok(line.to_string()))
                .collect::<Vec<_>>()
                .into_iter(),
        ),
        None => Box::new(stdin_lines),
    };
    run_loop(&console, &mut session, input, interactive);

    if cli.no_save {
        debug!("skipping save of campaign '{}'", session.name());
    } else {
        console.status("Saving data...");
        if let Err(e) = session.save() {
            error!("final save failed: {e}");
            eprintln!("Error saving campaign '{}': {}", session.name(), e.message);
            process::exit(1);
        }
        console.status("All data saved.");
    }
    console.status("Exited successfully!");
}

/// Runs commands until `quit` or end of input.
fn run_loop(
    console: &Console,
    session: &mut Session<JsonFileStore>,
    input: impl Iterator<Item = io::Result<String>>,
    interactive: bool,
) {
    if interactive {
        console.prompt(PROMPT);
    }
    for line in input {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("read error: {e}");
                return;
            }
        };

        match session.execute(&line) {
            Step::Quit => return,
            Step::Continue(Some(report)) => console.report(&report),
            Step::Continue(None) => {}
        }

        if interactive {
            console.prompt(PROMPT);
        }
    }
}

fn report_bootstrap(console: &Console, bootstrap: Bootstrap) {
    if bootstrap.created_dir {
        console.status("Generating new data files...");
        return;
    }
    if bootstrap.created_loot {
        console.status("Generating new loot file...");
    }
    if bootstrap.created_xp {
        console.status("Generating new XP file...");
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}
