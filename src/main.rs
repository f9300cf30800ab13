use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{select, unbounded};
use log::{error, info};
use parking_lot::Mutex;

use md_reader::app::controllers::preferences::PreferencesStore;
use md_reader::app::infrastructure::instance::{self, InstanceRole};
use md_reader::app::infrastructure::io::JsonPreferencesFile;
use md_reader::app::services::pending::PendingFileQueue;
use md_reader::app::state::{AppState, Services};
use md_reader::ui::console;
use md_reader::ui::menu::{Command, HELP};

/// Tabbed markdown reader.
#[derive(Parser, Debug)]
#[command(name = "mdreader", version, about)]
struct Args {
    /// Markdown documents to open
    files: Vec<String>,
}

/// Upper bound on a single wait so a stalled clock never parks the loop.
const MAX_IDLE: Duration = Duration::from_secs(3600);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let (tx, rx) = unbounded();
    let pending = Arc::new(Mutex::new(PendingFileQueue::new()));

    // Keep the server alive for the whole run; dropping it removes the port file.
    let _server = match instance::acquire(&instance::default_dir(), &args.files, pending.clone(), tx.clone()) {
        Ok(InstanceRole::Secondary) => {
            info!("handed off to running instance");
            return;
        }
        Ok(InstanceRole::Primary(server)) => Some(server),
        Err(e) => {
            error!("single-instance setup failed, continuing standalone: {}", e);
            None
        }
    };

    let prefs = PreferencesStore::load(Box::new(JsonPreferencesFile::default_location()));
    let mut app = AppState::new(Services::system(), prefs, pending, tx);

    let launch_args: Vec<String> = std::iter::once("mdreader".to_string())
        .chain(args.files)
        .collect();
    app.launch(&launch_args, Instant::now());

    let (cmd_tx, cmd_rx) = unbounded();
    if let Err(e) = console::spawn_stdin_reader(cmd_tx) {
        error!("cannot read commands: {}", e);
        return;
    }
    println!("{}", HELP);

    loop {
        let now = Instant::now();
        let timeout = app
            .next_deadline()
            .map_or(MAX_IDLE, |d| d.saturating_duration_since(now));

        let keep_running = select! {
            recv(rx) -> msg => match msg {
                Ok(msg) => app.handle(msg, Instant::now()),
                Err(_) => false,
            },
            recv(cmd_rx) -> cmd => match cmd {
                Ok(cmd) => {
                    let keep = run_command(&mut app, cmd);
                    println!("{}", console::render_status(&app));
                    keep
                }
                Err(_) => false,
            },
            default(timeout) => true,
        };
        if !keep_running {
            break;
        }

        app.tick(Instant::now());
        if app.take_raise_request() {
            println!("-- another instance asked for this window --");
        }
        for alert in app.take_alerts() {
            println!("!! {}", alert);
        }
    }
}

fn run_command(app: &mut AppState, cmd: Result<Command, String>) -> bool {
    match cmd {
        Ok(Command::Send(messages)) => {
            for msg in messages {
                if !app.handle(msg, Instant::now()) {
                    return false;
                }
            }
        }
        Ok(Command::ListTabs) => println!("{}", console::render_tabs(app)),
        Ok(Command::ShowPreview) => println!("{}", console::render_preview(app)),
        Ok(Command::Help) => println!("{}", HELP),
        Err(msg) if msg.is_empty() => {}
        Err(msg) => println!("{}", msg),
    }
    true
}
