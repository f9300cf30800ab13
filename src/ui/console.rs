//! Line-oriented stand-in for the application window.

use std::io::{self, BufRead};
use std::thread;

use crossbeam_channel::Sender;
use log::debug;

use super::menu::{Command, parse_command};
use crate::app::state::AppState;

/// One row per tab: number, active marker, dirty marker, mode, title.
pub fn render_tabs(app: &AppState) -> String {
    let active = app.session.active_id();
    app.session
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            format!(
                "{} {:>2}. {}{} [{}]",
                if Some(tab.id) == active { '>' } else { ' ' },
                i + 1,
                tab.title,
                if tab.dirty { " *" } else { "" },
                if tab.edit_mode { "edit" } else { "view" },
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Footer shown after every command.
pub fn render_status(app: &AppState) -> String {
    let prefs = app.prefs.current();
    let mut parts = vec![format!("{} | {}%", prefs.theme.as_str(), prefs.zoom)];
    if let Some(tab) = app.session.active_tab() {
        parts.push(tab.title.clone());
    }
    if let Some(progress) = app.active_progress() {
        parts.push(progress);
    }
    if let Some(status) = app.status() {
        parts.push(status.to_string());
    }
    parts.join(" | ")
}

/// The active tab's rendered preview, or its raw text in edit mode.
pub fn render_preview(app: &AppState) -> String {
    match (app.active_preview(), app.session.active_tab()) {
        (Some(html), _) => html,
        (None, Some(tab)) => tab.content.clone(),
        (None, None) => String::new(),
    }
}

/// Read commands from stdin on a background thread until EOF.
pub fn spawn_stdin_reader(commands: Sender<Result<Command, String>>) -> io::Result<()> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if commands.send(parse_command(&line)).is_err() {
                    break;
                }
            }
            debug!("stdin closed");
            let _ = commands.send(parse_command("quit"));
        })?;
    Ok(())
}
