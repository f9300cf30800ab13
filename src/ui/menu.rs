//! Command vocabulary of the console front end.
//!
//! Each line typed by the user maps onto the same `Message`s a windowed
//! front end would send from its menu and key bindings.

use crate::app::domain::{Message, ThemeMode, WindowGeometry};

pub const HELP: &str = "\
Commands:
  open <path>...      open documents          new            new blank tab
  close [n]           close tab n or active   tab <n>        switch to tab n
  next | prev         cycle tabs              edit | view    switch mode
  set <text>          replace content         append <text>  append to content
  save [path]         save active tab         copy           copy as rich text
  theme [light|dark]  set or toggle theme     zoom <n|in|out>
  resize <w> <h>      report window size      maximize       report maximized
  focus | check       look for new files      register | unregister  context menu
  list | show         tabs / rendered preview quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Vec<Message>),
    ListTabs,
    ShowPreview,
    Help,
}

impl Command {
    fn one(message: Message) -> Self {
        Command::Send(vec![message])
    }
}

/// Parse one input line. Tab numbers are 1-based.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "open" => {
            let paths: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
            if paths.is_empty() {
                return Err("open: missing path".to_string());
            }
            Command::one(Message::OpenPaths(paths))
        }
        "new" => Command::one(Message::NewTab),
        "close" if rest.is_empty() => Command::one(Message::CloseActive),
        "close" => Command::one(Message::CloseIndex(parse_tab_number(rest)?)),
        "tab" => Command::one(Message::SelectIndex(parse_tab_number(rest)?)),
        "next" => Command::one(Message::NextTab),
        "prev" => Command::one(Message::PrevTab),
        "edit" => Command::one(Message::SetEditMode(true)),
        "view" => Command::one(Message::SetEditMode(false)),
        "set" => Command::one(Message::ReplaceContent(unescape(rest))),
        "append" => Command::one(Message::AppendContent(unescape(rest))),
        "save" if rest.is_empty() => Command::one(Message::SaveActive(None)),
        "save" => Command::one(Message::SaveActive(Some(rest.to_string()))),
        "copy" => Command::one(Message::CopyAsRichText),
        "theme" => match rest {
            "" => Command::one(Message::ToggleTheme),
            other => Command::one(Message::SetTheme(ThemeMode::parse_lenient(other))),
        },
        "zoom" => match rest {
            "in" | "+" => Command::one(Message::ZoomIn),
            "out" | "-" => Command::one(Message::ZoomOut),
            n => Command::one(Message::SetZoom(
                n.trim_end_matches('%')
                    .parse()
                    .map_err(|_| format!("zoom: not a number: {}", n))?,
            )),
        },
        "resize" => {
            let dims: Vec<u32> = rest
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|_| "resize: expected <width> <height>".to_string())?;
            let [width, height] = dims[..] else {
                return Err("resize: expected <width> <height>".to_string());
            };
            Command::one(Message::WindowGeometry(WindowGeometry {
                width,
                height,
                maximized: false,
            }))
        }
        "maximize" => Command::one(Message::WindowGeometry(WindowGeometry {
            maximized: true,
            ..Default::default()
        })),
        "focus" => Command::one(Message::WindowFocused),
        "check" => Command::one(Message::CheckFiles),
        "register" => Command::one(Message::RegisterShellIntegration),
        "unregister" => Command::one(Message::UnregisterShellIntegration),
        "list" | "ls" => Command::ListTabs,
        "show" => Command::ShowPreview,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::one(Message::Quit),
        "" => return Err(String::new()),
        other => return Err(format!("unknown command: {} (try help)", other)),
    };
    Ok(command)
}

fn parse_tab_number(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("not a tab number: {}", raw)),
    }
}

/// `\n` and `\t` escapes let a single line carry multi-line markdown.
fn unescape(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\t", "\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_open_multiple() {
        assert_eq!(
            parse_command("open /docs/a.md /docs/b.md").unwrap(),
            Command::one(Message::OpenPaths(vec![
                "/docs/a.md".to_string(),
                "/docs/b.md".to_string()
            ]))
        );
        assert!(parse_command("open").is_err());
    }

    #[test]
    fn test_parse_close_by_number() {
        assert_eq!(
            parse_command("close 2").unwrap(),
            Command::one(Message::CloseIndex(1))
        );
        assert_eq!(parse_command("close").unwrap(), Command::one(Message::CloseActive));
        assert!(parse_command("close 0").is_err());
    }

    #[test]
    fn test_parse_content_unescapes() {
        assert_eq!(
            parse_command("set # Title\\n\\nBody").unwrap(),
            Command::one(Message::ReplaceContent("# Title\n\nBody".to_string()))
        );
    }

    #[test]
    fn test_parse_save() {
        assert_eq!(parse_command("save").unwrap(), Command::one(Message::SaveActive(None)));
        assert_eq!(
            parse_command("save /docs/out").unwrap(),
            Command::one(Message::SaveActive(Some("/docs/out".to_string())))
        );
    }

    #[test]
    fn test_parse_zoom_and_theme() {
        assert_eq!(parse_command("zoom in").unwrap(), Command::one(Message::ZoomIn));
        assert_eq!(parse_command("zoom 150%").unwrap(), Command::one(Message::SetZoom(150)));
        assert!(parse_command("zoom big").is_err());
        assert_eq!(parse_command("theme").unwrap(), Command::one(Message::ToggleTheme));
        assert_eq!(
            parse_command("THEME dark").unwrap(),
            Command::one(Message::SetTheme(ThemeMode::Dark))
        );
    }

    #[test]
    fn test_parse_resize() {
        assert_eq!(
            parse_command("resize 1280 800").unwrap(),
            Command::one(Message::WindowGeometry(WindowGeometry {
                width: 1280,
                height: 800,
                maximized: false
            }))
        );
        assert!(parse_command("resize 1280").is_err());
        assert!(parse_command("resize a b").is_err());
    }

    #[test]
    fn test_parse_unknown() {
        assert!(parse_command("frobnicate").unwrap_err().contains("unknown command"));
        assert_eq!(parse_command("   ").unwrap_err(), "");
        assert_eq!(parse_command("ls").unwrap(), Command::ListTabs);
    }
}
