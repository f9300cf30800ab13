//! Single-instance forwarding.
//!
//! The first process listens on a loopback port and records it in
//! `<data_local_dir>/mdreader/instance.port`. A later process sends its
//! launch arguments there as one JSON line, waits for `ok`, and exits.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};
use crate::app::domain::Message;
use crate::app::services::pending::{PendingFileQueue, normalize_path};

pub const PORT_FILE_NAME: &str = "instance.port";
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
const ACK_TIMEOUT: Duration = Duration::from_secs(2);
const ACK: &str = "ok";

#[derive(Debug, Serialize, Deserialize)]
struct ForwardedArgs {
    args: Vec<String>,
}

pub enum InstanceRole {
    Primary(InstanceServer),
    /// Arguments were handed to a running instance.
    Secondary,
}

/// The primary's listener. The accept loop runs on a detached thread for the
/// rest of the process; dropping the server removes the port file.
pub struct InstanceServer {
    port: u16,
    port_file: PathBuf,
}

impl InstanceServer {
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for InstanceServer {
    fn drop(&mut self) {
        if read_port(&self.port_file) == Some(self.port) {
            let _ = fs::remove_file(&self.port_file);
        }
    }
}

/// `<data_local_dir>/mdreader`
pub fn default_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(super::io::APP_DIR_NAME);
    path
}

/// Become the primary instance, or forward `args` to the existing one.
///
/// `pending` and `sender` are only used when this process becomes primary.
pub fn acquire(
    dir: &Path,
    args: &[String],
    pending: Arc<Mutex<PendingFileQueue>>,
    sender: Sender<Message>,
) -> Result<InstanceRole> {
    let port_file = dir.join(PORT_FILE_NAME);

    if let Some(port) = read_port(&port_file) {
        match forward_to_primary(port, args) {
            Ok(()) => {
                info!("forwarded {} argument(s) to instance on port {}", args.len(), port);
                return Ok(InstanceRole::Secondary);
            }
            Err(e) => debug!("stale instance file (port {}): {}", port, e),
        }
    }

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    let port = listener.local_addr()?.port();
    fs::create_dir_all(dir)?;
    fs::write(&port_file, port.to_string())?;
    info!("primary instance listening on port {}", port);

    thread::Builder::new()
        .name("instance-listener".to_string())
        .spawn(move || serve(listener, pending, sender))?;

    Ok(InstanceRole::Primary(InstanceServer { port, port_file }))
}

/// Send `args` (made absolute) to the primary and wait for its acknowledgement.
pub fn forward_to_primary(port: u16, args: &[String]) -> Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let mut stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?;
    stream.set_read_timeout(Some(ACK_TIMEOUT))?;

    let payload = ForwardedArgs {
        args: args.iter().map(|a| absolutize(a)).collect(),
    };
    let mut line = serde_json::to_string(&payload)?;
    line.push('\n');
    stream.write_all(line.as_bytes())?;
    stream.flush()?;

    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply)?;
    if reply.trim() == ACK {
        Ok(())
    } else {
        Err(AppError::Instance(format!(
            "unexpected reply from port {}: {:?}",
            port,
            reply.trim()
        )))
    }
}

fn absolutize(raw: &str) -> String {
    let path = normalize_path(raw);
    match std::path::absolute(&path) {
        Ok(abs) => abs.to_string_lossy().to_string(),
        Err(_) => path,
    }
}

fn read_port(port_file: &Path) -> Option<u16> {
    fs::read_to_string(port_file).ok()?.trim().parse().ok()
}

fn serve(listener: TcpListener, pending: Arc<Mutex<PendingFileQueue>>, sender: Sender<Message>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                warn!("instance listener accept failed: {}", e);
                continue;
            }
        };
        match handle_client(stream, &pending, &sender) {
            Ok(true) => {}
            Ok(false) => {
                debug!("event queue closed, stopping instance listener");
                break;
            }
            Err(e) => warn!("bad forward request: {}", e),
        }
    }
}

/// Returns Ok(false) once the receiving side of the event queue is gone.
fn handle_client(
    stream: TcpStream,
    pending: &Mutex<PendingFileQueue>,
    sender: &Sender<Message>,
) -> Result<bool> {
    stream.set_read_timeout(Some(ACK_TIMEOUT))?;
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let request: ForwardedArgs = serde_json::from_str(line.trim())?;

    let added = pending
        .lock()
        .extend(request.args.iter().map(String::as_str));
    info!("second instance forwarded {} document(s)", added);

    let mut alive = sender.send(Message::RaiseWindow).is_ok();
    if added > 0 {
        alive &= sender.send(Message::NewFilesAvailable).is_ok();
    }

    let mut stream = reader.into_inner();
    stream.write_all(format!("{}\n", ACK).as_bytes())?;
    stream.flush()?;
    Ok(alive)
}
