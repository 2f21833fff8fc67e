//! In-process fake PTC10 controller for socket-level tests.
//!
//! Listens on an ephemeral localhost port, answers newline-terminated
//! commands from a reply table, and records every command it receives.
//! Unknown commands are answered with `ERR`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub const IDN: &str = "Stanford_Research_Systems,PTC10,s/n0001,v4.21";
pub const NAMES: &str = "3A, 3B, Out1, Out 2";
pub const VALUES: &str = "4.2, 77.35, NaN, 0.5";

#[derive(Default)]
pub struct FakeControllerBuilder {
    replies: HashMap<String, String>,
    greeting: Option<String>,
    silent: HashSet<String>,
    hang_up_on: HashSet<String>,
}

impl FakeControllerBuilder {
    pub fn reply(mut self, command: &str, reply: &str) -> Self {
        self.replies.insert(command.to_string(), reply.to_string());
        self
    }

    /// Bytes written to every new connection before any command arrives.
    pub fn greeting(mut self, text: &str) -> Self {
        self.greeting = Some(text.to_string());
        self
    }

    /// Record the command but never answer it.
    pub fn ignore(mut self, command: &str) -> Self {
        self.silent.insert(command.to_string());
        self
    }

    /// Close the connection when this command arrives.
    pub fn hang_up_on(mut self, command: &str) -> Self {
        self.hang_up_on.insert(command.to_string());
        self
    }

    pub fn spawn(self) -> FakeController {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind fake controller");
        listener
            .set_nonblocking(true)
            .expect("fake controller nonblocking");
        let port = listener.local_addr().expect("local addr").port();

        let commands = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let state = Served {
            script: Arc::new(self),
            commands: Arc::clone(&commands),
            connections: Arc::clone(&connections),
            stop: Arc::clone(&stop),
        };
        let handle = thread::spawn(move || state.accept_loop(listener));

        FakeController {
            port,
            commands,
            connections,
            stop,
            handle: Some(handle),
        }
    }
}

/// A controller populated with a typical four-channel reply table.
pub fn standard_controller() -> FakeControllerBuilder {
    FakeController::builder()
        .reply("*IDN?", IDN)
        .reply("getOutputNames?", NAMES)
        .reply("getOutput?", VALUES)
        .reply("3A?", "4.2")
        .reply("3B?", "77.35")
        .reply("Out1?", "NaN")
        .reply("Out2?", "0.5")
}

pub struct FakeController {
    port: u16,
    commands: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeController {
    pub fn builder() -> FakeControllerBuilder {
        FakeControllerBuilder::default()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Commands received so far, without terminators.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("commands lock").clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands().iter().filter(|c| *c == command).count()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Poll until `command` has been received `times` times.
    pub fn wait_for(&self, command: &str, times: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.count(command) >= times {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }
}

impl Drop for FakeController {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct Served {
    script: Arc<FakeControllerBuilder>,
    commands: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
}

impl Served {
    fn accept_loop(&self, listener: TcpListener) {
        while !self.stop.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, _)) => {
                    self.connections.fetch_add(1, Ordering::SeqCst);
                    let _ = self.serve(stream);
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => return,
            }
        }
    }

    fn serve(&self, mut stream: TcpStream) -> io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(Duration::from_millis(50)))?;
        if let Some(greeting) = &self.script.greeting {
            stream.write_all(greeting.as_bytes())?;
        }

        let mut pending = Vec::new();
        let mut chunk = [0u8; 1024];
        while !self.stop.load(Ordering::SeqCst) {
            let n = match stream.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(ref err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    continue;
                }
                Err(err) => return Err(err),
            };
            pending.extend_from_slice(&chunk[..n]);

            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                let command = String::from_utf8_lossy(&line).trim_end().to_string();
                self.commands
                    .lock()
                    .expect("commands lock")
                    .push(command.clone());

                if self.script.hang_up_on.contains(&command) {
                    return Ok(());
                }
                if self.script.silent.contains(&command) {
                    continue;
                }
                let reply = self
                    .script
                    .replies
                    .get(&command)
                    .map(String::as_str)
                    .unwrap_or("ERR");
                stream.write_all(format!("{reply}\n").as_bytes())?;
            }
        }
        Ok(())
    }
}
