//! Scripted stand-in for the game server
//!
//! Listens on an ephemeral localhost port and treats every accepted
//! connection according to one fixed behaviour, recording each frame it
//! reads so tests can assert on what the clients sent.

use buckshot_stress::protocol::{decode_header, encode_frame, CommandTable, HEADER_LEN};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Drop every connection right after accepting it
    CloseImmediately,
    /// Read and record frames until the client goes away
    HoldOpen,
    /// Wait for login and play-AI, push one header-only game state, record
    /// whatever arrives within a short window, then close
    GameStateThenClose,
    /// Answer register with OK and login with LOGIN_SUCCESS plus 12 stats
    /// bytes, then hold like `HoldOpen`
    LoginResponder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    pub connection: usize,
    pub command_id: u32,
    pub payload: Vec<u8>,
}

pub struct MockServer {
    addr: String,
    accepted: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<ReceivedFrame>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let accepted = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));

        let task = {
            let accepted = accepted.clone();
            let received = received.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        continue;
                    };
                    let connection = accepted.fetch_add(1, Ordering::SeqCst);
                    let received = received.clone();
                    tokio::spawn(async move {
                        serve(behaviour, connection, stream, received).await;
                    });
                }
            })
        };

        Self {
            addr,
            accepted,
            received,
            task,
        }
    }

    pub fn addr(&self) -> String {
        self.addr.clone()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub async fn frames(&self) -> Vec<ReceivedFrame> {
        self.received.lock().await.clone()
    }

    pub async fn frames_with(&self, command_id: u32) -> Vec<ReceivedFrame> {
        self.frames()
            .await
            .into_iter()
            .filter(|f| f.command_id == command_id)
            .collect()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    behaviour: Behaviour,
    connection: usize,
    mut stream: TcpStream,
    received: Arc<Mutex<Vec<ReceivedFrame>>>,
) {
    let commands = CommandTable::default();

    match behaviour {
        Behaviour::CloseImmediately => drop(stream),
        Behaviour::HoldOpen => {
            while let Some(frame) = read_frame(&mut stream, connection).await {
                received.lock().await.push(frame);
            }
        }
        Behaviour::GameStateThenClose => {
            for _ in 0..2 {
                match read_frame(&mut stream, connection).await {
                    Some(frame) => received.lock().await.push(frame),
                    None => return,
                }
            }

            let state = encode_frame(commands.game_state.into(), &[]);
            if stream.write_all(&state).await.is_err() {
                return;
            }

            // Collect everything the client sends in response, then hang up
            while let Ok(Some(frame)) =
                tokio::time::timeout(Duration::from_millis(200), read_frame(&mut stream, connection))
                    .await
            {
                received.lock().await.push(frame);
            }
        }
        Behaviour::LoginResponder => {
            while let Some(frame) = read_frame(&mut stream, connection).await {
                let reply = if frame.command_id == u32::from(commands.register) {
                    Some(encode_frame(commands.ok.into(), &[]))
                } else if frame.command_id == u32::from(commands.login) {
                    // Upper bits set to mimic the server's padding byte garbage
                    let id = 0xCC00_0000 | u32::from(commands.login_success);
                    Some(encode_frame(id, &[7u8; 12]))
                } else {
                    None
                };

                received.lock().await.push(frame);

                if let Some(reply) = reply {
                    if stream.write_all(&reply).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

async fn read_frame(stream: &mut TcpStream, connection: usize) -> Option<ReceivedFrame> {
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header).await.ok()?;
    let header = decode_header(&header).ok()?;

    let mut payload = vec![0u8; header.payload_length as usize];
    stream.read_exact(&mut payload).await.ok()?;

    Some(ReceivedFrame {
        connection,
        command_id: header.command_id,
        payload,
    })
}
