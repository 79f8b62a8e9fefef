//! Drives one connection through its script and reduces it to an outcome
//!
//! A session is three phases:
//! 1. establish: connect, authenticate, send the follow-up action
//! 2. steady state: idle hold, or the reactive game loop
//! 3. close on deadline
//!
//! The run deadline bounds every phase. Hitting it before the steady state is
//! a failure; hitting it inside the steady state is the normal way to finish.

use crate::metrics::recorder::{record_session_finished, record_session_started};
use crate::protocol::{encode_credentials, encode_move, Command, CommandTable, Frame, MoveConfig};
use crate::session::connector::{Connector, TcpConnector};
use crate::session::error::{SessionError, SessionResult};
use crate::session::types::{FollowUp, Script, ScriptKind, SessionOutcome, Stage, SteadyState};
use crate::session::wire::{read_frame, write_frame};
use std::convert::Infallible;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{self, Instant};
use tracing::{debug, info, info_span, trace, Instrument};

const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Everything a session needs besides its index and the deadline
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub target: String,
    pub script: Script,
    pub commands: CommandTable,
    pub moves: MoveConfig,
    pub username_prefix: String,
    pub password: String,
    /// Sessions with an index below this log server responses at info level
    pub verbose_sessions: usize,
}

impl SessionParams {
    pub fn new(target: impl Into<String>, kind: ScriptKind) -> Self {
        Self {
            target: target.into(),
            script: Script::from(kind),
            commands: CommandTable::default(),
            moves: MoveConfig::default(),
            username_prefix: kind.default_username_prefix().to_string(),
            password: "password".to_string(),
            verbose_sessions: 0,
        }
    }

    pub fn username(&self, index: usize) -> String {
        format!("{}{}", self.username_prefix, index)
    }
}

/// Run a single session against `target` for `duration` over plain TCP
pub async fn run(target: &str, kind: ScriptKind, duration: Duration) -> SessionOutcome {
    let params = SessionParams::new(target, kind);
    run_session(&TcpConnector, &params, 0, Instant::now() + duration).await
}

/// Run session `index` until `deadline`. Never returns an error: every
/// failure is folded into the outcome.
pub async fn run_session<C: Connector>(
    connector: &C,
    params: &SessionParams,
    index: usize,
    deadline: Instant,
) -> SessionOutcome {
    let started = std::time::Instant::now();
    let _active = record_session_started();

    let outcome = drive(connector, params, index, deadline)
        .instrument(info_span!("session", id = index))
        .await;

    record_session_finished(&outcome, started.elapsed());
    outcome
}

async fn drive<C: Connector>(
    connector: &C,
    params: &SessionParams,
    index: usize,
    deadline: Instant,
) -> SessionOutcome {
    let verbose = index < params.verbose_sessions;

    let mut stage = Stage::Connect;
    let established =
        time::timeout_at(deadline, establish(connector, params, index, verbose, &mut stage)).await;

    let mut stream = match established {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => {
            log_failure(verbose, index, &err);
            return err.into();
        }
        Err(_) => {
            let err = SessionError::DeadlineElapsed { stage };
            log_failure(verbose, index, &err);
            return err.into();
        }
    };

    let steady = match params.script.steady {
        SteadyState::Idle => time::timeout_at(deadline, hold(&mut stream)).await,
        SteadyState::Reactive => time::timeout_at(deadline, play(&mut stream, params)).await,
    };

    match steady {
        Err(_) => {
            let _ = time::timeout(CLOSE_GRACE, stream.shutdown()).await;
            debug!("deadline reached, connection closed");
            SessionOutcome::Success
        }
        Ok(Err(err)) => {
            log_failure(verbose, index, &err);
            err.into()
        }
        Ok(Ok(never)) => match never {},
    }
}

async fn establish<C: Connector>(
    connector: &C,
    params: &SessionParams,
    index: usize,
    verbose: bool,
    stage: &mut Stage,
) -> SessionResult<C::Stream> {
    let commands = &params.commands;
    let script = &params.script;

    *stage = Stage::Connect;
    let mut stream = connector
        .connect(&params.target)
        .await
        .map_err(|e| SessionError::Connection(e.to_string()))?;
    debug!(addr = %params.target, "connected");

    let credentials = encode_credentials(&params.username(index), &params.password);

    if script.register_first {
        *stage = Stage::Register;
        write_frame(&mut stream, commands.id(Command::Register), &credentials, *stage).await?;
        if script.await_responses {
            // OK and FAIL (already registered) both let the login proceed
            let response = read_frame(&mut stream, *stage).await?;
            log_response(verbose, index, "register", commands, &response);
        }
    }

    *stage = Stage::Login;
    write_frame(&mut stream, commands.id(Command::Login), &credentials, *stage).await?;
    if script.await_responses {
        let response = read_frame(&mut stream, *stage).await?;
        log_response(verbose, index, "login", commands, &response);
    }

    *stage = Stage::FollowUp;
    let action = match script.follow_up {
        FollowUp::QueueJoin => Command::QueueJoin,
        FollowUp::PlayAi => Command::PlayAi,
    };
    write_frame(&mut stream, commands.id(action), &[], *stage).await?;
    debug!(action = action.name(), "script established");

    Ok(stream)
}

/// Keep the connection open. Anything the server pushes is drained; the
/// hold only ends early if the peer goes away.
async fn hold<S>(stream: &mut S) -> SessionResult<Infallible>
where
    S: AsyncRead + Unpin,
{
    let mut scratch = [0u8; 1024];
    loop {
        match stream.read(&mut scratch).await {
            Ok(0) => return Err(SessionError::ConnectionClosed { stage: Stage::Hold }),
            Ok(_) => continue,
            Err(e) => return Err(SessionError::from_io(e, Stage::Hold)),
        }
    }
}

/// Reactive game loop: every game-state update is answered with the same
/// move, whoever's turn it is. The state payload itself is not inspected.
async fn play<S>(stream: &mut S, params: &SessionParams) -> SessionResult<Infallible>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let commands = &params.commands;
    let move_id = commands.id(Command::GameMove);
    let move_payload = encode_move(params.moves.move_type, params.moves.item_id);
    let mut moves_sent: u64 = 0;

    loop {
        let frame = read_frame(stream, Stage::Game).await?;

        if commands.is(frame.command_id, Command::GameState) {
            write_frame(stream, move_id, &move_payload, Stage::Game).await?;
            moves_sent += 1;
            trace!(moves_sent, "answered game state");
        } else {
            debug!(
                command = %commands.name_of(frame.command_id),
                len = frame.payload.len(),
                "ignoring frame"
            );
        }
    }
}

fn log_response(verbose: bool, index: usize, step: &str, commands: &CommandTable, frame: &Frame) {
    let name = commands.name_of(frame.command_id);
    let len = frame.payload.len();
    if verbose {
        info!("[Client {}] {} response: {}, DataSize={}", index, step, name, len);
    } else {
        debug!(step, response = %name, len, "server response");
    }
}

fn log_failure(verbose: bool, index: usize, err: &SessionError) {
    if verbose {
        info!("Client {} error: {}", index, err);
    } else {
        debug!(error = %err, "session failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{decode_fixed_str, encode_frame};
    use crate::session::types::FailureKind;
    use tokio::io::{duplex, DuplexStream};
    use tokio::sync::Mutex;

    /// Hands out one pre-built in-memory stream
    struct DuplexConnector {
        stream: Mutex<Option<DuplexStream>>,
    }

    impl DuplexConnector {
        fn new(stream: DuplexStream) -> Self {
            Self {
                stream: Mutex::new(Some(stream)),
            }
        }
    }

    impl Connector for DuplexConnector {
        type Stream = DuplexStream;

        async fn connect(&self, _target: &str) -> std::io::Result<DuplexStream> {
            self.stream
                .lock()
                .await
                .take()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
        }
    }

    struct RefusingConnector;

    impl Connector for RefusingConnector {
        type Stream = DuplexStream;

        async fn connect(&self, _target: &str) -> std::io::Result<DuplexStream> {
            Err(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
        }
    }

    fn deadline_in(ms: u64) -> Instant {
        Instant::now() + Duration::from_millis(ms)
    }

    #[tokio::test]
    async fn test_refused_connection_fails_without_retry() {
        let params = SessionParams::new("unused", ScriptKind::QueueIdle);
        let outcome = run_session(&RefusingConnector, &params, 0, deadline_in(500)).await;

        match outcome {
            SessionOutcome::Failure(f) => assert_eq!(f.kind, FailureKind::Connection),
            SessionOutcome::Success => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_idle_script_sends_login_then_queue_join() {
        let (client, mut server) = duplex(1024);
        let connector = DuplexConnector::new(client);
        let params = SessionParams::new("unused", ScriptKind::QueueIdle);

        let session = tokio::spawn(async move {
            run_session(&connector, &params, 7, deadline_in(200)).await
        });

        let login = read_frame(&mut server, Stage::Login).await.unwrap();
        assert_eq!(login.command_id, 2);
        assert_eq!(login.payload.len(), 64);
        assert_eq!(decode_fixed_str(&login.payload[..32]), "Bot_7");
        assert_eq!(decode_fixed_str(&login.payload[32..]), "password");

        let join = read_frame(&mut server, Stage::FollowUp).await.unwrap();
        assert_eq!(join.command_id, 60);
        assert!(join.payload.is_empty());

        assert_eq!(session.await.unwrap(), SessionOutcome::Success);
    }

    #[tokio::test]
    async fn test_registered_script_reads_login_stats() {
        let (client, mut server) = duplex(1024);
        let connector = DuplexConnector::new(client);
        let params = SessionParams::new("unused", ScriptKind::QueueIdleRegistered);

        let session = tokio::spawn(async move {
            run_session(&connector, &params, 0, deadline_in(300)).await
        });

        let register = read_frame(&mut server, Stage::Register).await.unwrap();
        assert_eq!(register.command_id, 1);
        server.write_all(&encode_frame(255, &[])).await.unwrap();

        let login = read_frame(&mut server, Stage::Login).await.unwrap();
        assert_eq!(login.command_id, 2);
        // Login success with a 12-byte stats body and garbage in the upper bits
        server
            .write_all(&encode_frame(0xABCD_0003, &[1u8; 12]))
            .await
            .unwrap();

        let join = read_frame(&mut server, Stage::FollowUp).await.unwrap();
        assert_eq!(join.command_id, 60);

        assert_eq!(session.await.unwrap(), SessionOutcome::Success);
    }

    #[tokio::test]
    async fn test_truncated_login_response_fails() {
        let (client, mut server) = duplex(1024);
        let connector = DuplexConnector::new(client);
        let mut params = SessionParams::new("unused", ScriptKind::QueueIdleRegistered);
        params.script.register_first = false;

        let session = tokio::spawn(async move {
            run_session(&connector, &params, 0, deadline_in(2_000)).await
        });

        read_frame(&mut server, Stage::Login).await.unwrap();
        server.write_all(&[3, 0, 0]).await.unwrap();
        drop(server);

        match session.await.unwrap() {
            SessionOutcome::Failure(f) => assert_eq!(f.kind, FailureKind::Connection),
            SessionOutcome::Success => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_stalled_login_response_hits_deadline() {
        let (client, mut server) = duplex(1024);
        let connector = DuplexConnector::new(client);
        let params = SessionParams::new("unused", ScriptKind::QueueIdleRegistered);

        let session = tokio::spawn(async move {
            run_session(&connector, &params, 0, deadline_in(100)).await
        });

        // Accept the register frame but never answer it
        read_frame(&mut server, Stage::Register).await.unwrap();

        match session.await.unwrap() {
            SessionOutcome::Failure(f) => {
                assert_eq!(f.kind, FailureKind::Deadline);
                assert!(f.reason.contains("register"));
            }
            SessionOutcome::Success => panic!("expected failure"),
        }
        drop(server);
    }

    #[tokio::test]
    async fn test_ai_script_answers_each_game_state() {
        let (client, mut server) = duplex(4096);
        let connector = DuplexConnector::new(client);
        let params = SessionParams::new("unused", ScriptKind::AiGame);

        let session = tokio::spawn(async move {
            run_session(&connector, &params, 3, deadline_in(300)).await
        });

        let login = read_frame(&mut server, Stage::Login).await.unwrap();
        assert_eq!(decode_fixed_str(&login.payload[..32]), "AiTester_3");
        let play_ai = read_frame(&mut server, Stage::FollowUp).await.unwrap();
        assert_eq!(play_ai.command_id, 45);

        // A non-state frame is drained, then two state updates get two moves
        server.write_all(&encode_frame(0, &[])).await.unwrap();
        server.write_all(&encode_frame(22, &[0u8; 40])).await.unwrap();
        server.write_all(&encode_frame(22, &[])).await.unwrap();

        for _ in 0..2 {
            let mv = read_frame(&mut server, Stage::Game).await.unwrap();
            assert_eq!(mv.command_id, 21);
            assert_eq!(&mv.payload[..], &encode_move(2, 0));
        }

        assert_eq!(session.await.unwrap(), SessionOutcome::Success);
    }
}
