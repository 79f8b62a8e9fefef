use serde::{Deserialize, Serialize};
use std::fmt;

/// Preset interaction scripts, selectable from the CLI and config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptKind {
    /// Login, join the matchmaking queue, then hold the connection
    #[default]
    QueueIdle,
    /// Register, login (reading both responses), join the queue, hold
    QueueIdleRegistered,
    /// Login, start a game against the AI, answer every state update with a move
    AiGame,
}

impl ScriptKind {
    pub fn default_username_prefix(&self) -> &'static str {
        match self {
            ScriptKind::AiGame => "AiTester_",
            ScriptKind::QueueIdle | ScriptKind::QueueIdleRegistered => "Bot_",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    QueueJoin,
    PlayAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteadyState {
    /// Keep the socket open until the deadline
    Idle,
    /// Answer each game-state frame with a move frame
    Reactive,
}

/// The command sequence one session issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script {
    pub register_first: bool,
    pub await_responses: bool,
    pub follow_up: FollowUp,
    pub steady: SteadyState,
}

impl From<ScriptKind> for Script {
    fn from(kind: ScriptKind) -> Self {
        match kind {
            ScriptKind::QueueIdle => Script {
                register_first: false,
                await_responses: false,
                follow_up: FollowUp::QueueJoin,
                steady: SteadyState::Idle,
            },
            ScriptKind::QueueIdleRegistered => Script {
                register_first: true,
                await_responses: true,
                follow_up: FollowUp::QueueJoin,
                steady: SteadyState::Idle,
            },
            ScriptKind::AiGame => Script {
                register_first: false,
                await_responses: false,
                follow_up: FollowUp::PlayAi,
                steady: SteadyState::Reactive,
            },
        }
    }
}

/// Step of the script a session was executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Register,
    Login,
    FollowUp,
    Hold,
    Game,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Connect => "connect",
            Stage::Register => "register",
            Stage::Login => "login",
            Stage::FollowUp => "follow-up",
            Stage::Hold => "hold",
            Stage::Game => "game loop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Connection,
    Protocol,
    Io,
    Deadline,
    Panicked,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Connection => "connection",
            FailureKind::Protocol => "protocol",
            FailureKind::Io => "io",
            FailureKind::Deadline => "deadline",
            FailureKind::Panicked => "panicked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Success,
    Failure(SessionFailure),
}

impl SessionOutcome {
    pub fn failure(kind: FailureKind, reason: impl Into<String>) -> Self {
        SessionOutcome::Failure(SessionFailure {
            kind,
            reason: reason.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Success)
    }
}

impl From<crate::session::SessionError> for SessionOutcome {
    fn from(err: crate::session::SessionError) -> Self {
        SessionOutcome::failure(err.kind(), err.to_string())
    }
}
