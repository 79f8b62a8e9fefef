use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Size of the frame header on the wire
pub const HEADER_LEN: usize = 8;

/// Size of one fixed-width credential field
pub const CREDENTIAL_FIELD_LEN: usize = 32;

/// Size of the register/login payload (username field + password field)
pub const CREDENTIALS_LEN: usize = CREDENTIAL_FIELD_LEN * 2;

/// Size of the game-move payload (move type + item id)
pub const MOVE_PAYLOAD_LEN: usize = 8;

/// Largest payload a client will accept from the server
pub const MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Keep only the command byte of a received command id.
///
/// The server writes a one-byte command into a four-byte slot, so the upper
/// 24 bits carry whatever padding the server left there.
pub fn mask_command(raw: u32) -> u8 {
    (raw & 0xFF) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Ok,
    Register,
    Login,
    LoginSuccess,
    Fail,
    QueueJoin,
    GameState,
    GameMove,
    PlayAi,
    ListUsersResponse,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::Ok,
        Command::Register,
        Command::Login,
        Command::LoginSuccess,
        Command::Fail,
        Command::QueueJoin,
        Command::GameState,
        Command::GameMove,
        Command::PlayAi,
        Command::ListUsersResponse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Ok => "CMD_OK",
            Command::Register => "CMD_REGISTER",
            Command::Login => "CMD_LOGIN",
            Command::LoginSuccess => "CMD_LOGIN_SUCCESS",
            Command::Fail => "CMD_FAIL",
            Command::QueueJoin => "CMD_QUEUE_JOIN",
            Command::GameState => "CMD_GAME_STATE",
            Command::GameMove => "CMD_GAME_MOVE",
            Command::PlayAi => "CMD_PLAY_AI",
            Command::ListUsersResponse => "CMD_LIST_USERS_RESP",
        }
    }
}

/// Numeric command ids shared with the server under test.
///
/// Defaults follow the server's protocol header; any entry can be
/// overridden from the harness config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTable {
    pub ok: u8,
    pub register: u8,
    pub login: u8,
    pub login_success: u8,
    pub fail: u8,
    pub queue_join: u8,
    pub game_state: u8,
    pub game_move: u8,
    pub play_ai: u8,
    pub list_users_response: u8,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            ok: 0,
            register: 1,
            login: 2,
            login_success: 3,
            fail: 255,
            queue_join: 60,
            game_state: 22,
            game_move: 21,
            play_ai: 45,
            list_users_response: 6,
        }
    }
}

impl CommandTable {
    /// Wire id for a command
    pub fn id(&self, command: Command) -> u32 {
        let id = match command {
            Command::Ok => self.ok,
            Command::Register => self.register,
            Command::Login => self.login,
            Command::LoginSuccess => self.login_success,
            Command::Fail => self.fail,
            Command::QueueJoin => self.queue_join,
            Command::GameState => self.game_state,
            Command::GameMove => self.game_move,
            Command::PlayAi => self.play_ai,
            Command::ListUsersResponse => self.list_users_response,
        };
        u32::from(id)
    }

    /// Interpret a received command id. Upper bits are masked off first.
    pub fn lookup(&self, raw: u32) -> Option<Command> {
        let byte = u32::from(mask_command(raw));
        Command::ALL.into_iter().find(|&cmd| self.id(cmd) == byte)
    }

    /// Whether `raw` is the given command after masking
    pub fn is(&self, raw: u32, command: Command) -> bool {
        u32::from(mask_command(raw)) == self.id(command)
    }

    pub fn name_of(&self, raw: u32) -> String {
        match self.lookup(raw) {
            Some(cmd) => cmd.name().to_string(),
            None => format!("UNKNOWN({})", mask_command(raw)),
        }
    }
}

/// The fixed move a reactive session sends on every game-state update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveConfig {
    pub move_type: i32,
    pub item_id: i32,
}

impl Default for MoveConfig {
    fn default() -> Self {
        // SHOOT_OPPONENT, no item
        Self {
            move_type: 2,
            item_id: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub payload_length: u32,
    pub command_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command_id: u32,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(command_id: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            command_id,
            payload: payload.into(),
        }
    }

    /// Header-only frame
    pub fn empty(command_id: u32) -> Self {
        Self::new(command_id, Bytes::new())
    }

    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            payload_length: self.payload.len() as u32,
            command_id: self.command_id,
        }
    }
}
