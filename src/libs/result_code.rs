//! Primary result codes reported by the sqlite engine.
//!
//! See <https://www.sqlite.org/rescode.html>. Extended codes carry the
//! primary code in their low byte.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResultCode {
    Ok = 0,
    Error = 1,
    Internal = 2,
    Perm = 3,
    Abort = 4,
    Busy = 5,
    Locked = 6,
    NoMem = 7,
    ReadOnly = 8,
    Interrupt = 9,
    IoErr = 10,
    Corrupt = 11,
    NotFound = 12,
    Full = 13,
    CantOpen = 14,
    Protocol = 15,
    Empty = 16,
    Schema = 17,
    TooBig = 18,
    Constraint = 19,
    Mismatch = 20,
    Misuse = 21,
    NoLfs = 22,
    Auth = 23,
    Format = 24,
    Range = 25,
    NotADb = 26,
    Notice = 27,
    Warning = 28,
    Row = 100,
    Done = 101,
}

impl ResultCode {
    /// Classify a primary or extended result code.
    pub fn from_code(code: i32) -> Option<Self> {
        let code = match code {
            100 | 101 => code,
            _ => code & 0xff,
        };
        let rc = match code {
            0 => ResultCode::Ok,
            1 => ResultCode::Error,
            2 => ResultCode::Internal,
            3 => ResultCode::Perm,
            4 => ResultCode::Abort,
            5 => ResultCode::Busy,
            6 => ResultCode::Locked,
            7 => ResultCode::NoMem,
            8 => ResultCode::ReadOnly,
            9 => ResultCode::Interrupt,
            10 => ResultCode::IoErr,
            11 => ResultCode::Corrupt,
            12 => ResultCode::NotFound,
            13 => ResultCode::Full,
            14 => ResultCode::CantOpen,
            15 => ResultCode::Protocol,
            16 => ResultCode::Empty,
            17 => ResultCode::Schema,
            18 => ResultCode::TooBig,
            19 => ResultCode::Constraint,
            20 => ResultCode::Mismatch,
            21 => ResultCode::Misuse,
            22 => ResultCode::NoLfs,
            23 => ResultCode::Auth,
            24 => ResultCode::Format,
            25 => ResultCode::Range,
            26 => ResultCode::NotADb,
            27 => ResultCode::Notice,
            28 => ResultCode::Warning,
            100 => ResultCode::Row,
            101 => ResultCode::Done,
            _ => return None,
        };
        Some(rc)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}
