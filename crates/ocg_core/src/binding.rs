//! Binding table
//!
//! Declares every native entry point by name together with its return and
//! parameter marshalling. The table is the wire contract with the library:
//! names and parameter order must never change.

use std::fmt;

/// How a value crosses the native call boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marshal {
    /// No value (returns only)
    Void,
    /// Pointer-sized handle owned by the native library
    Opaque,
    /// Function pointer installed as a callback
    Callback,
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    /// Raw byte buffer of caller-provided capacity
    Buffer,
    /// Null-terminated text
    Text,
}

impl Marshal {
    /// Native type name, as it appears in the C headers
    pub fn c_type(&self) -> &'static str {
        match self {
            Marshal::Void => "void",
            Marshal::Opaque => "void*",
            Marshal::Callback => "void*",
            Marshal::U8 => "uint8",
            Marshal::U16 => "uint16",
            Marshal::U32 => "uint32",
            Marshal::I8 => "int8",
            Marshal::I16 => "int16",
            Marshal::I32 => "int32",
            Marshal::Buffer => "uint8*",
            Marshal::Text => "char*",
        }
    }

    /// Width in bytes for fixed-width integers
    pub fn int_width(&self) -> Option<usize> {
        match self {
            Marshal::U8 | Marshal::I8 => Some(1),
            Marshal::U16 | Marshal::I16 => Some(2),
            Marshal::U32 | Marshal::I32 => Some(4),
            _ => None,
        }
    }
}

/// Declared signature of a native entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub ret: Marshal,
    pub params: &'static [Marshal],
}

/// Every bound native operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    SetScriptReader,
    SetCardReader,
    SetMessageHandler,
    CreateDuel,
    CreateDuelV2,
    StartDuel,
    EndDuel,
    SetPlayerInfo,
    GetLogMessage,
    GetMessage,
    Process,
    NewCard,
    NewTagCard,
    QueryCard,
    QueryFieldCount,
    QueryFieldCard,
    QueryFieldInfo,
    SetResponseI,
    SetResponseB,
    PreloadScript,
}

impl Method {
    /// All methods in declaration order
    pub const ALL: [Method; 20] = [
        Method::SetScriptReader,
        Method::SetCardReader,
        Method::SetMessageHandler,
        Method::CreateDuel,
        Method::CreateDuelV2,
        Method::StartDuel,
        Method::EndDuel,
        Method::SetPlayerInfo,
        Method::GetLogMessage,
        Method::GetMessage,
        Method::Process,
        Method::NewCard,
        Method::NewTagCard,
        Method::QueryCard,
        Method::QueryFieldCount,
        Method::QueryFieldCard,
        Method::QueryFieldInfo,
        Method::SetResponseI,
        Method::SetResponseB,
        Method::PreloadScript,
    ];

    /// Exported symbol name
    pub fn name(&self) -> &'static str {
        match self {
            Method::SetScriptReader => "set_script_reader",
            Method::SetCardReader => "set_card_reader",
            Method::SetMessageHandler => "set_message_handler",
            Method::CreateDuel => "create_duel",
            Method::CreateDuelV2 => "create_duel_v2",
            Method::StartDuel => "start_duel",
            Method::EndDuel => "end_duel",
            Method::SetPlayerInfo => "set_player_info",
            Method::GetLogMessage => "get_log_message",
            Method::GetMessage => "get_message",
            Method::Process => "process",
            Method::NewCard => "new_card",
            Method::NewTagCard => "new_tag_card",
            Method::QueryCard => "query_card",
            Method::QueryFieldCount => "query_field_count",
            Method::QueryFieldCard => "query_field_card",
            Method::QueryFieldInfo => "query_field_info",
            Method::SetResponseI => "set_responsei",
            Method::SetResponseB => "set_responseb",
            Method::PreloadScript => "preload_script",
        }
    }

    /// Look a method up by its exported name
    pub fn from_name(name: &str) -> Option<Method> {
        Method::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Symbol name as a null-terminated byte string for the loader
    pub fn symbol(&self) -> Vec<u8> {
        let mut symbol = Vec::with_capacity(self.name().len() + 1);
        symbol.extend_from_slice(self.name().as_bytes());
        symbol.push(0);
        symbol
    }

    /// Declared marshalling for this entry point
    pub fn signature(&self) -> Signature {
        use Marshal::*;

        let (ret, params): (Marshal, &'static [Marshal]) = match self {
            Method::SetScriptReader => (Buffer, &[Callback]),
            Method::SetCardReader => (Void, &[Callback]),
            Method::SetMessageHandler => (Void, &[Callback]),
            Method::CreateDuel => (Opaque, &[U32]),
            Method::CreateDuelV2 => (Opaque, &[Buffer]),
            Method::StartDuel => (Void, &[Opaque, U32]),
            Method::EndDuel => (Void, &[Opaque]),
            Method::SetPlayerInfo => (Void, &[Opaque, I32, I32, I32, I32]),
            Method::GetLogMessage => (Void, &[Opaque, Buffer]),
            Method::GetMessage => (I32, &[Opaque, Buffer]),
            Method::Process => (I32, &[Opaque]),
            Method::NewCard => (Void, &[Opaque, U32, U8, U8, U8, U8, U8]),
            Method::NewTagCard => (Void, &[Opaque, U32, U8, U8]),
            Method::QueryCard => (I32, &[Opaque, U8, U8, U8, I32, Buffer, I32]),
            Method::QueryFieldCount => (I32, &[Opaque, U8, U8]),
            Method::QueryFieldCard => (I32, &[Opaque, U8, U8, I32, Buffer, I32]),
            Method::QueryFieldInfo => (I32, &[Opaque, Buffer]),
            Method::SetResponseI => (Void, &[Opaque, I32]),
            Method::SetResponseB => (Void, &[Opaque, Buffer]),
            Method::PreloadScript => (I32, &[Opaque, Text, I32]),
        };

        Signature { ret, params }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(Marshal::c_type).collect();
        write!(f, "({}) -> {}", params.join(", "), self.ret.c_type())
    }
}
