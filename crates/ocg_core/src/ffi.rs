//! FFI types and function signatures for the OCGCore C ABI
//!
//! Everything here mirrors the native headers exactly. All structs use
//! `#[repr(C)]` and every entry point is an `unsafe extern "C" fn`.

use std::ffi::{c_char, c_int, c_void};

/// Raw duel pointer as the native library sees it
pub type RawDuel = *mut c_void;

/// Number of setcode slots in a card record
pub const SETCODE_SLOTS: usize = 16;

/// Card record filled in by the card reader callback
///
/// Field order and widths match the native `card_data` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardData {
    pub code: u32,
    pub alias: u32,
    pub setcode: [u16; SETCODE_SLOTS],
    pub type_: u32,
    pub level: u32,
    pub attribute: u32,
    pub race: u32,
    pub attack: i32,
    pub defense: i32,
    pub lscale: u32,
    pub rscale: u32,
    pub link_marker: u32,
}

impl CardData {
    /// Create a zeroed record for a card code
    pub fn new(code: u32) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: u32) -> Self {
        self.alias = alias;
        self
    }

    /// Set the setcodes, truncating to the 16 native slots
    pub fn with_setcodes(mut self, codes: &[u16]) -> Self {
        self.setcode = [0; SETCODE_SLOTS];
        for (slot, code) in self.setcode.iter_mut().zip(codes) {
            *slot = *code;
        }
        self
    }

    pub fn with_type(mut self, type_: u32) -> Self {
        self.type_ = type_;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_attribute(mut self, attribute: u32) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_race(mut self, race: u32) -> Self {
        self.race = race;
        self
    }

    pub fn with_stats(mut self, attack: i32, defense: i32) -> Self {
        self.attack = attack;
        self.defense = defense;
        self
    }

    pub fn with_scales(mut self, lscale: u32, rscale: u32) -> Self {
        self.lscale = lscale;
        self.rscale = rscale;
        self
    }

    pub fn with_link_marker(mut self, link_marker: u32) -> Self {
        self.link_marker = link_marker;
        self
    }

    /// Iterate the non-empty setcodes
    pub fn set_codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.setcode.iter().copied().filter(|code| *code != 0)
    }
}

// Callbacks installed through the set_*_reader / set_message_handler calls

/// Loads a script by name; writes its length and returns its bytes
pub type ScriptReader = unsafe extern "C" fn(*const c_char, *mut c_int) -> *mut u8;

/// Fills a card record for a code
pub type CardReader = unsafe extern "C" fn(u32, *mut CardData) -> u32;

/// Receives log/error messages from the engine
pub type MessageHandler = unsafe extern "C" fn(*mut c_void, u32) -> u32;

// Exported entry points

pub type SetScriptReaderFn = unsafe extern "C" fn(ScriptReader) -> *mut u8;
pub type SetCardReaderFn = unsafe extern "C" fn(CardReader);
pub type SetMessageHandlerFn = unsafe extern "C" fn(MessageHandler);

pub type CreateDuelFn = unsafe extern "C" fn(u32) -> RawDuel;
pub type CreateDuelV2Fn = unsafe extern "C" fn(*const u8) -> RawDuel;
pub type StartDuelFn = unsafe extern "C" fn(RawDuel, u32);
pub type EndDuelFn = unsafe extern "C" fn(RawDuel);
pub type SetPlayerInfoFn = unsafe extern "C" fn(RawDuel, i32, i32, i32, i32);

pub type GetLogMessageFn = unsafe extern "C" fn(RawDuel, *mut u8);
pub type GetMessageFn = unsafe extern "C" fn(RawDuel, *mut u8) -> i32;
pub type ProcessFn = unsafe extern "C" fn(RawDuel) -> i32;

pub type NewCardFn = unsafe extern "C" fn(RawDuel, u32, u8, u8, u8, u8, u8);
pub type NewTagCardFn = unsafe extern "C" fn(RawDuel, u32, u8, u8);

pub type QueryCardFn = unsafe extern "C" fn(RawDuel, u8, u8, u8, i32, *mut u8, i32) -> i32;
pub type QueryFieldCountFn = unsafe extern "C" fn(RawDuel, u8, u8) -> i32;
pub type QueryFieldCardFn = unsafe extern "C" fn(RawDuel, u8, u8, i32, *mut u8, i32) -> i32;
pub type QueryFieldInfoFn = unsafe extern "C" fn(RawDuel, *mut u8) -> i32;

pub type SetResponseIFn = unsafe extern "C" fn(RawDuel, i32);
pub type SetResponseBFn = unsafe extern "C" fn(RawDuel, *const u8);

pub type PreloadScriptFn = unsafe extern "C" fn(RawDuel, *const c_char, i32) -> i32;
