//! In-memory [`OcgCore`] for tests
//!
//! `MockCore` never touches a native library. It journals every call into a
//! shared log so tests can interleave their own entries (listeners, hooks)
//! and check ordering, returns scripted `process` values, and fails any
//! method it is told to fail.
//!
//! ```ignore
//! use ocg_core::testing::MockCore;
//! use ocg_core::{Method, OcgCore};
//!
//! let core = MockCore::new().with_process_script([0x0002_0000]);
//! let duel = core.create_duel(7).unwrap();
//! assert_eq!(core.process(&duel).unwrap(), 0x0002_0000);
//! core.end_duel(duel).unwrap();
//! assert_eq!(core.calls(), vec![Method::CreateDuel, Method::Process, Method::EndDuel]);
//! ```

use crate::api::OcgCore;
use crate::binding::Method;
use crate::buffer::OcgBuffer;
use crate::error::{OcgError, Result};
use crate::ffi::{CardReader, MessageHandler, ScriptReader};
use crate::handle::{DuelHandle, DuelId, NativeOpaque};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;

/// `process` value returned once the script runs out: duel ended
pub const PROCESS_ENDED: i32 = 0x0002_0000;

/// Byte written into message buffers by `get_message`
pub const MESSAGE_FILL: u8 = 0xAB;

/// Shared call journal
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Scriptable stand-in for the native library
pub struct MockCore {
    /// Plain data member, never journaled
    pub name: String,
    journal: Journal,
    calls: Mutex<Vec<Method>>,
    failures: Mutex<HashSet<Method>>,
    process_script: Mutex<VecDeque<i32>>,
    last_process: Mutex<i32>,
    players: Mutex<Vec<(i32, i32, i32, i32)>>,
    ended: Mutex<Vec<DuelId>>,
}

impl MockCore {
    pub fn new() -> Self {
        Self {
            name: "mock-ocgcore".to_string(),
            journal: Arc::new(Mutex::new(Vec::new())),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashSet::new()),
            process_script: Mutex::new(VecDeque::new()),
            last_process: Mutex::new(0),
            players: Mutex::new(Vec::new()),
            ended: Mutex::new(Vec::new()),
        }
    }

    /// Values returned by successive `process` calls
    pub fn with_process_script(self, values: impl IntoIterator<Item = i32>) -> Self {
        self.process_script.lock().extend(values);
        self
    }

    /// Make `method` return `OcgError::FfiCallFailed`
    pub fn failing(self, method: Method) -> Self {
        self.failures.lock().insert(method);
        self
    }

    /// The shared journal; entries are `call:<method>`
    pub fn journal(&self) -> Journal {
        Arc::clone(&self.journal)
    }

    /// Methods called so far, in order
    pub fn calls(&self) -> Vec<Method> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, method: Method) -> usize {
        self.calls.lock().iter().filter(|m| **m == method).count()
    }

    /// Arguments of every `set_player_info` call
    pub fn players(&self) -> Vec<(i32, i32, i32, i32)> {
        self.players.lock().clone()
    }

    /// Duels passed to `end_duel`
    pub fn ended(&self) -> Vec<DuelId> {
        self.ended.lock().clone()
    }

    fn enter(&self, method: Method) -> Result<()> {
        self.calls.lock().push(method);
        self.journal.lock().push(format!("call:{}", method));

        if self.failures.lock().contains(&method) {
            return Err(OcgError::FfiCallFailed(format!("{} failed", method)));
        }
        Ok(())
    }

    fn new_duel(&self) -> Result<DuelHandle> {
        // Safety: the pointer is never dereferenced, only carried
        unsafe { DuelHandle::from_raw(NonNull::<c_void>::dangling().as_ptr()) }
            .ok_or(OcgError::NullHandle { method: "create_duel" })
    }
}

impl Default for MockCore {
    fn default() -> Self {
        Self::new()
    }
}

impl OcgCore for MockCore {
    fn set_script_reader(&self, _reader: ScriptReader) -> Result<NativeOpaque> {
        self.enter(Method::SetScriptReader)?;
        Ok(NativeOpaque::null())
    }

    fn set_card_reader(&self, _reader: CardReader) -> Result<()> {
        self.enter(Method::SetCardReader)
    }

    fn set_message_handler(&self, _handler: MessageHandler) -> Result<()> {
        self.enter(Method::SetMessageHandler)
    }

    fn create_duel(&self, _seed: u32) -> Result<DuelHandle> {
        self.enter(Method::CreateDuel)?;
        self.new_duel()
    }

    fn create_duel_v2(&self, _seed_sequence: &OcgBuffer) -> Result<DuelHandle> {
        self.enter(Method::CreateDuelV2)?;
        self.new_duel()
    }

    fn start_duel(&self, _duel: &DuelHandle, _options: u32) -> Result<()> {
        self.enter(Method::StartDuel)
    }

    fn end_duel(&self, duel: DuelHandle) -> Result<()> {
        self.enter(Method::EndDuel)?;
        self.ended.lock().push(duel.id());
        Ok(())
    }

    fn set_player_info(
        &self,
        _duel: &DuelHandle,
        playerid: i32,
        lp: i32,
        startcount: i32,
        drawcount: i32,
    ) -> Result<()> {
        self.enter(Method::SetPlayerInfo)?;
        self.players.lock().push((playerid, lp, startcount, drawcount));
        Ok(())
    }

    fn get_log_message(&self, _duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<()> {
        self.enter(Method::GetLogMessage)?;
        buffer.clear();
        Ok(())
    }

    fn get_message(&self, _duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<i32> {
        self.enter(Method::GetMessage)?;
        let len = (*self.last_process.lock() as u32 & 0xFFFF) as usize;
        let len = len.min(buffer.capacity());
        buffer.as_mut_slice()[..len].fill(MESSAGE_FILL);
        Ok(len as i32)
    }

    fn process(&self, _duel: &DuelHandle) -> Result<i32> {
        self.enter(Method::Process)?;
        let value = self.process_script.lock().pop_front().unwrap_or(PROCESS_ENDED);
        *self.last_process.lock() = value;
        Ok(value)
    }

    fn new_card(
        &self,
        _duel: &DuelHandle,
        _code: u32,
        _owner: u8,
        _playerid: u8,
        _location: u8,
        _sequence: u8,
        _position: u8,
    ) -> Result<()> {
        self.enter(Method::NewCard)
    }

    fn new_tag_card(&self, _duel: &DuelHandle, _code: u32, _owner: u8, _location: u8) -> Result<()> {
        self.enter(Method::NewTagCard)
    }

    fn query_card(
        &self,
        _duel: &DuelHandle,
        _playerid: u8,
        _location: u8,
        _sequence: u8,
        _query_flag: i32,
        _buffer: &mut OcgBuffer,
        _use_cache: i32,
    ) -> Result<i32> {
        self.enter(Method::QueryCard)?;
        Ok(0)
    }

    fn query_field_count(&self, _duel: &DuelHandle, _playerid: u8, _location: u8) -> Result<i32> {
        self.enter(Method::QueryFieldCount)?;
        Ok(0)
    }

    fn query_field_card(
        &self,
        _duel: &DuelHandle,
        _playerid: u8,
        _location: u8,
        _query_flag: i32,
        _buffer: &mut OcgBuffer,
        _use_cache: i32,
    ) -> Result<i32> {
        self.enter(Method::QueryFieldCard)?;
        Ok(0)
    }

    fn query_field_info(&self, _duel: &DuelHandle, _buffer: &mut OcgBuffer) -> Result<i32> {
        self.enter(Method::QueryFieldInfo)?;
        Ok(0)
    }

    fn set_responsei(&self, _duel: &DuelHandle, _response: i32) -> Result<()> {
        self.enter(Method::SetResponseI)
    }

    fn set_responseb(&self, _duel: &DuelHandle, _buffer: &OcgBuffer) -> Result<()> {
        self.enter(Method::SetResponseB)
    }

    fn preload_script(&self, _duel: &DuelHandle, path: &str, _length: i32) -> Result<i32> {
        self.enter(Method::PreloadScript)?;
        Ok(i32::from(!path.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failing_method_still_journals() {
        let core = MockCore::new().failing(Method::StartDuel);
        let duel = core.create_duel(1).unwrap();

        let err = core.start_duel(&duel, 0).unwrap_err();
        assert!(matches!(err, OcgError::FfiCallFailed(_)));
        assert_eq!(
            *core.journal().lock(),
            vec!["call:create_duel".to_string(), "call:start_duel".to_string()]
        );
    }

    #[test]
    fn test_get_message_uses_last_process_length() {
        let core = MockCore::new().with_process_script([0x0000_0003]);
        let duel = core.create_duel(1).unwrap();
        let mut buffer = OcgBuffer::new();

        core.process(&duel).unwrap();
        let len = core.get_message(&duel, &mut buffer).unwrap();
        assert_eq!(buffer.filled(len), &[MESSAGE_FILL; 3]);
    }
}
