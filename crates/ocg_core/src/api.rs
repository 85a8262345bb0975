//! The capability interface: one method per bound native operation

use crate::buffer::OcgBuffer;
use crate::error::Result;
use crate::ffi::{CardReader, MessageHandler, ScriptReader};
use crate::handle::{DuelHandle, NativeOpaque};

/// Every operation the native duel engine exposes
///
/// Implemented by [`crate::OcgLibrary`] for real native calls and by
/// decorators that wrap another implementation.
#[allow(clippy::too_many_arguments)]
pub trait OcgCore {
    fn set_script_reader(&self, reader: ScriptReader) -> Result<NativeOpaque>;

    fn set_card_reader(&self, reader: CardReader) -> Result<()>;

    fn set_message_handler(&self, handler: MessageHandler) -> Result<()>;

    fn create_duel(&self, seed: u32) -> Result<DuelHandle>;

    /// Create a duel from a packed seed sequence (see [`OcgBuffer::from_seeds`])
    fn create_duel_v2(&self, seed_sequence: &OcgBuffer) -> Result<DuelHandle>;

    fn start_duel(&self, duel: &DuelHandle, options: u32) -> Result<()>;

    /// End a duel; the handle is consumed and cannot be used afterwards
    fn end_duel(&self, duel: DuelHandle) -> Result<()>;

    fn set_player_info(
        &self,
        duel: &DuelHandle,
        playerid: i32,
        lp: i32,
        startcount: i32,
        drawcount: i32,
    ) -> Result<()>;

    fn get_log_message(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<()>;

    fn get_message(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<i32>;

    fn process(&self, duel: &DuelHandle) -> Result<i32>;

    fn new_card(
        &self,
        duel: &DuelHandle,
        code: u32,
        owner: u8,
        playerid: u8,
        location: u8,
        sequence: u8,
        position: u8,
    ) -> Result<()>;

    fn new_tag_card(&self, duel: &DuelHandle, code: u32, owner: u8, location: u8) -> Result<()>;

    fn query_card(
        &self,
        duel: &DuelHandle,
        playerid: u8,
        location: u8,
        sequence: u8,
        query_flag: i32,
        buffer: &mut OcgBuffer,
        use_cache: i32,
    ) -> Result<i32>;

    fn query_field_count(&self, duel: &DuelHandle, playerid: u8, location: u8) -> Result<i32>;

    fn query_field_card(
        &self,
        duel: &DuelHandle,
        playerid: u8,
        location: u8,
        query_flag: i32,
        buffer: &mut OcgBuffer,
        use_cache: i32,
    ) -> Result<i32>;

    fn query_field_info(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<i32>;

    fn set_responsei(&self, duel: &DuelHandle, response: i32) -> Result<()>;

    fn set_responseb(&self, duel: &DuelHandle, buffer: &OcgBuffer) -> Result<()>;

    fn preload_script(&self, duel: &DuelHandle, path: &str, length: i32) -> Result<i32>;
}
