//! The intercepting decorator
//!
//! `OcgCoreEmitter` implements [`OcgCore`] by forwarding every operation to
//! the wrapped implementation, publishing a before event ahead of the call
//! and an after or error event once it returns. Arguments, results and
//! errors pass through untouched.

use crate::event::{CallArg, CallErrorEvent, CallEvent, CallResultEvent, Observed};
use crate::registry::SubscriptionRegistry;
use ocg_core::{
    CardReader, DuelHandle, MessageHandler, Method, NativeOpaque, OcgBuffer, OcgCore, OcgLibrary,
    Result, ScriptReader,
};
use std::path::Path;
use std::sync::Arc;

/// Event-emitting wrapper around an [`OcgCore`] implementation
///
/// Listeners run synchronously on the calling thread. A panicking listener
/// is not caught: it unwinds out of the dispatch, skipping the remaining
/// listeners (and the underlying call, when raised in the before phase).
pub struct OcgCoreEmitter<C> {
    core: C,
    registry: SubscriptionRegistry,
}

impl OcgCoreEmitter<OcgLibrary> {
    /// Load the native library and wrap it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(OcgLibrary::load(path)?))
    }
}

impl<C> OcgCoreEmitter<C> {
    /// Wrap an already constructed core
    pub fn new(core: C) -> Self {
        Self {
            core,
            registry: SubscriptionRegistry::new(),
        }
    }

    /// The wrapped core; nothing accessed through it is intercepted
    pub fn inner(&self) -> &C {
        &self.core
    }

    /// Unwrap, dropping all listeners
    pub fn into_inner(self) -> C {
        self.core
    }

    /// The listener table behind the `on_*` methods
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Listen to every call before it is dispatched
    pub fn on_before_call<F>(&self, listener: F) -> &Self
    where
        F: Fn(&CallEvent) + Send + Sync + 'static,
    {
        self.registry.add_before(None, Arc::new(listener));
        self
    }

    /// Listen to every successful call
    pub fn on_after_call<F>(&self, listener: F) -> &Self
    where
        F: Fn(&CallResultEvent<'_>) + Send + Sync + 'static,
    {
        self.registry.add_after(None, Arc::new(listener));
        self
    }

    /// Listen to one method before it is dispatched
    pub fn on_before_method<F>(&self, method: Method, listener: F) -> &Self
    where
        F: Fn(&CallEvent) + Send + Sync + 'static,
    {
        self.registry.add_before(Some(method), Arc::new(listener));
        self
    }

    /// Listen to one method after it succeeds
    pub fn on_after_method<F>(&self, method: Method, listener: F) -> &Self
    where
        F: Fn(&CallResultEvent<'_>) + Send + Sync + 'static,
    {
        self.registry.add_after(Some(method), Arc::new(listener));
        self
    }

    /// Listen to every failed call
    pub fn on_error<F>(&self, listener: F) -> &Self
    where
        F: Fn(&CallErrorEvent<'_>) + Send + Sync + 'static,
    {
        self.registry.add_error(None, Arc::new(listener));
        self
    }

    /// Listen to failures of one method
    pub fn on_error_method<F>(&self, method: Method, listener: F) -> &Self
    where
        F: Fn(&CallErrorEvent<'_>) + Send + Sync + 'static,
    {
        self.registry.add_error(Some(method), Arc::new(listener));
        self
    }
}

impl<C: OcgCore> OcgCoreEmitter<C> {
    /// Run one call through the before / call / after-or-error sequence
    fn dispatch<T, F>(&self, method: Method, args: Vec<CallArg>, call: F) -> Result<T>
    where
        T: Observed,
        F: FnOnce(&C) -> Result<T>,
    {
        let event = CallEvent::new(method, args);
        log::trace!("dispatch {}", event);

        self.registry.publish_before(&event);

        match call(&self.core) {
            Ok(result) => {
                self.registry.publish_after(&CallResultEvent {
                    call: &event,
                    result: &result,
                });
                Ok(result)
            }
            Err(error) => {
                self.registry.publish_error(&CallErrorEvent {
                    call: &event,
                    error: &error,
                });
                Err(error)
            }
        }
    }
}

fn duel_arg(duel: &DuelHandle) -> CallArg {
    CallArg::Duel(duel.id())
}

fn in_buffer(buffer: &OcgBuffer) -> CallArg {
    CallArg::InBuffer(buffer.contents().to_vec())
}

fn out_buffer(buffer: &OcgBuffer) -> CallArg {
    CallArg::OutBuffer(buffer.capacity())
}

impl<C: OcgCore> OcgCore for OcgCoreEmitter<C> {
    fn set_script_reader(&self, reader: ScriptReader) -> Result<NativeOpaque> {
        self.dispatch(Method::SetScriptReader, vec![CallArg::Callback], |core| {
            core.set_script_reader(reader)
        })
    }

    fn set_card_reader(&self, reader: CardReader) -> Result<()> {
        self.dispatch(Method::SetCardReader, vec![CallArg::Callback], |core| {
            core.set_card_reader(reader)
        })
    }

    fn set_message_handler(&self, handler: MessageHandler) -> Result<()> {
        self.dispatch(Method::SetMessageHandler, vec![CallArg::Callback], |core| {
            core.set_message_handler(handler)
        })
    }

    fn create_duel(&self, seed: u32) -> Result<DuelHandle> {
        self.dispatch(Method::CreateDuel, vec![CallArg::U32(seed)], |core| {
            core.create_duel(seed)
        })
    }

    fn create_duel_v2(&self, seed_sequence: &OcgBuffer) -> Result<DuelHandle> {
        self.dispatch(Method::CreateDuelV2, vec![in_buffer(seed_sequence)], |core| {
            core.create_duel_v2(seed_sequence)
        })
    }

    fn start_duel(&self, duel: &DuelHandle, options: u32) -> Result<()> {
        let args = vec![duel_arg(duel), CallArg::U32(options)];
        self.dispatch(Method::StartDuel, args, |core| core.start_duel(duel, options))
    }

    fn end_duel(&self, duel: DuelHandle) -> Result<()> {
        let args = vec![duel_arg(&duel)];
        self.dispatch(Method::EndDuel, args, move |core| core.end_duel(duel))
    }

    fn set_player_info(
        &self,
        duel: &DuelHandle,
        playerid: i32,
        lp: i32,
        startcount: i32,
        drawcount: i32,
    ) -> Result<()> {
        let args = vec![
            duel_arg(duel),
            CallArg::I32(playerid),
            CallArg::I32(lp),
            CallArg::I32(startcount),
            CallArg::I32(drawcount),
        ];
        self.dispatch(Method::SetPlayerInfo, args, |core| {
            core.set_player_info(duel, playerid, lp, startcount, drawcount)
        })
    }

    fn get_log_message(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<()> {
        let args = vec![duel_arg(duel), out_buffer(buffer)];
        self.dispatch(Method::GetLogMessage, args, |core| {
            core.get_log_message(duel, buffer)
        })
    }

    fn get_message(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<i32> {
        let args = vec![duel_arg(duel), out_buffer(buffer)];
        self.dispatch(Method::GetMessage, args, |core| core.get_message(duel, buffer))
    }

    fn process(&self, duel: &DuelHandle) -> Result<i32> {
        self.dispatch(Method::Process, vec![duel_arg(duel)], |core| core.process(duel))
    }

    fn new_card(
        &self,
        duel: &DuelHandle,
        code: u32,
        owner: u8,
        playerid: u8,
        location: u8,
        sequence: u8,
        position: u8,
    ) -> Result<()> {
        let args = vec![
            duel_arg(duel),
            CallArg::U32(code),
            CallArg::U8(owner),
            CallArg::U8(playerid),
            CallArg::U8(location),
            CallArg::U8(sequence),
            CallArg::U8(position),
        ];
        self.dispatch(Method::NewCard, args, |core| {
            core.new_card(duel, code, owner, playerid, location, sequence, position)
        })
    }

    fn new_tag_card(&self, duel: &DuelHandle, code: u32, owner: u8, location: u8) -> Result<()> {
        let args = vec![
            duel_arg(duel),
            CallArg::U32(code),
            CallArg::U8(owner),
            CallArg::U8(location),
        ];
        self.dispatch(Method::NewTagCard, args, |core| {
            core.new_tag_card(duel, code, owner, location)
        })
    }

    fn query_card(
        &self,
        duel: &DuelHandle,
        playerid: u8,
        location: u8,
        sequence: u8,
        query_flag: i32,
        buffer: &mut OcgBuffer,
        use_cache: i32,
    ) -> Result<i32> {
        let args = vec![
            duel_arg(duel),
            CallArg::U8(playerid),
            CallArg::U8(location),
            CallArg::U8(sequence),
            CallArg::I32(query_flag),
            out_buffer(buffer),
            CallArg::I32(use_cache),
        ];
        self.dispatch(Method::QueryCard, args, |core| {
            core.query_card(duel, playerid, location, sequence, query_flag, buffer, use_cache)
        })
    }

    fn query_field_count(&self, duel: &DuelHandle, playerid: u8, location: u8) -> Result<i32> {
        let args = vec![duel_arg(duel), CallArg::U8(playerid), CallArg::U8(location)];
        self.dispatch(Method::QueryFieldCount, args, |core| {
            core.query_field_count(duel, playerid, location)
        })
    }

    fn query_field_card(
        &self,
        duel: &DuelHandle,
        playerid: u8,
        location: u8,
        query_flag: i32,
        buffer: &mut OcgBuffer,
        use_cache: i32,
    ) -> Result<i32> {
        let args = vec![
            duel_arg(duel),
            CallArg::U8(playerid),
            CallArg::U8(location),
            CallArg::I32(query_flag),
            out_buffer(buffer),
            CallArg::I32(use_cache),
        ];
        self.dispatch(Method::QueryFieldCard, args, |core| {
            core.query_field_card(duel, playerid, location, query_flag, buffer, use_cache)
        })
    }

    fn query_field_info(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<i32> {
        let args = vec![duel_arg(duel), out_buffer(buffer)];
        self.dispatch(Method::QueryFieldInfo, args, |core| {
            core.query_field_info(duel, buffer)
        })
    }

    fn set_responsei(&self, duel: &DuelHandle, response: i32) -> Result<()> {
        let args = vec![duel_arg(duel), CallArg::I32(response)];
        self.dispatch(Method::SetResponseI, args, |core| {
            core.set_responsei(duel, response)
        })
    }

    fn set_responseb(&self, duel: &DuelHandle, buffer: &OcgBuffer) -> Result<()> {
        let args = vec![duel_arg(duel), in_buffer(buffer)];
        self.dispatch(Method::SetResponseB, args, |core| core.set_responseb(duel, buffer))
    }

    fn preload_script(&self, duel: &DuelHandle, path: &str, length: i32) -> Result<i32> {
        let args = vec![
            duel_arg(duel),
            CallArg::Text(path.to_string()),
            CallArg::I32(length),
        ];
        self.dispatch(Method::PreloadScript, args, |core| {
            core.preload_script(duel, path, length)
        })
    }
}
