//! Log every dispatch through the `log` facade

use crate::emitter::OcgCoreEmitter;

/// Log target used for call records
pub const CALL_LOG_TARGET: &str = "ocg_event::calls";

/// Register listeners that log each call
///
/// Before: `trace`. Success: `debug` with the result. Failure: `warn`.
pub fn attach_call_logging<C>(emitter: &OcgCoreEmitter<C>) -> &OcgCoreEmitter<C> {
    emitter
        .on_before_call(|event| {
            log::trace!(target: CALL_LOG_TARGET, "-> {}", event);
        })
        .on_after_call(|event| {
            log::debug!(
                target: CALL_LOG_TARGET,
                "<- {} = {:?}",
                event.call,
                event.result
            );
        })
        .on_error(|event| {
            log::warn!(
                target: CALL_LOG_TARGET,
                "!! {} failed: {}",
                event.call,
                event.error
            );
        })
}
