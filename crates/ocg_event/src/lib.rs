//! # ocg_event - Call Interception for OCGCore
//!
//! Wraps any [`ocg_core::OcgCore`] implementation in an [`OcgCoreEmitter`]
//! that publishes an event before and after every native call:
//!
//! | phase   | wildcard topic | per-method topic   |
//! |---------|----------------|--------------------|
//! | before  | `before:call`  | `before:<method>`  |
//! | success | `after:call`   | `after:<method>`   |
//! | failure | `error`        | `error:<method>`   |
//!
//! Wildcard listeners run before per-method listeners, each list in
//! registration order. Everything happens synchronously on the caller's
//! thread; results and errors are returned exactly as the wrapped core
//! produced them.
//!
//! ## Example
//!
//! ```ignore
//! use ocg_core::{Method, OcgCore};
//! use ocg_event::OcgCoreEmitter;
//!
//! let core = OcgCoreEmitter::load("/usr/lib/libocgcore.so")?;
//! core.on_before_call(|e| println!("calling {}", e.method))
//!     .on_after_method(Method::Process, |e| println!("process -> {:?}", e.result))
//!     .on_error(|e| eprintln!("{} failed: {}", e.call.method, e.error));
//!
//! let duel = core.create_duel(12345)?;
//! core.process(&duel)?;
//! core.end_duel(duel)?;
//! ```

mod emitter;
mod event;
mod logging;
mod registry;
mod topic;

pub use emitter::OcgCoreEmitter;
pub use event::{now_millis, CallArg, CallErrorEvent, CallEvent, CallResultEvent, Observed};
pub use logging::{attach_call_logging, CALL_LOG_TARGET};
pub use registry::{AfterListener, BeforeListener, ErrorListener, SubscriptionRegistry};
pub use topic::{Phase, Topic};

/// Prelude
pub mod prelude {
    pub use crate::{
        attach_call_logging, CallArg, CallErrorEvent, CallEvent, CallResultEvent, OcgCoreEmitter,
        Topic,
    };
}
