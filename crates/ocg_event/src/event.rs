//! Call events published around every intercepted call

use ocg_core::{DuelId, Method, OcgError};
use std::any::Any;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the UNIX epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One recorded call argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Duel(DuelId),
    U8(u8),
    U32(u32),
    I32(i32),
    /// Contents of a buffer read by the native side
    InBuffer(Vec<u8>),
    /// Capacity of a buffer written by the native side
    OutBuffer(usize),
    Text(String),
    Callback,
}

impl fmt::Display for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArg::Duel(id) => write!(f, "{}", id),
            CallArg::U8(v) => write!(f, "{}", v),
            CallArg::U32(v) => write!(f, "{}", v),
            CallArg::I32(v) => write!(f, "{}", v),
            CallArg::InBuffer(bytes) => write_hex(f, bytes),
            CallArg::OutBuffer(cap) => write!(f, "out[{}]", cap),
            CallArg::Text(s) => write!(f, "{:?}", s),
            CallArg::Callback => f.write_str("<callback>"),
        }
    }
}

/// Bytes shown before an input buffer is elided
const HEX_PREVIEW: usize = 32;

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("in[")?;
    for (i, byte) in bytes.iter().take(HEX_PREVIEW).enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{:02x}", byte)?;
    }
    if bytes.len() > HEX_PREVIEW {
        write!(f, " .. +{}", bytes.len() - HEX_PREVIEW)?;
    }
    f.write_str("]")
}

/// A call about to be dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent {
    pub method: Method,
    pub args: Vec<CallArg>,
    /// Milliseconds since the UNIX epoch
    pub timestamp: u64,
}

impl CallEvent {
    /// Record a call, stamped with the current time
    pub fn new(method: Method, args: Vec<CallArg>) -> Self {
        Self {
            method,
            args,
            timestamp: now_millis(),
        }
    }

    /// Duel the call targets, if any
    pub fn duel(&self) -> Option<DuelId> {
        match self.args.first() {
            Some(CallArg::Duel(id)) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

/// A value listeners can inspect and downcast
pub trait Observed: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug> Observed for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A call that returned successfully
///
/// `result` borrows the value that is handed back to the caller.
#[derive(Debug, Clone, Copy)]
pub struct CallResultEvent<'a> {
    pub call: &'a CallEvent,
    pub result: &'a dyn Observed,
}

impl<'a> CallResultEvent<'a> {
    pub fn method(&self) -> Method {
        self.call.method
    }

    /// The result as a concrete type
    pub fn result_as<T: Any>(&self) -> Option<&'a T> {
        let result: &'a dyn Observed = self.result;
        (*result).as_any().downcast_ref::<T>()
    }
}

/// A call that failed
///
/// `error` borrows the error that is handed back to the caller.
#[derive(Debug, Clone, Copy)]
pub struct CallErrorEvent<'a> {
    pub call: &'a CallEvent,
    pub error: &'a OcgError,
}

impl<'a> CallErrorEvent<'a> {
    pub fn method(&self) -> Method {
        self.call.method
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let event = CallEvent::new(
            Method::PreloadScript,
            vec![CallArg::Duel(DuelId(3)), CallArg::Text("c1.lua".into()), CallArg::I32(0)],
        );
        assert_eq!(event.to_string(), "preload_script(duel#3, \"c1.lua\", 0)");
        assert_eq!(event.duel(), Some(DuelId(3)));
    }

    #[test]
    fn test_input_buffer_display_is_bounded() {
        assert_eq!(CallArg::InBuffer(vec![0x39, 0x30, 0, 0]).to_string(), "in[39 30 00 00]");
        assert_eq!(CallArg::InBuffer(Vec::new()).to_string(), "in[]");

        let long = CallArg::InBuffer(vec![0xff; 40]).to_string();
        assert!(long.ends_with(" .. +8]"));
        assert_eq!(long.matches("ff").count(), 32);
    }

    #[test]
    fn test_timestamp_is_recent() {
        let before = now_millis();
        let event = CallEvent::new(Method::CreateDuel, vec![CallArg::U32(1)]);
        assert!(event.timestamp >= before);
        assert_eq!(event.duel(), None);
    }

    #[test]
    fn test_result_downcast() {
        let call = CallEvent::new(Method::Process, Vec::new());
        let value = 0x0002_0000i32;
        let event = CallResultEvent {
            call: &call,
            result: &value,
        };

        assert_eq!(event.result_as::<i32>(), Some(&0x0002_0000));
        assert!(event.result_as::<u32>().is_none());
        assert!(std::ptr::eq(event.result_as::<i32>().unwrap(), &value));
    }
}
