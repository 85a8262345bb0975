//! Decoding of the packed value returned by `process`

/// What the engine expects after a `process` step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Keep calling `process`
    Continue,
    /// The engine is waiting for a player response
    AwaitingResponse,
    /// The duel is over
    Ended,
    /// Flag value this binding does not know
    Unknown(u16),
}

/// Result of one `process` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessResult {
    raw: i32,
}

impl ProcessResult {
    /// Decode the raw return value
    pub fn from_raw(raw: i32) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> i32 {
        self.raw
    }

    /// Length of the pending message buffer (low 16 bits)
    pub fn message_len(&self) -> usize {
        (self.raw as u32 & 0xFFFF) as usize
    }

    /// Engine status (high 16 bits)
    pub fn status(&self) -> ProcessStatus {
        match (self.raw as u32 >> 16) as u16 {
            0 => ProcessStatus::Continue,
            1 => ProcessStatus::AwaitingResponse,
            2 => ProcessStatus::Ended,
            flag => ProcessStatus::Unknown(flag),
        }
    }
}
