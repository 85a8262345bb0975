//! # ocg_core - OCGCore FFI Bindings
//!
//! Binds the native OCGCore duel engine (`libocgcore.so` / `.dylib` /
//! `.dll`) through its fixed C ABI. The engine owns all duel logic; this
//! crate only loads the library, resolves its entry points and marshals
//! arguments across the boundary.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │  libocgcore.so  │────▶│   libloading    │
//! └─────────────────┘     └────────┬────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │  Binding table  │────▶│   OcgLibrary    │
//! │ (Method, names) │     │ (fn pointers)   │
//! └─────────────────┘     └────────┬────────┘
//!                                  │ implements
//!                                  ▼
//!                         ┌─────────────────┐
//!                         │  OcgCore trait  │ ◀── decorators (ocg_event)
//!                         └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use ocg_core::{OcgBuffer, OcgCore, OcgLibrary};
//!
//! let core = OcgLibrary::load("/usr/lib/libocgcore.so")?;
//! let duel = core.create_duel_v2(&OcgBuffer::from_seeds(&[12345, 67890, 11111])?)?;
//! core.set_player_info(&duel, 0, 8000, 5, 1)?;
//! core.start_duel(&duel, 0)?;
//! let status = core.process(&duel)?;
//! core.end_duel(duel)?;
//! ```

mod api;
mod binding;
mod buffer;
mod error;
mod ffi;
mod handle;
mod library;
mod process;
mod seed;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::OcgCore;
pub use binding::{Marshal, Method, Signature};
pub use buffer::OcgBuffer;
pub use error::{OcgError, Result};
pub use ffi::*;
pub use handle::{DuelHandle, DuelId, NativeOpaque};
pub use library::{LibraryInfo, OcgLibrary};
pub use process::{ProcessResult, ProcessStatus};
pub use seed::{create_seed_array, read_seed_array};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::OcgCore;
    pub use crate::binding::Method;
    pub use crate::buffer::OcgBuffer;
    pub use crate::error::{OcgError, Result};
    pub use crate::ffi::CardData;
    pub use crate::handle::{DuelHandle, DuelId};
    pub use crate::library::OcgLibrary;
    pub use crate::process::{ProcessResult, ProcessStatus};
}
