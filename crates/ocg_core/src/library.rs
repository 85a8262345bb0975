//! Dynamic loading of the native OCGCore library
//!
//! Validates the library path, loads it and resolves every entry point of
//! the binding table up front. Either all symbols resolve or loading fails.

use crate::api::OcgCore;
use crate::binding::Method;
use crate::buffer::OcgBuffer;
use crate::error::{OcgError, Result};
use crate::ffi::*;
use crate::handle::{DuelHandle, NativeOpaque};
use libloading::{Library, Symbol};
use std::ffi::CString;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Information about a loaded library
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    /// Library file path
    pub path: PathBuf,
    /// Number of bound entry points
    pub symbols: usize,
}

/// Resolved function table
struct OcgApi {
    set_script_reader: SetScriptReaderFn,
    set_card_reader: SetCardReaderFn,
    set_message_handler: SetMessageHandlerFn,
    create_duel: CreateDuelFn,
    create_duel_v2: CreateDuelV2Fn,
    start_duel: StartDuelFn,
    end_duel: EndDuelFn,
    set_player_info: SetPlayerInfoFn,
    get_log_message: GetLogMessageFn,
    get_message: GetMessageFn,
    process: ProcessFn,
    new_card: NewCardFn,
    new_tag_card: NewTagCardFn,
    query_card: QueryCardFn,
    query_field_count: QueryFieldCountFn,
    query_field_card: QueryFieldCardFn,
    query_field_info: QueryFieldInfoFn,
    set_responsei: SetResponseIFn,
    set_responseb: SetResponseBFn,
    preload_script: PreloadScriptFn,
}

/// A loaded OCGCore library with every entry point bound
pub struct OcgLibrary {
    api: OcgApi,
    /// Library info
    pub info: LibraryInfo,
    // Dropped last: the function pointers above point into it
    _library: Library,
}

impl OcgLibrary {
    /// Load the library at `path` and bind all entry points
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_path(path)?;

        let library = unsafe {
            Library::new(path).map_err(|e| OcgError::load_error(path, e.to_string()))?
        };

        let api = unsafe { OcgApi::resolve(&library, path)? };

        let info = LibraryInfo {
            path: path.to_path_buf(),
            symbols: Method::ALL.len(),
        };

        log::info!(
            "Loaded OCGCore library '{}' with {} entry points",
            info.path.display(),
            info.symbols
        );

        Ok(Self {
            api,
            info,
            _library: library,
        })
    }

    /// Get the library path
    pub fn path(&self) -> &Path {
        &self.info.path
    }
}

impl Drop for OcgLibrary {
    fn drop(&mut self) {
        log::debug!("Unloading OCGCore library '{}'", self.info.path.display());
    }
}

/// Reject paths that cannot possibly be loaded, before touching the loader
fn check_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(OcgError::EmptyPath);
    }

    if !path.exists() {
        return Err(OcgError::LibraryNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(OcgError::NotAFile(path.to_path_buf()));
    }

    File::open(path).map_err(|source| OcgError::NotReadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Look up one entry point and copy out its function pointer
///
/// # Safety
/// `T` must be the exact function pointer type of the exported symbol.
unsafe fn bind<T: Copy>(library: &Library, path: &Path, method: Method) -> Result<T> {
    let symbol: Symbol<T> = library
        .get(&method.symbol())
        .map_err(|_| OcgError::symbol_not_found(path.display().to_string(), method.name()))?;
    Ok(*symbol)
}

impl OcgApi {
    /// # Safety
    /// The library must export the OCGCore C ABI declared in `ffi`.
    unsafe fn resolve(library: &Library, path: &Path) -> Result<Self> {
        Ok(Self {
            set_script_reader: bind(library, path, Method::SetScriptReader)?,
            set_card_reader: bind(library, path, Method::SetCardReader)?,
            set_message_handler: bind(library, path, Method::SetMessageHandler)?,
            create_duel: bind(library, path, Method::CreateDuel)?,
            create_duel_v2: bind(library, path, Method::CreateDuelV2)?,
            start_duel: bind(library, path, Method::StartDuel)?,
            end_duel: bind(library, path, Method::EndDuel)?,
            set_player_info: bind(library, path, Method::SetPlayerInfo)?,
            get_log_message: bind(library, path, Method::GetLogMessage)?,
            get_message: bind(library, path, Method::GetMessage)?,
            process: bind(library, path, Method::Process)?,
            new_card: bind(library, path, Method::NewCard)?,
            new_tag_card: bind(library, path, Method::NewTagCard)?,
            query_card: bind(library, path, Method::QueryCard)?,
            query_field_count: bind(library, path, Method::QueryFieldCount)?,
            query_field_card: bind(library, path, Method::QueryFieldCard)?,
            query_field_info: bind(library, path, Method::QueryFieldInfo)?,
            set_responsei: bind(library, path, Method::SetResponseI)?,
            set_responseb: bind(library, path, Method::SetResponseB)?,
            preload_script: bind(library, path, Method::PreloadScript)?,
        })
    }
}

fn new_duel(raw: RawDuel, method: Method) -> Result<DuelHandle> {
    // Safety: the pointer comes straight from the library's create call
    let duel = unsafe { DuelHandle::from_raw(raw) }.ok_or(OcgError::NullHandle {
        method: method.name(),
    })?;
    log::debug!("{} created {}", method, duel.id());
    Ok(duel)
}

// Safety for every call below: the pointers were resolved against the
// declared signatures, duel handles are only built from create calls, and
// buffers are allocated at the engine's maximum size.
impl OcgCore for OcgLibrary {
    fn set_script_reader(&self, reader: ScriptReader) -> Result<NativeOpaque> {
        let ptr = unsafe { (self.api.set_script_reader)(reader) };
        Ok(NativeOpaque::new(ptr))
    }

    fn set_card_reader(&self, reader: CardReader) -> Result<()> {
        unsafe { (self.api.set_card_reader)(reader) };
        Ok(())
    }

    fn set_message_handler(&self, handler: MessageHandler) -> Result<()> {
        unsafe { (self.api.set_message_handler)(handler) };
        Ok(())
    }

    fn create_duel(&self, seed: u32) -> Result<DuelHandle> {
        let raw = unsafe { (self.api.create_duel)(seed) };
        new_duel(raw, Method::CreateDuel)
    }

    fn create_duel_v2(&self, seed_sequence: &OcgBuffer) -> Result<DuelHandle> {
        let raw = unsafe { (self.api.create_duel_v2)(seed_sequence.as_ptr()) };
        new_duel(raw, Method::CreateDuelV2)
    }

    fn start_duel(&self, duel: &DuelHandle, options: u32) -> Result<()> {
        unsafe { (self.api.start_duel)(duel.as_raw(), options) };
        Ok(())
    }

    fn end_duel(&self, duel: DuelHandle) -> Result<()> {
        unsafe { (self.api.end_duel)(duel.as_raw()) };
        log::debug!("Ended {}", duel.id());
        Ok(())
    }

    fn set_player_info(
        &self,
        duel: &DuelHandle,
        playerid: i32,
        lp: i32,
        startcount: i32,
        drawcount: i32,
    ) -> Result<()> {
        unsafe { (self.api.set_player_info)(duel.as_raw(), playerid, lp, startcount, drawcount) };
        Ok(())
    }

    fn get_log_message(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<()> {
        unsafe { (self.api.get_log_message)(duel.as_raw(), buffer.as_mut_ptr()) };
        Ok(())
    }

    fn get_message(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<i32> {
        Ok(unsafe { (self.api.get_message)(duel.as_raw(), buffer.as_mut_ptr()) })
    }

    fn process(&self, duel: &DuelHandle) -> Result<i32> {
        Ok(unsafe { (self.api.process)(duel.as_raw()) })
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
        unsafe {
            (self.api.new_card)(duel.as_raw(), code, owner, playerid, location, sequence, position)
        };
        Ok(())
    }

    fn new_tag_card(&self, duel: &DuelHandle, code: u32, owner: u8, location: u8) -> Result<()> {
        unsafe { (self.api.new_tag_card)(duel.as_raw(), code, owner, location) };
        Ok(())
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
        Ok(unsafe {
            (self.api.query_card)(
                duel.as_raw(),
                playerid,
                location,
                sequence,
                query_flag,
                buffer.as_mut_ptr(),
                use_cache,
            )
        })
    }

    fn query_field_count(&self, duel: &DuelHandle, playerid: u8, location: u8) -> Result<i32> {
        Ok(unsafe { (self.api.query_field_count)(duel.as_raw(), playerid, location) })
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
        Ok(unsafe {
            (self.api.query_field_card)(
                duel.as_raw(),
                playerid,
                location,
                query_flag,
                buffer.as_mut_ptr(),
                use_cache,
            )
        })
    }

    fn query_field_info(&self, duel: &DuelHandle, buffer: &mut OcgBuffer) -> Result<i32> {
        Ok(unsafe { (self.api.query_field_info)(duel.as_raw(), buffer.as_mut_ptr()) })
    }

    fn set_responsei(&self, duel: &DuelHandle, response: i32) -> Result<()> {
        unsafe { (self.api.set_responsei)(duel.as_raw(), response) };
        Ok(())
    }

    fn set_responseb(&self, duel: &DuelHandle, buffer: &OcgBuffer) -> Result<()> {
        unsafe { (self.api.set_responseb)(duel.as_raw(), buffer.as_ptr()) };
        Ok(())
    }

    fn preload_script(&self, duel: &DuelHandle, path: &str, length: i32) -> Result<i32> {
        let path = CString::new(path).map_err(|e| OcgError::InvalidString {
            method: Method::PreloadScript.name(),
            message: e.to_string(),
        })?;
        Ok(unsafe { (self.api.preload_script)(duel.as_raw(), path.as_ptr(), length) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_path() {
        assert!(matches!(OcgLibrary::load(""), Err(OcgError::EmptyPath)));
    }

    #[test]
    fn test_missing_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libocgcore.so");

        let err = OcgLibrary::load(&path).err().unwrap();
        assert!(matches!(&err, OcgError::LibraryNotFound(p) if *p == path));
        assert!(err.to_string().contains("libocgcore.so"));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OcgLibrary::load(dir.path()).err().unwrap();
        assert!(matches!(err, OcgError::NotAFile(_)));
    }

    #[test]
    fn test_garbage_file_fails_in_loader() {
        let mut file = tempfile::Builder::new()
            .suffix(".so")
            .tempfile()
            .unwrap();
        file.write_all(b"definitely not a shared object").unwrap();

        let err = OcgLibrary::load(file.path()).err().unwrap();
        assert!(matches!(err, OcgError::LoadError { .. }));
        assert!(err.is_load_error());
    }
}
