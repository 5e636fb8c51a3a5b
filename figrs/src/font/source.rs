use std::ffi::OsStr;
use std::fs;
use std::io::{self, Cursor, Read as _};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use super::FontError;
use crate::control::ControlError;

/// The suffixes tried when looking for a font, in order
pub const FONT_SUFFIXES: [&str; 2] = [".flf", ".tlf"];

/// The suffix of control files
pub const CONTROL_SUFFIX: &str = ".flc";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Where fonts and control files are looked for
///
/// A resource `name` is looked for, in order:
/// 1. in the font directory, unless `name` contains a directory separator
/// 2. among the resources bundled with the crate (`fonts` feature), by the same condition
/// 3. at `name` itself, relative to the working directory
/// 4. among the bundled resources, by the final component of `name`
///
/// Each of these is tried with the full file name, `name` followed by the suffix. A file that turns
/// out to be a zip archive is replaced by its first entry.
#[derive(Clone, Debug)]
pub struct FontPath {
    dir: PathBuf,
    bundled: bool,
}

impl Default for FontPath {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIR)
    }
}

impl FontPath {
    /// The font directory used when none is given
    pub const DEFAULT_DIR: &'static str = "fonts";

    /// Looks in `dir` first, then the usual places.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            bundled: cfg!(feature = "fonts"),
        }
    }

    /// Never falls back to the bundled resources.
    #[must_use]
    pub fn without_bundled(mut self) -> Self {
        self.bundled = false;
        self
    }

    /// The font directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Finds the contents of the font `name`, trying each of [`FONT_SUFFIXES`] in turn.
    ///
    /// A trailing suffix on `name` itself is ignored, whatever its case.
    ///
    /// # Errors
    /// [`FontError::NotFound`] if no file matches, otherwise any error from reading or unpacking
    /// the first match.
    pub fn find_font(&self, name: &str) -> Result<(Location, Vec<u8>), FontError> {
        let name = FONT_SUFFIXES
            .iter()
            .find_map(|suffix| strip_suffix_ignore_case(name, suffix))
            .unwrap_or(name);
        for suffix in FONT_SUFFIXES {
            if let Some((location, bytes)) = self.find(name, suffix)? {
                return Ok((location, unpack(bytes)?));
            }
        }
        Err(FontError::NotFound(name.to_owned()))
    }

    /// Finds the contents of the control file `name`.
    ///
    /// A trailing [`CONTROL_SUFFIX`] on `name` itself is ignored, whatever its case.
    ///
    /// # Errors
    /// [`ControlError::NotFound`] if no file matches, otherwise any error from reading or
    /// unpacking the first match.
    pub fn find_control(&self, name: &str) -> Result<(Location, Vec<u8>), ControlError> {
        let name = strip_suffix_ignore_case(name, CONTROL_SUFFIX).unwrap_or(name);
        let (location, bytes) = self
            .find(name, CONTROL_SUFFIX)?
            .ok_or_else(|| ControlError::NotFound(name.to_owned()))?;
        Ok((location, unpack(bytes)?))
    }

    fn find(&self, name: &str, suffix: &str) -> io::Result<Option<(Location, Vec<u8>)>> {
        let file_name = format!("{name}{suffix}");
        if !has_dir_separator(name) {
            if let Some(found) = read_file(self.dir.join(&file_name))? {
                return Ok(Some(found));
            }
            if let Some(found) = self.bundled(&file_name) {
                return Ok(Some(found));
            }
        }
        if let Some(found) = read_file(PathBuf::from(&file_name))? {
            return Ok(Some(found));
        }
        let base_name = Path::new(name)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(name);
        Ok(self.bundled(&format!("{base_name}{suffix}")))
    }

    fn bundled(&self, file_name: &str) -> Option<(Location, Vec<u8>)> {
        if !self.bundled {
            return None;
        }
        #[cfg(feature = "fonts")]
        let found = figrs_fonts::lookup(file_name);
        #[cfg(not(feature = "fonts"))]
        let found: Option<&'static [u8]> = None;
        let bytes = found?;
        debug!(file_name, "using bundled resource");
        Some((Location::Bundled(file_name.to_owned()), bytes.to_vec()))
    }
}

/// Where a font or control file was found
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// A file on disk
    File(PathBuf),
    /// One of the resources compiled into the crate, by file name
    Bundled(String),
}

fn read_file(path: PathBuf) -> io::Result<Option<(Location, Vec<u8>)>> {
    match fs::read(&path) {
        Ok(bytes) => {
            debug!(path = %path.display(), "reading resource");
            Ok(Some((Location::File(path), bytes)))
        }
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::IsADirectory | io::ErrorKind::NotADirectory
            ) =>
        {
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// Replaces a zip archive by its first entry. Anything else is returned unchanged.
fn unpack(bytes: Vec<u8>) -> Result<Vec<u8>, ZipError> {
    if !bytes.starts_with(ZIP_MAGIC) {
        return Ok(bytes);
    }
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = archive.by_index(0)?;
    debug!(entry = entry.name(), "unpacking first archive entry");
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents)?;
    Ok(contents)
}

fn has_dir_separator(name: &str) -> bool {
    name.contains(['/', std::path::MAIN_SEPARATOR])
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    let (stem, end) = (name.get(..split)?, name.get(split..)?);
    end.eq_ignore_ascii_case(suffix).then_some(stem)
}
