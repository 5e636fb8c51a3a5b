//! Control files
//!
//! A control file (`.flc`) changes how input is read before any FIGcharacter is looked up: which
//! multi-byte encoding the input uses, and which character codes are replaced by which.
//! [`ControlMap`] accumulates any number of them.

use thiserror::Error;
use tracing::debug;

pub use self::decode::{CharacterSet, Decoder, DecoderState, Decoding, InputEncoding};
use crate::font::{FontPath, Location, ordinal};
use crate::str_ext::decode_line;

mod decode;

/// One step of a character mapping
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Ends a group of ranges. Only the first matching range of a group applies.
    Freeze,
    /// Adds `offset` to every code in `low..=high`.
    Range {
        /// Lowest code affected
        low: i32,
        /// Highest code affected
        high: i32,
        /// Added to each affected code
        offset: i32,
    },
}

/// The combined effect of the control files loaded so far
///
/// ```
/// # use figrs::control::ControlMap;
/// let mut controls = ControlMap::new();
/// controls.parse(b"flc2a\nt a-z A-Z\n");
/// assert_eq!(controls.map(i32::from(b'q')), i32::from(b'Q'));
/// assert_eq!(controls.map(i32::from(b'7')), i32::from(b'7'));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlMap {
    loaded: Vec<Location>,
    directives: Vec<Directive>,
    decoding: Decoding,
}

impl ControlMap {
    /// No control files: codes are unchanged and input is read as ISO 2022.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the control file `name` along `path` and adds its directives.
    ///
    /// A file that was already loaded is not added a second time.
    ///
    /// # Errors
    /// [`ControlError::NotFound`] if there is no such file, or any error from reading it. Lines
    /// that cannot be parsed are skipped instead.
    pub fn load(&mut self, name: &str, path: &FontPath) -> Result<(), ControlError> {
        let (location, contents) = path.find_control(name)?;
        if self.loaded.contains(&location) {
            debug!(name, "control file already loaded");
            return Ok(());
        }
        self.parse(&contents);
        self.loaded.push(location);
        Ok(())
    }

    /// Adds the directives of a control file, given its contents.
    ///
    /// Unlike [`ControlMap::load`], this does not check whether the same file was added before.
    pub fn parse(&mut self, contents: &[u8]) {
        self.directives.push(Directive::Freeze);
        for (number, line) in contents.split(|&b| b == b'\n' || b == b'\r').enumerate() {
            let (line, _) = decode_line(line);
            if self.parse_line(&line).is_none() {
                debug!(line = number + 1, "skipping malformed control file line");
            }
        }
    }

    /// Forgets every control file, restoring the plain ISO 2022 input encoding.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The directives of every control file loaded so far, each file starting with a
    /// [`Directive::Freeze`].
    #[must_use]
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// The input encoding and its initial state
    #[must_use]
    pub const fn decoding(&self) -> &Decoding {
        &self.decoding
    }

    /// A decoder for `input` starting from this map's [`Decoding`].
    #[must_use]
    pub fn decoder<'a>(&self, input: &'a [u8]) -> Decoder<'a> {
        Decoder::new(input, DecoderState::new(self.decoding))
    }

    /// Applies the character mapping to one code.
    ///
    /// Within each group of ranges (between [freezes](Directive::Freeze)), the first range
    /// containing the code applies and the rest of the group is skipped. The mapped code then
    /// moves on to the next group, so later control files see the output of earlier ones.
    #[must_use]
    pub fn map(&self, code: i32) -> i32 {
        let mut code = code;
        let mut directives = self.directives.iter();
        while let Some(&directive) = directives.next() {
            if let Directive::Range { low, high, offset } = directive
                && (low..=high).contains(&code)
            {
                code = code.wrapping_add(offset);
                for &skipped in directives.by_ref() {
                    if skipped == Directive::Freeze {
                        break;
                    }
                }
            }
        }
        code
    }

    /// `None` if the line is malformed.
    fn parse_line(&mut self, line: &[char]) -> Option<()> {
        let mut cursor = Cursor { line, position: 0 };
        match cursor.peek() {
            Some('t') => {
                cursor.position += 1;
                cursor.skip_whitespace();
                let first = cursor.character()?;
                let last = if cursor.eat('-') {
                    cursor.character()?
                } else {
                    first
                };
                cursor.skip_whitespace();
                let target = cursor.character()?;
                self.directives.push(Directive::Range {
                    low: first,
                    high: last,
                    offset: target.wrapping_sub(first),
                });
            }
            Some('0'..='9' | '-') => {
                let from = cursor.number()?;
                let to = cursor.number()?;
                self.directives.push(Directive::Range {
                    low: from,
                    high: from,
                    offset: to.wrapping_sub(from),
                });
            }
            Some('f') => self.directives.push(Directive::Freeze),
            Some('b') => self.decoding.encoding = InputEncoding::DoubleByte,
            Some('u') => self.decoding.encoding = InputEncoding::Utf8,
            Some('h') => self.decoding.encoding = InputEncoding::Hz,
            Some('j') => self.decoding.encoding = InputEncoding::ShiftJis,
            Some('g') => {
                cursor.position += 1;
                self.decoding.encoding = InputEncoding::Iso2022;
                cursor.skip_whitespace();
                match cursor.next()? {
                    register @ '0'..='3' => {
                        let register = usize::try_from(register.to_digit(4)?).ok()?;
                        *self.decoding.charsets.get_mut(register)? = cursor.character_set()?;
                    }
                    'l' | 'L' => self.decoding.gl = cursor.register()?,
                    'r' | 'R' => self.decoding.gr = cursor.register()?,
                    _ => return None,
                }
            }
            // comments, blank lines and unknown directives
            _ => {}
        }
        Some(())
    }
}

struct Cursor<'a> {
    line: &'a [char],
    position: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.line.get(self.position).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        let found = self.peek() == Some(expected);
        if found {
            self.position += 1;
        }
        found
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.position += 1;
        }
    }

    /// A possibly negative number: decimal, octal with a leading `0` or hexadecimal with a leading
    /// `0x`.
    fn number(&mut self) -> Option<i32> {
        self.skip_whitespace();
        let negative = self.eat('-');
        let magnitude = if self.eat('0') {
            if self.eat('x') || self.eat('X') {
                self.digits(16)?
            } else {
                self.digits(8).unwrap_or(0)
            }
        } else {
            self.digits(10)?
        };
        let value = if negative { -magnitude } else { magnitude };
        i32::try_from(value).ok()
    }

    fn digits(&mut self, radix: u32) -> Option<i64> {
        let start = self.position;
        let mut value: i64 = 0;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(radix)) {
            value = value
                .checked_mul(radix.into())?
                .checked_add(digit.into())?;
            self.position += 1;
        }
        (self.position > start).then_some(value)
    }

    /// A character argument, possibly written as a backslash escape.
    fn character(&mut self) -> Option<i32> {
        let c = self.next()?;
        if c != '\\' {
            return Some(ordinal(c));
        }
        let Some(escaped) = self.peek() else {
            return Some(ordinal('\\'));
        };
        let control = match escaped {
            'a' => 7,
            'b' => 8,
            'e' => 27,
            'f' => 12,
            'n' => 10,
            'r' => 13,
            't' => 9,
            'v' => 11,
            'x' | 'X' => {
                self.position += 1;
                return i32::try_from(self.digits(16)?).ok();
            }
            '-' | '0'..='9' => return self.number(),
            other => ordinal(other),
        };
        self.position += 1;
        Some(control)
    }

    /// `94 F`, `96 F` or `94x94 F`, where `F` is the final character of the ISO 2022 designation.
    fn character_set(&mut self) -> Option<CharacterSet> {
        self.skip_whitespace();
        if !self.eat('9') {
            return None;
        }
        if self.eat('6') {
            self.skip_whitespace();
            return CharacterSet::single_96(self.character()?);
        }
        if !self.eat('4') {
            return None;
        }
        if self.eat('x') {
            if !(self.eat('9') && self.eat('4')) {
                return None;
            }
            self.skip_whitespace();
            return CharacterSet::double_94(self.character()?);
        }
        self.skip_whitespace();
        CharacterSet::single_94(self.character()?)
    }

    fn register(&mut self) -> Option<usize> {
        let register = usize::try_from(self.number()?).ok()?;
        (register < 4).then_some(register)
    }
}

/// An error in finding a control file
#[derive(Debug, Error)]
pub enum ControlError {
    /// The control file is not in any of the places that were searched.
    #[error("unable to find control file \"{0}\"")]
    NotFound(String),
    /// The control file was found in a zip archive that could not be read.
    #[error("unable to unpack control file: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// The control file was found but could not be read.
    #[error("unable to read control file: {0}")]
    Io(#[from] std::io::Error),
}
