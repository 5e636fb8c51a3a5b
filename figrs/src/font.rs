//! FIGfonts
//!
//! Font types, the logic for parsing `.flf` and `.tlf` files, and finding them by name.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::num::NonZero;

use bstr::{BString, ByteSlice as _};
#[cfg(feature = "fonts")]
pub use figrs_fonts::FontFile;
use thiserror::Error;

pub use self::header::{Hardblank, Header, HeaderError, Magic, PrintDirection};
pub use self::source::{CONTROL_SUFFIX, FONT_SUFFIXES, FontPath, Location};
use crate::render::Renderer;
use crate::str_ext::decode_line;

mod header;
mod source;

/// The seven Deutsch characters that every FIGfont provides after the printable ASCII characters
pub const DEUTSCH_CODEPOINTS: [char; 7] = ['Ä', 'Ö', 'Ü', 'ä', 'ö', 'ü', 'ß'];

/// Number of FIGcharacters every FIGfont provides without a code tag
pub const REQUIRED_CHARACTERS: usize = 102;

/// The codepoints for characters that are included in all FIGfonts, in file order
///
/// Consists of the 95 printable ASCII characters followed by [`DEUTSCH_CODEPOINTS`].
pub fn default_codepoints() -> impl Iterator<Item = char> {
    (' '..='~').chain(DEUTSCH_CODEPOINTS)
}

/// The character code of a `char`
pub(crate) fn ordinal(c: char) -> i32 {
    i32::try_from(u32::from(c)).unwrap_or(i32::MAX)
}

/// A FIGfont
#[derive(Debug)]
pub struct Font {
    header: Header,
    comments: String,
    glyphs: HashMap<i32, Glyph>,
    code_tag_descriptions: HashMap<i32, String>,
    missing: Glyph,
    max_width: usize,
    is_utf8: bool,
}

impl Font {
    /// Decodes the contents of an `.flf` or `.tlf` file.
    ///
    /// This is a convenience wrapper around [`Font::from_bytes_with_warnings`], ignoring the
    /// warnings.
    ///
    /// # Errors
    /// Returns `Err` on a fatal decoding error; see [`FontError`] for details.
    pub fn from_bytes(font: impl AsRef<[u8]>) -> Result<Self, FontError> {
        Self::from_bytes_with_warnings(font).map(|(font, _)| font)
    }

    /// Decodes the contents of an `.flf` or `.tlf` file and also returns any non-fatal issues
    /// found while decoding.
    ///
    /// See [`FontWarning`] for details on these warnings. Damaged FIGcharacters are repaired rather
    /// than rejected: rows missing at the end of the file are empty, and rows of the wrong width
    /// are padded or cut to the width of the first row.
    ///
    /// # Errors
    /// Returns `Err` on a fatal decoding error; see [`FontError`] for details.
    pub fn from_bytes_with_warnings(
        bytes: impl AsRef<[u8]>,
    ) -> Result<(Self, Vec<FontWarning>), FontError> {
        let bytes = bytes.as_ref();
        if Magic::from_prefix(bytes).is_none() {
            let found = bytes.get(..4).unwrap_or(bytes);
            return Err(FontError::Magic(found.into()));
        }
        let mut warnings = Vec::new();
        let font_string: BString = bytes
            .replace("\r\n", "\n")
            .into_iter()
            .map(|c| if c == b'\r' { b'\n' } else { c })
            .collect();

        let mut lines = font_string.lines();
        let Some(header_line) = lines.next() else {
            return Err(FontError::BadHeader(HeaderError::Missing));
        };
        let (header_line, _) = decode_line(header_line);
        let header_line: String = header_line.into_iter().collect();
        let header = Header::decode_with_warnings(&header_line, &mut warnings)?;
        let comments: Vec<_> = lines.by_ref().take(header.comment_lines).collect();
        if comments.len() < header.comment_lines {
            warnings.push(FontWarning::MissingComments {
                found: comments.len(),
                expected: header.comment_lines,
            });
        }
        let comments = String::from_utf8_lossy(&bstr::join("\n", comments)).into_owned();
        let mut font = Self {
            header,
            comments,
            glyphs: HashMap::new(),
            code_tag_descriptions: HashMap::new(),
            missing: Glyph::empty(header.height),
            max_width: 0,
            is_utf8: true,
        };
        font.decode_characters(&mut lines, &mut warnings)?;

        Ok((font, warnings))
    }

    /// Finds a font by name along `path` and decodes it.
    ///
    /// A trailing `.flf` or `.tlf` is ignored. See [`FontPath`] for where fonts are looked for.
    ///
    /// # Errors
    /// [`FontError::NotFound`] if there is no such font anywhere along the path, or any error from
    /// reading or decoding it.
    pub fn load_with_warnings(
        name: &str,
        path: &FontPath,
    ) -> Result<(Self, Vec<FontWarning>), FontError> {
        let (_, bytes) = path.find_font(name)?;
        Self::from_bytes_with_warnings(bytes)
    }

    /// Like [`Font::load_with_warnings`], ignoring the warnings.
    ///
    /// # Errors
    /// See [`Font::load_with_warnings`].
    pub fn load(name: &str, path: &FontPath) -> Result<Self, FontError> {
        Self::load_with_warnings(name, path).map(|(font, _)| font)
    }

    /// Decodes a FIGfont from the `figrs-fonts` crate.
    ///
    /// Only available with the `fonts` feature.
    #[expect(clippy::missing_panics_doc, reason = "should be caught in tests")]
    #[cfg(feature = "fonts")]
    #[must_use]
    pub fn built_in(font: FontFile) -> Self {
        Self::from_bytes(font.as_bytes()).expect("Should be tested")
    }

    /// Renders a string with default settings provided by the font, at the default width.
    #[must_use]
    pub fn render(&self, string: &str) -> String {
        Renderer::new(self).render(string)
    }

    /// The *comments* portion of the FIGfont, between the header and the FIGcharacters. Usually
    /// contains information about the font author.
    #[must_use]
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// The fully decoded font header.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// The text following the character code on each code tag line, if any.
    #[must_use]
    pub const fn code_tag_descriptions(&self) -> &HashMap<i32, String> {
        &self.code_tag_descriptions
    }

    /// Returns true if each row of each FIGcharacter in the font is a valid UTF-8 string.
    /// Otherwise the rows were read as Latin-1.
    #[must_use]
    pub const fn is_utf8(&self) -> bool {
        self.is_utf8
    }

    /// The maximum width across all FIGcharacters in this font, measured in sub-characters.
    #[must_use]
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    /// The FIGcharacter with exactly this character code, if the font has one.
    #[must_use]
    pub fn glyph(&self, code: i32) -> Option<&Glyph> {
        self.glyphs.get(&code)
    }

    /// Number of distinct FIGcharacters in the font
    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The FIGcharacter used to render `code`: its own, else the font's character 0, else an empty
    /// one.
    pub(crate) fn glyph_or_missing(&self, code: i32) -> &Glyph {
        self.glyphs
            .get(&code)
            .or_else(|| self.glyphs.get(&0))
            .unwrap_or(&self.missing)
    }

    fn decode_characters<'a>(
        &mut self,
        lines: &mut impl Iterator<Item = &'a [u8]>,
        warnings: &mut Vec<FontWarning>,
    ) -> Result<(), FontError> {
        for codepoint in default_codepoints() {
            let code = ordinal(codepoint);
            let glyph = Glyph::parse(lines.by_ref(), code, &self.header, warnings);
            self.insert(code, glyph, warnings);
        }
        let mut code_tags = 0;
        while let Some(line) = lines.next() {
            let line = line.to_str_lossy();
            let line = line.trim();
            let (code, description) = line
                .split_once(char::is_whitespace)
                .map_or((line, ""), |(code, description)| (code, description.trim()));
            let Some(code) = Self::parse_codepoint(code) else {
                if !line.is_empty() {
                    warnings.push(FontWarning::AfterCharacters(line.to_owned()));
                }
                break;
            };
            let code = i32::try_from(code).map_err(|_| FontError::CharacterCodeOutOfRange(code))?;
            if !description.is_empty() {
                self.code_tag_descriptions
                    .entry(code)
                    .or_insert_with(|| description.to_owned());
            }
            let glyph = Glyph::parse(lines.by_ref(), code, &self.header, warnings);
            self.insert(code, glyph, warnings);
            code_tags += 1;
        }
        if code_tags < self.header.code_tag_count {
            warnings.push(FontWarning::TooFewCodeTags {
                found: code_tags,
                expected: self.header.code_tag_count,
            });
        }
        self.max_width = self.glyphs.values().map(Glyph::width).max().unwrap_or(0);
        Ok(())
    }

    fn insert(&mut self, code: i32, glyph: Glyph, warnings: &mut Vec<FontWarning>) {
        self.is_utf8 &= glyph.is_utf8;
        // If two FIGcharacters have the same character code, the first one is the one used.
        match self.glyphs.entry(code) {
            Entry::Occupied(_) => warnings.push(FontWarning::DuplicateCode(code)),
            Entry::Vacant(entry) => {
                entry.insert(glyph);
            }
        }
    }

    /// Parses the character code of a code tag: decimal, octal with a leading `0`, or hexadecimal
    /// with a leading `0x`, possibly negative. `None` if `codepoint` is not a number at all.
    pub(crate) fn parse_codepoint(codepoint: &str) -> Option<i64> {
        let (negative, codepoint) = codepoint
            .strip_prefix('-')
            .map_or((false, codepoint), |codepoint| (true, codepoint));
        let (digits, radix) = if let Some(hex) = codepoint
            .strip_prefix("0x")
            .or_else(|| codepoint.strip_prefix("0X"))
        {
            (hex, 16)
        } else if let Some(octal) = codepoint.strip_prefix('0')
            && !octal.is_empty()
        {
            (octal, 8)
        } else {
            (codepoint, 10)
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        let magnitude = i64::from_str_radix(digits, radix).ok()?;
        Some(if negative { -magnitude } else { magnitude })
    }
}

/// A single FIGcharacter: rows of sub-characters, all of the same width
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    width: usize,
    rows: Vec<Vec<char>>,
    is_utf8: bool,
}

impl Glyph {
    /// The number of sub-characters in each row
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// The rows, top to bottom. There are exactly as many as the font's height.
    #[must_use]
    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    fn empty(height: NonZero<usize>) -> Self {
        Self {
            width: 0,
            rows: vec![Vec::new(); height.get()],
            is_utf8: true,
        }
    }

    #[expect(
        single_use_lifetimes,
        reason = "https://github.com/rust-lang/rust/issues/137575"
    )]
    fn parse<'a>(
        mut lines: impl Iterator<Item = &'a [u8]>,
        code: i32,
        header: &Header,
        warnings: &mut Vec<FontWarning>,
    ) -> Self {
        let mut too_large_length = None;
        let mut blank_end_mark = false;
        let mut truncated = false;
        let mut is_utf8 = true;
        let mut rows = Vec::with_capacity(header.height.get());
        for _ in 0..header.height.get() {
            let Some(line) = lines.next() else {
                truncated = true;
                rows.push(Vec::new());
                continue;
            };
            if line.len() > header.max_length {
                too_large_length = Some(line.len());
            }
            let (mut row, utf8) = decode_line(line);
            is_utf8 &= utf8;
            let content = row.iter().rposition(|c| !c.is_whitespace()).map_or(0, |i| i + 1);
            if content < row.len() {
                blank_end_mark = true;
                row.truncate(content);
            }
            if let Some(&end_mark) = row.last() {
                let marks = row.iter().rev().take(2).take_while(|&&c| c == end_mark).count();
                row.truncate(row.len() - marks);
            }
            rows.push(row);
        }
        if truncated {
            warnings.push(FontWarning::TruncatedCharacter(code));
        }
        if let Some(length) = too_large_length {
            warnings.push(FontWarning::ExcessLength {
                code,
                length,
                max_length: header.max_length,
            });
        }
        if blank_end_mark {
            warnings.push(FontWarning::BlankEndMark(code));
        }
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            warnings.push(FontWarning::InconsistentWidth(code));
            for row in &mut rows {
                row.resize(width, ' ');
            }
        }

        Self {
            width,
            rows,
            is_utf8,
        }
    }
}

/// An error in decoding or finding a FIGfont
#[derive(Debug, Error)]
pub enum FontError {
    /// The font is not in any of the places that were searched.
    #[error("unable to find font \"{0}\"")]
    NotFound(String),
    /// The contents do not begin with `"flf2"` or `"tlf2"`.
    #[error(r#"not a FIGfont, starts with "{0}""#)]
    Magic(BString),
    /// An error in decoding the header
    #[error("Bad header: {0}")]
    BadHeader(#[from] HeaderError),
    /// A code tag outside the range of `i32`
    #[error("character code {0} is out of range")]
    CharacterCodeOutOfRange(i64),
    /// The font was found in a zip archive that could not be read.
    #[error("unable to unpack font: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// The font was found but could not be read.
    #[error("unable to read font: {0}")]
    Io(#[from] std::io::Error),
}

/// A non-fatal issue with a FIGfont found while decoding
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FontWarning {
    /// The height parameter is less than 1, so 1 is used instead.
    #[error("height {0} is less than 1")]
    HeightClamped(i64),
    /// The baseline parameter cannot be parsed as a `usize`.
    #[error(r#"could not parse "{0}" as the baseline parameter"#)]
    Baseline(String),
    /// The baseline parameter is not between 1 and the height parameter (inclusive).
    #[error("baseline {baseline} not between 1 and {height} (height)")]
    BaselineOutOfRange {
        /// The baseline parameter
        baseline: usize,
        /// The height parameter
        height: NonZero<usize>,
    },
    /// An optional header parameter cannot be parsed. It and the parameters after it are ignored.
    #[error(r#"could not parse "{value}" as the parameter `{name}`"#)]
    OptionalParameter {
        /// The name of the parameter
        name: &'static str,
        /// The text found in its place
        value: String,
    },
    /// `Old_Layout` and `Full_Layout` disagree. `Full_Layout` is used.
    #[error("inconsistent layout parameters: {old_layout} and {full_layout}")]
    InconsistentLayout {
        /// The `Old_Layout` parameter
        old_layout: i8,
        /// The `Full_Layout` parameter
        full_layout: u16,
    },
    /// The file ends inside the comments.
    #[error("found {found} comment lines but expected {expected} from header")]
    MissingComments {
        /// The number of comment lines in the font
        found: usize,
        /// The number of comment lines specified in the header
        expected: usize,
    },
    /// The file ends inside a FIGcharacter. The missing rows are empty.
    #[error("FIGcharacter with code {} is cut short", Self::char_debug(*.0))]
    TruncatedCharacter(i32),
    /// The font contains fewer tagged characters than specified in the header.
    #[error("found {found} tagged characters but expected {expected} from header")]
    TooFewCodeTags {
        /// The number of tagged characters in the font
        found: usize,
        /// The number of tagged characters specified in the header
        expected: usize,
    },
    /// A character code appears twice. The second FIGcharacter is ignored.
    #[error("FIGcharacter with code {} appears more than once", Self::char_debug(*.0))]
    DuplicateCode(i32),
    /// A FIGcharacter has rows of different widths. They are padded or cut to the width of the
    /// first row.
    #[error("FIGcharacter with code {} has inconsistent width", Self::char_debug(*.0))]
    InconsistentWidth(i32),
    /// A FIGcharacter has a row longer than the maximum specified in the header.
    #[error("FIGcharacter with code {} has width {length} > {} (from header)", Self::char_debug(*.code), .max_length)]
    ExcessLength {
        /// The character code
        code: i32,
        /// The length of a row that is too wide
        length: usize,
        /// The maximum length of a row specified in the header
        max_length: usize,
    },
    /// The FIGfont contains data after the characters that is not a code tag.
    #[error("unexpected content after characters: {0}")]
    AfterCharacters(String),
    /// A row in a FIGcharacter has trailing whitespace after its endmarks, or uses a blank as an
    /// endmark.
    #[error("FIGcharacter with code {} has trailing whitespace", Self::char_debug(*.0))]
    BlankEndMark(i32),
}

impl FontWarning {
    pub(crate) fn char_debug(code: i32) -> String {
        u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| format!("{code}"), |char| format!("{char:?}"))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fmt::Write as _;

    use proptest::prelude::*;

    use super::{
        DEUTSCH_CODEPOINTS, Font, FontError, FontWarning, Glyph, Magic, REQUIRED_CHARACTERS,
        default_codepoints, ordinal,
    };

    /// Builds the text of a FIGfont whose required characters are the character itself on each of
    /// `height` rows, with `@` endmarks. The space is a hardblank.
    ///
    /// `glyphs` replaces required characters or adds code-tagged ones. Each glyph is given as its
    /// rows without endmarks.
    pub(crate) fn synthetic_font(header: &str, height: usize, glyphs: &[(i32, &[&str])]) -> String {
        fn write_glyph(font: &mut String, rows: &[&str]) {
            for (i, row) in rows.iter().enumerate() {
                let mark = if row.ends_with('@') { "#" } else { "@" };
                let end = if i + 1 == rows.len() { mark.repeat(2) } else { mark.to_owned() };
                writeln!(font, "{row}{end}").unwrap();
            }
        }

        let hardblank = header.chars().nth(5).unwrap_or('$');
        let mut font = format!("{header}\ncomment\n");
        for c in default_codepoints() {
            let code = ordinal(c);
            if let Some((_, rows)) = glyphs.iter().find(|(g, _)| *g == code) {
                write_glyph(&mut font, rows);
            } else {
                let row = if c == ' ' { hardblank.to_string() } else { c.to_string() };
                write_glyph(&mut font, &vec![row.as_str(); height]);
            }
        }
        let required: Vec<_> = default_codepoints().map(ordinal).collect();
        for (code, rows) in glyphs.iter().filter(|(g, _)| !required.contains(g)) {
            writeln!(font, "{code} tagged").unwrap();
            write_glyph(&mut font, rows);
        }
        font
    }

    #[test]
    fn required_characters() {
        assert_eq!(default_codepoints().count(), REQUIRED_CHARACTERS);
        assert_eq!(default_codepoints().nth(95), Some(DEUTSCH_CODEPOINTS[0]));
    }

    #[test]
    fn parse_synthetic() {
        let text = synthetic_font(
            "flf2a$ 2 2 8 0 1 0 64 1",
            2,
            &[(ordinal('A'), &["/\\", "||"]), (0x100, &["<>", "<>"])],
        );
        let (font, warnings) = Font::from_bytes_with_warnings(&text).unwrap();
        assert_eq!(warnings, []);
        assert_eq!(font.header().magic, Magic::Figlet);
        assert_eq!(font.comments(), "comment");
        assert_eq!(font.glyph_count(), REQUIRED_CHARACTERS + 1);
        let a = font.glyph(ordinal('A')).unwrap();
        assert_eq!(a.width(), 2);
        assert_eq!(a.rows(), [vec!['/', '\\'], vec!['|', '|']]);
        assert_eq!(font.glyph(0x100).unwrap().width(), 2);
        assert_eq!(font.code_tag_descriptions()[&0x100], "tagged");
        assert_eq!(font.max_width(), 2);
        assert!(font.is_utf8());
    }

    #[test]
    fn endmarks_and_whitespace() {
        let text = synthetic_font(
            "flf2a$ 3 2 8 0 1",
            3,
            // a doubled endmark inside the data survives, only two are stripped
            &[(ordinal('B'), &["B##", "B  ", "B@ "])],
        );
        let (font, warnings) = Font::from_bytes_with_warnings(text.replace("B@ @@", "B@ @@  "))
            .unwrap();
        let b = font.glyph(ordinal('B')).unwrap();
        assert_eq!(b.width(), 3);
        assert_eq!(b.rows()[0], ['B', '#', '#']);
        assert_eq!(b.rows()[1], ['B', ' ', ' ']);
        assert_eq!(b.rows()[2], ['B', '@', ' ']);
        assert_eq!(warnings, [FontWarning::BlankEndMark(ordinal('B'))]);
    }

    #[test]
    fn inconsistent_width_is_normalised() {
        let text = synthetic_font("flf2a$ 3 2 8 0 1", 3, &[(ordinal('C'), &["CC", "C", "CCC"])]);
        let (font, warnings) = Font::from_bytes_with_warnings(text).unwrap();
        assert_eq!(warnings, [FontWarning::InconsistentWidth(ordinal('C'))]);
        let c = font.glyph(ordinal('C')).unwrap();
        assert_eq!(c.rows(), [vec!['C', 'C'], vec!['C', ' '], vec!['C', 'C']]);
    }

    #[test]
    fn first_glyph_wins() {
        let mut text = synthetic_font("flf2a$ 1 1 8 0 1", 1, &[(0x41, &["first"])]);
        text.push_str("65\nsecond@@\n");
        let (font, warnings) = Font::from_bytes_with_warnings(text).unwrap();
        assert_eq!(warnings, [FontWarning::DuplicateCode(0x41)]);
        let a: String = font.glyph(0x41).unwrap().rows()[0].iter().collect();
        assert_eq!(a, "first");
    }

    #[test]
    fn truncated_font() {
        let text = "flf2a$ 2 1 8 0 0\n @\n @@\n!@\n";
        let (font, warnings) = Font::from_bytes_with_warnings(text).unwrap();
        assert_eq!(font.glyph(ordinal('!')).unwrap().rows(), [vec!['!'], vec![' ']]);
        assert!(font.glyph(ordinal('~')).unwrap().rows().iter().all(Vec::is_empty));
        assert!(warnings.contains(&FontWarning::TruncatedCharacter(ordinal('!'))));
        assert!(warnings.contains(&FontWarning::InconsistentWidth(ordinal('!'))));
        assert!(warnings.contains(&FontWarning::TruncatedCharacter(ordinal('ß'))));
    }

    #[test]
    fn missing_glyph_fallback() {
        let text = synthetic_font("flf2a$ 1 1 8 0 1", 1, &[]);
        let font = Font::from_bytes(&text).unwrap();
        let missing = font.glyph_or_missing(0x263A);
        assert_eq!(missing.width(), 0);
        assert_eq!(missing.rows().len(), 1);

        let text = synthetic_font("flf2a$ 1 1 8 0 1", 1, &[(0, &["?"])]);
        let font = Font::from_bytes(&text).unwrap();
        assert_eq!(font.glyph_or_missing(0x263A).rows()[0], ['?']);
    }

    #[test]
    fn latin1_rows() {
        let text = synthetic_font("flf2a$ 1 1 8 0 1", 1, &[]);
        let mut bytes = text.into_bytes();
        bytes.extend_from_slice(b"0xE9\n\xe9\xe9@@\n");
        let font = Font::from_bytes(&bytes).unwrap();
        assert!(!font.is_utf8());
        assert_eq!(font.glyph(0xE9).unwrap().rows()[0], ['é', 'é']);
    }

    #[test]
    fn code_tags() {
        assert_eq!(Font::parse_codepoint("0"), Some(0));
        assert_eq!(Font::parse_codepoint("0x1F"), Some(31));
        assert_eq!(Font::parse_codepoint("0X1f"), Some(31));
        assert_eq!(Font::parse_codepoint("017"), Some(15));
        assert_eq!(Font::parse_codepoint("-0x10"), Some(-16));
        assert_eq!(Font::parse_codepoint("-2"), Some(-2));
        assert_eq!(Font::parse_codepoint("--2"), None);
        assert_eq!(Font::parse_codepoint("0x-1"), None);
        assert_eq!(Font::parse_codepoint("end"), None);

        let mut text = synthetic_font("flf2a$ 1 1 8 0 1 0 64 3", 1, &[(-2, &["neg"])]);
        text.push_str("not a tag\n");
        let (font, warnings) = Font::from_bytes_with_warnings(text).unwrap();
        assert_eq!(font.glyph(-2).unwrap().width(), 3);
        assert_eq!(
            warnings,
            [
                FontWarning::AfterCharacters("not a tag".to_owned()),
                FontWarning::TooFewCodeTags {
                    found: 1,
                    expected: 3
                }
            ]
        );

        let mut text = synthetic_font("flf2a$ 1 1 8 0 1", 1, &[]);
        text.push_str("0x100000000\nx@@\n");
        assert!(matches!(
            Font::from_bytes(text),
            Err(FontError::CharacterCodeOutOfRange(0x1_0000_0000))
        ));
    }

    #[test]
    fn bad_magic() {
        assert!(matches!(
            Font::from_bytes("flf3a$ 1 1 8 0 0"),
            Err(FontError::Magic(magic)) if magic == "flf3"
        ));
        assert!(matches!(Font::from_bytes("fl"), Err(FontError::Magic(_))));
    }

    #[test]
    fn toilet_magic() {
        let text = synthetic_font("tlf2a$ 1 1 8 0 1", 1, &[(ordinal('x'), &["✗"])]);
        let font = Font::from_bytes(text).unwrap();
        assert_eq!(font.header().magic, Magic::Toilet);
        assert_eq!(font.glyph(ordinal('x')).unwrap().rows()[0], ['✗']);
    }

    #[cfg(feature = "fonts")]
    #[test]
    fn parse_all() {
        use super::FontFile;

        for font in FontFile::ALL {
            let (font, warnings) = Font::from_bytes_with_warnings(font.as_bytes())
                .unwrap_or_else(|e| panic!("failed to parse {font:?}: {e:?}"));
            assert_eq!(warnings, [], "warnings produced when parsing {font:?}");
            assert_eq!(font.glyph_count(), REQUIRED_CHARACTERS);
            assert_eq!(font.header().hardblank, '\u{7f}');
            assert_eq!(
                font.glyph(ordinal('@')).map(Glyph::rows),
                Some([vec!['@']].as_slice())
            );
        }
    }

    proptest! {
        #[test]
        fn rows_share_the_first_width(rows in proptest::collection::vec("[a-z |/_]{0,6}", 3)) {
            let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
            let text = synthetic_font("flf2a$ 3 2 8 0 1", 3, &[(ordinal('G'), rows.as_slice())]);
            let font = Font::from_bytes(text).unwrap();
            let glyph = font.glyph(ordinal('G')).unwrap();
            prop_assert_eq!(glyph.width(), rows[0].len());
            prop_assert!(glyph.rows().iter().all(|row| row.len() == glyph.width()));
        }
    }
}
