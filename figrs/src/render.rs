//! Renderer and rendering settings
mod layout;
mod line;

use std::fmt::{self, Display, Formatter, Write as _};
use std::iter::repeat_n;
use std::num::NonZero;

use tracing::trace;

pub use self::layout::{Layout, LayoutDecodeError, LayoutMode, SmushOverride, Smushing};
use self::line::{Line, LineSettings};
use crate::control::ControlMap;
use crate::font::{DEUTSCH_CODEPOINTS, Font, Glyph, Hardblank, Header, PrintDirection, ordinal};

const TAB: i32 = 0x09;
const NEWLINE: i32 = 0x0A;
const SPACE: i32 = 0x20;
const DELETE: i32 = 0x7F;

/// The output width used unless [`Renderer::width`] says otherwise
pub const DEFAULT_WIDTH: NonZero<usize> = NonZero::new(80).unwrap();

/// The main type for rendering
///
/// Use [`render()`](Renderer::render) to process strings.
///
/// The other methods are meant to be used in a builder pattern. Anything not set is taken from the
/// font header, or else from the defaults of `figlet`: 80 columns, automatic justification, no
/// paragraph mode and no control files.
/// ```
/// # use std::num::NonZero;
/// # use figrs::font::{Font, FontFile, PrintDirection};
/// # use figrs::render::{Justification, Renderer};
/// let font = Font::built_in(FontFile::Terminal);
/// let rendered: String = Renderer::new(&font)
///     .width(NonZero::new(12).unwrap())
///     .justification(Justification::Center)
///     .render("Hello, world!");
/// assert_eq!(rendered, "   Hello,\n   world!\n");
/// ```
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    font: &'a Font,
    controls: Option<&'a ControlMap>,
    config: Config,
}

impl<'a> Renderer<'a> {
    /// Creates a new renderer with the settings of the font.
    pub const fn new(font: &'a Font) -> Self {
        Self {
            font,
            controls: None,
            config: Config::from_header(font.header()),
        }
    }

    /// Sets the output width, in columns. No output row is wider than `width - 1`.
    pub const fn width(mut self, width: NonZero<usize>) -> Self {
        self.config.width = width;
        self
    }

    /// Sets the justification.
    pub const fn justification(mut self, justification: Justification) -> Self {
        self.config.justification = justification;
        self
    }

    /// Sets the print direction.
    pub const fn print_direction(mut self, direction: PrintDirection) -> Self {
        self.config.direction = direction;
        self
    }

    /// Replaces or amends the layout that the font asks for.
    pub const fn smush_override(mut self, smush_override: SmushOverride) -> Self {
        self.config.smush_override = smush_override;
        self
    }

    /// In paragraph mode, a single newline joins two lines with a space. Newlines followed by more
    /// whitespace still break the line.
    pub const fn paragraph(mut self, paragraph: bool) -> Self {
        self.config.paragraph = paragraph;
        self
    }

    /// With Deutsch mode on, `[\]` are rendered as `ÄÖÜ` and `{|}~` as `äöüß`.
    pub const fn deutsch(mut self, deutsch: bool) -> Self {
        self.config.deutsch = deutsch;
        self
    }

    /// Applies the character mapping of `controls` before looking up FIGcharacters. For
    /// [`render_bytes`](Renderer::render_bytes), the input encoding is also taken from `controls`.
    pub const fn controls(mut self, controls: &'a ControlMap) -> Self {
        self.controls = Some(controls);
        self
    }

    /// Renders the given string.
    ///
    /// A newline, vertical tab, form feed or carriage return always causes a line break. A line
    /// that gets too wide is broken after the last word that fits, or if there is no space, before
    /// the FIGcharacter that does not fit. A single FIGcharacter that is wider than the output on
    /// its own is printed anyway, truncated.
    ///
    /// The output type can be:
    /// * [`String`]: every row followed by a newline, with hardblanks replaced by spaces;
    /// * [`Vec<String>`]: the same rows without the newlines;
    /// * [`Banner`]: the rows as they were composed, hardblanks included.
    pub fn render<Output: RenderOutput>(self, string: &str) -> Output {
        Output::from_banner(self.compose(string.chars().map(ordinal)))
    }

    /// Renders raw input, decoded as set by the [control files](Renderer::controls). Without
    /// them, the input is read as ISO 2022 starting in ASCII and Latin-1, like `figlet` does.
    pub fn render_bytes<Output: RenderOutput>(self, input: &[u8]) -> Output {
        let decoder = self.controls.unwrap_or(&ControlMap::new()).decoder(input);
        Output::from_banner(self.compose(decoder))
    }

    fn compose(self, codes: impl Iterator<Item = i32>) -> Banner {
        let mut session = Session::new(self);
        let mut codes = codes.peekable();
        let mut last_was_eol = false;
        while let Some(mut code) = codes.next() {
            if code == NEWLINE && self.config.paragraph && !last_was_eol {
                code = if codes.peek().copied().is_some_and(is_space) {
                    NEWLINE
                } else {
                    SPACE
                };
            }
            last_was_eol = is_space(code) && code != TAB && code != SPACE;
            if self.config.deutsch {
                code = deutsch(code);
            }
            if let Some(controls) = self.controls {
                code = controls.map(code);
            }
            if is_space(code) {
                code = if code == TAB || code == SPACE {
                    SPACE
                } else {
                    NEWLINE
                };
            }
            if (0 < code && code < SPACE && code != NEWLINE) || code == DELETE {
                continue;
            }
            session.push(code);
        }
        session.finish()
    }
}

/// ASCII whitespace, including vertical tab
fn is_space(code: i32) -> bool {
    matches!(code, 0x09..=0x0D | SPACE)
}

fn deutsch(code: i32) -> i32 {
    let index = match u8::try_from(code) {
        Ok(c @ b'['..=b']') => c - b'[',
        Ok(c @ b'{'..=b'~') => c - b'{' + 3,
        _ => return code,
    };
    ordinal(DEUTSCH_CODEPOINTS[usize::from(index)])
}

/// Trait to generically bound the renderer output
///
/// Implementations are provided for [`Banner`], [`String`] and [`Vec<String>`].
pub trait RenderOutput {
    /// Convert the rendered rows.
    fn from_banner(banner: Banner) -> Self;
}

impl RenderOutput for Banner {
    fn from_banner(banner: Banner) -> Self {
        banner
    }
}

impl RenderOutput for String {
    fn from_banner(banner: Banner) -> Self {
        banner.to_string()
    }
}

impl RenderOutput for Vec<String> {
    fn from_banner(banner: Banner) -> Self {
        banner.lines().collect()
    }
}

/// The rows of rendered output, still containing the font's hardblanks
///
/// [`Display`] replaces each hardblank by a space and ends every row with a newline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    rows: Vec<Vec<char>>,
    hardblank: Hardblank,
}

impl Banner {
    /// The rows as composed, including justification padding
    #[must_use]
    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    /// The hardblank of the font that rendered this
    #[must_use]
    pub const fn hardblank(&self) -> Hardblank {
        self.hardblank
    }

    /// Returns true if nothing was rendered, not even an empty line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows as they should be displayed, without line terminators.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows
            .iter()
            .map(|row| row.iter().map(|&c| self.display_char(c)).collect())
    }

    fn display_char(&self, c: char) -> char {
        if self.hardblank == c { ' ' } else { c }
    }
}

impl Display for Banner {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for &c in row {
                f.write_char(self.display_char(c))?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// The choice of line justification for multi-line output
///
/// Justification is measured against the output [width](Renderer::width), not against the
/// longest line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justification {
    /// [`Justification::Left`] when printing left-to-right, [`Justification::Right`] when
    /// printing right-to-left. This is the default.
    #[default]
    Auto,
    /// No padding
    Left,
    /// Half the free columns go before the row, rounded down.
    Center,
    /// The row ends in the last column allowed, which is one before the output width.
    Right,
}

impl Justification {
    const fn resolve(self, direction: PrintDirection) -> Self {
        match (self, direction) {
            (Self::Auto, PrintDirection::LeftToRight) => Self::Left,
            (Self::Auto, PrintDirection::RightToLeft) => Self::Right,
            (justification, _) => justification,
        }
    }

    /// Spaces before a row of `len` columns, where `len < width`.
    const fn padding(self, len: usize, width: usize) -> usize {
        match self {
            Self::Auto | Self::Left => 0,
            Self::Center => width.saturating_sub(len) / 2,
            Self::Right => width.saturating_sub(len + 1),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Config {
    width: NonZero<usize>,
    justification: Justification,
    direction: PrintDirection,
    smush_override: SmushOverride,
    paragraph: bool,
    deutsch: bool,
}

impl Config {
    const fn from_header(header: &Header) -> Self {
        Self {
            width: DEFAULT_WIDTH,
            justification: Justification::Auto,
            direction: header.print_direction,
            smush_override: SmushOverride::FontDefault,
            paragraph: false,
            deutsch: false,
        }
    }
}

/// Where a new character goes relative to the words already on the line
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum WordBreak {
    /// A line was just emitted, so spaces are dropped.
    SkipSpaces,
    /// At the start of a line, or only spaces so far
    Start,
    /// In the first word of the line
    Word,
    /// In spaces after a word
    Gap,
    /// In a later word
    NextWord,
}

impl WordBreak {
    const fn after(self, space: bool) -> Self {
        match (space, self) {
            (false, Self::Gap | Self::NextWord) => Self::NextWord,
            (false, _) => Self::Word,
            (true, Self::Word | Self::Gap | Self::NextWord) => Self::Gap,
            (true, _) => Self::Start,
        }
    }
}

/// Everything that changes while rendering one input
struct Session<'a> {
    font: &'a Font,
    direction: PrintDirection,
    line: Line,
    state: WordBreak,
    output: Output,
}

impl<'a> Session<'a> {
    fn new(renderer: Renderer<'a>) -> Self {
        let Renderer { font, config, .. } = renderer;
        let header = font.header();
        let width = config.width.get();
        let settings = LineSettings {
            layout: config.smush_override.apply(header.layout),
            hardblank: header.hardblank,
            direction: config.direction,
            limit: width - 1,
            max_input: width.saturating_mul(4).saturating_add(100),
        };
        Self {
            font,
            direction: config.direction,
            line: Line::new(header.height, settings),
            state: WordBreak::Start,
            output: Output {
                rows: Vec::new(),
                width: config.width,
                justification: config.justification.resolve(config.direction),
            },
        }
    }

    fn push(&mut self, code: i32) {
        let font = self.font;
        loop {
            if self.state == WordBreak::SkipSpaces {
                match code {
                    SPACE => return,
                    NEWLINE => {
                        self.state = WordBreak::Start;
                        return;
                    }
                    _ => self.state = WordBreak::Start,
                }
            }
            if code == NEWLINE {
                self.flush();
                self.state = WordBreak::Start;
                return;
            }
            let glyph = font.glyph_or_missing(code);
            if self.line.add(code, glyph) {
                self.state = self.state.after(code == SPACE);
                return;
            }
            if self.line.width() == 0 {
                self.oversized(glyph);
                self.state = WordBreak::SkipSpaces;
                return;
            }
            if code == SPACE {
                if self.state == WordBreak::Gap {
                    self.split();
                } else {
                    self.flush();
                }
                self.state = WordBreak::SkipSpaces;
                return;
            }
            if self.state >= WordBreak::Gap {
                self.split();
            } else {
                self.flush();
            }
            // try the same character again on the new line
            self.state = if self.state == WordBreak::NextWord {
                WordBreak::Word
            } else {
                WordBreak::Start
            };
        }
    }

    fn flush(&mut self) {
        trace!(width = self.line.width(), "emitting line");
        for row in self.line.rows() {
            self.output.put_row(row);
        }
        self.line.clear();
    }

    /// Emits the line up to its last word break, keeping the rest for the next line.
    fn split(&mut self) {
        let Some((emitted, kept)) = self.line.split_input() else {
            self.flush();
            return;
        };
        trace!(emitted = emitted.len(), kept = kept.len(), "breaking line");
        self.line.clear();
        for code in emitted {
            self.line.add(code, self.font.glyph_or_missing(code));
        }
        self.flush();
        for code in kept {
            self.line.add(code, self.font.glyph_or_missing(code));
        }
    }

    fn oversized(&mut self, glyph: &Glyph) {
        trace!(width = glyph.width(), "emitting oversized character");
        let width = self.output.width.get();
        for row in glyph.rows() {
            if self.direction == PrintDirection::RightToLeft && width > 1 {
                self.output
                    .put_row(&row[row.len().saturating_sub(width - 1)..]);
            } else {
                self.output.put_row(row);
            }
        }
    }

    fn finish(mut self) -> Banner {
        if self.line.width() != 0 {
            self.flush();
        }
        Banner {
            rows: self.output.rows,
            hardblank: self.font.header().hardblank,
        }
    }
}

struct Output {
    rows: Vec<Vec<char>>,
    width: NonZero<usize>,
    justification: Justification,
}

impl Output {
    fn put_row(&mut self, row: &[char]) {
        let width = self.width.get();
        let (row, padding) = if width > 1 {
            let row = &row[..row.len().min(width - 1)];
            (row, self.justification.padding(row.len(), width))
        } else {
            (row, 0)
        };
        self.rows
            .push(repeat_n(' ', padding).chain(row.iter().copied()).collect());
    }
}
