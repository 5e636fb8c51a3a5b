use std::num::NonZero;
use std::str::FromStr;

use itertools::Itertools as _;
use thiserror::Error;

use super::FontWarning;
use crate::render::{Layout, LayoutDecodeError};

/// A FIGfont header.
#[derive(Clone, Copy, Debug)]
pub struct Header {
    /// Which of the two accepted file formats the font uses.
    pub magic: Magic,
    /// The *hardblank* character; see [`Hardblank`] and [`Smushing`](crate::render::Smushing)
    /// for its significance in rendering.
    pub hardblank: Hardblank,
    /// Number of rows of sub-characters in each FIGcharacter. Note that *every* FIGcharacter in a
    /// given FIGfont has the same height, and this includes any empty space above or below the
    /// glyph.
    pub height: NonZero<usize>,
    /// The number of lines of sub-characters from the baseline of a FIGcharacter to the top of the
    /// tallest FIGcharacter. The baseline of a FIGfont is an imaginary line on top of which capital
    /// letters would rest, while the *descenders* of characters such as lowercase g, j, p, q, and y
    /// may hang below.
    ///
    /// This parameter does not affect the rendered output.
    ///
    /// If `None` then this parameter could not be parsed as a non-negative integer; see
    /// [`FontWarning::Baseline`].
    pub baseline: Option<usize>,
    /// An upper bound for the length of each row of each FIGcharacter in the font, including the
    /// *endmarks*. At most [`Header::MAX_LENGTH`]. Use
    /// [`Font::max_width`](crate::font::Font::max_width) if you need the actual maximum width.
    pub max_length: usize,
    /// The `Old_Layout` parameter, kept for reference. [`Header::layout`] is the decoded form.
    pub old_layout: i8,
    /// The `Full_Layout` parameter, if present.
    pub full_layout: Option<u16>,
    /// Number of lines of comments between the header and the FIGcharacters. See also
    /// [`Font::comments`](crate::font::Font::comments).
    pub comment_lines: usize,
    /// The default layout mode and smushing rules
    pub layout: Layout,
    /// The default print direction (left-to-right or right-to-left).
    pub print_direction: PrintDirection,
    /// Number of code-tagged FIGcharacters the header announces after the required 102.
    pub code_tag_count: usize,
}

impl Header {
    /// Hard ceiling on [`Header::max_length`].
    pub const MAX_LENGTH: usize = 255;

    /// Decode a header from its first line, including the signature.
    ///
    /// # Errors
    /// Any fatal decoding errors, see [`HeaderError`] for details.
    pub fn decode(header_line: &str) -> Result<Self, HeaderError> {
        Self::decode_with_warnings(header_line, &mut Vec::new())
    }

    pub(crate) fn decode_with_warnings(
        header_line: &str,
        warnings: &mut Vec<FontWarning>,
    ) -> Result<Self, HeaderError> {
        let mut parameters = header_line.split_whitespace();
        let Some([signature, height, baseline, max_length, old_layout, comment_lines]) =
            parameters.next_array()
        else {
            return Err(HeaderError::NotEnoughParameters(header_line.to_owned()));
        };
        let magic = Magic::from_prefix(signature.as_bytes())
            .ok_or_else(|| HeaderError::UnknownSignature(signature.to_owned()))?;
        // the fifth character is the sub-version, conventionally 'a'
        let mut rest = signature.chars().skip(5);
        let hardblank = match (rest.next(), rest.next()) {
            (Some(hardblank), None) => hardblank,
            _ => {
                let found = signature.chars().skip(5).collect();
                return Err(HeaderError::HardblankLength(found));
            }
        };
        let hardblank = hardblank
            .try_into()
            .map_err(HeaderError::InvalidHardblankChar)?;

        let height: i64 = IntParameter::Height.parse(height)?;
        let height = usize::try_from(height)
            .ok()
            .and_then(NonZero::new)
            .unwrap_or_else(|| {
                warnings.push(FontWarning::HeightClamped(height));
                NonZero::<usize>::MIN
            });
        let baseline = IntParameter::Baseline.parse(baseline).map_or_else(
            |_| {
                warnings.push(FontWarning::Baseline(baseline.to_owned()));
                None
            },
            Some,
        );
        if let Some(baseline) = baseline
            && !(0 < baseline && baseline <= height.get())
        {
            warnings.push(FontWarning::BaselineOutOfRange { baseline, height });
        }
        let max_length = IntParameter::MaxLength.parse(max_length)?;
        if max_length > Self::MAX_LENGTH {
            return Err(HeaderError::MaxLengthTooLarge(max_length));
        }
        let old_layout = IntParameter::OldLayout.parse(old_layout)?;
        let comment_lines = IntParameter::CommentLines.parse(comment_lines)?;

        // The trailing parameters are optional. The first one that does not parse ends the header.
        let mut optional = Vec::with_capacity(3);
        for (parameter, token) in [
            IntParameter::PrintDirection,
            IntParameter::FullLayout,
            IntParameter::CodeTagCount,
        ]
        .into_iter()
        .zip(parameters)
        {
            if let Ok(value) = parameter.parse::<i64>(token) {
                optional.push(value);
            } else {
                warnings.push(FontWarning::OptionalParameter {
                    name: parameter.name(),
                    value: token.to_owned(),
                });
                break;
            }
        }
        let [print_direction, full_layout, code_tag_count] =
            [0, 1, 2].map(|i| optional.get(i).copied());

        let print_direction = PrintDirection::decode(print_direction);
        let full_layout = full_layout
            .map(|full| u16::try_from(full).map_err(|_| LayoutDecodeError::InvalidFull(full)))
            .transpose()?;
        let layout = Layout::decode(old_layout, full_layout)?;
        if let Some(full_layout) = full_layout
            && !Layout::is_consistent(old_layout, full_layout)
        {
            warnings.push(FontWarning::InconsistentLayout {
                old_layout,
                full_layout,
            });
        }
        let code_tag_count = code_tag_count
            .and_then(|count| usize::try_from(count).ok())
            .unwrap_or(0);

        Ok(Self {
            magic,
            hardblank,
            height,
            baseline,
            max_length,
            old_layout,
            full_layout,
            comment_lines,
            layout,
            print_direction,
            code_tag_count,
        })
    }
}

/// The 4-byte signature at the start of a font file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Magic {
    /// `flf2`, a FIGlet font
    Figlet,
    /// `tlf2`, a TOIlet font, which is a FIGfont whose rows are UTF-8
    Toilet,
}

impl Magic {
    /// Identifies the signature at the start of `bytes`.
    #[must_use]
    pub fn from_prefix(bytes: &[u8]) -> Option<Self> {
        match bytes.get(..4)? {
            b"flf2" => Some(Self::Figlet),
            b"tlf2" => Some(Self::Toilet),
            _ => None,
        }
    }

    /// The signature itself
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8; 4] {
        match self {
            Self::Figlet => b"flf2",
            Self::Toilet => b"tlf2",
        }
    }
}

/// Printing direction, left-to-right or right-to-left
///
/// Each font specifies a default, found in `font.header().print_direction`. This also affects the
/// automatic [`Justification`](crate::render::Justification).
///
/// The rendered banner should always be read left-to-right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrintDirection {
    /// Left-to-right
    #[default]
    LeftToRight,
    /// Right-to-left
    RightToLeft,
}

impl PrintDirection {
    const fn decode(print_direction: Option<i64>) -> Self {
        match print_direction {
            None | Some(0) => Self::LeftToRight,
            Some(_) => Self::RightToLeft,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum IntParameter {
    Height,
    Baseline,
    MaxLength,
    OldLayout,
    CommentLines,
    PrintDirection,
    FullLayout,
    CodeTagCount,
}

impl IntParameter {
    fn parse<T: FromStr>(self, token: &str) -> Result<T, HeaderError> {
        token
            .parse()
            .map_err(|_| HeaderError::Parse(self.name(), token.to_owned()))
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Height => "Height",
            Self::Baseline => "Baseline",
            Self::MaxLength => "Max_Length",
            Self::OldLayout => "Old_Layout",
            Self::CommentLines => "Comment_Lines",
            Self::PrintDirection => "Print_Direction",
            Self::FullLayout => "Full_Layout",
            Self::CodeTagCount => "Codetag_Count",
        }
    }
}

/// A hardblank character
///
/// A hardblank is a special sub-character which is displayed as a blank (`' '`) once rendered, but
/// is treated more like a visible sub-character when fitting or smushing. Therefore, hardblanks
/// keep adjacent FIGcharacters a certain distance apart.
///
/// The usual hardblank is a `$`, but it can be any character except a blank (`' '`), a
/// carriage-return, a newline or a null character.
///
/// See [`Smushing`](crate::render::Smushing) and [The FIGfont
/// standard](http://www.jave.de/figlet/figfont.html#hardblanks) for more details.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hardblank(char);

impl Hardblank {
    /// Returns `None` for the characters that cannot be a hardblank.
    #[must_use]
    pub const fn new(value: char) -> Option<Self> {
        if matches!(value, ' ' | '\r' | '\n' | '\0') {
            None
        } else {
            Some(Self(value))
        }
    }

    /// The sentinel character as it appears in the font
    #[must_use]
    pub const fn get(self) -> char {
        self.0
    }
}

impl PartialEq<char> for Hardblank {
    fn eq(&self, other: &char) -> bool {
        self.0 == *other
    }
}

impl TryFrom<char> for Hardblank {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(value)
    }
}

/// An error in decoding a FIGfont header
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("missing header")]
    /// There is no header, ie the contents are empty.
    Missing,
    /// The header has fewer than the five required parameters (after the signature and hardblank).
    #[error(r#""{0}" does not include enough parameters"#)]
    NotEnoughParameters(String),
    /// The header does not begin with `"flf2"` or `"tlf2"`.
    #[error(r#""{0}" does not begin with "flf2" or "tlf2""#)]
    UnknownSignature(String),
    /// The hardblank is either missing or contains more than one character.
    #[error(r#"hardblank "{0}" is not exactly one character"#)]
    HardblankLength(String),
    /// The specified hardblank is a blank (space), a carriage-return, a newline (linefeed) or a
    /// null character.
    #[error("{0:?} must not be the hardblank")]
    InvalidHardblankChar(char),
    /// One of the required integer parameters cannot be parsed.
    #[error(r#""{1}" cannot be parsed as the parameter `{0}`"#)]
    Parse(&'static str, String),
    /// The maximum row length is larger than [`Header::MAX_LENGTH`].
    #[error("maximum length {0} is larger than {max}", max = Header::MAX_LENGTH)]
    MaxLengthTooLarge(usize),
    /// An error decoding the layout parameters
    #[error("{0}")]
    Layout(#[from] LayoutDecodeError),
}
