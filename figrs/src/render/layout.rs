use enumset::{EnumSet, EnumSetType};
use thiserror::Error;

use crate::font::{Hardblank, PrintDirection};

/// Combination of a layout mode and a set of smushing rules
///
/// The smushing rules are only relevant if the layout mode is [`LayoutMode::Smushing`] (possibly by
/// overriding the font default with [`SmushOverride`]). They are kept even when the font's own mode
/// is different, since [`SmushOverride::Force`] switches smushing on with the font's rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    mode: LayoutMode,
    smushing: EnumSet<Smushing>,
}

impl Layout {
    /// A layout with the given mode and rules.
    #[must_use]
    pub const fn new(mode: LayoutMode, smushing: EnumSet<Smushing>) -> Self {
        Self { mode, smushing }
    }

    /// Returns the layout mode.
    #[must_use]
    pub const fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Sets the layout mode.
    pub const fn set_mode(&mut self, mode: LayoutMode) {
        self.mode = mode;
    }

    /// The set of active smushing rules
    #[must_use]
    pub const fn rules(&self) -> EnumSet<Smushing> {
        self.smushing
    }

    /// Returns true if the given smushing rule is active.
    #[must_use]
    pub fn rule_active(&self, rule: Smushing) -> bool {
        self.smushing.contains(rule)
    }

    /// Returns true if *universal smushing* is active.
    ///
    /// When universal smushing, sub-characters from an earlier FIGcharacter are overridden by
    /// sub-characters from a later FIGcharacter (except if either one is a
    /// [*hardblank*](Hardblank), which always gives way). This produces an "overlapping" effect
    /// with some FIGfonts, whereby later FIGcharacter may appear to be in front.
    #[must_use]
    pub fn universal_smushing(&self) -> bool {
        self.smushing.is_empty()
    }

    /// Decode the layout parameters of a font header.
    ///
    /// `old_layout` should be either `-1`, signifying [`LayoutMode::FullWidth`], `0`, signifying
    /// [`LayoutMode::Kerning`], or a positive number whose bits correspond to:
    /// * bit 0: [`Smushing::EqualCharacter`]
    /// * bit 1: [`Smushing::Underscore`]
    /// * bit 2: [`Smushing::Hierarchy`]
    /// * bit 3: [`Smushing::OppositePair`]
    /// * bit 4: [`Smushing::BigX`]
    ///
    /// and implies [`LayoutMode::Smushing`]. Bit 5 is ignored here, the hardblank rule can only be
    /// switched on through `full_layout`.
    ///
    /// If present, `full_layout` takes precedence. Its low 8 bits correspond to:
    /// * bits 0--4: as above
    /// * bit 5: [`Smushing::Hardblank`]
    /// * bit 6: [`LayoutMode::Kerning`]
    /// * bit 7: [`LayoutMode::Smushing`], overriding bit 6 if both are set
    ///
    /// If none of the bits 0--5 are set but bit 7 is set, then *universal smushing* is active. If
    /// neither of bits 6 and 7 are set, [`LayoutMode::FullWidth`] is implied. The high byte
    /// describes vertical layout, which is not used.
    ///
    /// ```
    /// # use figrs::render::{Layout, Smushing, LayoutMode};
    /// let layout = Layout::decode(0b001111, Some(0b0101_1111_1000_1111)).unwrap();
    /// assert_eq!(layout.mode(), LayoutMode::Smushing);
    ///
    /// assert!(layout.rule_active(Smushing::EqualCharacter)); // active
    /// assert!(layout.rule_active(Smushing::Underscore));     // active
    /// assert!(layout.rule_active(Smushing::Hierarchy));      // active
    /// assert!(layout.rule_active(Smushing::OppositePair));   // active
    /// assert!(!layout.rule_active(Smushing::BigX));          // not active
    /// assert!(!layout.rule_active(Smushing::Hardblank));     // not active
    /// ```
    ///
    /// # Errors
    /// See [`LayoutDecodeError`] for possible errors. Disagreement between the two parameters is
    /// not an error; see [`Layout::is_consistent`].
    pub fn decode(old_layout: i8, full_layout: Option<u16>) -> Result<Self, LayoutDecodeError> {
        if !(-1..=63).contains(&old_layout) {
            return Err(LayoutDecodeError::InvalidOld(old_layout));
        }
        let layout = if let Some(full_layout) = full_layout {
            if full_layout > 32767 {
                return Err(LayoutDecodeError::InvalidFull(full_layout.into()));
            }
            let [_, low] = full_layout.to_be_bytes();
            let mode = if low & 0x80 != 0 {
                LayoutMode::Smushing
            } else if low & 0x40 != 0 {
                LayoutMode::Kerning
            } else {
                LayoutMode::FullWidth
            };
            Self::new(mode, Smushing::decode(low & 63))
        } else {
            match old_layout {
                -1 => Self::new(LayoutMode::FullWidth, EnumSet::empty()),
                0 => Self::new(LayoutMode::Kerning, EnumSet::empty()),
                rules => Self::new(
                    LayoutMode::Smushing,
                    Smushing::decode(rules.unsigned_abs() & 31),
                ),
            }
        };
        Ok(layout)
    }

    /// Whether the two layout parameters describe the same horizontal layout.
    ///
    /// `-1` goes with full width, `0` with kerning or universal smushing, and a positive value with
    /// smushing using exactly those rules.
    #[must_use]
    pub fn is_consistent(old_layout: i8, full_layout: u16) -> bool {
        let [_, low] = full_layout.to_be_bytes();
        let rules = low & 63;
        match (low >> 6, old_layout) {
            (0, -1) | (1, 0) => true,
            (2 | 3, 0) => rules == 0,
            (2 | 3, old) => u8::try_from(old).is_ok_and(|old| old == rules),
            _ => false,
        }
    }

    /// Smushes a pair of horizontally adjacent sub-characters, `left` then `right`.
    ///
    /// A blank always gives way to the other sub-character, in every layout mode. Otherwise `None`
    /// means the two cannot share a column.
    pub(crate) fn smush(self, left: char, right: char, context: SmushContext) -> Option<char> {
        if left == ' ' {
            return Some(right);
        }
        if right == ' ' {
            return Some(left);
        }
        if context.narrow || self.mode != LayoutMode::Smushing {
            return None;
        }
        let hardblank = context.hardblank;
        if self.smushing.is_empty() {
            // universal smushing
            return if hardblank == left {
                Some(right)
            } else if hardblank == right || context.direction == PrintDirection::RightToLeft {
                Some(left)
            } else {
                Some(right)
            };
        }
        if hardblank == left || hardblank == right {
            return (self.smushing.contains(Smushing::Hardblank) && left == right).then_some(left);
        }
        self.smushing
            .iter()
            .find_map(|rule| rule.smush(left, right))
    }
}

/// Per-pair information for [`Layout::smush`] that does not come from the layout itself
#[derive(Clone, Copy, Debug)]
pub(crate) struct SmushContext {
    pub hardblank: Hardblank,
    pub direction: PrintDirection,
    /// One of the two FIGcharacters is less than two columns wide, which rules out smushing.
    pub narrow: bool,
}

/// Horizontal layout modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    /// No kerning, the FIGcharacters are laid out as rectangles.
    FullWidth,
    /// FIGcharacters are moved closer until they touch, which means that two non-blank
    /// sub-characters are adjacent. This is sometimes called *fitting*.
    ///
    /// Note that hardblanks do *not* count as blanks here. See also [`Hardblank`].
    Kerning,
    /// FIGcharacters are moved one step closer after they touch, if possible. Which
    /// sub-characters are allowed to collide is controlled by the *smushing rules*, specified by
    /// the font. In case of *universal smushing*, later FIGcharacters are given priority.
    /// Otherwise, it depends on the set of [`Smushing`] rules that are active. If some pair of
    /// touching sub-characters cannot be smushed, [kerning](LayoutMode::Kerning) occurs instead.
    Smushing,
}

/// Controlled smushing rules
///
/// When several rules apply to a pair, the one listed first wins.
#[derive(EnumSetType, Debug)]
#[enumset(repr = "u8")]
pub enum Smushing {
    /// Smush two sub-characters if they are the same, but not a [*hardblank*](Hardblank).
    EqualCharacter = 0,
    /// An underscore (`_`) will be overridden by any of: `|`, `/`, `\`, `[`, `]`, `{`, `}`, `(`,
    /// `)`, `<` or `>`.
    Underscore = 1,
    /// A hierarchy of six classes is used: `|`, `/\`, `[]`, `{}`, `()`, and `<>`. When two smushing
    /// sub-characters are from different classes, the one from the latter class will be used.
    Hierarchy = 2,
    /// Smushes opposing brackets (`[]`), braces (`{}`) and parentheses (`()`) together, replacing
    /// any such pair with a vertical bar (`|`).
    ///
    /// Note that the pairs are smushed in either order, but they must be of the same kind.
    OppositePair = 3,
    /// Smushes `/\` into `|`, `\/` into `Y`, and `><` into `X`.
    ///
    /// Note that here the pairs *are* ordered, in particular `<>` is not affected by this rule.
    BigX = 4,
    /// Two [hardblanks](Hardblank) are smushed to a single one.
    Hardblank = 5,
}

impl Smushing {
    fn decode(bits: u8) -> EnumSet<Self> {
        EnumSet::from_repr_truncated(bits)
    }

    fn smush(self, left: char, right: char) -> Option<char> {
        match self {
            Self::EqualCharacter => (left == right).then_some(left),
            Self::Underscore => underscore(left, right).or_else(|| underscore(right, left)),
            Self::Hierarchy => hierarchy(left, right).or_else(|| hierarchy(right, left)),
            Self::OppositePair => matches!(
                (left, right),
                ('[', ']') | (']', '[') | ('{', '}') | ('}', '{') | ('(', ')') | (')', '(')
            )
            .then_some('|'),
            Self::BigX => match (left, right) {
                ('/', '\\') => Some('|'),
                ('\\', '/') => Some('Y'),
                ('>', '<') => Some('X'),
                _ => None,
            },
            // pairs involving a hardblank never reach the individual rules
            Self::Hardblank => None,
        }
    }
}

fn underscore(a: char, b: char) -> Option<char> {
    (a == '_' && matches!(b, '|' | '/' | '\\' | '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>'))
        .then_some(b)
}

fn hierarchy(a: char, b: char) -> Option<char> {
    matches!(
        (a, b),
        ('|', '/' | '\\' | '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>')
            | ('/' | '\\', '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>')
            | ('[' | ']', '{' | '}' | '(' | ')' | '<' | '>')
            | ('{' | '}', '(' | ')' | '<' | '>')
            | ('(' | ')', '<' | '>')
    )
    .then_some(b)
}

/// Replaces or amends the layout that a font asks for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SmushOverride {
    /// Use the font's layout unchanged.
    #[default]
    FontDefault,
    /// [`LayoutMode::Kerning`], whatever the font says
    Kerning,
    /// [`LayoutMode::FullWidth`], whatever the font says
    FullWidth,
    /// [`LayoutMode::Smushing`] with exactly these rules (universal smushing if empty)
    Rules(EnumSet<Smushing>),
    /// [`LayoutMode::Smushing`] with the font's rules, even if the font does not smush by default
    Force,
    /// Universal smushing, so later FIGcharacters overlap earlier ones
    Overlap,
}

impl SmushOverride {
    /// Interprets a number in the style of the `Old_Layout` header parameter.
    ///
    /// Anything below `-1` means [`SmushOverride::FontDefault`], `-1` is full width and `0` is
    /// kerning. Positive values select smushing with the rules in their low six bits, so `128`
    /// gives universal smushing.
    ///
    /// ```
    /// # use figrs::render::{SmushOverride, Smushing};
    /// assert_eq!(SmushOverride::from_legacy(-2), SmushOverride::FontDefault);
    /// assert_eq!(SmushOverride::from_legacy(0), SmushOverride::Kerning);
    /// assert_eq!(
    ///     SmushOverride::from_legacy(17),
    ///     SmushOverride::Rules(Smushing::EqualCharacter | Smushing::BigX),
    /// );
    /// ```
    #[must_use]
    pub fn from_legacy(value: i32) -> Self {
        match value {
            ..-1 => Self::FontDefault,
            -1 => Self::FullWidth,
            0 => Self::Kerning,
            rules => Self::Rules(Smushing::decode(
                u8::try_from(rules & 63).unwrap_or_default(),
            )),
        }
    }

    /// The layout to use instead of `font_layout`
    #[must_use]
    pub fn apply(self, font_layout: Layout) -> Layout {
        match self {
            Self::FontDefault => font_layout,
            Self::Kerning => Layout::new(LayoutMode::Kerning, EnumSet::empty()),
            Self::FullWidth => Layout::new(LayoutMode::FullWidth, EnumSet::empty()),
            Self::Rules(rules) => Layout::new(LayoutMode::Smushing, rules),
            Self::Force => Layout::new(LayoutMode::Smushing, font_layout.smushing),
            Self::Overlap => Layout::new(LayoutMode::Smushing, EnumSet::empty()),
        }
    }
}

/// Errors that can occur when decoding layout parameters
///
/// Depending on the font encoding version, two parameters `Old_Layout` and `Full_Layout` are
/// considered, each encoding a set of flags as bits (except when `Old_Layout = -1`). See
/// [`Layout::decode`] for more details on the encoding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LayoutDecodeError {
    /// The `Old_Layout` parameter is outside the range `-1..=63`.
    #[error("invalid `Old_Layout` {0}")]
    InvalidOld(i8),
    /// The `Full_Layout` parameter is outside the range `0..=32767`.
    #[error("invalid `Full_Layout` {0}")]
    InvalidFull(i64),
}

#[cfg(test)]
mod tests {
    use enumset::EnumSet;

    use super::{Layout, LayoutDecodeError, LayoutMode, SmushContext, SmushOverride, Smushing};
    use crate::font::{Hardblank, PrintDirection};

    const LTR: SmushContext = SmushContext {
        hardblank: hardblank('$'),
        direction: PrintDirection::LeftToRight,
        narrow: false,
    };

    const fn hardblank(c: char) -> Hardblank {
        match Hardblank::new(c) {
            Some(hardblank) => hardblank,
            None => panic!("invalid hardblank"),
        }
    }

    fn smushing(rules: impl Into<EnumSet<Smushing>>) -> Layout {
        Layout::new(LayoutMode::Smushing, rules.into())
    }

    #[test]
    fn decode_standard() {
        let layout = Layout::decode(15, Some(24463)).unwrap();
        assert_eq!(layout.mode(), LayoutMode::Smushing);
        let expected = Smushing::EqualCharacter
            | Smushing::Underscore
            | Smushing::Hierarchy
            | Smushing::OppositePair;
        assert_eq!(layout.rules(), expected);
        assert!(Layout::is_consistent(15, 24463));
    }

    #[test]
    fn decode_old_only() {
        assert_eq!(Layout::decode(-1, None).unwrap().mode(), LayoutMode::FullWidth);
        assert_eq!(Layout::decode(0, None).unwrap().mode(), LayoutMode::Kerning);
        let layout = Layout::decode(63, None).unwrap();
        assert_eq!(layout.mode(), LayoutMode::Smushing);
        assert!(!layout.rule_active(Smushing::Hardblank));
        assert_eq!(layout.rules().len(), 5);
        assert_eq!(Layout::decode(64, None), Err(LayoutDecodeError::InvalidOld(64)));
        assert_eq!(Layout::decode(-2, None), Err(LayoutDecodeError::InvalidOld(-2)));
    }

    #[test]
    fn decode_full() {
        let layout = Layout::decode(0, Some(128)).unwrap();
        assert_eq!(layout.mode(), LayoutMode::Smushing);
        assert!(layout.universal_smushing());
        assert!(Layout::is_consistent(0, 128));

        let layout = Layout::decode(0, Some(64 | 3)).unwrap();
        assert_eq!(layout.mode(), LayoutMode::Kerning);
        assert_eq!(layout.rules(), Smushing::EqualCharacter | Smushing::Underscore);

        assert_eq!(
            Layout::decode(0, Some(40000)),
            Err(LayoutDecodeError::InvalidFull(40000))
        );
        assert!(!Layout::is_consistent(-1, 64));
        assert!(!Layout::is_consistent(3, 128 | 1));
    }

    #[test]
    fn blanks_always_give_way() {
        for mode in [LayoutMode::FullWidth, LayoutMode::Kerning, LayoutMode::Smushing] {
            let layout = Layout::new(mode, EnumSet::empty());
            assert_eq!(layout.smush(' ', 'x', LTR), Some('x'));
            assert_eq!(layout.smush('x', ' ', LTR), Some('x'));
        }
        let narrow = SmushContext { narrow: true, ..LTR };
        assert_eq!(smushing(EnumSet::all()).smush(' ', '|', narrow), Some('|'));
        assert_eq!(smushing(EnumSet::all()).smush('|', '|', narrow), None);
    }

    #[test]
    fn kerning_never_merges() {
        let layout = Layout::new(LayoutMode::Kerning, EnumSet::all());
        assert_eq!(layout.smush('|', '|', LTR), None);
    }

    #[test]
    fn universal() {
        let layout = smushing(EnumSet::empty());
        assert_eq!(layout.smush('a', 'b', LTR), Some('b'));
        assert_eq!(layout.smush('$', 'b', LTR), Some('b'));
        assert_eq!(layout.smush('a', '$', LTR), Some('a'));
        let rtl = SmushContext {
            direction: PrintDirection::RightToLeft,
            ..LTR
        };
        assert_eq!(layout.smush('a', 'b', rtl), Some('a'));
        assert_eq!(layout.smush('$', 'b', rtl), Some('b'));
    }

    #[test]
    fn controlled_rules() {
        assert_eq!(smushing(Smushing::EqualCharacter).smush('#', '#', LTR), Some('#'));
        assert_eq!(smushing(Smushing::EqualCharacter).smush('#', '@', LTR), None);
        assert_eq!(smushing(Smushing::EqualCharacter).smush('$', '$', LTR), None);
        assert_eq!(smushing(Smushing::Hardblank).smush('$', '$', LTR), Some('$'));
        assert_eq!(smushing(EnumSet::all()).smush('$', '|', LTR), None);

        assert_eq!(smushing(Smushing::Underscore).smush('_', '/', LTR), Some('/'));
        assert_eq!(smushing(Smushing::Underscore).smush('>', '_', LTR), Some('>'));
        assert_eq!(smushing(Smushing::Underscore).smush('_', 'x', LTR), None);

        assert_eq!(smushing(Smushing::Hierarchy).smush('|', '/', LTR), Some('/'));
        assert_eq!(smushing(Smushing::Hierarchy).smush('<', '[', LTR), Some('<'));
        assert_eq!(smushing(Smushing::Hierarchy).smush('(', ')', LTR), None);

        assert_eq!(smushing(Smushing::OppositePair).smush(']', '[', LTR), Some('|'));
        assert_eq!(smushing(Smushing::OppositePair).smush('(', ']', LTR), None);

        assert_eq!(smushing(Smushing::BigX).smush('/', '\\', LTR), Some('|'));
        assert_eq!(smushing(Smushing::BigX).smush('\\', '/', LTR), Some('Y'));
        assert_eq!(smushing(Smushing::BigX).smush('>', '<', LTR), Some('X'));
        assert_eq!(smushing(Smushing::BigX).smush('<', '>', LTR), None);
    }

    #[test]
    fn rule_priority() {
        // hierarchy comes before the opposite pair rule
        let layout = smushing(Smushing::Hierarchy | Smushing::OppositePair);
        assert_eq!(layout.smush('[', '}', LTR), Some('}'));
        assert_eq!(layout.smush('[', ']', LTR), Some('|'));
        // and before big X
        let layout = smushing(Smushing::Hierarchy | Smushing::BigX);
        assert_eq!(layout.smush('>', '<', LTR), Some('X'));
        assert_eq!(layout.smush('/', '>', LTR), Some('>'));
    }

    #[test]
    fn overrides() {
        let font = Layout::new(LayoutMode::Kerning, Smushing::BigX.into());
        assert_eq!(SmushOverride::FontDefault.apply(font), font);
        assert_eq!(SmushOverride::Force.apply(font), smushing(Smushing::BigX));
        assert_eq!(SmushOverride::Overlap.apply(font), smushing(EnumSet::empty()));
        assert_eq!(
            SmushOverride::FullWidth.apply(font).mode(),
            LayoutMode::FullWidth
        );
        assert_eq!(SmushOverride::from_legacy(-1), SmushOverride::FullWidth);
        assert_eq!(
            SmushOverride::from_legacy(128),
            SmushOverride::Rules(EnumSet::empty())
        );
        assert_eq!(
            SmushOverride::from_legacy(63).apply(font).rules(),
            EnumSet::all()
        );
    }
}
