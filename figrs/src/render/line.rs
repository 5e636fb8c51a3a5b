//! The output line being composed

use std::num::NonZero;

use super::layout::{Layout, LayoutMode, SmushContext};
use crate::font::{Glyph, Hardblank, PrintDirection};
use crate::str_ext::RowExt as _;

const SPACE: i32 = 0x20;

/// What a [`Line`] needs to know about the render settings
#[derive(Clone, Copy, Debug)]
pub(crate) struct LineSettings {
    pub layout: Layout,
    pub hardblank: Hardblank,
    pub direction: PrintDirection,
    /// The line never gets wider than this
    pub limit: usize,
    /// The line never holds more characters than this
    pub max_input: usize,
}

/// One line of FIGcharacters, smushed together, plus the character codes that went into it
#[derive(Clone, Debug)]
pub(crate) struct Line {
    settings: LineSettings,
    rows: Vec<Vec<char>>,
    input: Vec<i32>,
    last_width: usize,
}

impl Line {
    pub(crate) fn new(height: NonZero<usize>, settings: LineSettings) -> Self {
        Self {
            settings,
            rows: vec![Vec::new(); height.get()],
            input: Vec::new(),
            last_width: 0,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub(crate) fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub(crate) fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
        self.input.clear();
    }

    /// How many columns of `glyph` can overlap the end of the line.
    ///
    /// Each row allows the glyph to move left until its first visible sub-character touches the
    /// last visible one of the line, and one column further if those two smush. The smallest of
    /// these over all rows applies, capped at the width of the glyph.
    pub(crate) fn smush_amount(&self, glyph: &Glyph) -> usize {
        let layout = self.settings.layout;
        if layout.mode() == LayoutMode::FullWidth {
            return 0;
        }
        let context = self.smush_context(glyph);
        self.rows
            .iter()
            .zip(glyph.rows())
            .map(|(row, glyph_row)| {
                let (left, right) = match self.settings.direction {
                    PrintDirection::LeftToRight => (row, glyph_row),
                    PrintDirection::RightToLeft => (glyph_row, row),
                };
                let (left_boundary, left_char) = left.last_visible();
                let (right_boundary, right_char) = right.first_visible();
                let touching = right_boundary + left.len() - left_boundary;
                let overlaps = match (left_char, right_char) {
                    (None, _) => true,
                    (Some(left), Some(right)) => layout.smush(left, right, context).is_some(),
                    (Some(_), None) => false,
                };
                if overlaps { touching } else { touching - 1 }
            })
            .fold(glyph.width(), usize::min)
    }

    /// Smushes `glyph` onto the line, unless the result would be too wide or the line already
    /// holds too many characters.
    pub(crate) fn add(&mut self, code: i32, glyph: &Glyph) -> bool {
        let amount = self.smush_amount(glyph);
        let width = self.width();
        if width + glyph.width() - amount > self.settings.limit
            || self.input.len() + 1 > self.settings.max_input
        {
            return false;
        }
        let layout = self.settings.layout;
        let context = self.smush_context(glyph);
        for (row, glyph_row) in self.rows.iter_mut().zip(glyph.rows()) {
            match context.direction {
                PrintDirection::LeftToRight => {
                    for (k, &incoming) in glyph_row.iter().take(amount).enumerate() {
                        let cell = (width + k)
                            .checked_sub(amount)
                            .and_then(|column| row.get_mut(column));
                        if let Some(cell) = cell {
                            *cell = layout.smush(*cell, incoming, context).unwrap_or(incoming);
                        }
                    }
                    row.extend_from_slice(glyph_row.get(amount..).unwrap_or_default());
                }
                PrintDirection::RightToLeft => {
                    let mut merged = glyph_row.clone();
                    let overlap = merged.iter_mut().skip(glyph.width() - amount);
                    for (cell, &existing) in overlap.zip(row.iter()) {
                        if let Some(smushed) = layout.smush(*cell, existing, context) {
                            *cell = smushed;
                        }
                    }
                    merged.extend_from_slice(row.get(amount..).unwrap_or_default());
                    *row = merged;
                }
            }
        }
        self.input.push(code);
        self.last_width = glyph.width();
        true
    }

    /// The characters before and after the last run of spaces, or `None` without any space.
    pub(crate) fn split_input(&self) -> Option<(Vec<i32>, Vec<i32>)> {
        let last_space = self.input.iter().rposition(|&c| c == SPACE)?;
        let (before, after) = self.input.split_at(last_space);
        let end = before
            .iter()
            .rposition(|&c| c != SPACE)
            .map_or(0, |i| i + 1);
        Some((before[..end].to_vec(), after[1..].to_vec()))
    }

    fn smush_context(&self, glyph: &Glyph) -> SmushContext {
        SmushContext {
            hardblank: self.settings.hardblank,
            direction: self.settings.direction,
            narrow: self.last_width < 2 || glyph.width() < 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use enumset::EnumSet;
    use proptest::prelude::*;

    use super::{Line, LineSettings};
    use crate::font::tests::synthetic_font;
    use crate::font::{Font, PrintDirection, ordinal};
    use crate::render::{Layout, LayoutMode, Smushing};

    fn font() -> Font {
        let text = synthetic_font(
            "flf2a$ 2 2 8 15 1",
            2,
            &[
                (ordinal('L'), &["|  ", "|__"]),
                (ordinal('J'), &["  |", "__|"]),
                (ordinal('o'), &[" o ", " o "]),
                (ordinal('/'), &["  /", " / "]),
                (ordinal('\\'), &["\\  ", " \\ "]),
            ],
        );
        Font::from_bytes(text).unwrap()
    }

    fn line(font: &Font, layout: Layout, direction: PrintDirection, text: &str) -> Line {
        let settings = LineSettings {
            layout,
            hardblank: font.header().hardblank,
            direction,
            limit: 79,
            max_input: 420,
        };
        let mut line = Line::new(font.header().height, settings);
        for c in text.chars() {
            assert!(line.add(ordinal(c), font.glyph_or_missing(ordinal(c))));
        }
        line
    }

    fn rows(line: &Line) -> Vec<String> {
        line.rows().iter().map(|row| row.iter().collect()).collect()
    }

    fn smushing(rules: impl Into<EnumSet<Smushing>>) -> Layout {
        Layout::new(LayoutMode::Smushing, rules.into())
    }

    #[test]
    fn smush_equal_characters() {
        let font = font();
        let line = line(&font, font.header().layout, PrintDirection::LeftToRight, "LJ");
        assert_eq!(rows(&line), ["|   |", "|___|"]);
        assert_eq!(line.width(), 5);
    }

    #[test]
    fn kerning_and_full_width() {
        let font = font();
        let kerning = Layout::new(LayoutMode::Kerning, EnumSet::empty());
        let full = Layout::new(LayoutMode::FullWidth, EnumSet::empty());
        let direction = PrintDirection::LeftToRight;
        assert_eq!(rows(&line(&font, kerning, direction, "LJ")), ["|    |", "|____|"]);
        // leading blank columns of the first glyph are dropped
        assert_eq!(rows(&line(&font, kerning, direction, "oo")), ["oo ", "oo "]);
        assert_eq!(rows(&line(&font, full, direction, "oo")), [" o  o ", " o  o "]);
    }

    #[test]
    fn big_x() {
        let font = font();
        let direction = PrintDirection::LeftToRight;
        let line = line(&font, smushing(Smushing::BigX), direction, "/\\");
        assert_eq!(rows(&line), [" |  ", "/ \\ "]);
    }

    #[test]
    fn right_to_left() {
        let font = font();
        let line = line(&font, font.header().layout, PrintDirection::RightToLeft, "LJ");
        assert_eq!(rows(&line), ["  |  ", "__|__"]);
    }

    #[test]
    fn narrow_glyphs_only_touch() {
        let font = font();
        let line = line(&font, smushing(EnumSet::all()), PrintDirection::LeftToRight, "a a");
        assert_eq!(rows(&line), ["a$a", "a$a"]);
    }

    #[test]
    fn too_wide() {
        let font = font();
        let settings = LineSettings {
            layout: font.header().layout,
            hardblank: font.header().hardblank,
            direction: PrintDirection::LeftToRight,
            limit: 5,
            max_input: 3,
        };
        let mut composed = Line::new(font.header().height, settings);
        let glyph = |c| font.glyph_or_missing(ordinal(c));
        assert!(composed.add(ordinal('L'), glyph('L')));
        assert!(composed.add(ordinal('J'), glyph('J')));
        assert!(!composed.add(ordinal('o'), glyph('o')));
        // no glyph at all, so only the number of characters counts
        assert!(composed.add(0x263A, font.glyph_or_missing(0x263A)));
        assert!(!composed.add(0x263A, font.glyph_or_missing(0x263A)));
        assert_eq!(composed.width(), 5);
        composed.clear();
        assert_eq!(composed.width(), 0);
        assert!(composed.add(ordinal('o'), glyph('o')));
    }

    #[test]
    fn split_at_last_gap() {
        let font = font();
        let direction = PrintDirection::LeftToRight;
        let layout = font.header().layout;
        let codes = |s: &str| s.chars().map(ordinal).collect::<Vec<_>>();
        let composed = line(&font, layout, direction, "ab  cd e");
        assert_eq!(composed.split_input(), Some((codes("ab  cd"), codes("e"))));
        let composed = line(&font, layout, direction, "ab  ");
        assert_eq!(composed.split_input(), Some((codes("ab"), codes(""))));
        let composed = line(&font, layout, direction, "  ab");
        assert_eq!(composed.split_input(), Some((codes(""), codes("ab"))));
        let composed = line(&font, layout, direction, "abc");
        assert_eq!(composed.split_input(), None);
    }

    fn glyph_text() -> impl Strategy<Value = String> {
        proptest::collection::vec(glyph_char(), 1..6).prop_map(|chars| chars.into_iter().collect())
    }

    fn glyph_char() -> impl Strategy<Value = char> {
        prop_oneof![Just('L'), Just('J'), Just('o'), Just('/'), Just('\\')]
    }

    proptest! {
        #[test]
        fn more_rules_never_smush_less(
            text in glyph_text(),
            next in glyph_char(),
            fewer in any::<u8>(),
            extra in any::<u8>(),
        ) {
            let font = font();
            let fewer = EnumSet::<Smushing>::from_u8_truncated(fewer);
            let more = fewer | EnumSet::<Smushing>::from_u8_truncated(extra);
            prop_assume!(!fewer.is_empty());
            let glyph = font.glyph_or_missing(ordinal(next));
            for direction in [PrintDirection::LeftToRight, PrintDirection::RightToLeft] {
                let composed = line(&font, smushing(fewer), direction, &text);
                let mut richer = composed.clone();
                richer.settings.layout = smushing(more);
                let mut kerned = composed.clone();
                kerned.settings.layout = Layout::new(LayoutMode::Kerning, EnumSet::empty());
                let amount = composed.smush_amount(glyph);
                prop_assert!(kerned.smush_amount(glyph) <= amount);
                prop_assert!(amount <= richer.smush_amount(glyph));
            }
        }

        #[test]
        fn full_width_adds_widths(text in glyph_text()) {
            let font = font();
            let full = Layout::new(LayoutMode::FullWidth, EnumSet::empty());
            let composed = line(&font, full, PrintDirection::LeftToRight, &text);
            let expected: usize = text.chars().map(|c| font.glyph_or_missing(ordinal(c)).width()).sum();
            prop_assert!(composed.rows().iter().all(|row| row.len() == expected));
        }
    }
}
