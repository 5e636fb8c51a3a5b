use bstr::ByteSlice as _;

/// Scanning helpers for a row of sub-characters.
///
/// Only `' '` counts as blank here; a hardblank is visible for horizontal layout.
pub(crate) trait RowExt {
    /// Index and value of the last non-blank sub-character.
    ///
    /// An empty or all-blank row reports index 0 and `None`.
    fn last_visible(&self) -> (usize, Option<char>);

    /// Index and value of the first non-blank sub-character.
    ///
    /// An empty or all-blank row reports its length and `None`.
    fn first_visible(&self) -> (usize, Option<char>);
}

impl RowExt for [char] {
    fn last_visible(&self) -> (usize, Option<char>) {
        self.iter()
            .rposition(|&c| c != ' ')
            .map_or((0, None), |i| (i, Some(self[i])))
    }

    fn first_visible(&self) -> (usize, Option<char>) {
        self.iter()
            .position(|&c| c != ' ')
            .map_or((self.len(), None), |i| (i, Some(self[i])))
    }
}

/// Decodes one line of a font or control file.
///
/// FIGfonts predate UTF-8, so a line that is not valid UTF-8 is read as Latin-1 instead. The
/// second value is `false` in that case.
pub(crate) fn decode_line(line: &[u8]) -> (Vec<char>, bool) {
    match line.to_str() {
        Ok(text) => (text.chars().collect(), true),
        Err(_) => (line.iter().copied().map(char::from).collect(), false),
    }
}
