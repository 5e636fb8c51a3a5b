//! Turning input bytes into character codes

const SO: u8 = 0x0E;
const SI: u8 = 0x0F;
const ESC: u8 = 0x1B;
const SS2: u8 = 0x8E;
const SS3: u8 = 0x8F;

/// How input bytes are grouped into character codes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputEncoding {
    /// ISO 2022 with the four [character sets](CharacterSet) of a [`Decoding`]. With the initial
    /// registers this reads ASCII and Latin-1.
    #[default]
    Iso2022,
    /// Bytes `0x80..=0x9F` and `0xE0..=0xEF` start a two-byte code.
    DoubleByte,
    /// UTF-8, including the obsolete five and six byte forms
    Utf8,
    /// HZ: `~{` and `~}` switch between ASCII and two-byte GB codes, `~~` is a tilde.
    Hz,
    /// Shift-JIS, read the same way as [`InputEncoding::DoubleByte`]
    ShiftJis,
}

/// An ISO 2022 character set, as designated into one of the registers G0 to G3
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharacterSet {
    /// Combined with the input bytes to form a character code
    pub base: i32,
    /// Whether each character takes two bytes
    pub double_byte: bool,
}

impl CharacterSet {
    /// A 94-character set. `B` is ASCII, whose codes are the bytes themselves.
    #[must_use]
    pub const fn single_94(final_character: i32) -> Option<Self> {
        let base = if final_character == 'B' as i32 {
            0
        } else {
            match final_character.checked_mul(1 << 16) {
                Some(base) => base,
                None => return None,
            }
        };
        Some(Self {
            base,
            double_byte: false,
        })
    }

    /// A 96-character set. `A` is the top half of Latin-1.
    #[must_use]
    pub const fn single_96(final_character: i32) -> Option<Self> {
        let base = if final_character == 'A' as i32 {
            0x80
        } else {
            match final_character.checked_mul(1 << 16) {
                Some(base) => base + 0x80,
                None => return None,
            }
        };
        Some(Self {
            base,
            double_byte: false,
        })
    }

    /// A 94×94-character set.
    #[must_use]
    pub const fn double_94(final_character: i32) -> Option<Self> {
        match final_character.checked_mul(1 << 16) {
            Some(base) => Some(Self {
                base,
                double_byte: true,
            }),
            None => None,
        }
    }
}

/// The input encoding together with the initial ISO 2022 registers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoding {
    /// How bytes are grouped
    pub encoding: InputEncoding,
    /// The character sets in G0 to G3
    pub charsets: [CharacterSet; 4],
    /// The register used for bytes `0x21..=0x7E`
    pub gl: usize,
    /// The register used for bytes `0xA0..=0xFF`
    pub gr: usize,
}

impl Default for Decoding {
    /// ASCII in G0 and GL, Latin-1 in G1 and GR.
    fn default() -> Self {
        Self {
            encoding: InputEncoding::Iso2022,
            charsets: [
                CharacterSet::default(),
                CharacterSet {
                    base: 0x80,
                    double_byte: false,
                },
                CharacterSet::default(),
                CharacterSet::default(),
            ],
            gl: 0,
            gr: 1,
        }
    }
}

/// Everything a [`Decoder`] changes while reading
///
/// Shift and designation sequences in the input only affect the rest of that input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderState {
    decoding: Decoding,
    hz_double_byte: bool,
}

impl DecoderState {
    /// Starts reading with the given registers.
    #[must_use]
    pub const fn new(decoding: Decoding) -> Self {
        Self {
            decoding,
            hz_double_byte: false,
        }
    }

    /// The registers as currently set
    #[must_use]
    pub const fn decoding(&self) -> &Decoding {
        &self.decoding
    }
}

impl Default for DecoderState {
    fn default() -> Self {
        Self::new(Decoding::default())
    }
}

/// An iterator over the character codes in some input bytes
///
/// Malformed input never stops decoding: missing trailing bytes count as zero and unexpected
/// bytes are passed through or dropped.
///
/// ```
/// # use figrs::control::{Decoder, DecoderState};
/// let codes: Vec<i32> = Decoder::new(b"a\xE9", DecoderState::default()).collect();
/// assert_eq!(codes, [0x61, 0xE9]);
/// ```
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    state: DecoderState,
}

impl<'a> Decoder<'a> {
    /// Reads `input` starting from `state`.
    #[must_use]
    pub const fn new(input: &'a [u8], state: DecoderState) -> Self {
        Self { input, state }
    }

    /// The current state, including any changes made by the input read so far
    #[must_use]
    pub const fn state(&self) -> &DecoderState {
        &self.state
    }

    fn byte(&mut self) -> Option<u8> {
        let (&first, rest) = self.input.split_first()?;
        self.input = rest;
        Some(first)
    }

    fn trailing_byte(&mut self) -> i32 {
        self.byte().map_or(0, i32::from)
    }

    fn next_iso2022(&mut self) -> Option<i32> {
        let mut single_shift = None;
        loop {
            match self.byte()? {
                SO => self.state.decoding.gl = 1,
                SI => self.state.decoding.gl = 0,
                SS2 => single_shift = Some(2),
                SS3 => single_shift = Some(3),
                ESC => self.escape(&mut single_shift)?,
                byte => return Some(self.graphic(byte, single_shift)),
            }
        }
    }

    fn escape(&mut self, single_shift: &mut Option<usize>) -> Option<()> {
        match self.byte()? {
            b'N' => *single_shift = Some(2),
            b'O' => *single_shift = Some(3),
            b'n' => self.state.decoding.gl = 2,
            b'o' => self.state.decoding.gl = 3,
            b'~' => self.state.decoding.gr = 1,
            b'}' => self.state.decoding.gr = 2,
            b'|' => self.state.decoding.gr = 3,
            intermediate @ b'('..=b'+' => {
                let charset = CharacterSet::single_94(self.byte()?.into());
                self.designate(usize::from(intermediate - b'('), charset);
            }
            intermediate @ b'-'..=b'/' => {
                let charset = CharacterSet::single_96(self.byte()?.into());
                self.designate(usize::from(intermediate - b','), charset);
            }
            b'$' => {
                if let intermediate @ b'('..=b'+' = self.byte()? {
                    let charset = CharacterSet::double_94(self.byte()?.into());
                    self.designate(usize::from(intermediate - b'('), charset);
                }
            }
            _ => {}
        }
        Some(())
    }

    fn designate(&mut self, register: usize, charset: Option<CharacterSet>) {
        if let (Some(slot), Some(charset)) =
            (self.state.decoding.charsets.get_mut(register), charset)
        {
            *slot = charset;
        }
    }

    fn graphic(&mut self, byte: u8, single_shift: Option<usize>) -> i32 {
        let Decoding {
            charsets, gl, gr, ..
        } = self.state.decoding;
        let (gl, gr) = single_shift.map_or((gl, gr), |shifted| (shifted, shifted));
        let code = i32::from(byte);
        let (charset, low_bits) = match byte {
            0x21..=0x7E => (charsets.get(gl), code),
            0xA0..=0xFF => (charsets.get(gr), code & 0x7F),
            _ => return code,
        };
        let charset = charset.copied().unwrap_or_default();
        if charset.double_byte {
            charset.base | code << 8 | self.trailing_byte()
        } else {
            charset.base | low_bits
        }
    }

    fn next_double_byte(&mut self) -> Option<i32> {
        let byte = self.byte()?;
        let code = i32::from(byte);
        Some(if matches!(byte, 0x80..=0x9F | 0xE0..=0xEF) {
            code << 8 | self.trailing_byte()
        } else {
            code
        })
    }

    fn next_utf8(&mut self) -> Option<i32> {
        let lead = self.byte()?;
        let (continuation, mask) = match lead {
            0x00..=0x7F => return Some(lead.into()),
            0xC0..=0xDF => (1, 0x1F),
            0xE0..=0xEF => (2, 0x0F),
            0xF0..=0xF7 => (3, 0x07),
            0xF8..=0xFB => (4, 0x03),
            0xFC..=0xFD => (5, 0x01),
            _ => return Some(0x80),
        };
        let mut code = i32::from(lead & mask);
        for _ in 0..continuation {
            code = code << 6 | self.byte().map_or(0, |byte| i32::from(byte & 0x3F));
        }
        Some(code)
    }

    fn next_hz(&mut self) -> Option<i32> {
        loop {
            let byte = self.byte()?;
            if self.state.hz_double_byte {
                let second = self.byte();
                if byte == b'~' && second == Some(b'}') {
                    self.state.hz_double_byte = false;
                    continue;
                }
                return Some(i32::from(byte) << 8 | second.map_or(0, i32::from));
            }
            if byte != b'~' {
                return Some(byte.into());
            }
            match self.byte()? {
                b'{' => self.state.hz_double_byte = true,
                b'~' => return Some(i32::from(b'~')),
                _ => {}
            }
        }
    }
}

impl Iterator for Decoder<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        match self.state.decoding.encoding {
            InputEncoding::Iso2022 => self.next_iso2022(),
            InputEncoding::DoubleByte | InputEncoding::ShiftJis => self.next_double_byte(),
            InputEncoding::Utf8 => self.next_utf8(),
            InputEncoding::Hz => self.next_hz(),
        }
    }
}
