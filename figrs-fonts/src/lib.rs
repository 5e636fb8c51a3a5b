//! FIGfonts and control files bundled with the [`figrs`](https://crates.io/crates/figrs) crate.
//!
//! Everything here is compiled into the binary, so [`lookup`] never touches the filesystem.

macro_rules! resources {
    ($(#[$meta:meta])* $enum:ident, $suffix:literal, { $($name:ident => $file_name:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum $enum {
            $(
                #[doc = concat!("`", $file_name, $suffix, "`")]
                $name,
            )*
        }

        impl $enum {
            /// An array containing all the variants
            pub const ALL: [Self; const{0 $(+ {_ = $file_name; 1} )*}] = [$(Self::$name),*];

            /// The file suffix shared by every variant, including the leading dot
            pub const SUFFIX: &'static str = $suffix;

            /// The contents of the file
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $(Self::$name => include_bytes!(concat!("../fonts/", $file_name, $suffix)),)*
                }
            }

            /// The file stem
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$name => $file_name,)*
                }
            }

            /// Match a file stem to a bundled file
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($file_name => Some(Self::$name),)*
                    _ => None,
                }
            }
        }
    };
}

resources! {
    /// Bundled FIGfonts
    FontFile, ".flf", {
        Terminal => "term",
    }
}

resources! {
    /// Bundled control files
    ControlFile, ".flc", {
        Hz => "hz",
        Koi8R => "koi8r",
        Latin2 => "8859-2",
        Cyrillic => "8859-5",
        ShiftJis => "sjis",
        Upper => "upper",
        Utf8 => "utf8",
    }
}

/// Finds a bundled resource by its full file name, e.g. `"term.flf"` or `"utf8.flc"`.
#[must_use]
pub fn lookup(file_name: &str) -> Option<&'static [u8]> {
    if let Some(stem) = file_name.strip_suffix(FontFile::SUFFIX) {
        FontFile::from_name(stem).map(|font| font.as_bytes())
    } else if let Some(stem) = file_name.strip_suffix(ControlFile::SUFFIX) {
        ControlFile::from_name(stem).map(|control| control.as_bytes())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlFile, FontFile, lookup};

    #[test]
    fn every_font_has_the_font_magic() {
        for font in FontFile::ALL {
            assert!(font.as_bytes().starts_with(b"flf2"), "{font:?}");
            assert_eq!(FontFile::from_name(font.name()), Some(font));
        }
    }

    #[test]
    fn lookup_by_file_name() {
        assert_eq!(lookup("utf8.flc"), Some(ControlFile::Utf8.as_bytes()));
        assert_eq!(lookup("term.flf"), Some(FontFile::Terminal.as_bytes()));
        assert_eq!(lookup("term.tlf"), None);
        assert_eq!(lookup("standard.flf"), None);
    }
}
