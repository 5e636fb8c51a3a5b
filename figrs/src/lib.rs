//! A crate for parsing FIGfonts and rendering text using these fonts, the way `figlet` does.
//!
//! # Features
//!
//! - Kerning and smushing of adjacent FIGcharacters ([`Smushing`](crate::render::Smushing)),
//!   with the font's layout or an override ([`SmushOverride`](crate::render::SmushOverride))
//! - Left-to-right and right-to-left printing
//!   ([`PrintDirection`](crate::font::PrintDirection))
//! - Word wrapping at a fixed output width, justification and paragraph mode
//!   ([`Renderer`](crate::render::Renderer))
//! - Control files for character mapping and input encodings
//!   ([`ControlMap`](crate::control::ControlMap))
//! - Fonts and control files looked up in a font directory, possibly zipped
//!   ([`FontPath`](crate::font::FontPath))
//!
//! # Example
//!
//! ```
//! # use figrs::font::{Font, FontFile};
//! let rendered = Font::built_in(FontFile::Terminal).render("Hello, world!");
//! assert_eq!(rendered, "Hello, world!\n");
//! ```
//!
//! ## Feature flags
//!
//! - `fonts` (default): bundles a small FIGfont and the common control files from the
//!   [`figrs-fonts`](https://crates.io/crates/figrs-fonts) package (via a dependency). They can be
//!   loaded using [`Font::built_in()`](crate::font::Font::built_in), and are found by
//!   [`FontPath`](crate::font::FontPath) when the font directory does not have them.

pub mod control;
pub mod font;
pub mod render;
mod str_ext;
