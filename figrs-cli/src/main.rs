//! Command-line front-end for `figrs`, with the options of `figlet`

use std::io::{self, Read as _, Write as _};
use std::num::NonZero;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory as _, FromArgMatches as _, Parser};
use figrs::control::ControlMap;
use figrs::font::{Font, FontPath, PrintDirection};
use figrs::render::{Justification, Renderer, SmushOverride};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let path = FontPath::new(&cli.font_dir);

    let (font, warnings) = Font::load_with_warnings(&cli.font, &path)
        .with_context(|| format!("could not load font \"{}\"", cli.font))?;
    for warning in warnings {
        warn!(font = %cli.font, "{warning}");
    }
    let mut controls = ControlMap::new();
    for name in cli.active_controls(&matches) {
        controls
            .load(name, &path)
            .with_context(|| format!("could not load control file \"{name}\""))?;
    }

    let input = cli.input()?;
    let rendered: String = cli.renderer(&font, &controls).render_bytes(&input);
    io::stdout().write_all(rendered.as_bytes())?;
    Ok(())
}

#[derive(Parser)]
#[command(version, about)]
#[expect(clippy::struct_excessive_bools, reason = "one per command-line flag")]
struct Cli {
    /// Text to render, joined by spaces. Read from standard input if missing.
    message: Vec<String>,
    /// Font name, looked up in the font directory
    #[arg(short = 'f', long, default_value = "term")]
    font: String,
    /// Font directory
    #[arg(short = 'd', long, env = "FIGLET_FONTDIR", default_value = FontPath::DEFAULT_DIR)]
    font_dir: PathBuf,
    /// Output width in columns
    #[arg(short = 'w', long, default_value_t = figrs::render::DEFAULT_WIDTH)]
    width: NonZero<usize>,

    /// Justify automatically: left, or right when printing right-to-left
    #[arg(short = 'x', overrides_with_all = ["left", "center", "right"])]
    auto: bool,
    /// Left-justify
    #[arg(short = 'l', overrides_with_all = ["auto", "center", "right"])]
    left: bool,
    /// Center
    #[arg(short = 'c', overrides_with_all = ["auto", "left", "right"])]
    center: bool,
    /// Right-justify
    #[arg(short = 'r', overrides_with_all = ["auto", "left", "center"])]
    right: bool,

    /// Print left-to-right
    #[arg(short = 'L', overrides_with_all = ["right_to_left", "font_direction"])]
    left_to_right: bool,
    /// Print right-to-left
    #[arg(short = 'R', overrides_with_all = ["left_to_right", "font_direction"])]
    right_to_left: bool,
    /// Print in the direction the font asks for
    #[arg(short = 'X', overrides_with_all = ["left_to_right", "right_to_left"])]
    font_direction: bool,

    /// Paragraph mode: a single newline joins lines with a space
    #[arg(short = 'p', overrides_with = "normal")]
    paragraph: bool,
    /// Every newline breaks the line
    #[arg(short = 'n', overrides_with = "paragraph")]
    normal: bool,

    /// Render `[\]{|}~` as the Deutsch characters `ÄÖÜäöüß`
    #[arg(short = 'D', overrides_with = "no_deutsch")]
    deutsch: bool,
    /// Render `[\]{|}~` as themselves
    #[arg(short = 'E', overrides_with = "deutsch")]
    no_deutsch: bool,

    /// Kerning: FIGcharacters touch but never smush
    #[arg(short = 'k', group = "layout")]
    kerning: bool,
    /// Full width: FIGcharacters never touch
    #[arg(short = 'W', group = "layout")]
    full_width: bool,
    /// Smush with the font's rules, even if it normally doesn't
    #[arg(short = 'S', group = "layout")]
    force_smushing: bool,
    /// Use the font's layout
    #[arg(short = 's', group = "layout")]
    font_layout: bool,
    /// Overlap: later FIGcharacters smush over earlier ones
    #[arg(short = 'o', group = "layout")]
    overlap: bool,
    /// Layout as a number: -1 full width, 0 kerning, otherwise smushing rule bits
    #[arg(short = 'm', group = "layout", allow_negative_numbers = true)]
    layout_mode: Option<i32>,

    /// Control file to apply, in order
    #[arg(short = 'C', long = "control")]
    controls: Vec<String>,
    /// Forget the control files given so far
    #[arg(short = 'N')]
    clear_controls: bool,
}

impl Cli {
    fn justification(&self) -> Justification {
        if self.left {
            Justification::Left
        } else if self.center {
            Justification::Center
        } else if self.right {
            Justification::Right
        } else {
            Justification::Auto
        }
    }

    fn smush_override(&self) -> SmushOverride {
        if self.kerning {
            SmushOverride::Kerning
        } else if self.full_width {
            SmushOverride::FullWidth
        } else if self.force_smushing {
            SmushOverride::Force
        } else if self.overlap {
            SmushOverride::Overlap
        } else if let Some(value) = self.layout_mode {
            SmushOverride::from_legacy(value)
        } else {
            SmushOverride::FontDefault
        }
    }

    /// The control files given after the last `-N`
    fn active_controls<'a>(&'a self, matches: &ArgMatches) -> impl Iterator<Item = &'a String> {
        let cleared_at = (matches.value_source("clear_controls") == Some(ValueSource::CommandLine))
            .then(|| matches.indices_of("clear_controls").and_then(Iterator::max))
            .flatten();
        let indices = matches.indices_of("controls").into_iter().flatten();
        self.controls
            .iter()
            .zip(indices)
            .filter(move |(_, index)| cleared_at.is_none_or(|cleared| *index > cleared))
            .map(|(name, _)| name)
    }

    fn renderer<'a>(&self, font: &'a Font, controls: &'a ControlMap) -> Renderer<'a> {
        let mut renderer = Renderer::new(font)
            .width(self.width)
            .justification(self.justification())
            .smush_override(self.smush_override())
            .paragraph(self.paragraph)
            .deutsch(self.deutsch)
            .controls(controls);
        if self.left_to_right {
            renderer = renderer.print_direction(PrintDirection::LeftToRight);
        } else if self.right_to_left {
            renderer = renderer.print_direction(PrintDirection::RightToLeft);
        }
        renderer
    }

    fn input(&self) -> Result<Vec<u8>> {
        if self.message.is_empty() {
            let mut input = Vec::new();
            io::stdin()
                .read_to_end(&mut input)
                .context("could not read standard input")?;
            Ok(input)
        } else {
            Ok(self.message.join(" ").into_bytes())
        }
    }
}
