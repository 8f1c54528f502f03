//! Markdown dialects
//!
//! A dialect is named by a syntax id such as `markdown/1.2`. The id selects three things:
//!
//! - the emulation family, i.e. which base grammar settles ambiguous constructs;
//! - the set of optional extensions (tables, wiki links, macros, ...);
//! - the render level, i.e. which serialization deltas apply on top of the base renderer.
//!
//! Extensions live in a static registry ([`Extension`]). Unknown extension ids are rejected
//! when the configuration is resolved, never skipped.

use crate::error::ConvertError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const COMMONMARK_0_27: &str = "commonmark/0.27";
pub const MARKDOWN_1_0: &str = "markdown/1.0";
pub const MARKDOWN_1_1: &str = "markdown/1.1";
pub const MARKDOWN_1_2: &str = "markdown/1.2";
pub const MARKDOWN_GITHUB_1_0: &str = "markdown+github/1.0";

/// Syntax ids of all built-in Markdown dialects, in registration order.
pub const MARKDOWN_SYNTAXES: &[&str] = &[
    COMMONMARK_0_27,
    MARKDOWN_1_0,
    MARKDOWN_1_1,
    MARKDOWN_1_2,
    MARKDOWN_GITHUB_1_0,
];

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Optional syntax extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Extension {
    Tables,
    Strikethrough,
    Definitions,
    Superscript,
    Subscript,
    WikiLinks,
    Autolink,
    Abbreviations,
    Macros,
}

impl Extension {
    pub const ALL: [Extension; 9] = [
        Extension::Tables,
        Extension::Strikethrough,
        Extension::Definitions,
        Extension::Superscript,
        Extension::Subscript,
        Extension::WikiLinks,
        Extension::Autolink,
        Extension::Abbreviations,
        Extension::Macros,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Extension::Tables => "tables",
            Extension::Strikethrough => "strikethrough",
            Extension::Definitions => "definitions",
            Extension::Superscript => "superscript",
            Extension::Subscript => "subscript",
            Extension::WikiLinks => "wiki-links",
            Extension::Autolink => "autolink",
            Extension::Abbreviations => "abbreviations",
            Extension::Macros => "macros",
        }
    }
}

impl FromStr for Extension {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Extension::ALL
            .into_iter()
            .find(|ext| ext.id() == wanted)
            .ok_or_else(|| ConvertError::UnknownExtension(s.to_string()))
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Base grammar profile used to settle ambiguous constructs.
///
/// Only `Github` changes how source is tokenized: bare URLs and addresses become autolinks
/// without the `autolink` extension. `Markdown` and `Kramdown` parse like `CommonMark` and
/// are kept as labels for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmulationFamily {
    CommonMark,
    Github,
    Markdown,
    Kramdown,
}

impl EmulationFamily {
    pub fn id(self) -> &'static str {
        match self {
            EmulationFamily::CommonMark => "commonmark",
            EmulationFamily::Github => "github",
            EmulationFamily::Markdown => "markdown",
            EmulationFamily::Kramdown => "kramdown",
        }
    }
}

impl FromStr for EmulationFamily {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commonmark" => Ok(EmulationFamily::CommonMark),
            "github" => Ok(EmulationFamily::Github),
            "markdown" => Ok(EmulationFamily::Markdown),
            "kramdown" => Ok(EmulationFamily::Kramdown),
            _ => Err(ConvertError::UnknownFamily(s.to_string())),
        }
    }
}

/// How a soft line break in the source becomes an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftBreak {
    /// Emits `Space`: the line break only separates words.
    Space,
    /// Emits `NewLine`: line breaks are kept as written.
    NewLine,
}

impl FromStr for SoftBreak {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(SoftBreak::Space),
            "newline" | "new-line" => Ok(SoftBreak::NewLine),
            _ => Err(ConvertError::UnknownSoftBreak(s.to_string())),
        }
    }
}

/// Which serialization deltas the renderer layers over its base behavior.
///
/// Levels are ordered: a delta introduced at `Extended` also applies at `Wiki`
/// unless `Wiki` overrides it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderLevel {
    /// `commonmark/0.27`, `markdown/1.0`
    Base,
    /// `markdown/1.1`: `^`/`~` spans, inline macros as `#[id](...)`
    Extended,
    /// `markdown/1.2` and GitHub: wiki links, `~~` strikeout, bracketed inline macros
    Wiki,
}

/// Fully resolved settings for one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectConfig {
    pub syntax: String,
    pub family: EmulationFamily,
    pub extensions: BTreeSet<Extension>,
    pub soft_break: SoftBreak,
    pub render_level: RenderLevel,
    pub max_depth: usize,
}

impl DialectConfig {
    /// Built-in defaults for a syntax id.
    pub fn for_syntax(syntax: &str) -> Result<Self, ConvertError> {
        use Extension::*;

        let (family, extensions, soft_break, render_level): (_, &[Extension], _, _) = match syntax
        {
            COMMONMARK_0_27 => (
                EmulationFamily::CommonMark,
                &[],
                SoftBreak::Space,
                RenderLevel::Base,
            ),
            MARKDOWN_1_0 => (
                EmulationFamily::Markdown,
                &[Tables, Autolink],
                SoftBreak::NewLine,
                RenderLevel::Base,
            ),
            MARKDOWN_1_1 => (
                EmulationFamily::Markdown,
                &[
                    Tables,
                    Autolink,
                    Definitions,
                    Superscript,
                    Subscript,
                    Strikethrough,
                ],
                SoftBreak::NewLine,
                RenderLevel::Extended,
            ),
            MARKDOWN_1_2 => (
                EmulationFamily::CommonMark,
                &[
                    WikiLinks,
                    Autolink,
                    Definitions,
                    Tables,
                    Strikethrough,
                    Subscript,
                    Superscript,
                    Abbreviations,
                    Macros,
                ],
                SoftBreak::Space,
                RenderLevel::Wiki,
            ),
            MARKDOWN_GITHUB_1_0 => (
                EmulationFamily::Github,
                &Extension::ALL,
                SoftBreak::Space,
                RenderLevel::Wiki,
            ),
            other => return Err(ConvertError::FormatNotFound(other.to_string())),
        };

        Ok(DialectConfig {
            syntax: syntax.to_string(),
            family,
            extensions: extensions.iter().copied().collect(),
            soft_break,
            render_level,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Defaults for every built-in Markdown syntax.
    pub fn builtin() -> Vec<DialectConfig> {
        MARKDOWN_SYNTAXES
            .iter()
            .filter_map(|id| DialectConfig::for_syntax(id).ok())
            .collect()
    }

    pub fn has(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    /// Replace the extension set from configuration ids.
    pub fn with_extensions<I, S>(mut self, ids: I) -> Result<Self, ConvertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = ids
            .into_iter()
            .map(|id| id.as_ref().parse())
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn with_family(mut self, family: EmulationFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_soft_break(mut self, soft_break: SoftBreak) -> Self {
        self.soft_break = soft_break;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
