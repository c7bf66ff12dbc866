//! Placeholder converters.
//!
//! A converter decides what text a template variable may consume. Each one
//! resolves to a regular-expression fragment that is spliced into the
//! compiled matcher of a route:
//!
//! ```ignore
//!  Converter          Matches
//!  string (default)   one or more characters except '/'
//!  path               one or more characters, '/' included
//!  int                one or more ASCII digits
//!  float              digits, optionally followed by '.' and digits
//!  uuid               8-4-4-4-12 hexadecimal groups
//!  any(a,b,c)         exactly one of the listed alternatives
//! ```
//!
//! Unknown converter names resolve to `string`.
use std::borrow::Cow;

/// A resolved placeholder converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Converter {
    String,
    Path,
    Int,
    Float,
    Uuid,
    /// Literal alternatives, matched verbatim and case-sensitively.
    Any(Vec<String>),
}

impl Converter {
    /// Looks up a converter by name.
    ///
    /// `args` is the text between the parentheses of `name(args)`, if any.
    /// Only `any` reads it. An unrecognized name falls back to
    /// [`Converter::String`] and never fails.
    ///
    /// ```rust
    /// use staticrouter::Converter;
    ///
    /// assert_eq!(Converter::resolve("int", None), Converter::Int);
    /// assert_eq!(Converter::resolve("intt", None), Converter::String);
    /// assert_eq!(
    ///     Converter::resolve("any", Some("red, green")),
    ///     Converter::Any(vec!["red".into(), "green".into()])
    /// );
    /// ```
    pub fn resolve(name: &str, args: Option<&str>) -> Self {
        match name {
            "" | "default" | "string" => Converter::String,
            "path" => Converter::Path,
            "int" => Converter::Int,
            "float" => Converter::Float,
            "uuid" => Converter::Uuid,
            "any" => Converter::Any(
                args.unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|choice| !choice.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            unknown => {
                tracing::warn!(converter = unknown, "unknown converter, matching as `string`");
                Converter::String
            }
        }
    }

    /// The regular-expression fragment for this converter.
    ///
    /// Fragments contain no capturing groups, so the compiler can wrap each
    /// one in a single group and map captures back to variables by position.
    pub fn fragment(&self) -> Cow<'static, str> {
        match self {
            Converter::String => Cow::Borrowed("[^/]+"),
            Converter::Path => Cow::Borrowed("(?s:.+)"),
            Converter::Int => Cow::Borrowed("[0-9]+"),
            Converter::Float => Cow::Borrowed(r"[0-9]+(?:\.[0-9]+)?"),
            Converter::Uuid => Cow::Borrowed(
                "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
            ),
            Converter::Any(choices) => {
                let alternatives = choices
                    .iter()
                    .map(|choice| regex::escape(choice))
                    .collect::<Vec<_>>();
                Cow::Owned(format!("(?:{})", alternatives.join("|")))
            }
        }
    }

    /// Whether the converter may consume `/`.
    pub fn spans_segments(&self) -> bool {
        matches!(self, Converter::Path)
    }
}
