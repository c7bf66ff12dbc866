//! Route templates and their compiled matchers.
//!
//! A template is a path with zero or more typed placeholders:
//! ```ignore
//!  Syntax                        Meaning
//!  <name>                        same as <string:name>
//!  <converter:name>              a variable consumed by `converter`
//!  <any(a,b,c):name>             one of the listed alternatives
//! ```
//!
//! Templates are compiled once, at registration, into a regular expression
//! anchored on both ends. A path matches only if the whole of it is
//! consumed:
//! ```ignore
//!  Template: /js/<path:requested_path>
//!
//!  /js/app.js                match: requested_path="app.js"
//!  /js/vendor/lib/x.js       match: requested_path="vendor/lib/x.js"
//!  /js/                      no match
//!  /static/js/app.js         no match
//! ```
use regex::Regex;

use crate::converter::Converter;
use crate::error::TemplateError;
use crate::params::Params;

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Text matched verbatim.
    Literal(&'t str),
    /// A typed variable.
    Placeholder {
        converter: Converter,
        variable: &'t str,
    },
}

/// A parsed, not yet compiled, route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template<'t> {
    raw: &'t str,
    segments: Vec<Segment<'t>>,
}

impl<'t> Template<'t> {
    /// Parses a template, validating its placeholders.
    ///
    /// ```rust
    /// use staticrouter::{Converter, Segment, Template};
    ///
    /// let template = Template::parse("/item/<int:id>").unwrap();
    /// assert_eq!(
    ///     template.segments(),
    ///     &[
    ///         Segment::Literal("/item/"),
    ///         Segment::Placeholder { converter: Converter::Int, variable: "id" },
    ///     ]
    /// );
    /// ```
    pub fn parse(raw: &'t str) -> Result<Self, TemplateError> {
        let bytes = raw.as_bytes();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'<' => {
                    if literal_start < i {
                        segments.push(Segment::Literal(&raw[literal_start..i]));
                    }
                    let end = placeholder_end(raw, i)?;
                    segments.push(parse_placeholder(raw, i, &raw[i + 1..end])?);
                    i = end + 1;
                    literal_start = i;
                }
                b'>' => {
                    return Err(TemplateError::UnexpectedClose {
                        template: raw.to_owned(),
                        position: i,
                    })
                }
                _ => i += 1,
            }
        }

        if literal_start < bytes.len() {
            segments.push(Segment::Literal(&raw[literal_start..]));
        }

        let template = Template { raw, segments };
        template.validate()?;
        Ok(template)
    }

    /// The template string this was parsed from.
    pub fn as_str(&self) -> &'t str {
        self.raw
    }

    pub fn segments(&self) -> &[Segment<'t>] {
        &self.segments
    }

    /// Variable names in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { variable, .. } => Some(*variable),
            Segment::Literal(_) => None,
        })
    }

    fn validate(&self) -> Result<(), TemplateError> {
        let mut seen: Vec<&str> = Vec::new();
        let mut rest_of_path: Option<&str> = None;

        for segment in &self.segments {
            let (converter, variable) = match segment {
                Segment::Placeholder {
                    converter,
                    variable,
                } => (converter, *variable),
                Segment::Literal(_) => continue,
            };

            if let Some(name) = rest_of_path {
                return Err(TemplateError::PathNotLast {
                    template: self.raw.to_owned(),
                    name: name.to_owned(),
                });
            }
            if seen.contains(&variable) {
                return Err(TemplateError::DuplicateVariable {
                    template: self.raw.to_owned(),
                    name: variable.to_owned(),
                });
            }
            if let Converter::Any(choices) = converter {
                if choices.is_empty() {
                    return Err(TemplateError::EmptyChoice {
                        template: self.raw.to_owned(),
                        name: variable.to_owned(),
                    });
                }
            }
            if converter.spans_segments() {
                rest_of_path = Some(variable);
            }
            seen.push(variable);
        }

        Ok(())
    }

    /// Builds the anchored expression for this template. Every placeholder
    /// becomes exactly one capturing group, in declaration order.
    fn pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.raw.len() * 2);
        pattern.push('^');
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Placeholder { converter, .. } => {
                    pattern.push('(');
                    pattern.push_str(&converter.fragment());
                    pattern.push(')');
                }
            }
        }
        pattern.push('$');
        pattern
    }
}

/// Finds the `>` closing the placeholder opened at `start`.
fn placeholder_end(raw: &str, start: usize) -> Result<usize, TemplateError> {
    let mut depth = 0usize;

    for (offset, byte) in raw.as_bytes()[start + 1..].iter().enumerate() {
        let position = start + 1 + offset;
        match byte {
            b'(' => depth += 1,
            b')' if depth == 0 => {
                return Err(TemplateError::UnbalancedParens {
                    template: raw.to_owned(),
                    position,
                })
            }
            b')' => depth -= 1,
            b'>' if depth == 0 => return Ok(position),
            b'<' => {
                return Err(TemplateError::UnclosedPlaceholder {
                    template: raw.to_owned(),
                    position: start,
                })
            }
            _ => {}
        }
    }

    if depth > 0 {
        Err(TemplateError::UnbalancedParens {
            template: raw.to_owned(),
            position: start,
        })
    } else {
        Err(TemplateError::UnclosedPlaceholder {
            template: raw.to_owned(),
            position: start,
        })
    }
}

/// Parses the body of `<...>`, the text between the angle brackets.
fn parse_placeholder<'t>(
    raw: &'t str,
    start: usize,
    body: &'t str,
) -> Result<Segment<'t>, TemplateError> {
    // a ':' inside the argument list does not separate the variable
    let colon = match body.rfind(')') {
        Some(close) => body[close..].find(':').map(|c| close + c),
        None => body.find(':'),
    };

    let (head, variable) = match colon {
        Some(c) => (Some(&body[..c]), &body[c + 1..]),
        None => (None, body),
    };

    if !is_identifier(variable) {
        return Err(TemplateError::InvalidVariable {
            template: raw.to_owned(),
            name: variable.to_owned(),
        });
    }

    let converter = match head {
        None => Converter::String,
        Some(head) => match head.find('(') {
            Some(open) => {
                if !head.ends_with(')') {
                    return Err(TemplateError::UnbalancedParens {
                        template: raw.to_owned(),
                        position: start + 1 + open,
                    });
                }
                Converter::resolve(head[..open].trim(), Some(&head[open + 1..head.len() - 1]))
            }
            None => Converter::resolve(head.trim(), None),
        },
    };

    Ok(Segment::Placeholder {
        converter,
        variable,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// A route template compiled to an anchored matcher.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    template: String,
    matcher: Regex,
    variables: Vec<String>,
}

impl CompiledRoute {
    /// Compiles a template.
    ///
    /// Fails only on a malformed template; unknown converter names compile
    /// as `string`.
    ///
    /// ```rust
    /// use staticrouter::CompiledRoute;
    ///
    /// let route = CompiledRoute::compile("/color/<any(red,green,blue):c>").unwrap();
    /// assert!(route.matches("/color/green").is_some());
    /// assert!(route.matches("/color/purple").is_none());
    /// ```
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        let parsed = Template::parse(template)?;
        let pattern = parsed.pattern();
        let matcher = Regex::new(&pattern).map_err(|err| TemplateError::Pattern {
            template: template.to_owned(),
            message: err.to_string(),
        })?;

        Ok(Self {
            template: template.to_owned(),
            matcher,
            variables: parsed.variables().map(String::from).collect(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Variable names in declaration order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// The compiled matcher.
    pub fn as_regex(&self) -> &Regex {
        &self.matcher
    }

    /// Matches the whole of `path`, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let captures = self.matcher.captures(path)?;
        let mut params = Params::with_capacity(self.variables.len());
        for (i, name) in self.variables.iter().enumerate() {
            let value = captures.get(i + 1).map_or("", |m| m.as_str());
            params.push(name.as_str(), value);
        }
        Some(params)
    }
}

/// Compiles a template. Shorthand for [`CompiledRoute::compile`].
pub fn compile(template: &str) -> Result<CompiledRoute, TemplateError> {
    CompiledRoute::compile(template)
}
