//! Macro call syntax shared by the parser and the renderer.
//!
//! Block macros are written `{{id key="value"}}content{{/id}}` or `{{id key="value"/}}`.
//! Parameter values are double quoted; `\` escapes the next character.

use crate::ir::reference::Parameters;

/// Id and parameters of a macro call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    pub id: String,
    pub parameters: Parameters,
}

/// Split the info part of a macro (`id key="value"`) into id and parameters.
pub fn parse_macro_info(info: &str) -> MacroCall {
    let info = info.trim();
    let (id, rest) = match info.find(char::is_whitespace) {
        Some(pos) => (&info[..pos], &info[pos..]),
        None => (info, ""),
    };
    MacroCall {
        id: id.to_string(),
        parameters: parse_parameters(rest),
    }
}

/// A macro found in source text: the raw info string and the body, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroMatch {
    pub info: String,
    pub content: Option<String>,
}

fn is_macro_id(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Byte offset of the `}}` ending the macro opening that starts `body`, skipping quoted values.
fn info_end(body: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '\n' => return None,
            '}' if !in_quotes && body[i..].starts_with("}}") => return Some(i),
            _ => {}
        }
    }
    None
}

/// Recognize a macro at the start of `text`.
///
/// Returns the macro and the number of bytes it spans. Macros of the same id may nest;
/// the body runs up to the matching `{{/id}}`. One newline right after the opening and one
/// right before the closing are not part of the body.
pub fn scan_macro(text: &str) -> Option<(MacroMatch, usize)> {
    let body = text.strip_prefix("{{")?;
    let end = info_end(body)?;
    let info = &body[..end];
    let after_open = 2 + end + 2;

    if let Some(info) = info.strip_suffix('/') {
        let info = info.trim();
        let id = info.split_whitespace().next()?;
        return is_macro_id(id).then(|| {
            (
                MacroMatch {
                    info: info.to_string(),
                    content: None,
                },
                after_open,
            )
        });
    }

    let info = info.trim();
    let id = info.split_whitespace().next()?;
    if !is_macro_id(id) {
        return None;
    }

    let open = format!("{{{{{id}");
    let close = format!("{{{{/{id}}}}}");
    let mut depth = 0usize;
    let mut cursor = after_open;
    loop {
        let rest = &text[cursor..];
        let next_close = rest.find(&close)?;
        let next_open = rest.find(&open).filter(|&at| {
            at < next_close
                && rest[at + open.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c == '}' || c == '/' || c.is_whitespace())
        });
        match next_open {
            Some(at) => {
                depth += 1;
                cursor += at + open.len();
            }
            None if depth > 0 => {
                depth -= 1;
                cursor += next_close + close.len();
            }
            None => {
                let raw = &text[after_open..cursor + next_close];
                let raw = raw.strip_prefix('\n').unwrap_or(raw);
                let raw = raw.strip_suffix('\n').unwrap_or(raw);
                return Some((
                    MacroMatch {
                        info: info.to_string(),
                        content: Some(raw.to_string()),
                    },
                    cursor + next_close + close.len(),
                ));
            }
        }
    }
}

/// Parse `key="value" key2=value2` pairs. Entries without a key are ignored.
pub fn parse_parameters(source: &str) -> Parameters {
    let mut params = Parameters::new();
    let mut chars = source.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        if chars.next_if_eq(&'=').is_none() {
            continue;
        }

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    other => value.push(other),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                value.push(c);
            }
        }

        if !key.is_empty() {
            params.insert(key, value);
        }
    }

    params
}

/// Render parameters as `key="value"` pairs separated by spaces.
pub fn serialize_parameters(params: &Parameters) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}=\"{}\"", escape_value(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("}}", "\\}\\}")
}

/// Render a macro in block form, on one line when `separate_lines` is false.
pub fn render_block_macro(
    id: &str,
    params: &Parameters,
    content: Option<&str>,
    separate_lines: bool,
) -> String {
    let mut out = format!("{{{{{id}");
    if !params.is_empty() {
        out.push(' ');
        out.push_str(&serialize_parameters(params));
    }
    match content {
        None => out.push_str("/}}"),
        Some(content) => {
            let newline = if separate_lines { "\n" } else { "" };
            out.push_str("}}");
            out.push_str(newline);
            out.push_str(content);
            out.push_str(newline);
            out.push_str(&format!("{{{{/{id}}}}}"));
        }
    }
    out
}

/// Compact inline form: `#[id](key="value" "content")`.
pub fn render_inline_macro(id: &str, params: &Parameters, content: Option<&str>) -> String {
    let mut args = Vec::new();
    if !params.is_empty() {
        args.push(serialize_parameters(params));
    }
    if let Some(content) = content {
        args.push(format!("\"{}\"", escape_value(content)));
    }
    format!("#[{id}]({})", args.join(" "))
}
