//! Recognizer for the statements of the managed region
//!
//! The grammar is deliberately small: `<objectPath><selector>(<args>)` with an
//! optional `  # id=<childPath>.new` tag on creation statements. Updates are only
//! recognized for setter selectors (`.set_*` / `._set_*`); everything else is
//! opaque and travels through a load/save cycle verbatim.

use std::sync::LazyLock;

use regex::Regex;

use super::statement::CREATION_SELECTORS;

static CREATION_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<stmt>.*\))\s+#\s*id=(?P<id>\S+)\.new$").expect("valid creation tag regex")
});

static OBJECT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^plt\.figure\(\d+\)(?:\.(?:axes|texts|patches|legends)\[\d+\]|\.ax_dict\["[^"\\]*"\]|\.[xy]axis\.label)*"#,
    )
    .expect("valid object path regex")
});

static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<selector>\.[A-Za-z_][\w.]*)\((?P<args>.*)\)$").expect("valid call regex")
});

/// A recognized statement, borrowing from the source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement<'a> {
    /// Path of the object the call is made on
    pub object: &'a str,
    /// Leading property selector, e.g. `.set_position`
    pub selector: &'a str,
    /// Selector plus argument list, exactly as written
    pub command: &'a str,
    /// Path of the element a creation statement creates
    pub created: Option<&'a str>,
}

impl Statement<'_> {
    pub fn is_creation(&self) -> bool {
        self.created.is_some()
    }
}

/// Classification of one line inside the managed region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    Blank,
    /// The synthesizer-owned label lookup header
    Header,
    Statement(Statement<'a>),
    /// Not part of the grammar; preserved verbatim
    Opaque(&'a str),
}

/// Classify a region line; `header` is the exact header statement for this figure
pub fn parse_line<'a>(line: &'a str, header: &str) -> ParsedLine<'a> {
    let line = line.trim();
    if line.is_empty() {
        return ParsedLine::Blank;
    }
    if line == header {
        return ParsedLine::Header;
    }
    match parse_statement(line) {
        Some(stmt) => ParsedLine::Statement(stmt),
        None => ParsedLine::Opaque(line),
    }
}

fn parse_statement(line: &str) -> Option<Statement<'_>> {
    let (stmt, created) = match CREATION_TAG_RE.captures(line) {
        Some(caps) => {
            let stmt = caps.name("stmt")?.as_str();
            let id = caps.name("id")?.as_str();
            (stmt, Some(id))
        }
        None => (line, None),
    };

    let object = OBJECT_PATH_RE.find(stmt)?.as_str();
    let command = &stmt[object.len()..];
    let call = CALL_RE.captures(command)?;
    let selector = call.name("selector")?.as_str();
    if !balanced(call.name("args")?.as_str()) {
        return None;
    }

    let is_creation = CREATION_SELECTORS.contains(&selector);
    let is_setter = selector.starts_with(".set_") || selector.starts_with("._set_");
    match (created, is_creation, is_setter) {
        (Some(_), true, _) | (None, false, true) => Some(Statement {
            object,
            selector,
            command,
            created,
        }),
        _ => None,
    }
}

/// Parentheses and brackets balance outside of string literals
fn balanced(args: &str) -> bool {
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in args.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && quote.is_none()
}

/// Leading property selector of a command text, e.g. `.set_position`
pub fn leading_selector(command: &str) -> Option<&str> {
    static SELECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(\.[A-Za-z_][\w.]*)\(").expect("valid selector regex")
    });
    SELECTOR_RE
        .captures(command)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
