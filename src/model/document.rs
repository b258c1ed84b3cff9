//! Source document - the user's script and the generated block inside it

use std::io::Write;
use std::path::{Path, PathBuf};

use ropey::Rope;
use tempfile::NamedTempFile;

use crate::error::{EditError, Result};
use crate::util::indentation;

/// First line of the generated block
pub const START_MARKER: &str = "#% start: automatic generated code from plotedit";
/// Last line of the generated block
pub const END_MARKER: &str = "#% end: automatic generated code from plotedit";

/// Line span of the generated block, markers inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub start_line: usize,
    pub end_line: usize,
    /// Leading whitespace of the start marker
    pub indent: String,
}

/// The script being edited
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    /// Contents as last read or written
    pub buffer: Rope,
    /// Line a new block is inserted before; recorded once per session
    pub anchor_line: usize,
}

impl SourceDocument {
    /// Read a script from disk
    pub fn open(path: impl Into<PathBuf>, anchor_line: usize) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| EditError::io(&path, e))?;
        tracing::debug!(path = %path.display(), anchor_line, "opened source document");
        Ok(Self::from_text(path, &content, anchor_line))
    }

    /// Create a document from in-memory text
    pub fn from_text(path: impl Into<PathBuf>, text: &str, anchor_line: usize) -> Self {
        Self {
            path: path.into(),
            buffer: Rope::from(text),
            anchor_line,
        }
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Number of lines, not counting the empty tail after a final newline
    pub fn line_count(&self) -> usize {
        let lines = self.buffer.len_lines();
        if self.buffer.len_chars() > 0 && self.buffer.line(lines - 1).len_chars() == 0 {
            lines - 1
        } else {
            lines.min(self.buffer.len_chars())
        }
    }

    /// Line content without its line ending
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.line_count() {
            return None;
        }
        let mut line = self.buffer.line(idx).to_string();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Some(line)
    }

    /// Dominant line ending of the document, `\n` when there is none
    pub fn line_ending(&self) -> &'static str {
        let mut crlf = 0usize;
        let mut lf = 0usize;
        let mut prev = '\0';
        for ch in self.buffer.chars() {
            if ch == '\n' {
                if prev == '\r' {
                    crlf += 1;
                } else {
                    lf += 1;
                }
            }
            prev = ch;
        }
        if crlf > lf {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Locate the generated block
    ///
    /// When the script holds several complete blocks, the last one starting at
    /// or before the anchor line wins, otherwise the first one after it. A start
    /// marker without a matching end marker does not count as a block.
    pub fn region(&self) -> Option<Region> {
        let mut regions = Vec::new();
        let mut open: Option<(usize, String)> = None;

        for idx in 0..self.line_count() {
            let Some(line) = self.line(idx) else { break };
            let trimmed = line.trim();
            if trimmed == START_MARKER {
                if let Some((dangling, _)) = open.take() {
                    tracing::warn!(line = dangling, "start marker without end marker");
                }
                open = Some((idx, indentation(&line).to_string()));
            } else if trimmed == END_MARKER {
                match open.take() {
                    Some((start_line, indent)) => regions.push(Region {
                        start_line,
                        end_line: idx,
                        indent,
                    }),
                    None => tracing::warn!(line = idx, "end marker without start marker"),
                }
            }
        }
        if let Some((dangling, _)) = open {
            tracing::warn!(line = dangling, "start marker without end marker");
        }

        let before = regions
            .iter()
            .rposition(|r| r.start_line <= self.anchor_line);
        match before {
            Some(idx) => Some(regions.swap_remove(idx)),
            None => regions.into_iter().next(),
        }
    }

    /// Lines strictly between the markers of the generated block
    pub fn region_lines(&self) -> Vec<String> {
        match self.region() {
            Some(region) => (region.start_line + 1..region.end_line)
                .filter_map(|idx| self.line(idx))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Full document text with the generated block set to `lines`
    ///
    /// Everything outside the block is kept byte for byte.
    pub fn with_block(&self, lines: &[String]) -> String {
        let eol = self.line_ending();
        let (start_char, end_char, indent, trailing_eol) = match self.region() {
            Some(region) => {
                let start = self.buffer.line_to_char(region.start_line);
                let end = self.buffer.line_to_char(region.end_line + 1);
                let ends_with_newline = end > start && self.buffer.char(end - 1) == '\n';
                (start, end, region.indent, ends_with_newline)
            }
            None if self.anchor_line < self.line_count() => {
                let at = self.buffer.line_to_char(self.anchor_line);
                let indent = self
                    .line(self.anchor_line)
                    .map(|l| indentation(&l).to_string())
                    .unwrap_or_default();
                (at, at, indent, true)
            }
            None => {
                // Anchor past the end: append
                let end = self.buffer.len_chars();
                (end, end, String::new(), true)
            }
        };

        let mut block = String::new();
        if start_char > 0 && self.buffer.char(start_char - 1) != '\n' {
            block.push_str(eol);
        }
        block.push_str(&indent);
        block.push_str(START_MARKER);
        block.push_str(eol);
        for line in lines {
            block.push_str(&indent);
            block.push_str(line);
            block.push_str(eol);
        }
        block.push_str(&indent);
        block.push_str(END_MARKER);
        if trailing_eol {
            block.push_str(eol);
        }

        let mut out = String::with_capacity(self.buffer.len_bytes() + block.len());
        out.extend(self.buffer.slice(..start_char).chunks());
        out.push_str(&block);
        out.extend(self.buffer.slice(end_char..).chunks());
        out
    }

    /// Replace the generated block on disk
    ///
    /// The new contents go to a temporary file in the same directory which then
    /// replaces the script, so a failed write leaves the original untouched.
    pub fn write_block(&mut self, lines: &[String]) -> Result<()> {
        let had_region = self.region();
        let old_lines = self.line_count();
        let text = self.with_block(lines);

        write_atomic(&self.path, &text)?;
        self.buffer = Rope::from(text.as_str());

        // Keep the anchor on the same script line
        match had_region {
            Some(region) if region.start_line > self.anchor_line => {}
            _ => {
                let grown = self.line_count() as isize - old_lines as isize;
                self.anchor_line = (self.anchor_line as isize + grown).max(0) as usize;
            }
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| EditError::io(path, e))?;
    tmp.write_all(text.as_bytes())
        .map_err(|e| EditError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| EditError::io(tmp.path(), e))?;
    if let Ok(meta) = std::fs::metadata(path) {
        std::fs::set_permissions(tmp.path(), meta.permissions())
            .map_err(|e| EditError::io(tmp.path(), e))?;
    }
    tmp.persist(path).map_err(|e| EditError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, anchor: usize) -> SourceDocument {
        SourceDocument::from_text("plot.py", text, anchor)
    }

    fn block(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_line_count_ignores_trailing_newline() {
        assert_eq!(doc("", 0).line_count(), 0);
        assert_eq!(doc("a\nb\n", 0).line_count(), 2);
        assert_eq!(doc("a\nb", 0).line_count(), 2);
        assert_eq!(doc("a\r\nb\r\n", 0).line(1).as_deref(), Some("b"));
    }

    #[test]
    fn test_insert_before_anchor_with_indentation() {
        let d = doc("def main():\n    plot()\n    plt.show()\n", 2);
        let out = d.with_block(&block(&["plt.figure(1).set_visible(False)"]));
        assert_eq!(
            out,
            format!(
                "def main():\n    plot()\n    {}\n    plt.figure(1).set_visible(False)\n    {}\n    plt.show()\n",
                START_MARKER, END_MARKER
            )
        );
    }

    #[test]
    fn test_replace_existing_region() {
        let text = format!(
            "import x\n{}\nold()\n{}\nplt.show()\n",
            START_MARKER, END_MARKER
        );
        let d = doc(&text, 4);
        assert_eq!(d.region_lines(), vec!["old()".to_string()]);
        let out = d.with_block(&block(&["new()"]));
        assert_eq!(
            out,
            format!("import x\n{}\nnew()\n{}\nplt.show()\n", START_MARKER, END_MARKER)
        );
    }

    #[test]
    fn test_crlf_is_reused() {
        let d = doc("a\r\nplt.show()\r\n", 1);
        let out = d.with_block(&block(&["x()"]));
        assert_eq!(
            out,
            format!("a\r\n{}\r\nx()\r\n{}\r\nplt.show()\r\n", START_MARKER, END_MARKER)
        );
    }

    #[test]
    fn test_anchor_past_end_appends() {
        let d = doc("a", 5);
        let out = d.with_block(&[]);
        assert_eq!(out, format!("a\n{}\n{}\n", START_MARKER, END_MARKER));
    }

    #[test]
    fn test_unterminated_start_is_not_a_region() {
        let d = doc(&format!("{}\nx()\n", START_MARKER), 0);
        assert_eq!(d.region(), None);
        assert!(d.region_lines().is_empty());
    }

    #[test]
    fn test_region_nearest_before_anchor() {
        let text = format!(
            "{s}\na()\n{e}\nfirst()\n{s}\nb()\n{e}\nsecond()\n",
            s = START_MARKER,
            e = END_MARKER
        );
        assert_eq!(doc(&text, 7).region_lines(), vec!["b()".to_string()]);
        assert_eq!(doc(&text, 3).region_lines(), vec!["a()".to_string()]);
    }

    #[test]
    fn test_write_block_is_atomic_and_tracks_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.py");
        std::fs::write(&path, "a\nplt.show()\n").unwrap();

        let mut d = SourceDocument::open(&path, 1).unwrap();
        d.write_block(&block(&["x()"])).unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, d.text());
        assert_eq!(d.line(d.anchor_line).as_deref(), Some("plt.show()"));

        // Second write replaces the block without moving the anchor line's content
        d.write_block(&block(&["y()", "z()"])).unwrap();
        assert_eq!(d.line(d.anchor_line).as_deref(), Some("plt.show()"));
        assert_eq!(d.region_lines(), block(&["y()", "z()"]));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SourceDocument::open(dir.path().join("missing.py"), 0);
        assert!(matches!(result, Err(EditError::Io { .. })));
    }
}
