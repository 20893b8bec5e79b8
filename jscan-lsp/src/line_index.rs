//! Conversions between byte offsets and protocol positions.
//!
//! Protocol columns count UTF-16 code units; the engine reports UTF-8 byte offsets.

use tower_lsp::lsp_types::Position;

pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (idx, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a position.
    ///
    /// Offsets past the end clamp to the end of the text; offsets inside a multi-byte character
    /// resolve to the start of that character.
    pub fn position(&self, offset: usize) -> Position {
        let offset = floor_char_boundary(self.text, offset);
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);
        let line_start = self.line_starts[line];
        let character = self.text[line_start..offset].encode_utf16().count();
        Position::new(line as u32, character as u32)
    }

    /// Convert a position to a byte offset.
    ///
    /// A line past the end maps to the end of the text; a column past the end of its line maps
    /// to the end of that line (before any line terminator).
    pub fn offset(&self, position: Position) -> usize {
        let line = position.line as usize;
        let Some(&line_start) = self.line_starts.get(line) else {
            return self.text.len();
        };
        let line_end = self.line_content_end(line);
        let target = position.character as usize;
        let mut units = 0;
        for (idx, ch) in self.text[line_start..line_end].char_indices() {
            if units >= target {
                return line_start + idx;
            }
            units += ch.len_utf16();
        }
        line_end
    }

    fn line_content_end(&self, line: usize) -> usize {
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        let content = &self.text[self.line_starts[line]..end];
        if content.ends_with('\r') {
            end - 1
        } else {
            end
        }
    }
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
