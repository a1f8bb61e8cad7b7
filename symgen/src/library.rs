//! Library file text and the block splicer.
//!
//! A library is only ever modified by inserting new `DEF` blocks after the
//! last existing one. Everything else in the file is carried over byte for
//! byte.

pub const LIBRARY_HEADER: &str = "EESchema-LIBRARY Version 2.3\n#encoding utf-8\n";
pub const LIBRARY_FOOTER: &str = "#\n#End Library\n";

const END_DEF: &str = "ENDDEF";
const FOOTER_MARK: &str = "#\n#End Library";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryBlob {
    text: String,
    /// Byte offset where the next block goes.
    insert_at: usize,
    fresh: bool,
}

impl Default for LibraryBlob {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryBlob {
    /// An empty library: header and footer only.
    pub fn new() -> Self {
        let text = format!("{}{}", LIBRARY_HEADER, LIBRARY_FOOTER);
        Self {
            insert_at: LIBRARY_HEADER.len(),
            text,
            fresh: true,
        }
    }

    /// Wrap existing library content. Blank content is treated as a new library.
    pub fn from_existing(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            return Self::new();
        }
        let insert_at = Self::insertion_point(&text);
        Self {
            text,
            insert_at,
            fresh: false,
        }
    }

    /// Just past the last line that is exactly `ENDDEF`; before the footer when
    /// there is none; otherwise the end of the text.
    fn insertion_point(text: &str) -> usize {
        let mut offset = 0;
        let mut after_last_def = None;
        for line in text.split_inclusive('\n') {
            offset += line.len();
            if line.trim() == END_DEF {
                after_last_def = Some(offset);
            }
        }
        after_last_def.unwrap_or_else(|| text.rfind(FOOTER_MARK).unwrap_or(text.len()))
    }

    /// Insert one block. Successive blocks keep their insertion order.
    pub fn insert(&mut self, block: &str) {
        let mut block = block.to_string();
        // Appending to a file without a trailing newline must not glue lines.
        if self.insert_at == self.text.len() && !self.text.is_empty() && !self.text.ends_with('\n') {
            block.insert(0, '\n');
        }
        self.text.insert_str(self.insert_at, &block);
        self.insert_at += block.len();
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
