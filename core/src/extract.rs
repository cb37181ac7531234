//! Isolation of a single JSON object from noisy model output.
//!
//! Model text may carry markdown fences or prose around the payload. The
//! scanner tracks brace depth outside string literals so that braces inside
//! word values never close the object early.

use tracing::debug;

/// Lexical state of the brace scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Outside any string literal; braces count
    Normal,
    /// Inside a double-quoted string literal
    InString,
    /// Just after a backslash inside a string; the next char is taken literally
    Escaped,
}

/// Depth-counting scanner over a single pass of text
#[derive(Debug, Clone)]
pub struct BraceScanner {
    state: ScanState,
    depth: usize,
    start: Option<usize>,
}

impl Default for BraceScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BraceScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Normal,
            depth: 0,
            start: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Feed one character at byte offset `pos`.
    ///
    /// Returns the byte range of the outermost object once its closing brace
    /// brings the depth back to zero.
    pub fn feed(&mut self, pos: usize, ch: char) -> Option<(usize, usize)> {
        match self.state {
            ScanState::Escaped => {
                self.state = ScanState::InString;
                None
            }
            ScanState::InString => {
                match ch {
                    '\\' => self.state = ScanState::Escaped,
                    '"' => self.state = ScanState::Normal,
                    _ => {}
                }
                None
            }
            ScanState::Normal => match ch {
                '"' => {
                    self.state = ScanState::InString;
                    None
                }
                '{' => {
                    if self.start.is_none() {
                        self.start = Some(pos);
                    }
                    self.depth += 1;
                    None
                }
                '}' if self.depth > 0 => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        self.start.map(|start| (start, pos + ch.len_utf8()))
                    } else {
                        None
                    }
                }
                _ => None,
            },
        }
    }
}

/// Remove markdown code-fence markers
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// Return the first balanced `{...}` in `text`, ignoring braces inside strings.
///
/// Scanning starts at the first `{`; quotes in any lead-in prose are not JSON.
pub fn find_balanced_object(text: &str) -> Option<&str> {
    let object = &text[text.find('{')?..];
    let mut scanner = BraceScanner::new();
    for (pos, ch) in object.char_indices() {
        if let Some((start, end)) = scanner.feed(pos, ch) {
            return Some(&object[start..end]);
        }
    }
    None
}

/// Extract the single outermost JSON object from raw model output.
///
/// Falls back to the span between the first `{` and the last `}` when the
/// braces never balance. Returns `None` when no object can be located.
pub fn extract_json_object(raw: &str) -> Option<String> {
    let cleaned = strip_code_fences(raw);

    if let Some(object) = find_balanced_object(&cleaned) {
        return Some(object.to_string());
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end > start {
        debug!("Unbalanced braces in model output, salvaging first '{{' to last '}}'");
        Some(cleaned[start..=end].to_string())
    } else {
        None
    }
}
