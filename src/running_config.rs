//! Running-configuration snapshots and block extraction.
//!
//! EOS renders its configuration as top-level header lines followed by
//! indented child lines, each block closed by a bare `!`. Extraction here is
//! purely positional: a block is located by its header and ends at the first
//! terminator that follows, so blocks nested inside a block (for example
//! `mst configuration` under spanning-tree) are not distinguished. Callers
//! that need finer structure re-scan the extracted block.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

static TERMINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^!$").expect("Invalid block terminator regex"));

/// Byte offsets of a configuration block within its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Offset of the first byte of the header line
    pub start: usize,
    /// Offset one past the terminating `!`
    pub end: usize,
}

impl Span {
    /// Returns the slice of `text` covered by this span.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Locates the block whose header line is exactly `parent`.
pub fn find_block(text: &str, parent: &str) -> Option<Span> {
    let header = Regex::new(&format!(r"(?m)^{}$", regex::escape(parent))).ok()?;
    find_block_matching(text, &header)
}

/// Locates the block whose header is the first match of `header`.
///
/// `header` should be anchored at line start; the terminator search begins
/// at the end of the header match.
pub fn find_block_matching(text: &str, header: &Regex) -> Option<Span> {
    let head = header.find(text)?;
    let rest = &text[head.end()..];
    let terminator = TERMINATOR.find(rest)?;
    Some(Span {
        start: head.start(),
        end: head.end() + terminator.end(),
    })
}

/// Extracts the block whose header line is exactly `parent`.
pub fn extract_block<'a>(text: &'a str, parent: &str) -> Option<&'a str> {
    find_block(text, parent).map(|span| span.slice(text))
}

/// A frozen copy of the device's running configuration.
///
/// Cloning shares the underlying text.
#[derive(Clone, PartialEq, Eq)]
pub struct RunningConfig {
    text: Arc<str>,
}

impl RunningConfig {
    /// Wraps fetched configuration text.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// The full configuration text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the block headed by `parent`, if configured.
    pub fn block(&self, parent: &str) -> Option<&str> {
        extract_block(&self.text, parent)
    }

    /// Returns the block whose header matches `header`, if configured.
    pub fn block_matching(&self, header: &Regex) -> Option<&str> {
        find_block_matching(&self.text, header).map(|span| span.slice(&self.text))
    }

    /// Returns true if the configuration contains no text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Debug for RunningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningConfig")
            .field("bytes", &self.text.len())
            .finish()
    }
}

impl AsRef<str> for RunningConfig {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "hostname veos\n!\ninterface Ethernet1\n   description test interface\n   no shutdown\n!\ninterface Ethernet10\n   shutdown\n!\n";

    #[test]
    fn test_extract_block_includes_terminator() {
        let block = extract_block(CONFIG, "interface Ethernet1").unwrap();
        assert_eq!(
            block,
            "interface Ethernet1\n   description test interface\n   no shutdown\n!"
        );
    }

    #[test]
    fn test_extract_block_requires_whole_line() {
        let block = extract_block(CONFIG, "interface Ethernet10").unwrap();
        assert!(block.contains("shutdown"));
        assert!(!block.contains("description"));
        assert!(extract_block(CONFIG, "interface Ethernet").is_none());
    }

    #[test]
    fn test_missing_terminator() {
        assert!(extract_block("interface Ethernet1\n   shutdown\n", "interface Ethernet1").is_none());
    }

    #[test]
    fn test_missing_parent() {
        assert!(extract_block(CONFIG, "interface Ethernet2").is_none());
    }

    #[test]
    fn test_parent_is_escaped() {
        let text = "ip route 10.0.0.0/8 1.1.1.1\nrouter ospf 1\n   max-lsa 1000\n!\n";
        assert!(extract_block(text, "ip route 10.0.0.0.8 1.1.1.1").is_none());
        assert!(extract_block(text, "router ospf 1").is_some());
    }

    #[test]
    fn test_span_offsets() {
        let span = find_block(CONFIG, "interface Ethernet1").unwrap();
        assert_eq!(span.start, CONFIG.find("interface Ethernet1").unwrap());
        assert_eq!(&CONFIG[span.end - 1..span.end], "!");
        assert!(!span.is_empty());
    }

    #[test]
    fn test_running_config_shares_text() {
        let config = RunningConfig::new(CONFIG);
        let copy = config.clone();
        assert_eq!(copy.block("interface Ethernet1"), config.block("interface Ethernet1"));
        assert!(!config.is_empty());
        assert!(RunningConfig::new("\n").is_empty());
    }
}
