//! Growable text buffer used to assemble generated source.

use std::fmt;

/// An owned, growable text buffer.
///
/// Appending never overwrites existing content and never borrows from the
/// appended input. The buffer is handed out by value so callers own the
/// result outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
        }
    }

    /// Appends `s`, growing the buffer as needed.
    pub fn append(&mut self, s: &str) -> &mut Self {
        self.text.push_str(s);
        self
    }

    /// Appends `s` followed by `new_line`.
    pub fn append_line(&mut self, s: &str, new_line: &str) -> &mut Self {
        self.append(s).append(new_line)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.text.capacity()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the buffer, returning the assembled text.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl From<String> for TextBuffer {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl fmt::Write for TextBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s);
        Ok(())
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_prefix_and_suffix() {
        let long = "x".repeat(10_000);
        let cases = [
            ("", ""),
            ("<?php\n", "echo_hello;"),
            ("héllo ", "wörld ✓"),
            ("abc", long.as_str()),
        ];

        for (prefix, suffix) in cases {
            let mut buf = TextBuffer::from(prefix);
            let before = buf.len();
            buf.append(suffix);

            assert!(buf.as_str().starts_with(prefix));
            assert!(buf.as_str().ends_with(suffix));
            assert_eq!(buf.len(), before + suffix.len());
        }
    }

    #[test]
    fn test_append_grows_past_initial_capacity() {
        let mut buf = TextBuffer::with_capacity(2);
        buf.append("abcdef").append("ghij");

        assert_eq!(buf.as_str(), "abcdefghij");
        assert!(buf.capacity() >= buf.len());
    }

    #[test]
    fn test_append_line_and_write() {
        use std::fmt::Write;

        let mut buf = TextBuffer::new();
        buf.append_line("<?php", "\n");
        write!(buf, "#{}", "DEFINE").unwrap();

        assert_eq!(buf.into_string(), "<?php\n#DEFINE");
    }
}
