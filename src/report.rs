//! Console report formatting.
//!
//! All user-facing output goes through [`Reporter`] so the markers and
//! section layout stay uniform and tests can capture the text.

use std::io::{self, Write};

pub const OK_MARK: &str = "✓";
pub const FAIL_MARK: &str = "✗";

const TITLE_RULE_WIDTH: usize = 50;
const SECTION_RULE_WIDTH: usize = 40;

pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Top-level banner printed once per run
    pub fn title(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        writeln!(self.out, "{}", "=".repeat(TITLE_RULE_WIDTH))
    }

    /// Stage header, preceded by a blank line
    pub fn section(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", text)?;
        writeln!(self.out, "{}", "=".repeat(SECTION_RULE_WIDTH))
    }

    pub fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(TITLE_RULE_WIDTH))
    }

    pub fn ok(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{} {}", OK_MARK, text)
    }

    pub fn fail(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{} {}", FAIL_MARK, text)
    }

    /// `ok`/`fail` indented one level, used for per-file findings
    pub fn item(&mut self, found: bool, text: &str) -> io::Result<()> {
        let mark = if found { OK_MARK } else { FAIL_MARK };
        writeln!(self.out, "  {} {}", mark, text)
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn indented(&mut self, depth: usize, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}{}", "  ".repeat(depth), text)
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Reporter<Vec<u8>>) -> io::Result<()>,
    {
        let mut reporter = Reporter::new(Vec::new());
        f(&mut reporter).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_markers_and_indentation() {
        let text = render(|r| {
            r.ok("syntax fine")?;
            r.fail("missing")?;
            r.item(true, "dav_methods: PUT")?;
            r.item(false, "dav_access: not found")?;
            r.indented(2, "log line")
        });

        assert_eq!(
            text,
            "✓ syntax fine\n✗ missing\n  ✓ dav_methods: PUT\n  ✗ dav_access: not found\n    log line\n"
        );
    }

    #[test]
    fn test_section_layout() {
        let text = render(|r| {
            r.title("Title")?;
            r.section("Stage")
        });

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Title");
        assert_eq!(lines[1].len(), 50);
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Stage");
        assert_eq!(lines[4], "=".repeat(40));
    }
}
