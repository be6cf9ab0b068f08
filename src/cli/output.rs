//! Colored terminal output for packaging commands
//!
//! Status lines go to stdout with a colored marker; errors go to stderr and
//! ignore `--quiet`.

use std::io::{self, Write};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer, "{message}")?;
        self.bufwtr.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.marked(Color::Green, true, "✓", message, None)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.marked(Color::Yellow, true, "⚠", message, Some(Color::Yellow))
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) -> io::Result<()> {
        self.marked(Color::Magenta, false, "⋯", message, None)
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.marked(Color::Blue, false, "→", message, None)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer, "    {message}")?;
        self.bufwtr.print(&buffer)
    }

    /// Print an error message (always shown, on stderr)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        let written = write_marked(&mut buffer, Color::Red, true, "✗", message, Some(Color::Red))
            .and_then(|()| bufwtr.print(&buffer));

        if written.is_err() {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {message}");
        }
    }

    fn marked(
        &self,
        marker_color: Color,
        bold: bool,
        marker: &str,
        message: &str,
        text_color: Option<Color>,
    ) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.bufwtr.buffer();
        write_marked(&mut buffer, marker_color, bold, marker, message, text_color)?;
        self.bufwtr.print(&buffer)
    }
}

fn write_marked(
    buffer: &mut Buffer,
    marker_color: Color,
    bold: bool,
    marker: &str,
    message: &str,
    text_color: Option<Color>,
) -> io::Result<()> {
    buffer.set_color(ColorSpec::new().set_fg(Some(marker_color)).set_bold(bold))?;
    write!(buffer, "{marker}")?;
    buffer.reset()?;
    if let Some(color) = text_color {
        buffer.set_color(ColorSpec::new().set_fg(Some(color)))?;
    }
    writeln!(buffer, " {message}")?;
    buffer.reset()
}
