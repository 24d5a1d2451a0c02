//! Citation source opening.
//!
//! Citation strings are opaque: the client never interprets them, it hands
//! them to a [`SourceOpener`] collaborator. The default implementation
//! defers to the platform opener; tests substitute a recording double.

use std::io;
use std::process::{Command, Stdio};

/// Resolves an opaque citation string to something the user can look at.
pub trait SourceOpener {
    /// Opens the given source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source could not be handed off for opening.
    fn open(&self, source: &str) -> io::Result<()>;
}

/// Opens sources with the platform's default opener.
///
/// The child process is detached with its streams nulled so it cannot write
/// over the terminal UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

/// Returns the platform open command and its leading arguments.
fn open_command() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(windows) {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    }
}

impl SourceOpener for SystemOpener {
    fn open(&self, source: &str) -> io::Result<()> {
        let (program, args) = open_command();
        Command::new(program)
            .args(args)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
}

/// Test double that records every opened source.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    /// Sources passed to [`SourceOpener::open`], in call order.
    pub opened: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
}

#[cfg(test)]
impl RecordingOpener {
    /// Creates a recorder and a shared handle to its log.
    #[must_use]
    pub fn new() -> (Self, std::rc::Rc<std::cell::RefCell<Vec<String>>>) {
        let opener = Self::default();
        let handle = std::rc::Rc::clone(&opener.opened);
        (opener, handle)
    }
}

#[cfg(test)]
impl SourceOpener for RecordingOpener {
    fn open(&self, source: &str) -> io::Result<()> {
        self.opened.borrow_mut().push(source.to_string());
        Ok(())
    }
}
