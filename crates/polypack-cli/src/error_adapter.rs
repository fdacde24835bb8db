//! Error adapter for converting PolypackError to miette diagnostics.
//!
//! This module bridges the library's error type and miette's graphical
//! report rendering used by the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use polypack::PolypackError;

/// Adapter for a [`PolypackError`].
///
/// Polypack errors carry no source spans, so only a stable code and an
/// optional help text are attached.
pub struct ErrorAdapter<'a>(pub &'a PolypackError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            PolypackError::Io(_) => "polypack::io",
            PolypackError::InvalidInput(_) => "polypack::input",
            PolypackError::Config(_) => "polypack::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            PolypackError::Io(_) => return None,
            PolypackError::InvalidInput(_) => {
                "every component needs a non-empty hull of finite rectangles"
            }
            PolypackError::Config(_) => "check the [packing] and [compaction] sections",
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// An error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`PolypackError`] into a list of reportable errors.
pub fn to_reportables(err: &PolypackError) -> Vec<Reportable<'_>> {
    vec![Reportable::Error(ErrorAdapter(err))]
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn code_of(err: &PolypackError) -> Option<String> {
        ErrorAdapter(err).code().map(|c| c.to_string())
    }

    #[test]
    fn test_codes_are_stable() {
        let io_err = PolypackError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(code_of(&io_err).as_deref(), Some("polypack::io"));

        let input = PolypackError::invalid_input("component 3 has an empty hull");
        assert_eq!(code_of(&input).as_deref(), Some("polypack::input"));

        let config = PolypackError::Config("bad".to_string());
        assert_eq!(code_of(&config).as_deref(), Some("polypack::config"));
    }

    #[test]
    fn test_single_reportable() {
        let err = PolypackError::invalid_input("component 3 has an empty hull");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(
            reportables[0].to_string(),
            "Invalid input: component 3 has an empty hull"
        );
        assert!(reportables[0].help().is_some());
        assert!(reportables[0].labels().is_none());
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = PolypackError::Io(io::Error::other("disk full"));
        let reportables = to_reportables(&err);
        assert!(std::error::Error::source(&reportables[0]).is_some());
        assert!(reportables[0].help().is_none());
    }

    #[test]
    fn test_renders_with_graphical_handler() {
        let err = PolypackError::Config("Missing configuration file: x.toml".to_string());
        let mut out = String::new();
        miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
            .render_report(&mut out, &to_reportables(&err)[0])
            .expect("rendering into a String");
        assert!(out.contains("polypack::config"), "{out}");
        assert!(out.contains("x.toml"), "{out}");
    }
}
