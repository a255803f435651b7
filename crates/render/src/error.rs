use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Font file missing or unusable.
    Font { path: PathBuf, message: String },
    /// Background image missing, undecodable, or not writable.
    Image { path: PathBuf, message: String },
    /// Backend failure while drawing.
    Draw(String),
    /// A figure panel names a quantity with no matrix.
    MissingMatrix { figure: PathBuf, quantity: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Font { path, message } => write!(f, "font {}: {message}", path.display()),
            Self::Image { path, message } => write!(f, "image {}: {message}", path.display()),
            Self::Draw(msg) => write!(f, "drawing failed: {msg}"),
            Self::MissingMatrix { figure, quantity } => write!(
                f,
                "figure {}: no matrix for quantity '{quantity}'",
                figure.display()
            ),
        }
    }
}

impl std::error::Error for RenderError {}

pub(crate) fn draw_err<E: fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}
