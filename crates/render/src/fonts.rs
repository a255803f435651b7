// Font registration
// plotters is built without system font lookup, so every face used for
// text is registered from a file under the "sans-serif" family.

use std::path::Path;

use plotters::style::{register_font, FontDesc, FontFamily, FontStyle};
use ringscan_config::settings::FontSettings;

use crate::error::RenderError;

const FAMILY: &str = "sans-serif";

/// Register the text face as the normal style and the title face as bold.
pub fn register_fonts(fonts: &FontSettings) -> Result<(), RenderError> {
    register(&fonts.text, FontStyle::Normal)?;
    register(&fonts.title, FontStyle::Bold)?;
    log::debug!("fonts: text {}, title {}", fonts.text.display(), fonts.title.display());
    Ok(())
}

fn register(path: &Path, style: FontStyle) -> Result<(), RenderError> {
    let bytes = std::fs::read(path).map_err(|e| RenderError::Font {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    // plotters keeps registered faces for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FAMILY, style, bytes).map_err(|_| RenderError::Font {
        path: path.to_path_buf(),
        message: "not a TrueType/OpenType font".into(),
    })
}

pub(crate) fn text(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

pub(crate) fn title(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Bold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_font_names_path() {
        let fonts = FontSettings {
            text: PathBuf::from("/nonexistent/arialbd.ttf"),
            title: PathBuf::from("/nonexistent/ariblk.ttf"),
        };
        let err = register_fonts(&fonts).unwrap_err();
        assert!(matches!(err, RenderError::Font { ref path, .. } if path.ends_with("arialbd.ttf")));
    }

    #[test]
    fn garbage_is_not_a_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = register(&path, FontStyle::Normal).unwrap_err();
        assert!(err.to_string().contains("not a TrueType"));
    }
}
