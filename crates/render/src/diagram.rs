// Charge diagrams
// Backgrounds are decoded once; every diagram draws onto a fresh copy.

use std::path::{Path, PathBuf};

use image::RgbImage;
use plotters::prelude::*;
use ringscan_config::settings::{DiagramSettings, DiagramStyle};
use ringscan_recon::{ChargeRow, ChargeTable, Descriptor};

use crate::error::{draw_err, RenderError};
use crate::fonts;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Top-left of each two-line label on the boxes background.
pub const BOX_LABELS: [(Descriptor, (i32, i32)); 9] = [
    (Descriptor::C1, (120, 60)),
    (Descriptor::C2, (60, 96)),
    (Descriptor::C3, (60, 167)),
    (Descriptor::C4, (120, 188)),
    (Descriptor::C5, (180, 167)),
    (Descriptor::C6, (180, 96)),
    (Descriptor::CNr, (220, 55)),
    (Descriptor::N, (310, 133)),
    (Descriptor::O, (270, 225)),
];

/// Atom centres on the cropped scheme background.
pub const SCHEME_ATOMS: [(Descriptor, (i32, i32)); 9] = [
    (Descriptor::C1, (148, 83)),
    (Descriptor::C2, (98, 111)),
    (Descriptor::C3, (98, 166)),
    (Descriptor::C4, (148, 193)),
    (Descriptor::C5, (198, 166)),
    (Descriptor::C6, (198, 111)),
    (Descriptor::CNr, (246, 83)),
    (Descriptor::N, (294, 109)),
    (Descriptor::O, (240, 190)),
];

const TITLE_AT: (i32, i32) = (10, 10);
const TITLE_SIZE: f64 = 25.0;
const BOX_FONT: f64 = 16.0;
const BOX_LINE: i32 = 18;
const BOX_WIDTH: i32 = 50;
const LIST_AT: (i32, i32) = (5, 60);
const LIST_STEP: i32 = 20;
const LIST_FONT: f64 = 12.0;
const MARKER_FONT: f64 = 14.0;

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Fill colour for a charge difference: red for positive, blue for negative,
/// grey at zero.
pub fn delta_color(delta: f64, scale: f64) -> (u8, u8, u8) {
    let shift = (delta * scale).round();
    let channel = |v: f64| v.clamp(0.0, 255.0) as u8;
    (channel(150.0 + shift), 150, channel(150.0 - shift))
}

/// Circle radius in pixels, never below one.
pub fn atom_radius(delta: f64, base: f64, scale: f64) -> u32 {
    (base + delta * scale).round().max(1.0) as u32
}

/// Outline of a value box; silver for oxygen, black elsewhere.
pub fn box_outline(descriptor: Descriptor) -> RGBColor {
    match descriptor {
        Descriptor::O => RGBColor(192, 192, 192),
        _ => BLACK,
    }
}

pub fn format_delta(delta: f64) -> String {
    format!("{delta:.3}")
}

pub fn boxes_path(dir: &Path, row: &ChargeRow) -> PathBuf {
    dir.join(format!("{}charges.png", row.substituent.file_stem()))
}

pub fn scheme_path(dir: &Path, row: &ChargeRow) -> PathBuf {
    dir.join(format!("scheme{}charges.png", row.substituent.file_stem()))
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

pub struct DiagramRenderer {
    settings: DiagramSettings,
    boxes: Option<RgbImage>,
    scheme: Option<RgbImage>,
}

impl DiagramRenderer {
    /// Decode the backgrounds the configured styles need.
    pub fn new(settings: &DiagramSettings) -> Result<Self, RenderError> {
        let wants = |style| settings.styles.contains(&style);

        let boxes = if wants(DiagramStyle::Boxes) {
            Some(load_background(&settings.boxes_background)?)
        } else {
            None
        };
        let scheme = if wants(DiagramStyle::Scheme) {
            let [w, h] = settings.scheme_crop;
            let full = image::open(&settings.scheme_background)
                .map_err(|e| image_err(&settings.scheme_background, e))?;
            Some(full.crop_imm(0, 0, w, h).to_rgb8())
        } else {
            None
        };

        Ok(Self { settings: settings.clone(), boxes, scheme })
    }

    /// Draw every configured style for every row of `table`, baseline
    /// included. Returns the written files in drawing order.
    pub fn render_all(&self, table: &ChargeTable, dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        let mut written = Vec::new();
        for row in table.rows() {
            let deltas: Vec<(Descriptor, f64)> = table.deltas(row).iter().collect();
            if self.boxes.is_some() {
                let path = boxes_path(dir, row);
                self.render_boxes(row, &deltas, &path)?;
                written.push(path);
            }
            if self.scheme.is_some() {
                let path = scheme_path(dir, row);
                self.render_scheme(row, &deltas, &path)?;
                written.push(path);
            }
        }
        log::info!("{} charge diagrams in {}", written.len(), dir.display());
        Ok(written)
    }

    fn render_boxes(
        &self,
        row: &ChargeRow,
        deltas: &[(Descriptor, f64)],
        path: &Path,
    ) -> Result<(), RenderError> {
        let Some(background) = &self.boxes else {
            return Ok(());
        };
        let scale = self.settings.color_scale;
        draw_on(background, path, |root| {
            draw_title(root, row.substituent.id())?;
            let text = fonts::text(BOX_FONT).color(&BLACK);
            for &(descriptor, (x, y)) in &BOX_LABELS {
                let delta = lookup(deltas, descriptor);
                let (r, g, b) = delta_color(delta, scale);
                let corners = [(x - 4, y - 2), (x + BOX_WIDTH, y + 2 * BOX_LINE + 4)];
                root.draw(&Rectangle::new(corners, RGBColor(r, g, b).filled()))
                    .map_err(draw_err)?;
                root.draw(&Rectangle::new(corners, box_outline(descriptor).stroke_width(1)))
                    .map_err(draw_err)?;
                root.draw(&Text::new(format!("{}:", descriptor.label()), (x, y), text.clone()))
                    .map_err(draw_err)?;
                root.draw(&Text::new(format_delta(delta), (x, y + BOX_LINE), text.clone()))
                    .map_err(draw_err)?;
            }
            Ok(())
        })
    }

    fn render_scheme(
        &self,
        row: &ChargeRow,
        deltas: &[(Descriptor, f64)],
        path: &Path,
    ) -> Result<(), RenderError> {
        let Some(background) = &self.scheme else {
            return Ok(());
        };
        let s = &self.settings;
        draw_on(background, path, |root| {
            draw_title(root, &row.substituent.title())?;

            let list = fonts::text(LIST_FONT).color(&BLACK);
            for (k, &(descriptor, delta)) in deltas.iter().enumerate() {
                let at = (LIST_AT.0, LIST_AT.1 + LIST_STEP * k as i32);
                let line = format!("{}: {}", descriptor.label(), format_delta(delta));
                root.draw(&Text::new(line, at, list.clone())).map_err(draw_err)?;
            }

            let marker = fonts::text(MARKER_FONT).color(&BLACK);
            for &(descriptor, (cx, cy)) in &SCHEME_ATOMS {
                let delta = lookup(deltas, descriptor);
                let (r, g, b) = delta_color(delta, s.color_scale);
                let radius = atom_radius(delta, s.radius_base, s.radius_scale);
                root.draw(&Circle::new((cx, cy), radius, RGBColor(r, g, b).filled()))
                    .map_err(draw_err)?;
                root.draw(&Text::new(descriptor.marker(), (cx - 5, cy - 7), marker.clone()))
                    .map_err(draw_err)?;
            }
            Ok(())
        })
    }
}

fn lookup(deltas: &[(Descriptor, f64)], descriptor: Descriptor) -> f64 {
    deltas
        .iter()
        .find(|(d, _)| *d == descriptor)
        .map(|&(_, v)| v)
        .unwrap_or(0.0)
}

fn draw_title<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    title: &str,
) -> Result<(), RenderError>
where
    DB::ErrorType: 'static,
{
    let style = fonts::title(TITLE_SIZE).color(&BLACK);
    root.draw(&Text::new(title, TITLE_AT, style)).map_err(draw_err)
}

/// Copy `background`, run `paint` over it and save the result to `path`.
fn draw_on<F>(background: &RgbImage, path: &Path, paint: F) -> Result<(), RenderError>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>) -> Result<(), RenderError>,
{
    let (w, h) = background.dimensions();
    let mut buf = background.as_raw().clone();
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        paint(&root)?;
        root.present().map_err(draw_err)?;
    }
    let canvas = RgbImage::from_raw(w, h, buf).ok_or_else(|| RenderError::Image {
        path: path.to_path_buf(),
        message: "canvas size mismatch".into(),
    })?;
    canvas.save(path).map_err(|e| image_err(path, e))?;
    log::debug!("{}", path.display());
    Ok(())
}

fn load_background(path: &Path) -> Result<RgbImage, RenderError> {
    Ok(image::open(path).map_err(|e| image_err(path, e))?.to_rgb8())
}

fn image_err(path: &Path, e: image::ImageError) -> RenderError {
    RenderError::Image { path: path.to_path_buf(), message: e.to_string() }
}
