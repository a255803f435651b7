// Heatmap figures
// One PNG per figure, panels filled row by row on a 2 x 3 grid.

use std::collections::BTreeMap;
use std::path::Path;

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use ringscan_config::settings::{FigureSpec, PanelSpec};
use ringscan_config::Palette;
use ringscan_recon::ReconciledMatrix;

use crate::error::{draw_err, RenderError};
use crate::fonts;

const GRID: (usize, usize) = (2, 3);
const COLORBAR_WIDTH: u32 = 90;

/// Draw `spec` to `path`, looking panels up in `matrices` by quantity key.
pub fn render_figure(
    path: &Path,
    spec: &FigureSpec,
    matrices: &BTreeMap<String, ReconciledMatrix>,
) -> Result<(), RenderError> {
    let panels: Vec<(&PanelSpec, &ReconciledMatrix)> = spec
        .panels
        .iter()
        .map(|p| {
            matrices.get(&p.quantity).map(|m| (p, m)).ok_or_else(|| RenderError::MissingMatrix {
                figure: path.to_path_buf(),
                quantity: p.quantity.clone(),
            })
        })
        .collect::<Result<_, _>>()?;

    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let areas = root.split_evenly(GRID);

    for ((panel, matrix), area) in panels.into_iter().zip(areas.iter()) {
        draw_panel(area, spec, panel, matrix)?;
    }

    root.present().map_err(draw_err)?;
    log::debug!("{}: {} panels", path.display(), spec.panels.len());
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    spec: &FigureSpec,
    panel: &PanelSpec,
    matrix: &ReconciledMatrix,
) -> Result<(), RenderError>
where
    DB::ErrorType: 'static,
{
    let (lo, hi) = color_range(panel, matrix);
    let n = matrix.len() as i32;
    let rows = matrix.rows();
    let columns = matrix.columns();

    let (width, _) = area.dim_in_pixel();
    let (map_area, bar_area) = area.split_horizontally(width.saturating_sub(COLORBAR_WIDTH));

    let mut chart = ChartBuilder::on(&map_area)
        .caption(&panel.title, fonts::title(20.0))
        .margin(8)
        .x_label_area_size(if panel.show_x_label { 70 } else { 50 })
        .y_label_area_size(if panel.show_y_label { 100 } else { 80 })
        .build_cartesian_2d((0..n - 1).into_segmented(), (0..n - 1).into_segmented())
        .map_err(draw_err)?;

    // First display row on top: display row i sits at y = n - 1 - i.
    let x_label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(j) => columns.get(*j as usize).map(|c| c.id().to_string()).unwrap_or_default(),
        _ => String::new(),
    };
    let y_label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(y) => rows
            .get((n - 1 - *y) as usize)
            .map(|r| r.id().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n as usize)
        .y_labels(n as usize)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .label_style(fonts::text(11.0));
    if panel.show_x_label {
        mesh.x_desc(spec.x_label.as_str());
    }
    if panel.show_y_label {
        mesh.y_desc(spec.y_label.as_str());
    }
    mesh.axis_desc_style(fonts::text(15.0));
    mesh.draw().map_err(draw_err)?;

    let mut cells = Vec::with_capacity(rows.len() * columns.len());
    for (i, row) in rows.iter().enumerate() {
        let y = n - 1 - i as i32;
        for (j, column) in columns.iter().enumerate() {
            let Some(value) = matrix.get(row, column) else {
                continue;
            };
            let (r, g, b) = cell_color(panel.palette, value, lo, hi);
            let x = j as i32;
            cells.push(Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                RGBColor(r, g, b).filled(),
            ));
        }
    }
    chart.draw_series(cells).map_err(draw_err)?;

    draw_colorbar(&bar_area, panel.palette, lo, hi)
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    palette: Palette,
    lo: f64,
    hi: f64,
) -> Result<(), RenderError>
where
    DB::ErrorType: 'static,
{
    const STEPS: usize = 64;
    let top = if hi > lo { hi } else { lo + 1.0 };

    let mut bar = ChartBuilder::on(area)
        .margin_top(40)
        .margin_bottom(60)
        .margin_right(20)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, lo..top)
        .map_err(draw_err)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_formatter(&|v: &f64| format!("{v:.2}"))
        .label_style(fonts::text(11.0))
        .draw()
        .map_err(draw_err)?;

    let step = (top - lo) / STEPS as f64;
    bar.draw_series((0..STEPS).map(|k| {
        let y0 = lo + step * k as f64;
        let (r, g, b) = cell_color(palette, y0 + step / 2.0, lo, top);
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], RGBColor(r, g, b).filled())
    }))
    .map_err(draw_err)?;

    Ok(())
}

/// Colour limits of a panel: configured `vmin`/`vmax`, else the data range.
pub fn color_range(panel: &PanelSpec, matrix: &ReconciledMatrix) -> (f64, f64) {
    let (data_lo, data_hi) = matrix.value_range();
    (panel.vmin.unwrap_or(data_lo), panel.vmax.unwrap_or(data_hi))
}

/// Palette colour of `value` within `lo..=hi`; values outside are clamped
/// to the ends, a flat range maps to the low end.
pub fn cell_color(palette: Palette, value: f64, lo: f64, hi: f64) -> (u8, u8, u8) {
    let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.0 };
    palette.sample(t).to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringscan_recon::{RowOrder, Substituent};

    fn panel(vmin: Option<f64>, vmax: Option<f64>) -> PanelSpec {
        PanelSpec {
            quantity: "activation_energy".into(),
            title: "Activation energy [kcal/mol]".into(),
            palette: Palette::Reds,
            vmin,
            vmax,
            show_x_label: false,
            show_y_label: true,
        }
    }

    fn matrix() -> ReconciledMatrix {
        ReconciledMatrix::from_dense(
            "Activation energy",
            vec![Substituent::Unsubstituted, Substituent::group("NO2_3")],
            vec![6.0, 7.0, 8.0, 11.0],
            RowOrder::Ascending,
        )
        .unwrap()
    }

    #[test]
    fn configured_range_wins() {
        assert_eq!(color_range(&panel(Some(5.0), Some(10.0)), &matrix()), (5.0, 10.0));
        assert_eq!(color_range(&panel(None, None), &matrix()), (6.0, 11.0));
        assert_eq!(color_range(&panel(None, Some(9.0)), &matrix()), (6.0, 9.0));
    }

    #[test]
    fn out_of_range_values_clamp() {
        let top = Palette::Reds.sample(1.0).to_rgb8();
        let bottom = Palette::Reds.sample(0.0).to_rgb8();
        assert_eq!(cell_color(Palette::Reds, 11.0, 5.0, 10.0), top);
        assert_eq!(cell_color(Palette::Reds, 2.0, 5.0, 10.0), bottom);
        assert_eq!(cell_color(Palette::Reds, 4.0, 4.0, 4.0), bottom);
    }

    #[test]
    fn missing_matrix_is_reported_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure1.png");
        let spec = FigureSpec {
            file: "figure1.png".into(),
            width: 400,
            height: 300,
            x_label: String::new(),
            y_label: String::new(),
            panels: vec![panel(None, None)],
        };
        let err = render_figure(&path, &spec, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, RenderError::MissingMatrix { .. }));
        assert!(!path.exists());
    }
}
