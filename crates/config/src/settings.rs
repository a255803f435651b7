// Run settings
// Loaded from ringscan.toml; every section falls back to the built-in layout.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ringscan_io::ChargeDirPolicy;
use ringscan_recon::LibrarySchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::Palette;

/// Figures are laid out on a 2 × 3 grid.
pub const MAX_PANELS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: InputSettings,
    pub schema: LibrarySchema,
    pub derived: Vec<DerivedSpec>,
    pub reports: Vec<ReportSpec>,
    pub figures: Vec<FigureSpec>,
    pub diagrams: DiagramSettings,
    pub fonts: FontSettings,
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: InputSettings::default(),
            schema: LibrarySchema::default(),
            derived: vec![DerivedSpec {
                key: "energy_gap".into(),
                name: "Activation energy - second minimum".into(),
                minuend: "activation_energy".into(),
                subtrahend: "second_minimum".into(),
            }],
            reports: default_reports(),
            figures: default_figures(),
            diagrams: DiagramSettings::default(),
            fonts: FontSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub path: PathBuf,
    /// Field delimiter; sniffed from the file when absent.
    pub delimiter: Option<char>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self { path: PathBuf::from("ScanLibrary.csv"), delimiter: None }
    }
}

/// A quantity computed cell by cell as `minuend − subtrahend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSpec {
    pub key: String,
    pub name: String,
    pub minuend: String,
    pub subtrahend: String,
}

/// One summary CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSpec {
    pub quantity: String,
    pub file: PathBuf,
    pub mean_header: String,
}

fn default_reports() -> Vec<ReportSpec> {
    let report = |quantity: &str, file: &str, mean_header: &str| ReportSpec {
        quantity: quantity.into(),
        file: file.into(),
        mean_header: mean_header.into(),
    };
    let energy = "Mean activation energy [kcal/mol]";
    vec![
        report("activation_energy", "Statistical_Activation.csv", energy),
        report("second_minimum", "Statistical_SecMin.csv", energy),
        report("n_charge", "Statistical_N_charges.csv", "Charge on N"),
        report("c5_charge", "Statistical_C5_charges.csv", "Charge on C"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    pub file: PathBuf,
    #[serde(default = "default_figure_width")]
    pub width: u32,
    #[serde(default = "default_figure_height")]
    pub height: u32,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    #[serde(default = "default_y_label")]
    pub y_label: String,
    pub panels: Vec<PanelSpec>,
}

fn default_figure_width() -> u32 {
    1700
}

fn default_figure_height() -> u32 {
    1000
}

fn default_x_label() -> String {
    "Distal ring substitution".into()
}

fn default_y_label() -> String {
    "Proximal ring substitution".into()
}

/// One heatmap on a figure grid, filled row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub quantity: String,
    pub title: String,
    pub palette: Palette,
    #[serde(default)]
    pub vmin: Option<f64>,
    #[serde(default)]
    pub vmax: Option<f64>,
    #[serde(default)]
    pub show_x_label: bool,
    #[serde(default)]
    pub show_y_label: bool,
}

fn default_figures() -> Vec<FigureSpec> {
    let energy = |quantity: &str, title: &str, palette, lo, hi| PanelSpec {
        quantity: quantity.into(),
        title: title.into(),
        palette,
        vmin: Some(lo),
        vmax: Some(hi),
        show_x_label: false,
        show_y_label: false,
    };
    let free = |quantity: &str, title: &str, palette| PanelSpec {
        quantity: quantity.into(),
        title: title.into(),
        palette,
        vmin: None,
        vmax: None,
        show_x_label: false,
        show_y_label: false,
    };
    let figure = |file: &str, panels: [PanelSpec; MAX_PANELS]| {
        // Left column carries the y label, bottom-middle the x label.
        let mut panels = panels.to_vec();
        panels[0].show_y_label = true;
        panels[3].show_y_label = true;
        panels[4].show_x_label = true;
        FigureSpec {
            file: file.into(),
            width: default_figure_width(),
            height: default_figure_height(),
            x_label: default_x_label(),
            y_label: default_y_label(),
            panels,
        }
    };

    let act = || energy("activation_energy", "Activation energy [kcal/mol]", Palette::Reds, 5.0, 10.0);
    let sec = || energy("second_minimum", "Second minimum [kcal/mol]", Palette::Blues, 3.0, 8.0);
    let oh = || free("oh_length", "Starting O-H length [Å]", Palette::Greens);

    vec![
        figure(
            "figure1.png",
            [
                act(),
                sec(),
                free("energy_gap", "Δ(Act. E, 2nd Min.) [kcal/mol]", Palette::Greens),
                free("o_charge", "Oxygen charge", Palette::Greys),
                free("n_charge", "Bridge nitrogen charge", Palette::Gray),
                oh(),
            ],
        ),
        figure(
            "figure2.png",
            [
                act(),
                sec(),
                oh(),
                free("no_distance", "Starting O-N length [Å]", Palette::Greys),
                free("nc_distance", "Starting C1-N length [Å]", Palette::Greys),
                free("co_distance", "Starting O-C4 length [Å]", Palette::Greys),
            ],
        ),
        figure(
            "figure3.png",
            [
                act(),
                free("n_charge", "Bridge nitrogen charge", Palette::Blues),
                free("o_charge", "Oxygen charge", Palette::Greens),
                free("no_distance", "Starting O-N length [Å]", Palette::Reds),
                free("nc_distance", "Starting C1-N length [Å]", Palette::Blues),
                free("co_distance", "Starting O-C4 length [Å]", Palette::Greens),
            ],
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramStyle {
    /// Outlined value boxes on the full background.
    Boxes,
    /// Value list plus scaled atom circles on the cropped scheme background.
    Scheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramSettings {
    /// Styles to draw per charge row; empty disables diagrams.
    pub styles: Vec<DiagramStyle>,
    pub boxes_background: PathBuf,
    pub scheme_background: PathBuf,
    /// Scheme background is cropped to `[width, height]` from the top-left.
    pub scheme_crop: [u32; 2],
    /// Fill colour gain per unit of charge difference.
    pub color_scale: f64,
    pub radius_base: f64,
    pub radius_scale: f64,
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            styles: vec![DiagramStyle::Boxes, DiagramStyle::Scheme],
            boxes_background: PathBuf::from("charges.png"),
            scheme_background: PathBuf::from("charges3.png"),
            scheme_crop: [346, 250],
            color_scale: 4000.0,
            radius_base: 15.0,
            radius_scale: 120.0,
        }
    }
}

/// TrueType files for diagram and figure text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    pub text: PathBuf,
    pub title: PathBuf,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            text: PathBuf::from("Arial/arialbd.ttf"),
            title: PathBuf::from("Arial/ariblk.ttf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: PathBuf,
    /// Charge diagram directory, relative to `directory`.
    pub charge_dir: PathBuf,
    pub charge_dir_policy: ChargeDirPolicy,
    /// When set, every reconciled matrix is also written here as CSV.
    pub matrix_dir: Option<PathBuf>,
    pub manifest: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            charge_dir: PathBuf::from("ChargeDist"),
            charge_dir_policy: ChargeDirPolicy::default(),
            matrix_dir: None,
            manifest: PathBuf::from("run_manifest.json"),
        }
    }
}

impl OutputSettings {
    pub fn charge_dir(&self) -> PathBuf {
        self.directory.join(&self.charge_dir)
    }

    pub fn path(&self, file: &Path) -> PathBuf {
        self.directory.join(file)
    }
}

// ---------------------------------------------------------------------------
// Load + Validate
// ---------------------------------------------------------------------------

impl Settings {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read a config file. Relative paths inside it resolve against the
    /// file's own directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut settings = Self::from_toml(&input)?;
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            settings.resolve_paths(base);
        }
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.input.path);
        resolve(&mut self.diagrams.boxes_background);
        resolve(&mut self.diagrams.scheme_background);
        resolve(&mut self.fonts.text);
        resolve(&mut self.fonts.title);
        resolve(&mut self.output.directory);
        if let Some(dir) = self.output.matrix_dir.as_mut() {
            resolve(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schema
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if let Some(d) = self.input.delimiter {
            if !d.is_ascii() || d == '"' || d == '\n' {
                return Err(ConfigError::Validation(format!(
                    "input delimiter {d:?} must be a single ASCII character other than quote or newline"
                )));
            }
        }

        let mut keys: HashSet<&str> = self.schema.quantities.iter().map(|q| q.key.as_str()).collect();
        for d in &self.derived {
            for operand in [&d.minuend, &d.subtrahend] {
                if self.schema.quantity(operand).is_none() {
                    return Err(ConfigError::Validation(format!(
                        "derived '{}': unknown quantity '{operand}'",
                        d.key
                    )));
                }
            }
            if !keys.insert(d.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "derived key '{}' is already a quantity key",
                    d.key
                )));
            }
        }

        for r in &self.reports {
            if !keys.contains(r.quantity.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "report {}: unknown quantity '{}'",
                    r.file.display(),
                    r.quantity
                )));
            }
        }

        for f in &self.figures {
            if f.panels.is_empty() || f.panels.len() > MAX_PANELS {
                return Err(ConfigError::Validation(format!(
                    "figure {}: needs 1 to {MAX_PANELS} panels, got {}",
                    f.file.display(),
                    f.panels.len()
                )));
            }
            if f.width == 0 || f.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "figure {}: size must be non-zero",
                    f.file.display()
                )));
            }
            for p in &f.panels {
                if !keys.contains(p.quantity.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "figure {}: unknown quantity '{}'",
                        f.file.display(),
                        p.quantity
                    )));
                }
                if let (Some(lo), Some(hi)) = (p.vmin, p.vmax) {
                    if lo >= hi {
                        return Err(ConfigError::Validation(format!(
                            "figure {} panel '{}': vmin {lo} must be below vmax {hi}",
                            f.file.display(),
                            p.title
                        )));
                    }
                }
            }
        }

        let [w, h] = self.diagrams.scheme_crop;
        if w == 0 || h == 0 {
            return Err(ConfigError::Validation("diagrams.scheme_crop must be non-zero".into()));
        }
        if !self.diagrams.color_scale.is_finite() || !self.diagrams.radius_scale.is_finite() {
            return Err(ConfigError::Validation("diagram scales must be finite".into()));
        }

        Ok(())
    }

    /// Input delimiter as a byte, if configured.
    pub fn delimiter(&self) -> Option<u8> {
        self.input.delimiter.map(|c| c as u8)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
