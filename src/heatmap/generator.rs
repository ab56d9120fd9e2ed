//! SVG heatmap generation for latency density grids.
//!
//! Block sizes run along the x axis (one column per power of two) and
//! latency along the y axis with the origin at the bottom. Cells holding
//! zero are left unpainted so that "no data" is not drawn as "minimum
//! density".

use super::colormap::Colormap;
use crate::aggregator::Grid;
use crate::utils::config::TimeUnit;
use crate::utils::error::RenderError;
use log::info;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MARGIN_RIGHT: f64 = 30.0;
const COLORBAR_SPACE: f64 = 110.0;
const COLORBAR_STEPS: usize = 32;
const Y_TICKS: usize = 5;

/// Heatmap configuration
#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    pub title: Option<String>,
    pub width: usize,
    pub height: usize,
    pub colormap: Colormap,
    pub colorbar: bool,
    pub time_unit: TimeUnit,
    pub log_scale: bool,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            title: None,
            width: 900,
            height: 600,
            colormap: Colormap::Copper,
            colorbar: false,
            time_unit: TimeUnit::Micro,
            log_scale: false,
        }
    }
}

impl HeatmapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn with_colorbar(mut self, colorbar: bool) -> Self {
        self.colorbar = colorbar;
        self
    }

    pub fn with_axis(mut self, time_unit: TimeUnit, log_scale: bool) -> Self {
        self.time_unit = time_unit;
        self.log_scale = log_scale;
        self
    }

    /// Label of the latency axis
    pub fn y_label(&self) -> String {
        if self.log_scale {
            format!("log (commit latency) - {}", self.time_unit.label())
        } else {
            format!("commit latency - {}", self.time_unit.label())
        }
    }
}

/// Plot area in SVG coordinates
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Generate an SVG heatmap from a density grid
///
/// # Errors
/// * `RenderError::EmptyGrid` - No cell holds a positive value
pub fn generate_heatmap(grid: &Grid, config: &HeatmapConfig) -> Result<String, RenderError> {
    let max_z = grid.max_value();
    if !(max_z > 0.0) {
        return Err(RenderError::EmptyGrid);
    }

    info!(
        "Generating heatmap with {}x{} cells (max density {:.6})",
        grid.rows(),
        grid.cols(),
        max_z
    );

    let width = config.width as f64;
    let height = config.height as f64;
    let right = if config.colorbar {
        COLORBAR_SPACE
    } else {
        MARGIN_RIGHT
    };
    let frame = Frame {
        left: MARGIN_LEFT,
        top: MARGIN_TOP,
        width: (width - MARGIN_LEFT - right).max(1.0),
        height: (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
    };

    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        config.width, config.height, config.width, config.height
    ));
    svg.push_str(r#"<style>text { font: 12px sans-serif; }</style>"#);
    svg.push_str(r#"<rect x="0" y="0" width="100%" height="100%" fill="white"/>"#);

    if let Some(title) = &config.title {
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="24" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
            width / 2.0,
            escape(title)
        ));
    }

    render_cells(&mut svg, grid, config.colormap, max_z, &frame);
    render_axes(&mut svg, grid, config, &frame);

    if config.colorbar {
        render_colorbar(&mut svg, config.colormap, max_z, &frame);
    }

    svg.push_str("</svg>");

    info!("Heatmap generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

fn render_cells(out: &mut String, grid: &Grid, colormap: Colormap, max_z: f64, frame: &Frame) {
    let cell_w = frame.width / grid.cols() as f64;
    let cell_h = frame.height / grid.rows() as f64;

    for col in 0..grid.cols() {
        for row in 0..grid.rows() {
            let z = grid.value(row, col);
            if z == 0.0 || !z.is_finite() {
                continue;
            }

            // Row 0 sits on the x axis
            let x = frame.left + col as f64 * cell_w;
            let y = frame.bottom() - (row + 1) as f64 * cell_h;

            out.push_str(&format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>2^{} @ {:.3}: {:.6}</title></rect>"#,
                x,
                y,
                cell_w,
                cell_h,
                colormap.fill(z / max_z),
                grid.column_exponent(col),
                grid.row_lower(row),
                z
            ));
        }
    }
}

fn render_axes(out: &mut String, grid: &Grid, config: &HeatmapConfig, frame: &Frame) {
    out.push_str(&format!(
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="black"/>"#,
        frame.left, frame.top, frame.width, frame.height
    ));

    // One x tick per block-size exponent, centred on its column
    let cell_w = frame.width / grid.cols() as f64;
    for col in 0..grid.cols() {
        let x = frame.left + (col as f64 + 0.5) * cell_w;
        out.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="black"/>"#,
            x,
            frame.bottom(),
            x,
            frame.bottom() + 5.0
        ));
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            x,
            frame.bottom() + 18.0,
            grid.column_exponent(col)
        ));
    }
    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">block size - 2^n</text>"#,
        frame.left + frame.width / 2.0,
        frame.bottom() + 42.0
    ));

    let y_max = grid.rows() as f64 * grid.bin_height();
    for i in 0..=Y_TICKS {
        let value = y_max * i as f64 / Y_TICKS as f64;
        let y = frame.bottom() - frame.height * i as f64 / Y_TICKS as f64;
        out.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="black"/>"#,
            frame.left - 5.0,
            y,
            frame.left,
            y
        ));
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" dy="4">{}</text>"#,
            frame.left - 8.0,
            y,
            format_tick(value)
        ));
    }

    let label_x = 20.0;
    let label_y = frame.top + frame.height / 2.0;
    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" transform="rotate(-90 {:.2} {:.2})">{}</text>"#,
        label_x,
        label_y,
        label_x,
        label_y,
        escape(&config.y_label())
    ));
}

fn render_colorbar(out: &mut String, colormap: Colormap, max_z: f64, frame: &Frame) {
    let bar_x = frame.left + frame.width + 20.0;
    let bar_w = 16.0;
    let step_h = frame.height / COLORBAR_STEPS as f64;

    for step in 0..COLORBAR_STEPS {
        let t = (step as f64 + 0.5) / COLORBAR_STEPS as f64;
        let y = frame.bottom() - (step + 1) as f64 * step_h;
        out.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            bar_x,
            y,
            bar_w,
            step_h,
            colormap.fill(t)
        ));
    }

    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" dy="4">0</text>"#,
        bar_x + bar_w + 4.0,
        frame.bottom()
    ));
    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" dy="4">{}</text>"#,
        bar_x + bar_w + 4.0,
        frame.top,
        format_tick(max_z)
    ));

    let label_x = bar_x + bar_w + 60.0;
    let label_y = frame.top + frame.height / 2.0;
    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" transform="rotate(-90 {:.2} {:.2})">relative frequency per blocksize</text>"#,
        label_x, label_y, label_x, label_y
    ));
}

/// Compact tick label: fixed point for ordinary magnitudes, scientific otherwise
fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 {
        "0".to_string()
    } else if (0.01..10_000.0).contains(&magnitude) {
        format!("{:.2}", value)
    } else {
        format!("{:.2e}", value)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
