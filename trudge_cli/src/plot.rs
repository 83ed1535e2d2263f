use std::panic;
use std::path::Path;

use anyhow::{bail, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use plotters_backend::{
    text_anchor, BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingErrorKind,
};
use trudge::display::{Column, Labels};
use trudge::orm::check_shape;
use trudge::record::{MAX_EFFORT, MIN_EFFORT};
use trudge::{session_clusters, SetRecord};

const CHART_SIZE: (u32, u32) = (1280, 760);
const BAR_HALF_WIDTH: f64 = 0.4;

/// Bar positions for one lift's history. Sessions are separated by an
/// empty slot and labelled with their date at the first set.
#[derive(Clone, Debug, PartialEq)]
pub struct OrmChart {
    pub positions: Vec<f64>,
    pub orms: Vec<f64>,
    pub weights: Vec<f64>,
    pub reps: Vec<f64>,
    pub efforts: Vec<u8>,
    pub ticks: Vec<(f64, String)>,
    pub x_max: f64,
}

impl OrmChart {
    pub fn build(sets: &[SetRecord], orms: &[f64]) -> Result<Self> {
        check_shape(sets, orms)?;
        let mut chart = OrmChart {
            positions: Vec::with_capacity(sets.len()),
            orms: orms.to_vec(),
            weights: sets.iter().map(|s| s.weight).collect(),
            reps: sets.iter().map(|s| s.reps as f64).collect(),
            efforts: sets.iter().map(|s| s.effort).collect(),
            ticks: Vec::new(),
            x_max: 1.0,
        };
        for (session, run) in session_clusters(sets).into_iter().enumerate() {
            let first = (run.start + session + 1) as f64;
            chart
                .ticks
                .push((first, sets[run.start].time.date().to_string()));
            for idx in run {
                chart.positions.push((idx + session + 1) as f64);
            }
        }
        if let Some(last) = chart.positions.last() {
            chart.x_max = last + 1.0;
        }
        Ok(chart)
    }
}

/// Write the two-panel history chart; the format follows the extension.
pub fn render_orm_history(chart: &OrmChart, desc: &str, labels: &Labels, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => {
            // The built-in font cannot rasterize; text goes through the block font.
            let hook = panic::take_hook();
            panic::set_hook(Box::new(|_| {}));
            let backend = TextGuardBackend::new(BitMapBackend::new(path, CHART_SIZE));
            let result = draw_chart(backend.into_drawing_area(), chart, desc, labels);
            panic::set_hook(hook);
            result
        }
        Some("svg") => {
            let backend = TextGuardBackend::new(SVGBackend::new(path, CHART_SIZE));
            draw_chart(backend.into_drawing_area(), chart, desc, labels)
        }
        _ => bail!("unsupported plot format: {}", path.display()),
    }
}

fn font(size: f64) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal).color(&WHITE)
}

/// Green for easy sets through dark red for maximal ones.
fn effort_color(effort: u8) -> RGBColor {
    let span = (MAX_EFFORT - MIN_EFFORT) as f64;
    let t = ((effort.clamp(MIN_EFFORT, MAX_EFFORT) - MIN_EFFORT) as f64 / span).clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(lerp(0, 139), lerp(128, 0), 0)
}

fn bars(positions: &[f64], values: &[f64], style: ShapeStyle) -> Vec<Rectangle<(f64, f64)>> {
    positions
        .iter()
        .zip(values)
        .filter(|(_, v)| v.is_finite())
        .map(|(x, v)| {
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, *v)],
                style,
            )
        })
        .collect()
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    chart: &OrmChart,
    desc: &str,
    labels: &Labels,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&BLACK)?;
    let (_, height) = root.dim_in_pixel();
    let (upper, lower) = root.split_vertically((height as i32) * 2 / 3);

    let y_top = chart
        .orms
        .iter()
        .chain(chart.weights.iter())
        .copied()
        .filter(|v| v.is_finite())
        .fold(1.0, f64::max)
        * 1.1;

    let mut top = ChartBuilder::on(&upper)
        .caption(format!("1RM History: {}", desc), font(24.0))
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 10)
        .build_cartesian_2d(0.0..chart.x_max, 0.0..y_top)?;

    top.configure_mesh()
        .disable_x_mesh()
        .bold_line_style(&WHITE.mix(0.3))
        .light_line_style(&TRANSPARENT)
        .axis_style(&WHITE.mix(0.8))
        .x_label_formatter(&|_: &f64| String::new())
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .y_desc(labels.header(Column::Weight, false, false))
        .label_style(font(16.0))
        .axis_desc_style(font(16.0))
        .draw()?;

    top.draw_series(bars(&chart.positions, &chart.orms, RED.filled()))?
        .label("1RM")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], RED.filled()));
    top.draw_series(bars(&chart.positions, &chart.weights, CYAN.filled()))?
        .label("Lift")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], CYAN.filled()));

    top.configure_series_labels()
        .background_style(&BLACK.mix(0.8))
        .border_style(&WHITE.mix(0.5))
        .label_font(font(16.0))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    let reps_max = chart.reps.iter().copied().fold(1.0, f64::max) + 1.0;
    let tick_label = |x: &f64| -> String {
        chart
            .ticks
            .iter()
            .find(|(pos, _)| (pos - x).abs() < 1e-6)
            .map(|(_, label)| label.clone())
            .unwrap_or_default()
    };

    let mut bottom = ChartBuilder::on(&lower)
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(0.0..chart.x_max, 0.0..reps_max)?;

    bottom
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(&WHITE.mix(0.3))
        .light_line_style(&TRANSPARENT)
        .axis_style(&WHITE.mix(0.8))
        .x_labels(chart.x_max.ceil() as usize + 1)
        .x_label_formatter(&tick_label)
        .y_labels(reps_max.ceil() as usize + 1)
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .y_desc(format!("{} (colored by effort)", labels.header(Column::Reps, false, false)))
        .label_style(font(14.0))
        .axis_desc_style(font(16.0))
        .draw()?;

    bottom.draw_series(
        chart
            .positions
            .iter()
            .zip(&chart.reps)
            .zip(&chart.efforts)
            .map(|((x, r), e)| {
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, *r)],
                    effort_color(*e).filled(),
                )
            }),
    )?;

    root.present()?;
    Ok(())
}

/// Forwards to `inner`. Text the font layer cannot rasterize is drawn with
/// [`BLOCK_GLYPHS`] instead.
struct TextGuardBackend<DB> {
    inner: DB,
}

impl<DB> TextGuardBackend<DB> {
    fn new(inner: DB) -> Self {
        Self { inner }
    }
}

impl<DB: DrawingBackend> DrawingBackend for TextGuardBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.draw_text(text, style, pos)
        })) {
            Ok(result) => result,
            Err(_) => self.draw_block_text(text, style, pos),
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        self.inner.estimate_text_size(text, style)
    }
}

impl<DB: DrawingBackend> TextGuardBackend<DB> {
    /// Upper-case block rendering honouring the style's anchor and rotation.
    fn draw_block_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let color = style.color();
        if color.alpha == 0.0 || text.trim().is_empty() {
            return Ok(());
        }
        let ((_, min_y), (_, max_y)) = style
            .layout_box(text)
            .map_err(|e| DrawingErrorKind::FontError(Box::new(e)))?;
        let scale = block_scale(max_y - min_y);
        let (width, height) = block_extent(text, scale);

        let anchor = style.anchor();
        let dx = match anchor.h_pos {
            text_anchor::HPos::Left => 0,
            text_anchor::HPos::Center => -width / 2,
            text_anchor::HPos::Right => -width,
        };
        let dy = match anchor.v_pos {
            text_anchor::VPos::Top => 0,
            text_anchor::VPos::Center => -height / 2,
            text_anchor::VPos::Bottom => -height,
        };

        let transform = style.transform();
        let mut pixels = Vec::new();
        for (slot, ch) in text.chars().enumerate() {
            let Some(bits) = block_glyph(ch) else {
                continue;
            };
            let left = dx + slot as i32 * BLOCK_ADVANCE * scale;
            for row in 0..BLOCK_ROWS {
                for col in 0..BLOCK_COLS {
                    if !glyph_bit(bits, row, col) {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            pixels.push((
                                left + col * scale + sx,
                                dy + row * scale + sy,
                            ));
                        }
                    }
                }
            }
        }
        for (x, y) in pixels {
            let (tx, ty) = transform.transform(x, y);
            self.inner.draw_pixel((pos.0 + tx, pos.1 + ty), color)?;
        }
        Ok(())
    }
}

const BLOCK_COLS: i32 = 3;
const BLOCK_ROWS: i32 = 5;
/// Glyph width plus one column of spacing.
const BLOCK_ADVANCE: i32 = BLOCK_COLS + 1;

/// 3x5 glyphs, one row per 3-bit group, top row in the high bits.
const BLOCK_GLYPHS: &[(char, u16)] = &[
    ('0', 0b111_101_101_101_111),
    ('1', 0b010_110_010_010_111),
    ('2', 0b111_001_111_100_111),
    ('3', 0b111_001_111_001_111),
    ('4', 0b101_101_111_001_001),
    ('5', 0b111_100_111_001_111),
    ('6', 0b111_100_111_101_111),
    ('7', 0b111_001_001_001_001),
    ('8', 0b111_101_111_101_111),
    ('9', 0b111_101_111_001_111),
    ('A', 0b010_101_111_101_101),
    ('B', 0b110_101_110_101_110),
    ('C', 0b011_100_100_100_011),
    ('D', 0b110_101_101_101_110),
    ('E', 0b111_100_110_100_111),
    ('F', 0b111_100_110_100_100),
    ('G', 0b011_100_101_101_011),
    ('H', 0b101_101_111_101_101),
    ('I', 0b111_010_010_010_111),
    ('J', 0b001_001_001_101_010),
    ('K', 0b101_101_110_101_101),
    ('L', 0b100_100_100_100_111),
    ('M', 0b101_111_111_101_101),
    ('N', 0b110_101_101_101_101),
    ('O', 0b010_101_101_101_010),
    ('P', 0b110_101_110_100_100),
    ('Q', 0b010_101_101_110_011),
    ('R', 0b110_101_110_101_101),
    ('S', 0b011_100_010_001_110),
    ('T', 0b111_010_010_010_010),
    ('U', 0b101_101_101_101_111),
    ('V', 0b101_101_101_101_010),
    ('W', 0b101_101_111_111_101),
    ('X', 0b101_101_010_101_101),
    ('Y', 0b101_101_010_010_010),
    ('Z', 0b111_001_010_100_111),
    ('-', 0b000_000_111_000_000),
    ('+', 0b000_010_111_010_000),
    ('.', 0b000_000_000_000_010),
    (',', 0b000_000_000_010_100),
    (':', 0b000_010_000_010_000),
    ('/', 0b001_001_010_100_100),
    ('_', 0b000_000_000_000_111),
    ('\'', 0b010_010_000_000_000),
    ('(', 0b010_100_100_100_010),
    (')', 0b010_001_001_001_010),
    ('[', 0b110_100_100_100_110),
    (']', 0b011_001_001_001_011),
];

fn block_glyph(ch: char) -> Option<u16> {
    let ch = ch.to_ascii_uppercase();
    BLOCK_GLYPHS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, bits)| *bits)
}

fn glyph_bit(bits: u16, row: i32, col: i32) -> bool {
    let shift = (BLOCK_ROWS - 1 - row) * BLOCK_COLS + (BLOCK_COLS - 1 - col);
    bits & (1 << shift) != 0
}

/// Pixel multiplier so glyphs roughly fill the requested text height.
fn block_scale(text_height: i32) -> i32 {
    ((text_height as f64 / (BLOCK_ROWS + 1) as f64).round() as i32).max(1)
}

fn block_extent(text: &str, scale: i32) -> (i32, i32) {
    let chars = text.chars().count() as i32;
    let width = (chars * BLOCK_ADVANCE - 1).max(0) * scale;
    (width, BLOCK_ROWS * scale)
}
