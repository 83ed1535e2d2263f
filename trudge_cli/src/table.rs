use trudge::display::{prettify_name, Column, Labels};
use trudge::{LiftMax, SetRecord};

/// Plain text grid with optional per-column wrapping.
pub struct Table {
    headers: Vec<String>,
    widths: Vec<Option<usize>>,
    right_align: Vec<bool>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[Column], labels: &Labels, short: bool) -> Self {
        Self {
            headers: labels.headers(columns, true, short),
            widths: columns.iter().map(|c| c.max_width()).collect(),
            right_align: columns.iter().map(|c| is_numeric(*c)).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let header_cells: Vec<Vec<String>> = self
            .headers
            .iter()
            .zip(&self.widths)
            .map(|(text, width)| cell_lines(text, *width))
            .collect();
        let body: Vec<Vec<Vec<String>>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.widths)
                    .map(|(text, width)| cell_lines(text, *width))
                    .collect()
            })
            .collect();

        let mut widths = vec![0usize; self.headers.len()];
        for cells in std::iter::once(&header_cells).chain(body.iter()) {
            for (idx, lines) in cells.iter().enumerate() {
                for line in lines {
                    widths[idx] = widths[idx].max(line.chars().count());
                }
            }
        }

        let mut out = String::new();
        out.push_str(&border(&widths, '-'));
        self.push_lines(&mut out, &header_cells, &widths, false);
        out.push_str(&border(&widths, '='));
        for cells in &body {
            self.push_lines(&mut out, cells, &widths, true);
            out.push_str(&border(&widths, '-'));
        }
        out
    }

    fn push_lines(&self, out: &mut String, cells: &[Vec<String>], widths: &[usize], body: bool) {
        let height = cells.iter().map(|c| c.len()).max().unwrap_or(1);
        for line_idx in 0..height {
            out.push('|');
            for (idx, lines) in cells.iter().enumerate() {
                let text = lines.get(line_idx).map(String::as_str).unwrap_or("");
                let width = widths[idx];
                if body && self.right_align[idx] {
                    out.push_str(&format!(" {:>width$} |", text, width = width));
                } else {
                    out.push_str(&format!(" {:<width$} |", text, width = width));
                }
            }
            out.push('\n');
        }
    }
}

fn border(widths: &[usize], fill: char) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.extend(std::iter::repeat(fill).take(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn is_numeric(column: Column) -> bool {
    matches!(
        column,
        Column::Reps
            | Column::Weight
            | Column::Rest
            | Column::Positive
            | Column::Hold
            | Column::Negative
            | Column::Effort
            | Column::Heart
            | Column::Orm
    )
}

fn cell_lines(text: &str, width: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();
    for line in text.split('\n') {
        match width {
            Some(width) => lines.extend(wrap(line, width)),
            None => lines.push(line.to_string()),
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn flag(value: bool) -> String {
    let token = if value { "Y" } else { "N" };
    token.to_string()
}

pub fn set_row(set: &SetRecord) -> Vec<String> {
    vec![
        set.time.format("%Y-%m-%d %H:%M").to_string(),
        prettify_name(&set.name),
        set.reps.to_string(),
        format!("{:.1}", set.weight),
        format!("{:.1}", set.rest),
        set.positive.to_string(),
        set.hold.to_string(),
        set.negative.to_string(),
        set.effort.to_string(),
        set.heart.map(|h| h.to_string()).unwrap_or_default(),
        flag(set.trainer),
        flag(set.unilateral),
        set.notes.clone(),
    ]
}

pub fn summary_row(row: &LiftMax) -> Vec<String> {
    vec![
        prettify_name(&row.name),
        row.time.format("%Y-%m-%d %H:%M").to_string(),
        format!("{:.1}", row.orm),
    ]
}
