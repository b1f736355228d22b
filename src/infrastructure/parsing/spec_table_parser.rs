//! Technical specification table extraction
//!
//! Candidate tables are probed in configured order; the first one that has
//! any row wins. Within it, a cell carrying the header marker attribute opens
//! a category and the remaining cells of the row form one value. A `rowspan`
//! of N on the header lets the next N-1 header-less rows contribute values.
//! Without `rowspan` the category stays open until the next header.
//! Rows of a table nested inside another collected row are read once, as
//! part of the enclosing cell's text.
//!
//! When no candidate has rows, any table with more than two rows where every
//! row has at least two cells is read as column 0 / column 1 pairs.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::config::SpecTableSelectors;
use super::{ParsingError, ParsingResult, compile_selector};
use crate::domain::SpecTable;

pub struct SpecTableParser {
    candidates: Vec<(String, Selector)>,
    any_table: Selector,
    row: Selector,
    any_cell: Selector,
    header_attribute: String,
    header_attribute_value: String,
}

/// Which category, if any, header-less rows attach to
#[derive(Debug, Default)]
struct OpenCategory {
    name: Option<String>,
    /// Rows still covered by the header's rowspan; `None` when it had none
    span_left: Option<usize>,
}

impl OpenCategory {
    fn open(&mut self, name: String, rowspan: Option<usize>) {
        self.name = (!name.is_empty()).then_some(name);
        self.span_left = rowspan.map(|span| span.saturating_sub(1));
    }

    fn advance(&mut self) {
        match self.span_left {
            Some(0) => self.name = None,
            Some(left) => self.span_left = Some(left - 1),
            None => {}
        }
    }
}

impl SpecTableParser {
    pub fn new(config: &SpecTableSelectors) -> ParsingResult<Self> {
        let mut candidates = Vec::with_capacity(config.candidate_tables.len());
        for candidate in &config.candidate_tables {
            match Selector::parse(candidate) {
                Ok(selector) => candidates.push((candidate.clone(), selector)),
                Err(e) => warn!("Skipping spec table selector '{}': {}", candidate, e),
            }
        }
        if candidates.is_empty() && !config.candidate_tables.is_empty() {
            return Err(ParsingError::no_usable_selector("spec_table", &config.candidate_tables));
        }

        Ok(Self {
            candidates,
            any_table: compile_selector("table")?,
            row: compile_selector("tr")?,
            any_cell: compile_selector("td, th")?,
            header_attribute: config.header_attribute.clone(),
            header_attribute_value: config.header_attribute_value.clone(),
        })
    }

    pub fn parse(&self, html: &Html) -> SpecTable {
        self.candidates
            .iter()
            .find_map(|(name, selector)| self.marked_table(html, name, selector))
            .or_else(|| self.generic_pairs(html))
            .unwrap_or_default()
    }

    fn marked_table(&self, html: &Html, name: &str, selector: &Selector) -> Option<SpecTable> {
        let rows = self.candidate_rows(html, selector);
        if rows.is_empty() {
            return None;
        }
        debug!("Spec table matched '{}' with {} rows", name, rows.len());

        let mut specs = SpecTable::new();
        let mut open = OpenCategory::default();

        for row in rows {
            let cells = row_cells(row);
            let header = cells.iter().find(|cell| self.is_header(cell));

            match header {
                Some(header) => {
                    let rowspan = header
                        .value()
                        .attr("rowspan")
                        .and_then(|span| span.trim().parse::<usize>().ok())
                        .filter(|span| *span > 0);
                    open.open(cell_text(header), rowspan);
                    if let Some(category) = &open.name {
                        specs.touch(category);
                    }
                }
                None => open.advance(),
            }

            let value = cells
                .iter()
                .filter(|cell| !self.is_header(cell))
                .map(cell_text)
                .collect::<Vec<_>>()
                .join(" ");
            let value = value.trim();

            if let Some(category) = open.name.as_deref().filter(|_| !value.is_empty()) {
                specs.push(category, value);
            }
        }

        Some(specs)
    }

    /// Rows under every table matching `selector`, once each, in document order
    fn candidate_rows<'a>(&self, html: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
        let mut seen = HashSet::new();
        let rows: Vec<ElementRef<'a>> = html
            .select(selector)
            .flat_map(|table| table.select(&self.row))
            .filter(|row| seen.insert(row.id()))
            .collect();

        rows.into_iter()
            .filter(|row| !row.ancestors().any(|ancestor| seen.contains(&ancestor.id())))
            .collect()
    }

    fn generic_pairs(&self, html: &Html) -> Option<SpecTable> {
        let mut specs = SpecTable::new();

        for table in html.select(&self.any_table) {
            let rows: Vec<Vec<ElementRef<'_>>> = table
                .select(&self.row)
                .map(|row| row.select(&self.any_cell).collect())
                .collect();
            if rows.len() <= 2 || rows.iter().any(|cells| cells.len() < 2) {
                continue;
            }

            for cells in &rows {
                let key = cell_text(&cells[0]);
                if key.is_empty() {
                    continue;
                }
                let value = cell_text(&cells[1]);
                if value.is_empty() {
                    specs.touch(&key);
                } else {
                    specs.push(&key, value);
                }
            }
        }

        if specs.is_empty() {
            None
        } else {
            debug!("Spec table read from generic two-column tables ({} categories)", specs.len());
            Some(specs)
        }
    }

    fn is_header(&self, cell: &ElementRef<'_>) -> bool {
        cell.value().attr(&self.header_attribute) == Some(self.header_attribute_value.as_str())
    }
}

/// Direct `td`/`th` children of a row
fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .collect()
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
