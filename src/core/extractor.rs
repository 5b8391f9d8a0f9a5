//! Menu table extraction.
//!
//! The cafeteria page renders one week as a single table inside
//! `div#dietInfoArea`: header cells carry the date labels, each body row
//! starts with a meal label followed by one menu cell per date column.
//! Weekend columns are dropped from the date axis and body cells are paired
//! with the remaining dates by position.

use crate::domain::model::{MealType, MenuDate, MenuEntry};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

const CONTAINER_SELECTOR: &str = "div#dietInfoArea";
const TABLE_SELECTOR: &str = "table";
const HEADER_CELL_SELECTOR: &str = "thead tr th";
const BODY_ROW_SELECTOR: &str = "tbody tr";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("menu container (div#dietInfoArea) not found")]
    ContainerNotFound,

    #[error("menu table not found inside the container")]
    TableNotFound,

    #[error("invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{e:?}"),
    })
}

/// Trimmed text nodes of an element joined with `separator`, blanks dropped.
fn cell_text(element: &ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Weekday date labels in column order.
fn date_axis(table: &ElementRef<'_>) -> Result<Vec<MenuDate>, ExtractError> {
    let header_sel = selector(HEADER_CELL_SELECTOR)?;

    let dates = table
        .select(&header_sel)
        .filter_map(|th| MenuDate::parse(&cell_text(&th, "")))
        .filter(|date| !date.is_weekend())
        .collect();

    Ok(dates)
}

/// Direct `th`/`td` children of a row.
fn row_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "th" | "td"))
        .collect()
}

/// Parses the weekly menu table.
///
/// `Ok(vec![])` means the table was found but held no menus; a missing
/// container or table is an error so callers can tell a layout change apart
/// from an empty week.
pub fn parse_menu_table(markup: &str) -> Result<Vec<MenuEntry>, ExtractError> {
    let document = Html::parse_document(markup);

    let container_sel = selector(CONTAINER_SELECTOR)?;
    let table_sel = selector(TABLE_SELECTOR)?;
    let row_sel = selector(BODY_ROW_SELECTOR)?;

    let container = document
        .select(&container_sel)
        .next()
        .ok_or(ExtractError::ContainerNotFound)?;
    let table = container
        .select(&table_sel)
        .next()
        .ok_or(ExtractError::TableNotFound)?;

    let dates = date_axis(&table)?;
    tracing::debug!(dates = dates.len(), "date axis derived");

    let mut entries = Vec::new();
    for row in table.select(&row_sel) {
        let cells = row_cells(&row);
        if cells.len() < 2 {
            continue;
        }

        let meal_type = MealType::from_label(&cell_text(&cells[0], ""));
        let menu_cells = &cells[1..];

        if menu_cells.len() > dates.len() {
            tracing::debug!(
                meal = %meal_type,
                dropped = menu_cells.len() - dates.len(),
                "row has more menu cells than weekday columns"
            );
        }

        // Positional pairing: cells past the last weekday column are dropped.
        for (date, cell) in dates.iter().zip(menu_cells) {
            entries.push(MenuEntry::new(
                date.clone(),
                meal_type.clone(),
                cell_text(cell, "\n"),
            ));
        }
    }

    entries.sort_by(MenuEntry::schedule_order);
    Ok(entries)
}

/// Infallible entry point for unattended runs: any failure is logged and
/// reported as an empty week.
pub fn extract(markup: &str) -> Vec<MenuEntry> {
    match parse_menu_table(markup) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("❌ Menu extraction failed: {}", e);
            Vec::new()
        }
    }
}
