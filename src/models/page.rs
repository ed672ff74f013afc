use serde::Serialize;

use super::library::LibraryEntry;
use super::media::{CatalogItem, Genre};
use crate::domain::{OrderField, WatchStatus};
use crate::filters::PageWindow;

/// One page of a list plus the numbers needed to render a pager.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, window: &PageWindow) -> Self {
        Self {
            items,
            page: window.page,
            per_page: window.per_page,
            total_items: window.total_items,
            total_pages: window.total_pages,
        }
    }
}

/// Filter values that were actually applied to a list.
///
/// Stages whose input was rejected are reported as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveFilters {
    pub title: Option<String>,
    pub genres: Vec<i32>,
    pub order: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_only: Option<WatchStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl From<OrderField> for OrderOption {
    fn from(field: OrderField) -> Self {
        Self {
            value: field.as_param(),
            label: field.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    #[serde(flatten)]
    pub page: Page<CatalogItem>,
    pub filters: ActiveFilters,
    pub order_options: Vec<OrderOption>,
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryPage {
    #[serde(flatten)]
    pub page: Page<LibraryEntry>,
    pub filters: ActiveFilters,
    pub statuses: Vec<WatchStatus>,
}
