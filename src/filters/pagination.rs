use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Invalid page ({0}): that page number is not an integer")]
    Invalid(String),

    #[error("Invalid page ({0}): that page contains no results")]
    OutOfRange(u64),
}

/// The `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    Number(u64),
    Last,
}

impl Default for PageSelector {
    fn default() -> Self {
        Self::Number(1)
    }
}

impl PageSelector {
    /// Absent or blank means the first page.
    pub fn parse(raw: Option<&str>) -> Result<Self, PageError> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(Self::default());
        }
        if raw == "last" {
            return Ok(Self::Last);
        }
        match raw.parse::<u64>() {
            Ok(0) => Err(PageError::OutOfRange(0)),
            Ok(n) => Ok(Self::Number(n)),
            Err(_) => Err(PageError::Invalid(raw.to_string())),
        }
    }
}

/// A concrete slice of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PageWindow {
    /// Binds a selector to a result size.
    ///
    /// An empty result still has one (empty) page, so page 1 is always valid.
    pub fn resolve(
        selector: PageSelector,
        total_items: u64,
        per_page: u64,
    ) -> Result<Self, PageError> {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page).max(1);

        let page = match selector {
            PageSelector::Last => total_pages,
            PageSelector::Number(n) if n <= total_pages => n,
            PageSelector::Number(n) => return Err(PageError::OutOfRange(n)),
        };

        Ok(Self {
            page,
            per_page,
            total_items,
            total_pages,
        })
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_last_and_blank() {
        assert_eq!(PageSelector::parse(None), Ok(PageSelector::Number(1)));
        assert_eq!(PageSelector::parse(Some("")), Ok(PageSelector::Number(1)));
        assert_eq!(PageSelector::parse(Some("3")), Ok(PageSelector::Number(3)));
        assert_eq!(PageSelector::parse(Some("last")), Ok(PageSelector::Last));
    }

    #[test]
    fn rejects_zero_negative_and_text() {
        assert_eq!(PageSelector::parse(Some("0")), Err(PageError::OutOfRange(0)));
        assert!(matches!(
            PageSelector::parse(Some("-1")),
            Err(PageError::Invalid(_))
        ));
        assert!(matches!(
            PageSelector::parse(Some("first")),
            Err(PageError::Invalid(_))
        ));
    }

    #[test]
    fn empty_result_has_one_page() {
        let window = PageWindow::resolve(PageSelector::Number(1), 0, 50).unwrap();
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.offset(), 0);
        assert!(PageWindow::resolve(PageSelector::Number(2), 0, 50).is_err());
    }

    #[test]
    fn last_page_and_offsets() {
        let window = PageWindow::resolve(PageSelector::Last, 101, 50).unwrap();
        assert_eq!(window.page, 3);
        assert_eq!(window.offset(), 100);

        let window = PageWindow::resolve(PageSelector::Number(2), 100, 50).unwrap();
        assert_eq!(window.total_pages, 2);
        assert_eq!(window.offset(), 50);

        assert_eq!(
            PageWindow::resolve(PageSelector::Number(3), 100, 50),
            Err(PageError::OutOfRange(3))
        );
    }
}
