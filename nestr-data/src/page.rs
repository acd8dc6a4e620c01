use serde::Serialize;

/// Pagination parameters.
///
/// `limit: None` means "no limit" (write requests resolve their full target
/// set); read requests get a default limit from the request layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pageable {
    pub page: u64,
    pub limit: Option<u64>,
}

impl Pageable {
    pub fn new(limit: Option<u64>, page: u64) -> Self {
        Self { page, limit }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Number of entries skipped. Saturates, so a page far past the end is
    /// simply empty.
    pub fn offset(&self) -> u64 {
        self.limit.map_or(0, |limit| self.page.saturating_mul(limit))
    }
}

/// A page of results with the total number of matches before pagination.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        Self {
            content,
            page: pageable.page,
            size: pageable.limit,
            total_elements,
        }
    }

    /// The result of a query that was never issued.
    pub fn empty(pageable: &Pageable) -> Self {
        Self::new(Vec::new(), pageable, 0)
    }

    pub fn total_pages(&self) -> u64 {
        match self.size {
            Some(0) => 0,
            Some(size) => self.total_elements.div_ceil(size),
            None => u64::from(self.total_elements > 0),
        }
    }
}
