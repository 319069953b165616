/// Paginator state. `page` is 1-based, like the collection's `_page`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_records: u64,
}

impl PageInfo {
    pub fn new(page: u32, page_size: u32, total_records: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            total_records,
        }
    }

    pub fn page_count(&self) -> u64 {
        self.total_records.div_ceil(u64::from(self.page_size.max(1)))
    }

    /// 0-based offset of the first row of the page.
    pub fn first(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Rows of `page` (1-based) when `items` is split into pages of `page_size`.
pub fn paginate<T>(items: &[T], page: u32, page_size: u32) -> &[T] {
    let info = PageInfo::new(page, page_size, items.len() as u64);
    let start = usize::try_from(info.first()).unwrap_or(usize::MAX).min(items.len());
    let end = start.saturating_add(info.page_size as usize).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(PageInfo::new(1, 10, 25).page_count(), 3);
        assert_eq!(PageInfo::new(1, 10, 20).page_count(), 2);
        assert_eq!(PageInfo::new(1, 10, 0).page_count(), 0);
    }

    #[test]
    fn first_row_offset_and_navigation() {
        let info = PageInfo::new(2, 10, 25);
        assert_eq!(info.first(), 10);
        assert!(info.has_next());
        assert!(info.has_previous());
        assert!(!PageInfo::new(3, 10, 25).has_next());
    }

    #[test]
    fn zero_page_and_size_are_clamped() {
        let info = PageInfo::new(0, 0, 5);
        assert_eq!((info.page, info.page_size), (1, 1));
    }

    #[test]
    fn unclamped_fields_do_not_panic() {
        let info = PageInfo {
            page: 0,
            page_size: 0,
            total_records: 5,
        };
        assert_eq!(info.first(), 0);
        assert_eq!(info.page_count(), 5);
        assert!(!info.has_previous());
    }

    #[test]
    fn paginate_slices_and_tolerates_overflow() {
        let rows: Vec<u32> = (1..=12).collect();
        assert_eq!(paginate(&rows, 1, 5), &[1u32, 2, 3, 4, 5]);
        assert_eq!(paginate(&rows, 3, 5), &[11u32, 12]);
        assert!(paginate(&rows, 4, 5).is_empty());
    }
}
