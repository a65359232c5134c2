use serde::Serialize;

/// Zero-based page indices of one source document, split by index parity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageBuckets {
    /// Indices where `i % 2 == 1`
    pub odd: Vec<usize>,
    /// Indices where `i % 2 == 0`
    pub even: Vec<usize>,
    /// Whether the caller must append one blank page before copying
    pub needs_padding: bool,
}

impl PageBuckets {
    /// Number of pages the source has once padding is applied
    pub fn effective_count(&self) -> usize {
        self.odd.len() + self.even.len()
    }
}

/// Split `page_count` pages into parity buckets.
///
/// Parity is that of the zero-based index, not the printed page number: the
/// first page (index 0) goes to `even`. An odd page count is padded by one
/// so both buckets end up the same length; the padding index is `page_count`
/// itself and therefore always lands in `odd`.
pub fn classify(page_count: usize) -> PageBuckets {
    let needs_padding = page_count % 2 == 1;
    let effective = if needs_padding {
        page_count + 1
    } else {
        page_count
    };

    let mut buckets = PageBuckets {
        odd: Vec::with_capacity(effective / 2),
        even: Vec::with_capacity(effective / 2),
        needs_padding,
    };

    for i in 0..effective {
        if i % 2 == 1 {
            buckets.odd.push(i);
        } else {
            buckets.even.push(i);
        }
    }

    buckets
}
