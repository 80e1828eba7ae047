//! Null bitmap for tracking missing cells in a column.
//!
//! One bit per row: 1 = NULL, 0 = present. Packed into u32 words so a
//! column's null metadata stays small even for wide files. The bitmap
//! grows append-only alongside its column during CSV loading.

/// A growable bitmap tracking NULL values, one bit per row.
#[derive(Debug, Clone, Default)]
pub struct NullBitmap {
    /// Packed bits: bit `i % 32` of word `i / 32` = null flag for row `i`.
    words: Vec<u32>,
    /// Total number of rows this bitmap covers.
    row_count: usize,
}

impl NullBitmap {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bitmap covering `row_count` rows, all marked present.
    pub fn with_rows(row_count: usize) -> Self {
        Self {
            words: vec![0u32; row_count.div_ceil(32)],
            row_count,
        }
    }

    /// Append one row with the given null flag.
    pub fn push(&mut self, is_null: bool) {
        let row = self.row_count;
        if row / 32 == self.words.len() {
            self.words.push(0);
        }
        if is_null {
            self.words[row / 32] |= 1u32 << (row % 32);
        }
        self.row_count += 1;
    }

    /// Check if row `row` is NULL.
    ///
    /// # Panics
    /// Panics if `row >= row_count`.
    pub fn is_null(&self, row: usize) -> bool {
        assert!(
            row < self.row_count,
            "row {} out of bounds ({})",
            row,
            self.row_count
        );
        (self.words[row / 32] >> (row % 32)) & 1 == 1
    }

    /// Count of NULL rows.
    pub fn null_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Total number of rows this bitmap covers.
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let bm = NullBitmap::new();
        assert_eq!(bm.row_count(), 0);
        assert_eq!(bm.null_count(), 0);
    }

    #[test]
    fn test_push_and_check() {
        let mut bm = NullBitmap::new();
        for i in 0..70 {
            bm.push(i % 10 == 0);
        }
        assert_eq!(bm.row_count(), 70);
        assert!(bm.is_null(0));
        assert!(bm.is_null(30));
        assert!(bm.is_null(60));
        assert!(!bm.is_null(1));
        assert!(!bm.is_null(69));
        assert_eq!(bm.null_count(), 7);
    }

    #[test]
    fn test_with_rows_all_present() {
        let bm = NullBitmap::with_rows(100);
        assert_eq!(bm.row_count(), 100);
        assert_eq!(bm.null_count(), 0);
        assert!(!bm.is_null(99));
    }

    #[test]
    fn test_word_boundary() {
        let mut bm = NullBitmap::new();
        for i in 0..64 {
            bm.push(i == 31 || i == 32 || i == 63);
        }
        assert!(bm.is_null(31));
        assert!(bm.is_null(32));
        assert!(bm.is_null(63));
        assert_eq!(bm.null_count(), 3);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_is_null_out_of_bounds() {
        let bm = NullBitmap::with_rows(10);
        bm.is_null(10);
    }
}
