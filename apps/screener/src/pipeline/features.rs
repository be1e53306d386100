use serde::Serialize;

/// Fixed-dimension sparse vector. Entries are sorted by column, unique, and non-zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Builds a vector from `(column, value)` pairs in any order.
    /// Zero values are dropped; duplicate or out-of-range columns are rejected.
    pub fn from_pairs(dimension: usize, mut pairs: Vec<(usize, f64)>) -> Result<Self, String> {
        pairs.sort_by_key(|&(column, _)| column);
        for window in pairs.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(format!("duplicate column {}", window[0].0));
            }
        }
        if let Some(&(column, _)) = pairs.last() {
            if column >= dimension {
                return Err(format!("column {column} out of range for dimension {dimension}"));
            }
        }
        if let Some(&(column, value)) = pairs.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("non-finite value {value} at column {column}"));
        }
        pairs.retain(|&(_, value)| value != 0.0);
        Ok(Self {
            dimension,
            entries: pairs,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `column`, zero when absent.
    #[cfg(test)]
    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |&(c, _)| c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Dot product with a dense row of the same dimension.
    pub fn dot_dense(&self, row: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|&(column, value)| value * row.get(column).copied().unwrap_or(0.0))
            .sum()
    }

    /// Squared Euclidean distance, merging both sorted entry lists.
    pub fn squared_distance(&self, other: &FeatureVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let (a, b) = (&self.entries, &other.entries);
        let mut total = 0.0;
        while i < a.len() && j < b.len() {
            let (ca, va) = a[i];
            let (cb, vb) = b[j];
            if ca == cb {
                total += (va - vb).powi(2);
                i += 1;
                j += 1;
            } else if ca < cb {
                total += va * va;
                i += 1;
            } else {
                total += vb * vb;
                j += 1;
            }
        }
        total += a[i..].iter().map(|&(_, v)| v * v).sum::<f64>();
        total += b[j..].iter().map(|&(_, v)| v * v).sum::<f64>();
        total
    }
}
