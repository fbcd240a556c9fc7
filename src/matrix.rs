/// Dense row-major matrix with labelled rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    cells: Vec<f64>,
}

impl Matrix {
    pub fn zeros(row_labels: Vec<String>, column_labels: Vec<String>) -> Self {
        let cells = vec![0.0; row_labels.len() * column_labels.len()];
        Self {
            row_labels,
            column_labels,
            cells,
        }
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn columns(&self) -> usize {
        self.column_labels.len()
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.cells[self.offset(row, column)]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        let idx = self.offset(row, column);
        self.cells[idx] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.columns();
        &self.cells[start..start + self.columns()]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let width = self.columns();
        let start = row * width;
        &mut self.cells[start..start + width]
    }

    /// All cells, row after row.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows()).map(|r| self.row(r).iter().sum()).collect()
    }

    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.columns()];
        for r in 0..self.rows() {
            for (sum, value) in sums.iter_mut().zip(self.row(r)) {
                *sum += value;
            }
        }
        sums
    }

    pub fn is_symmetric(&self) -> bool {
        self.rows() == self.columns()
            && (0..self.rows()).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Same cells under new labels; lengths must match.
    pub fn relabel(mut self, row_labels: Vec<String>, column_labels: Vec<String>) -> Option<Self> {
        if row_labels.len() != self.rows() || column_labels.len() != self.columns() {
            return None;
        }
        self.row_labels = row_labels;
        self.column_labels = column_labels;
        Some(self)
    }

    fn offset(&self, row: usize, column: usize) -> usize {
        assert!(
            row < self.rows() && column < self.columns(),
            "cell ({row}, {column}) outside {}x{} matrix",
            self.rows(),
            self.columns()
        );
        row * self.columns() + column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cells_are_row_major() {
        let mut m = Matrix::zeros(labels(&["a", "b"]), labels(&["x", "y", "z"]));
        m.set(0, 2, 1.0);
        m.set(1, 0, 2.5);
        assert_eq!(m.cells(), &[0.0, 0.0, 1.0, 2.5, 0.0, 0.0]);
        assert_eq!(m.row(1), &[2.5, 0.0, 0.0]);
        assert_eq!(m.row_sums(), vec![1.0, 2.5]);
        assert_eq!(m.column_sums(), vec![2.5, 0.0, 1.0]);
    }

    #[test]
    fn symmetry_requires_square_shape() {
        let m = Matrix::zeros(labels(&["a"]), labels(&["x", "y"]));
        assert!(!m.is_symmetric());

        let mut sq = Matrix::zeros(labels(&["a", "b"]), labels(&["a", "b"]));
        sq.set(0, 1, 3.0);
        assert!(!sq.is_symmetric());
        sq.set(1, 0, 3.0);
        assert!(sq.is_symmetric());
    }

    #[test]
    fn relabel_checks_lengths() {
        let m = Matrix::zeros(labels(&["0", "1"]), labels(&["0", "1"]));
        assert!(m.clone().relabel(labels(&["a"]), labels(&["a", "b"])).is_none());
        let named = m.relabel(labels(&["a", "b"]), labels(&["a", "b"])).unwrap();
        assert_eq!(named.row_labels(), labels(&["a", "b"]).as_slice());
    }

    #[test]
    #[should_panic]
    fn out_of_range_cell_panics() {
        let m = Matrix::zeros(labels(&["a"]), labels(&["x"]));
        m.get(1, 0);
    }
}
