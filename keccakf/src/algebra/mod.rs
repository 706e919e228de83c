//! Provides the few operations on matrices over GF(2) needed by the Keccak-f linear layer.
//!
//! Typical use cases:
//!
//! * Build the matrix of a linear map from the images of the unit vectors.
//! * Invert such a matrix (used for the inverse of theta on the column parity plane).
//! * Multiply a matrix with a vector, or two matrices with each other.
//!
//! NOTE: These functions are not optimized! The matrices handled here are at most 320x320
//! (the parity plane of Keccak-f[1600]) and are built once per permutation instance.

use std::fmt;
use std::slice::Iter;

use vob::{vob, Vob};

/// We define a Matrix as a `Vec` of Vector of bits (`Vob`), where each row be will a `Vob`.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: Vec<Vob>,
}

impl Matrix {
    /// Create an all-zero matrix of size (rows,columns) specified.
    pub fn new(rows: usize, columns: usize) -> Matrix {
        let mut m = Matrix {
            rows: Default::default(),
        };
        for _ in 0..rows {
            m.rows.push(Vob::from_elem(columns, false));
        }
        m
    }

    /// Create a Matrix from a `Vec` of `Vob`.
    ///
    /// Will panic if any of the `Vob`s in `rows` are of different lengths.
    pub fn from_rows(rows: Vec<Vob>) -> Matrix {
        let row_size = match rows.get(0) {
            Some(row) => row.len(),
            None => return Matrix::new(0, 0),
        };
        for v in rows.iter().skip(1) {
            if v.len() != row_size {
                panic!("Trying to create a matrix with rows of different size")
            }
        }
        Matrix { rows }
    }

    /// Create the matrix of the linear map whose image of the `j`th unit vector is `columns[j]`.
    pub fn from_columns(columns: Vec<Vob>) -> Matrix {
        transpose(&Matrix::from_rows(columns))
    }

    /// Return an iterator over the rows of the Matrix
    #[inline]
    pub fn iter_rows(&self) -> Iter<Vob> {
        self.rows.iter()
    }

    /// Return the number of rows of the matrix
    #[inline]
    pub fn row_size(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of columns of the matrix
    #[inline]
    pub fn column_size(&self) -> usize {
        match self.rows.get(0) {
            Some(x) => x.len(),
            None => 0,
        }
    }

    #[cfg(test)]
    pub fn get_row(&self, depth: usize) -> Option<&Vob<usize>> {
        self.rows.get(depth)
    }

    /// Perform an Self * Right = Matrix op.
    /// The matrices must be of compatible sizes, as per normal linear algebra rules.
    #[cfg(test)]
    pub fn left_mul(&self, right: &Matrix) -> Matrix {
        assert_eq!(self.column_size(), right.row_size());
        let right_transposed = transpose(right);
        let mut out: Vec<Vob> = vec![vob![right_transposed.row_size(); false]; self.row_size()];

        for (i, row_a) in self.iter_rows().enumerate() {
            for (j, col_r) in right_transposed.iter_rows().enumerate() {
                out[i].set(j, inner_product(row_a, col_r));
            }
        }

        Matrix::from_rows(out)
    }

    /// Perform Self * vector, where `vector` is seen as a column vector.
    pub fn mul_vob(&self, vector: &Vob) -> Vob {
        assert_eq!(self.column_size(), vector.len());
        let mut out = Vob::from_elem(self.row_size(), false);
        for (i, row) in self.iter_rows().enumerate() {
            out.set(i, inner_product(row, vector));
        }
        out
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Matrix :")?;
        for vob in self.rows.iter() {
            write!(f, "[")?;
            for bit in vob.iter() {
                write!(f, "{}", if bit { 1 } else { 0 })?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

/// Parity of the bitwise AND of two vectors of equal length.
#[inline]
pub fn inner_product(left: &Vob, right: &Vob) -> bool {
    let mut left = left.clone();
    left.and(right);
    left.iter_set_bits(..).count() % 2 != 0
}

/// Create an identity matrix (a matrix where only the [a,a] elements are set)
pub fn identity(size: usize) -> Matrix {
    let mut m = Matrix::new(size, size);
    for i in 0..size {
        m.rows[i].set(i, true);
    }
    m
}

/// Return the transpose of a matrix
pub fn transpose(matrix: &Matrix) -> Matrix {
    let mut trans = Matrix::new(matrix.column_size(), matrix.row_size());
    for (i, row) in matrix.rows.iter().enumerate() {
        for j in row.iter_set_bits(..) {
            trans.rows[j].set(i, true);
        }
    }
    trans
}

/// Return the inverse of a square matrix, or None if the matrix is singular (or not square).
///
/// Gauss-Jordan elimination: the matrix is augmented with the identity matrix, and every row
/// operation done while reducing the matrix is repeated on the identity.
pub fn invert(matrix: &Matrix) -> Option<Matrix> {
    let size = matrix.row_size();
    if size != matrix.column_size() {
        return None;
    }
    let mut mat = matrix.clone();
    let mut id = identity(size);

    for column in 0..size {
        let pivot = (column..size).find(|&row| mat.rows[row][column])?;
        if pivot != column {
            mat.rows.swap(column, pivot);
            id.rows.swap(column, pivot);
        }
        for row in 0..size {
            if row != column && mat.rows[row][column] {
                let to_add = mat.rows[column].clone();
                mat.rows[row].xor(&to_add);
                let to_add = id.rows[column].clone();
                id.rows[row].xor(&to_add);
            }
        }
    }
    Some(id)
}
