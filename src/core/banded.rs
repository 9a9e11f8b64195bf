//! Symmetrische Band-Gleichungssysteme mit zyklischer Kopplung.
//!
//! Geschlossene Splines führen auf zyklische Bandmatrizen: neben dem Band sind
//! nur die Ecken besetzt. Gespeichert wird das Profil (Skyline) der unteren
//! Dreieckshälfte, also je Zeile die Einträge ab der ersten besetzten Spalte.
//! Die Cholesky-Zerlegung erzeugt keinen Fill-in außerhalb dieses Profils.
//!
//! Jede Instanz besitzt ihre eigenen Puffer; es gibt keinen geteilten Zustand.

use glam::DVec2;

use crate::error::GeometryError;

/// Relative Pivot-Schranke, darunter gilt die Matrix als singulär.
const PIVOT_EPSILON: f64 = 1e-12;

/// Symmetrische, zyklisch-tridiagonale Matrix.
///
/// `upper[i]` ist der Eintrag (i, i+1 mod n) = (i+1 mod n, i).
#[derive(Debug, Clone, PartialEq)]
pub struct CyclicTridiagonal {
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
}

impl CyclicTridiagonal {
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Matrix-Vektor-Produkt für 2D-Werte (x und y gleichzeitig).
    pub fn mul_vec2(&self, v: &[DVec2]) -> Vec<DVec2> {
        let n = self.len();
        (0..n)
            .map(|i| {
                let prev = (i + n - 1) % n;
                let next = (i + 1) % n;
                v[i] * self.diag[i] + v[next] * self.upper[i] + v[prev] * self.upper[prev]
            })
            .collect()
    }
}

/// Symmetrische Matrix in Profil-Speicherung (untere Hälfte inkl. Diagonale).
#[derive(Debug, Clone)]
pub struct ProfileMatrix {
    first_col: Vec<usize>,
    row_offset: Vec<usize>,
    values: Vec<f64>,
}

impl ProfileMatrix {
    /// Legt das Profil einer zyklischen Bandmatrix mit `half_bandwidth` an (alle Einträge 0).
    pub fn cyclic_band(n: usize, half_bandwidth: usize) -> Self {
        let mut first_col = Vec::with_capacity(n);
        let mut row_offset = Vec::with_capacity(n + 1);
        let mut total = 0;

        for i in 0..n {
            let mut first = i;
            for d in 1..=half_bandwidth.min(n.saturating_sub(1)) {
                // Nachbarn in beide Richtungen, zyklisch
                for col in [(i + n - d) % n, (i + d) % n] {
                    first = first.min(col);
                }
            }
            first_col.push(first);
            row_offset.push(total);
            total += i - first + 1;
        }
        row_offset.push(total);

        Self {
            first_col,
            row_offset,
            values: vec![0.0; total],
        }
    }

    pub fn len(&self) -> usize {
        self.first_col.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_col.is_empty()
    }

    fn slot(&self, row: usize, col: usize) -> Option<usize> {
        let (row, col) = if col > row { (col, row) } else { (row, col) };
        if col < self.first_col[row] {
            return None;
        }
        Some(self.row_offset[row] + col - self.first_col[row])
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.slot(row, col).map_or(0.0, |s| self.values[s])
    }

    /// Addiert `value` auf den symmetrischen Eintrag (row, col) = (col, row).
    ///
    /// Jedes ungeordnete Paar wird nur einmal gespeichert. Einträge außerhalb
    /// des Profils sind ein Programmierfehler.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        match self.slot(row, col) {
            Some(s) => self.values[s] += value,
            None => debug_assert!(false, "Eintrag ({row}, {col}) liegt außerhalb des Profils"),
        }
    }

    /// Addiert `scale · A` für eine zyklisch-tridiagonale Matrix A.
    pub fn add_tridiagonal(&mut self, a: &CyclicTridiagonal, scale: f64) {
        let n = a.len();
        for i in 0..n {
            self.add(i, i, scale * a.diag[i]);
            self.add(i, (i + 1) % n, scale * a.upper[i]);
        }
    }

    /// Addiert `scale · A·A` für eine symmetrische zyklisch-tridiagonale Matrix A.
    ///
    /// Das Produkt ist zyklisch-pentadiagonal; benötigt ein Profil mit Halbbandbreite 2.
    pub fn add_tridiagonal_square(&mut self, a: &CyclicTridiagonal, scale: f64) {
        let n = a.len();
        for i in 0..n {
            let prev = (i + n - 1) % n;
            let next = (i + 1) % n;
            let d = &a.diag;
            let u = &a.upper;
            self.add(i, i, scale * (d[i] * d[i] + u[i] * u[i] + u[prev] * u[prev]));
            self.add(i, next, scale * (d[i] * u[i] + u[i] * d[next]));
            self.add(i, (i + 2) % n, scale * u[i] * u[next]);
        }
    }

    /// Cholesky-Zerlegung A = L·Lᵀ im Profil.
    pub fn factorize(mut self) -> Result<CholeskyFactor, GeometryError> {
        let n = self.len();
        let scale = (0..n)
            .map(|i| self.get(i, i).abs())
            .fold(0.0f64, f64::max)
            .max(f64::MIN_POSITIVE);

        for i in 0..n {
            for j in self.first_col[i]..=i {
                let k0 = self.first_col[i].max(self.first_col[j]);
                let mut sum = self.get(i, j);
                for k in k0..j {
                    sum -= self.get(i, k) * self.get(j, k);
                }

                let value = if j == i {
                    if sum.is_nan() || sum <= PIVOT_EPSILON * scale {
                        return Err(GeometryError::SingularSystem { row: i });
                    }
                    sum.sqrt()
                } else {
                    sum / self.get(j, j)
                };

                let slot = self.row_offset[i] + j - self.first_col[i];
                self.values[slot] = value;
            }
        }

        Ok(CholeskyFactor { lower: self })
    }
}

/// Zerlegte Matrix; löst beliebig viele rechte Seiten.
#[derive(Debug, Clone)]
pub struct CholeskyFactor {
    lower: ProfileMatrix,
}

impl CholeskyFactor {
    /// Löst A·x = b für 2D-rechte Seiten (x- und y-Komponente unabhängig).
    pub fn solve_vec2(&self, rhs: &[DVec2]) -> Vec<DVec2> {
        let l = &self.lower;
        let n = l.len();
        let mut x = rhs.to_vec();

        // Vorwärts: L·y = b
        for i in 0..n {
            let mut sum = x[i];
            for k in l.first_col[i]..i {
                sum -= x[k] * l.get(i, k);
            }
            x[i] = sum / l.get(i, i);
        }

        // Rückwärts: Lᵀ·x = y (spaltenweise über das Zeilenprofil)
        for i in (0..n).rev() {
            x[i] /= l.get(i, i);
            let xi = x[i];
            for k in l.first_col[i]..i {
                x[k] -= xi * l.get(i, k);
            }
        }

        x
    }
}
