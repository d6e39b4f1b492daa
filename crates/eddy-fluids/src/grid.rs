/// Staggering of a sampled field relative to the pressure-cell lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stagger {
    /// Samples on vertical cell faces, at `(i·dx, (j+0.5)·dy)`.
    U,
    /// Samples on horizontal cell faces, at `((i+0.5)·dx, j·dy)`.
    V,
    /// Cell-centered samples, at `((i+0.5)·dx, (j+0.5)·dy)`.
    Center,
}

/// Flat 2-D array of scalar values, row-major with x fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    nx: usize,
    ny: usize,
    data: Vec<f32>,
}

impl ScalarGrid {
    pub fn new(nx: usize, ny: usize) -> Self {
        ScalarGrid {
            nx,
            ny,
            data: vec![0.0; nx * ny],
        }
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        i + self.nx * j
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[self.idx(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, val: f32) {
        let idx = self.idx(i, j);
        self.data[idx] = val;
    }

    pub fn fill(&mut self, val: f32) {
        self.data.fill(val);
    }

    /// Backing values in row-major, x-fastest order.
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Stencil corner lookup with signed indices. Corners outside the grid
    /// read as zero (homogeneous Dirichlet ghost).
    #[inline]
    fn corner(&self, i: i64, j: i64) -> f32 {
        if i < 0 || j < 0 || i >= self.nx as i64 || j >= self.ny as i64 {
            0.0
        } else {
            self.data[i as usize + self.nx * j as usize]
        }
    }

    /// Bilinear interpolation at the physical position `(x, y)`.
    ///
    /// The staggering offset shifts the fractional coordinates so that index
    /// `(i, j)` of this grid lands on its own sample point. Sampling exactly
    /// at a sample point reproduces the stored value.
    pub fn interpolate(&self, x: f32, y: f32, dx: f32, dy: f32, stagger: Stagger) -> f32 {
        let mut k = x / dx;
        let mut l = y / dy;

        match stagger {
            Stagger::U => l -= 0.5,
            Stagger::V => k -= 0.5,
            Stagger::Center => {
                k -= 0.5;
                l -= 0.5;
            }
        }

        let i0 = k.floor() as i64;
        let j0 = l.floor() as i64;
        let a = k - i0 as f32;
        let b = l - j0 as f32;

        let c00 = self.corner(i0, j0);
        let c10 = self.corner(i0 + 1, j0);
        let c01 = self.corner(i0, j0 + 1);
        let c11 = self.corner(i0 + 1, j0 + 1);

        (1.0 - b) * ((1.0 - a) * c00 + a * c10) + b * ((1.0 - a) * c01 + a * c11)
    }
}
