//! The linear layer λ = π∘ρ∘θ of Keccak-f, for all seven widths.
//!
//! All step mappings work on the slice representation of the state (see [`crate::state`]) and
//! commute with translations along z, which is what makes the trail-core search exhaustive "up to
//! translation".
//!
//! Besides λ and its inverse, the transpose λᵀ (and its inverse) is provided, as linear masks
//! propagate through the transpose of the linear layer.

use tracing::debug;
use vob::Vob;

use crate::algebra::{self, Matrix};
use crate::error::KeccakFError;
use crate::state::*;

/// The widths Keccak-f is defined for.
pub const WIDTHS: [usize; 7] = [25, 50, 100, 200, 400, 800, 1600];

/// A Keccak-f instance, holding everything needed to evaluate the linear layer.
#[derive(Debug, Clone)]
pub struct KeccakF {
    width: usize,
    lane_size: usize,
    /// ρ offsets, indexed by `x + 5*y`, already reduced modulo the lane size.
    rho_offsets: [usize; 25],
    /// Inverse of the map θ induces on the column parity plane.
    inverse_parity_map: Matrix,
    /// Inverse of the map θᵀ induces on the column parity plane.
    inverse_parity_map_transposed: Matrix,
}

impl KeccakF {
    /// Create Keccak-f[`width`]. The width must be one of [`WIDTHS`].
    pub fn new(width: usize) -> Result<Self, KeccakFError> {
        if !WIDTHS.contains(&width) {
            return Err(KeccakFError::UnsupportedWidth(width));
        }
        let lane_size = width / 25;
        let rho_offsets = Self::compute_rho_offsets(lane_size);

        let inverse_parity_map = algebra::invert(&Self::parity_map(lane_size, false))
            .ok_or(KeccakFError::SingularParityMap("theta"))?;
        let inverse_parity_map_transposed = algebra::invert(&Self::parity_map(lane_size, true))
            .ok_or(KeccakFError::SingularParityMap("transposed theta"))?;

        debug!(width, lane_size, "Keccak-f instance ready");
        Ok(Self {
            width,
            lane_size,
            rho_offsets,
            inverse_parity_map,
            inverse_parity_map_transposed,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of slices in a state.
    #[inline]
    pub fn lane_size(&self) -> usize {
        self.lane_size
    }

    #[inline]
    pub fn rho_offset(&self, x: usize, y: usize) -> usize {
        self.rho_offsets[x % 5 + 5 * (y % 5)]
    }

    fn compute_rho_offsets(lane_size: usize) -> [usize; 25] {
        let mut offsets = [0; 25];
        let (mut x, mut y) = (1, 0);
        for t in 0..24 {
            offsets[x + 5 * y] = ((t + 1) * (t + 2) / 2) % lane_size;
            let new_y = (2 * x + 3 * y) % 5;
            x = y;
            y = new_y;
        }
        offsets
    }

    // ============================================================================================
    // λ and friends

    /// λ = π∘ρ∘θ.
    pub fn lambda(&self, state: &[SliceValue]) -> Vec<SliceValue> {
        let mut state = state.to_vec();
        self.theta(&mut state);
        let mut state = self.rho(&state);
        self.pi(&mut state);
        state
    }

    /// λ⁻¹ = θ⁻¹∘ρ⁻¹∘π⁻¹.
    pub fn inverse_lambda(&self, state: &[SliceValue]) -> Vec<SliceValue> {
        let mut state = state.to_vec();
        self.inverse_pi(&mut state);
        let mut state = self.inverse_rho(&state);
        self.inverse_theta(&mut state);
        state
    }

    /// λᵀ = θᵀ∘ρ⁻¹∘π⁻¹, as ρ and π are bit permutations.
    pub fn transposed_lambda(&self, state: &[SliceValue]) -> Vec<SliceValue> {
        let mut state = state.to_vec();
        self.inverse_pi(&mut state);
        let mut state = self.inverse_rho(&state);
        self.transposed_theta(&mut state);
        state
    }

    /// (λᵀ)⁻¹ = π∘ρ∘(θᵀ)⁻¹.
    pub fn inverse_transposed_lambda(&self, state: &[SliceValue]) -> Vec<SliceValue> {
        let mut state = state.to_vec();
        self.inverse_transposed_theta(&mut state);
        let mut state = self.rho(&state);
        self.pi(&mut state);
        state
    }

    // ============================================================================================
    // θ

    /// a[x][y][z] ^= P[x-1][z] ^ P[x+1][z-1], where P is the column parity.
    pub fn theta(&self, state: &mut [SliceValue]) {
        let parities = Self::column_parities(state);
        Self::add_theta_effect(state, &parities, false);
    }

    /// a[x][y][z] ^= P[x+1][z] ^ P[x-1][z+1].
    pub fn transposed_theta(&self, state: &mut [SliceValue]) {
        let parities = Self::column_parities(state);
        Self::add_theta_effect(state, &parities, true);
    }

    pub fn inverse_theta(&self, state: &mut [SliceValue]) {
        let parities = self.parities_before(state, &self.inverse_parity_map);
        Self::add_theta_effect(state, &parities, false);
    }

    pub fn inverse_transposed_theta(&self, state: &mut [SliceValue]) {
        let parities = self.parities_before(state, &self.inverse_parity_map_transposed);
        Self::add_theta_effect(state, &parities, true);
    }

    fn column_parities(state: &[SliceValue]) -> Vec<RowValue> {
        state.iter().map(|&slice| column_parity(slice)).collect()
    }

    /// The θ-effect of a parity plane: E[x][z] = P[x-1][z] ^ P[x+1][z-1] (or its transpose).
    fn theta_effect(parities: &[RowValue], transposed: bool) -> Vec<RowValue> {
        let lane_size = parities.len();
        (0..lane_size)
            .map(|z| {
                if transposed {
                    rotate_row(parities[z], 4) ^ rotate_row(parities[(z + 1) % lane_size], 1)
                } else {
                    rotate_row(parities[z], 1)
                        ^ rotate_row(parities[(z + lane_size - 1) % lane_size], 4)
                }
            })
            .collect()
    }

    fn add_theta_effect(state: &mut [SliceValue], parities: &[RowValue], transposed: bool) {
        let effect = Self::theta_effect(parities, transposed);
        for (slice, e) in state.iter_mut().zip(effect) {
            *slice ^= broadcast_row(e);
        }
    }

    /// Recover the column parities of the state θ was applied to.
    ///
    /// Applying θ changes the parity plane P into (I + E)P, E being the θ-effect, as the effect
    /// is added to an odd number of rows. Inverting θ thus amounts to inverting I + E.
    fn parities_before(&self, state: &[SliceValue], inverse_parity_map: &Matrix) -> Vec<RowValue> {
        let after = plane_to_vob(&Self::column_parities(state));
        vob_to_plane(&inverse_parity_map.mul_vob(&after), state.len())
    }

    /// Matrix of P -> (I + E)P on the parity plane, bit `5*z + x` holding P[x][z].
    fn parity_map(lane_size: usize, transposed: bool) -> Matrix {
        let columns = (0..5 * lane_size)
            .map(|j| {
                let mut plane = vec![0; lane_size];
                plane[j / 5] = 1 << (j % 5);
                let effect = Self::theta_effect(&plane, transposed);
                let image: Vec<RowValue> = plane.iter().zip(effect).map(|(p, e)| p ^ e).collect();
                plane_to_vob(&image)
            })
            .collect();
        Matrix::from_columns(columns)
    }

    // ============================================================================================
    // ρ

    /// Rotate lane (x, y) by its ρ offset: bit (x, y, z) moves to (x, y, z + offset).
    pub fn rho(&self, state: &[SliceValue]) -> Vec<SliceValue> {
        self.rotate_lanes(state, false)
    }

    pub fn inverse_rho(&self, state: &[SliceValue]) -> Vec<SliceValue> {
        self.rotate_lanes(state, true)
    }

    fn rotate_lanes(&self, state: &[SliceValue], inverse: bool) -> Vec<SliceValue> {
        let lane_size = state.len();
        let mut out = vec![0; lane_size];
        for (z, &slice) in state.iter().enumerate() {
            let mut bits = slice;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                let offset = self.rho_offsets[bit];
                let to = if inverse {
                    (z + lane_size - offset) % lane_size
                } else {
                    (z + offset) % lane_size
                };
                out[to] |= 1 << bit;
            }
        }
        out
    }

    // ============================================================================================
    // π

    /// Bit (x, y) of every slice moves to (y, 2x + 3y).
    pub fn pi(&self, state: &mut [SliceValue]) {
        for slice in state.iter_mut() {
            *slice = permute_slice(*slice, false);
        }
    }

    pub fn inverse_pi(&self, state: &mut [SliceValue]) {
        for slice in state.iter_mut() {
            *slice = permute_slice(*slice, true);
        }
    }
}

fn permute_slice(slice: SliceValue, inverse: bool) -> SliceValue {
    let mut out = 0;
    for x in 0..5 {
        for y in 0..5 {
            let (from, to) = (x + 5 * y, y + 5 * ((2 * x + 3 * y) % 5));
            let (from, to) = if inverse { (to, from) } else { (from, to) };
            out |= ((slice >> from) & 1) << to;
        }
    }
    out
}

fn plane_to_vob(plane: &[RowValue]) -> Vob {
    let mut vob = Vob::from_elem(5 * plane.len(), false);
    for (z, &row) in plane.iter().enumerate() {
        for x in 0..5 {
            vob.set(5 * z + x, (row >> x) & 1 == 1);
        }
    }
    vob
}

fn vob_to_plane(vob: &Vob, lane_size: usize) -> Vec<RowValue> {
    let mut plane = vec![0; lane_size];
    for bit in vob.iter_set_bits(..) {
        plane[bit / 5] |= 1 << (bit % 5);
    }
    plane
}
