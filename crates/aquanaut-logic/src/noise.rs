//! Hashed-lattice 2D value noise.
//!
//! Deterministic and stateless: the same coordinates always give the same
//! value in `[0, 1)`. Use `seed` to decorrelate independent fields.

/// Fractional part of a scaled sine, in `[0, 1)`.
fn hash(n: f32) -> f32 {
    let s = n.sin() * 43_758.547;
    s - s.floor()
}

fn lattice(xi: f32, yi: f32, seed: f32) -> f32 {
    hash(xi * 53.13 + yi * 91.17 + seed * 17.31)
}

/// Cubic Hermite interpolation between `edge0` and `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0).max(1e-6)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Smoothed value noise at `(x, y)` with seed 0.
pub fn value_noise_2d(x: f32, y: f32) -> f32 {
    seeded_value_noise_2d(x, y, 0.0)
}

/// Smoothed value noise at `(x, y)`; bilinear over the four surrounding
/// lattice corners with a smoothstep fade.
pub fn seeded_value_noise_2d(x: f32, y: f32, seed: f32) -> f32 {
    let xi = x.floor();
    let yi = y.floor();
    let xf = x - xi;
    let yf = y - yi;

    let s = lattice(xi, yi, seed);
    let t = lattice(xi + 1.0, yi, seed);
    let u = lattice(xi, yi + 1.0, seed);
    let v = lattice(xi + 1.0, yi + 1.0, seed);

    let sx = xf * xf * (3.0 - 2.0 * xf);
    let sy = yf * yf * (3.0 - 2.0 * yf);

    let bottom = s + (t - s) * sx;
    let top = u + (v - u) * sx;
    bottom + (top - bottom) * sy
}
