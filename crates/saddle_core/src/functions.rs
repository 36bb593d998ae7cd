//! Response functions shared by the regulatory-network models this crate is
//! typically pointed at. Model equations reference these by name; concrete
//! integrator collaborators evaluate them.

/// Positive Hill function: (x/x0)^n / (1 + (x/x0)^n). Saturates at 1.
pub fn hill_positive(x: f64, x0: f64, n: f64) -> f64 {
    let ratio = (x / x0).powf(n);
    ratio / (1.0 + ratio)
}

/// Negative Hill function: 1 / (1 + (x/x0)^n). Decays from 1 toward 0.
pub fn hill_negative(x: f64, x0: f64, n: f64) -> f64 {
    1.0 / (1.0 + (x / x0).powf(n))
}

/// Shifted Hill function: interpolates between repression and the fold
/// change `lambda`; lambda = 1 removes the regulation entirely.
pub fn hill_shifted(x: f64, x0: f64, n: f64, lambda: f64) -> f64 {
    (1.0 - lambda) * hill_negative(x, x0, n) + lambda
}

#[cfg(test)]
mod tests {
    use super::{hill_negative, hill_positive, hill_shifted};

    #[test]
    fn positive_and_negative_hill_sum_to_one() {
        for x in [0.1, 0.5, 1.0, 3.0, 50.0] {
            let sum = hill_positive(x, 1.0, 4.0) + hill_negative(x, 1.0, 4.0);
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn hill_functions_cross_half_at_the_threshold() {
        assert!((hill_positive(2.0, 2.0, 3.0) - 0.5).abs() < 1e-12);
        assert!((hill_negative(2.0, 2.0, 3.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn shifted_hill_with_unit_fold_change_is_constant() {
        for x in [0.01, 1.0, 10.0] {
            assert!((hill_shifted(x, 1.0, 2.0, 1.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn shifted_hill_approaches_fold_change_at_saturation() {
        let lambda = 0.25;
        let value = hill_shifted(1e6, 1.0, 2.0, lambda);
        assert!((value - lambda).abs() < 1e-9);
    }
}
