//! Test support for the eeo workspace: raster fixtures, grid generators,
//! scratch store paths and tolerance assertions.
//!
//! Pulled in as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber for tests, once per process.
///
/// Verbosity follows `RUST_LOG` (default `warn`). Output goes through the
/// test writer so it is captured unless `--nocapture` is passed.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Assert `|left - right| <= tolerance`, comparing as `f64`.
///
/// ```ignore
/// assert_approx_eq!(stats.mean, 0.0, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (l, r, tol) = ($left as f64, $right as f64, $tolerance as f64);
        assert!(
            (l - r).abs() <= tol,
            "values differ by more than {}: {} vs {}",
            tol,
            l,
            r
        );
    }};
}

/// [`assert_approx_eq!`] on both members of an `(x, y)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let ((lx, ly), (rx, ry)) = ($left, $right);
        $crate::assert_approx_eq!(lx, rx, $tolerance);
        $crate::assert_approx_eq!(ly, ry, $tolerance);
    }};
}

/// Elementwise [`assert_approx_eq!`] over two float arrays of the same shape.
///
/// NaN entries must line up.
#[macro_export]
macro_rules! assert_array_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right) = (&$left, &$right);
        assert_eq!(left.shape(), right.shape(), "array shapes differ");
        for (l, r) in left.iter().zip(right.iter()) {
            if l.is_nan() || r.is_nan() {
                assert!(l.is_nan() && r.is_nan(), "NaN mismatch: {:?} vs {:?}", l, r);
            } else {
                $crate::assert_approx_eq!(*l, *r, $tolerance);
            }
        }
    }};
}
