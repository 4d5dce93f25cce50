//! Fixed-step time integrator for the gravity system
//!
//! Semi-implicit (symplectic) Euler driven by a `ForceSet`

use super::error::SimError;
use super::forces::ForceSet;
use super::states::{is_finite, Body, NVec2};

/// Advance every body by one step of size `dt` and record the new state.
///
/// Two passes: all net forces are computed from the start-of-step state into
/// `forces_buf` first, then each body is kicked and drifted:
///   v_n+1 = v_n + (F_n / m) * dt
///   x_n+1 = x_n + v_n+1 * dt
///
/// `step` is the 1-based index of the step being taken, used for error
/// reporting. A body whose new state is not finite aborts the step with
/// `NumericalInstability` before its sample is recorded.
pub fn semi_implicit_euler(
    bodies: &mut [Body],
    forces: &ForceSet,
    forces_buf: &mut Vec<NVec2>,
    dt: f64,
    step: usize,
) -> Result<(), SimError> {
    let n = bodies.len();
    if n == 0 {
        return Ok(());
    }

    forces_buf.resize(n, NVec2::zeros());
    forces.accumulate_forces(bodies, forces_buf)?;

    // Check the whole step before touching any body so a failure leaves
    // every trajectory at the same length
    let mut next = Vec::with_capacity(n);
    for (b, f) in bodies.iter().zip(forces_buf.iter()) {
        let v = b.velocity + (*f / b.mass) * dt;
        let x = b.position + v * dt;
        if !(is_finite(&v) && is_finite(&x)) {
            return Err(SimError::NumericalInstability {
                body: b.name.clone(),
                step,
            });
        }
        next.push((x, v));
    }

    for (b, (x, v)) in bodies.iter_mut().zip(next) {
        b.velocity = v;
        b.position = x;
        b.record();
    }

    Ok(())
}
