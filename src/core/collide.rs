//! Pure collision physics: wall reflection and two-body elastic impacts.
//!
//! The impact model is a center-line approximation: the impulse is applied
//! along the line connecting disk centers at detection time, not at true
//! first contact. Momentum and kinetic energy are conserved exactly (to
//! floating-point tolerance) per impact.

use crate::core::grid::Bounds;
use crate::core::particle::Particle;

/// Velocity of one body expressed as magnitude plus heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub speed: f64,
    pub direction: f64,
}

impl Kinematics {
    #[inline]
    pub fn of(p: &Particle) -> Self {
        Self {
            speed: p.speed,
            direction: p.direction,
        }
    }
}

/// Sign of the time rate with `0.0` mapped to zero, so a frozen clock never
/// satisfies a "moving into the wall" check. (`f64::signum` maps 0.0 to 1.0,
/// which is not what the reflection conditions need.)
#[inline]
pub fn time_sign(time_rate: f64) -> f64 {
    if time_rate > 0.0 {
        1.0
    } else if time_rate < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Reflect a particle off any interior boundary its projected position
/// crosses, provided its velocity points into that wall under the current
/// direction of time. Mirrors the heading (`180 - dir` across x-walls,
/// `360 - dir` across y-walls) and clamps the position just inside the
/// boundary. Returns true if any reflection occurred, in which case the
/// caller must re-project the candidate position.
pub fn reflect_walls(p: &mut Particle, next: (f64, f64), b: &Bounds, time_sign: f64) -> bool {
    let rad = p.direction.to_radians();
    let (cos_d, sin_d) = (rad.cos(), rad.sin());
    let mut reflected = false;

    if next.0 >= b.max_x && time_sign * cos_d > 0.0 {
        p.direction = 180.0 - p.direction;
        p.x = b.max_x;
        reflected = true;
    }
    if next.0 <= b.min_x && time_sign * cos_d < 0.0 {
        p.direction = 180.0 - p.direction;
        p.x = b.min_x;
        reflected = true;
    }
    if next.1 >= b.max_y && time_sign * sin_d > 0.0 {
        p.direction = 360.0 - p.direction;
        p.y = b.max_y;
        reflected = true;
    }
    if next.1 <= b.min_y && time_sign * sin_d < 0.0 {
        p.direction = 360.0 - p.direction;
        p.y = b.min_y;
        reflected = true;
    }
    reflected
}

/// Two-body elastic collision with the impulse along the contact angle
/// `theta` (radians, from body 1 toward body 2).
///
/// Both velocities are rotated into the frame aligned with the line of
/// centers, the standard 1-D elastic formulas are applied to the along-axis
/// components only, the perpendicular components pass through unchanged,
/// and the results are recombined into magnitude/heading form.
pub fn elastic_impact(
    theta: f64,
    m1: f64,
    k1: Kinematics,
    m2: f64,
    k2: Kinematics,
) -> (Kinematics, Kinematics) {
    let a1 = k1.direction.to_radians() - theta;
    let a2 = k2.direction.to_radians() - theta;

    let u1x = k1.speed * a1.cos();
    let u1y = k1.speed * a1.sin();
    let u2x = k2.speed * a2.cos();
    let u2y = k2.speed * a2.sin();

    let v1x = ((m1 - m2) * u1x + 2.0 * m2 * u2x) / (m1 + m2);
    let v2x = (2.0 * m1 * u1x + (m2 - m1) * u2x) / (m1 + m2);

    let n1 = Kinematics {
        speed: (v1x * v1x + u1y * u1y).sqrt(),
        direction: (u1y.atan2(v1x) + theta).to_degrees(),
    };
    let n2 = Kinematics {
        speed: (v2x * v2x + u2y * u2y).sqrt(),
        direction: (u2y.atan2(v2x) + theta).to_degrees(),
    };
    (n1, n2)
}
