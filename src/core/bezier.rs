//! Reine Bézier-Mathematik: Punkt- und Ableitungsauswertung in Bernstein-Form.
//!
//! Alle Funktionen klemmen `t` auf [0, 1] — Werte außerhalb sind kein Fehler,
//! sondern werden still auf den Rand gezogen. Die Ableitungen sind die
//! analytischen ersten Ableitungen der Positionspolynome, keine finiten
//! Differenzen.

use glam::Vec3;

/// B(t) = (1-t)²·P0 + 2(1-t)t·P1 + t²·P2
pub fn quadratic_point(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    inv * inv * p0 + 2.0 * inv * t * p1 + t * t * p2
}

/// B'(t) = 2(1-t)·(P1-P0) + 2t·(P2-P1)
pub fn quadratic_derivative(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    2.0 * inv * (p1 - p0) + 2.0 * t * (p2 - p1)
}

/// B(t) = (1-t)³·P0 + 3(1-t)²t·P1 + 3(1-t)t²·P2 + t³·P3
pub fn cubic_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    let inv2 = inv * inv;
    let t2 = t * t;
    inv2 * inv * p0 + 3.0 * inv2 * t * p1 + 3.0 * inv * t2 * p2 + t2 * t * p3
}

/// B'(t) = 3(1-t)²·(P1-P0) + 6(1-t)t·(P2-P1) + 3t²·(P3-P2)
pub fn cubic_derivative(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    let inv2 = inv * inv;
    let t2 = t * t;
    3.0 * inv2 * (p1 - p0) + 6.0 * inv * t * (p2 - p1) + 3.0 * t2 * (p3 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_endpoints_exact() {
        let p0 = Vec3::new(0.0, 1.0, 2.0);
        let p1 = Vec3::new(3.0, 4.0, 5.0);
        let p2 = Vec3::new(6.0, 7.0, 8.0);
        let p3 = Vec3::new(9.0, 8.0, 7.0);

        assert_eq!(cubic_point(p0, p1, p2, p3, 0.0), p0);
        assert_eq!(cubic_point(p0, p1, p2, p3, 1.0), p3);
    }

    #[test]
    fn test_quadratic_midpoint() {
        // B(0.5) = 0.25·P0 + 0.5·P1 + 0.25·P2
        let p0 = Vec3::ZERO;
        let p1 = Vec3::new(2.0, 0.0, 0.0);
        let p2 = Vec3::new(4.0, 0.0, 0.0);
        let mid = quadratic_point(p0, p1, p2, 0.5);
        assert_relative_eq!(mid.x, 2.0);
    }

    #[test]
    fn test_t_wird_geklemmt() {
        let p0 = Vec3::ZERO;
        let p1 = Vec3::new(1.0, 0.0, 0.0);
        let p2 = Vec3::new(2.0, 0.0, 0.0);
        let p3 = Vec3::new(3.0, 0.0, 0.0);

        // t außerhalb [0,1] liefert exakt die Randwerte
        assert_eq!(cubic_point(p0, p1, p2, p3, -0.5), p0);
        assert_eq!(cubic_point(p0, p1, p2, p3, 7.0), p3);
        assert_eq!(
            cubic_derivative(p0, p1, p2, p3, 2.0),
            cubic_derivative(p0, p1, p2, p3, 1.0)
        );
    }

    #[test]
    fn test_cubic_derivative_matches_difference_quotient() {
        let p0 = Vec3::new(0.0, 0.0, 0.0);
        let p1 = Vec3::new(1.0, 3.0, 0.0);
        let p2 = Vec3::new(4.0, 3.0, -2.0);
        let p3 = Vec3::new(5.0, 0.0, 1.0);

        let t = 0.37;
        let h = 1e-3;
        let numeric = (cubic_point(p0, p1, p2, p3, t + h) - cubic_point(p0, p1, p2, p3, t - h))
            / (2.0 * h);
        let analytic = cubic_derivative(p0, p1, p2, p3, t);

        assert!((numeric - analytic).length() < 1e-2);
    }

    #[test]
    fn test_quadratic_derivative_straight_line() {
        // Gleichmäßig verteilte Punkte auf einer Geraden: konstante Geschwindigkeit
        let p0 = Vec3::ZERO;
        let p1 = Vec3::new(1.0, 0.0, 0.0);
        let p2 = Vec3::new(2.0, 0.0, 0.0);

        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let v = quadratic_derivative(p0, p1, p2, t);
            assert_relative_eq!(v.x, 2.0, epsilon = 1e-5);
        }
    }
}
