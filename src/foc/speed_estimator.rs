// Rotor speed estimation from successive angle samples
// Differentiates the wrapped angle once per control period and smooths the
// result with a first-order low-pass filter.

use super::transforms::wrap_angle;

/// Angle differentiator with wrap-around handling
///
/// The angle step between two samples is taken on the shortest path, so a
/// sensor jumping from just below 2π to just above 0 reads as a small
/// forward step. Speeds above π per sample period alias and are not
/// representable.
#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    /// Previous angle sample [rad], `None` until the first update
    prev_angle: Option<f32>,
    /// Filtered speed [rad/s]
    speed: f32,
    /// Sample period [s]
    sample_period: f32,
    /// Low-pass filter coefficient (0.0 - 1.0), 1.0 = no filtering
    filter_alpha: f32,
}

impl SpeedEstimator {
    /// # Arguments
    /// * `sample_period` - Time between updates (seconds)
    /// * `filter_alpha` - Low-pass coefficient, clamped to 0.0..=1.0
    pub fn new(sample_period: f32, filter_alpha: f32) -> Self {
        Self {
            prev_angle: None,
            speed: 0.0,
            sample_period,
            filter_alpha: filter_alpha.clamp(0.0, 1.0),
        }
    }

    /// Feed one angle sample and return the filtered speed [rad/s]
    ///
    /// The first sample only seeds the differentiator and yields 0.
    pub fn update(&mut self, angle: f32) -> f32 {
        if let Some(prev_angle) = self.prev_angle {
            let delta = wrap_angle(angle - prev_angle);
            let instant_speed = delta / self.sample_period;
            self.speed =
                self.filter_alpha * instant_speed + (1.0 - self.filter_alpha) * self.speed;
        }
        self.prev_angle = Some(angle);
        self.speed
    }

    /// Last filtered speed [rad/s]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn reset(&mut self) {
        self.prev_angle = None;
        self.speed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;

    const EPSILON: f32 = 0.01;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_first_sample_seeds() {
        let mut estimator = SpeedEstimator::new(0.001, 1.0);
        assert_eq!(estimator.update(2.0), 0.0);
        assert_eq!(estimator.update(2.0), 0.0);
    }

    #[test]
    fn test_constant_speed_unfiltered() {
        let mut estimator = SpeedEstimator::new(0.001, 1.0);
        estimator.update(0.0);
        // 0.1 rad / 1ms = 100 rad/s
        assert!(approx_eq(estimator.update(0.1), 100.0));
        assert!(approx_eq(estimator.update(0.2), 100.0));
    }

    #[test]
    fn test_wrap_around_forward_and_backward() {
        let mut estimator = SpeedEstimator::new(0.001, 1.0);
        estimator.update(TAU - 0.05);
        assert!(approx_eq(estimator.update(0.05), 100.0));

        estimator.reset();
        estimator.update(0.05);
        assert!(approx_eq(estimator.update(TAU - 0.05), -100.0));
    }

    #[test]
    fn test_low_pass_converges() {
        let mut estimator = SpeedEstimator::new(0.001, 0.2);
        let mut angle = 0.0;
        estimator.update(angle);
        angle += 0.05;
        let first = estimator.update(angle);
        assert!(approx_eq(first, 10.0)); // 0.2 * 50 rad/s
        for _ in 0..200 {
            angle += 0.05;
            estimator.update(angle);
        }
        assert!(approx_eq(estimator.speed(), 50.0));
    }
}
