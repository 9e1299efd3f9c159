// PI (Proportional-Integral) controller with anti-windup and a fixed sample period

/// PI controller with anti-windup and output limiting
///
/// The sample period is fixed at construction and has to match the period of
/// the loop that calls [`PiController::update`].
#[derive(Debug, Clone)]
pub struct PiController {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Integral accumulator (error · seconds)
    integral: f32,
    /// Sample period (seconds)
    sample_period: f32,
    /// Integral accumulator bound (±integral_limit)
    integral_limit: f32,
    /// Minimum output limit
    output_min: f32,
    /// Maximum output limit
    output_max: f32,
    /// Last calculated output
    last_output: f32,
    /// Change applied to the integral by the last update
    last_increment: f32,
}

impl PiController {
    /// Create a new PI controller
    ///
    /// # Arguments
    /// * `kp` - Proportional gain
    /// * `ki` - Integral gain
    /// * `sample_period` - Time step between updates (seconds)
    /// * `output_min` - Minimum output limit
    /// * `output_max` - Maximum output limit
    ///
    /// The integral bound defaults to the accumulator value at which the
    /// integral term alone reaches the wider output limit.
    pub fn new(kp: f32, ki: f32, sample_period: f32, output_min: f32, output_max: f32) -> Self {
        Self {
            kp,
            ki,
            integral: 0.0,
            sample_period,
            integral_limit: Self::default_integral_limit(ki, output_min, output_max),
            output_min,
            output_max,
            last_output: 0.0,
            last_increment: 0.0,
        }
    }

    /// Create a symmetric PI controller (output range: -limit to +limit)
    pub fn new_symmetric(kp: f32, ki: f32, sample_period: f32, output_limit: f32) -> Self {
        Self::new(kp, ki, sample_period, -output_limit, output_limit)
    }

    /// Override the integral accumulator bound
    pub fn with_integral_limit(mut self, integral_limit: f32) -> Self {
        self.integral_limit = integral_limit.abs();
        self.integral = self.integral.clamp(-self.integral_limit, self.integral_limit);
        self
    }

    fn default_integral_limit(ki: f32, output_min: f32, output_max: f32) -> f32 {
        if ki > 0.0 {
            output_min.abs().max(output_max.abs()) / ki
        } else {
            0.0
        }
    }

    /// Update the PI controller
    ///
    /// # Arguments
    /// * `measured` - Actual measured value
    /// * `target` - Desired value
    ///
    /// # Returns
    /// Controller output (limited to output_min..output_max)
    pub fn update(&mut self, measured: f32, target: f32) -> f32 {
        let error = target - measured;

        let p_term = self.kp * error;

        // Conditional integration: hold the integral while the output is
        // saturated and the error pushes further into the limit
        let pushing_max = self.last_output >= self.output_max && error > 0.0;
        let pushing_min = self.last_output <= self.output_min && error < 0.0;

        let previous = self.integral;
        if !(pushing_max || pushing_min) {
            self.integral += error * self.sample_period;
            self.integral = self.integral.clamp(-self.integral_limit, self.integral_limit);
        }
        self.last_increment = self.integral - previous;

        let i_term = self.ki * self.integral;

        self.last_output = (p_term + i_term).clamp(self.output_min, self.output_max);

        self.last_output
    }

    /// Undo the last integration step if it pushed the output further from zero
    ///
    /// For use when a downstream limit (e.g. the dq voltage circle) clipped
    /// the output below this controller's own clamp.
    pub fn discard_windup_step(&mut self) {
        if self.last_increment * self.last_output > 0.0 {
            self.integral -= self.last_increment;
            self.last_increment = 0.0;
        }
    }

    /// Reset the integral term to zero
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_output = 0.0;
        self.last_increment = 0.0;
    }

    /// Set the proportional and integral gains
    pub fn set_gains(&mut self, kp: f32, ki: f32) {
        self.kp = kp;
        self.ki = ki;
        self.integral_limit = Self::default_integral_limit(ki, self.output_min, self.output_max);
        self.integral = self.integral.clamp(-self.integral_limit, self.integral_limit);
    }

    /// Set the output limits
    ///
    /// The integral bound is recomputed from the new limits, replacing any
    /// bound set with [`PiController::with_integral_limit`].
    pub fn set_limits(&mut self, output_min: f32, output_max: f32) {
        self.output_min = output_min;
        self.output_max = output_max;
        self.integral_limit = Self::default_integral_limit(self.ki, output_min, output_max);
        self.integral = self.integral.clamp(-self.integral_limit, self.integral_limit);
    }

    /// Get the current output
    pub fn output(&self) -> f32 {
        self.last_output
    }

    /// Get the current integral accumulator
    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn integral_limit(&self) -> f32 {
        self.integral_limit
    }

    pub fn kp(&self) -> f32 {
        self.kp
    }

    pub fn ki(&self) -> f32 {
        self.ki
    }

    pub fn sample_period(&self) -> f32 {
        self.sample_period
    }

    /// Check if output is currently saturated
    pub fn is_saturated(&self) -> bool {
        self.last_output <= self.output_min || self.last_output >= self.output_max
    }
}
