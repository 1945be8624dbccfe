use crate::servo::ServoId;

/// One actuation instruction for a single servo. Built per slider event,
/// encoded, and discarded.
pub struct Command {
    pub servo: ServoId,
    pub degrees: f32,
}

impl Command {
    pub fn new(servo: ServoId, degrees: f32) -> Self {
        Self { servo, degrees }
    }

    /// Angle after rounding to the nearest whole degree, ties away from
    /// zero (`f32::round`).
    ///
    /// No clamping happens here: values outside 0..=180 encode as their
    /// literal decimal form, and range enforcement sits with the caller.
    pub fn rounded_degrees(&self) -> i32 {
        self.degrees.round() as i32
    }

    /// Build the wire bytes: the lowercase servo name, one space, the
    /// decimal angle. Plain ASCII, no newline or terminator; the firmware
    /// frames on the USB packet boundary.
    pub fn encode(&self) -> Vec<u8> {
        format!("{} {}", self.servo.name(), self.rounded_degrees()).into_bytes()
    }
}
