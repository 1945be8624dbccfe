use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServoIdError {
    #[error("The name does not identify a servo.")]
    Unknown,
}

/// The three servos on the rig. The lowercase name of each is the
/// identifier the firmware parses off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServoId {
    Thumb,
    Arm,
    Fingers,
}

impl ServoId {
    pub const ALL: [ServoId; 3] = [Self::Thumb, Self::Arm, Self::Fingers];

    pub fn name(self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Arm => "arm",
            Self::Fingers => "fingers",
        }
    }
}

impl Display for ServoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&str> for ServoId {
    type Error = ServoIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "thumb" => Ok(Self::Thumb),
            "arm" => Ok(Self::Arm),
            "fingers" => Ok(Self::Fingers),
            _ => Err(ServoIdError::Unknown),
        }
    }
}

/// Last angle requested per servo, kept for display only. There is no
/// feedback channel, so this says nothing about physical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoState {
    pub thumb: i32,
    pub arm: i32,
    pub fingers: i32,
}

impl Default for ServoState {
    // Sliders start centred at 50 degrees.
    fn default() -> Self {
        Self {
            thumb: 50,
            arm: 50,
            fingers: 50,
        }
    }
}

impl ServoState {
    pub fn get(&self, servo: ServoId) -> i32 {
        match servo {
            ServoId::Thumb => self.thumb,
            ServoId::Arm => self.arm,
            ServoId::Fingers => self.fingers,
        }
    }

    pub(crate) fn set(&mut self, servo: ServoId, degrees: i32) {
        match servo {
            ServoId::Thumb => self.thumb = degrees,
            ServoId::Arm => self.arm = degrees,
            ServoId::Fingers => self.fingers = degrees,
        }
    }
}
