use std::fmt;

/// Which of the two headset cameras a mono frame or a single-camera command refers to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn from_is_left(is_left: bool) -> Self {
        if is_left {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn is_left(self) -> bool {
        matches!(self, Side::Left)
    }

    pub fn channel(self) -> Channel {
        match self {
            Side::Left => Channel::LeftFrame,
            Side::Right => Channel::RightFrame,
        }
    }
}

/// The fixed set of event kinds relayed to the engine.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Channel {
    LeftFrame,
    RightFrame,
    StereoFrame,
    Error,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::LeftFrame,
        Channel::RightFrame,
        Channel::StereoFrame,
        Channel::Error,
    ];

    pub fn index(self) -> usize {
        match self {
            Channel::LeftFrame => 0,
            Channel::RightFrame => 1,
            Channel::StereoFrame => 2,
            Channel::Error => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::LeftFrame => "left_frame",
            Channel::RightFrame => "right_frame",
            Channel::StereoFrame => "stereo_frame",
            Channel::Error => "error",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One camera frame as handed to a mono-frame callback.
///
/// Every span borrows memory owned by the caller and is only valid for the
/// duration of the delivery call that built it.
#[derive(Debug)]
pub struct MonoFrame<'a> {
    pub side: Side,
    pub pixels: &'a [u8],
    pub width: i32,
    pub height: i32,
    pub timestamp: i64,
    pub intrinsics: &'a [f32],
    pub distortion: &'a [f32],
    pub pose: &'a [f32],
}

/// A side-by-side frame with its variable-length stereo metadata.
#[derive(Debug)]
pub struct StereoFrame<'a> {
    pub pixels: &'a [u8],
    pub width: i32,
    pub height: i32,
    pub timestamp: i64,
    pub metadata: &'a [f32],
}
