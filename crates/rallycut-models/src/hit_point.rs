//! Estimated shot events.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the court a hit is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Player {
    /// Near side (lower band of the frame)
    #[serde(rename = "Player A")]
    A,
    /// Far side (upper band of the frame)
    #[serde(rename = "Player B")]
    B,
}

impl Player {
    /// Players alternate by shot parity, starting with [`Player::A`].
    pub fn for_shot(index: usize) -> Self {
        if index % 2 == 0 {
            Player::A
        } else {
            Player::B
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Player::A => "Player A",
            Player::B => "Player B",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An approximate shot event inside a rally.
///
/// Hit points are interpolated from the rally span, not detected. Consumers
/// must not treat positions or timings as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HitPoint {
    pub frame_index: u64,
    pub time_seconds: f64,
    /// Horizontal position in pixels
    pub x: f64,
    /// Vertical position in pixels
    pub y: f64,
    pub player_label: Player,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_alternates() {
        assert_eq!(Player::for_shot(0), Player::A);
        assert_eq!(Player::for_shot(1), Player::B);
        assert_eq!(Player::for_shot(4), Player::A);
    }

    #[test]
    fn test_player_wire_name() {
        assert_eq!(serde_json::to_string(&Player::B).unwrap(), "\"Player B\"");
        assert_eq!(Player::A.to_string(), "Player A");
    }
}
