//! Subject data model and the card gradient palette.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

const fn argb(value: u32) -> i32 {
    value as i32
}

/// Gradients offered for subject cards, two ARGB stops each.
pub const SUBJECT_CARD_COLORS: [[i32; 2]; 5] = [
    [argb(0xFF5D_9CEC), argb(0xFF4A_89DC)],
    [argb(0xFFA0_D468), argb(0xFF8C_C152)],
    [argb(0xFFFF_CE54), argb(0xFFF6_BB42)],
    [argb(0xFFED_5565), argb(0xFFDA_4453)],
    [argb(0xFFAC_92EC), argb(0xFF96_7ADC)],
];

/// Picks one of the palette gradients for a fresh subject form.
pub fn random_gradient() -> Vec<i32> {
    let mut rng = rand::thread_rng();
    SUBJECT_CARD_COLORS
        .choose(&mut rng)
        .unwrap_or(&SUBJECT_CARD_COLORS[0])
        .to_vec()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Zero means "not yet persisted"; the store assigns an id on upsert.
    pub id: i64,
    pub name: String,
    pub goal_hours: f32,
    pub colors: Vec<i32>,
}

impl Subject {
    pub fn new(name: impl Into<String>, goal_hours: f32, colors: Vec<i32>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            goal_hours,
            colors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_gradient_comes_from_palette() {
        for _ in 0..20 {
            let gradient = random_gradient();
            assert_eq!(gradient.len(), 2);
            assert!(SUBJECT_CARD_COLORS
                .iter()
                .any(|entry| entry.as_slice() == gradient.as_slice()));
        }
    }
}
