// src/render/skills.rs
//! Horizontal automation-potential bars, drawn in prominence order

use crate::assessment::SkillImpact;

pub const HIGH_BAR_COLOR: &str = "#ef4444";
pub const MEDIUM_BAR_COLOR: &str = "#f59e0b";
pub const LOW_BAR_COLOR: &str = "#3b82f6";

pub fn bar_color(automation_potential: f64) -> &'static str {
    if automation_potential > 70.0 {
        HIGH_BAR_COLOR
    } else if automation_potential > 40.0 {
        MEDIUM_BAR_COLOR
    } else {
        LOW_BAR_COLOR
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillBar {
    pub rank: usize,
    pub skill: String,
    pub length: f64,
    pub color: &'static str,
    pub irreplaceable_value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillBars {
    pub bars: Vec<SkillBar>,
}

impl SkillBars {
    pub fn new(skills: &[SkillImpact]) -> Self {
        let bars = skills
            .iter()
            .enumerate()
            .map(|(index, skill)| {
                let value = if skill.automation_potential.is_finite() {
                    skill.automation_potential.clamp(0.0, 100.0)
                } else {
                    0.0
                };
                SkillBar {
                    rank: index + 1,
                    skill: skill.skill.clone(),
                    length: value,
                    color: bar_color(value),
                    irreplaceable_value: skill.irreplaceable_value.clone(),
                }
            })
            .collect();

        Self { bars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::types::fixtures::skill;

    #[test]
    fn test_thresholds() {
        assert_eq!(bar_color(71.0), HIGH_BAR_COLOR);
        assert_eq!(bar_color(70.0), MEDIUM_BAR_COLOR);
        assert_eq!(bar_color(41.0), MEDIUM_BAR_COLOR);
        assert_eq!(bar_color(40.0), LOW_BAR_COLOR);
        assert_eq!(bar_color(0.0), LOW_BAR_COLOR);
    }

    #[test]
    fn test_preserves_input_order_for_any_permutation() {
        let skills = vec![
            skill("A", 10.0),
            skill("B", 90.0),
            skill("C", 50.0),
            skill("D", 30.0),
            skill("E", 75.0),
        ];

        let mut order: Vec<usize> = (0..skills.len()).collect();
        // walk every rotation and its reverse
        for _ in 0..skills.len() {
            order.rotate_left(1);
            for candidate in [order.clone(), order.iter().rev().copied().collect()] {
                let permuted: Vec<SkillImpact> =
                    candidate.iter().map(|&i| skills[i].clone()).collect();
                let bars = SkillBars::new(&permuted);
                let names: Vec<&str> = bars.bars.iter().map(|b| b.skill.as_str()).collect();
                let expected: Vec<&str> = permuted.iter().map(|s| s.skill.as_str()).collect();
                assert_eq!(names, expected);
                assert_eq!(bars.bars[0].rank, 1);
            }
        }
    }

    #[test]
    fn test_bar_length_matches_potential() {
        let bars = SkillBars::new(&[skill("Rust", 35.5), skill("Typing", 120.0)]);
        assert_eq!(bars.bars[0].length, 35.5);
        assert_eq!(bars.bars[1].length, 100.0);
        assert_eq!(bars.bars[1].color, HIGH_BAR_COLOR);
    }
}
