// src/assessment/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SKILL_COUNT: usize = 5;
pub const FRAMEWORK_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Band policy the model is instructed to follow (0-30, 31-70, 71-100).
    pub fn for_score(score: f64) -> Self {
        if score <= 30.0 {
            Self::Low
        } else if score <= 70.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillImpact {
    pub skill: String,
    pub automation_potential: f64,
    pub irreplaceable_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanCentricEdge {
    pub archetype: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerFramework {
    pub name: String,
    pub concept: String,
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidance {
    pub strategic_advice: String,
    pub frameworks: Vec<CareerFramework>,
    pub positive_action_plan: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: String,
    pub industry: String,
    pub overall_risk: RiskLevel,
    pub risk_score: f64,
    pub justification: String,
    pub skills_analysis: Vec<SkillImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_methodology: Option<String>,
    pub human_centric_edge: HumanCentricEdge,
    pub guidance: Guidance,
}

impl AssessmentResult {
    /// Checks the parts of the response contract serde cannot express:
    /// score ranges and fixed array cardinality.
    pub fn check_contract(&self) -> Result<(), String> {
        if !in_percent_range(self.risk_score) {
            return Err(format!("riskScore {} outside [0, 100]", self.risk_score));
        }

        if self.skills_analysis.len() != SKILL_COUNT {
            return Err(format!(
                "skillsAnalysis has {} entries, expected {}",
                self.skills_analysis.len(),
                SKILL_COUNT
            ));
        }

        if let Some(skill) = self
            .skills_analysis
            .iter()
            .find(|s| !in_percent_range(s.automation_potential))
        {
            return Err(format!(
                "automationPotential {} for '{}' outside [0, 100]",
                skill.automation_potential, skill.skill
            ));
        }

        if self.guidance.frameworks.len() != FRAMEWORK_COUNT {
            return Err(format!(
                "guidance.frameworks has {} entries, expected {}",
                self.guidance.frameworks.len(),
                FRAMEWORK_COUNT
            ));
        }

        Ok(())
    }

    /// Subject name for headings and file names
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Profile")
    }
}

fn in_percent_range(value: f64) -> bool {
    value.is_finite() && (0.0..=100.0).contains(&value)
}

#[derive(Clone, PartialEq)]
pub struct ProfileImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for ProfileImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRequest {
    pub profile_url: String,
    pub image: Option<ProfileImage>,
}

impl AssessmentRequest {
    pub fn new(profile_url: impl Into<String>) -> Self {
        Self {
            profile_url: profile_url.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ProfileImage) -> Self {
        self.image = Some(image);
        self
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_result() -> AssessmentResult {
        AssessmentResult {
            name: Some("Jane Doe".to_string()),
            role: "Senior Software Engineer & AI Consultant".to_string(),
            industry: "Information Technology".to_string(),
            overall_risk: RiskLevel::Medium,
            risk_score: 48.0,
            justification: "Routine coding is increasingly automated.".to_string(),
            skills_analysis: vec![
                skill("Rust", 35.0),
                skill("System Design", 20.0),
                skill("Code Review", 55.0),
                skill("Mentoring", 10.0),
                skill("Test Automation", 80.0),
            ],
            skills_methodology: Some("Ranked by frequency and seniority.".to_string()),
            human_centric_edge: HumanCentricEdge {
                archetype: "The Systems Diplomat".to_string(),
                explanation: "Bridges people and platforms.".to_string(),
            },
            guidance: Guidance {
                strategic_advice: "Lean into architecture and mentoring.".to_string(),
                frameworks: vec![
                    framework("Ikigai"),
                    framework("Skill Stacking"),
                    framework("T-Shaped"),
                ],
                positive_action_plan: vec![
                    "Lead one design review per month".to_string(),
                    "Publish a write-up of a recent project".to_string(),
                ],
            },
        }
    }

    pub fn skill(name: &str, automation: f64) -> SkillImpact {
        SkillImpact {
            skill: name.to_string(),
            automation_potential: automation,
            irreplaceable_value: format!("Judgement in {}", name),
        }
    }

    fn framework(name: &str) -> CareerFramework {
        CareerFramework {
            name: name.to_string(),
            concept: format!("{} applied to your career", name),
            action_items: vec!["Reflect".to_string(), "Act".to_string()],
        }
    }
}
