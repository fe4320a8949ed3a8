// src/render/view.rs
//! The one results layout, as an ordered list of sections shared by the
//! HTML page and the exported document.

use crate::assessment::{AssessmentResult, CareerFramework, HumanCentricEdge};

use super::gauge::RiskGauge;
use super::skills::SkillBars;

#[derive(Debug, Clone, PartialEq)]
pub enum SectionKind {
    Header {
        name: String,
        role: String,
        industry: String,
    },
    Controls,
    Gauge(RiskGauge),
    Justification(String),
    Skills {
        bars: SkillBars,
        methodology: Option<String>,
    },
    Archetype(HumanCentricEdge),
    Frameworks {
        strategic_advice: String,
        frameworks: Vec<CareerFramework>,
    },
    ActionPlan(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// false for elements that must not appear in the downloaded document
    pub exportable: bool,
}

impl Section {
    fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            exportable: true,
        }
    }

    fn screen_only(kind: SectionKind) -> Self {
        Self {
            kind,
            exportable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub sections: Vec<Section>,
}

impl ResultsView {
    pub fn build(result: &AssessmentResult) -> Self {
        let sections = vec![
            Section::new(SectionKind::Header {
                name: result.display_name().to_string(),
                role: result.role.clone(),
                industry: result.industry.clone(),
            }),
            Section::screen_only(SectionKind::Controls),
            Section::new(SectionKind::Gauge(RiskGauge::new(
                result.risk_score,
                result.overall_risk.as_str(),
            ))),
            Section::new(SectionKind::Justification(result.justification.clone())),
            Section::new(SectionKind::Skills {
                bars: SkillBars::new(&result.skills_analysis),
                methodology: result.skills_methodology.clone(),
            }),
            Section::new(SectionKind::Archetype(result.human_centric_edge.clone())),
            Section::new(SectionKind::Frameworks {
                strategic_advice: result.guidance.strategic_advice.clone(),
                frameworks: result.guidance.frameworks.clone(),
            }),
            Section::new(SectionKind::ActionPlan(
                result.guidance.positive_action_plan.clone(),
            )),
        ];

        Self { sections }
    }

    pub fn exportable(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.exportable)
    }
}
