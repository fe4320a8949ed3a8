// src/assessment/schema.rs
//! Output schema declared to the generation service (OpenAPI subset used by Gemini)

use serde_json::{json, Value};

use super::types::{FRAMEWORK_COUNT, SKILL_COUNT};

pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "role": { "type": "STRING" },
            "industry": { "type": "STRING" },
            "overallRisk": { "type": "STRING", "enum": ["Low", "Medium", "High"] },
            "riskScore": { "type": "NUMBER" },
            "justification": { "type": "STRING" },
            "skillsAnalysis": {
                "type": "ARRAY",
                "minItems": SKILL_COUNT,
                "maxItems": SKILL_COUNT,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "skill": { "type": "STRING" },
                        "automationPotential": { "type": "NUMBER" },
                        "irreplaceableValue": { "type": "STRING" }
                    },
                    "required": ["skill", "automationPotential", "irreplaceableValue"]
                }
            },
            "skillsMethodology": { "type": "STRING" },
            "humanCentricEdge": {
                "type": "OBJECT",
                "properties": {
                    "archetype": { "type": "STRING" },
                    "explanation": { "type": "STRING" }
                },
                "required": ["archetype", "explanation"]
            },
            "guidance": {
                "type": "OBJECT",
                "properties": {
                    "strategicAdvice": { "type": "STRING" },
                    "frameworks": {
                        "type": "ARRAY",
                        "minItems": FRAMEWORK_COUNT,
                        "maxItems": FRAMEWORK_COUNT,
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "name": { "type": "STRING" },
                                "concept": { "type": "STRING" },
                                "actionItems": { "type": "ARRAY", "items": { "type": "STRING" } }
                            },
                            "required": ["name", "concept", "actionItems"]
                        }
                    },
                    "positiveActionPlan": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["strategicAdvice", "frameworks", "positiveActionPlan"]
            }
        },
        "required": [
            "name", "role", "industry", "overallRisk", "riskScore", "justification",
            "skillsAnalysis", "skillsMethodology", "humanCentricEdge", "guidance"
        ]
    })
}
