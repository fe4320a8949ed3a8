// src/render/typst.rs
//! Typst source for the exported report. Only exportable sections are emitted.

use super::view::{ResultsView, SectionKind};

const PAGE_SETUP: &str = r#"#set page(width: 210mm, height: auto, margin: 16mm)
#set text(size: 10pt)
#set par(justify: false)
"#;

/// Typst string literal
fn lit(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    out.push('"');
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn bar(length: f64, color: &str) -> String {
    format!(
        "#block(width: 100%, height: 10pt, fill: rgb(\"#f1f5f9\"), radius: 4pt, box(width: {:.1}%, height: 10pt, fill: rgb({}), radius: 4pt))\n",
        length,
        lit(color)
    )
}

fn list_of(items: &[String], numbered: bool) -> String {
    if items.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = items.iter().map(|i| lit(i)).collect();
    format!(
        "#{}({})\n",
        if numbered { "enum" } else { "list" },
        joined.join(", ")
    )
}

pub fn render_document(view: &ResultsView, generated_at: &str) -> String {
    let mut doc = String::from(PAGE_SETUP);

    for section in view.exportable() {
        match &section.kind {
            SectionKind::Header {
                name,
                role,
                industry,
            } => {
                doc.push_str(&format!(
                    "#text(size: 22pt, weight: \"bold\", {})\n\n#text(size: 12pt, weight: \"bold\", fill: rgb(\"#4f46e5\"), {}) #h(6pt) #text(fill: rgb(\"#64748b\"), upper({}))\n\n",
                    lit(name),
                    lit(role),
                    lit(industry)
                ));
            }
            SectionKind::Controls => {}
            SectionKind::Gauge(gauge) => {
                doc.push_str("#heading(level: 2, \"Risk score\")\n");
                doc.push_str(&format!(
                    "#text(size: 16pt, weight: \"bold\", fill: rgb({}), {}) #h(8pt) #text({})\n\n",
                    lit(gauge.color),
                    lit(&gauge.level),
                    lit(&format!("Risk Score: {}/100", gauge.score))
                ));
                doc.push_str(&bar(gauge.score, gauge.color));
            }
            SectionKind::Justification(text) => {
                doc.push_str(&format!(
                    "#heading(level: 3, \"Assessment logic\")\n#text({})\n\n",
                    lit(text)
                ));
            }
            SectionKind::Skills { bars, methodology } => {
                doc.push_str("#heading(level: 2, \"Top Predominant Skills\")\n");
                for skill in &bars.bars {
                    doc.push_str(&format!(
                        "#text(weight: \"bold\", {}) #h(4pt) #text(fill: rgb(\"#64748b\"), {})\n",
                        lit(&format!("{}. {}", skill.rank, skill.skill)),
                        lit(&format!("{}% automation potential", skill.length))
                    ));
                    doc.push_str(&bar(skill.length, skill.color));
                    doc.push_str(&format!(
                        "#text(size: 9pt, {})\n\n",
                        lit(&skill.irreplaceable_value)
                    ));
                }
                if let Some(note) = methodology {
                    doc.push_str(&format!("#emph({})\n\n", lit(note)));
                }
            }
            SectionKind::Archetype(edge) => {
                doc.push_str(&format!(
                    "#heading(level: 2, \"Human advantage\")\n#text(size: 16pt, weight: \"bold\", {})\n\n#text({})\n\n",
                    lit(&edge.archetype),
                    lit(&edge.explanation)
                ));
            }
            SectionKind::Frameworks {
                strategic_advice,
                frameworks,
            } => {
                doc.push_str("#heading(level: 2, \"What can you do next?\")\n");
                doc.push_str(&format!("#quote(block: true, {})\n", lit(strategic_advice)));
                for framework in frameworks {
                    doc.push_str(&format!(
                        "#heading(level: 3, {})\n#text({})\n\n",
                        lit(&framework.name),
                        lit(&framework.concept)
                    ));
                    doc.push_str(&list_of(&framework.action_items, false));
                }
            }
            SectionKind::ActionPlan(steps) => {
                doc.push_str("#heading(level: 2, \"Immediate Roadmap\")\n");
                doc.push_str(&list_of(steps, true));
            }
        }
    }

    doc.push_str(&format!(
        "\n#line(length: 100%, stroke: 0.5pt + rgb(\"#e2e8f0\"))\n#text(size: 8pt, fill: rgb(\"#94a3b8\"), {})\n",
        lit(&format!("Generated {}", generated_at))
    ));

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::types::fixtures::sample_result;

    #[test]
    fn test_lit_escapes_quotes_and_backslashes() {
        assert_eq!(lit(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
        assert_eq!(lit("a\nb"), r#""a\nb""#);
    }

    #[test]
    fn test_document_contains_exportable_sections_only() {
        let view = ResultsView::build(&sample_result());
        let doc = render_document(&view, "2026-01-01");

        assert!(doc.starts_with("#set page("));
        assert!(doc.contains("\"Jane Doe\""));
        assert!(doc.contains("\"The Systems Diplomat\""));
        assert!(doc.contains("Immediate Roadmap"));
        assert!(doc.contains("Generated 2026-01-01"));
        assert!(!doc.contains("New assessment"));
        assert!(!doc.contains("Download PDF"));
    }

    #[test]
    fn test_skills_keep_order() {
        let view = ResultsView::build(&sample_result());
        let doc = render_document(&view, "today");
        let first = doc.find("1. Rust").unwrap();
        let last = doc.find("5. Test Automation").unwrap();
        assert!(first < last);
    }
}
