// src/render/html.rs
//! Server-rendered single page: input form or results dashboard

use super::skills::SkillBars;
use super::view::{ResultsView, SectionKind};
use crate::session::{Mode, ViewState};

pub const RESULT_SECTION_ID: &str = "result-section";
/// The draft screenshot is fetched from here rather than inlined in the page
pub const PREVIEW_PATH: &str = "/screenshot";

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;background:#f8fafc;color:#0f172a;margin:0}
main{max-width:56rem;margin:0 auto;padding:3rem 1rem}
header.page{text-align:center;margin-bottom:2.5rem}
.card{background:#fff;border:1px solid #e2e8f0;border-radius:1.5rem;padding:2rem;margin-bottom:1.5rem}
.dark{background:#0f172a;color:#f8fafc}
.error{background:#fef2f2;border:1px solid #fee2e2;color:#dc2626;border-radius:.75rem;padding:1rem;margin:1rem 0}
.bar-track{background:#f1f5f9;border-radius:4px;height:20px}
.bar{height:20px;border-radius:0 4px 4px 0}
.skill{margin:.75rem 0}
.label{font-size:.75rem;font-weight:700;text-transform:uppercase;letter-spacing:.1em;color:#94a3b8}
button{font-weight:700;border:0;border-radius:1rem;padding:1rem 1.5rem;cursor:pointer}
button.primary{background:#4f46e5;color:#fff;width:100%}
button:disabled{background:#a5b4fc;cursor:wait}
input[type=url]{width:100%;box-sizing:border-box;padding:1rem;border:1px solid #e2e8f0;border-radius:1rem;font-size:1.1rem}
.preview{max-height:6rem;border-radius:.5rem}
"#;

const EXPORT_SCRIPT: &str = r#"
async function downloadReport(button) {
  button.disabled = true;
  try {
    const response = await fetch('/export');
    if (!response.ok) {
      const body = await response.json().catch(() => ({}));
      throw new Error(body.error || 'Failed to generate PDF');
    }
    const disposition = response.headers.get('Content-Disposition') || '';
    const match = disposition.match(/filename="([^"]+)"/);
    const blob = await response.blob();
    const link = document.createElement('a');
    link.href = URL.createObjectURL(blob);
    link.download = match ? match[1] : 'report.pdf';
    link.click();
    URL.revokeObjectURL(link.href);
  } catch (err) {
    alert(err.message);
  } finally {
    button.disabled = false;
  }
}
"#;

pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_page(state: &ViewState) -> String {
    let body = match (&state.mode, &state.last_result) {
        (Mode::Results, Some(result)) => render_results(&ResultsView::build(result), state.exporting),
        _ => render_input(state),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Will AI Take My Job?</title>
<style>{STYLE}</style>
</head>
<body>
<main>
<header class="page">
<h1>Will AI Take My Job?</h1>
<p>Get a professional AI risk assessment based on your LinkedIn presence and global industry trends.</p>
</header>
{body}
</main>
<script>{EXPORT_SCRIPT}</script>
</body>
</html>"#
    )
}

fn render_input(state: &ViewState) -> String {
    let analyzing = state.mode == Mode::Analyzing;

    let error = state
        .last_error
        .as_deref()
        .map(|e| format!(r#"<div class="error" role="alert">{}</div>"#, escape(e)))
        .unwrap_or_default();

    let preview = match &state.draft.image {
        Some(_) => format!(
            r#"<div class="screenshot"><img class="preview" alt="Preview" src="{}"><button type="submit" formaction="/screenshot/remove" formnovalidate>Remove screenshot</button></div>"#,
            PREVIEW_PATH
        ),
        None => String::new(),
    };

    let (disabled, label) = if analyzing {
        (" disabled", "Analyzing Profile...")
    } else {
        ("", "Run Assessment")
    };

    format!(
        r#"<section class="card" id="input-section">
<form method="post" action="/assess" enctype="multipart/form-data" onsubmit="this.querySelector('button.primary').disabled = true">
<label class="label" for="profile_url">LinkedIn Profile URL</label>
<input type="url" id="profile_url" name="profile_url" value="{url}" placeholder="https://www.linkedin.com/in/your-profile">
<p class="label">Optional context</p>
<input type="file" name="screenshot" accept="image/*"> <button type="submit" formaction="/screenshot" formnovalidate>Attach</button>
{preview}
<p>We use <b>Google Search</b> to analyze public profile data and current market trends.</p>
{error}
<button class="primary" type="submit"{disabled}>{label}</button>
</form>
</section>"#,
        url = escape(&state.draft.profile_url),
    )
}

fn render_results(view: &ResultsView, exporting: bool) -> String {
    let mut html = format!(r#"<div id="{}">"#, RESULT_SECTION_ID);

    for section in &view.sections {
        let export_attr = if section.exportable {
            ""
        } else {
            r#" data-export="exclude""#
        };

        let inner = match &section.kind {
            SectionKind::Header {
                name,
                role,
                industry,
            } => format!(
                r#"<h2>{}</h2><p><strong>{}</strong> &middot; <span class="label">{}</span></p>"#,
                escape(name),
                escape(role),
                escape(industry)
            ),
            SectionKind::Controls => format!(
                r#"<form method="post" action="/reset" style="display:inline"><button type="submit">New assessment</button></form> <button type="button" onclick="downloadReport(this)"{}>Download PDF</button>"#,
                if exporting { " disabled" } else { "" }
            ),
            SectionKind::Gauge(gauge) => format!(
                r#"<h3>Risk score</h3>{}<p class="risk-level" style="color:{}"><strong>{}</strong></p><p>Risk Score: {}/100</p>"#,
                gauge.to_svg(),
                gauge.color,
                escape(&gauge.level),
                gauge.score
            ),
            SectionKind::Justification(text) => format!(
                r#"<p class="label">Assessment logic</p><p>{}</p>"#,
                escape(text)
            ),
            SectionKind::Skills { bars, methodology } => render_skills(bars, methodology.as_deref()),
            SectionKind::Archetype(edge) => format!(
                r#"<p class="label">Human advantage</p><h3 class="archetype">{}</h3><p>{}</p>"#,
                escape(&edge.archetype),
                escape(&edge.explanation)
            ),
            SectionKind::Frameworks {
                strategic_advice,
                frameworks,
            } => {
                let cards: String = frameworks
                    .iter()
                    .map(|f| {
                        let items: String = f
                            .action_items
                            .iter()
                            .map(|i| format!("<li>{}</li>", escape(i)))
                            .collect();
                        format!(
                            r#"<div class="framework"><h4>{}</h4><p>{}</p><ul>{}</ul></div>"#,
                            escape(&f.name),
                            escape(&f.concept),
                            items
                        )
                    })
                    .collect();
                format!(
                    r#"<h3>Recommendation: What can you do next?</h3><blockquote>&ldquo;{}&rdquo;</blockquote>{}"#,
                    escape(strategic_advice),
                    cards
                )
            }
            SectionKind::ActionPlan(steps) => {
                let items: String = steps
                    .iter()
                    .map(|s| format!("<li>{}</li>", escape(s)))
                    .collect();
                format!(
                    r#"<h3>Immediate Roadmap</h3><ol class="action-plan">{}</ol>"#,
                    items
                )
            }
        };

        let class = match section.kind {
            SectionKind::Frameworks { .. } => "card dark",
            _ => "card",
        };
        html.push_str(&format!(
            r#"<section class="{}"{}>{}</section>"#,
            class, export_attr, inner
        ));
    }

    html.push_str("</div>");
    html
}

fn render_skills(bars: &SkillBars, methodology: Option<&str>) -> String {
    let mut html = String::from(
        r#"<h3>Top Predominant Skills</h3><p class="label">Ordered by prominence</p><div class="skills">"#,
    );

    for bar in &bars.bars {
        html.push_str(&format!(
            r#"<div class="skill" data-rank="{rank}"><span class="skill-name">{name}</span> <span>{length}%</span><div class="bar-track"><div class="bar" style="width:{length}%;background:{color}"></div></div><small>{value}</small></div>"#,
            rank = bar.rank,
            name = escape(&bar.skill),
            length = bar.length,
            color = bar.color,
            value = escape(&bar.irreplaceable_value),
        ));
    }

    html.push_str("</div>");
    if let Some(note) = methodology {
        html.push_str(&format!(r#"<p class="methodology">{}</p>"#, escape(note)));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::types::fixtures::sample_result;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_input_page_shows_error_and_draft() {
        let mut state = ViewState::default();
        state.draft.profile_url = "https://example.com".to_string();
        state.last_error = Some("Please enter a valid LinkedIn URL.".to_string());

        let html = render_page(&state);
        assert!(html.contains(r#"value="https://example.com""#));
        assert!(html.contains("Please enter a valid LinkedIn URL."));
        assert!(html.contains("Run Assessment"));
        assert!(!html.contains(RESULT_SECTION_ID));
    }

    #[test]
    fn test_analyzing_disables_submit() {
        let mut state = ViewState::default();
        state.mode = Mode::Analyzing;
        let html = render_page(&state);
        assert!(html.contains(r#"type="submit" disabled>Analyzing Profile..."#));
    }

    #[test]
    fn test_results_page_escapes_model_text() {
        let mut result = sample_result();
        result.justification = "<b>bold</b>".to_string();
        let mut state = ViewState::default();
        state.mode = Mode::Results;
        state.last_result = Some(result);

        let html = render_page(&state);
        assert!(html.contains(RESULT_SECTION_ID));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(html.contains(r#"data-export="exclude""#));
    }
}
