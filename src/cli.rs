// src/cli.rs
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::assessment::{AssessmentResult, AssessmentService, GeminiClient};
use crate::config::AppConfig;
use crate::export::{Exporter, TypstRenderer};
use crate::image_validator::ImageValidator;
use crate::session::{ExportOutcome, SessionController, SubmitOutcome};

#[derive(Parser)]
#[command(name = "career-risk")]
#[command(version, about = "Assess how exposed a LinkedIn profile is to AI automation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the web server (default)
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Assess one profile and print the report
    Assess {
        url: String,
        /// Screenshot of the profile, used as the primary source
        #[arg(long)]
        screenshot: Option<PathBuf>,
        /// Also write the PDF report into this directory
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Print the raw assessment JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_assess_command(
    config: &AppConfig,
    url: String,
    screenshot: Option<PathBuf>,
    pdf: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let client = GeminiClient::new(config.gemini.clone())?;
    let service: Arc<dyn AssessmentService> = Arc::new(client);
    let controller = SessionController::new(service, config.host_matching);

    let image = match screenshot {
        Some(path) => Some(
            ImageValidator::read_upload(&path)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({})", e.message, e.suggestion))?,
        ),
        None => None,
    };

    let submit = controller.submit(&url, image);
    tokio::pin!(submit);
    let outcome = tokio::select! {
        outcome = &mut submit => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling assessment");
            controller.cancel().await;
            submit.await
        }
    };

    let result = match outcome {
        SubmitOutcome::Completed(result) => result,
        SubmitOutcome::Rejected(e) => bail!("{}", e),
        SubmitOutcome::Failed(e) => {
            return Err(anyhow::Error::new(e).context(crate::errors::ANALYSIS_FAILED_MESSAGE))
        }
        SubmitOutcome::Ignored => bail!("Assessment did not start"),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize assessment")?
        );
    } else {
        print!("{}", text_report(&result));
    }

    if let Some(dir) = pdf {
        let exporter = Arc::new(Exporter::new(
            Box::new(
                TypstRenderer::new(config.typst_bin.clone()).with_timeout(config.export_timeout),
            ),
            config.report_prefix.clone(),
        ));
        match controller.export_requested(exporter).await {
            ExportOutcome::Completed(document) => {
                tokio::fs::create_dir_all(&dir)
                    .await
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                let path = dir.join(&document.filename);
                tokio::fs::write(&path, &document.bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("PDF report written to {}", path.display());
            }
            ExportOutcome::Failed(e) => {
                return Err(anyhow::Error::new(e).context("Failed to generate PDF"))
            }
            ExportOutcome::Ignored => bail!("Nothing to export"),
        }
    }

    Ok(())
}

/// Plain-text rendition of the dashboard for terminals
pub fn text_report(result: &AssessmentResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.display_name());
    let _ = writeln!(out, "{} / {}", result.role, result.industry);
    let _ = writeln!(
        out,
        "\nRisk: {} ({}/100)\n{}",
        result.overall_risk, result.risk_score, result.justification
    );

    let _ = writeln!(out, "\nSkills");
    for (i, skill) in result.skills_analysis.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<28} {:>5.1}%  {}",
            i + 1,
            skill.skill,
            skill.automation_potential,
            skill.irreplaceable_value
        );
    }
    if let Some(methodology) = &result.skills_methodology {
        let _ = writeln!(out, "  ({})", methodology);
    }

    let _ = writeln!(
        out,
        "\nHuman advantage: {}\n{}",
        result.human_centric_edge.archetype, result.human_centric_edge.explanation
    );

    let _ = writeln!(out, "\nStrategy\n{}", result.guidance.strategic_advice);
    for framework in &result.guidance.frameworks {
        let _ = writeln!(out, "\n  {}: {}", framework.name, framework.concept);
        for item in &framework.action_items {
            let _ = writeln!(out, "    - {}", item);
        }
    }

    let _ = writeln!(out, "\nAction plan");
    for step in &result.guidance.positive_action_plan {
        let _ = writeln!(out, "  - {}", step);
    }
    out
}
