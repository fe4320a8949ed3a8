// src/render/mod.rs
pub mod gauge;
pub mod html;
pub mod skills;
pub mod typst;
pub mod view;

pub use gauge::{color_for_level, RiskGauge};
pub use skills::{bar_color, SkillBar, SkillBars};
pub use view::{ResultsView, Section, SectionKind};
