//! Briefing card shown before a mission starts.

use anyhow::Result;
use minijinja::{Environment, context};

use crate::mission::Mission;

const CARD_TEMPLATE: &str = include_str!("templates/card.txt");

/// Template engine wrapper around minijinja.
pub struct CardRenderer {
    env: Environment<'static>,
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CardRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("card", CARD_TEMPLATE)
            .expect("card template should be valid");
        Self { env }
    }

    /// Render the card. `location` is the learner's starting directory, if known.
    pub fn render(
        &self,
        mission: &Mission,
        location: Option<&str>,
        show_hint: bool,
    ) -> Result<String> {
        let title = if mission.title.is_empty() {
            mission.id.as_str()
        } else {
            mission.title.as_str()
        };
        let template = self.env.get_template("card")?;
        let rendered = template.render(context! {
            title => title,
            id => &mission.id,
            level => mission.level,
            skill => &mission.skill_id,
            briefing => mission.briefing.trim(),
            location => location,
            hint => (show_hint && !mission.hint.trim().is_empty()).then(|| mission.hint.trim()),
        })?;
        Ok(rendered)
    }
}
