use chrono::NaiveDate;
use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[derive(Serialize)]
struct SystemContext {
    current_date: String,
}

/// Render the assistant's system prompt for the given calendar date
pub fn system_prompt(today: NaiveDate) -> Result<String, TeraError> {
    let context = SystemContext {
        current_date: today.format("%Y-%m-%d").to_string(),
    };
    load_prompt(SYSTEM_TEMPLATE, &context)
}
