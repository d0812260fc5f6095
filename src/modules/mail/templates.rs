//! Mail templates (Jinja2 syntax) compiled into the binary from `templates/mail/`.

use std::sync::OnceLock;

use minijinja::{Environment, Value};
use thiserror::Error;

pub const PASSWORD_GENERATED: &str = "password_generated.html.jinja";
pub const DOCUMENT_SENT: &str = "document_sent.html.jinja";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    for (name, source) in [
        (
            PASSWORD_GENERATED,
            include_str!("../../../templates/mail/password_generated.html.jinja"),
        ),
        (
            DOCUMENT_SENT,
            include_str!("../../../templates/mail/document_sent.html.jinja"),
        ),
    ] {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load mail template {}: {}", name, e);
        }
    }
    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a mail template. The `.html.jinja` names turn on HTML autoescaping for every value.
pub fn render_template(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_render_password_generated() {
        let html = render_template(
            PASSWORD_GENERATED,
            context! {
                nom => "Kouassi",
                prenom => "Awa",
                email => "awa@example.com",
                password => "Xy7pQ2rT",
                login_url => "https://docs.example.com/",
            },
        )
        .unwrap();

        assert!(html.contains("Awa Kouassi"));
        assert!(html.contains("Xy7pQ2rT"));
        assert!(html.contains("docs.example.com"));
    }

    #[test]
    fn test_render_document_sent_without_optional_values() {
        let html = render_template(
            DOCUMENT_SENT,
            context! { body => "Voici le rapport", document_name => "rapport.pdf", sender_name => "Awa" },
        )
        .unwrap();
        assert!(html.contains("Voici le rapport"));
        assert!(html.contains("rapport.pdf"));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render_template(
            DOCUMENT_SENT,
            context! { body => "<script>x</script>", document_name => "a.pdf", sender_name => "B" },
        )
        .unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_unknown_template() {
        let err = render_template("missing.jinja", context! {}).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }
}
