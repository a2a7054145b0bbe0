use std::fmt::Write;

use compute::ForecastSettings;

use super::chart::PLOTLY_JS_URL;
use crate::workflow::{ForecastView, WorkflowState};

/// Everything the page needs besides the workflow outcome.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub settings: &'a ForecastSettings,
    /// Value echoed back into the name field
    pub name: &'a str,
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the full page: the form, then at most one of warning, error or
/// forecast.
pub fn render_page(context: PageContext<'_>, state: &WorkflowState) -> String {
    let settings = context.settings;
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<h1>Commodity price forecast</h1>
<p class="description">Forecast of the {symbol} closing price for the next {horizon} business days, fitted on the last {lookback} days of daily closes.</p>
<form method="post" action="/">
  <label for="name">Your name</label>
  <input type="text" id="name" name="name" value="{name}">
  <button type="submit">Run forecast</button>
</form>
"#,
        symbol = escape_html(&settings.symbol),
        horizon = settings.horizon_days,
        lookback = settings.lookback_days,
        name = escape_html(context.name),
    );

    match state {
        WorkflowState::Idle { warning: Some(warning) } => {
            let _ = writeln!(
                body,
                r#"<div class="alert alert-warning">{}</div>"#,
                escape_html(warning)
            );
        }
        WorkflowState::Failed { message } => {
            let _ = writeln!(
                body,
                r#"<div class="alert alert-error">{}</div>"#,
                escape_html(message)
            );
        }
        WorkflowState::Succeeded(view) => render_forecast(&mut body, view),
        WorkflowState::Idle { warning: None } | WorkflowState::Running => {}
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Commodity price forecast - {symbol}</title>
<script src="{plotly}"></script>
</head>
<body>
{body}</body>
</html>
"#,
        symbol = escape_html(&settings.symbol),
        plotly = PLOTLY_JS_URL,
    )
}

fn render_forecast(body: &mut String, view: &ForecastView) {
    let _ = writeln!(body, r#"<p class="greeting">{}</p>"#, escape_html(&view.greeting));
    let _ = writeln!(
        body,
        r#"<p class="history">Historical data used: {} to {}</p>"#,
        escape_html(&view.history_start),
        escape_html(&view.history_end)
    );

    body.push_str("<table class=\"forecast\">\n<thead><tr><th>Date</th><th>Predicted close</th></tr></thead>\n<tbody>\n");
    for row in &view.rows {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(&row.date),
            escape_html(&row.value)
        );
    }
    body.push_str("</tbody>\n</table>\n");

    // Generated by plotly, not user input
    body.push_str(&view.chart_html);
    body.push('\n');
}
