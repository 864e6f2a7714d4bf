// Presentation Assembly - header text + both charts in one HTML document
// Figures are embedded as JSON and drawn client-side by Plotly.js

use crate::figure::Figure;
use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::json;

const TEMPLATE_NAME: &str = "dashboard";
const TEMPLATE: &str = include_str!("../web/dashboard.html");

pub const DEFAULT_PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Static text shown above the charts
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub plotly_src: String,
}

impl Default for PageContent {
    fn default() -> Self {
        PageContent {
            title: "Global Loan Disbursement and Creditworthiness Insights".to_string(),
            subtitle: "A Comprehensive Analysis of IDA Loan Disbursements Over Time".to_string(),
            description: concat!(
                "Delve into the intricate dynamics of loan disbursements by the International ",
                "Development Association (IDA) with this interactive dashboard. ",
                "Our visualizations provide a dual perspective: the purple bubbles represent the ",
                "actual amounts disbursed to each country per year, while the choropleth map ",
                "highlights deviations from the average creditworthiness. By comparing the ratio ",
                "of loan amounts demanded versus disbursed and analyzing deviations from yearly ",
                "means, we uncover patterns of financial trustworthiness and funding efficiency ",
                "across nations. Explore the trends and outliers that define the global landscape ",
                "of loan disbursement."
            )
            .to_string(),
            plotly_src: DEFAULT_PLOTLY_SRC.to_string(),
        }
    }
}

/// JSON that can sit inside a <script> element.
/// `<` only ever occurs inside JSON strings, where \u003c is equivalent.
pub fn script_safe_json(figure: &Figure) -> Result<String> {
    let json = figure.to_json().context("Failed to serialize figure")?;
    Ok(json.replace('<', "\\u003c"))
}

/// Render the full dashboard page.
/// Text fields are HTML-escaped by the template; figures go in raw (`{{{..}}}`).
pub fn render_page(content: &PageContent, map: &Figure, line: &Figure) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars
        .register_template_string(TEMPLATE_NAME, TEMPLATE)
        .context("Failed to parse page template")?;

    let data = json!({
        "title": content.title,
        "subtitle": content.subtitle,
        "description": content.description,
        "plotly_src": content.plotly_src,
        "map_figure": script_safe_json(map)?,
        "line_figure": script_safe_json(line)?,
    });

    handlebars
        .render(TEMPLATE_NAME, &data)
        .context("Failed to render page template")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregates;
    use crate::dataset::Record;
    use crate::figure::{line_figure, map_figure, MapStyle};

    fn figures(records: &[Record]) -> (Figure, Figure) {
        let agg = Aggregates::compute(records);
        (map_figure(records, &agg, &MapStyle::default()), line_figure(&agg))
    }

    fn kenya() -> (Figure, Figure) {
        figures(&[Record::new("Kenya", 2000, 10.0, 1.0)])
    }

    #[test]
    fn test_page_contains_text_and_both_widgets() {
        let (map, line) = kenya();
        let html = render_page(&PageContent::default(), &map, &line).unwrap();

        assert!(html.contains("<h1>Global Loan Disbursement and Creditworthiness Insights</h1>"));
        assert!(html.contains("IDA Loan Disbursements Over Time"));
        assert!(html.contains("id=\"map-animation\""));
        assert!(html.contains("id=\"line-graph\""));
        assert!(html.contains(DEFAULT_PLOTLY_SRC));
        assert!(html.contains("Plotly.addFrames"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_page_text_is_html_escaped() {
        let (map, line) = kenya();
        let content = PageContent {
            title: "Loans <b>& Grants</b>".to_string(),
            description: "<script>alert(1)</script>".to_string(),
            ..PageContent::default()
        };
        let html = render_page(&content, &map, &line).unwrap();

        assert!(html.contains("<h1>Loans &lt;b&gt;&amp; Grants&lt;/b&gt;</h1>"));
        assert!(!html.contains("<b>& Grants</b>"));
        assert!(!html.contains("alert(1)</script>"));
    }

    #[test]
    fn test_embedded_json_round_trips() {
        let (map, line) = kenya();
        let html = render_page(&PageContent::default(), &map, &line).unwrap();

        let start = html.find("const mapFigure = ").unwrap() + "const mapFigure = ".len();
        let end = start + html[start..].find(";\n").unwrap();
        let embedded: serde_json::Value = serde_json::from_str(&html[start..end]).unwrap();
        let expected: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();
        assert_eq!(embedded, expected);
    }

    #[test]
    fn test_data_cannot_close_script_element() {
        let (map, line) = figures(&[Record::new("</script><b>x</b>", 2000, 10.0, 1.0)]);
        let html = render_page(&PageContent::default(), &map, &line).unwrap();

        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("\\u003c/script>"));
    }

    #[test]
    fn test_template_syntax_in_data_is_not_expanded() {
        let (map, line) = figures(&[Record::new("{{title}}", 2000, 10.0, 1.0)]);
        let content = PageContent {
            title: "Dashboard".to_string(),
            ..PageContent::default()
        };
        let html = render_page(&content, &map, &line).unwrap();

        assert!(html.contains("\"{{title}}\""));
    }
}
