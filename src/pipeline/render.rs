use std::fmt::Write;

use chrono::NaiveDate;

use super::cards::InsightCard;

const STYLE: &str = "body{margin:0;padding:0;background:#f4f6f8;\
font-family:Arial,Helvetica,sans-serif;color:#1f2933;}\
.wrap{max-width:680px;margin:0 auto;padding:24px;}\
.header{background:#1f3a5f;color:#ffffff;padding:20px 24px;border-radius:8px 8px 0 0;}\
.header h1{margin:0;font-size:22px;}\
.header p{margin:4px 0 0;font-size:13px;opacity:.8;}\
.dashboard{background:#ffffff;padding:16px 24px;}\
.dashboard img{max-width:100%;height:auto;border:1px solid #d9e2ec;}\
.cards{background:#ffffff;padding:8px 24px 16px;}\
.card{border-left:4px solid #3b82f6;background:#f8fafc;margin:12px 0;padding:12px 16px;}\
.card h2{margin:0 0 6px;font-size:16px;color:#1f3a5f;}\
.card p{margin:4px 0;font-size:14px;line-height:1.5;}\
.label{font-weight:bold;}\
.cta{background:#ffffff;padding:16px 24px 24px;border-radius:0 0 8px 8px;text-align:center;}\
.cta a{display:inline-block;background:#3b82f6;color:#ffffff;text-decoration:none;\
padding:10px 20px;border-radius:4px;}";

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    /// Content id of the inline dashboard image, without the `cid:` prefix.
    pub image_cid: Option<&'a str>,
    pub report_date: NaiveDate,
}

#[tracing::instrument(
    name = "pipeline_stage render",
    skip(cards, opts),
    fields(pipeline.stage = "render", report.cards = cards.len())
)]
pub fn render_html(dashboard_url: &str, cards: &[InsightCard], opts: &RenderOptions<'_>) -> String {
    let url = escape_html(dashboard_url);
    let mut html = String::with_capacity(4096 + cards.len() * 512);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Daily BI Insights</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"wrap\">\n");

    let _ = write!(
        html,
        "<div class=\"header\"><h1>Daily BI Insights</h1><p>{}</p></div>\n",
        opts.report_date.format("%A, %B %-d, %Y")
    );

    if let Some(cid) = opts.image_cid {
        let _ = write!(
            html,
            "<div class=\"dashboard\"><img src=\"cid:{}\" alt=\"Dashboard snapshot\"></div>\n",
            escape_html(cid)
        );
    }

    html.push_str("<div class=\"cards\">\n");
    for card in cards {
        html.push_str("<div class=\"card\">");
        let _ = write!(html, "<h2>{}</h2>", escape_html(&card.title));
        if !card.finding.is_empty() {
            let _ = write!(
                html,
                "<p><span class=\"label\">Finding:</span> {}</p>",
                escape_html(&card.finding)
            );
        }
        if !card.action.is_empty() {
            let _ = write!(
                html,
                "<p><span class=\"label\">Action:</span> {}</p>",
                escape_html(&card.action)
            );
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");

    let _ = write!(
        html,
        "<div class=\"cta\"><a href=\"{url}\">Open the live dashboard</a></div>\n"
    );
    html.push_str("</div>\n</body>\n</html>\n");

    html
}

/// Plain-text alternative for mail clients that do not render HTML.
pub fn render_plain_text(
    dashboard_url: &str,
    cards: &[InsightCard],
    report_date: NaiveDate,
) -> String {
    let mut text = format!("Daily BI Insights - {report_date}\n\n");
    for card in cards {
        let _ = writeln!(text, "{}", card.title);
        if !card.finding.is_empty() {
            let _ = writeln!(text, "  Finding: {}", card.finding);
        }
        if !card.action.is_empty() {
            let _ = writeln!(text, "  Action: {}", card.action);
        }
        text.push('\n');
    }
    let _ = writeln!(text, "Dashboard: {dashboard_url}");
    text
}
