//! Standalone HTML page for a rendered document.
//!
//! The page needs no scripts: long overviews use `<details>` for the
//! expand/collapse, and the refresh hint is a meta tag.

use crate::domain::{Card, Description, RenderedDocument, Section};

const STYLESHEET: &str = r#"
    body {
      margin: 0;
      padding: 20px;
      background: #111;
      color: #fff;
      font-family: system-ui, sans-serif;
    }
    h1 {
      text-align: center;
      font-size: 2em;
      margin-bottom: 40px;
    }
    h2 {
      font-size: 1.5em;
      margin-top: 40px;
      margin-bottom: 20px;
      border-bottom: 1px solid #333;
      padding-bottom: 5px;
    }
    .grid {
      display: flex;
      flex-wrap: wrap;
      justify-content: center;
      gap: 20px;
    }
    .card {
      background: #1f1f1f;
      border-radius: 12px;
      overflow: hidden;
      width: 180px;
      max-width: 100%;
      display: flex;
      flex-direction: column;
      box-shadow: 0 4px 10px rgba(0,0,0,0.5);
      transition: transform 0.2s ease;
    }
    .card:hover {
      transform: scale(1.05);
    }
    .card img {
      width: 100%;
      height: auto;
      display: block;
    }
    .card h3 {
      padding: 10px 10px 0;
      font-size: 15px;
      color: #eee;
      text-align: center;
      word-wrap: break-word;
      line-height: 1.4;
    }
    .details, .meta {
      padding: 4px 10px;
      font-size: 12px;
      color: #aaa;
      text-align: center;
      font-style: italic;
    }
    .genres {
      display: flex;
      flex-wrap: wrap;
      justify-content: center;
      gap: 4px;
      padding: 4px 10px;
    }
    .genre {
      background: #333;
      border-radius: 8px;
      padding: 2px 8px;
      font-size: 11px;
      color: #ddd;
    }
    .season-name {
      padding: 2px 10px;
      font-size: 12px;
      color: #ffc107;
      text-align: center;
      font-weight: bold;
    }
    .description, .no-description {
      padding: 6px 10px;
      font-size: 13px;
      color: #ccc;
      text-align: center;
      line-height: 1.4;
      word-wrap: break-word;
    }
    .description summary {
      cursor: pointer;
      list-style: none;
    }
    .no-description {
      color: #888;
      font-style: italic;
    }
    .no-description a {
      color: #4fc3f7;
      margin: 0 4px;
    }
    @media (max-width: 600px) {
      .card {
        width: 100%;
      }
    }
"#;

/// Render a document as a complete HTML page
pub fn to_html(document: &RenderedDocument) -> String {
    let title = escape(&document.title);

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str(&format!(
        "  <meta http-equiv=\"refresh\" content=\"{}\">\n",
        document.refresh_seconds
    ));
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("  <title>{}</title>\n", title));
    html.push_str("  <style>");
    html.push_str(STYLESHEET);
    html.push_str("  </style>\n</head>\n<body>\n");
    html.push_str(&format!("  <h1>{}</h1>\n", title));

    for section in &document.sections {
        push_section(&mut html, section);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn push_section(html: &mut String, section: &Section) {
    html.push_str(&format!(
        "  <h2 id=\"{}\">{}</h2>\n",
        section.kind.as_str().to_lowercase(),
        escape(&section.heading)
    ));
    html.push_str("  <div class=\"grid\">\n");
    for card in &section.cards {
        push_card(html, card);
    }

    html.push_str("  </div>\n");
}

fn push_card(html: &mut String, card: &Card) {
    let title = escape(&card.title);

    html.push_str(&format!("    <div class=\"card\" data-id=\"{}\">\n", escape(&card.id)));
    html.push_str(&format!(
        "      <img src=\"{}\" alt=\"{}\" loading=\"lazy\">\n",
        escape(&card.poster.url),
        title
    ));
    html.push_str(&format!("      <h3>{}</h3>\n", title));

    if let Some(season_name) = &card.season_name {
        html.push_str(&format!(
            "      <div class=\"season-name\">{}</div>\n",
            escape(season_name)
        ));
    }

    push_description(html, &card.description);

    if !card.genres.is_empty() {
        html.push_str("      <div class=\"genres\">");
        for genre in &card.genres {
            html.push_str(&format!("<span class=\"genre\">{}</span>", escape(genre)));
        }
        html.push_str("</div>\n");
    }

    if let Some(details) = &card.details {
        html.push_str(&format!("      <div class=\"details\">{}</div>\n", escape(details)));
    }

    let meta: Vec<String> = [
        card.runtime.clone(),
        card.rating.as_ref().map(|r| format!("★ {}", r)),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !meta.is_empty() {
        html.push_str(&format!(
            "      <div class=\"meta\">{}</div>\n",
            escape(&meta.join(" · "))
        ));
    }

    html.push_str("    </div>\n");
}

fn push_description(html: &mut String, description: &Description) {
    match description {
        Description::Overview {
            short,
            full,
            truncated: true,
        } => {
            html.push_str(&format!(
                "      <details class=\"description\"><summary>{}</summary>{}</details>\n",
                escape(short),
                escape(full)
            ));
        }
        Description::Overview { full, .. } => {
            html.push_str(&format!(
                "      <div class=\"description\">{}</div>\n",
                escape(full)
            ));
        }
        Description::Missing { links } => {
            html.push_str("      <div class=\"no-description\">No description available.");
            for link in links {
                html.push_str(&format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
                    escape(&link.url),
                    escape(&link.label)
                ));
            }
            html.push_str("</div>\n");
        }
    }
}

/// Escape text for element content and double-quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Link, MediaKind, PosterRef};

    fn card(title: &str, description: Description) -> Card {
        Card {
            id: "i1".to_string(),
            title: title.to_string(),
            poster: PosterRef {
                item_id: "i1".to_string(),
                from_series: false,
                url: "http://jf/Items/i1/Images/Primary?api_key=k&x=1".to_string(),
            },
            season_name: None,
            details: Some("Year: 1995".to_string()),
            runtime: Some("2h 50m".to_string()),
            rating: Some("8.3".to_string()),
            genres: vec!["Crime".to_string(), "Drama".to_string()],
            description,
        }
    }

    fn document(cards: Vec<Card>) -> RenderedDocument {
        RenderedDocument {
            title: "Latest <Media>".to_string(),
            refresh_seconds: 45,
            sections: MediaKind::ALL
                .iter()
                .map(|k| Section {
                    kind: *k,
                    heading: k.heading().to_string(),
                    cards: if *k == MediaKind::Movie { cards.clone() } else { Vec::new() },
                })
                .collect(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_page_has_refresh_and_all_headings() {
        let html = to_html(&document(Vec::new()));

        assert!(html.contains(r#"<meta http-equiv="refresh" content="45">"#));
        assert!(html.contains("<title>Latest &lt;Media&gt;</title>"));
        assert!(html.contains(r#"<h2 id="movie">Movies</h2>"#));
        assert!(html.contains(r#"<h2 id="series">Series</h2>"#));
        assert!(html.contains(r#"<h2 id="episode">Episodes</h2>"#));
    }

    #[test]
    fn test_empty_section_has_empty_body() {
        let html = to_html(&document(Vec::new()));

        assert_eq!(html.matches("  <div class=\"grid\">\n  </div>\n").count(), 3);
        assert!(!html.contains("class=\"card\""));
    }

    #[test]
    fn test_card_markup() {
        let description = Description::Overview {
            short: "A heist.".to_string(),
            full: "A heist.".to_string(),
            truncated: false,
        };
        let html = to_html(&document(vec![card("Heat", description)]));

        assert!(html.contains("api_key=k&amp;x=1"));
        assert!(html.contains(r#"<span class="genre">Crime</span><span class="genre">Drama</span>"#));
        assert!(html.contains(r#"<div class="description">A heist.</div>"#));
        assert!(html.contains(r#"<div class="details">Year: 1995</div>"#));
        assert!(html.contains("2h 50m · ★ 8.3"));
        assert!(!html.contains("<details"));
    }

    #[test]
    fn test_truncated_overview_uses_details() {
        let description = Description::Overview {
            short: "Short...".to_string(),
            full: "Short and then the rest".to_string(),
            truncated: true,
        };
        let html = to_html(&document(vec![card("Heat", description)]));

        assert!(html.contains(
            r#"<details class="description"><summary>Short...</summary>Short and then the rest</details>"#
        ));
    }

    #[test]
    fn test_missing_description_notice_and_links() {
        let description = Description::Missing {
            links: vec![Link::new("IMDb", "https://www.imdb.com/title/tt1/")],
        };
        let html = to_html(&document(vec![card("Heat", description)]));

        assert!(html.contains("No description available."));
        assert!(html.contains(r#"<a href="https://www.imdb.com/title/tt1/" target="_blank" rel="noopener">IMDb</a>"#));
        assert!(!html.contains(r#"class="description""#));
    }
}
