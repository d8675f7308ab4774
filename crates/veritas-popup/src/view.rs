//! Popup view model and rendering.

use serde::Serialize;
use url::Url;
use veritas_core::{AnalysisResult, Claim, ClaimLabel, Evidence, Verdict};

/// Evidence links shown per claim. Extra entries stay in the result but are
/// not displayed.
pub const MAX_EVIDENCE_LINKS: usize = 4;

pub const STATUS_EXTRACTING: &str = "Extracting page…";
pub const STATUS_CONTACTING: &str = "Contacting Veritas…";
pub const STATUS_NOT_ENOUGH_TEXT: &str = "Couldn't extract enough text on this page.";

/// Everything the popup shows at one point in a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopupView {
    pub status: String,
    pub verdict: String,
    pub claims: Vec<ClaimView>,
}

/// One rendered claim entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimView {
    pub label: ClaimLabel,
    pub text: String,
    pub evidence: Vec<EvidenceLink>,
}

/// One rendered evidence link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceLink {
    pub href: String,
    pub label: String,
    pub stance: String,
}

impl PopupView {
    /// A view showing only a status line.
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Default::default()
        }
    }

    /// A view showing an analysis failure.
    pub fn failure(reason: &str) -> Self {
        Self::status(format!("Error: {}", reason))
    }

    /// A view of a completed analysis. The status line is cleared.
    pub fn rendered(result: &AnalysisResult) -> Self {
        Self {
            status: String::new(),
            verdict: verdict_line(&result.verdict),
            claims: result.claims.iter().map(ClaimView::from_claim).collect(),
        }
    }

    /// HTML fragment for the popup document.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str(&format!(
            "<div id=\"status\">{}</div>\n",
            escape_html(&self.status)
        ));
        html.push_str(&format!(
            "<div id=\"verdict\">{}</div>\n",
            escape_html(&self.verdict)
        ));
        html.push_str("<ul id=\"claims\">\n");
        for claim in &self.claims {
            html.push_str(&claim.to_html());
        }
        html.push_str("</ul>\n");
        html
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        if !self.status.is_empty() {
            lines.push(self.status.clone());
        }
        if !self.verdict.is_empty() {
            lines.push(self.verdict.clone());
        }
        for claim in &self.claims {
            lines.push(format!("[{}] {}", claim.label.css_class(), claim.text));
            for link in &claim.evidence {
                lines.push(format!("    {} ({}) {}", link.label, link.stance, link.href));
            }
        }
        lines.join("\n")
    }
}

impl ClaimView {
    fn from_claim(claim: &Claim) -> Self {
        Self {
            label: claim.label,
            text: claim.text.clone(),
            evidence: claim
                .evidence
                .iter()
                .take(MAX_EVIDENCE_LINKS)
                .map(EvidenceLink::from_evidence)
                .collect(),
        }
    }

    fn to_html(&self) -> String {
        let links: Vec<String> = self
            .evidence
            .iter()
            .map(|link| {
                format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a> ({})",
                    escape_html(&safe_href(&link.href)),
                    escape_html(&link.label),
                    escape_html(&link.stance)
                )
            })
            .collect();
        format!(
            "<li class=\"claim\">\n  <span class=\"badge {}\">{}</span> {}\n  <div class=\"evidence\">{}</div>\n</li>\n",
            self.label.css_class(),
            self.label.name(),
            escape_html(&self.text),
            links.join(" • ")
        )
    }
}

impl EvidenceLink {
    fn from_evidence(evidence: &Evidence) -> Self {
        let label = evidence
            .source
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| host_of(&evidence.url))
            .unwrap_or_else(|| evidence.url.clone());
        Self {
            href: evidence.url.clone(),
            label,
            stance: evidence.stance.clone(),
        }
    }
}

/// `Overall: {label} (score {score})`.
pub fn verdict_line(verdict: &Verdict) -> String {
    format!(
        "Overall: {} (score {})",
        verdict.label,
        format_score(verdict.score)
    )
}

/// Round half-up to two decimals and print without trailing zeros:
/// `0.87 → "0.87"`, `0.5 → "0.5"`, `1.0 → "1"`.
pub fn format_score(score: f64) -> String {
    let rounded = (score * 100.0 + 0.5).floor() / 100.0;
    format!("{}", rounded)
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Only http(s) links are clickable.
fn safe_href(href: &str) -> String {
    match Url::parse(href) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => href.to_string(),
        _ => "#".to_string(),
    }
}

fn escape_html(text: &str) -> String {
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

    fn evidence(url: &str, source: Option<&str>) -> Evidence {
        Evidence {
            url: url.into(),
            source: source.map(str::to_string),
            stance: "supports".into(),
        }
    }

    fn result_with(claims: Vec<Claim>) -> AnalysisResult {
        AnalysisResult {
            verdict: Verdict {
                label: "True".into(),
                score: 0.87,
            },
            claims,
        }
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0.87), "0.87");
        assert_eq!(format_score(0.5), "0.5");
        assert_eq!(format_score(1.0), "1");
        assert_eq!(format_score(0.125), "0.13");
        assert_eq!(format_score(0.33333), "0.33");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn test_verdict_line() {
        let view = PopupView::rendered(&result_with(vec![]));
        assert_eq!(view.verdict, "Overall: True (score 0.87)");
        assert!(view.status.is_empty());
    }

    #[test]
    fn test_evidence_capped_at_four() {
        let claim = Claim {
            text: "X".into(),
            label: ClaimLabel::Core,
            evidence: (0..7)
                .map(|i| evidence(&format!("https://s{}.example/", i), None))
                .collect(),
        };
        let result = result_with(vec![claim]);
        let view = PopupView::rendered(&result);
        assert_eq!(view.claims[0].evidence.len(), MAX_EVIDENCE_LINKS);
        assert_eq!(view.claims[0].evidence[3].label, "s3.example");
        // The result itself is untouched.
        assert_eq!(result.claims[0].evidence.len(), 7);
    }

    #[test]
    fn test_claim_order_preserved() {
        let claims: Vec<Claim> = ["a", "b", "c"]
            .iter()
            .map(|t| Claim {
                text: t.to_string(),
                ..Default::default()
            })
            .collect();
        let view = PopupView::rendered(&result_with(claims));
        let texts: Vec<&str> = view.claims.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_link_label_falls_back_to_host() {
        assert_eq!(
            EvidenceLink::from_evidence(&evidence("https://news.example.org/a?b=1", None)).label,
            "news.example.org"
        );
        assert_eq!(
            EvidenceLink::from_evidence(&evidence("https://news.example.org/a", Some(""))).label,
            "news.example.org"
        );
        assert_eq!(
            EvidenceLink::from_evidence(&evidence("not a url", None)).label,
            "not a url"
        );
        assert_eq!(
            EvidenceLink::from_evidence(&evidence("https://x.example", Some("Reuters"))).label,
            "Reuters"
        );
    }

    #[test]
    fn test_html_markup() {
        let claim = Claim {
            text: "X".into(),
            label: ClaimLabel::Core,
            evidence: vec![evidence("https://s.com/1", Some("S"))],
        };
        let html = PopupView::rendered(&result_with(vec![claim])).to_html();
        assert!(html.contains("<span class=\"badge core\">Core</span> X"));
        assert!(html.contains(
            "<a href=\"https://s.com/1\" target=\"_blank\" rel=\"noopener\">S</a> (supports)"
        ));
        assert_eq!(html.matches("<li class=\"claim\">").count(), 1);
    }

    #[test]
    fn test_html_escapes_remote_text() {
        let claim = Claim {
            text: "<img src=x onerror=alert(1)>".into(),
            label: ClaimLabel::Unknown,
            evidence: vec![evidence("javascript:alert(1)", Some("\"evil\""))],
        };
        let html = PopupView::rendered(&result_with(vec![claim])).to_html();
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains("href=\"#\""));
        assert!(html.contains("&quot;evil&quot;"));
    }

    #[test]
    fn test_failure_view() {
        let view = PopupView::failure("Backend error 500");
        assert_eq!(view.status, "Error: Backend error 500");
        assert!(view.claims.is_empty());
        assert!(view.verdict.is_empty());
    }

    #[test]
    fn test_text_rendering() {
        let claim = Claim {
            text: "X".into(),
            label: ClaimLabel::Disputed,
            evidence: vec![evidence("https://s.com/1", Some("S"))],
        };
        let text = PopupView::rendered(&result_with(vec![claim])).to_text();
        assert_eq!(
            text,
            "Overall: True (score 0.87)\n[disputed] X\n    S (supports) https://s.com/1"
        );
    }
}
