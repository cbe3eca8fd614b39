//! Report document model and its HTML/PDF renderers.
//!
//! A [`ReportDocument`] is built once from an evaluation and the requested
//! tier, then handed to [`render_html`] or [`render_pdf`]. Both renderers lay
//! out the same sections, headings, paragraphs and tables.

mod document;
mod html;
mod pdf;

pub use document::{ActionGroup, DocumentSection, ReportDocument, Table, action_plan};
pub use html::render_html;
pub use pdf::render_pdf;

/// Formats an amount as whole dollars with thousands separators.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Formats a fraction as a signed whole percentage, e.g. `0.2` as `+20%`.
pub fn format_signed_percent(fraction: f64) -> String {
    format!("{:+.0}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1000.0), "$1,000");
        assert_eq!(format_currency(2_400_000.0), "$2,400,000");
        assert_eq!(format_currency(-20_000.0), "-$20,000");
    }

    #[test]
    fn test_format_signed_percent() {
        assert_eq!(format_signed_percent(0.2), "+20%");
        assert_eq!(format_signed_percent(-0.4), "-40%");
        assert_eq!(format_signed_percent(0.0), "+0%");
    }
}
