//! Listing renderer - Turns a [`ProductDraft`] into an embeddable HTML fragment.
//!
//! The output is a deterministic function of the draft, currency symbol and WhatsApp
//! language: the same inputs always produce byte-identical HTML, so a regenerated
//! listing only differs where the product did. Optional attributes that are absent
//! produce no markup at all. All user-supplied text is HTML-escaped.

use crate::core::{
    draft::ProductDraft,
    order_link::{WhatsappLanguage, order_url},
};

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Formats a price with en-US digit grouping and at most three fraction digits.
#[must_use]
pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Extracts the video id from a YouTube watch or short link.
///
/// Returns `None` for anything that is not a YouTube link or has no id.
#[must_use]
pub fn youtube_video_id(url: &str) -> Option<&str> {
    if !url.contains("youtube.com") && !url.contains("youtu.be") {
        return None;
    }
    let id = if url.contains("youtube.com/watch?v=") {
        url.split_once("v=")?.1.split('&').next()?
    } else if let Some((_, rest)) = url.split_once("youtu.be/") {
        rest.split(['?', '&']).next()?
    } else {
        return None;
    };
    (!id.is_empty()).then_some(id)
}

fn thumbnails(images: &[String]) -> String {
    images
        .iter()
        .enumerate()
        .map(|(index, url)| {
            let url = escape_html(url);
            let border = if index == 0 { "#28a745" } else { "transparent" };
            format!(
                r#"
    <img src="{url}" style="width:60px;height:60px;border-radius:8px;cursor:pointer;border:3px solid {border};transition:all 0.3s ease;object-fit:cover;" onclick="changeMainImage(this, '{url}')">"#
            )
        })
        .collect()
}

fn price_block(draft: &ProductDraft, currency: &str) -> String {
    let currency = escape_html(currency);
    match draft.active_offer() {
        Some(offer) => format!(
            r#"<span style="text-decoration:line-through;color:#aaa;margin-right:6px;">{currency}{}</span><span style="color:red;font-weight:bold;">{currency}{}</span><small style="color:limegreen;">(-{}%)</small>"#,
            format_price(draft.price),
            format_price(offer),
            draft.discount_percent()
        ),
        None => format!(
            r#"<span style="color:red;font-weight:bold;">{currency}{}</span>"#,
            format_price(draft.price)
        ),
    }
}

fn attribute_rows(draft: &ProductDraft) -> String {
    let rows = [
        ("Code", Some(draft.code.as_str()).filter(|code| !code.is_empty())),
        ("Unit", draft.unit.as_deref()),
        ("Quantity", draft.qty.as_deref()),
        ("Brand", draft.brand.as_deref()),
        ("Size", draft.size.as_deref()),
        ("Color", draft.color.as_deref()),
        ("Status", draft.status.as_deref()),
        ("Category", draft.category.as_deref()),
        ("Delivery Time", draft.delivery.as_deref()),
    ];

    let standard = rows
        .into_iter()
        .filter_map(|(label, value)| value.map(|value| (label.to_string(), value)));
    let custom = draft
        .custom_fields
        .iter()
        .map(|field| (escape_html(&field.key), field.value.as_str()));

    standard
        .chain(custom)
        .map(|(label, value)| {
            format!(
                "\n    <li><strong>{label}:</strong> {}</li>",
                escape_html(value)
            )
        })
        .collect()
}

fn video_embed(video: Option<&str>) -> String {
    let Some(id) = video.and_then(youtube_video_id) else {
        return String::new();
    };
    format!(
        r#"
  <div style="margin:20px auto;padding:15px;background:#f5f5f5;border-radius:10px;max-width:500px;">
    <h3 style="margin:0 0 10px 0;color:#333;">Product Video</h3>
    <div style="position:relative;padding-bottom:56.25%;height:0;overflow:hidden;">
      <iframe src="https://www.youtube.com/embed/{}" style="position:absolute;top:0;left:0;width:100%;height:100%;border:none;border-radius:8px;" allowfullscreen></iframe>
    </div>
  </div>"#,
        escape_html(id)
    )
}

fn description(desc: Option<&str>) -> String {
    desc.map(|desc| {
        format!(
            r#"
  <div style="border:1px solid #eee;padding:15px;border-radius:10px;max-width:500px;margin:auto;margin-bottom:20px;"><p style="margin:0;"><strong>Description:</strong><br>{}</p></div>"#,
            escape_html(desc)
        )
    })
    .unwrap_or_default()
}

/// Renders the embeddable HTML for `draft`.
#[must_use]
pub fn render(draft: &ProductDraft, currency: &str, language: WhatsappLanguage) -> String {
    let main_image = escape_html(draft.main_image().unwrap_or_default());
    let sale = draft
        .active_offer()
        .map(|offer| offer.to_string())
        .unwrap_or_default();
    let escaped_currency = escape_html(currency);

    format!(
        r##"<div style="text-align:center;">
  <img id="mainImg" src="{main_image}" style="width:100%;max-width:500px;border-radius:10px;border:1px solid #ccc;margin-bottom:10px;">
  <div id="thumbs" style="display:flex;justify-content:center;gap:8px;flex-wrap:wrap;margin-bottom:10px;">{thumbs}
  </div>

  <h2 style="margin:5px 0;">{name}</h2>
  <p style="font-size:18px;">{price}</p>

  <div style="margin:20px 0;">
    <a href="{order}" target="_blank" style="display:inline-block;background:linear-gradient(135deg, #25D366, #128C7E);color:#fff;padding:14px 32px;border-radius:50px;font-weight:bold;font-size:17px;text-decoration:none;box-shadow:0 4px 10px rgba(0,0,0,0.15);">Order Now</a>
  </div>
  <ul style="list-style:none;padding:0;margin:15px auto;text-align:left;max-width:500px;">{rows}
  </ul>{desc}{video}

  <p style="display:none;"><a href="#">{{getProduct}} $price={{{currency}{raw_price}}} $sale={{{sale_currency}{sale}}} $style={{1}}</a></p>
</div>

<script>
function changeMainImage(thumb, src) {{
  document.getElementById('mainImg').src = src;
  document.querySelectorAll('#thumbs img').forEach(img => img.style.border = '3px solid transparent');
  thumb.style.border = '3px solid #28a745';
}}
</script>"##,
        thumbs = thumbnails(&draft.images),
        name = escape_html(&draft.name),
        price = price_block(draft, currency),
        order = escape_html(&order_url(draft, currency, language)),
        rows = attribute_rows(draft),
        desc = description(draft.desc.as_deref()),
        video = video_embed(draft.video.as_deref()),
        currency = &escaped_currency,
        raw_price = draft.price,
        sale_currency = if sale.is_empty() { "" } else { escaped_currency.as_str() },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_draft;

    #[test]
    fn test_render_is_deterministic() {
        let draft = sample_draft(1);
        let first = render(&draft, "৳", WhatsappLanguage::Bn);
        let second = render(&draft.clone(), "৳", WhatsappLanguage::Bn);
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_shows_discount_and_grouped_prices() {
        let mut draft = sample_draft(1);
        draft.price = 1000.0;
        draft.offer = Some(750.0);
        let html = render(&draft, "৳", WhatsappLanguage::En);
        assert!(html.contains("৳1,000</span>"));
        assert!(html.contains("৳750</span>"));
        assert!(html.contains("(-25%)"));
        assert!(html.contains("$price={৳1000} $sale={৳750}"));
    }

    #[test]
    fn test_render_omits_absent_fields() {
        let mut draft = sample_draft(1);
        draft.offer = None;
        draft.brand = None;
        draft.desc = None;
        draft.custom_fields.clear();
        let html = render(&draft, "$", WhatsappLanguage::En);
        assert!(!html.contains("Brand:"));
        assert!(!html.contains("Description:"));
        assert!(!html.contains("line-through"));
        assert!(!html.contains("Product Video"));
        assert!(html.contains("$sale={}"));
    }

    #[test]
    fn test_zero_offer_renders_as_regular_price() {
        let mut draft = sample_draft(1);
        draft.offer = Some(0.0);
        let html = render(&draft, "৳", WhatsappLanguage::En);
        assert!(!html.contains("(-100%)"));
        assert!(!html.contains("line-through"));
        assert!(html.contains("$sale={}"));
        assert!(html.contains("Price%3A%20%E0%A7%B31000%0A"));
    }

    #[test]
    fn test_thumbnails_follow_image_order() {
        let draft = sample_draft(1);
        let html = render(&draft, "৳", WhatsappLanguage::En);
        let first = html.find("changeMainImage(this, 'https://example.com/front.jpg')");
        let second = html.find("changeMainImage(this, 'https://example.com/back.jpg')");
        assert!(first.is_some() && second.is_some());
        assert!(first < second);
        assert!(html.contains(r#"<img id="mainImg" src="https://example.com/front.jpg""#));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut draft = sample_draft(1);
        draft.name = "<script>alert('x')</script>".to_string();
        let html = render(&draft, "৳", WhatsappLanguage::En);
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn test_youtube_video_id() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_video_id("https://vimeo.com/12345"), None);
        assert_eq!(youtube_video_id("https://www.youtube.com/channel/xyz"), None);
    }

    #[test]
    fn test_render_embeds_youtube_player() {
        let mut draft = sample_draft(1);
        draft.video = Some("https://youtu.be/dQw4w9WgXcQ".to_string());
        let html = render(&draft, "৳", WhatsappLanguage::En);
        assert!(html.contains("https://www.youtube.com/embed/dQw4w9WgXcQ"));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1000.0), "1,000");
        assert_eq!(format_price(1_234_567.5), "1,234,567.5");
        assert_eq!(format_price(99.999), "99.999");
        assert_eq!(format_price(12.0), "12");
        assert_eq!(format_price(0.25), "0.25");
    }
}
