// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking pixel issuing and embedding.
//!
//! Mints an opaque per-email pixel identifier and the `<img>` reference a
//! recipient's mail client will fetch. The pixel image itself is a fixed
//! 1x1 transparent PNG served bit-for-bit identical on every request.

use uuid::Uuid;

/// The 1x1 transparent PNG returned for every pixel fetch.
///
/// Exact bytes are pinned by tests: clients cache on content, so the payload
/// must never drift.
pub const TRACKING_PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4, 0x89, 0x00, 0x00, 0x00,
    0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc, 0xff, 0x9f, 0xa1,
    0x1e, 0x00, 0x07, 0x82, 0x02, 0x7f, 0x3d, 0xc8, 0x48, 0xef, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// A freshly minted tracking pixel for one outbound email.
#[derive(Debug, Clone)]
pub struct TrackingPixel {
    /// Opaque identifier, unique and 1:1 with the owning email.
    pub id: String,
    /// Absolute fetch URL under the public base URL.
    pub url: String,
    /// Embeddable invisible `<img>` element referencing `url`.
    pub html: String,
}

/// Mint a new pixel under `base_url`.
pub fn issue_pixel(base_url: &str) -> TrackingPixel {
    let id = Uuid::new_v4().to_string();
    let url = format!("{}/api/track/{id}", base_url.trim_end_matches('/'));
    let html = format!(r#"<img src="{url}" width="1" height="1" style="display:none;" alt="" />"#);
    TrackingPixel { id, url, html }
}

/// Embed the pixel into an outgoing HTML body.
///
/// Inserted before `</body>` when present, else before `</html>`, else
/// appended to the content as-is.
pub fn embed_pixel(content: &str, pixel_html: &str) -> String {
    let wrapped = format!(r#"<div style="display:none;">{pixel_html}</div>"#);

    if content.contains("</body>") {
        content.replacen("</body>", &format!("{wrapped}</body>"), 1)
    } else if content.contains("</html>") {
        content.replacen("</html>", &format!("{wrapped}</html>"), 1)
    } else {
        format!("{content}{wrapped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_png_bytes_are_pinned() {
        // Decoded from the canonical base64 payload; any drift breaks
        // cache-busting assumptions downstream.
        let expected: [u8; 70] = [
            0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d,
            0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
            0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4, 0x89, 0x00, 0x00, 0x00,
            0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc, 0xff, 0x9f, 0xa1,
            0x1e, 0x00, 0x07, 0x82, 0x02, 0x7f, 0x3d, 0xc8, 0x48, 0xef, 0x00, 0x00,
            0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
        ];
        assert_eq!(TRACKING_PIXEL_PNG, expected);

        // PNG signature and a 1x1 IHDR.
        assert_eq!(&TRACKING_PIXEL_PNG[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&TRACKING_PIXEL_PNG[16..24], [0, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn issued_pixels_are_unique_and_routed() {
        let a = issue_pixel("https://track.example.com");
        let b = issue_pixel("https://track.example.com");
        assert_ne!(a.id, b.id);
        assert_eq!(a.url, format!("https://track.example.com/api/track/{}", a.id));
        assert!(a.html.contains(&a.url));
        assert!(a.html.contains(r#"width="1" height="1""#));
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let pixel = issue_pixel("https://track.example.com/");
        assert!(!pixel.url.contains("//api"));
    }

    #[test]
    fn embed_prefers_body_close_tag() {
        let content = "<html><body><p>hi</p></body></html>";
        let out = embed_pixel(content, "<img src=\"px\" />");
        assert!(out.contains("<img src=\"px\" /></div></body></html>"));
    }

    #[test]
    fn embed_falls_back_to_html_close_tag() {
        let content = "<html><p>hi</p></html>";
        let out = embed_pixel(content, "<img src=\"px\" />");
        assert!(out.ends_with("</div></html>"));
    }

    #[test]
    fn embed_appends_to_plain_content() {
        let content = "just a fragment";
        let out = embed_pixel(content, "<img src=\"px\" />");
        assert!(out.starts_with("just a fragment<div"));
        assert!(out.ends_with("</div>"));
    }
}
