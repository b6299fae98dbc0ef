//! Completion certificates.
//!
//! The certificate is drawn on a fixed-size canvas, scaled to the width of
//! an A4 page, and split across as many pages as its scaled height needs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use campus_core::model::CertificateData;

use crate::html::html_escape;

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Vertical offsets at which to place a tall image so that each page shows
/// the next `page_height` slice of it.
///
/// The first page is at offset `0`; every further page shifts the image up
/// by one page height, until the height still left to show is no longer
/// positive. Degenerate sizes produce a single page.
pub fn slice_into_pages(image_height: f64, page_height: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    if !(image_height > 0.0) || !(page_height > 0.0) {
        return offsets;
    }
    let mut remaining = image_height - page_height;
    let mut position = 0.0;
    while remaining > 0.0 {
        position -= page_height;
        offsets.push(position);
        remaining -= page_height;
    }
    offsets
}

/// Size of the canvas the certificate is drawn on, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CertificateLayout {
    pub canvas_width_px: f64,
    pub canvas_height_px: f64,
}

impl Default for CertificateLayout {
    /// A landscape A4 sheet at 96 dpi.
    fn default() -> Self {
        Self {
            canvas_width_px: 1123.0,
            canvas_height_px: 794.0,
        }
    }
}

impl CertificateLayout {
    /// Height of the canvas once scaled to the page width.
    pub fn image_height_mm(&self) -> f64 {
        if self.canvas_width_px <= 0.0 {
            return 0.0;
        }
        self.canvas_height_px * A4_WIDTH_MM / self.canvas_width_px
    }

    /// Page offsets in millimetres.
    pub fn page_offsets(&self) -> Vec<f64> {
        slice_into_pages(self.image_height_mm(), A4_HEIGHT_MM)
    }
}

/// `{learner}_{Course_Title}_Certificate.html`
pub fn certificate_file_name(data: &CertificateData) -> String {
    let title = if data.course_title.trim().is_empty() {
        "Course".to_string()
    } else {
        data.course_title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
    };
    let name = format!("{}_{}_Certificate.html", data.learner_name.trim(), title);
    name.replace(['/', '\\'], "_")
}

fn certificate_body(data: &CertificateData) -> String {
    format!(
        concat!(
            "<div class=\"frame\">\n",
            "<h1>Certificate of Completion</h1>\n",
            "<p class=\"lead\">This is to certify that</p>\n",
            "<p class=\"name\">{name}</p>\n",
            "<p class=\"lead\">has successfully completed the course</p>\n",
            "<p class=\"course\">{course}</p>\n",
            "<p class=\"score\">with a score of <strong>{score}</strong></p>\n",
            "<p class=\"date\">Date: {date}</p>\n",
            "</div>\n"
        ),
        name = html_escape(&data.learner_name),
        course = html_escape(&data.course_title),
        score = data.score_label(),
        date = data.issued_on.format("%Y-%m-%d"),
    )
}

/// Render the certificate as a printable HTML document.
pub fn render_certificate_html(data: &CertificateData, layout: &CertificateLayout) -> String {
    let body = certificate_body(data);
    let image_height = layout.image_height_mm();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>Certificate: {} ({})</title>\n",
        html_escape(&data.learner_name),
        html_escape(&data.course_title)
    ));
    html.push_str("<style>\n");
    html.push_str(CERTIFICATE_CSS);
    html.push_str("</style>\n</head>\n<body>\n");

    for (index, offset) in layout.page_offsets().iter().enumerate() {
        html.push_str(&format!(
            "<section class=\"page\" data-page=\"{}\">\n<div class=\"canvas\" style=\"height: {:.2}mm; top: {:.2}mm\">\n",
            index + 1,
            image_height,
            offset
        ));
        html.push_str(&body);
        html.push_str("</div>\n</section>\n");
    }

    html.push_str("</body>\n</html>");
    html
}

/// Write the certificate into `dir` and return its path.
pub fn write_certificate(
    data: &CertificateData,
    layout: &CertificateLayout,
    dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(certificate_file_name(data));
    std::fs::write(&path, render_certificate_html(data, layout))
        .with_context(|| format!("failed to write certificate: {}", path.display()))?;
    tracing::info!(path = %path.display(), "certificate written");
    Ok(path)
}

const CERTIFICATE_CSS: &str = r#"
@page { size: A4 portrait; margin: 0; }
body { margin: 0; font-family: Georgia, 'Times New Roman', serif; color: #1f2937; }
.page { position: relative; width: 210mm; height: 297mm; overflow: hidden; page-break-after: always; }
.page:last-child { page-break-after: auto; }
.canvas { position: absolute; left: 0; width: 210mm; }
.frame { box-sizing: border-box; height: 100%; border: 6px double #b45309; padding: 8mm; text-align: center; display: flex; flex-direction: column; justify-content: center; }
h1 { font-size: 2.2rem; letter-spacing: 0.05em; margin: 0 0 1rem; }
.lead { font-style: italic; margin: 0.4rem 0; }
.name { font-size: 1.8rem; font-weight: bold; margin: 0.6rem 0; }
.course { font-size: 1.4rem; margin: 0.6rem 0; }
.score { margin-top: 1rem; }
.date { margin-top: 1.5rem; color: #6b7280; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn data() -> CertificateData {
        CertificateData {
            learner_name: "Ada Lovelace".into(),
            course_title: "Intro to  Rust".into(),
            score: 100.0,
            issued_on: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        }
    }

    #[test]
    fn image_shorter_than_page_is_one_page() {
        assert_eq!(slice_into_pages(148.5, 297.0), vec![0.0]);
    }

    #[test]
    fn exact_fit_is_one_page() {
        assert_eq!(slice_into_pages(297.0, 297.0), vec![0.0]);
    }

    #[test]
    fn tall_image_is_sliced_by_page_height() {
        assert_eq!(slice_into_pages(700.0, 297.0), vec![0.0, -297.0, -594.0]);
        assert_eq!(slice_into_pages(594.5, 297.0).len(), 3);
        assert_eq!(slice_into_pages(594.0, 297.0).len(), 2);
    }

    #[test]
    fn degenerate_sizes_yield_single_page() {
        assert_eq!(slice_into_pages(0.0, 297.0), vec![0.0]);
        assert_eq!(slice_into_pages(500.0, 0.0), vec![0.0]);
        assert_eq!(slice_into_pages(-5.0, 297.0), vec![0.0]);
        assert_eq!(slice_into_pages(f64::NAN, 297.0), vec![0.0]);
    }

    #[test]
    fn layout_scales_to_page_width() {
        let layout = CertificateLayout {
            canvas_width_px: 1000.0,
            canvas_height_px: 3000.0,
        };
        assert!((layout.image_height_mm() - 630.0).abs() < 1e-9);
        assert_eq!(layout.page_offsets().len(), 3);
        assert_eq!(CertificateLayout::default().page_offsets(), vec![0.0]);
    }

    #[test]
    fn file_name_replaces_title_whitespace() {
        assert_eq!(
            certificate_file_name(&data()),
            "Ada Lovelace_Intro_to_Rust_Certificate.html"
        );
        let mut untitled = data();
        untitled.course_title = " ".into();
        assert_eq!(
            certificate_file_name(&untitled),
            "Ada Lovelace_Course_Certificate.html"
        );
    }

    #[test]
    fn certificate_shows_name_course_score_and_date() {
        let html = render_certificate_html(&data(), &CertificateLayout::default());
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("Intro to  Rust"));
        assert!(html.contains("100.00%"));
        assert!(html.contains("2026-10-19"));
        assert_eq!(html.matches("class=\"page\"").count(), 1);
    }

    #[test]
    fn learner_name_is_escaped() {
        let mut cert = data();
        cert.learner_name = "<script>".into();
        let html = render_certificate_html(&cert, &CertificateLayout::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn write_certificate_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_certificate(&data(), &CertificateLayout::default(), &dir.path().join("out"))
            .unwrap();
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Certificate of Completion"));
    }
}
