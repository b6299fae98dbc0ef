//! campus-report — certificate and admin report rendering.
//!
//! Produces self-contained HTML documents: completion certificates laid
//! out on A4 pages, and the admin system report page.

pub mod certificate;
pub mod html;
pub mod table;

pub use certificate::{slice_into_pages, write_certificate, CertificateLayout};
pub use html::{generate_reports_html, write_reports_html};
pub use table::ReportTable;
