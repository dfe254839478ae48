//! Report rendering and delivery
//!
//! This crate provides:
//! - Plain-text, paginated PDF and spreadsheet renderers
//! - Email delivery of the rendered artifacts over SMTP
//!
//! Every operation reports an outcome instead of returning an error, so one
//! failed artifact never prevents the others from being produced.

pub mod delivery;
pub mod render;

pub use delivery::{DeliveryOutcome, Deliverer, MailSettings, MailTransport, SmtpRelay};
pub use render::{
    render_pdf, render_table, render_text, DocumentInput, RenderError, RenderOutcome,
    ReportContent, Section,
};
