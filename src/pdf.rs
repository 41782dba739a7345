use std::io::BufWriter;

use printpdf::*;

use crate::error::{FundError, Result};
use crate::fmt::{amount, money};
use crate::receipt::{self, Receipt};
use crate::report::DonationReport;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 25.0;
const MARGIN_BOTTOM: f32 = 25.0;
const MARGIN_LEFT: f32 = 14.0;
const MARGIN_RIGHT: f32 = 14.0;
const ROW_H: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 12.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

fn green() -> Color {
    Color::Rgb(Rgb::new(0.086, 0.639, 0.29, None))
}

fn ink() -> Color {
    Color::Rgb(Rgb::new(0.12, 0.16, 0.22, None))
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| FundError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| FundError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.current_page).get_layer(self.current_layer)
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer().use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn centered(&self, s: &str, size: f32, bold: bool) {
        let x = (PAGE_W - approx_text_width(s, size)) / 2.0;
        self.text(s, x.max(MARGIN_LEFT), size, bold);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self.layer();
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        });
    }

    /// Outline a rectangle from the current `y` down `height` mm.
    fn frame(&self, x1: f32, x2: f32, height: f32, thickness: f32) {
        let top = self.pdf_y();
        let bottom = top - height;
        let layer = self.layer();
        layer.set_outline_thickness(thickness);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(top)), false),
                (Point::new(Mm(x2), Mm(top)), false),
                (Point::new(Mm(x2), Mm(bottom)), false),
                (Point::new(Mm(x1), Mm(bottom)), false),
            ],
            is_closed: true,
        });
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        self.row(cols, headers, true);
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str]) {
        self.ensure_space(ROW_H);
        self.row(cols, values, false);
    }

    fn row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        let mut x = MARGIN_LEFT;
        for (col, value) in cols.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + col.width - tw, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| FundError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| FundError::Pdf(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Render functions
// ---------------------------------------------------------------------------

pub fn render_donation_report(report: &DonationReport) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Donations Report")?;

    pdf.centered(&report.title(), TITLE_SIZE, true);
    pdf.y += 13.0;
    pdf.text(&report.period_label(), MARGIN_LEFT, SUBTITLE_SIZE, false);
    pdf.y += 7.0;
    let total = format!("Total Donations: {}", money(report.total, &report.currency));
    pdf.text(&total, MARGIN_LEFT, SUBTITLE_SIZE, false);
    pdf.y += 7.0;
    let count = format!("Total Donors: {}", report.donor_count);
    pdf.text(&count, MARGIN_LEFT, SUBTITLE_SIZE, false);
    pdf.y += 11.0;

    let cols = &[
        Col { width: 72.0, align: Align::Left },
        Col { width: 36.0, align: Align::Right },
        Col { width: 8.0, align: Align::Left },
        Col { width: 40.0, align: Align::Left },
        Col { width: 26.0, align: Align::Left },
    ];
    let amount_header = format!("Amount ({})", report.currency);
    pdf.table_header(cols, &["Donor Name", &amount_header, "", "Payment Method", "Date"]);

    for r in &report.rows {
        let amt = amount(r.amount);
        pdf.table_row(cols, &[&r.donor_name, &amt, "", &r.payment_method, &r.date]);
    }

    pdf.y += 9.0;
    pdf.ensure_space(ROW_H * 2.0);
    let generated = format!("Generated on: {}", report.generated_at);
    pdf.centered(&generated, FONT_SIZE, false);
    pdf.y += ROW_H;
    pdf.centered(
        &format!("{} {}", receipt::THANKS, receipt::BLESSING),
        FONT_SIZE,
        false,
    );

    pdf.to_bytes()
}

pub fn render_receipt(r: &Receipt) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Donation Receipt")?;
    let left = 40.0;
    let right = PAGE_W - 40.0;

    pdf.frame(left - 10.0, right + 10.0, 230.0, 1.0);
    pdf.y += 14.0;

    pdf.centered(&r.org_name, TITLE_SIZE, true);
    pdf.y += 7.0;
    if !r.org_subtitle.is_empty() {
        pdf.centered(&r.org_subtitle, FONT_SIZE, false);
        pdf.y += 6.0;
    }
    pdf.y += 4.0;
    pdf.hline(left, right);
    pdf.y += 9.0;
    pdf.centered(receipt::TITLE, SUBTITLE_SIZE + 2.0, true);
    pdf.y += 6.0;
    pdf.hline(left, right);
    pdf.y += 12.0;

    let details = [
        ("Donor Name:", r.donor_name.as_str()),
        ("Amount:", r.amount.as_str()),
        ("Date:", r.date.as_str()),
        ("Payment Method:", r.payment_method.as_str()),
        ("Receipt ID:", r.receipt_id.as_str()),
    ];
    for (label, value) in details {
        pdf.text(label, left, FONT_SIZE + 1.0, true);
        let tw = approx_text_width(value, FONT_SIZE + 1.0);
        pdf.text(value, right - tw, FONT_SIZE + 1.0, true);
        pdf.y += 3.0;
        pdf.hline(left, right);
        pdf.y += 7.0;
    }

    pdf.y += 6.0;
    let reference = format!("Reference for verification purpose: {}", r.reference);
    pdf.centered(&reference, FONT_SIZE - 1.0, false);
    pdf.y += 14.0;

    // Verified stamp
    let stamp_w = 56.0;
    let stamp_x = (PAGE_W - stamp_w) / 2.0;
    pdf.layer().set_outline_color(green());
    pdf.frame(stamp_x, stamp_x + stamp_w, 26.0, 1.5);
    pdf.layer().set_fill_color(green());
    pdf.y += 11.0;
    pdf.centered("VERIFIED RECEIPT", SUBTITLE_SIZE, true);
    pdf.y += 8.0;
    pdf.centered(&r.stamp_year.to_string(), FONT_SIZE, true);
    pdf.layer().set_fill_color(ink());
    pdf.layer().set_outline_color(ink());
    pdf.y += 22.0;

    pdf.centered(receipt::THANKS, FONT_SIZE, false);
    pdf.y += ROW_H;
    pdf.centered(receipt::BLESSING, FONT_SIZE, false);
    pdf.y += ROW_H * 2.0;
    pdf.centered(&format!("Generated: {}", r.generated_at), FONT_SIZE - 2.0, false);

    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use super::*;
    use crate::models::{Donation, Donor, DonorRef, PaymentMethod};
    use crate::receipt::build_receipt;
    use crate::report::build_donation_report;
    use crate::settings::Settings;

    fn donor() -> Donor {
        Donor {
            id: "0123456789abcdef0123456789abcdef".into(),
            name: "Maryam".into(),
            phone: String::new(),
            address: String::new(),
            pledge: Some(500.0),
            notes: String::new(),
            created_at: String::new(),
        }
    }

    fn donation(id: &str) -> Donation {
        Donation {
            id: id.into(),
            donor: DonorRef::Resolved(donor()),
            amount: 500.0,
            date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            month: 3,
            year: 2025,
            payment_method: PaymentMethod::Monthly,
            is_monthly: true,
            notes: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_render_report_produces_pdf() {
        let org = Settings::default().organization();
        let now = Local.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
        let donations: Vec<Donation> = (0..80).map(|i| donation(&format!("d{i:031}"))).collect();
        let report = build_donation_report(&org, &donations, 3, 2025, now).unwrap();
        let bytes = render_donation_report(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_report_produces_pdf() {
        let org = Settings::default().organization();
        let report = build_donation_report(&org, &[], 3, 2025, Local::now()).unwrap();
        assert!(render_donation_report(&report).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_receipt_produces_pdf() {
        let org = Settings::default().organization();
        let r = build_receipt(&org, &donor(), &donation("fedcba9876543210fedcba9876543210"), Local::now()).unwrap();
        let bytes = render_receipt(&r).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
