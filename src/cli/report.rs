use std::path::PathBuf;

use crate::cli::{parse_period, write_output, Context, ReportFormat};
use crate::error::Result;
use crate::report::render_report;
use crate::store::donations;

pub fn donations(
    ctx: &Context,
    month: Option<&str>,
    format: ReportFormat,
    output: Option<String>,
) -> Result<()> {
    let (m, y) = parse_period(month)?;
    let rows = donations::list_donations(&ctx.conn, Some((m, y)))?;
    let report = render_report(&ctx.settings.organization(), &rows, m, y)?;

    let default_path = |ext: &str| ctx.exports_dir().join(report.file_name(ext));

    match format {
        ReportFormat::Text => {
            let text = report.to_text();
            match output {
                Some(path) => write_output(text.as_bytes(), &PathBuf::from(path))?,
                None => println!("{text}"),
            }
        }
        ReportFormat::Csv => {
            let path = output.map(PathBuf::from).unwrap_or_else(|| default_path("csv"));
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            report.write_csv(&path)?;
            println!("Wrote {}", path.display());
        }
        #[cfg(feature = "pdf")]
        ReportFormat::Pdf => {
            let path = output.map(PathBuf::from).unwrap_or_else(|| default_path("pdf"));
            let bytes = crate::pdf::render_donation_report(&report)?;
            write_output(&bytes, &path)?;
        }
    }
    Ok(())
}
