//! PDF output through the external `wkhtmltopdf` converter.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use log::info;

use crate::error::AppError;

pub const PDF_CONVERTER: &str = "wkhtmltopdf";

/// Convert a rendered HTML report into a PDF.
pub fn render_pdf(html_path: &Path, pdf_path: &Path) -> Result<(), AppError> {
    render_pdf_with(PDF_CONVERTER, html_path, pdf_path)
}

pub fn render_pdf_with(converter: &str, html_path: &Path, pdf_path: &Path) -> Result<(), AppError> {
    info!("Converting html to pdf...");
    let output = Command::new(converter)
        .arg("--quiet")
        .arg("--enable-local-file-access")
        .arg(html_path)
        .arg(pdf_path)
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::new(2, format!("PDF output needs `{converter}` on PATH.")),
            _ => AppError::new(2, format!("Failed to run `{converter}`: {e}")),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::new(
            2,
            format!("`{converter}` failed ({}): {}", output.status, stderr.trim()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_converter_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_pdf_with(
            "elisa-no-such-converter",
            &dir.path().join("a.html"),
            &dir.path().join("a.pdf"),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("PATH"), "{err}");
    }
}
