//! Page rendering through poppler's `pdftoppm`

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tokio::process::Command;

use crate::error::{PdfdeskError, Result};
use crate::preview::{PageRenderer, RenderRequest, RenderedPage};

const PROGRAM: &str = "pdftoppm";

/// Renders a single page to PNG with the `pdftoppm` binary
///
/// The PDF is downloaded from the request's source URL into a temporary
/// file first. Raster output has no text layer, so that toggle only
/// matters for annotations.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    client: Client,
    program: PathBuf,
}

impl PdftoppmRenderer {
    /// Find `pdftoppm` on PATH
    pub fn locate(timeout: u64) -> Result<Self> {
        let program = which::which(PROGRAM).map_err(|_| {
            PdfdeskError::render(format!(
                "{} not found on PATH; install poppler-utils to render previews",
                PROGRAM
            ))
        })?;
        Self::with_program(program, timeout)
    }

    pub fn with_program(program: PathBuf, timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;
        Ok(Self { client, program })
    }

    async fn download(&self, source: &str) -> Result<Vec<u8>> {
        let response = self.client.get(source).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PdfdeskError::render(format!(
                "Fetching {} returned {}",
                source,
                status.as_u16()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl PageRenderer for PdftoppmRenderer {
    async fn render(&self, request: &RenderRequest, output: &Path) -> Result<RenderedPage> {
        let bytes = self.download(&request.source).await?;

        let input = tempfile::Builder::new()
            .prefix("pdfdesk-")
            .suffix(".pdf")
            .tempfile()?;
        tokio::fs::write(input.path(), &bytes).await?;

        if request.render_text_layer {
            tracing::debug!("text layer requested; raster output has none");
        }

        let root = output_root(output);
        let result = Command::new(&self.program)
            .args(pdftoppm_args(request, input.path(), &root))
            .output()
            .await
            .map_err(|e| PdfdeskError::render(format!("Failed to run {}: {}", PROGRAM, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(PdfdeskError::render(format!(
                "{} exited with {}: {}",
                PROGRAM,
                result.status,
                stderr.trim()
            )));
        }

        Ok(RenderedPage {
            page_number: request.page_number,
            path: root.with_extension("png"),
        })
    }
}

/// `pdftoppm` appends `.png` itself, so it gets the output path without extension
fn output_root(output: &Path) -> PathBuf {
    match output.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("png") => output.with_extension(""),
        _ => output.to_path_buf(),
    }
}

fn pdftoppm_args(request: &RenderRequest, input: &Path, root: &Path) -> Vec<OsString> {
    let page = request.page_number.max(1).to_string();
    let mut args: Vec<OsString> = vec![
        "-f".into(),
        page.clone().into(),
        "-l".into(),
        page.into(),
        "-png".into(),
        "-singlefile".into(),
    ];
    if !request.render_annotation_layer {
        args.push("-hide-annotations".into());
    }
    args.push(input.as_os_str().to_owned());
    args.push(root.as_os_str().to_owned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::LOADING_PDF_MESSAGE;

    fn request(annotations: bool) -> RenderRequest {
        RenderRequest {
            source: "http://127.0.0.1:3000/backend/documents/doc-1/pdf".to_string(),
            page_number: 1,
            render_text_layer: false,
            render_annotation_layer: annotations,
            loading_placeholder: LOADING_PDF_MESSAGE,
        }
    }

    #[test]
    fn test_output_root_strips_png() {
        assert_eq!(output_root(Path::new("out/page.png")), PathBuf::from("out/page"));
        assert_eq!(output_root(Path::new("out/page.PNG")), PathBuf::from("out/page"));
        assert_eq!(output_root(Path::new("out/page")), PathBuf::from("out/page"));
    }

    #[test]
    fn test_args_render_only_requested_page() {
        let args = pdftoppm_args(&request(false), Path::new("in.pdf"), Path::new("out"));
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["-f", "1", "-l", "1", "-png", "-singlefile", "-hide-annotations", "in.pdf", "out"]
        );
    }

    #[test]
    fn test_args_keep_annotations_when_requested() {
        let args = pdftoppm_args(&request(true), Path::new("in.pdf"), Path::new("out"));
        assert!(!args.iter().any(|a| a == "-hide-annotations"));
    }
}
