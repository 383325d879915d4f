use actix_web::{web, Responder};
use log::error;
use std::path::{Path, PathBuf};

use crate::page::{self, Alert};
use crate::preview::{self, FilePreview, Sample, Shape};
use crate::volume::format_megabytes;

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

pub const PAGE_TITLE: &str = "Big JSON File Reader";

#[derive(Debug, Clone)]
pub struct FileViewerSettings {
    pub local_path: PathBuf,
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

fn render_intro(local_path: &Path) -> String {
    let file_name = local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| local_path.display().to_string());

    let mut html = page::header(PAGE_TITLE);
    html.push_str(&page::alert(
        Alert::Info,
        &format!("Reading sample data from downloaded {} file", file_name),
    ));
    html
}

fn render_download_status(found: bool) -> String {
    let mut html = page::subheader("File Download Status");
    if found {
        html.push_str(&page::alert(
            Alert::Success,
            "File was successfully downloaded from Volume",
        ));
        html.push_str(&page::alert(
            Alert::Info,
            "This proves the Volume access and file download workflow is working!",
        ));
    } else {
        html.push_str(&page::alert(
            Alert::Error,
            "File download failed or file not found",
        ));
        html.push_str(&page::alert(
            Alert::Info,
            "Check the startup logs for download errors",
        ));
    }
    html
}

/// Page for when the preview could not be produced at all.
pub fn render_failure(local_path: &Path, message: &str) -> String {
    let mut main = render_intro(local_path);
    main.push_str(&page::alert(
        Alert::Error,
        &format!("Error reading file: {}", message),
    ));
    main.push_str(&render_download_status(false));

    page::layout(PAGE_TITLE, None, &main)
}

pub fn render_preview(local_path: &Path, preview: &FilePreview) -> String {
    let display = local_path.display().to_string();
    let mut main = render_intro(local_path);

    match preview {
        FilePreview::Missing => {
            main.push_str(&page::alert(
                Alert::Error,
                &format!("Local file not found: {}", display),
            ));
            main.push_str(&page::alert(
                Alert::Info,
                "Make sure the startup script successfully downloaded the file from Volume",
            ));
        }
        FilePreview::Found { size, sample } => {
            main.push_str(&page::alert(
                Alert::Success,
                &format!("Found local file: {}", display),
            ));
            main.push_str(&page::alert(
                Alert::Info,
                &format!("File size: {}", format_megabytes(*size)),
            ));
            main.push_str(&page::subheader("Reading JSON file..."));
            match sample {
                Ok(sample) => {
                    main.push_str(&page::alert(
                        Alert::Success,
                        "Successfully read sample content from JSON file",
                    ));
                    main.push_str(&render_sample(sample));
                }
                Err(message) => main.push_str(&page::alert(
                    Alert::Error,
                    &format!("Error reading file: {}", message),
                )),
            }
        }
    }

    main.push_str(&render_download_status(matches!(
        preview,
        FilePreview::Found { .. }
    )));

    page::layout(PAGE_TITLE, None, &main)
}

fn render_sample(sample: &Sample) -> String {
    match sample {
        Sample::Raw { excerpt } => format!(
            "{}{}",
            page::alert(
                Alert::Warning,
                "Could not parse as complete JSON, showing raw content",
            ),
            page::code(excerpt)
        ),
        Sample::Parsed { value, shape } => {
            let mut html = page::alert(Alert::Success, "Successfully parsed JSON sample");
            html.push_str(&page::subheader("Sample Data Structure"));
            html.push_str(&page::json(value));
            html.push_str(&page::subheader("Data Analysis"));
            html.push_str(&render_shape(shape));
            html
        }
    }
}

fn render_shape(shape: &Shape) -> String {
    match shape {
        Shape::Object { key_count, keys } => format!(
            "{}{}",
            page::labeled("Type:", &format!("Object with {} keys", key_count)),
            page::labeled("Keys:", &keys.join(", "))
        ),
        Shape::Array {
            item_count,
            first_item_type,
        } => {
            let mut html = page::labeled("Type:", &format!("Array with {} items", item_count));
            if let Some(item_type) = first_item_type {
                html.push_str(&page::labeled("First item type:", item_type));
            }
            html
        }
        Shape::Scalar(type_name) => page::labeled("Type:", type_name),
    }
}

// -----------------------------------------------------------------------------
// Handlers
// -----------------------------------------------------------------------------

async fn index_handler(settings: web::Data<FileViewerSettings>) -> impl Responder {
    let local_path = settings.local_path.clone();
    let path = local_path.clone();
    let body = match web::block(move || preview::load_preview(&path)).await {
        Ok(preview) => render_preview(&local_path, &preview),
        Err(err) => {
            error!("Preview task failed: {}", err);
            render_failure(&local_path, &err.to_string())
        }
    };

    page::html_response(body)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_handler))
        .route("/healthz", web::get().to(page::health_handler));
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
