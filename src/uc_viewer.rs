use actix_web::{web, Responder};
use serde::Deserialize;

use crate::config::env_var;
use crate::credentials::get_aws_credentials;
use crate::ec2::{InstanceLister, DEFAULT_REGION, SUPPORTED_REGIONS};
use crate::page::{self, escape_html, Alert};
use crate::workspace::WorkspaceApi;

// -----------------------------------------------------------------------------
// Models & DTOs
// -----------------------------------------------------------------------------

pub const PAGE_TITLE: &str = "Databricks UC Credentials - EC2 Instance Viewer";

#[derive(Debug, Clone, Default)]
pub struct ViewerSettings {
    pub default_credential_name: String,
}

impl ViewerSettings {
    pub fn from_env() -> Self {
        ViewerSettings {
            default_credential_name: env_var("DATABRICKS_SERVICE_CREDENTIAL_NAME")
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    pub credential_name: Option<String>,
    pub region: Option<String>,
    pub fetch: Option<String>,
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

fn render_sidebar(credential_name: &str, region: &str) -> String {
    let options: String = SUPPORTED_REGIONS
        .iter()
        .map(|r| {
            let selected = if *r == region { " selected" } else { "" };
            format!("<option value=\"{0}\"{1}>{0}</option>", r, selected)
        })
        .collect();

    format!(
        concat!(
            "<h2>Configuration</h2>",
            "<form method=\"get\" action=\"/\">",
            "<label for=\"credential_name\">Databricks Service Credential Name</label>",
            "<input id=\"credential_name\" name=\"credential_name\" value=\"{}\" ",
            "title=\"Enter the name of your Databricks Unity Catalog service credential\">",
            "<label for=\"region\">AWS Region</label>",
            "<select id=\"region\" name=\"region\">{}</select>",
            "<button type=\"submit\" name=\"fetch\" value=\"1\">Fetch EC2 Instances</button>",
            "</form>"
        ),
        escape_html(credential_name),
        options
    )
}

/// Renders the whole page for one interaction.
pub async fn render_index(
    api: &dyn WorkspaceApi,
    lister: &dyn InstanceLister,
    settings: &ViewerSettings,
    query: &ViewerQuery,
) -> String {
    let credential_name = query
        .credential_name
        .clone()
        .unwrap_or_else(|| settings.default_credential_name.clone());
    let credential_name = credential_name.trim();
    let region = query
        .region
        .as_deref()
        .filter(|r| SUPPORTED_REGIONS.contains(r))
        .unwrap_or(DEFAULT_REGION);

    let sidebar = render_sidebar(credential_name, region);
    let mut main = page::title(PAGE_TITLE);
    main.push_str(&page::divider());
    main.push_str(&render_results(api, lister, credential_name, region, query.fetch.is_some()).await);

    page::layout(PAGE_TITLE, Some(&sidebar), &main)
}

async fn render_results(
    api: &dyn WorkspaceApi,
    lister: &dyn InstanceLister,
    credential_name: &str,
    region: &str,
    fetch: bool,
) -> String {
    if credential_name.is_empty() {
        return page::alert(
            Alert::Warning,
            "Please enter a Databricks Service Credential Name in the sidebar to continue.",
        );
    }
    if !fetch {
        return String::new();
    }

    let credentials = match get_aws_credentials(api, credential_name).await {
        Ok(credentials) => credentials,
        Err(err) => {
            return page::alert(
                Alert::Error,
                &format!("Failed to get AWS credentials: {}", err),
            )
        }
    };

    let instances = match lister.list_instances(&credentials, region).await {
        Ok(instances) => instances,
        Err(err) => {
            return page::alert(
                Alert::Error,
                &format!("Failed to get EC2 instances: {}", err),
            )
        }
    };

    if instances.is_empty() {
        return page::alert(
            Alert::Info,
            &format!("No EC2 instances found in region {}", region),
        );
    }

    let rows: Vec<Vec<String>> = instances
        .into_iter()
        .map(|instance| vec![instance.name, instance.instance_id])
        .collect();
    format!(
        "{}{}",
        page::strong(&format!(
            "Found {} EC2 instance(s) in {}:",
            rows.len(),
            region
        )),
        page::table(&["Name", "Instance ID"], &rows)
    )
}

// -----------------------------------------------------------------------------
// Handlers
// -----------------------------------------------------------------------------

async fn index_handler(
    api: web::Data<dyn WorkspaceApi>,
    lister: web::Data<dyn InstanceLister>,
    settings: web::Data<ViewerSettings>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    let body = render_index(api.get_ref(), lister.get_ref(), settings.get_ref(), &query).await;
    page::html_response(body)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_handler))
        .route("/healthz", web::get().to(page::health_handler));
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
