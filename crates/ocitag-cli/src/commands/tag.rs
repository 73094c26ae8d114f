use std::sync::Arc;

use anyhow::{Context, Result};
use ocitag_core::{DynCloudApi, Reconciler, TagTarget};
use tracing::info;

use crate::cli::Cli;
use crate::client::{OciClient, ServiceEndpoints};
use crate::config;
use crate::output;
use crate::prompt;
use crate::settings::{self, ProfileSettings};
use crate::signer::RequestSigner;

pub async fn run(cli: &Cli) -> Result<()> {
    let config_path = match &cli.config_file {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let profile = config::load_profile(&config_path, &cli.profile)?;
    let settings = settings::load_profile(&cli.profile)?;

    let target = resolve_target(
        cli.namespace.as_deref(),
        cli.tag_name.as_deref(),
        &settings,
        prompt::prompt,
    )?;
    let format = cli.format.or(settings.format).unwrap_or_default();

    let region = cli.region.as_deref().unwrap_or(&profile.region);
    let endpoints = ServiceEndpoints::for_region(region)?
        .with_overrides(cli.identity_endpoint.as_deref(), cli.mysql_endpoint.as_deref())?;
    let signer = RequestSigner::from_profile(&profile)?;
    info!(
        profile = %cli.profile,
        region,
        key_id = signer.key_id(),
        "loaded OCI profile"
    );

    let api: DynCloudApi = Arc::new(OciClient::new(signer, endpoints));
    let reconciler = Reconciler::new(api, target);
    let report = reconciler
        .run(&profile.tenancy)
        .await
        .context("Tagging run failed")?;

    output::print_report(&report, format)
}

/// Namespace and tag name from flags or env, then the settings file, then an
/// interactive prompt.
pub fn resolve_target<F>(
    namespace: Option<&str>,
    tag_name: Option<&str>,
    settings: &ProfileSettings,
    mut ask: F,
) -> Result<TagTarget>
where
    F: FnMut(&str) -> Result<String>,
{
    let namespace = match first_non_blank(namespace, settings.namespace.as_deref()) {
        Some(value) => value,
        None => ask("namespace")?,
    };
    let tag_name = match first_non_blank(tag_name, settings.tag_name.as_deref()) {
        Some(value) => value,
        None => ask("tag name")?,
    };
    Ok(TagTarget::new(namespace, tag_name)?)
}

fn first_non_blank(flag: Option<&str>, setting: Option<&str>) -> Option<String> {
    [flag, setting]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}
