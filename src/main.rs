use anyhow::{Context, Result};
use clap::Parser;
use postcoord_validator::config::load_document;
use postcoord_validator::mapper::{
    events_from_specification, scale_events_for_first_import, scale_events_from_diff,
    specification_events_from_diff,
};
use postcoord_validator::model::{Iri, WhoficCustomScalesValues, WhoficEntityPostCoordinationSpecification};
use postcoord_validator::{
    CliArgs, Command, EntityUpdateValidator, Fixtures, InMemoryCollaborators, LoggingConfig, ServiceConfig,
    ScaleValueEvent, ValidateEntityUpdateRequest, ValidatorDependencies, ViewEvents, init_logging,
};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

/// Exit status of a `validate` run that produced errors.
const REJECTED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _guard = init_logging(LoggingConfig::from_env())?;

    let cli = CliArgs::parse();
    let config = ServiceConfig::from_args(&cli)?;

    match &cli.command {
        Command::Validate { request, fixtures } => validate(&config, request, fixtures).await,
        Command::DiffScales { old, new } => {
            let old: Option<WhoficCustomScalesValues> =
                old.as_deref().map(|path| load_document(path, "scales")).transpose()?;
            let new: Option<WhoficCustomScalesValues> =
                new.as_deref().map(|path| load_document(path, "scales")).transpose()?;
            print_json(&scale_events_from_diff(old.as_ref(), new.as_ref()))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::DiffSpec { old, new } => {
            let old: WhoficEntityPostCoordinationSpecification = load_document(old, "specification")?;
            let new: WhoficEntityPostCoordinationSpecification = load_document(new, "specification")?;
            print_json(&specification_events_from_diff(&old, &new))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Import {
            spec,
            scales,
            fixtures,
        } => {
            import(spec, scales.as_deref(), fixtures)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn validate(config: &ServiceConfig, request: &Path, fixtures: &Path) -> Result<ExitCode> {
    let request: ValidateEntityUpdateRequest = load_document(request, "request")?;
    let Fixtures { catalog, project } = Fixtures::load(fixtures)?;

    let dependencies =
        ValidatorDependencies::in_memory(Arc::new(catalog), Arc::new(InMemoryCollaborators::new(project)));
    let validator = EntityUpdateValidator::new(dependencies, config.validation_settings());

    let response = validator.handle_request(&request).await;
    print_json(&response)?;
    Ok(if response.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(REJECTED)
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportEvents {
    specification_events: Vec<ViewEvents>,
    scale_events: Vec<ScaleValueEvent>,
}

fn import(spec: &Path, scales: Option<&Path>, fixtures: &Path) -> Result<()> {
    let specification: WhoficEntityPostCoordinationSpecification = load_document(spec, "specification")?;
    let scales: Option<WhoficCustomScalesValues> =
        scales.map(|path| load_document(path, "scales")).transpose()?;
    let fixtures = Fixtures::load(fixtures)?;

    let entity_types = fixtures
        .project
        .entity_types
        .get(&Iri::new(specification.whofic_entity_iri.as_str()))
        .cloned()
        .or_else(|| specification.entity_type.clone().map(|entity_type| vec![entity_type]))
        .with_context(|| format!("no entity type known for {}", specification.whofic_entity_iri))?;
    let allowed = fixtures.catalog.allowed_axes_for(&entity_types);

    let specification_events = specification
        .postcoordination_specifications
        .iter()
        .map(|view| ViewEvents {
            linearization_view: view.linearization_view.clone(),
            events: events_from_specification(view, &allowed),
        })
        .filter(|view| !view.events.is_empty())
        .collect();
    let scale_events = scales
        .as_ref()
        .map(scale_events_for_first_import)
        .unwrap_or_default()
        .into_iter()
        .collect();

    print_json(&ImportEvents {
        specification_events,
        scale_events,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
