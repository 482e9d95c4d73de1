pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod validation;

pub use catalog::{AxisCatalog, AxisConfigRepository, ScaleMappingRepository};
pub use collaborators::{EntityTypeResolver, HierarchyValidator, InMemoryCollaborators, IriExistenceChecker};
pub use config::{CliArgs, Command, Fixtures, ServiceConfig};
pub use error::{CollaboratorError, ErrorKind, ValidationError};
pub use events::{ScaleValueEvent, SpecificationEvent, ViewEvents};
pub use logging::{LoggingConfig, init_logging};
pub use validation::{
    EntityUpdateValidator, ValidateEntityUpdateRequest, ValidateEntityUpdateResponse, ValidationReport,
    ValidationSettings, ValidatorDependencies,
};
