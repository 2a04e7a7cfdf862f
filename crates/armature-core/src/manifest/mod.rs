//! ARM manifest data model.
//!
//! A [`Deployment`] pairs a [`Manifest`] with its [`ParameterSet`] and is the
//! unit both the differ and the provider operate on.

pub mod types;

pub use types::{
    DEFAULT_CONTENT_VERSION, DEFAULT_SCHEMA, Deployment, DeploymentErrorDetail,
    DeploymentRecord, Manifest, Parameter, ParameterDeclaration, ParameterDeclarations,
    ParameterSet, Resource, SITE_RESOURCE_TYPE, SLOT_CONFIG_NAMES, SLOT_RESOURCE_TYPE,
};
