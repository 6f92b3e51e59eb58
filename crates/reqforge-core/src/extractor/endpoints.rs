//! Deterministic endpoint synthesis from models, relationships and settings.
//!
//! No text is scanned here: the same requirements always yield the same
//! endpoint list, in the same order.

use crate::extractor::naming::table_name;
use crate::models::{
    AuthType, DefaultValue, EndpointDefinition, EndpointParameter, FieldType, HttpMethod,
    ModelDefinition, ProjectRequirements, Relationship, RelationshipType,
};

pub const DEFAULT_PAGE_LIMIT: i64 = 100;

fn param(name: &str, param_type: FieldType, required: bool, description: &str) -> EndpointParameter {
    EndpointParameter {
        name: name.to_string(),
        param_type,
        required,
        default: None,
        description: description.to_string(),
    }
}

fn list_parameters(model: &str) -> Vec<EndpointParameter> {
    vec![
        EndpointParameter {
            default: Some(DefaultValue::Int(0)),
            ..param("skip", FieldType::Integer, false, "Number of records to skip")
        },
        EndpointParameter {
            default: Some(DefaultValue::Int(DEFAULT_PAGE_LIMIT)),
            ..param("limit", FieldType::Integer, false, "Maximum number of records to return")
        },
        param("search", FieldType::String, false, &format!("Search {model} records")),
        param("sort", FieldType::String, false, "Field to sort by"),
        EndpointParameter {
            default: Some(DefaultValue::Str("asc".to_string())),
            ..param("order", FieldType::String, false, "Sort order (asc or desc)")
        },
    ]
}

fn id_parameter(model: &str) -> EndpointParameter {
    param("id", FieldType::Integer, true, &format!("{model} identifier"))
}

fn endpoint(
    path: String,
    method: HttpMethod,
    description: String,
    model: Option<&str>,
    auth_required: bool,
    parameters: Vec<EndpointParameter>,
) -> EndpointDefinition {
    EndpointDefinition {
        path,
        method,
        description,
        model: model.map(str::to_string),
        auth_required,
        parameters,
    }
}

/// The five CRUD endpoints for one model, in list/create/get/update/delete order.
pub fn crud_endpoints(model: &ModelDefinition, auth_required: bool) -> Vec<EndpointDefinition> {
    let name = model.name.as_str();
    let collection = format!("/{}/", model.table_name);
    let item = format!("/{}/{{id}}", model.table_name);
    vec![
        endpoint(
            collection.clone(),
            HttpMethod::Get,
            format!("List {name} records"),
            Some(name),
            auth_required,
            list_parameters(name),
        ),
        endpoint(
            collection,
            HttpMethod::Post,
            format!("Create a new {name}"),
            Some(name),
            auth_required,
            Vec::new(),
        ),
        endpoint(
            item.clone(),
            HttpMethod::Get,
            format!("Get a {name} by id"),
            Some(name),
            auth_required,
            vec![id_parameter(name)],
        ),
        endpoint(
            item.clone(),
            HttpMethod::Put,
            format!("Update a {name}"),
            Some(name),
            auth_required,
            vec![id_parameter(name)],
        ),
        endpoint(
            item,
            HttpMethod::Delete,
            format!("Delete a {name}"),
            Some(name),
            auth_required,
            vec![id_parameter(name)],
        ),
    ]
}

/// `GET /{from_table}/{id}/{to_table}/` for a one_to_many relationship.
pub fn traversal_endpoint(
    rel: &Relationship,
    from_table: &str,
    to_table: &str,
    auth_required: bool,
) -> Option<EndpointDefinition> {
    if rel.relationship_type != RelationshipType::OneToMany {
        return None;
    }
    Some(endpoint(
        format!("/{from_table}/{{id}}/{to_table}/"),
        HttpMethod::Get,
        format!("List {} records of a {}", rel.to_model, rel.from_model),
        Some(&rel.to_model),
        auth_required,
        vec![id_parameter(&rel.from_model)],
    ))
}

/// Login, register and refresh for every auth method but NONE.
pub fn auth_endpoints(auth: AuthType) -> Vec<EndpointDefinition> {
    if auth == AuthType::None {
        return Vec::new();
    }
    let refresh_description = match auth {
        AuthType::Jwt => "Refresh an access token",
        _ => "Renew the current credentials",
    };
    vec![
        endpoint(
            "/auth/login".to_string(),
            HttpMethod::Post,
            "Authenticate and start a session".to_string(),
            None,
            false,
            Vec::new(),
        ),
        endpoint(
            "/auth/register".to_string(),
            HttpMethod::Post,
            "Register a new account".to_string(),
            None,
            false,
            Vec::new(),
        ),
        endpoint(
            "/auth/refresh".to_string(),
            HttpMethod::Post,
            refresh_description.to_string(),
            None,
            true,
            Vec::new(),
        ),
    ]
}

pub fn utility_endpoints(file_uploads: bool) -> Vec<EndpointDefinition> {
    let mut endpoints = vec![
        endpoint(
            "/health".to_string(),
            HttpMethod::Get,
            "Health check".to_string(),
            None,
            false,
            Vec::new(),
        ),
        endpoint(
            "/version".to_string(),
            HttpMethod::Get,
            "API version".to_string(),
            None,
            false,
            Vec::new(),
        ),
    ];
    if file_uploads {
        endpoints.push(endpoint(
            "/upload".to_string(),
            HttpMethod::Post,
            "Upload a file".to_string(),
            None,
            true,
            Vec::new(),
        ));
    }
    endpoints
}

// Table of the named model, so traversal routes follow renamed collections.
fn collection_of(requirements: &ProjectRequirements, model: &str) -> String {
    requirements
        .model(model)
        .map(|m| m.table_name.clone())
        .unwrap_or_else(|| table_name(model))
}

/// Full endpoint list for `requirements`, replacing nothing on it.
pub fn synthesize_endpoints(requirements: &ProjectRequirements) -> Vec<EndpointDefinition> {
    let auth_required = requirements.auth_type != AuthType::None;
    let mut endpoints: Vec<EndpointDefinition> = requirements
        .models
        .iter()
        .flat_map(|model| crud_endpoints(model, auth_required))
        .collect();
    endpoints.extend(
        requirements
            .relationships
            .iter()
            .filter_map(|rel| {
                traversal_endpoint(
                    rel,
                    &collection_of(requirements, &rel.from_model),
                    &collection_of(requirements, &rel.to_model),
                    auth_required,
                )
            }),
    );
    endpoints.extend(auth_endpoints(requirements.auth_type));
    endpoints.extend(utility_endpoints(requirements.features.file_uploads));
    endpoints
}
