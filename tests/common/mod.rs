//! Shared fixture: a registry covering plain, two-hop, ambiguous,
//! self-referential and polymorphic relationships, plus matching rows.

#![allow(dead_code)]

use jsonapi_query::executor::MemoryDatabase;
use jsonapi_query::loader::{Registry, RegistryLoader};
use jsonapi_query::planner::{Translation, Translator};
use serde_json::{json, Value};

pub fn registry_json() -> Value {
    json!({
        "models": [
            {
                "name": "person",
                "columns": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"},
                    "age": {"type": "integer"}
                },
                "relationships": {
                    "student": {"target": "student", "local_column": "id", "remote_column": "person_id"}
                }
            },
            {
                "name": "student",
                "columns": {
                    "id": {"type": "integer"},
                    "person_id": {"type": "integer"},
                    "school_id": {"type": "integer"}
                },
                "relationships": {
                    "school": {"target": "school", "local_column": "school_id", "remote_column": "id"}
                }
            },
            {
                "name": "school",
                "columns": {"id": {"type": "integer"}, "name": {"type": "string"}}
            },
            {
                "name": "category",
                "columns": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"},
                    "parent_id": {"type": "integer"}
                },
                "relationships": {
                    "parent": {"target": "category", "local_column": "parent_id", "remote_column": "id"}
                }
            },
            {
                "name": "product",
                "columns": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"},
                    "status": {"type": "enum", "values": ["draft", "published"]},
                    "primary_category_id": {"type": "integer"},
                    "secondary_category_id": {"type": "integer"}
                },
                "relationships": {
                    "primary_category": {"target": "category", "local_column": "primary_category_id", "remote_column": "id"},
                    "secondary_category": {"target": "category", "local_column": "secondary_category_id", "remote_column": "id"}
                }
            },
            {
                "name": "vehicle",
                "discriminator": "kind",
                "columns": {
                    "id": {"type": "integer"},
                    "kind": {"type": "string"},
                    "wheels": {"type": "integer"},
                    "doors": {"type": "integer"}
                }
            }
        ],
        "schemas": [
            {
                "name": "person", "type": "people", "model": "person",
                "fields": {
                    "id": {"type": "integer", "key": true},
                    "name": {"type": "string"},
                    "age": {"type": "integer"},
                    "student": {"type": "relationship", "schema": "student"}
                }
            },
            {
                "name": "student", "type": "students", "model": "student",
                "fields": {
                    "id": {"type": "integer", "key": true},
                    "school": {"type": "relationship", "schema": "school"}
                }
            },
            {
                "name": "school", "type": "schools", "model": "school",
                "fields": {
                    "id": {"type": "integer", "key": true},
                    "title": {"type": "string", "attribute": "name"}
                }
            },
            {
                "name": "category", "type": "categories", "model": "category",
                "fields": {
                    "id": {"type": "integer", "key": true},
                    "name": {"type": "string"},
                    "parent": {"type": "relationship", "schema": "category"}
                }
            },
            {
                "name": "product", "type": "products", "model": "product",
                "fields": {
                    "id": {"type": "integer", "key": true},
                    "name": {"type": "string"},
                    "status": {"type": "enum", "values": ["draft", "published"]},
                    "primary_category": {"type": "relationship", "schema": "category"},
                    "secondary_category": {"type": "relationship", "schema": "category"}
                }
            },
            {
                "name": "vehicle", "type": "vehicles", "model": "vehicle",
                "fields": {
                    "id": {"type": "integer", "key": true},
                    "wheels": {"type": "integer"}
                }
            },
            {
                "name": "car", "type": "cars", "model": "vehicle",
                "fields": {
                    "id": {"type": "integer", "key": true},
                    "wheels": {"type": "integer"},
                    "doors": {"type": "integer"}
                }
            }
        ]
    })
}

pub fn dataset_json() -> Value {
    json!({
        "person": [
            {"id": 1, "name": "Ann", "age": 5},
            {"id": 2, "name": "Bob", "age": 10},
            {"id": 3, "name": "Cyd", "age": 30},
            {"id": 4, "name": "Dee"}
        ],
        "student": [
            {"id": 20, "person_id": 2, "school_id": 100},
            {"id": 30, "person_id": 3, "school_id": 100}
        ],
        "school": [
            {"id": 100, "name": "Harvard"},
            {"id": 101, "name": "Yale"}
        ],
        "category": [
            {"id": 1, "name": "Tools"},
            {"id": 2, "name": "Hammers", "parent_id": 1},
            {"id": 3, "name": "Garden"}
        ],
        "product": [
            {"id": 1, "name": "Claw", "status": "published", "primary_category_id": 2, "secondary_category_id": 3},
            {"id": 2, "name": "Rake", "status": "draft", "primary_category_id": 3, "secondary_category_id": 2}
        ],
        "vehicle": [
            {"id": 1, "kind": "vehicles", "wheels": 2},
            {"id": 2, "kind": "cars", "wheels": 4, "doors": 5}
        ]
    })
}

pub fn registry() -> Registry {
    RegistryLoader::load_str(&registry_json().to_string(), "fixture").unwrap()
}

pub fn database(registry: &Registry) -> MemoryDatabase {
    let mut database = MemoryDatabase::new(registry.models.clone());
    database.load_dataset(&dataset_json()).unwrap();
    database
}

/// Translate `(key, value)` pairs against a root schema
pub fn translate(registry: &Registry, root: &str, query: &[(&str, &str)]) -> Translation {
    Translator::new(&registry.schemas, &registry.models, &registry.config)
        .translate(query.iter().copied(), root)
        .unwrap()
}
