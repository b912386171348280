#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver, Sender};

use reviewbot::{
    client::{ClientConfig, ReviewApi},
    domain::Certification,
    event::ReviewEvent,
    id::ProjectId,
};
use serde_json::{Value, json};
use wiremock::MockServer;

pub fn api(server: &MockServer, token: &str) -> ReviewApi {
    ReviewApi::new(ClientConfig::new(server.uri(), token)).unwrap()
}

pub fn channel() -> (Sender<ReviewEvent>, Receiver<ReviewEvent>) {
    mpsc::channel()
}

pub fn cert(name: &str, id: u64) -> Certification {
    Certification { name: name.into(), id: ProjectId::new(id) }
}

pub fn submission(id: u64, project: &str, language: &str) -> Value {
    json!({
        "id": id,
        "status": "in_review",
        "price": "40.0",
        "language": language,
        "project_id": 145,
        "project": { "name": project }
    })
}

pub fn certifications() -> Value {
    json!([
        { "project_id": 145, "status": "certified", "project": { "name": "Dog Breed Classifier" } },
        { "project_id": 146, "status": "applied", "project": { "name": "Smartcab" } },
        { "project_id": 147, "status": "certified", "project": { "name": "Finding Donors" } }
    ])
}
