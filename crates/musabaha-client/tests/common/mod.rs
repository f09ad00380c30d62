//! Shared fixtures and helpers for the client integration tests

#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use musabaha_client::{ApiClient, ConfirmationPrompt, Confirmer};
use musabaha_core::Credentials;
use serde_json::{Value, json};
use std::sync::Mutex;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Confirmer that gives a fixed answer and records every prompt
#[derive(Debug)]
pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<ConfirmationPrompt>>,
}

impl ScriptedConfirmer {
    pub fn accepting() -> Self {
        Self {
            answer: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self {
            answer: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<ConfirmationPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.answer
    }
}

pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri())
}

pub fn authed_client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri()).with_credentials(Credentials::bearer(TOKEN))
}

/// Number of requests the server saw with the given method
pub async fn count_requests(server: &MockServer, method: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.as_str() == method)
        .count()
}

pub fn payment(id: u64, amount: &str, status: &str) -> Value {
    json!({
        "id": id,
        "amount": amount,
        "status": status,
        "payment_method": "bank transfer",
        "transaction_reference": format!("TRX-{id}"),
        "user_id": id * 10,
        "user_name": "Aisha Bello",
        "created_at": "2024-03-15T14:25:30.000Z"
    })
}

pub fn payments_body(payments: &[Value]) -> Value {
    json!({ "success": true, "payments": payments })
}

pub fn registration(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "name": "Musa Ibrahim",
        "email": "musa@example.com",
        "telephone": "08030000000",
        "estate_name": "Musabaha Gardens",
        "number_of_plots": 2,
        "status": status,
        "passport_photo": "C:\\uploads\\passport.jpg",
        "identification_file": "/srv/uploads/id card.png"
    })
}

pub fn registrations_body(users: &[Value]) -> Value {
    json!({ "success": true, "data": users })
}
