mod models;

pub use models::{
    Category, Company, Currency, CurrencyRef, Invoice, InvoiceType, NewProduct, PaymentStatus,
    Person, PersonUpdate, Product, SymbolPosition,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

use crate::config::ApiSettings;
use crate::error::{BizError, Result};

/// Blocking client for the invoicing/CRM REST API
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, token: Option<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");

        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        if let Some(auth) = self.bearer() {
            request = request.header("Authorization", auth);
        }

        let body = request
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|source| BizError::Http {
                url: url.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| BizError::Decode { url, source })
    }

    fn send_json<B: Serialize>(&self, method: &str, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!(%url, method, "sending JSON body");

        let payload = serde_json::to_string(body).map_err(BizError::Encode)?;

        let request = match method {
            "PUT" => self.agent.put(&url),
            _ => self.agent.post(&url),
        };
        let request = match self.bearer() {
            Some(auth) => request.header("Authorization", auth),
            None => request,
        };

        request
            .header("Content-Type", "application/json")
            .send(payload.as_str())
            .map_err(|source| BizError::Http { url, source })?;
        Ok(())
    }

    /// `GET /api/people?createdBy=<id>`
    pub fn people(&self, created_by: &str) -> Result<Vec<Person>> {
        self.get_json("/api/people", &[("createdBy", created_by)])
    }

    /// `PUT /api/people/:id`
    pub fn update_person(&self, id: &str, update: &PersonUpdate) -> Result<()> {
        self.send_json("PUT", &format!("/api/people/{id}"), update)
    }

    /// `DELETE /api/people/:id`
    pub fn delete_person(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/api/people/{id}"));
        debug!(%url, "DELETE");

        let request = self.agent.delete(&url);
        let request = match self.bearer() {
            Some(auth) => request.header("Authorization", auth),
            None => request,
        };
        request
            .call()
            .map_err(|source| BizError::Http { url, source })?;
        Ok(())
    }

    /// `GET /api/entreprise`
    pub fn companies(&self) -> Result<Vec<Company>> {
        self.get_json("/api/entreprise", &[])
    }

    /// `GET /api/product`
    pub fn products(&self) -> Result<Vec<Product>> {
        self.get_json("/api/product", &[])
    }

    /// `POST /api/product`
    pub fn add_product(&self, product: &NewProduct) -> Result<()> {
        self.send_json("POST", "/api/product", product)
    }

    /// `GET /api/category?createdBy=<id>`
    pub fn categories(&self, created_by: &str) -> Result<Vec<Category>> {
        self.get_json("/api/category", &[("createdBy", created_by)])
    }

    /// `GET /api/currency?createdBy=<id>`
    pub fn currencies(&self, created_by: &str) -> Result<Vec<Currency>> {
        self.get_json("/api/currency", &[("createdBy", created_by)])
    }

    /// `GET /api/invoices?createdBy=<id>`
    ///
    /// Records that do not decode as an [`Invoice`] are skipped so one bad
    /// document does not empty the whole report.
    pub fn invoices(&self, created_by: &str) -> Result<Vec<Invoice>> {
        let raw: Vec<serde_json::Value> =
            self.get_json("/api/invoices", &[("createdBy", created_by)])?;
        Ok(decode_invoices(raw))
    }
}

fn decode_invoices(raw: Vec<serde_json::Value>) -> Vec<Invoice> {
    raw.into_iter()
        .filter_map(|record| match serde_json::from_value::<Invoice>(record) {
            Ok(invoice) => Some(invoice),
            Err(err) => {
                debug!(%err, "skipping invoice record");
                None
            }
        })
        .collect()
}
