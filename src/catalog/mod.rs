//! Product catalog edits.
//!
//! Every call goes through the request client, so writes carry the same
//! retry policy as reads. Outcomes are reported through notices; after a
//! successful write the products section is re-pulled if it is showing.

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;

use crate::error::RequestError;
use crate::notice::{Notice, NoticeSink};
use crate::records::{Product, ProductDraft};
use crate::request::{RequestClient, RequestOptions};
use crate::view::{Section, SectionCoordinator};

const PRODUCTS_PATH: &str = "/products";

pub struct CatalogService {
    requests: Arc<RequestClient>,
    sections: Arc<SectionCoordinator>,
    notices: Arc<dyn NoticeSink>,
}

impl CatalogService {
    pub fn new(
        requests: Arc<RequestClient>,
        sections: Arc<SectionCoordinator>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            requests,
            sections,
            notices,
        }
    }

    pub async fn list(&self) -> Result<Vec<Product>, RequestError> {
        self.requests
            .get_json(PRODUCTS_PATH)
            .await
            .inspect_err(|_| self.notices.notify(Notice::error("Failed to load products")))
    }

    #[tracing::instrument(name = "catalog.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Product, RequestError> {
        self.requests
            .get_json(&product_path(id))
            .await
            .inspect_err(|_| {
                self.notices
                    .notify(Notice::error("Failed to load product details"))
            })
    }

    #[tracing::instrument(name = "catalog.create", skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, RequestError> {
        let body = to_body(draft)?;
        let result = self
            .requests
            .send_json(PRODUCTS_PATH, RequestOptions::post(body))
            .await;
        self.finish_write(result, "Product added successfully", "Failed to add product")
            .await
    }

    #[tracing::instrument(name = "catalog.update", skip(self, draft))]
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> Result<Product, RequestError> {
        let body = to_body(draft)?;
        let result = self
            .requests
            .send_json(&product_path(id), RequestOptions::put(body))
            .await;
        self.finish_write(result, "Product updated successfully", "Failed to update product")
            .await
    }

    #[tracing::instrument(name = "catalog.delete", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), RequestError> {
        let result = self
            .requests
            .request(
                &product_path(id),
                RequestOptions::delete(),
                self.requests.max_attempts(),
            )
            .await
            .map(|_: Value| ());
        self.finish_write(result, "Product deleted successfully", "Failed to delete product")
            .await
    }

    async fn finish_write<T>(
        &self,
        result: Result<T, RequestError>,
        success: &str,
        failure: &str,
    ) -> Result<T, RequestError> {
        match result {
            Ok(value) => {
                self.notices.notify(Notice::success(success));
                if self.sections.active() == Section::Products {
                    self.sections.activate(Section::Products).await;
                }
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog write failed");
                self.notices.notify(Notice::error(failure));
                Err(e)
            }
        }
    }
}

/// Characters that would change which resource a path segment names
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn product_path(id: &str) -> String {
    format!("{}/{}", PRODUCTS_PATH, utf8_percent_encode(id, SEGMENT))
}

fn to_body(draft: &ProductDraft) -> Result<Value, RequestError> {
    serde_json::to_value(draft).map_err(|e| RequestError::Decode(e.to_string()))
}
