//! The currently displayed page of products.
//!
//! `ProductPage` is the list owner editors report to. It keeps the only
//! copy of the page; editors never hold a reference to it, they call back
//! through [`EditorObserver`] and the page applies the change.

use tracing::debug;

use crate::client::ProductClient;
use crate::editor::{EditorObserver, EditorSettings, ProductEditor};
use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::{ListQuery, Product, ProductId};

#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    query: ListQuery,
    products: Vec<Product>,
    pending_deletes: Vec<ProductId>,
}

impl ProductPage {
    pub fn new(query: ListQuery) -> Self {
        Self {
            query,
            products: Vec::new(),
            pending_deletes: Vec::new(),
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Replace the page contents with a fresh list response for `query`.
    /// Delete requests not yet drained survive the reload.
    pub fn load(
        &mut self,
        client: &ProductClient,
        query: ListQuery,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        let products = client.parse_list_products(response)?;
        debug!(skip = query.skip, limit = query.limit, count = products.len(), "page loaded");
        self.query = query;
        self.products = products;
        Ok(())
    }

    pub fn next_page(&self) -> ListQuery {
        self.query.next_page()
    }

    pub fn previous_page(&self) -> ListQuery {
        self.query.previous_page()
    }

    /// Build an editor for a product currently on the page.
    pub fn editor_for(
        &self,
        client: &ProductClient,
        id: ProductId,
        settings: EditorSettings,
    ) -> Option<ProductEditor> {
        let product = self.get(id)?.clone();
        Some(ProductEditor::with_settings(client.clone(), product, settings))
    }

    /// Deletions requested by editors that the host has not executed yet.
    pub fn take_pending_deletes(&mut self) -> Vec<ProductId> {
        std::mem::take(&mut self.pending_deletes)
    }

    /// Drop a product after the server confirmed its deletion.
    pub fn remove(&mut self, id: ProductId) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(index))
    }
}

impl EditorObserver for ProductPage {
    fn on_update(&mut self, product: &Product) {
        if let Some(slot) = self.products.iter_mut().find(|p| p.id == product.id) {
            *slot = product.clone();
        }
    }

    fn on_delete(&mut self, id: ProductId) {
        if !self.pending_deletes.contains(&id) {
            self.pending_deletes.push(id);
        }
    }
}
