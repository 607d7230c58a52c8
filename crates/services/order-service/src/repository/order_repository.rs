//! Order repository: the generic operations plus per-customer totals.

use std::sync::Arc;

use mongodb::bson;

use common::{AppError, AppResult, CollectionMap};
use domain::{
    Entity, Order, OrderGrouping, GROUPING_FIELD_TOTAL, ORDER_FIELD_AMOUNT,
    ORDER_FIELD_CUSTOMER_ID, ORDER_FIELD_STATUS, ORDER_STATUS_A, ORDER_STATUS_B,
};

use super::base::{CollectionAccess, ReadRepository, Repository, WriteRepository};
use crate::config::{
    CUSTOMER_TOTALS_LIMIT, CUSTOMER_TOTALS_SKIP, FLAGGED_CUSTOMER_ID, FLAGGED_MIN_AMOUNT,
};
use crate::infra::DocumentStore;
use crate::query::{Filter, IndexSpec, Pipeline, SortDirection};

/// Repository for [`Order`]s.
///
/// Construction ensures the ascending `Status` index exists.
pub struct OrderRepository {
    inner: Repository<Order>,
}

impl OrderRepository {
    pub async fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> AppResult<Self> {
        let inner = Repository::new(store, collection);
        let index = Self::status_index();
        inner.store().create_index(inner.collection(), &index).await?;
        Ok(Self { inner })
    }

    /// Create over the collection configured for orders.
    pub async fn for_entity(
        store: Arc<dyn DocumentStore>,
        collections: &CollectionMap,
    ) -> AppResult<Self> {
        Self::new(store, collections.resolve(Order::KIND)).await
    }

    pub fn status_index() -> IndexSpec {
        IndexSpec::ascending(ORDER_FIELD_STATUS)
    }

    /// Status "A" orders, summed per customer, smallest totals first.
    pub fn customer_totals_pipeline() -> Pipeline {
        Pipeline::new()
            .match_filter(Filter::eq(ORDER_FIELD_STATUS, ORDER_STATUS_A))
            .group_sum(ORDER_FIELD_CUSTOMER_ID, GROUPING_FIELD_TOTAL, ORDER_FIELD_AMOUNT)
            .sort(GROUPING_FIELD_TOTAL, SortDirection::Ascending)
            .skip(CUSTOMER_TOTALS_SKIP)
            .limit(CUSTOMER_TOTALS_LIMIT)
            .allow_disk_use(true)
    }

    /// `(Amount > 100 && Status == "B") || (CustId == 1 && Status == "A" && Amount != 0)`
    pub fn flagged_filter() -> Filter {
        (Filter::gt(ORDER_FIELD_AMOUNT, FLAGGED_MIN_AMOUNT)
            & Filter::eq(ORDER_FIELD_STATUS, ORDER_STATUS_B))
            | (Filter::eq(ORDER_FIELD_CUSTOMER_ID, FLAGGED_CUSTOMER_ID)
                & Filter::eq(ORDER_FIELD_STATUS, ORDER_STATUS_A)
                & Filter::ne(ORDER_FIELD_AMOUNT, 0))
    }

    /// Per-customer totals of status "A" orders, at most ten, ascending by total.
    ///
    /// Order among equal totals is up to the store.
    pub async fn aggregate(&self) -> AppResult<Vec<OrderGrouping>> {
        let pipeline = Self::customer_totals_pipeline();
        let documents = self.store().aggregate(self.collection(), &pipeline).await?;
        documents
            .into_iter()
            .map(|doc| bson::from_document::<OrderGrouping>(doc).map_err(AppError::from))
            .collect()
    }

    /// Orders matching [`OrderRepository::flagged_filter`].
    pub async fn find_flagged(&self) -> AppResult<Vec<Order>> {
        self.find(&Self::flagged_filter()).await
    }
}

impl CollectionAccess for OrderRepository {
    fn store(&self) -> &dyn DocumentStore {
        self.inner.store()
    }

    fn collection(&self) -> &str {
        self.inner.collection()
    }
}

impl ReadRepository<Order> for OrderRepository {}

impl WriteRepository<Order> for OrderRepository {}
