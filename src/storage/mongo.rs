// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! MongoDB-backed document store.
//!
//! One [`Client`] is created at startup and shared by every request; the
//! driver pools connections internally. Documents cross the boundary as JSON
//! objects: on the way out, ObjectIds become 24-character hex strings and
//! dates become RFC 3339 strings.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document as BsonDocument};
use mongodb::options::{ClientOptions, FindOptions as MongoFindOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Database};
use serde_json::Value;
use tracing::{debug, info};

use super::{
    Collection, DeleteOutcome, DocumentStore, Filter, FindOptions, InsertOutcome, SortDirection,
    StorageError, StorageResult, UpdateOutcome,
};
use crate::models::Document;

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Build a client for `uri` and select `database`.
    ///
    /// The driver connects lazily; call [`DocumentStore::ping`] to confirm the
    /// deployment is reachable before serving traffic.
    pub async fn connect(uri: &str, database: &str, app_name: &str) -> StorageResult<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some(app_name.to_string());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(options)?;
        let database = client.database(database);
        info!(database = database.name(), "MongoDB client initialized");

        Ok(Self { client, database })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<BsonDocument> {
        self.database.collection::<BsonDocument>(collection.name())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
        options: FindOptions,
    ) -> StorageResult<Vec<Document>> {
        let filter = filter_document(filter)?;
        let mut find_options = MongoFindOptions::default();
        find_options.sort = options.sort.map(|sort| {
            let direction = match sort.direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            let mut spec = BsonDocument::new();
            spec.insert(sort.field, direction);
            spec
        });
        find_options.limit = options.limit;

        let cursor = self.collection(collection).find(filter, find_options).await?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await?;
        debug!(%collection, count = documents.len(), "find");

        Ok(documents.into_iter().map(from_bson_document).collect())
    }

    async fn find_one(&self, collection: Collection, filter: Filter) -> StorageResult<Option<Document>> {
        let filter = filter_document(filter)?;
        let found = self.collection(collection).find_one(filter, None).await?;
        Ok(found.map(from_bson_document))
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> StorageResult<InsertOutcome> {
        let document = to_bson_document(document)?;
        let result = self.collection(collection).insert_one(document, None).await?;
        let inserted_id = match bson_to_json(result.inserted_id) {
            Value::String(id) => id,
            other => other.to_string(),
        };
        debug!(%collection, %inserted_id, "insert_one");
        Ok(InsertOutcome { inserted_id })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        set: Document,
    ) -> StorageResult<UpdateOutcome> {
        let filter = filter_document(filter)?;
        let update = doc! { "$set": to_bson_document(set)? };
        let result = self.collection(collection).update_one(filter, update, None).await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: Collection, filter: Filter) -> StorageResult<DeleteOutcome> {
        let filter = filter_document(filter)?;
        let result = self.collection(collection).delete_one(filter, None).await?;
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn ping(&self) -> StorageResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
    }
}

/// Translate a [`Filter`] into a query document.
fn filter_document(filter: Filter) -> StorageResult<BsonDocument> {
    match filter {
        Filter::All => Ok(BsonDocument::new()),
        Filter::Id(id) => {
            let oid = ObjectId::parse_str(&id).map_err(|_| StorageError::InvalidId(id))?;
            Ok(doc! { "_id": oid })
        }
        Filter::Eq(field, value) => {
            let value = bson::to_bson(&value).map_err(|e| StorageError::Serialization(e.to_string()))?;
            let mut query = BsonDocument::new();
            query.insert(field, value);
            Ok(query)
        }
    }
}

fn to_bson_document(document: Document) -> StorageResult<BsonDocument> {
    bson::to_document(&document.into_inner()).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn from_bson_document(document: BsonDocument) -> Document {
    Document(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect(),
    )
}

/// Render a BSON value the way API clients expect to read it.
fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Document(inner) => Value::Object(
            inner
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_ids_render_as_hex() {
        let oid = ObjectId::parse_str("65f0c0ffee0000000000abcd").unwrap();
        let document = doc! {
            "_id": oid,
            "name": "Bike",
            "price": 250_i64,
            "tags": ["used", "blue"],
            "seller": { "ref": oid },
        };

        let json = serde_json::to_value(from_bson_document(document)).unwrap();
        assert_eq!(
            json,
            json!({
                "_id": "65f0c0ffee0000000000abcd",
                "name": "Bike",
                "price": 250,
                "tags": ["used", "blue"],
                "seller": { "ref": "65f0c0ffee0000000000abcd" }
            })
        );
    }

    #[test]
    fn dates_render_as_rfc3339() {
        let dt = bson::DateTime::from_millis(0);
        assert_eq!(bson_to_json(Bson::DateTime(dt)), json!("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn id_filter_requires_object_id() {
        let filter = filter_document(Filter::id("65f0c0ffee0000000000abcd")).unwrap();
        assert!(matches!(filter.get("_id"), Some(Bson::ObjectId(_))));

        let result = filter_document(Filter::id("nope"));
        assert!(matches!(result, Err(StorageError::InvalidId(id)) if id == "nope"));
    }

    #[test]
    fn equality_filter_keeps_field_name() {
        let filter = filter_document(Filter::eq("buyer_email", "b@example.com")).unwrap();
        assert_eq!(filter, doc! { "buyer_email": "b@example.com" });

        assert_eq!(filter_document(Filter::All).unwrap(), BsonDocument::new());
    }

    #[test]
    fn json_documents_convert_to_bson() {
        let document: Document =
            serde_json::from_value(json!({"name": "Lamp", "price": 12.5, "qty": 3})).unwrap();
        let bson = to_bson_document(document).unwrap();
        assert_eq!(bson.get_str("name").unwrap(), "Lamp");
        assert_eq!(bson.get_f64("price").unwrap(), 12.5);
    }
}
