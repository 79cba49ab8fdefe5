// src/db.rs
use crate::models::Wallet;
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::{Client, Database};
use serde::Deserialize;
use tokio::fs;

pub const WALLET_COLLECTION: &str = "Wallet";

const DEFAULT_ACCOUNT_KEY_PATH: &str = "./accountKey.json";

pub type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Deserialize)]
struct AccountKey {
    uri: String,
    database: String,
}

// One store handle per request scope; dropping it releases the client on
// every exit path.
pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    pub async fn connect() -> StoreResult<DocumentStore> {
        DocumentStore::connect_with(DEFAULT_ACCOUNT_KEY_PATH).await
    }

    pub async fn connect_with(account_key_path: &str) -> StoreResult<DocumentStore> {
        let raw = fs::read_to_string(account_key_path).await?;
        let key: AccountKey = serde_json::from_str(&raw)?;
        let client = Client::with_uri_str(&key.uri).await?;
        info!("Connected to document store, database {}", key.database);
        Ok(DocumentStore {
            db: client.database(&key.database),
        })
    }

    pub async fn add_document(&self, mut wallet: Wallet) -> StoreResult<Wallet> {
        let data = wallet_to_document(&wallet)?;
        info!("Saving on collection {}", WALLET_COLLECTION);
        let inserted = self
            .db
            .collection::<Document>(WALLET_COLLECTION)
            .insert_one(data, None)
            .await?;
        if let Bson::ObjectId(oid) = inserted.inserted_id {
            wallet.id = Some(oid.to_hex());
        }
        Ok(wallet)
    }

    pub async fn get_document(
        &self,
        collection_name: &str,
        document_id: &str,
    ) -> StoreResult<Option<Document>> {
        let oid = match ObjectId::parse_str(document_id) {
            Ok(oid) => oid,
            // No stored document can carry a malformed id.
            Err(_) => return Ok(None),
        };
        let found = self
            .db
            .collection::<Document>(collection_name)
            .find_one(doc! { "_id": oid }, None)
            .await?;
        Ok(found.map(inject_document_id))
    }

    pub async fn list_document(&self, collection_name: &str) -> StoreResult<Vec<Document>> {
        let mut cursor = self
            .db
            .collection::<Document>(collection_name)
            .find(None, None)
            .await?;
        let mut documents = Vec::new();
        while let Some(data) = cursor.try_next().await? {
            documents.push(inject_document_id(data));
        }
        Ok(documents)
    }

    pub async fn update_document(
        &self,
        collection_name: &str,
        document_id: &str,
        mut data: Document,
    ) -> StoreResult<bool> {
        let oid = match ObjectId::parse_str(document_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(false),
        };
        // Identifiers never live inside the document body.
        data.remove("id");
        let updated = self
            .db
            .collection::<Document>(collection_name)
            .update_one(doc! { "_id": oid }, doc! { "$set": data }, None)
            .await?;
        Ok(updated.matched_count > 0)
    }

    pub async fn delete_document(
        &self,
        collection_name: &str,
        document_id: &str,
    ) -> StoreResult<bool> {
        let oid = match ObjectId::parse_str(document_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(false),
        };
        let deleted = self
            .db
            .collection::<Document>(collection_name)
            .delete_one(doc! { "_id": oid }, None)
            .await?;
        Ok(deleted.deleted_count > 0)
    }
}

// The store assigns identifiers, so a wallet's own id is stripped before any
// write, whether it is None or a stale value.
pub fn wallet_to_document(wallet: &Wallet) -> StoreResult<Document> {
    let mut data = bson::to_document(wallet)?;
    data.remove("id");
    Ok(data)
}

pub fn wallet_from_document(data: Document) -> StoreResult<Wallet> {
    Ok(bson::from_document(data)?)
}

fn inject_document_id(mut data: Document) -> Document {
    if let Some(raw) = data.remove("_id") {
        let id = match raw {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(id) => id,
            other => other.to_string(),
        };
        data.insert("id", id);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stock;
    use chrono::Utc;

    fn wallet_with_purchase() -> Wallet {
        let mut wallet = Wallet {
            id: Some("abc123".to_string()),
            name: "Retirement".to_string(),
            description: Some("Long-term".to_string()),
            creation_date: Utc::now(),
            stocks_bought: Vec::new(),
        };
        wallet.add_stock(
            Stock {
                symbol: "AAPL".to_string(),
                description: "Apple Inc.".to_string(),
                current_price: 185.0,
                last_close: Utc::now(),
            },
            185.0,
            2.0,
        );
        wallet
    }

    #[test]
    fn to_document_strips_assigned_id() {
        let data = wallet_to_document(&wallet_with_purchase()).unwrap();

        assert!(!data.contains_key("id"));
        assert_eq!(data.get_str("name").unwrap(), "Retirement");
    }

    #[test]
    fn to_document_strips_transient_id_marker() {
        let mut wallet = wallet_with_purchase();
        wallet.id = None;

        let data = wallet_to_document(&wallet).unwrap();

        assert!(!data.contains_key("id"));
    }

    #[test]
    fn document_round_trip_preserves_wallet_fields() {
        let wallet = wallet_with_purchase();
        let mut data = wallet_to_document(&wallet).unwrap();
        data.insert("id", "generated-id");

        let restored = wallet_from_document(data).unwrap();

        assert_eq!(restored.id.as_deref(), Some("generated-id"));
        assert_eq!(restored.name, wallet.name);
        assert_eq!(restored.description, wallet.description);
        assert_eq!(restored.stocks_bought, wallet.stocks_bought);
    }

    #[test]
    fn from_document_without_id_stays_transient() {
        let mut wallet = wallet_with_purchase();
        wallet.id = None;
        let data = wallet_to_document(&wallet).unwrap();

        let restored = wallet_from_document(data).unwrap();

        assert_eq!(restored.id, None);
    }

    #[test]
    fn inject_document_id_moves_store_id_into_mapping() {
        let oid = ObjectId::new();
        let mut data = Document::new();
        data.insert("_id", oid);
        data.insert("name", "Retirement");

        let injected = inject_document_id(data);

        assert!(!injected.contains_key("_id"));
        assert_eq!(injected.get_str("id").unwrap(), oid.to_hex());
    }

    #[test]
    fn account_key_parses_service_account_file() {
        let raw = r#"{"uri": "mongodb://localhost:27017", "database": "wallet_tracker"}"#;

        let key: AccountKey = serde_json::from_str(raw).unwrap();

        assert_eq!(key.uri, "mongodb://localhost:27017");
        assert_eq!(key.database, "wallet_tracker");
    }
}
