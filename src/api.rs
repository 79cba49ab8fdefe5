// src/api.rs
use crate::db::{wallet_from_document, DocumentStore, WALLET_COLLECTION};
use crate::error::{CustomError, WalletNotFound, WalletUpdateFailed};
use crate::models::Wallet;
use log::{error, info};
use serde::Deserialize;
use warp::{Filter, Rejection, Reply};

#[derive(Deserialize)]
struct UpdateWalletQuery {
    name: String,
    #[serde(default)]
    description: String,
}

pub fn routes() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let create = warp::path!("wallets")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store())
        .and_then(create_wallet_handler);

    let read = warp::path!("wallets" / String)
        .and(warp::get())
        .and(with_store())
        .and_then(read_wallet_handler);

    let update = warp::path!("wallets" / String)
        .and(warp::put())
        .and(warp::query::<UpdateWalletQuery>())
        .and(with_store())
        .and_then(update_wallet_handler);

    let delete = warp::path!("wallets" / String)
        .and(warp::delete())
        .and(with_store())
        .and_then(delete_wallet_handler);

    let list = warp::path!("wallets")
        .and(warp::get())
        .and(with_store())
        .and_then(list_wallets_handler);

    create.or(read).or(update).or(delete).or(list)
}

// Each matched request opens its own store scope; the connection is released
// when the handler returns, on success or failure. Runs after body and query
// extraction so invalid requests never touch the store.
fn with_store() -> impl Filter<Extract = (DocumentStore,), Error = Rejection> + Clone {
    warp::any().and_then(open_store)
}

async fn open_store() -> Result<DocumentStore, Rejection> {
    DocumentStore::connect().await.map_err(|e| {
        error!("Failed to connect to document store: {}", e);
        warp::reject::custom(CustomError {
            message: e.to_string(),
        })
    })
}

async fn create_wallet_handler(
    wallet: Wallet,
    store: DocumentStore,
) -> Result<impl Reply, Rejection> {
    match store.add_document(wallet).await {
        Ok(wallet) => {
            info!("Wallet created with id {:?}", wallet.id);
            Ok(warp::reply::json(&wallet))
        }
        Err(e) => {
            error!("Failed to create wallet: {}", e);
            Err(warp::reject::custom(CustomError {
                message: e.to_string(),
            }))
        }
    }
}

async fn read_wallet_handler(
    wallet_id: String,
    store: DocumentStore,
) -> Result<impl Reply, Rejection> {
    match store.get_document(WALLET_COLLECTION, &wallet_id).await {
        Ok(Some(data)) => match wallet_from_document(data) {
            Ok(wallet) => {
                info!("Wallet {} retrieved", wallet_id);
                Ok(warp::reply::json(&wallet))
            }
            Err(e) => {
                error!("Failed to decode wallet {}: {}", wallet_id, e);
                Err(warp::reject::custom(CustomError {
                    message: e.to_string(),
                }))
            }
        },
        Ok(None) => Err(warp::reject::custom(WalletNotFound)),
        Err(e) => {
            error!("Failed to retrieve wallet {}: {}", wallet_id, e);
            Err(warp::reject::custom(CustomError {
                message: e.to_string(),
            }))
        }
    }
}

async fn update_wallet_handler(
    wallet_id: String,
    query: UpdateWalletQuery,
    store: DocumentStore,
) -> Result<impl Reply, Rejection> {
    let mut data = match store.get_document(WALLET_COLLECTION, &wallet_id).await {
        Ok(Some(data)) => data,
        Ok(None) => return Err(warp::reject::custom(WalletNotFound)),
        Err(e) => {
            error!("Failed to retrieve wallet {}: {}", wallet_id, e);
            return Err(warp::reject::custom(CustomError {
                message: e.to_string(),
            }));
        }
    };

    // The response echoes this in-memory merge; the stored document is not
    // re-read after the write.
    data.insert("name", query.name);
    data.insert("description", query.description);

    match store
        .update_document(WALLET_COLLECTION, &wallet_id, data.clone())
        .await
    {
        Ok(true) => match wallet_from_document(data) {
            Ok(wallet) => {
                info!("Wallet {} updated", wallet_id);
                Ok(warp::reply::json(&wallet))
            }
            Err(e) => {
                error!("Failed to decode wallet {}: {}", wallet_id, e);
                Err(warp::reject::custom(CustomError {
                    message: e.to_string(),
                }))
            }
        },
        Ok(false) => Err(warp::reject::custom(WalletUpdateFailed)),
        Err(e) => {
            error!("Failed to update wallet {}: {}", wallet_id, e);
            Err(warp::reject::custom(CustomError {
                message: e.to_string(),
            }))
        }
    }
}

async fn delete_wallet_handler(
    wallet_id: String,
    store: DocumentStore,
) -> Result<impl Reply, Rejection> {
    match store.delete_document(WALLET_COLLECTION, &wallet_id).await {
        Ok(true) => {
            info!("Wallet {} deleted", wallet_id);
            Ok(warp::reply())
        }
        Ok(false) => Err(warp::reject::custom(WalletNotFound)),
        Err(e) => {
            error!("Failed to delete wallet {}: {}", wallet_id, e);
            Err(warp::reject::custom(CustomError {
                message: e.to_string(),
            }))
        }
    }
}

async fn list_wallets_handler(store: DocumentStore) -> Result<impl Reply, Rejection> {
    match store.list_document(WALLET_COLLECTION).await {
        Ok(documents) => {
            let wallets: Result<Vec<Wallet>, _> =
                documents.into_iter().map(wallet_from_document).collect();
            match wallets {
                Ok(wallets) => {
                    info!("Listed {} wallets", wallets.len());
                    Ok(warp::reply::json(&wallets))
                }
                Err(e) => {
                    error!("Failed to decode wallet listing: {}", e);
                    Err(warp::reject::custom(CustomError {
                        message: e.to_string(),
                    }))
                }
            }
        }
        Err(e) => {
            error!("Failed to list wallets: {}", e);
            Err(warp::reject::custom(CustomError {
                message: e.to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::handle_rejection;
    use warp::http::StatusCode;

    // Validation and routing rejections resolve before any store scope is
    // opened, so these run without a database.

    #[tokio::test]
    async fn malformed_wallet_body_is_rejected_with_422() {
        let api = routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/wallets")
            .header("content-type", "application/json")
            .body(r#"{"name": 42}"#)
            .reply(&api)
            .await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn update_without_name_parameter_is_rejected_with_422() {
        let api = routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("PUT")
            .path("/wallets/650c8c7e8e6a5d0a9c3e0b1a")
            .reply(&api)
            .await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_path_is_rejected_with_404() {
        let api = routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("GET")
            .path("/portfolios")
            .reply(&api)
            .await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected_with_405() {
        let api = routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("PATCH")
            .path("/wallets")
            .reply(&api)
            .await;

        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
