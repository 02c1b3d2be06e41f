//! # Client Repository

use barberia_core::Client;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Lists every client, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let rows = sqlx::query("SELECT id, name, document FROM clients ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(client_from_row).collect()
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Client>> {
        let row = sqlx::query("SELECT id, name, document FROM clients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(client_from_row).transpose()
    }

    /// Inserts a client keeping its id (seed and import).
    pub async fn insert(&self, client: &Client) -> DbResult<()> {
        debug!(id = client.id, name = %client.name, "Inserting client");

        sqlx::query("INSERT INTO clients (id, name, document) VALUES (?1, ?2, ?3)")
            .bind(client.id)
            .bind(&client.name)
            .bind(&client.document)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Creates a client with a generated id.
    pub async fn create(&self, name: &str, document: Option<&str>) -> DbResult<Client> {
        let result = sqlx::query("INSERT INTO clients (name, document) VALUES (?1, ?2)")
            .bind(name)
            .bind(document)
            .execute(&self.pool)
            .await?;

        let client = Client {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            document: document.map(str::to_string),
        };
        debug!(id = client.id, "Client created");
        Ok(client)
    }

    /// Counts clients (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn client_from_row(row: &SqliteRow) -> DbResult<Client> {
    Ok(Client {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        document: row.try_get("document")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::repository::fixtures::memory_db;

    #[tokio::test]
    async fn test_create_and_list() {
        let db = memory_db().await;
        let repo = db.clients();

        let ana = repo.create("Ana Gómez", Some("52123456")).await.unwrap();
        repo.create("Bruno Díaz", None).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Ana Gómez");
        assert_eq!(repo.get_by_id(ana.id).await.unwrap(), Some(ana));
        assert_eq!(repo.get_by_id(999).await.unwrap(), None);
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
