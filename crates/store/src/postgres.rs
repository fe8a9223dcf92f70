//! Postgres-backed stores for the relational entities.
//!
//! Every query is parameterized; the schema lives in `migrations/`. One pool
//! is shared by all three trait implementations.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use calenduck_auth::Role;
use calenduck_core::{AskIdx, CategoryIdx, InterestIdx, UserIdx};

use crate::accounts::{AccountStore, Credential, NewAccount};
use crate::asks::{Ask, AskCategory, AskStore, NewAsk};
use crate::error::StoreError;
use crate::interests::{Interest, InterestStore};

/// Relational store over a shared `sqlx` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        tracing::info!("connected to postgres");
        Ok(Self::new(pool))
    }
}

fn ask_from_row(row: &PgRow) -> Result<Ask, StoreError> {
    Ok(Ask {
        idx: AskIdx::new(row.try_get("idx")?),
        user_idx: UserIdx::new(row.try_get("user_idx")?),
        category_idx: CategoryIdx::new(row.try_get("ask_category_idx")?),
        category_name: row.try_get("category_name")?,
        title: row.try_get("title")?,
        contents: row.try_get("contents")?,
        reply: row.try_get("reply")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl AskStore for PgStore {
    async fn list_categories(&self) -> Result<Vec<AskCategory>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT idx, name
            FROM calenduck.ask_category
            WHERE is_deleted = false
            ORDER BY idx ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(AskCategory {
                    idx: CategoryIdx::new(row.try_get("idx")?),
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn create_category(&self, name: &str) -> Result<CategoryIdx, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO calenduck.ask_category(name)
            VALUES($1)
            RETURNING idx
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(CategoryIdx::new(row.try_get("idx")?))
    }

    async fn delete_category(&self, idx: CategoryIdx) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE calenduck.ask_category
            SET is_deleted = true
            WHERE idx = $1 AND is_deleted = false
            "#,
        )
        .bind(idx.as_i32())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn category_exists(&self, idx: CategoryIdx) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS one
            FROM calenduck.ask_category
            WHERE idx = $1 AND is_deleted = false
            "#,
        )
        .bind(idx.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn create_ask(&self, ask: NewAsk) -> Result<AskIdx, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO calenduck.ask(user_idx, ask_category_idx, title, contents)
            VALUES($1, $2, $3, $4)
            RETURNING idx
            "#,
        )
        .bind(ask.user_idx.as_i32())
        .bind(ask.category_idx.as_i32())
        .bind(&ask.title)
        .bind(&ask.contents)
        .fetch_one(&self.pool)
        .await?;

        Ok(AskIdx::new(row.try_get("idx")?))
    }

    async fn list_asks_for_user(&self, user: UserIdx) -> Result<Vec<Ask>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT CA.idx, CA.user_idx, CA.ask_category_idx, CC.name AS category_name,
                   CA.title, CA.contents, CA.reply, CA.created_at
            FROM calenduck.ask CA
            JOIN calenduck.ask_category CC
            ON CA.ask_category_idx = CC.idx
            WHERE CA.user_idx = $1
            ORDER BY CA.created_at DESC, CA.idx DESC
            "#,
        )
        .bind(user.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(ask_from_row).collect()
    }

    async fn get_ask(&self, idx: AskIdx) -> Result<Option<Ask>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT CA.idx, CA.user_idx, CA.ask_category_idx, CC.name AS category_name,
                   CA.title, CA.contents, CA.reply, CA.created_at
            FROM calenduck.ask CA
            JOIN calenduck.ask_category CC
            ON CA.ask_category_idx = CC.idx
            WHERE CA.idx = $1
            "#,
        )
        .bind(idx.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(ask_from_row).transpose()
    }

    async fn set_reply(&self, idx: AskIdx, reply: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE calenduck.ask
            SET reply = $2
            WHERE idx = $1
            "#,
        )
        .bind(idx.as_i32())
        .bind(reply)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl InterestStore for PgStore {
    async fn list_all(&self) -> Result<Vec<Interest>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT idx, interest
            FROM calenduck.interest
            ORDER BY idx ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Interest {
                    idx: InterestIdx::new(row.try_get("idx")?),
                    name: row.try_get("interest")?,
                })
            })
            .collect()
    }

    async fn create(&self, name: &str) -> Result<InterestIdx, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO calenduck.interest(interest)
            VALUES($1)
            RETURNING idx
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(InterestIdx::new(row.try_get("idx")?))
    }

    async fn delete(&self, idx: InterestIdx) -> Result<(), StoreError> {
        // user_interest rows go with it via ON DELETE CASCADE.
        let result = sqlx::query(
            r#"
            DELETE FROM calenduck.interest
            WHERE idx = $1
            "#,
        )
        .bind(idx.as_i32())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn exists(&self, idx: InterestIdx) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS one
            FROM calenduck.interest
            WHERE idx = $1
            "#,
        )
        .bind(idx.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn list_for_user(&self, user: UserIdx) -> Result<Vec<Interest>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT CI.idx, CI.interest
            FROM calenduck.user_interest CUI
            JOIN calenduck.interest CI
            ON CUI.interest_idx = CI.idx
            WHERE CUI.user_idx = $1
            ORDER BY CI.interest ASC
            "#,
        )
        .bind(user.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Interest {
                    idx: InterestIdx::new(row.try_get("idx")?),
                    name: row.try_get("interest")?,
                })
            })
            .collect()
    }

    async fn add_for_user(&self, user: UserIdx, idx: InterestIdx) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO calenduck.user_interest(user_idx, interest_idx)
            VALUES($1, $2)
            "#,
        )
        .bind(user.as_i32())
        .bind(idx.as_i32())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_for_user(&self, user: UserIdx, idx: InterestIdx) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            DELETE FROM calenduck.user_interest
            WHERE user_idx = $1 AND interest_idx = $2
            "#,
        )
        .bind(user.as_i32())
        .bind(idx.as_i32())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create(&self, account: NewAccount) -> Result<UserIdx, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO calenduck.login(id, pw)
            VALUES($1, $2)
            RETURNING idx
            "#,
        )
        .bind(&account.login_id)
        .bind(&account.pw_hash)
        .fetch_one(&mut *tx)
        .await?;
        let login_idx: i32 = row.try_get("idx")?;

        let row = sqlx::query(
            r#"
            INSERT INTO calenduck."user"(login_idx, name, email)
            VALUES($1, $2, $3)
            RETURNING idx
            "#,
        )
        .bind(login_idx)
        .bind(&account.name)
        .bind(&account.email)
        .fetch_one(&mut *tx)
        .await?;
        let user_idx: i32 = row.try_get("idx")?;

        tx.commit().await?;
        Ok(UserIdx::new(user_idx))
    }

    async fn login_id_taken(&self, login_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS one
            FROM calenduck.login
            WHERE id = $1
            "#,
        )
        .bind(login_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn credential_by_login_id(
        &self,
        login_id: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT CU.idx, CU.role, CL.pw
            FROM calenduck.login CL
            JOIN calenduck."user" CU
            ON CU.login_idx = CL.idx
            WHERE CL.id = $1
            "#,
        )
        .bind(login_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(Credential {
                user_idx: UserIdx::new(row.try_get("idx")?),
                role: Role::new(row.try_get::<String, _>("role")?),
                pw_hash: row.try_get("pw")?,
            })
        })
        .transpose()
    }

    async fn find_login_id(&self, name: &str, email: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT CL.id
            FROM calenduck.login CL
            JOIN calenduck."user" CU
            ON CU.login_idx = CL.idx
            WHERE CU.name = $1 AND CU.email = $2
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Ok(row.try_get("id")?)).transpose()
    }

    async fn recovery_email(
        &self,
        name: &str,
        login_id: &str,
        email: &str,
    ) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT CU.email
            FROM calenduck.login CL
            JOIN calenduck."user" CU
            ON CU.login_idx = CL.idx
            WHERE CU.name = $1 AND CU.email = $2 AND CL.id = $3
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(login_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Ok(row.try_get("email")?)).transpose()
    }

    async fn update_password_by_email(
        &self,
        email: &str,
        pw_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE calenduck.login CL
            SET pw = $2
            FROM calenduck."user" CU
            WHERE CL.idx = CU.login_idx AND CU.email = $1
            "#,
        )
        .bind(email)
        .bind(pw_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, user: UserIdx) -> Result<(), StoreError> {
        // Deleting the login row cascades to the user row (and its links).
        let result = sqlx::query(
            r#"
            DELETE FROM calenduck.login CL
            USING calenduck."user" CU
            WHERE CL.idx = CU.login_idx AND CU.idx = $1
            "#,
        )
        .bind(user.as_i32())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
