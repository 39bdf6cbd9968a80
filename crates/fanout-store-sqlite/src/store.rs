//! [`SqliteSessionStore`] — the SQLite implementation of
//! [`SessionStore`].

use std::path::Path;

use fanout_core::{
  book::ContactBook, config::ApiConfig, lifecycle::CampaignBoard,
  store::SessionStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{
    RawCampaign, RawContact, encode_category, encode_dt, encode_status,
    encode_tags, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Fanout session store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteSessionStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteSessionStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SessionStore implementation ─────────────────────────────────────────────

impl SessionStore for SqliteSessionStore {
  type Error = Error;

  async fn load_contacts(&self) -> Result<ContactBook> {
    let raw: Vec<RawContact> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, phone, email, opt_in_date, tags
           FROM contacts ORDER BY position ASC",
        )?;
        let rows = stmt
          .query_map([], |r| {
            Ok(RawContact {
              id:          r.get(0)?,
              name:        r.get(1)?,
              phone:       r.get(2)?,
              email:       r.get(3)?,
              opt_in_date: r.get(4)?,
              tags:        r.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let contacts = raw
      .into_iter()
      .map(RawContact::decode)
      .collect::<Result<Vec<_>>>()?;
    Ok(ContactBook::new(contacts))
  }

  async fn save_contacts(&self, book: &ContactBook) -> Result<()> {
    // Encode outside the closure; the connection thread only sees strings.
    let rows = book
      .contacts()
      .iter()
      .enumerate()
      .map(|(position, c)| {
        Ok((
          encode_uuid(c.id),
          c.name.clone(),
          c.phone.clone(),
          c.email.clone(),
          encode_dt(c.opt_in_date),
          encode_tags(&c.tags)?,
          position as i64,
        ))
      })
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM contacts", [])?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO contacts
               (id, name, phone, email, opt_in_date, tags, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for (id, name, phone, email, opt_in, tags, position) in rows {
            stmt.execute(rusqlite::params![
              id, name, phone, email, opt_in, tags, position
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_campaigns(&self) -> Result<CampaignBoard> {
    let raw: Vec<RawCampaign> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, message_text, category, status,
                  sent_count, open_count, failed_count, total_contacts,
                  created_at, compliance_score, failure_reason
           FROM campaigns ORDER BY position ASC",
        )?;
        let rows = stmt
          .query_map([], |r| {
            Ok(RawCampaign {
              id:               r.get(0)?,
              name:             r.get(1)?,
              message_text:     r.get(2)?,
              category:         r.get(3)?,
              status:           r.get(4)?,
              sent_count:       r.get(5)?,
              open_count:       r.get(6)?,
              failed_count:     r.get(7)?,
              total_contacts:   r.get(8)?,
              created_at:       r.get(9)?,
              compliance_score: r.get(10)?,
              failure_reason:   r.get(11)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let campaigns = raw
      .into_iter()
      .map(RawCampaign::decode)
      .collect::<Result<Vec<_>>>()?;
    Ok(CampaignBoard::new(campaigns))
  }

  async fn save_campaigns(&self, board: &CampaignBoard) -> Result<()> {
    let rows: Vec<_> = board
      .campaigns()
      .iter()
      .enumerate()
      .map(|(position, c)| {
        (
          encode_uuid(c.id),
          c.name.clone(),
          c.message_text.clone(),
          encode_category(c.category).to_owned(),
          encode_status(c.status).to_owned(),
          c.sent_count as i64,
          c.open_count as i64,
          c.failed_count as i64,
          c.total_contacts as i64,
          encode_dt(c.created_at),
          c.compliance_score,
          c.failure_reason.clone(),
          position as i64,
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM campaigns", [])?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO campaigns
               (id, name, message_text, category, status,
                sent_count, open_count, failed_count, total_contacts,
                created_at, compliance_score, failure_reason, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          )?;
          for (
            id,
            name,
            message_text,
            category,
            status,
            sent,
            open,
            failed,
            total,
            created_at,
            score,
            reason,
            position,
          ) in rows
          {
            stmt.execute(rusqlite::params![
              id,
              name,
              message_text,
              category,
              status,
              sent,
              open,
              failed,
              total,
              created_at,
              score,
              reason,
              position
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_api_config(&self) -> Result<ApiConfig> {
    let row: Option<(String, String, String)> = self
      .conn
      .call(|conn| {
        let row = conn
          .query_row(
            "SELECT access_token, phone_number_id, waba_id
             FROM api_config WHERE id = 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;
        Ok(row)
      })
      .await?;

    Ok(match row {
      Some((access_token, phone_number_id, waba_id)) => ApiConfig {
        access_token,
        phone_number_id,
        waba_id,
      },
      None => ApiConfig::default(),
    })
  }

  async fn save_api_config(&self, config: &ApiConfig) -> Result<()> {
    let access_token = config.access_token.clone();
    let phone_number_id = config.phone_number_id.clone();
    let waba_id = config.waba_id.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO api_config (id, access_token, phone_number_id, waba_id)
           VALUES (1, ?1, ?2, ?3)
           ON CONFLICT (id) DO UPDATE SET
             access_token    = excluded.access_token,
             phone_number_id = excluded.phone_number_id,
             waba_id         = excluded.waba_id",
          rusqlite::params![access_token, phone_number_id, waba_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
