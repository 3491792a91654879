//! Locations Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    companies::records::CompanyUuid,
    locations::{
        data::NewLocation,
        records::{LocationRecord, LocationUuid},
    },
};

const LIST_LOCATIONS_SQL: &str = include_str!("sql/list_locations.sql");
const CREATE_LOCATION_SQL: &str = include_str!("sql/create_location.sql");
const SOFT_DELETE_LOCATION_SQL: &str = include_str!("sql/soft_delete_location.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgLocationsRepository;

impl PgLocationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_locations(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyUuid,
    ) -> Result<Vec<LocationRecord>, sqlx::Error> {
        query_as::<Postgres, LocationRecord>(LIST_LOCATIONS_SQL)
            .bind(company.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_location(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyUuid,
        location: NewLocation,
    ) -> Result<LocationRecord, sqlx::Error> {
        query_as::<Postgres, LocationRecord>(CREATE_LOCATION_SQL)
            .bind(location.uuid.into_uuid())
            .bind(company.into_uuid())
            .bind(location.name)
            .bind(location.address)
            .bind(location.website)
            .bind(location.is_primary)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn soft_delete_location(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        location: LocationUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SOFT_DELETE_LOCATION_SQL)
            .bind(location.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for LocationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: LocationUuid::from_uuid(row.try_get("uuid")?),
            company_uuid: CompanyUuid::from_uuid(row.try_get("company_uuid")?),
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            website: row.try_get("website")?,
            is_primary: row.try_get("is_primary")?,
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
