//! Companies Repository
//!
//! None of these queries filter on `tenant_uuid`; the bound tenant's row-level
//! security policies decide which rows are visible.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    companies::{
        data::{CompanyUpdate, DEFAULT_TIMEZONE, NewCompany},
        records::{CompanyRecord, CompanyUuid},
    },
    tenants::records::TenantUuid,
};

const LIST_COMPANIES_SQL: &str = include_str!("sql/list_companies.sql");
const GET_COMPANY_SQL: &str = include_str!("sql/get_company.sql");
const CREATE_COMPANY_SQL: &str = include_str!("sql/create_company.sql");
const INSERT_COMPANY_SQL: &str = include_str!("sql/insert_company.sql");
const UPDATE_COMPANY_SQL: &str = include_str!("sql/update_company.sql");
const DELETE_COMPANY_SQL: &str = include_str!("sql/delete_company.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCompaniesRepository;

impl PgCompaniesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_companies(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CompanyRecord>, sqlx::Error> {
        query_as::<Postgres, CompanyRecord>(LIST_COMPANIES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_company(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyUuid,
    ) -> Result<CompanyRecord, sqlx::Error> {
        query_as::<Postgres, CompanyRecord>(GET_COMPANY_SQL)
            .bind(company.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_company(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        company: NewCompany,
    ) -> Result<CompanyRecord, sqlx::Error> {
        query_as::<Postgres, CompanyRecord>(CREATE_COMPANY_SQL)
            .bind(company.uuid.into_uuid())
            .bind(tenant.into_uuid())
            .bind(company.name)
            .bind(company.identifier)
            .bind(company.country)
            .bind(company.industry)
            .bind(
                company
                    .timezone
                    .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            )
            .bind(company.opt_in_benchmarking.unwrap_or(true))
            .bind(company.is_demo)
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert without reading the row back.
    ///
    /// With no tenant bound the row is writable but not readable, so `RETURNING`
    /// would be refused.
    pub(crate) async fn insert_company(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        company: NewCompany,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(INSERT_COMPANY_SQL)
            .bind(company.uuid.into_uuid())
            .bind(tenant.into_uuid())
            .bind(company.name)
            .bind(company.identifier)
            .bind(company.country)
            .bind(company.industry)
            .bind(
                company
                    .timezone
                    .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            )
            .bind(company.opt_in_benchmarking.unwrap_or(true))
            .bind(company.is_demo)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn update_company(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyUuid,
        update: CompanyUpdate,
    ) -> Result<CompanyRecord, sqlx::Error> {
        query_as::<Postgres, CompanyRecord>(UPDATE_COMPANY_SQL)
            .bind(company.into_uuid())
            .bind(update.name)
            .bind(update.identifier)
            .bind(update.country)
            .bind(update.industry)
            .bind(update.timezone)
            .bind(update.opt_in_benchmarking)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_company(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_COMPANY_SQL)
            .bind(company.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CompanyRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CompanyUuid::from_uuid(row.try_get("uuid")?),
            tenant_uuid: TenantUuid::from_uuid(row.try_get("tenant_uuid")?),
            name: row.try_get("name")?,
            identifier: row.try_get("identifier")?,
            country: row.try_get("country")?,
            industry: row.try_get("industry")?,
            timezone: row.try_get("timezone")?,
            opt_in_benchmarking: row.try_get("opt_in_benchmarking")?,
            is_demo: row.try_get("is_demo")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
