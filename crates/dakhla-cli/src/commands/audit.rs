//! Handle `dkl audit`.

use chrono::{DateTime, Utc};

use dakhla_core::errors::DomainError;
use dakhla_db::repos::audit::AuditFilter;

use crate::cli::AuditArgs;
use crate::commands::page_and_sort;
use crate::context::AppContext;
use crate::output;

pub async fn handle(args: &AuditArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let result = query(args, ctx).await;
    output::emit(result)
}

async fn query(
    args: &AuditArgs,
    ctx: &AppContext,
) -> Result<dakhla_core::responses::Page<dakhla_core::entities::AuditEntry>, DomainError> {
    let filter = AuditFilter {
        table_name: args.table.clone(),
        record_id: args.record.clone(),
        changed_by: args.changed_by.clone(),
        action: args.action,
        start_date: parse_bound(args.from.as_deref(), "from")?,
        end_date: parse_bound(args.to.as_deref(), "to")?,
    };
    let (page, _) = page_and_sort(&args.list, &ctx.config.general);
    ctx.service.query_audit(&filter, page).await
}

fn parse_bound(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>, DomainError> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DomainError::validation(field, format!("expected RFC 3339: {e}")))
        })
        .transpose()
}
