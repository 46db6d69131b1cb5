//! Handle `dkl login` / `dkl logout`.
//!
//! Authentication itself is the external provider's business; these commands
//! only record the session events in the audit log.

use crate::cli::LoginArgs;
use crate::context::AppContext;
use crate::output;

pub async fn login(args: &LoginArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    ctx.service
        .record_login(actor, &ctx.origin(), &args.method)
        .await;
    output::emit(Ok(serde_json::json!({ "logged_in": actor.id })))
}

pub async fn logout(ctx: &AppContext) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    ctx.service.record_logout(actor, &ctx.origin()).await;
    output::emit(Ok(serde_json::json!({ "logged_out": actor.id })))
}
