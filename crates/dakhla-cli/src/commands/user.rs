//! Handle `dkl user`.

use crate::cli::UserAction;
use crate::context::AppContext;
use crate::output;

pub async fn handle(action: &UserAction, ctx: &AppContext) -> anyhow::Result<()> {
    match action {
        UserAction::Create {
            username,
            full_name,
            role,
        } => {
            output::emit(
                ctx.service
                    .create_user(username, full_name.as_deref(), *role)
                    .await,
            )
        }
        UserAction::List => output::emit(ctx.service.list_users().await),
        UserAction::Delete { id } => output::emit(ctx.service.delete_user(id).await),
    }
}
