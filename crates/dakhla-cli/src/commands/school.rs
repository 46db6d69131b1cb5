//! Handle `dkl school`.

use dakhla_core::enums::RecordKind;
use dakhla_db::repos::school::{NewSchool, SchoolFilter};
use dakhla_db::updates::school::SchoolUpdate;

use crate::cli::{SchoolAction, SchoolCreateArgs, SchoolListArgs, SchoolUpdateArgs};
use crate::commands::{clearable, page_and_sort};
use crate::context::AppContext;
use crate::output;

pub async fn handle(action: &SchoolAction, ctx: &AppContext) -> anyhow::Result<()> {
    let origin = ctx.origin();
    match action {
        SchoolAction::Create(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .create_school(actor, new_from_args(args), &origin)
                    .await,
            )
        }
        SchoolAction::Get { id } => {
            let actor = ctx.actor()?;
            output::emit(ctx.service.get_school(actor, id, &origin).await)
        }
        SchoolAction::List(args) => {
            let actor = ctx.actor()?;
            let (page, sort) = page_and_sort(&args.list, &ctx.config.general);
            output::emit(
                ctx.service
                    .list_schools(actor, &filter_from_args(args), page, &sort)
                    .await,
            )
        }
        SchoolAction::Update(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .update_school(actor, &args.id, update_from_args(args), &origin)
                    .await,
            )
        }
        SchoolAction::Delete { id } => {
            let actor = ctx.actor()?;
            output::emit(ctx.service.delete_school(actor, id, &origin).await)
        }
        SchoolAction::Transition(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .transition_school(
                        actor,
                        &args.id,
                        args.to,
                        args.reason.as_deref(),
                        args.comment.as_deref(),
                        &origin,
                    )
                    .await,
            )
        }
        SchoolAction::Transitions { id } => {
            output::emit(ctx.service.transition_options(RecordKind::School, id).await)
        }
        SchoolAction::History { id } => {
            output::emit(ctx.service.status_history_for("schools", id).await)
        }
    }
}

fn new_from_args(args: &SchoolCreateArgs) -> NewSchool {
    NewSchool {
        name: args.name.clone(),
        address: args.address.clone(),
        taluka: args.taluka.clone(),
        district: args.district.clone(),
        state: args.state.clone(),
        phone_no: args.phone_no.clone(),
        email: args.email.clone(),
        general_register_no: args.general_register_no.clone(),
        school_recognition_no: args.school_recognition_no.clone(),
        udise_no: args.udise_no.clone(),
        affiliation_no: args.affiliation_no.clone(),
        board: args.board.clone(),
        medium: args.medium.clone(),
    }
}

fn update_from_args(args: &SchoolUpdateArgs) -> SchoolUpdate {
    SchoolUpdate {
        name: args.name.clone(),
        address: clearable(args.address.clone()),
        taluka: clearable(args.taluka.clone()),
        district: clearable(args.district.clone()),
        state: clearable(args.state.clone()),
        phone_no: clearable(args.phone_no.clone()),
        email: clearable(args.email.clone()),
        general_register_no: clearable(args.general_register_no.clone()),
        school_recognition_no: clearable(args.school_recognition_no.clone()),
        udise_no: clearable(args.udise_no.clone()),
        affiliation_no: clearable(args.affiliation_no.clone()),
        board: clearable(args.board.clone()),
        medium: clearable(args.medium.clone()),
        comment: clearable(args.comment.clone()),
    }
}

fn filter_from_args(args: &SchoolListArgs) -> SchoolFilter {
    SchoolFilter {
        status: args.status,
        search: args.search.clone(),
        district: args.district.clone(),
        board: args.board.clone(),
    }
}
