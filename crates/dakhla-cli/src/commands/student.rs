//! Handle `dkl student`.

use dakhla_core::enums::RecordKind;
use dakhla_db::repos::student::{NewStudent, StudentFilter};
use dakhla_db::updates::student::StudentUpdate;

use crate::cli::{StudentAction, StudentCreateArgs, StudentListArgs, StudentUpdateArgs};
use crate::commands::{clearable, page_and_sort};
use crate::context::AppContext;
use crate::output;

pub async fn handle(action: &StudentAction, ctx: &AppContext) -> anyhow::Result<()> {
    let origin = ctx.origin();
    match action {
        StudentAction::Create(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .create_student(actor, new_from_args(args), &origin)
                    .await,
            )
        }
        StudentAction::Get { id } => {
            let actor = ctx.actor()?;
            output::emit(ctx.service.get_student(actor, id, &origin).await)
        }
        StudentAction::List(args) => {
            let actor = ctx.actor()?;
            let (page, sort) = page_and_sort(&args.list, &ctx.config.general);
            output::emit(
                ctx.service
                    .list_students(actor, &filter_from_args(args), page, &sort)
                    .await,
            )
        }
        StudentAction::Update(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .update_student(actor, &args.id, update_from_args(args), &origin)
                    .await,
            )
        }
        StudentAction::Delete { id } => {
            let actor = ctx.actor()?;
            output::emit(ctx.service.delete_student(actor, id, &origin).await)
        }
        StudentAction::Transition(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .transition_student(
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
        StudentAction::Transitions { id } => output::emit(
            ctx.service
                .transition_options(RecordKind::Student, id)
                .await,
        ),
        StudentAction::History { id } => {
            output::emit(ctx.service.status_history_for("students", id).await)
        }
    }
}

fn new_from_args(args: &StudentCreateArgs) -> NewStudent {
    NewStudent {
        student_id: args.student_id.clone(),
        uid_aadhar_no: args.uid_aadhar_no.clone(),
        full_name: args.full_name.clone(),
        father_name: args.father_name.clone(),
        mother_name: args.mother_name.clone(),
        surname: args.surname.clone(),
        nationality: args.nationality.clone(),
        mother_tongue: args.mother_tongue.clone(),
        religion: args.religion.clone(),
        caste: args.caste.clone(),
        birth_place_village: args.birth_place_village.clone(),
        birth_place_district: args.birth_place_district.clone(),
        birth_place_state: args.birth_place_state.clone(),
        date_of_birth: Some(args.date_of_birth),
        date_of_birth_words: args.date_of_birth_words.clone(),
    }
}

fn update_from_args(args: &StudentUpdateArgs) -> StudentUpdate {
    StudentUpdate {
        student_id: clearable(args.student_id.clone()),
        uid_aadhar_no: clearable(args.uid_aadhar_no.clone()),
        full_name: args.full_name.clone(),
        father_name: clearable(args.father_name.clone()),
        mother_name: clearable(args.mother_name.clone()),
        surname: clearable(args.surname.clone()),
        nationality: clearable(args.nationality.clone()),
        mother_tongue: clearable(args.mother_tongue.clone()),
        religion: clearable(args.religion.clone()),
        caste: clearable(args.caste.clone()),
        birth_place_village: clearable(args.birth_place_village.clone()),
        birth_place_district: clearable(args.birth_place_district.clone()),
        birth_place_state: clearable(args.birth_place_state.clone()),
        date_of_birth: args.date_of_birth,
        date_of_birth_words: clearable(args.date_of_birth_words.clone()),
        comment: clearable(args.comment.clone()),
    }
}

fn filter_from_args(args: &StudentListArgs) -> StudentFilter {
    StudentFilter {
        status: args.status,
        search: args.search.clone(),
        birth_place_district: args.birth_place_district.clone(),
        born_after: args.born_after,
        born_before: args.born_before,
        created_by: None,
    }
}
