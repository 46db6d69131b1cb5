//! Handle `dkl certificate`.

use dakhla_core::enums::RecordKind;
use dakhla_db::repos::certificate::{CertificateFilter, NewCertificate};
use dakhla_db::updates::certificate::CertificateUpdate;

use crate::cli::{
    CertificateAction, CertificateCreateArgs, CertificateListArgs, CertificateUpdateArgs,
};
use crate::commands::{clearable, page_and_sort};
use crate::context::AppContext;
use crate::output;

pub async fn handle(action: &CertificateAction, ctx: &AppContext) -> anyhow::Result<()> {
    let origin = ctx.origin();
    match action {
        CertificateAction::Create(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .create_certificate(actor, new_from_args(args), &origin)
                    .await,
            )
        }
        CertificateAction::Get { id } => {
            let actor = ctx.actor()?;
            output::emit(ctx.service.get_certificate(actor, id, &origin).await)
        }
        CertificateAction::List(args) => {
            let actor = ctx.actor()?;
            let (page, sort) = page_and_sort(&args.list, &ctx.config.general);
            output::emit(
                ctx.service
                    .list_certificates(actor, &filter_from_args(args), page, &sort)
                    .await,
            )
        }
        CertificateAction::Update(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .update_certificate(actor, &args.id, update_from_args(args), &origin)
                    .await,
            )
        }
        CertificateAction::Delete { id } => {
            let actor = ctx.actor()?;
            output::emit(ctx.service.delete_certificate(actor, id, &origin).await)
        }
        CertificateAction::Transition(args) => {
            let actor = ctx.actor()?;
            output::emit(
                ctx.service
                    .transition_certificate(
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
        CertificateAction::Transitions { id } => output::emit(
            ctx.service
                .transition_options(RecordKind::Certificate, id)
                .await,
        ),
        CertificateAction::History { id } => {
            output::emit(ctx.service.status_history_for("certificates", id).await)
        }
    }
}

fn new_from_args(args: &CertificateCreateArgs) -> NewCertificate {
    NewCertificate {
        school_id: args.school_id.clone(),
        student_id: args.student_id.clone(),
        serial_no: args.serial_no.clone(),
        general_register_ref: args.general_register_ref.clone(),
        previous_school: args.previous_school.clone(),
        admission_date: args.admission_date,
        admission_class: args.admission_class.clone(),
        progress_in_studies: args.progress_in_studies.clone(),
        conduct: args.conduct.clone(),
        leaving_date: args.leaving_date,
        leaving_class: args.leaving_class.clone(),
        reason_for_leaving: args.reason_for_leaving.clone(),
        remarks: args.remarks.clone(),
        certificate_date: args.certificate_date,
        class_teacher_name: args.class_teacher_name.clone(),
        clerk_name: args.clerk_name.clone(),
        headmaster_name: args.headmaster_name.clone(),
    }
}

fn update_from_args(args: &CertificateUpdateArgs) -> CertificateUpdate {
    CertificateUpdate {
        serial_no: clearable(args.serial_no.clone()),
        general_register_ref: clearable(args.general_register_ref.clone()),
        previous_school: clearable(args.previous_school.clone()),
        admission_date: None,
        admission_class: clearable(args.admission_class.clone()),
        progress_in_studies: clearable(args.progress_in_studies.clone()),
        conduct: clearable(args.conduct.clone()),
        leaving_date: args.leaving_date.map(Some),
        leaving_class: clearable(args.leaving_class.clone()),
        reason_for_leaving: clearable(args.reason_for_leaving.clone()),
        remarks: clearable(args.remarks.clone()),
        certificate_date: args.certificate_date.map(Some),
        class_teacher_name: clearable(args.class_teacher_name.clone()),
        clerk_name: clearable(args.clerk_name.clone()),
        headmaster_name: clearable(args.headmaster_name.clone()),
        comment: clearable(args.comment.clone()),
    }
}

fn filter_from_args(args: &CertificateListArgs) -> CertificateFilter {
    CertificateFilter {
        status: args.status,
        school_id: args.school_id.clone(),
        student_id: args.student_id.clone(),
        search: args.search.clone(),
        leaving_after: args.leaving_after,
        leaving_before: args.leaving_before,
    }
}
