//! Shared test utilities for dakhla-db integration tests.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::NaiveDate;

    use dakhla_core::entities::User;
    use dakhla_core::enums::Role;
    use dakhla_core::identity::Actor;

    use crate::DakhlaDb;
    use crate::repos::certificate::NewCertificate;
    use crate::repos::school::NewSchool;
    use crate::repos::student::NewStudent;
    use crate::service::DakhlaService;

    /// One seeded account per role.
    pub struct TestUsers {
        pub admin: User,
        pub super_user: User,
        pub viewer: User,
    }

    /// Create an in-memory service (no seeded users).
    pub async fn test_service() -> DakhlaService {
        let db = DakhlaDb::open_local(":memory:").await.unwrap();
        DakhlaService::from_db(db)
    }

    /// Create an in-memory service with one account per role.
    pub async fn test_service_with_users() -> (DakhlaService, TestUsers) {
        let svc = test_service().await;
        let admin = svc
            .create_user("clerk", Some("Registry Clerk"), Role::Admin)
            .await
            .unwrap();
        let super_user = svc
            .create_user("headmaster", Some("Headmaster"), Role::Super)
            .await
            .unwrap();
        let viewer = svc
            .create_user("parent", Some("Parent"), Role::User)
            .await
            .unwrap();
        (
            svc,
            TestUsers {
                admin,
                super_user,
                viewer,
            },
        )
    }

    pub fn admin_actor(users: &TestUsers) -> Actor {
        Actor::new(users.admin.id.clone(), Role::Admin)
    }

    pub fn super_actor(users: &TestUsers) -> Actor {
        Actor::new(users.super_user.id.clone(), Role::Super)
    }

    pub fn user_actor(users: &TestUsers) -> Actor {
        Actor::new(users.viewer.id.clone(), Role::User)
    }

    /// A minimal valid student payload keyed by general register number.
    pub fn new_student(full_name: &str, student_id: &str) -> NewStudent {
        NewStudent {
            student_id: Some(student_id.to_string()),
            full_name: full_name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2010, 6, 15),
            birth_place_district: Some("Pune".to_string()),
            nationality: Some("Indian".to_string()),
            ..Default::default()
        }
    }

    /// A minimal valid school payload keyed by recognition number.
    pub fn new_school(name: &str, recognition_no: &str) -> NewSchool {
        NewSchool {
            name: name.to_string(),
            school_recognition_no: Some(recognition_no.to_string()),
            district: Some("Pune".to_string()),
            board: Some("Maharashtra State".to_string()),
            medium: Some("Marathi".to_string()),
            ..Default::default()
        }
    }

    /// A minimal valid certificate payload keyed by serial number.
    pub fn new_certificate(school_id: &str, student_id: &str, serial_no: &str) -> NewCertificate {
        NewCertificate {
            school_id: school_id.to_string(),
            student_id: student_id.to_string(),
            serial_no: Some(serial_no.to_string()),
            leaving_class: Some("10th".to_string()),
            reason_for_leaving: Some("Completed schooling".to_string()),
            ..Default::default()
        }
    }
}
