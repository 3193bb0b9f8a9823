use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::analytics::model::{
    DistributionStats, GradeBucket, SubjectDistribution, SubjectSummary, TopPerformer, TrendPoint,
};
use crate::modules::attendance::model::{
    AttendanceEntry, AttendanceEntryError, AttendanceRecord, AttendanceStatus, AttendanceSummary,
    AttendanceWithContext, BulkAttendanceResponse, MarkAttendanceDto, PaginatedAttendanceResponse,
    StatusCount, SubjectAttendance,
};
use crate::modules::audit::model::{AuditLog, PaginatedAuditResponse};
use crate::modules::auth::controller::{ErrorBody, ErrorResponse};
use crate::modules::auth::model::{
    AuthResponse, LoginRequest, MessageResponse, RefreshTokenRequest, RegisterRequestDto,
};
use crate::modules::classes::model::{
    AssignStudentDto, Class, CreateClassDto, PaginatedClassesResponse, UpdateClassDto,
};
use crate::modules::notifications::model::{
    Notification, PaginatedNotificationsResponse, UnreadCountResponse,
};
use crate::modules::reports::model::{
    ClassReport, ClassStatistics, ReportLine, ReportSummary, StudentPerformance, StudentReport,
};
use crate::modules::results::grading::GradeBand;
use crate::modules::results::model::{
    BulkEntryResponse, EnterMarksDto, EntryError, ExamResult, ExamType, MarkEntry,
    PaginatedResultsResponse, ResultWithContext, UpdateResultDto,
};
use crate::modules::settings::model::{Setting, UpdateSettingDto};
use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, Student, StudentWithUser, UpdateStudentDto,
};
use crate::modules::subjects::model::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, UpdateSubjectDto,
};
use crate::modules::teachers::model::{
    AssignSubjectsDto, AssignedSubject, CreateTeacherDto, PaginatedTeachersResponse,
    TeacherDetail, TeacherWithUser, UpdateTeacherDto,
};
use crate::modules::users::model::{
    ChangePasswordDto, PaginatedUsersResponse, UpdateProfileDto, User, UserRole,
};
use crate::utils::pagination::PaginationMeta;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::get_profile,
        crate::modules::auth::controller::update_profile,
        crate::modules::auth::controller::change_password,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::deactivate_user,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::assign_subjects,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::get_class_roster,
        crate::modules::classes::controller::assign_student,
        crate::modules::classes::controller::remove_student,
        crate::modules::classes::controller::delete_class,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::results::controller::enter_marks,
        crate::modules::results::controller::get_results,
        crate::modules::results::controller::get_result,
        crate::modules::results::controller::update_result,
        crate::modules::results::controller::approve_result,
        crate::modules::results::controller::delete_result,
        crate::modules::attendance::controller::mark_attendance,
        crate::modules::attendance::controller::get_attendance,
        crate::modules::attendance::controller::get_attendance_summary,
        crate::modules::reports::controller::get_student_report,
        crate::modules::reports::controller::get_class_report,
        crate::modules::analytics::controller::get_top_performers,
        crate::modules::analytics::controller::get_subject_distribution,
        crate::modules::analytics::controller::get_performance_trends,
        crate::modules::notifications::controller::get_notifications,
        crate::modules::notifications::controller::unread_count,
        crate::modules::notifications::controller::mark_read,
        crate::modules::audit::controller::get_audit_logs,
        crate::modules::settings::controller::get_settings,
        crate::modules::settings::controller::get_setting,
        crate::modules::settings::controller::upsert_setting,
    ),
    components(
        schemas(
            User,
            UserRole,
            UpdateProfileDto,
            ChangePasswordDto,
            PaginatedUsersResponse,
            RegisterRequestDto,
            LoginRequest,
            RefreshTokenRequest,
            AuthResponse,
            MessageResponse,
            ErrorResponse,
            ErrorBody,
            Student,
            StudentWithUser,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            TeacherWithUser,
            TeacherDetail,
            AssignedSubject,
            CreateTeacherDto,
            UpdateTeacherDto,
            AssignSubjectsDto,
            PaginatedTeachersResponse,
            Class,
            CreateClassDto,
            UpdateClassDto,
            AssignStudentDto,
            PaginatedClassesResponse,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            PaginatedSubjectsResponse,
            ExamType,
            ExamResult,
            ResultWithContext,
            MarkEntry,
            EnterMarksDto,
            UpdateResultDto,
            EntryError,
            BulkEntryResponse,
            PaginatedResultsResponse,
            GradeBand,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceWithContext,
            AttendanceEntry,
            MarkAttendanceDto,
            AttendanceEntryError,
            BulkAttendanceResponse,
            PaginatedAttendanceResponse,
            StatusCount,
            AttendanceSummary,
            SubjectAttendance,
            ReportLine,
            ReportSummary,
            StudentReport,
            StudentPerformance,
            ClassStatistics,
            ClassReport,
            TopPerformer,
            GradeBucket,
            DistributionStats,
            SubjectSummary,
            SubjectDistribution,
            TrendPoint,
            Notification,
            PaginatedNotificationsResponse,
            UnreadCountResponse,
            AuditLog,
            PaginatedAuditResponse,
            Setting,
            UpdateSettingDto,
            PaginationMeta,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, token refresh, and session management"),
        (name = "Users", description = "User administration"),
        (name = "Students", description = "Student profile management"),
        (name = "Teachers", description = "Teacher profile and subject assignment"),
        (name = "Classes", description = "Class and roster management"),
        (name = "Subjects", description = "Subjects and marking schemes"),
        (name = "Results", description = "Mark entry, grading, and approval"),
        (name = "Attendance", description = "Attendance marking and summaries"),
        (name = "Reports", description = "Student and class report summaries"),
        (name = "Analytics", description = "Aggregated performance analytics"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Audit", description = "Audit trail"),
        (name = "Settings", description = "Runtime configuration")
    ),
    info(
        title = "Scorebook API",
        version = "0.1.0",
        description = "A result management REST API built with Rust, Axum, and PostgreSQL featuring JWT-based authentication with token-version revocation.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
