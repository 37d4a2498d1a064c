//! Integration tests running the forms against an in-process mock backend.


use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::api::{AuthApi, RequestClient, ResourceClient};
use crate::auth::{Session, SessionContext};
use crate::db::{init_database, SessionRepository};
use crate::errors::{codes, ClientError};
use crate::forms::{FormMode, Interaction, ResourceForm, Tab};
use crate::models::{City, Committee, Program};
use mock_backend::{MockBackend, TEST_OTP, TEST_PASSWORD, TEST_TOKEN};

/// Records every prompt instead of showing it.
struct RecordingInteraction {
    answer: AtomicBool,
    alerts: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
    redirects: AtomicUsize,
}

impl RecordingInteraction {
    fn new() -> Self {
        Self {
            answer: AtomicBool::new(true),
            alerts: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
            redirects: AtomicUsize::new(0),
        }
    }

    fn decline(&self) {
        self.answer.store(false, Ordering::SeqCst);
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Interaction for RecordingInteraction {
    fn confirm(&self, message: &str) -> bool {
        self.questions.lock().unwrap().push(message.to_string());
        self.answer.load(Ordering::SeqCst)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    backend: MockBackend,
    client: RequestClient,
    ui: Arc<RecordingInteraction>,
}

impl TestFixture {
    /// Fixture with an established session.
    async fn new() -> Self {
        let fixture = Self::anonymous().await;
        fixture
            .client
            .session()
            .establish(Session {
                token: TEST_TOKEN.to_string(),
                refresh: None,
                user_id: "ADM001".to_string(),
                username: "registrar".to_string(),
                established_at: Utc::now(),
            })
            .await
            .unwrap();
        fixture
    }

    /// Fixture nobody is logged into.
    async fn anonymous() -> Self {
        let backend = MockBackend::start().await;
        let client = RequestClient::new(backend.base_url.clone(), SessionContext::in_memory());

        TestFixture {
            backend,
            client,
            ui: Arc::new(RecordingInteraction::new()),
        }
    }

    fn form<R: crate::models::Resource>(&self) -> ResourceForm<R> {
        ResourceForm::new(self.client.clone(), self.ui.clone())
    }
}

fn committee_row(id: i64, name: &str) -> Value {
    json!({
        "RECORD_ID": id,
        "COM_NAME": name,
        "COM_FORMATION_DATE": "2023-06-01",
        "ACTIVE": "Y",
        "LEVEL1": "1",
        "REMARKS": null
    })
}

fn seed_committees(backend: &MockBackend) {
    backend.seed(
        "committees",
        vec![
            committee_row(1, "Board of Studies"),
            committee_row(2, "Exam Cell"),
            committee_row(3, "IQAC"),
        ],
    );
}

#[tokio::test]
async fn test_create_committee_then_view_lists_it() {
    let fixture = TestFixture::new().await;
    let mut form = fixture.form::<Committee>();

    {
        let draft = form.draft_mut();
        draft.com_name = "Senate".to_string();
        draft.com_formation_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        draft.active = "Y".to_string();
        draft.level1 = "1".to_string();
        draft.remarks = Some(String::new());
    }

    let created = form.submit().await.unwrap();
    assert_eq!(created.com_name, "Senate");
    assert_eq!(
        fixture.ui.alerts(),
        vec!["Committee created successfully!".to_string()]
    );
    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(form.tab(), Tab::View);
    assert!(form.draft().com_name.is_empty());

    // The wire payload uses the backend's column names.
    let stored = fixture.backend.rows("committees");
    assert_eq!(stored[0]["COM_FORMATION_DATE"], "2024-01-01");
    assert_eq!(stored[0]["ACTIVE"], "Y");

    form.activate_view().await.unwrap();
    let senate = form
        .records()
        .iter()
        .find(|c| c.com_name == "Senate")
        .expect("created committee is listed");
    assert_eq!(senate.record_id, created.record_id);
    assert!(senate.record_id > 0);
}

#[tokio::test]
async fn test_edit_updates_only_the_edited_record() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);
    let mut form = fixture.form::<Committee>();
    form.activate_view().await.unwrap();

    form.begin_edit(2).unwrap();
    assert_eq!(form.mode(), FormMode::Edit(2));
    assert_eq!(form.draft().com_name, "Exam Cell");
    form.draft_mut().com_name = "Examination Cell".to_string();

    let updated = form.submit().await.unwrap();

    assert_eq!(updated.record_id, 2);
    assert_eq!(
        fixture.ui.alerts(),
        vec!["Committee updated successfully!".to_string()]
    );
    let names: Vec<_> = form.records().iter().map(|c| c.com_name.as_str()).collect();
    assert_eq!(names, vec!["Board of Studies", "Examination Cell", "IQAC"]);
    assert_eq!(form.records().len(), 3);
    assert_eq!(form.editing_id(), None);
}

#[tokio::test]
async fn test_delete_removes_exactly_one_and_keeps_order() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);
    let mut form = fixture.form::<Committee>();
    form.activate_view().await.unwrap();
    let requests_before = fixture.backend.request_count();

    assert!(form.delete(2).await.unwrap());

    let names: Vec<_> = form.records().iter().map(|c| c.com_name.as_str()).collect();
    assert_eq!(names, vec!["Board of Studies", "IQAC"]);
    // One DELETE and no refetch.
    assert_eq!(fixture.backend.request_count(), requests_before + 1);
    assert_eq!(fixture.backend.rows("committees").len(), 2);
    assert_eq!(
        fixture.ui.questions(),
        vec!["Are you sure you want to delete this committee?".to_string()]
    );
    assert_eq!(
        fixture.ui.alerts(),
        vec!["Committee deleted successfully!".to_string()]
    );
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);
    let mut form = fixture.form::<Committee>();
    form.activate_view().await.unwrap();
    let requests_before = fixture.backend.request_count();

    fixture.ui.decline();
    assert!(!form.delete(1).await.unwrap());

    assert_eq!(fixture.backend.request_count(), requests_before);
    assert_eq!(form.records().len(), 3);
}

#[tokio::test]
async fn test_missing_required_field_sends_no_request() {
    let fixture = TestFixture::new().await;
    let mut form = fixture.form::<Committee>();
    form.draft_mut().com_name = "Senate".to_string();
    form.draft_mut().active = "Y".to_string();
    form.draft_mut().level1 = "1".to_string();

    let err = form.submit().await.unwrap_err();

    assert_eq!(err.error_code(), codes::VALIDATION_ERROR);
    assert_eq!(err.message(), "Formation Date is required");
    assert_eq!(fixture.backend.request_count(), 0);
    assert!(fixture.ui.alerts().is_empty());
}

#[tokio::test]
async fn test_city_code_length_is_validated_locally() {
    let fixture = TestFixture::new().await;
    let mut form = fixture.form::<City>();
    {
        let draft = form.draft_mut();
        draft.state = Some(1);
        draft.name = "Chhatrapati Sambhajinagar".to_string();
        draft.code = "CSNAGAR".to_string();
    }

    let err = form.submit().await.unwrap_err();

    assert_eq!(err.message(), "City Code must be at most 5 characters");
    assert_eq!(fixture.backend.request_count(), 0);
}

#[tokio::test]
async fn test_requests_carry_identity_headers() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);

    let committees = ResourceClient::<Committee>::new(fixture.client.clone())
        .list()
        .await
        .unwrap();

    assert_eq!(committees.len(), 3);
    assert_eq!(fixture.backend.usernames(), vec!["registrar".to_string()]);
}

#[tokio::test]
async fn test_missing_session_sends_nothing_and_redirects() {
    let fixture = TestFixture::anonymous().await;
    let mut form = fixture.form::<Committee>();

    let err = form.activate_view().await.unwrap_err();

    assert!(matches!(err, ClientError::MissingAuth));
    assert_eq!(fixture.backend.request_count(), 0);
    assert_eq!(fixture.ui.redirects(), 1);
}

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);
    let mut form = fixture.form::<Committee>();
    form.activate_view().await.unwrap();

    fixture.backend.revoke_token();
    let err = form.delete(1).await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert!(!fixture.client.session().is_active().await);
    assert_eq!(fixture.ui.redirects(), 1);
    assert!(fixture.ui.alerts().is_empty());
    // The local list is untouched.
    assert_eq!(form.records().len(), 3);

    // Later calls fail before reaching the backend.
    let requests_before = fixture.backend.request_count();
    assert!(matches!(
        form.refresh().await.unwrap_err(),
        ClientError::MissingAuth
    ));
    assert_eq!(fixture.backend.request_count(), requests_before);
}

#[tokio::test]
async fn test_bulk_delete_partial_failure() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);
    fixture.backend.fail_delete(3);
    let mut form = fixture.form::<Committee>();
    form.activate_view().await.unwrap();

    form.select_all();
    let err = form.delete_selected().await.unwrap_err();

    match err {
        ClientError::PartialDelete {
            deleted,
            failed,
            login_required,
        } => {
            assert!(!login_required);
            assert_eq!(deleted, vec![1, 2]);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].0, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let names: Vec<_> = form.records().iter().map(|c| c.com_name.as_str()).collect();
    assert_eq!(names, vec!["IQAC"]);
    // The record that could not be deleted stays selected.
    assert_eq!(form.selected().iter().copied().collect::<Vec<_>>(), vec![3]);
    assert_eq!(fixture.ui.questions().len(), 1);
    assert_eq!(fixture.ui.alerts().len(), 1);
    assert!(fixture.ui.alerts()[0].starts_with("deleted 2 record(s), 1 failed"));
    assert_eq!(fixture.ui.redirects(), 0);
}

#[tokio::test]
async fn test_bulk_delete_with_rejected_session_redirects() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);
    fixture.backend.reject_delete(2);
    let mut form = fixture.form::<Committee>();
    form.activate_view().await.unwrap();

    form.select_all();
    let err = form.delete_selected().await.unwrap_err();

    assert!(err.requires_login());
    match err {
        ClientError::PartialDelete { deleted, failed, .. } => {
            assert_eq!(deleted, vec![1, 3]);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].0, 2);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!fixture.client.session().is_active().await);
    assert_eq!(fixture.ui.redirects(), 1);
    let names: Vec<_> = form.records().iter().map(|c| c.com_name.as_str()).collect();
    assert_eq!(names, vec!["Exam Cell"]);
}

#[tokio::test]
async fn test_bulk_delete_all_succeed() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);
    let mut form = fixture.form::<Committee>();
    form.activate_view().await.unwrap();

    form.toggle_selected(1);
    form.toggle_selected(3);
    let deleted = form.delete_selected().await.unwrap();

    assert_eq!(deleted, vec![1, 3]);
    assert_eq!(fixture.backend.rows("committees").len(), 1);
    assert_eq!(form.records()[0].com_name, "Exam Cell");
    assert_eq!(
        fixture.ui.alerts(),
        vec!["Selected records deleted successfully!".to_string()]
    );
}

#[tokio::test]
async fn test_server_error_keeps_draft() {
    let fixture = TestFixture::new().await;
    seed_committees(&fixture.backend);
    let mut form = fixture.form::<Committee>();
    form.activate_view().await.unwrap();
    form.begin_edit(1).unwrap();

    // Another client removed the record in the meantime.
    fixture.backend.seed("committees", vec![]);
    form.draft_mut().level1 = "2".to_string();
    let err = form.submit().await.unwrap_err();

    assert_eq!(err.error_code(), codes::NOT_FOUND);
    assert_eq!(fixture.ui.alerts(), vec!["Not found.".to_string()]);
    assert_eq!(form.mode(), FormMode::Edit(1));
    assert_eq!(form.draft().level1, "2");
}

#[tokio::test]
async fn test_program_update_patches_list_without_refetch() {
    let fixture = TestFixture::new().await;
    fixture.backend.seed(
        "program",
        vec![
            json!({"PROGRAM_ID": 1, "NAME": "B.Tech", "CODE": "BT", "LEVEL": "UG", "TYPE": "Full Time"}),
            json!({"PROGRAM_ID": 2, "NAME": "M.Tech", "CODE": "MT", "LEVEL": "PG", "TYPE": "Full Time"}),
        ],
    );
    let mut form = fixture.form::<Program>();
    form.activate_view().await.unwrap();

    form.begin_edit(2).unwrap();
    form.draft_mut().program_type = "Part Time".to_string();
    let requests_before = fixture.backend.request_count();
    form.submit().await.unwrap();

    // Only the PUT went out.
    assert_eq!(fixture.backend.request_count(), requests_before + 1);
    assert_eq!(form.records()[1].program_type, "Part Time");
    assert_eq!(fixture.backend.rows("program")[1]["TYPE"], "Part Time");
    assert_eq!(
        fixture.ui.alerts(),
        vec!["Program updated successfully!".to_string()]
    );
}

#[tokio::test]
async fn test_city_create_stamps_user_and_uppercases_code() {
    let fixture = TestFixture::new().await;
    let mut form = fixture.form::<City>();
    {
        let draft = form.draft_mut();
        draft.state = Some(27);
        draft.name = "Pune".to_string();
        draft.code = "pnq".to_string();
    }

    let city = form.submit().await.unwrap();

    assert_eq!(city.code, "PNQ");
    assert!(city.is_active);
    let stored = &fixture.backend.rows("cities")[0];
    assert_eq!(stored["CREATED_BY"], "registrar");
    assert_eq!(stored["UPDATED_BY"], "registrar");
    assert_eq!(stored["STATE"], 27);
}

#[tokio::test]
async fn test_login_and_otp_establish_persisted_session() {
    let fixture = TestFixture::anonymous().await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("session.sqlite");

    let pool = init_database(&db_path).await.expect("Failed to init DB");
    let session = SessionContext::restore(SessionRepository::new(pool))
        .await
        .unwrap();
    let client = RequestClient::new(fixture.backend.base_url.clone(), session);
    let auth = AuthApi::new(client.clone());

    let challenge = auth.login("adm001", TEST_PASSWORD).await.unwrap();
    assert_eq!(challenge.user_id, "ADM001");
    assert_eq!(challenge.email.as_deref(), Some("r*******@college.edu"));
    assert!(!client.session().is_active().await);

    let user = auth.verify_otp("adm001", TEST_OTP).await.unwrap();
    assert_eq!(user.username, "registrar");
    assert_eq!(client.session().require().await.unwrap().token, TEST_TOKEN);

    // A new process picks the session up from disk.
    let pool = init_database(&db_path).await.unwrap();
    let restored = SessionContext::restore(SessionRepository::new(pool))
        .await
        .unwrap();
    let saved = restored.require().await.unwrap();
    assert_eq!(saved.username, "registrar");
    assert_eq!(saved.refresh.as_deref(), Some("refresh-token"));

    auth.logout().await;
    assert!(!client.session().is_active().await);
}

#[tokio::test]
async fn test_login_failures() {
    let fixture = TestFixture::anonymous().await;
    let auth = AuthApi::new(fixture.client.clone());

    let err = auth.login("ADM001", "wrong").await.unwrap_err();
    assert_eq!(err.error_code(), codes::INVALID_CREDENTIALS);
    assert_eq!(err.status_code(), Some(401));
    assert!(!err.requires_login());
    assert_eq!(
        err.message(),
        "Invalid credentials. 2 attempts remaining before next level of account lock."
    );

    let err = auth.login("ADM001", "wrong again").await.unwrap_err();
    assert!(err.message().contains("1 attempts remaining"));

    let err = auth.verify_otp("ADM001", "000000").await.unwrap_err();
    assert_eq!(err.message(), "HTTP 400: Invalid OTP");
    assert!(!fixture.client.session().is_active().await);

    let requests_before = fixture.backend.request_count();
    let err = auth.login("  ", "").await.unwrap_err();
    assert_eq!(err.message(), "User ID is required, Password is required");
    assert_eq!(fixture.backend.request_count(), requests_before);
}

#[tokio::test]
async fn test_wrong_password_keeps_current_session() {
    let fixture = TestFixture::new().await;
    let auth = AuthApi::new(fixture.client.clone());

    let err = auth.login("ADM002", "wrong").await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidCredentials(_)));
    assert!(fixture.client.session().is_active().await);
    assert_eq!(fixture.ui.redirects(), 0);

    // The established session still works.
    seed_committees(&fixture.backend);
    let committees = ResourceClient::<Committee>::new(fixture.client.clone())
        .list()
        .await
        .unwrap();
    assert_eq!(committees.len(), 3);
}

#[tokio::test]
async fn test_resend_otp() {
    let fixture = TestFixture::anonymous().await;
    let auth = AuthApi::new(fixture.client.clone());

    let challenge = auth.resend_otp(" adm001 ").await.unwrap();
    assert_eq!(challenge.user_id, "ADM001");
    assert_eq!(challenge.email.as_deref(), Some("r*******@college.edu"));

    let requests_before = fixture.backend.request_count();
    let err = auth.resend_otp("").await.unwrap_err();
    assert_eq!(err.error_code(), codes::VALIDATION_ERROR);
    assert_eq!(fixture.backend.request_count(), requests_before);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let fixture = TestFixture::anonymous().await;
    let auth = AuthApi::new(fixture.client.clone());

    let notice = auth.request_password_reset("adm001").await.unwrap();
    assert_eq!(notice.message, "Password reset OTP sent successfully");
    assert_eq!(notice.email.as_deref(), Some("r*******@college.edu"));

    let err = auth.verify_reset_otp("adm001", "000000").await.unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert!(auth.verify_reset_otp("adm001", TEST_OTP).await.unwrap());

    let err = auth
        .reset_password("adm001", TEST_OTP, "")
        .await
        .unwrap_err();
    assert_eq!(err.message(), "New Password is required");

    let notice = auth
        .reset_password("adm001", TEST_OTP, "n3w-secret")
        .await
        .unwrap();
    assert_eq!(notice.message, "Password reset successful");

    // Only the new password is accepted from now on.
    let err = auth.login("ADM001", TEST_PASSWORD).await.unwrap_err();
    assert_eq!(err.error_code(), codes::INVALID_CREDENTIALS);
    auth.login("ADM001", "n3w-secret").await.unwrap();
    assert!(!fixture.client.session().is_active().await);
}

#[tokio::test]
async fn test_password_reset_for_unknown_user() {
    let fixture = TestFixture::anonymous().await;
    let auth = AuthApi::new(fixture.client.clone());

    let err = auth.request_password_reset("nobody").await.unwrap_err();

    assert_eq!(err.error_code(), codes::NOT_FOUND);
    assert_eq!(err.message(), "User not found");
}
