//! HTTP contract tests for admin-client against a mock upstream.
//!
//! Both upstreams are served by one wiremock server; the client is pointed at
//! it for the backend and the retrieval API alike.

use admin_client::{
    AdminUserCreate, AdminUserUpdate, ApiClient, Attachment, BroadcastRequest, ClientConfig,
    ClientError, LoginRequest, Role, ScheduleBroadcastRequest, SendMessageRequest,
};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::new(ClientConfig::new(server.uri(), server.uri())).unwrap();
    (server, client)
}

fn user(telegram_id: i64, username: Option<&str>) -> serde_json::Value {
    json!({
        "id": telegram_id / 10,
        "telegram_id": telegram_id,
        "username": username,
        "phone": "+79990000000",
        "created_at": "2024-02-01T12:00:00",
        "mouse_keyboard_skill": "good",
        "programming_experience": null,
        "child_age": 10,
        "child_name": "Masha",
        "onboarding_completed": 1
    })
}

// ============================================================================
// Auth
// ============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "username": "anna", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "username": "anna",
                "role": "admin",
                "message": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client
            .auth()
            .login(&LoginRequest::new("anna", "pw"))
            .await
            .unwrap();
        assert_eq!(response.username, "anna");
        assert_eq!(response.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_me_and_rejected_session() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("not authenticated"))
            .mount(&server)
            .await;

        let err = client.auth().me().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(matches!(err, ClientError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_me_rejects_unknown_role() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "username": "x", "role": "owner" })),
            )
            .mount(&server)
            .await;

        let err = client.auth().me().await.unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }
}

// ============================================================================
// Users and transcripts
// ============================================================================

mod users_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_and_get_users() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([user(111, Some("a")), user(222, None)])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/222"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user(222, None)))
            .mount(&server)
            .await;

        let users = client.users().list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].onboarding_completed);

        let one = client.users().get(222).await.unwrap();
        assert_eq!(one.display_name(), "#222");
    }

    #[tokio::test]
    async fn test_onboarding_data() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users/111/onboarding/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "extracted": {
                    "mouse_keyboard_skill": null,
                    "programming_experience": "scratch",
                    "child_age": 8,
                    "child_name": null
                },
                "needs_clarification": true,
                "clarification_question": "How old is your child?"
            })))
            .mount(&server)
            .await;

        let data = client.users().onboarding_data(111).await.unwrap();
        assert!(data.needs_clarification);
        assert_eq!(data.extracted.child_age, Some(8));
        assert_eq!(
            data.clarification_question.as_deref(),
            Some("How old is your child?")
        );
    }

    #[tokio::test]
    async fn test_transcript() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users/111/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "user_id": 11, "text": "question", "relevance": 0.82,
                  "is_bot": 0, "created_at": "2024-02-01T12:00:00" },
                { "id": 2, "user_id": 11, "text": "answer", "relevance": null,
                  "is_bot": 1, "created_at": "2024-02-01T12:00:05" }
            ])))
            .mount(&server)
            .await;

        let messages = client.messages().list_for_user(111).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(!messages[0].is_bot);
        assert!(messages[1].is_bot);
        assert_eq!(messages[0].relevance, Some(0.82));
    }

    #[tokio::test]
    async fn test_server_error_is_surfaced() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        match client.users().list().await {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}

// ============================================================================
// Delivery
// ============================================================================

mod delivery_tests {
    use super::*;

    #[tokio::test]
    async fn test_send_message_multipart() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/admin/send-message"))
            .and(body_string_contains("name=\"telegram_id\""))
            .and(body_string_contains("Hi there"))
            .and(body_string_contains("filename=\"pic.png\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "Message sent", "telegram_result": {} })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let receipt = client
            .messages()
            .send_message(&SendMessageRequest {
                telegram_id: 111,
                text: "Hi there".to_string(),
                files: vec![Attachment::new("pic.png", vec![0x89, 0x50])],
            })
            .await
            .unwrap();
        assert_eq!(receipt.message, "Message sent");
    }

    #[tokio::test]
    async fn test_broadcast_sends_ids_as_json_array() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/admin/broadcast"))
            .and(body_string_contains("[111,222]"))
            .and(body_string_contains("Hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sent": 2,
                "errors": 0,
                "results": [
                    { "telegram_id": 111, "status": "sent" },
                    { "telegram_id": 222, "status": "sent" }
                ],
                "error_details": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let report = client
            .messages()
            .broadcast(&BroadcastRequest {
                telegram_ids: vec![111, 222],
                text: "Hello".to_string(),
                files: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(report.sent, 2);
        assert_eq!(report.results.len(), 2);
    }

    #[tokio::test]
    async fn test_schedule_broadcast_formats_time() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/admin/schedule-broadcast"))
            .and(body_string_contains("2025-01-31T18:30:00"))
            .and(body_string_contains("name=\"files\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Broadcast scheduled",
                "scheduled_at": "2025-01-31T18:30:00",
                "recipients_count": 1,
                "id": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let scheduled_at = NaiveDate::from_ymd_opt(2025, 1, 31)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        let confirmation = client
            .messages()
            .schedule_broadcast(&ScheduleBroadcastRequest {
                telegram_ids: vec![111],
                text: String::new(),
                scheduled_at,
                files: vec![Attachment::new("a.jpg", vec![1, 2, 3])],
            })
            .await
            .unwrap();
        assert_eq!(confirmation.id, 7);
        assert_eq!(confirmation.recipients_count, 1);
    }
}

// ============================================================================
// Documents
// ============================================================================

mod documents_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_documents() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [ { "document": "faq.pdf", "chunks": 12 } ],
                "total_documents": 1,
                "total_chunks": 12
            })))
            .mount(&server)
            .await;

        let corpus = client.documents().list().await.unwrap();
        assert_eq!(corpus.total_chunks, 12);
        assert_eq!(corpus.documents[0].document, "faq.pdf");
    }

    #[tokio::test]
    async fn test_upload_passes_replace_all() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/documents"))
            .and(query_param("replace_all", "false"))
            .and(body_string_contains("filename=\"faq.pdf\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "uploaded",
                "filename": "faq.pdf",
                "chunks": 4
            })))
            .expect(1)
            .mount(&server)
            .await;

        let report = client
            .documents()
            .upload(&Attachment::new("faq.pdf", b"%PDF".to_vec()), false)
            .await
            .unwrap();
        assert_eq!(report.chunks, 4);
    }

    #[tokio::test]
    async fn test_update_and_delete_encode_name() {
        let (server, client) = setup().await;

        Mock::given(method("PUT"))
            .and(path("/documents/price%20list.docx"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "updated",
                "deleted_chunks": 3,
                "new_chunks": 5
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/documents/price%20list.docx"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "deleted", "deleted_chunks": 5 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let updated = client
            .documents()
            .update("price list.docx", &Attachment::new("new.docx", vec![1]))
            .await
            .unwrap();
        assert_eq!(updated.new_chunks, 5);

        let deleted = client.documents().delete("price list.docx").await.unwrap();
        assert_eq!(deleted.deleted_chunks, 5);
    }
}

// ============================================================================
// Staff accounts
// ============================================================================

mod admin_users_tests {
    use super::*;

    fn admin(id: i64, username: &str, role: &str) -> serde_json::Value {
        json!({
            "id": id,
            "username": username,
            "role": role,
            "created_at": "2024-01-10T08:00:00"
        })
    }

    #[tokio::test]
    async fn test_crud() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([admin(1, "root", "dev")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/admin/users"))
            .and(body_json(json!({
                "username": "olga",
                "password": "pw",
                "role": "manager"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin(2, "olga", "manager")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/admin/users/2"))
            .and(body_json(json!({ "role": "admin" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin(2, "olga", "admin")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/admin/users/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client.admin_users();
        assert_eq!(api.list().await.unwrap()[0].role, Role::Dev);

        let created = api
            .create(&AdminUserCreate::new("olga", "pw", Role::Manager))
            .await
            .unwrap();
        assert_eq!(created.id, 2);

        let update = AdminUserUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert_eq!(api.update(2, &update).await.unwrap().role, Role::Admin);

        api.delete(2).await.unwrap();
    }
}
