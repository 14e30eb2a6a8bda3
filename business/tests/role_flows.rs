//! Role catalog flows, including permission assignment via full-record save.

mod common;

use common::{TestContext, sample_role};
use rbacctl_business::{
    DeleteRoleCommand, DeleteRoleInput, DeleteRoleStatus, DeleteRoleCompute, LoadRolesCommand,
    RoleDraft, RolesCompute, RolesStatus, SaveRoleCommand, SaveRoleCompute, SaveRoleInput,
    ValidationError,
};
use ustr::Ustr;

#[tokio::test]
async fn load_roles_fills_the_catalog() {
    let mut test_ctx = TestContext::new().await;
    let roles = vec![
        sample_role(1, "Admin", &["users.read", "users.write"]),
        sample_role(2, "Viewer", &["users.read"]),
    ];
    test_ctx.mock_list_roles(&roles).await;

    test_ctx.ctx.enqueue_command::<LoadRolesCommand>();
    test_ctx.flush_and_wait().await;

    let cache = test_ctx.ctx.compute::<RolesCompute>();
    assert_eq!(cache.status(), &RolesStatus::Loaded);
    assert_eq!(cache.roles(), roles.as_slice());

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn save_without_id_creates_a_role() {
    let mut test_ctx = TestContext::new().await;
    test_ctx.mock_list_roles(&[]).await;
    let created = sample_role(5, "Editor", &["users.read", "users.write"]);
    test_ctx.mock_create_role(&created).await;

    test_ctx.ctx.enqueue_command::<LoadRolesCommand>();
    test_ctx.flush_and_wait().await;

    test_ctx.ctx.update::<SaveRoleInput>(|input| {
        input.id = None;
        input.draft = RoleDraft {
            name: "Editor".to_owned(),
            permissions: vec![Ustr::from("users.read"), Ustr::from("users.write")],
        };
    });
    test_ctx.ctx.enqueue_command::<SaveRoleCommand>();
    test_ctx.flush_and_wait().await;

    let save = test_ctx.ctx.compute::<SaveRoleCompute>();
    assert_eq!(save.saved(), Some(&created));

    let cache = test_ctx.ctx.compute::<RolesCompute>();
    assert_eq!(cache.roles(), std::slice::from_ref(&created));

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn permission_assignment_is_a_full_record_update() {
    let mut test_ctx = TestContext::new().await;
    let roles = vec![sample_role(2, "Viewer", &["users.read"])];
    test_ctx.mock_list_roles(&roles).await;
    let reassigned = sample_role(2, "Viewer", &["users.read", "reports.read"]);
    test_ctx.mock_update_role(2, &reassigned).await;

    test_ctx.ctx.enqueue_command::<LoadRolesCommand>();
    test_ctx.flush_and_wait().await;

    test_ctx.ctx.update::<SaveRoleInput>(|input| {
        input.id = Some(2);
        input.draft = RoleDraft {
            name: "Viewer".to_owned(),
            permissions: vec![Ustr::from("users.read"), Ustr::from("reports.read")],
        };
    });
    test_ctx.ctx.enqueue_command::<SaveRoleCommand>();
    test_ctx.flush_and_wait().await;

    let cache = test_ctx.ctx.compute::<RolesCompute>();
    assert_eq!(cache.find(2), Some(&reassigned));
    assert_eq!(cache.roles().len(), 1);

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn role_without_permissions_is_rejected_locally() {
    let mut test_ctx = TestContext::new().await;

    test_ctx.ctx.update::<SaveRoleInput>(|input| {
        input.id = None;
        input.draft = RoleDraft {
            name: "Empty".to_owned(),
            permissions: vec![],
        };
    });
    test_ctx.ctx.enqueue_command::<SaveRoleCommand>();
    test_ctx.flush_and_wait().await;

    let save = test_ctx.ctx.compute::<SaveRoleCompute>();
    assert_eq!(save.rejection(), Some(&ValidationError::NoPermissions));

    let requests = test_ctx
        .mock_server
        .received_requests()
        .await
        .unwrap_or_default();
    assert!(requests.is_empty());

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn concurrent_save_and_delete_both_reconcile() {
    let mut test_ctx = TestContext::new().await;
    let roles = vec![
        sample_role(1, "Admin", &["users.read"]),
        sample_role(2, "Viewer", &["users.read"]),
    ];
    test_ctx.mock_list_roles(&roles).await;
    let created = sample_role(5, "Editor", &["users.write"]);
    test_ctx.mock_create_role(&created).await;
    // The delete resolves after the save has already landed in the catalog.
    wiremock::Mock::given(wiremock::matchers::method("DELETE"))
        .and(wiremock::matchers::path("/roles/2"))
        .respond_with(
            wiremock::ResponseTemplate::new(204)
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&test_ctx.mock_server)
        .await;

    test_ctx.ctx.enqueue_command::<LoadRolesCommand>();
    test_ctx.flush_and_wait().await;

    test_ctx.ctx.update::<SaveRoleInput>(|input| {
        input.id = None;
        input.draft = RoleDraft {
            name: "Editor".to_owned(),
            permissions: vec![Ustr::from("users.write")],
        };
    });
    test_ctx.ctx.update::<DeleteRoleInput>(|input| input.id = 2);

    test_ctx.ctx.enqueue_command::<SaveRoleCommand>();
    test_ctx.ctx.enqueue_command::<DeleteRoleCommand>();
    test_ctx.flush_and_wait().await;

    let cache = test_ctx.ctx.compute::<RolesCompute>();
    let ids: Vec<u64> = cache.roles().iter().map(|r| r.id).collect();
    assert_eq!(ids, [1, 5]);

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn delete_role_removes_it_from_the_catalog() {
    let mut test_ctx = TestContext::new().await;
    let roles = vec![
        sample_role(1, "Admin", &["users.read"]),
        sample_role(2, "Viewer", &["users.read"]),
    ];
    test_ctx.mock_list_roles(&roles).await;
    test_ctx.mock_delete_role(2).await;

    test_ctx.ctx.enqueue_command::<LoadRolesCommand>();
    test_ctx.flush_and_wait().await;

    test_ctx.ctx.update::<DeleteRoleInput>(|input| input.id = 2);
    test_ctx.ctx.enqueue_command::<DeleteRoleCommand>();
    test_ctx.flush_and_wait().await;

    let delete = test_ctx.ctx.compute::<DeleteRoleCompute>();
    assert_eq!(delete.status, DeleteRoleStatus::Deleted(2));

    let cache = test_ctx.ctx.compute::<RolesCompute>();
    assert_eq!(cache.roles().len(), 1);
    assert_eq!(cache.roles()[0].id, 1);

    test_ctx.shutdown().await;
}
